//! Scenario actions

use serde::{Deserialize, Serialize};

/// One step of a scenario. Species are referenced by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScenarioAction {
    // === SPAWNING ===
    /// Spawn one resting particle
    Spawn { x: f32, y: f32, species: String },

    /// Spawn one particle with an initial velocity
    Throw {
        x: f32,
        y: f32,
        vx: f32,
        vy: f32,
        species: String,
    },

    /// Spawn a square block centered on (x, y)
    Splash { x: f32, y: f32, species: String },

    /// Spawn a dam column on the floor
    Dam { species: String },

    /// Radial velocity kick around (x, y)
    Explode {
        x: f32,
        y: f32,
        radius: f32,
        strength: f32,
    },

    /// Remove every particle
    Clear,

    // === SELECTION ===
    Select { index: usize },
    SelectAt { x: f32, y: f32 },
    Deselect,

    // === RUN CONTROL ===
    Start,
    Pause,
    Resume,

    /// Call the per-frame advance N times. Ticks only while running.
    RunFrames { frames: usize },

    /// Single tick forward
    Step,
    /// Single tick back
    Back,
    LargeStep,
    LargeBack,

    // === PARAMETERS ===
    SetGravity {
        enabled: bool,
        /// Replace the gravity vector as well
        #[serde(default)]
        vector: Option<(f32, f32)>,
    },

    /// Resize the window, in pixels
    Resize { width: u32, height: u32 },

    // === MISC ===
    Log { message: String },
}
