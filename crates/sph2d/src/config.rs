//! Simulation configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults
//! 2. `sph2d.ron` file (if exists)
//! 3. Environment variables prefixed with `SPH2D_`
//!
//! Example environment variable: `SPH2D_LIMITS__MAX_PARTICLES=1000`

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use sph2d_core::{Domain, SimParams};

/// Main simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SimConfig {
    #[serde(default)]
    pub domain: DomainConfig,

    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub physics: PhysicsConfig,

    #[serde(default)]
    pub run: RunConfig,
}

/// Window and wall settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainConfig {
    /// Window width in pixels
    pub window_width: u32,
    /// Window height in pixels
    pub window_height: u32,
    /// View units per window pixel
    pub view_scale: f32,
    /// Collision margin from each wall, in view units
    pub eps: f32,
    /// Fraction of normal velocity kept after a wall hit
    pub boundary_damping: f32,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            window_width: 800,
            window_height: 600,
            view_scale: 1.5,
            eps: 16.0,
            boundary_damping: 0.5,
        }
    }
}

/// Particle count limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    pub max_particles: usize,
    /// Particles spawned by the dam tool
    pub dam_particles: usize,
    /// Particles spawned by the splash tool
    pub block_particles: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_particles: 2500,
            dam_particles: 500,
            block_particles: 250,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsConfig {
    pub gravity_x: f32,
    /// Negative is down. Multiplied by density, not mass.
    pub gravity_y: f32,
    pub gravity_enabled: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity_x: 0.0,
            gravity_y: -2.5e5,
            gravity_enabled: true,
        }
    }
}

/// Stepping and interaction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Ticks per large step forward or back
    pub large_step: usize,
    /// Ticks that can be rewound
    pub history_capacity: usize,
    pub ticks_per_frame: usize,
    /// Pick radius of the select tool, in view units
    pub pick_radius: f32,
    /// Seed for spawn jitter
    pub seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            large_step: 10,
            history_capacity: 256,
            ticks_per_frame: 1,
            pick_radius: 16.0,
            seed: 0x5eed,
        }
    }
}

impl SimConfig {
    /// Load configuration with layered priority:
    /// 1. Compiled defaults (lowest priority)
    /// 2. `sph2d.ron` file (if exists)
    /// 3. Environment variables prefixed with `SPH2D_` (highest priority)
    pub fn load() -> Result<Self> {
        Self::load_from("sph2d")
    }

    /// Same as [`SimConfig::load`] with a different config file stem
    pub fn load_from(file_name: &str) -> Result<Self> {
        let builder = Config::builder()
            // Layer 1: Compiled defaults
            .set_default("domain.window_width", 800_i64)?
            .set_default("domain.window_height", 600_i64)?
            .set_default("domain.view_scale", 1.5)?
            .set_default("domain.eps", 16.0)?
            .set_default("domain.boundary_damping", 0.5)?
            .set_default("limits.max_particles", 2500_i64)?
            .set_default("limits.dam_particles", 500_i64)?
            .set_default("limits.block_particles", 250_i64)?
            .set_default("physics.gravity_x", 0.0)?
            .set_default("physics.gravity_y", -2.5e5)?
            .set_default("physics.gravity_enabled", true)?
            .set_default("run.large_step", 10_i64)?
            .set_default("run.history_capacity", 256_i64)?
            .set_default("run.ticks_per_frame", 1_i64)?
            .set_default("run.pick_radius", 16.0)?
            .set_default("run.seed", 0x5eed_i64)?
            // Layer 2: Config file (optional, won't error if missing)
            .add_source(
                File::with_name(file_name)
                    .format(config::FileFormat::Ron)
                    .required(false),
            )
            // Layer 3: Environment variables (SPH2D_LIMITS__MAX_PARTICLES, etc.)
            .add_source(
                Environment::with_prefix("SPH2D")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Convert to core parameters, validating every field
    pub fn to_sim_params(&self) -> Result<SimParams> {
        let d = &self.domain;
        let domain = Domain::from_window(
            d.window_width,
            d.window_height,
            d.view_scale,
            d.eps,
            d.boundary_damping,
        )
        .context("Invalid domain configuration")?;

        let params = SimParams {
            domain,
            view_scale: d.view_scale,
            gravity: Vec2::new(self.physics.gravity_x, self.physics.gravity_y),
            gravity_enabled: self.physics.gravity_enabled,
            max_particles: self.limits.max_particles,
            dam_particles: self.limits.dam_particles,
            block_particles: self.limits.block_particles,
            large_step: self.run.large_step,
            history_capacity: self.run.history_capacity,
            ticks_per_frame: self.run.ticks_per_frame,
            pick_radius: self.run.pick_radius,
            seed: self.run.seed,
        };
        params.validate().context("Invalid simulation configuration")?;
        Ok(params)
    }
}
