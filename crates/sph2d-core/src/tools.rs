//! Spawn and interaction tools
//!
//! The interactive front end maps clicks to one of these; each tool only
//! needs a position in view space.

use glam::Vec2;
use rand::Rng;

use crate::domain::Domain;
use crate::driver::Simulation;
use crate::error::SimResult;

/// Grid spacing of bulk spawns, as a fraction of the kernel radius
pub const BLOCK_SPACING: f32 = 0.95;

/// Horizontal jitter of bulk spawns, as a fraction of the spacing.
/// Breaks perfectly stacked columns.
pub const JITTER_FRACTION: f32 = 0.05;

/// Trait for click tools
pub trait Tool {
    /// Tool display name
    fn name(&self) -> &str;

    /// Apply the tool at a view-space position. Returns how many particles
    /// were spawned or affected.
    fn apply(&self, sim: &mut Simulation, at: Vec2) -> SimResult<usize>;
}

/// Spawns a single particle with an initial velocity
pub struct ThrowTool {
    pub species: u16,
    pub velocity: Vec2,
}

impl Tool for ThrowTool {
    fn name(&self) -> &str {
        "Throw"
    }

    fn apply(&self, sim: &mut Simulation, at: Vec2) -> SimResult<usize> {
        sim.spawn_with_velocity(at, self.velocity, self.species)?;
        Ok(1)
    }
}

/// Spawns a square block of particles centered on the click
pub struct SplashTool {
    pub species: u16,
}

impl Tool for SplashTool {
    fn name(&self) -> &str {
        "Splash"
    }

    fn apply(&self, sim: &mut Simulation, at: Vec2) -> SimResult<usize> {
        sim.spawn_block(at, self.species)
    }
}

/// Pushes nearby particles radially outward
pub struct ExplosionTool {
    pub radius: f32,
    pub strength: f32,
}

impl Tool for ExplosionTool {
    fn name(&self) -> &str {
        "Explosion"
    }

    fn apply(&self, sim: &mut Simulation, at: Vec2) -> SimResult<usize> {
        Ok(sim.explode(at, self.radius, self.strength))
    }
}

/// Picks the nearest particle for the force monitor
pub struct SelectTool;

impl Tool for SelectTool {
    fn name(&self) -> &str {
        "Select"
    }

    fn apply(&self, sim: &mut Simulation, at: Vec2) -> SimResult<usize> {
        Ok(sim.select_at(at).map_or(0, |_| 1))
    }
}

/// Square grid of up to `count` positions centered on `center`
pub fn block_positions<R: Rng + ?Sized>(
    center: Vec2,
    count: usize,
    spacing: f32,
    rng: &mut R,
) -> Vec<Vec2> {
    if count == 0 {
        return Vec::new();
    }

    let side = (count as f32).sqrt().ceil() as usize;
    let half_extent = (side - 1) as f32 * spacing * 0.5;
    let origin = center - Vec2::splat(half_extent);

    let mut positions = Vec::with_capacity(count);
    'rows: for row in 0..side {
        for col in 0..side {
            if positions.len() == count {
                break 'rows;
            }
            let jitter = rng.gen::<f32>() * spacing * JITTER_FRACTION;
            positions.push(origin + Vec2::new(col as f32 * spacing + jitter, row as f32 * spacing));
        }
    }
    positions
}

/// Column of fluid resting on the floor between a quarter and half of the
/// domain width, filled bottom-up
pub fn dam_positions<R: Rng + ?Sized>(
    domain: &Domain,
    count: usize,
    spacing: f32,
    rng: &mut R,
) -> Vec<Vec2> {
    let mut positions = Vec::with_capacity(count);
    let top = domain.max().y;
    let (left, right) = (domain.width * 0.25, domain.width * 0.5);

    let mut y = domain.eps;
    while y <= top && positions.len() < count {
        let mut x = left;
        while x <= right && positions.len() < count {
            let jitter = rng.gen::<f32>() * spacing * JITTER_FRACTION;
            positions.push(Vec2::new(x + jitter, y));
            x += spacing;
        }
        y += spacing;
    }
    positions
}

/// Velocity kick for a particle at `position`, fading linearly to zero at
/// `radius` from the center
pub fn explosion_impulse(position: Vec2, center: Vec2, radius: f32, strength: f32) -> Vec2 {
    let offset = position - center;
    let distance = offset.length();
    if radius <= 0.0 || distance >= radius {
        return Vec2::ZERO;
    }
    let falloff = 1.0 - distance / radius;
    offset.normalize_or_zero() * strength * falloff
}
