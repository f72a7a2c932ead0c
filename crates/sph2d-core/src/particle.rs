//! Particle records and the insertion-ordered particle store

use glam::Vec2;
use sph2d_species::{SpeciesDef, SpeciesProps};

use crate::error::{SimError, SimResult};

/// Ceiling on particle count. Both passes are O(n²), so this is what keeps
/// a tick bounded.
pub const MAX_PARTICLES: usize = 2500;

/// One fluid sample point
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Total force from the last force pass
    pub force: Vec2,
    /// Smoothed density (rho), rewritten every tick
    pub density: f32,
    /// Equation-of-state pressure, rewritten every tick; may be negative
    pub pressure: f32,

    color: [f32; 3],
    species: u16,
    props: SpeciesProps,
}

impl Particle {
    /// Create a resting particle of the given species
    pub fn new(position: Vec2, species: &SpeciesDef) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            force: Vec2::ZERO,
            density: 0.0,
            pressure: 0.0,
            color: species.color,
            species: species.id,
            props: species.props(),
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn color(&self) -> [f32; 3] {
        self.color
    }

    /// Id of the preset this particle was spawned from
    pub fn species(&self) -> u16 {
        self.species
    }

    pub fn props(&self) -> &SpeciesProps {
        &self.props
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.props.mass
    }

    #[inline]
    pub fn smoothing_radius(&self) -> f32 {
        self.props.smoothing_radius
    }

    #[inline]
    pub fn timestep(&self) -> f32 {
        self.props.timestep
    }
}

/// What the display layer needs to draw a particle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderPoint {
    pub position: Vec2,
    pub color: [f32; 3],
}

/// Stable reference to a particle.
///
/// Carries the store generation it was issued in; a clear bumps the
/// generation so old handles stop resolving instead of pointing at a
/// different particle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParticleHandle {
    pub index: u32,
    pub generation: u32,
}

/// Append-only particle collection; order is insertion order
#[derive(Clone, Debug)]
pub struct ParticleStore {
    particles: Vec<Particle>,
    capacity: usize,
    generation: u32,
}

impl ParticleStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: Vec::with_capacity(capacity.min(MAX_PARTICLES)),
            capacity,
            generation: 0,
        }
    }

    /// Append a particle, or reject without mutating when full
    pub fn push(&mut self, particle: Particle) -> SimResult<ParticleHandle> {
        if self.is_full() {
            return Err(SimError::CapacityExceeded { max: self.capacity });
        }
        let index = self.particles.len() as u32;
        self.particles.push(particle);
        Ok(ParticleHandle {
            index,
            generation: self.generation,
        })
    }

    /// Empty the store and invalidate every outstanding handle
    pub fn clear(&mut self) {
        self.particles.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.particles.len() >= self.capacity
    }

    /// How many more particles fit
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.particles.len())
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Handle for the particle currently at `index`
    pub fn handle(&self, index: usize) -> Option<ParticleHandle> {
        (index < self.particles.len()).then(|| ParticleHandle {
            index: index as u32,
            generation: self.generation,
        })
    }

    /// Index a handle points to, if it is still valid
    pub fn resolve_index(&self, handle: ParticleHandle) -> Option<usize> {
        let index = handle.index as usize;
        (handle.generation == self.generation && index < self.particles.len()).then_some(index)
    }

    pub fn resolve(&self, handle: ParticleHandle) -> Option<&Particle> {
        self.resolve_index(handle).map(|index| &self.particles[index])
    }

    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    /// Positions and colors in store order
    pub fn render_points(&self) -> impl Iterator<Item = RenderPoint> + '_ {
        self.particles.iter().map(|p| RenderPoint {
            position: p.position,
            color: p.color,
        })
    }

    /// Smoothing radii of all particles (with repeats)
    pub fn radii(&self) -> impl Iterator<Item = f32> + '_ {
        self.particles.iter().map(Particle::smoothing_radius)
    }

    /// Nearest particle within `radius` of `point`; ties go to the lower index
    pub fn nearest_within(&self, point: Vec2, radius: f32) -> Option<usize> {
        let limit = radius * radius;
        let mut best: Option<(usize, f32)> = None;
        for (index, particle) in self.particles.iter().enumerate() {
            let d2 = particle.position.distance_squared(point);
            if d2 <= limit && best.map_or(true, |(_, best_d2)| d2 < best_d2) {
                best = Some((index, d2));
            }
        }
        best.map(|(index, _)| index)
    }

    /// Mutable access for tick-boundary edits (explosions)
    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Particle> {
        self.particles.iter_mut()
    }

    pub(crate) fn snapshot(&self) -> Vec<Particle> {
        self.particles.clone()
    }

    /// Swap in a recorded particle vector from an earlier tick.
    ///
    /// History is truncated on every spawn and clear, so a recorded
    /// vector always holds the same particles in the same order.
    pub(crate) fn restore(&mut self, particles: Vec<Particle>) {
        debug_assert_eq!(particles.len(), self.particles.len());
        self.particles = particles;
    }
}

impl Default for ParticleStore {
    fn default() -> Self {
        Self::new(MAX_PARTICLES)
    }
}
