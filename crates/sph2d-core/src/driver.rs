//! Simulation driver - owns all particle state and runs ticks

use glam::Vec2;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use serde::{Deserialize, Serialize};
use sph2d_species::{SpeciesDef, SpeciesTable};

use crate::domain::Domain;
use crate::error::{SimError, SimResult};
use crate::history::{History, HistoryEntry, DEFAULT_HISTORY_CAPACITY};
use crate::integrator::integrate;
use crate::kernel::KernelCache;
use crate::particle::{Particle, ParticleHandle, ParticleStore, RenderPoint, MAX_PARTICLES};
use crate::selection::SelectionState;
use crate::solver::{self, ForceBreakdown};
use crate::tools::{self, BLOCK_SPACING};

/// Default gravity, on the kernel-sum density scale of the built-in species
pub const DEFAULT_GRAVITY: Vec2 = Vec2::new(0.0, -2.5e5);

/// Playback state of the simulation loop
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    #[default]
    Stopped,
    Running,
    Paused,
}

/// Construction parameters for [`Simulation`]
#[derive(Clone, Debug, PartialEq)]
pub struct SimParams {
    pub domain: Domain,
    /// Window pixels to view units, used by [`Simulation::resize_window`]
    pub view_scale: f32,
    pub gravity: Vec2,
    pub gravity_enabled: bool,
    pub max_particles: usize,
    pub dam_particles: usize,
    pub block_particles: usize,
    pub large_step: usize,
    pub history_capacity: usize,
    pub ticks_per_frame: usize,
    pub pick_radius: f32,
    /// Seed for spawn jitter
    pub seed: u64,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            domain: Domain::default(),
            view_scale: 1.5,
            gravity: DEFAULT_GRAVITY,
            gravity_enabled: true,
            max_particles: MAX_PARTICLES,
            dam_particles: 500,
            block_particles: 250,
            large_step: 10,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            ticks_per_frame: 1,
            pick_radius: 16.0,
            seed: 0x5eed,
        }
    }
}

impl SimParams {
    pub fn validate(&self) -> SimResult<()> {
        self.domain.validate()?;
        if self.max_particles > MAX_PARTICLES {
            return Err(SimError::InvalidParams(format!(
                "max_particles {} exceeds the limit of {}",
                self.max_particles, MAX_PARTICLES
            )));
        }
        if !self.pick_radius.is_finite() || self.pick_radius < 0.0 {
            return Err(SimError::InvalidParams(format!(
                "pick_radius must be finite and non-negative, got {}",
                self.pick_radius
            )));
        }
        if self.ticks_per_frame == 0 {
            return Err(SimError::InvalidParams(
                "ticks_per_frame must be at least 1".to_string(),
            ));
        }
        if !self.view_scale.is_finite() || self.view_scale <= 0.0 {
            return Err(SimError::InvalidParams(format!(
                "view_scale must be positive, got {}",
                self.view_scale
            )));
        }
        if !self.gravity.is_finite() {
            return Err(SimError::InvalidParams(format!(
                "gravity must be finite, got {}",
                self.gravity
            )));
        }
        Ok(())
    }
}

pub struct Simulation {
    species: SpeciesTable,
    store: ParticleStore,
    kernels: KernelCache,
    /// Force decomposition from the last force pass, in store order
    breakdowns: Vec<ForceBreakdown>,
    selection: SelectionState,
    history: History,
    params: SimParams,
    run_state: RunState,
    tick: u64,
    rng: Xoshiro256StarStar,
}

impl Simulation {
    /// Build a simulation. Every species and parameter is validated here,
    /// so nothing physical can fail once ticks run.
    pub fn new(species: SpeciesTable, params: SimParams) -> SimResult<Self> {
        params.validate()?;
        if species.is_empty() {
            return Err(SimError::InvalidSpecies(sph2d_species::SpeciesError::Empty));
        }

        let mut kernels = KernelCache::new();
        for def in species.iter() {
            def.validate()?;
            kernels.get_or_insert(def.smoothing_radius)?;
        }

        log::info!(
            "Simulation ready: {} species, {}x{} domain, capacity {}",
            species.len(),
            params.domain.width,
            params.domain.height,
            params.max_particles
        );

        Ok(Self {
            species,
            store: ParticleStore::new(params.max_particles),
            kernels,
            breakdowns: Vec::new(),
            selection: SelectionState::new(),
            history: History::new(params.history_capacity),
            rng: Xoshiro256StarStar::seed_from_u64(params.seed),
            params,
            run_state: RunState::Stopped,
            tick: 0,
        })
    }

    // ---- Read access ----

    pub fn species(&self) -> &SpeciesTable {
        &self.species
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn domain(&self) -> &Domain {
        &self.params.domain
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Ticks executed since the last clear
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        self.store.as_slice()
    }

    pub fn store(&self) -> &ParticleStore {
        &self.store
    }

    pub fn render_points(&self) -> impl Iterator<Item = RenderPoint> + '_ {
        self.store.render_points()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Force decomposition from the last force pass
    pub fn breakdowns(&self) -> &[ForceBreakdown] {
        &self.breakdowns
    }

    /// Number of ticks that can currently be rewound
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Gravity applied by the next tick
    pub fn gravity(&self) -> Vec2 {
        if self.params.gravity_enabled {
            self.params.gravity
        } else {
            Vec2::ZERO
        }
    }

    pub fn gravity_enabled(&self) -> bool {
        self.params.gravity_enabled
    }

    // ---- Spawning ----

    pub fn spawn(&mut self, x: f32, y: f32, species: u16) -> SimResult<ParticleHandle> {
        self.spawn_with_velocity(Vec2::new(x, y), Vec2::ZERO, species)
    }

    pub fn spawn_with_velocity(
        &mut self,
        position: Vec2,
        velocity: Vec2,
        species: u16,
    ) -> SimResult<ParticleHandle> {
        if !position.is_finite() || !velocity.is_finite() {
            log::warn!("Spawn rejected: non-finite position {} or velocity {}", position, velocity);
            return Err(SimError::InvalidPosition { position, velocity });
        }
        let def = self.species_def(species)?;
        let particle = Particle::new(position, def).with_velocity(velocity);

        match self.store.push(particle) {
            Ok(handle) => {
                self.history.clear();
                Ok(handle)
            }
            Err(e) => {
                log::warn!("Spawn rejected: {}", e);
                Err(e)
            }
        }
    }

    /// Square block of `block_particles` around `center`. Stops at capacity
    /// and returns how many were spawned.
    pub fn spawn_block(&mut self, center: Vec2, species: u16) -> SimResult<usize> {
        if !center.is_finite() {
            return Err(SimError::InvalidPosition {
                position: center,
                velocity: Vec2::ZERO,
            });
        }
        let spacing = self.species_def(species)?.smoothing_radius * BLOCK_SPACING;
        let positions =
            tools::block_positions(center, self.params.block_particles, spacing, &mut self.rng);
        let spawned = self.spawn_all(&positions, species)?;
        log::info!("Spawned block of {} particles at {}", spawned, center);
        Ok(spawned)
    }

    /// Column of `dam_particles` resting on the floor
    pub fn spawn_dam(&mut self, species: u16) -> SimResult<usize> {
        let spacing = self.species_def(species)?.smoothing_radius;
        let positions = tools::dam_positions(
            &self.params.domain,
            self.params.dam_particles,
            spacing,
            &mut self.rng,
        );
        let spawned = self.spawn_all(&positions, species)?;
        log::info!("Spawned dam of {} particles", spawned);
        Ok(spawned)
    }

    fn spawn_all(&mut self, positions: &[Vec2], species: u16) -> SimResult<usize> {
        let def = self.species_def(species)?.clone();
        let mut spawned = 0;
        for &position in positions {
            if self.store.push(Particle::new(position, &def)).is_err() {
                log::warn!(
                    "Particle limit {} reached, {} of {} spawned",
                    self.store.capacity(),
                    spawned,
                    positions.len()
                );
                break;
            }
            spawned += 1;
        }
        if spawned > 0 {
            self.history.clear();
        }
        Ok(spawned)
    }

    fn species_def(&self, species: u16) -> SimResult<&SpeciesDef> {
        self.species
            .get(species)
            .ok_or(SimError::UnknownSpecies(species))
    }

    /// Radial velocity kick to particles within `radius` of `center`.
    /// Returns the number of particles affected.
    pub fn explode(&mut self, center: Vec2, radius: f32, strength: f32) -> usize {
        if !center.is_finite() || !radius.is_finite() || !strength.is_finite() {
            log::warn!("Ignoring non-finite explosion at {}", center);
            return 0;
        }
        let mut affected = 0;
        for p in self.store.iter_mut() {
            let impulse = tools::explosion_impulse(p.position, center, radius, strength);
            if impulse != Vec2::ZERO {
                p.velocity += impulse;
                affected += 1;
            }
        }
        log::debug!("Explosion at {} moved {} particles", center, affected);
        affected
    }

    /// Remove every particle and stop. Safe to call repeatedly.
    pub fn clear(&mut self) {
        let removed = self.store.len();
        self.store.clear();
        self.breakdowns.clear();
        self.selection.clear();
        self.history.clear();
        self.run_state = RunState::Stopped;
        self.tick = 0;
        log::info!("Cleared {} particles", removed);
    }

    pub fn reset(&mut self) {
        self.clear();
    }

    // ---- Selection ----

    /// Returns false if the handle is stale
    pub fn select(&mut self, handle: ParticleHandle) -> bool {
        if self.store.resolve_index(handle).is_none() {
            log::warn!("Cannot select stale particle {:?}", handle);
            return false;
        }
        self.selection.select(handle);
        self.selection.refresh(&self.store, &self.breakdowns);
        true
    }

    pub fn select_index(&mut self, index: usize) -> bool {
        match self.store.handle(index) {
            Some(handle) => self.select(handle),
            None => {
                log::warn!("Cannot select particle {}: out of range", index);
                false
            }
        }
    }

    /// Select the particle nearest to `point` within the pick radius.
    /// Clears the selection when nothing is in reach.
    pub fn select_at(&mut self, point: Vec2) -> Option<ParticleHandle> {
        let picked = self
            .store
            .nearest_within(point, self.params.pick_radius)
            .and_then(|index| self.store.handle(index));

        match picked {
            Some(handle) => {
                self.select(handle);
            }
            None => self.selection.clear(),
        }
        picked
    }

    pub fn deselect(&mut self) {
        self.selection.clear();
    }

    // ---- Parameters ----

    pub fn set_gravity_enabled(&mut self, enabled: bool) {
        self.params.gravity_enabled = enabled;
        log::info!("Gravity {}", if enabled { "on" } else { "off" });
    }

    /// Non-finite vectors are ignored
    pub fn set_gravity(&mut self, gravity: Vec2) {
        if !gravity.is_finite() {
            log::warn!("Ignoring non-finite gravity {}", gravity);
            return;
        }
        self.params.gravity = gravity;
    }

    /// Replace the domain. Particles outside the new bounds are clamped by
    /// the next integration.
    pub fn set_domain(&mut self, domain: Domain) -> SimResult<()> {
        domain.validate()?;
        self.params.domain = domain;
        log::info!("Domain set to {}x{}", domain.width, domain.height);
        Ok(())
    }

    pub fn resize_window(&mut self, pixel_width: u32, pixel_height: u32) -> SimResult<()> {
        let current = self.params.domain;
        let domain = Domain::from_window(
            pixel_width,
            pixel_height,
            self.params.view_scale,
            current.eps,
            current.damping,
        )?;
        self.set_domain(domain)
    }

    // ---- Run control ----

    pub fn start(&mut self) -> bool {
        self.transition(RunState::Stopped, RunState::Running)
    }

    pub fn pause(&mut self) -> bool {
        self.transition(RunState::Running, RunState::Paused)
    }

    pub fn resume(&mut self) -> bool {
        self.transition(RunState::Paused, RunState::Running)
    }

    /// Pause when running, resume when paused
    pub fn toggle_pause(&mut self) -> bool {
        match self.run_state {
            RunState::Running => self.pause(),
            _ => self.resume(),
        }
    }

    fn transition(&mut self, from: RunState, to: RunState) -> bool {
        if self.run_state != from {
            log::debug!(
                "Ignoring {:?} -> {:?} while {:?}",
                from,
                to,
                self.run_state
            );
            return false;
        }
        self.run_state = to;
        log::info!("Simulation {:?}", to);
        true
    }

    /// Per-frame entry point. Runs `ticks_per_frame` ticks while running.
    pub fn advance(&mut self) -> SimResult<usize> {
        if self.run_state != RunState::Running {
            return Ok(0);
        }
        self.run_ticks(self.params.ticks_per_frame)
    }

    /// Like [`advance`](Self::advance), but never moves the tick count past
    /// `limit`
    pub fn advance_until(&mut self, limit: u64) -> SimResult<usize> {
        if self.run_state != RunState::Running || self.tick >= limit {
            return Ok(0);
        }
        let remaining = usize::try_from(limit - self.tick).unwrap_or(usize::MAX);
        self.run_ticks(self.params.ticks_per_frame.min(remaining))
    }

    /// One tick regardless of run state
    pub fn step_forward(&mut self) -> SimResult<usize> {
        self.run_ticks(1)
    }

    pub fn large_step_forward(&mut self) -> SimResult<usize> {
        self.run_ticks(self.params.large_step)
    }

    /// Rewind one tick. Returns 0 when there is no history.
    pub fn step_back(&mut self) -> usize {
        self.rewind(1)
    }

    pub fn large_step_back(&mut self) -> usize {
        self.rewind(self.params.large_step)
    }

    fn run_ticks(&mut self, count: usize) -> SimResult<usize> {
        for _ in 0..count {
            self.tick()?;
        }
        Ok(count)
    }

    fn rewind(&mut self, count: usize) -> usize {
        let Some((entry, popped)) = self.history.pop_many(count) else {
            log::debug!("Nothing to rewind");
            return 0;
        };

        self.store.restore(entry.particles);
        self.breakdowns = entry.breakdowns;
        self.tick = entry.tick;
        self.selection.refresh(&self.store, &self.breakdowns);
        log::debug!("Rewound {} ticks to tick {}", popped, self.tick);
        popped
    }

    fn tick(&mut self) -> SimResult<()> {
        let kernels = solver::resolve_kernels(self.store.as_slice(), &mut self.kernels)?;

        self.history.push(HistoryEntry {
            tick: self.tick,
            particles: self.store.snapshot(),
            breakdowns: std::mem::take(&mut self.breakdowns),
        });

        let gravity = self.gravity();
        let particles = self.store.as_mut_slice();
        solver::compute_density_pressure(particles, &kernels);
        self.breakdowns = solver::compute_forces(particles, &kernels, gravity);
        let contacts = integrate(particles, &self.params.domain);

        self.selection.refresh(&self.store, &self.breakdowns);
        self.tick += 1;

        log::trace!(
            "Tick {}: {} particles, {} wall contacts",
            self.tick,
            self.store.len(),
            contacts
        );
        Ok(())
    }
}
