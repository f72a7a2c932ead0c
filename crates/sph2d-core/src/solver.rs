//! Density/pressure and force passes
//!
//! Both passes are brute-force O(n²) scans with a strict `r² < H²` cutoff.
//! Every pair term uses the *receiving* particle's kernel radius and
//! constants, so mixed species never borrow each other's mass or viscosity.

use glam::Vec2;

use crate::error::SimResult;
use crate::kernel::{KernelCache, KernelConstants};
use crate::particle::Particle;

/// Separation below which two particles count as coincident
pub const MIN_DISTANCE: f32 = 1e-6;

/// Per-particle force decomposition from the last force pass
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ForceBreakdown {
    pub gravity: Vec2,
    pub pressure: Vec2,
    pub viscosity: Vec2,
}

impl ForceBreakdown {
    pub fn total(&self) -> Vec2 {
        self.gravity + self.pressure + self.viscosity
    }
}

/// Kernel constants for each particle's own radius, in store order
pub fn resolve_kernels(
    particles: &[Particle],
    cache: &mut KernelCache,
) -> SimResult<Vec<KernelConstants>> {
    particles
        .iter()
        .map(|p| cache.get_or_insert(p.smoothing_radius()))
        .collect()
}

/// Density from all neighbors (self included), then pressure from the
/// equation of state. Pressure is left unclamped: below rest density it
/// goes negative and pulls particles together.
pub fn compute_density_pressure(particles: &mut [Particle], kernels: &[KernelConstants]) {
    debug_assert_eq!(particles.len(), kernels.len());

    for i in 0..particles.len() {
        let xi = particles[i].position;
        let kernel = &kernels[i];

        let mut density = 0.0;
        for pj in particles.iter() {
            let r2 = xi.distance_squared(pj.position);
            density += pj.mass() * kernel.density_weight(r2);
        }

        let pi = &mut particles[i];
        let props = *pi.props();
        pi.density = density;
        pi.pressure = props.gas_constant * (density - props.rest_density);
    }
}

/// Pressure, viscosity and gravity forces. Writes `force` on every particle
/// and returns the decomposition in store order.
///
/// Reads densities and pressures, so [`compute_density_pressure`] must run
/// first within the same tick.
pub fn compute_forces(
    particles: &mut [Particle],
    kernels: &[KernelConstants],
    gravity: Vec2,
) -> Vec<ForceBreakdown> {
    debug_assert_eq!(particles.len(), kernels.len());

    let mut breakdowns = Vec::with_capacity(particles.len());

    for i in 0..particles.len() {
        let breakdown = pair_forces(particles, i, &kernels[i], gravity);
        particles[i].force = breakdown.total();
        breakdowns.push(breakdown);
    }

    breakdowns
}

fn pair_forces(
    particles: &[Particle],
    i: usize,
    kernel: &KernelConstants,
    gravity: Vec2,
) -> ForceBreakdown {
    let pi = &particles[i];
    let mass = pi.mass();
    let viscosity = pi.props().viscosity;

    let mut pressure_force = Vec2::ZERO;
    let mut viscosity_force = Vec2::ZERO;

    for (j, pj) in particles.iter().enumerate() {
        if i == j {
            continue;
        }

        let rij = pj.position - pi.position;
        let r2 = rij.length_squared();
        if r2 >= kernel.hsq {
            continue;
        }

        let r = r2.sqrt().max(MIN_DISTANCE);
        // Coincident pairs have no direction to push along
        let direction = if r2 > 0.0 { rij / r } else { Vec2::ZERO };
        let falloff = kernel.h - r;

        // spiky_grad < 0: positive shared pressure points away from j
        let shared_pressure = (pi.pressure + pj.pressure) * 0.5;
        pressure_force += direction * mass * shared_pressure / pj.density
            * kernel.spiky_grad
            * falloff.powi(3);

        viscosity_force +=
            viscosity * mass * (pj.velocity - pi.velocity) / pj.density * kernel.visc_lap * falloff;
    }

    ForceBreakdown {
        gravity: gravity * pi.density,
        pressure: pressure_force,
        viscosity: viscosity_force,
    }
}
