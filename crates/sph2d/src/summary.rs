//! Aggregate statistics of the current particle state

use serde::{Deserialize, Serialize};
use sph2d_core::Simulation;

/// Snapshot statistics for logging and reports
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateSummary {
    pub tick: u64,
    pub particles: usize,
    pub mean_density: f32,
    pub min_density: f32,
    pub max_density: f32,
    pub max_speed: f32,
    /// Sum of `0.5 · m · |v|²`
    pub kinetic_energy: f32,
}

impl StateSummary {
    pub fn capture(sim: &Simulation) -> Self {
        let particles = sim.particles();
        if particles.is_empty() {
            return Self {
                tick: sim.tick_count(),
                ..Self::default()
            };
        }

        let mut summary = Self {
            tick: sim.tick_count(),
            particles: particles.len(),
            min_density: f32::INFINITY,
            max_density: f32::NEG_INFINITY,
            ..Self::default()
        };

        let mut density_sum = 0.0;
        for p in particles {
            density_sum += p.density;
            summary.min_density = summary.min_density.min(p.density);
            summary.max_density = summary.max_density.max(p.density);
            summary.max_speed = summary.max_speed.max(p.velocity.length());
            summary.kinetic_energy += 0.5 * p.mass() * p.velocity.length_squared();
        }
        summary.mean_density = density_sum / particles.len() as f32;
        summary
    }
}

impl std::fmt::Display for StateSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "tick {} | {} particles | density {:.5} (min {:.5}, max {:.5}) | max speed {:.1} | KE {:.1}",
            self.tick,
            self.particles,
            self.mean_density,
            self.min_density,
            self.max_density,
            self.max_speed,
            self.kinetic_energy
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sph2d_core::{SimParams, SpeciesId, SpeciesTable};

    #[test]
    fn test_empty_summary() {
        let sim = Simulation::new(SpeciesTable::new(), SimParams::default()).unwrap();
        let summary = StateSummary::capture(&sim);
        assert_eq!(summary.particles, 0);
        assert_eq!(summary.kinetic_energy, 0.0);
    }

    #[test]
    fn test_summary_after_step() {
        let mut sim = Simulation::new(SpeciesTable::new(), SimParams::default()).unwrap();
        sim.spawn(600.0, 450.0, SpeciesId::WATER).unwrap();
        sim.spawn(608.0, 450.0, SpeciesId::WATER).unwrap();
        sim.step_forward().unwrap();

        let summary = StateSummary::capture(&sim);
        assert_eq!(summary.tick, 1);
        assert_eq!(summary.particles, 2);
        assert!(summary.min_density > 0.0);
        assert!(summary.min_density <= summary.mean_density);
        assert!(summary.mean_density <= summary.max_density);
        assert!(summary.kinetic_energy > 0.0);
    }
}
