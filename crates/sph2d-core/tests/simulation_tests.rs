//! End-to-end tests for the simulation driver
//!
//! These run complete ticks through `Simulation`, so they cover the solver,
//! integrator, selection and history together.

use glam::Vec2;
use sph2d_core::{
    Domain, RunState, SimError, SimParams, Simulation, SpeciesDef, SpeciesId, SpeciesTable,
    MAX_PARTICLES,
};

fn sim_with(params: SimParams) -> Simulation {
    Simulation::new(SpeciesTable::new(), params).unwrap()
}

fn sim() -> Simulation {
    sim_with(SimParams::default())
}

fn weightless() -> Simulation {
    sim_with(SimParams {
        gravity_enabled: false,
        ..SimParams::default()
    })
}

/// Density a particle sees from itself alone
fn self_density(def: &SpeciesDef) -> f32 {
    let h = def.smoothing_radius;
    def.mass * 4.0 / (std::f32::consts::PI * h * h)
}

// ============================================================================
// Density and Pressure
// ============================================================================

#[test]
fn test_density_at_least_self_contribution() {
    let mut sim = sim();
    sim.spawn_dam(SpeciesId::WATER).unwrap();
    sim.step_forward().unwrap();

    let water = sim.species().get(SpeciesId::WATER).unwrap().clone();
    let floor = self_density(&water) * 0.999;
    for p in sim.particles() {
        assert!(p.density > 0.0);
        assert!(p.density >= floor, "density {} below {}", p.density, floor);
    }
}

#[test]
fn test_pressure_follows_equation_of_state() {
    let mut sim = sim();
    sim.spawn_block(Vec2::new(600.0, 450.0), SpeciesId::HONEY)
        .unwrap();
    sim.step_forward().unwrap();

    for p in sim.particles() {
        let props = p.props();
        let expected = props.gas_constant * (p.density - props.rest_density);
        assert!(
            (p.pressure - expected).abs() <= expected.abs() * 1e-6 + 1e-6,
            "pressure {} != {}",
            p.pressure,
            expected
        );
    }
}

#[test]
fn test_isolated_particle_has_negative_pressure() {
    let mut sim = weightless();
    sim.spawn(600.0, 450.0, SpeciesId::WATER).unwrap();
    sim.step_forward().unwrap();

    let p = &sim.particles()[0];
    assert!(p.density < p.props().rest_density);
    assert!(p.pressure < 0.0);
    // Nothing to push or pull against
    assert_eq!(p.velocity, Vec2::ZERO);
}

// ============================================================================
// Forces
// ============================================================================

#[test]
fn test_two_particles_sense_each_other() {
    let mut sim = weightless();
    sim.spawn(600.0, 450.0, SpeciesId::WATER).unwrap();
    sim.spawn(608.0, 450.0, SpeciesId::WATER).unwrap();
    sim.step_forward().unwrap();

    let water = sim.species().get(SpeciesId::WATER).unwrap().clone();
    let alone = self_density(&water);
    let (a, b) = (&sim.particles()[0], &sim.particles()[1]);
    assert!(a.density > alone);
    assert!(b.density > alone);

    // Forces act along the x axis only
    assert!(a.velocity.x != 0.0);
    assert!(a.velocity.y.abs() < 1e-6);
}

#[test]
fn test_pair_momentum_cancels_without_gravity() {
    let mut sim = weightless();
    sim.spawn(600.0, 450.0, SpeciesId::WATER).unwrap();
    sim.spawn(610.0, 455.0, SpeciesId::WATER).unwrap();
    sim.large_step_forward().unwrap();

    let momentum: Vec2 = sim
        .particles()
        .iter()
        .map(|p| p.mass() * p.velocity)
        .sum();
    let scale = sim.particles()[0].mass() * sim.particles()[0].velocity.length();
    assert!(scale > 0.0);
    assert!(
        momentum.length() <= scale * 1e-3,
        "net momentum {:?} vs {}",
        momentum,
        scale
    );
}

#[test]
fn test_gravity_pulls_down() {
    let mut sim = sim();
    sim.spawn(600.0, 450.0, SpeciesId::WATER).unwrap();
    sim.step_forward().unwrap();

    let p = &sim.particles()[0];
    assert!(p.velocity.y < 0.0);
    assert!(p.position.y < 450.0);
    assert_eq!(p.velocity.x, 0.0);
}

#[test]
fn test_selection_reports_force_breakdown() {
    let mut sim = sim();
    sim.spawn(600.0, 450.0, SpeciesId::WATER).unwrap();
    let handle = sim.spawn(610.0, 450.0, SpeciesId::WATER).unwrap();
    assert!(sim.select(handle));
    sim.step_forward().unwrap();

    let snapshot = *sim.selection().snapshot().unwrap();
    let p = &sim.particles()[1];
    assert_eq!(snapshot.velocity, p.velocity);
    assert_eq!(snapshot.gravity_force, sim.gravity() * p.density);
    assert_eq!(
        snapshot.total_force,
        snapshot.gravity_force + snapshot.pressure_force + snapshot.viscosity_force
    );
    assert!(snapshot.pressure_force.x != 0.0);
}

// ============================================================================
// Boundary
// ============================================================================

#[test]
fn test_particle_thrown_at_wall_bounces() {
    let domain = Domain::new(200.0, 200.0, 10.0, 0.5).unwrap();
    let mut sim = sim_with(SimParams {
        domain,
        gravity_enabled: false,
        ..SimParams::default()
    });
    // One tick of water moves 0.0007 · 20000 = 14 units, past the wall at 190
    sim.spawn_with_velocity(Vec2::new(185.0, 100.0), Vec2::new(20_000.0, 0.0), SpeciesId::WATER)
        .unwrap();
    sim.step_forward().unwrap();

    let p = &sim.particles()[0];
    assert_eq!(p.position.x, 190.0);
    assert_eq!(p.velocity.x, -10_000.0);
}

#[test]
fn test_dam_stays_inside_domain() {
    let mut sim = sim_with(SimParams {
        dam_particles: 200,
        ..SimParams::default()
    });
    sim.spawn_dam(SpeciesId::WATER).unwrap();
    for _ in 0..5 {
        sim.large_step_forward().unwrap();
    }

    let domain = *sim.domain();
    for p in sim.particles() {
        assert!(p.position.is_finite());
        assert!(domain.contains(p.position), "{:?} escaped", p.position);
    }
}

#[test]
fn test_shrinking_domain_clamps_particles() {
    let mut sim = weightless();
    sim.spawn(1000.0, 800.0, SpeciesId::WATER).unwrap();
    sim.resize_window(400, 300).unwrap();
    sim.step_forward().unwrap();

    let domain = *sim.domain();
    assert!(domain.contains(sim.particles()[0].position));
}

// ============================================================================
// Spawning and Clearing
// ============================================================================

#[test]
fn test_spawn_copies_preset() {
    let mut sim = sim();
    for id in [SpeciesId::WATER, SpeciesId::OIL, SpeciesId::MERCURY] {
        sim.spawn(100.0, 100.0, id).unwrap();
    }

    for p in sim.particles() {
        let def = sim.species().get(p.species()).unwrap();
        assert_eq!(*p.props(), def.props());
        assert_eq!(p.color(), def.color);
        assert_eq!(p.velocity, Vec2::ZERO);
    }
}

#[test]
fn test_capacity_rejects_without_mutation() {
    let mut sim = sim_with(SimParams {
        max_particles: 3,
        ..SimParams::default()
    });
    for i in 0..3 {
        sim.spawn(100.0 + i as f32 * 20.0, 100.0, SpeciesId::WATER)
            .unwrap();
    }

    let result = sim.spawn(300.0, 100.0, SpeciesId::WATER);
    assert!(matches!(result, Err(SimError::CapacityExceeded { max: 3 })));
    assert_eq!(sim.len(), 3);

    // Bulk spawns stop at the limit instead of failing
    assert_eq!(sim.spawn_block(Vec2::new(600.0, 450.0), SpeciesId::WATER).unwrap(), 0);
}

#[test]
fn test_store_never_exceeds_particle_limit() {
    let oversized = SimParams {
        max_particles: MAX_PARTICLES + 10,
        ..SimParams::default()
    };
    assert!(matches!(
        Simulation::new(SpeciesTable::new(), oversized),
        Err(SimError::InvalidParams(_))
    ));

    let mut sim = sim();
    for i in 0..MAX_PARTICLES {
        let x = 20.0 + (i % 50) as f32 * 20.0;
        let y = 20.0 + (i / 50) as f32 * 15.0;
        sim.spawn(x, y, SpeciesId::GAS).unwrap();
    }
    assert_eq!(sim.len(), MAX_PARTICLES);

    let result = sim.spawn(600.0, 450.0, SpeciesId::GAS);
    assert!(matches!(result, Err(SimError::CapacityExceeded { max }) if max == MAX_PARTICLES));
    assert_eq!(sim.len(), MAX_PARTICLES);
}

#[test]
fn test_non_finite_spawn_is_rejected() {
    let mut sim = sim();
    sim.spawn(100.0, 100.0, SpeciesId::WATER).unwrap();

    assert!(matches!(
        sim.spawn(f32::NAN, 100.0, SpeciesId::WATER),
        Err(SimError::InvalidPosition { .. })
    ));
    assert!(matches!(
        sim.spawn(100.0, f32::INFINITY, SpeciesId::WATER),
        Err(SimError::InvalidPosition { .. })
    ));
    assert!(matches!(
        sim.spawn_with_velocity(
            Vec2::new(120.0, 100.0),
            Vec2::new(0.0, f32::NAN),
            SpeciesId::WATER
        ),
        Err(SimError::InvalidPosition { .. })
    ));
    assert_eq!(sim.len(), 1);

    // Every remaining particle keeps a density above zero
    sim.step_forward().unwrap();
    for p in sim.particles() {
        assert!(p.density > 0.0);
        assert!(p.position.is_finite());
    }
}

#[test]
fn test_block_stops_at_capacity() {
    let mut sim = sim_with(SimParams {
        max_particles: 100,
        ..SimParams::default()
    });
    let spawned = sim
        .spawn_block(Vec2::new(600.0, 450.0), SpeciesId::WATER)
        .unwrap();
    assert_eq!(spawned, 100);
    assert_eq!(sim.len(), 100);
}

#[test]
fn test_clear_is_idempotent_and_drops_selection() {
    let mut sim = sim();
    let handle = sim.spawn(100.0, 100.0, SpeciesId::WATER).unwrap();
    sim.select(handle);
    sim.start();
    sim.advance().unwrap();

    sim.clear();
    assert!(sim.is_empty());
    assert!(!sim.selection().is_active());
    assert_eq!(sim.run_state(), RunState::Stopped);
    assert_eq!(sim.history_len(), 0);

    sim.clear();
    assert!(sim.is_empty());
    assert!(!sim.selection().is_active());
}

#[test]
fn test_spawning_is_deterministic_per_seed() {
    let mut a = sim();
    let mut b = sim();
    a.spawn_block(Vec2::new(500.0, 500.0), SpeciesId::OIL).unwrap();
    b.spawn_block(Vec2::new(500.0, 500.0), SpeciesId::OIL).unwrap();
    a.large_step_forward().unwrap();
    b.large_step_forward().unwrap();
    assert_eq!(a.particles(), b.particles());
}

// ============================================================================
// History
// ============================================================================

#[test]
fn test_step_back_restores_exact_state() {
    let mut sim = sim();
    sim.spawn_block(Vec2::new(600.0, 450.0), SpeciesId::WATER)
        .unwrap();
    sim.step_forward().unwrap();
    sim.step_forward().unwrap();
    let recorded = sim.particles().to_vec();

    sim.step_forward().unwrap();
    sim.step_forward().unwrap();
    sim.step_forward().unwrap();
    assert_ne!(sim.particles(), recorded.as_slice());

    assert_eq!(sim.step_back(), 1);
    assert_eq!(sim.step_back(), 1);
    assert_eq!(sim.step_back(), 1);
    assert_eq!(sim.particles(), recorded.as_slice());
    assert_eq!(sim.tick_count(), 2);
}

#[test]
fn test_large_step_back_is_bounded_by_history() {
    let mut sim = sim_with(SimParams {
        history_capacity: 4,
        ..SimParams::default()
    });
    sim.spawn(600.0, 450.0, SpeciesId::WATER).unwrap();
    sim.large_step_forward().unwrap();
    assert_eq!(sim.tick_count(), 10);

    assert_eq!(sim.large_step_back(), 4);
    assert_eq!(sim.tick_count(), 6);
    assert_eq!(sim.large_step_back(), 0);
}

#[test]
fn test_step_back_refreshes_selection() {
    let mut sim = sim();
    let handle = sim.spawn(600.0, 450.0, SpeciesId::WATER).unwrap();
    sim.select(handle);
    sim.step_forward().unwrap();
    let first = *sim.selection().snapshot().unwrap();
    sim.step_forward().unwrap();
    assert_ne!(*sim.selection().snapshot().unwrap(), first);

    sim.step_back();
    assert_eq!(*sim.selection().snapshot().unwrap(), first);
}
