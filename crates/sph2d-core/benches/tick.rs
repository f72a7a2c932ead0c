//! Criterion benchmarks for a full simulation tick at several particle counts.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use sph2d_core::{SimParams, Simulation, SpeciesId, SpeciesTable};

fn make_dam(particles: usize) -> Simulation {
    let params = SimParams {
        dam_particles: particles,
        history_capacity: 0,
        ..SimParams::default()
    };
    let mut sim = Simulation::new(SpeciesTable::new(), params).expect("default params are valid");
    sim.spawn_dam(SpeciesId::WATER).expect("water exists");
    sim
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");
    for &count in &[100usize, 500, 1000] {
        let mut sim = make_dam(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| black_box(sim.step_forward().expect("tick")))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_tick);
criterion_main!(benches);
