//! Selected-particle diagnostics
//!
//! The display layer shows velocity and the force decomposition of one
//! particle. The snapshot is refreshed by the driver after every force pass
//! and on every back-step.

use glam::Vec2;

use crate::particle::{ParticleHandle, ParticleStore};
use crate::solver::ForceBreakdown;

/// Read-only copy of one particle's motion and forces
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SelectionSnapshot {
    pub velocity: Vec2,
    pub total_force: Vec2,
    pub gravity_force: Vec2,
    pub viscosity_force: Vec2,
    pub pressure_force: Vec2,
}

#[derive(Clone, Debug, Default)]
pub struct SelectionState {
    handle: Option<ParticleHandle>,
    snapshot: Option<SelectionSnapshot>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn select(&mut self, handle: ParticleHandle) {
        self.handle = Some(handle);
        self.snapshot = None;
    }

    pub(crate) fn clear(&mut self) {
        self.handle = None;
        self.snapshot = None;
    }

    pub fn handle(&self) -> Option<ParticleHandle> {
        self.handle
    }

    pub fn snapshot(&self) -> Option<&SelectionSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    /// Re-read the selected particle. A handle that no longer resolves is
    /// dropped without error.
    ///
    /// `breakdowns` may be shorter than the store when particles were
    /// spawned after the last force pass; those read as zero force.
    pub(crate) fn refresh(&mut self, store: &ParticleStore, breakdowns: &[ForceBreakdown]) {
        let Some(handle) = self.handle else {
            self.snapshot = None;
            return;
        };

        let Some(index) = store.resolve_index(handle) else {
            log::debug!("Selected particle {:?} no longer exists, clearing", handle);
            self.clear();
            return;
        };

        let particle = &store.as_slice()[index];
        let forces = breakdowns.get(index).copied().unwrap_or_default();
        self.snapshot = Some(SelectionSnapshot {
            velocity: particle.velocity,
            total_force: forces.total(),
            gravity_force: forces.gravity,
            viscosity_force: forces.viscosity,
            pressure_force: forces.pressure,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::Particle;
    use sph2d_species::SpeciesDef;

    fn store_with(n: usize) -> ParticleStore {
        let def = SpeciesDef::default();
        let mut store = ParticleStore::new(16);
        for i in 0..n {
            let p = Particle::new(Vec2::new(i as f32, 0.0), &def)
                .with_velocity(Vec2::new(0.0, i as f32));
            store.push(p).unwrap();
        }
        store
    }

    #[test]
    fn test_no_selection_no_snapshot() {
        let store = store_with(2);
        let mut selection = SelectionState::new();
        selection.refresh(&store, &[]);
        assert!(!selection.is_active());
        assert!(selection.snapshot().is_none());
    }

    #[test]
    fn test_snapshot_copies_breakdown() {
        let store = store_with(2);
        let breakdowns = vec![
            ForceBreakdown::default(),
            ForceBreakdown {
                gravity: Vec2::new(0.0, -1.0),
                pressure: Vec2::new(2.0, 0.0),
                viscosity: Vec2::new(0.5, 0.5),
            },
        ];

        let mut selection = SelectionState::new();
        selection.select(store.handle(1).unwrap());
        selection.refresh(&store, &breakdowns);

        let snapshot = selection.snapshot().unwrap();
        assert_eq!(snapshot.velocity, Vec2::new(0.0, 1.0));
        assert_eq!(snapshot.gravity_force, Vec2::new(0.0, -1.0));
        assert_eq!(snapshot.pressure_force, Vec2::new(2.0, 0.0));
        assert_eq!(snapshot.viscosity_force, Vec2::new(0.5, 0.5));
        assert_eq!(snapshot.total_force, Vec2::new(2.5, -0.5));
    }

    #[test]
    fn test_missing_breakdown_reads_zero() {
        let store = store_with(3);
        let mut selection = SelectionState::new();
        selection.select(store.handle(2).unwrap());
        selection.refresh(&store, &[ForceBreakdown::default()]);
        assert_eq!(selection.snapshot().unwrap().total_force, Vec2::ZERO);
    }

    #[test]
    fn test_stale_handle_clears_silently() {
        let mut store = store_with(2);
        let mut selection = SelectionState::new();
        selection.select(store.handle(0).unwrap());
        selection.refresh(&store, &[]);
        assert!(selection.snapshot().is_some());

        store.clear();
        selection.refresh(&store, &[]);
        assert!(!selection.is_active());
        assert!(selection.snapshot().is_none());
    }
}
