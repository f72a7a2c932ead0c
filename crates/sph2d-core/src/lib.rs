//! Core SPH fluid simulation: particles, kernels, forces and stepping

pub mod domain;
pub mod driver;
pub mod error;
pub mod history;
pub mod integrator;
pub mod kernel;
pub mod particle;
pub mod selection;
pub mod solver;
pub mod tools;

pub use domain::Domain;
pub use driver::{RunState, SimParams, Simulation, DEFAULT_GRAVITY};
pub use error::{SimError, SimResult};
pub use particle::{Particle, ParticleHandle, ParticleStore, RenderPoint, MAX_PARTICLES};
pub use selection::{SelectionSnapshot, SelectionState};
pub use solver::ForceBreakdown;

pub use sph2d_species::{SpeciesDef, SpeciesId, SpeciesTable};
