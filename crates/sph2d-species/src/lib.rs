//! Fluid species presets for sph2d
//!
//! This crate provides the data types particles are spawned from:
//! - Species definitions (SpeciesId, SpeciesDef, SpeciesTable)
//! - The per-particle constant bundle copied at spawn (SpeciesProps)
//! - Validation errors (SpeciesError)

mod error;
mod species;

pub use error::SpeciesError;
pub use species::{SpeciesDef, SpeciesId, SpeciesProps, SpeciesTable};
