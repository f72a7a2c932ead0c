//! Error types for sph2d-core

use glam::Vec2;
use sph2d_species::SpeciesError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("particle store is full ({max} particles)")]
    CapacityExceeded { max: usize },

    #[error("unknown species id {0}")]
    UnknownSpecies(u16),

    #[error("smoothing radius must be positive and finite, got {0}")]
    InvalidRadius(f32),

    #[error("invalid domain: {0}")]
    InvalidDomain(String),

    #[error("invalid simulation parameters: {0}")]
    InvalidParams(String),

    #[error("spawn state must be finite, got position {position} velocity {velocity}")]
    InvalidPosition { position: Vec2, velocity: Vec2 },

    #[error("invalid species preset: {0}")]
    InvalidSpecies(#[from] SpeciesError),
}

pub type SimResult<T> = std::result::Result<T, SimError>;
