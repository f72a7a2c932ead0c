//! Species validation errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpeciesError {
    #[error("species '{species}': {field} must be positive and finite, got {value}")]
    NonPositive {
        species: String,
        field: &'static str,
        value: f32,
    },

    #[error("species '{species}': {field} must be non-negative and finite, got {value}")]
    Negative {
        species: String,
        field: &'static str,
        value: f32,
    },

    #[error("species '{species}': color channel {channel} out of [0, 1]: {value}")]
    ColorOutOfRange {
        species: String,
        channel: usize,
        value: f32,
    },

    #[error("species at index {index} has id {found}; ids must match their table position")]
    IdMismatch { index: usize, found: u16 },

    #[error("species table is empty")]
    Empty,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

pub type Result<T> = std::result::Result<T, SpeciesError>;
