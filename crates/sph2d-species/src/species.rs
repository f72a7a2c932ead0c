//! Species definitions and registry

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, SpeciesError};

/// Built-in species IDs
pub struct SpeciesId;

impl SpeciesId {
    pub const WATER: u16 = 0;
    pub const OIL: u16 = 1;
    pub const HONEY: u16 = 2;
    pub const GAS: u16 = 3;
    pub const MERCURY: u16 = 4;
}

/// Physical constants copied into every particle at spawn.
///
/// Particles hold this by value, so editing a table after spawning never
/// changes particles that already exist.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeciesProps {
    /// Particle mass
    pub mass: f32,
    /// Density at which pressure is zero.
    ///
    /// Same scale as the kernel sum: a particle alone reads
    /// `mass · 4 / (π·H²)`, so rest densities here are small numbers.
    pub rest_density: f32,
    /// Stiffness of the equation of state
    pub gas_constant: f32,
    /// Kernel radius (H)
    pub smoothing_radius: f32,
    /// Viscosity coefficient
    pub viscosity: f32,
    /// Integration timestep
    pub timestep: f32,
}

/// Definition of a species preset
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeciesDef {
    pub id: u16,
    pub name: String,

    /// Display color (RGB, each channel in [0, 1])
    pub color: [f32; 3],

    pub rest_density: f32,
    pub gas_constant: f32,
    pub smoothing_radius: f32,
    pub mass: f32,
    pub viscosity: f32,
    pub timestep: f32,
}

impl Default for SpeciesDef {
    fn default() -> Self {
        Self {
            id: 0,
            name: "unknown".to_string(),
            color: [1.0, 0.0, 1.0], // Magenta for missing species
            rest_density: 0.015,
            gas_constant: 4.0e5,
            smoothing_radius: 16.0,
            mass: 2.5,
            viscosity: 250.0,
            timestep: 0.0007,
        }
    }
}

impl SpeciesDef {
    /// The constant bundle a particle of this species carries
    pub fn props(&self) -> SpeciesProps {
        SpeciesProps {
            mass: self.mass,
            rest_density: self.rest_density,
            gas_constant: self.gas_constant,
            smoothing_radius: self.smoothing_radius,
            viscosity: self.viscosity,
            timestep: self.timestep,
        }
    }

    /// Reject presets that would break a tick (zero radius, zero mass, ...)
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("smoothing_radius", self.smoothing_radius),
            ("mass", self.mass),
            ("timestep", self.timestep),
            ("rest_density", self.rest_density),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SpeciesError::NonPositive {
                    species: self.name.clone(),
                    field,
                    value,
                });
            }
        }

        let non_negative = [
            ("gas_constant", self.gas_constant),
            ("viscosity", self.viscosity),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SpeciesError::Negative {
                    species: self.name.clone(),
                    field,
                    value,
                });
            }
        }

        for (channel, &value) in self.color.iter().enumerate() {
            if !(0.0..=1.0).contains(&value) {
                return Err(SpeciesError::ColorOutOfRange {
                    species: self.name.clone(),
                    channel,
                    value,
                });
            }
        }

        Ok(())
    }
}

/// Registry of all species presets
#[derive(Clone, Debug)]
pub struct SpeciesTable {
    species: Vec<SpeciesDef>,
}

impl SpeciesTable {
    pub fn new() -> Self {
        let mut table = Self {
            species: Vec::new(),
        };
        table.register_defaults();
        table
    }

    /// Build a table from custom presets, validating every entry.
    ///
    /// Ids must equal their position so that lookups stay a plain index.
    pub fn from_defs(defs: Vec<SpeciesDef>) -> Result<Self> {
        if defs.is_empty() {
            return Err(SpeciesError::Empty);
        }
        for (index, def) in defs.iter().enumerate() {
            if def.id as usize != index {
                return Err(SpeciesError::IdMismatch {
                    index,
                    found: def.id,
                });
            }
            def.validate()?;
        }
        log::info!("Loaded {} species presets", defs.len());
        Ok(Self { species: defs })
    }

    /// Parse a RON list of presets
    pub fn from_ron_str(source: &str) -> Result<Self> {
        let defs: Vec<SpeciesDef> = ron::from_str(source)?;
        Self::from_defs(defs)
    }

    /// Load presets from a RON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_ron_str(&content)
    }

    fn register_defaults(&mut self) {
        // Water
        self.register(SpeciesDef {
            id: SpeciesId::WATER,
            name: "water".to_string(),
            color: [0.2, 0.6, 1.0],
            ..Default::default()
        });

        // Oil - lighter, thicker than water
        self.register(SpeciesDef {
            id: SpeciesId::OIL,
            name: "oil".to_string(),
            color: [0.55, 0.45, 0.1],
            rest_density: 0.012,
            gas_constant: 3.0e5,
            mass: 2.0,
            viscosity: 450.0,
            ..Default::default()
        });

        // Honey
        self.register(SpeciesDef {
            id: SpeciesId::HONEY,
            name: "honey".to_string(),
            color: [0.95, 0.7, 0.1],
            rest_density: 0.018,
            gas_constant: 5.0e5,
            mass: 3.0,
            viscosity: 1500.0,
            timestep: 0.0005, // Stiff viscosity needs a smaller step
            ..Default::default()
        });

        // Gas - wide kernel, barely any cohesion
        self.register(SpeciesDef {
            id: SpeciesId::GAS,
            name: "gas".to_string(),
            color: [0.8, 0.8, 0.85],
            rest_density: 0.001, // Below its own self-density, so it spreads out
            gas_constant: 1.0e5,
            smoothing_radius: 20.0,
            mass: 0.5,
            viscosity: 20.0,
            ..Default::default()
        });

        // Mercury
        self.register(SpeciesDef {
            id: SpeciesId::MERCURY,
            name: "mercury".to_string(),
            color: [0.7, 0.7, 0.75],
            rest_density: 0.06,
            gas_constant: 8.0e5,
            smoothing_radius: 14.0,
            mass: 7.5,
            viscosity: 150.0,
            timestep: 0.0004,
        });
    }

    fn register(&mut self, species: SpeciesDef) {
        let id = species.id as usize;

        if self.species.len() <= id {
            self.species.resize(id + 1, SpeciesDef::default());
        }

        self.species[id] = species;
    }

    /// Get species definition by ID
    pub fn get(&self, id: u16) -> Option<&SpeciesDef> {
        self.species.get(id as usize)
    }

    /// Get color for a species
    pub fn get_color(&self, id: u16) -> Option<[f32; 3]> {
        self.get(id).map(|def| def.color)
    }

    /// Look a preset up by name (case-insensitive)
    pub fn find_by_name(&self, name: &str) -> Option<&SpeciesDef> {
        self.species
            .iter()
            .find(|def| def.name.eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpeciesDef> {
        self.species.iter()
    }
}

impl Default for SpeciesTable {
    fn default() -> Self {
        Self::new()
    }
}
