//! Rectangular simulation domain with reflecting walls

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// View-space rectangle `[0, width] × [0, height]`.
///
/// Particles are kept `eps` away from every wall. `damping` scales the
/// reflected velocity component on contact.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub width: f32,
    pub height: f32,
    /// Collision margin from each wall
    pub eps: f32,
    /// Fraction of normal velocity kept after a wall hit, in (0, 1)
    pub damping: f32,
}

impl Default for Domain {
    fn default() -> Self {
        // 800x600 window at 1.5 view units per pixel
        Self {
            width: 1200.0,
            height: 900.0,
            eps: 16.0,
            damping: 0.5,
        }
    }
}

impl Domain {
    pub fn new(width: f32, height: f32, eps: f32, damping: f32) -> SimResult<Self> {
        let domain = Self {
            width,
            height,
            eps,
            damping,
        };
        domain.validate()?;
        Ok(domain)
    }

    /// Map window pixel dimensions to view dimensions
    pub fn from_window(
        pixel_width: u32,
        pixel_height: u32,
        view_scale: f32,
        eps: f32,
        damping: f32,
    ) -> SimResult<Self> {
        if !(view_scale.is_finite() && view_scale > 0.0) {
            return Err(SimError::InvalidDomain(format!(
                "view scale must be positive, got {}",
                view_scale
            )));
        }
        Self::new(
            pixel_width as f32 * view_scale,
            pixel_height as f32 * view_scale,
            eps,
            damping,
        )
    }

    pub fn validate(&self) -> SimResult<()> {
        if !(self.width.is_finite() && self.width > 0.0)
            || !(self.height.is_finite() && self.height > 0.0)
        {
            return Err(SimError::InvalidDomain(format!(
                "size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if !(self.eps.is_finite() && self.eps >= 0.0) {
            return Err(SimError::InvalidDomain(format!(
                "collision margin must be non-negative, got {}",
                self.eps
            )));
        }
        if 2.0 * self.eps >= self.width.min(self.height) {
            return Err(SimError::InvalidDomain(format!(
                "collision margin {} leaves no room in {}x{}",
                self.eps, self.width, self.height
            )));
        }
        if !(self.damping > 0.0 && self.damping < 1.0) {
            return Err(SimError::InvalidDomain(format!(
                "boundary damping must be in (0, 1), got {}",
                self.damping
            )));
        }
        Ok(())
    }

    /// Lowest allowed position on each axis
    pub fn min(&self) -> Vec2 {
        Vec2::splat(self.eps)
    }

    /// Highest allowed position on each axis
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.width - self.eps, self.height - self.eps)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// Whether a position lies inside the collision margins (inclusive)
    pub fn contains(&self, point: Vec2) -> bool {
        let (min, max) = (self.min(), self.max());
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }
}
