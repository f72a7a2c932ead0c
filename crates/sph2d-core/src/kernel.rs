//! Smoothing kernel normalization constants
//!
//! 2D forms of the Müller et al. kernels:
//! ```text
//! poly6      =   4 / (π·H⁸)    density estimate
//! spiky_grad = -10 / (π·H⁵)    pressure gradient
//! visc_lap   =  40 / (π·H⁵)    viscosity laplacian
//! ```

use std::f32::consts::PI;

use crate::error::{SimError, SimResult};

/// Kernel constants for one smoothing radius
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KernelConstants {
    /// Kernel radius (H)
    pub h: f32,
    /// H², the neighbor cutoff compared against squared distances
    pub hsq: f32,
    pub poly6: f32,
    pub spiky_grad: f32,
    pub visc_lap: f32,
}

impl KernelConstants {
    pub fn new(h: f32) -> SimResult<Self> {
        if !(h.is_finite() && h > 0.0) {
            return Err(SimError::InvalidRadius(h));
        }

        let h5 = h.powi(5);
        let h8 = h.powi(8);

        Ok(Self {
            h,
            hsq: h * h,
            poly6: 4.0 / (PI * h8),
            spiky_grad: -10.0 / (PI * h5),
            visc_lap: 40.0 / (PI * h5),
        })
    }

    /// Poly6 density contribution for a squared distance, zero outside the cutoff
    #[inline]
    pub fn density_weight(&self, r2: f32) -> f32 {
        if r2 < self.hsq {
            let diff = self.hsq - r2;
            self.poly6 * diff * diff * diff
        } else {
            0.0
        }
    }
}

/// Constants for every radius in use, keyed by the radius' bit pattern.
///
/// Species may carry different radii, so a single global constant set is
/// not enough. The list stays tiny (one entry per distinct radius).
#[derive(Clone, Debug, Default)]
pub struct KernelCache {
    entries: Vec<(u32, KernelConstants)>,
}

impl KernelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure every radius in `radii` has constants.
    ///
    /// Returns how many entries had to be computed.
    pub fn refresh<I>(&mut self, radii: I) -> SimResult<usize>
    where
        I: IntoIterator<Item = f32>,
    {
        let mut computed = 0;
        for h in radii {
            if self.lookup(h).is_none() {
                let constants = KernelConstants::new(h)?;
                self.entries.push((h.to_bits(), constants));
                computed += 1;
                log::debug!("Computed kernel constants for H={}", h);
            }
        }
        Ok(computed)
    }

    /// Cached constants for a radius
    #[inline]
    pub fn lookup(&self, h: f32) -> Option<&KernelConstants> {
        let bits = h.to_bits();
        self.entries
            .iter()
            .find(|(key, _)| *key == bits)
            .map(|(_, constants)| constants)
    }

    /// Constants for a radius, computing them if missing
    pub fn get_or_insert(&mut self, h: f32) -> SimResult<KernelConstants> {
        if let Some(constants) = self.lookup(h) {
            return Ok(*constants);
        }
        self.refresh(std::iter::once(h))?;
        self.lookup(h).copied().ok_or(SimError::InvalidRadius(h))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        ((a - b) / b).abs() < 1e-5
    }

    #[test]
    fn test_formulas() {
        let k = KernelConstants::new(2.0).unwrap();
        assert_eq!(k.hsq, 4.0);
        assert!(approx(k.poly6, 4.0 / (PI * 256.0)));
        assert!(approx(k.spiky_grad, -10.0 / (PI * 32.0)));
        assert!(approx(k.visc_lap, 40.0 / (PI * 32.0)));
    }

    #[test]
    fn test_gradient_is_negative_laplacian_positive() {
        let k = KernelConstants::new(16.0).unwrap();
        assert!(k.poly6 > 0.0);
        assert!(k.spiky_grad < 0.0);
        assert!(k.visc_lap > 0.0);
    }

    #[test]
    fn test_rejects_non_positive_radius() {
        assert!(matches!(
            KernelConstants::new(0.0),
            Err(SimError::InvalidRadius(_))
        ));
        assert!(matches!(
            KernelConstants::new(-3.0),
            Err(SimError::InvalidRadius(_))
        ));
        assert!(KernelConstants::new(f32::NAN).is_err());
        assert!(KernelConstants::new(f32::INFINITY).is_err());
    }

    #[test]
    fn test_density_weight_cutoff_is_strict() {
        let k = KernelConstants::new(2.0).unwrap();
        assert_eq!(k.density_weight(4.0), 0.0);
        assert_eq!(k.density_weight(9.0), 0.0);
        assert!(k.density_weight(3.99) > 0.0);
        // Self term: (H²)³ · poly6
        assert!(approx(k.density_weight(0.0), k.poly6 * 64.0));
    }

    #[test]
    fn test_cache_only_computes_new_radii() {
        let mut cache = KernelCache::new();
        assert_eq!(cache.refresh([16.0, 16.0, 20.0]).unwrap(), 2);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.refresh([16.0, 20.0]).unwrap(), 0);
        assert_eq!(cache.refresh([14.0]).unwrap(), 1);
        assert_eq!(cache.lookup(20.0).unwrap().h, 20.0);
        assert!(cache.lookup(8.0).is_none());
    }

    #[test]
    fn test_cache_rejects_bad_radius() {
        let mut cache = KernelCache::new();
        assert!(cache.refresh([16.0, 0.0]).is_err());
        // The valid radius before the bad one was still cached
        assert!(cache.lookup(16.0).is_some());
    }

    #[test]
    fn test_get_or_insert() {
        let mut cache = KernelCache::new();
        let k = cache.get_or_insert(10.0).unwrap();
        assert_eq!(k, KernelConstants::new(10.0).unwrap());
        assert_eq!(cache.len(), 1);
        cache.get_or_insert(10.0).unwrap();
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
