// Copyright @yucwang 2023

use crate::core::error::{RadiosityError, RadiosityResult};
use crate::core::optics::Optics;
use crate::math::constants::Float;

/// Lambertian face: diffuse reflectance and diffuse transmittance.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LambertianDiffuse {
    rho: Float,
    tau: Float,
}

/// Default optics for virtual sensors.
impl Default for LambertianDiffuse {
    fn default() -> Self {
        Self { rho: 0.0, tau: 0.0 }
    }
}

impl Optics for LambertianDiffuse {
    fn rho(&self) -> Float {
        self.rho
    }

    fn tau(&self) -> Float {
        self.tau
    }
}

impl LambertianDiffuse {
    /// Coefficients must lie in `[0, 1]` and conserve energy.
    pub fn new(rho: Float, tau: Float) -> RadiosityResult<Self> {
        if !(0.0..=1.0).contains(&rho) || !(0.0..=1.0).contains(&tau) {
            return Err(RadiosityError::invalid_argument(
                "LambertianDiffuse::new",
                format!("rho = {}, tau = {} must be in [0, 1]", rho, tau)));
        }
        if rho + tau > 1.0 {
            return Err(RadiosityError::invalid_argument(
                "LambertianDiffuse::new",
                format!("rho + tau = {} exceeds 1", rho + tau)));
        }
        Ok(Self { rho, tau })
    }

    pub fn opaque(rho: Float) -> RadiosityResult<Self> {
        Self::new(rho, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lambertian_coefficients() {
        let leaf = LambertianDiffuse::new(0.06, 0.04).unwrap();
        assert_eq!(leaf.rho(), 0.06);
        assert_eq!(leaf.tau(), 0.04);
        assert_eq!(LambertianDiffuse::opaque(0.2).unwrap().tau(), 0.0);
        assert_eq!(LambertianDiffuse::default().rho(), 0.0);
    }

    #[test]
    fn test_lambertian_rejects_unphysical_values() {
        assert!(LambertianDiffuse::new(-0.1, 0.0).is_err());
        assert!(LambertianDiffuse::new(0.7, 0.6).is_err());
        assert!(LambertianDiffuse::new(0.2, 1.2).is_err());
    }
}
