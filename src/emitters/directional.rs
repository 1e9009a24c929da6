// Copyright @yucwang 2026

use crate::core::error::{RadiosityError, RadiosityResult};
use crate::core::interaction::IntersectionParams;
use crate::core::rng::Sampler;
use crate::core::scene::Scene;
use crate::math::constants::{Float, Vector3f, VectorXf, EPSILON};

/// Parallel light such as the sun, `irradiance` being measured on a plane
/// perpendicular to `direction` (the direction the light travels).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DirectionalLight {
    direction: Vector3f,
    irradiance: Float,
}

impl DirectionalLight {
    pub fn new(direction: Vector3f, irradiance: Float) -> RadiosityResult<Self> {
        let len = direction.norm();
        if len <= EPSILON {
            return Err(RadiosityError::invalid_argument("DirectionalLight::new", "zero direction"));
        }
        if irradiance < 0.0 {
            return Err(RadiosityError::invalid_argument(
                "DirectionalLight::new", format!("negative irradiance {}", irradiance)));
        }
        Ok(Self { direction: direction / len, irradiance })
    }

    pub fn direction(&self) -> Vector3f {
        self.direction
    }

    pub fn irradiance(&self) -> Float {
        self.irradiance
    }

    /// First-order flux received by every face, indexed by face id.
    ///
    /// Each diffuser is sampled with `samples` shadow rays cast from points on
    /// its surface back toward the light; only physical diffusers cast
    /// shadows, and in a periodic scene the shadow rays wrap through the
    /// neighbouring tiles. The lit face is the one the light arrives on;
    /// opaque diffusers lit from behind receive nothing.
    pub fn primary_flux(&self, scene: &Scene, samples: usize, sampler: &mut Sampler) -> RadiosityResult<VectorXf> {
        let samples = samples.max(1);
        let mut flux = VectorXf::zeros(scene.face_count());
        let to_light = -self.direction;

        for diffuser in scene.diffusers() {
            if !diffuser.receives(&self.direction) {
                continue;
            }
            let face = diffuser.resolve_face(&self.direction);
            let cos_theta = self.direction.dot(&diffuser.primitive().normal()).abs();
            if cos_theta <= EPSILON || self.irradiance == 0.0 {
                continue;
            }

            let mut lit = 0usize;
            for _ in 0..samples {
                let p = diffuser.sample_point(&sampler.next_2d())?;
                let mut params = IntersectionParams::new(p, to_light, 1.0);
                if scene.intersect_where(&mut params, |d| d.is_real()).is_none() {
                    lit += 1;
                }
            }

            let fraction = lit as Float / samples as Float;
            flux[diffuser.id_of(face) as usize] += self.irradiance * diffuser.surface() * cos_theta * fraction;
        }

        Ok(flux)
    }
}
