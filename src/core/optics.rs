// Copyright @yucwang 2023

use crate::math::constants::Float;

/// Reflectance and transmittance of one diffuser face.
///
/// Optics are shared between diffusers through `Arc`, none owns them.
pub trait Optics: Send + Sync {
    fn rho(&self) -> Float;
    fn tau(&self) -> Float;
}
