// Copyright @yucwang 2023

use crate::core::error::RadiosityResult;
use crate::core::interaction::IntersectionParams;
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector2f, Vector3f };

/// Geometry of one diffuser.
pub trait Primitive: Send + Sync {
    /// Unit geometric normal.
    fn normal(&self) -> Vector3f;
    fn centre(&self) -> Vector3f;
    fn surface(&self) -> Float;
    /// Label given by the scene description.
    fn name(&self) -> u64;
    /// Unit vector in the surface plane from which azimuths are measured.
    fn azimuth(&self) -> Vector3f;
    fn bounding_box(&self) -> AABB;
    /// Distance and point of the hit along the ray, if any. Must be pure.
    fn intersect(&self, params: &IntersectionParams) -> Option<(Float, Vector3f)>;
    /// Uniformly distributed point on the surface.
    fn sample_point(&self, u: &Vector2f) -> RadiosityResult<Vector3f>;
}
