// Copyright @yucwang 2023

use crate::core::diffuser::Face;
use crate::math::constants::{Float, Vector3f, FLOAT_MAX, RAY_EPSILON};
use crate::math::ray::Ray3f;

/// State carried by one sampled ray while it is traced.
///
/// `weight` and `order` are bookkeeping owned by the caller; the carrier
/// never validates them. `first` is raised whenever the origin or the
/// direction changes and lowered once the ray has been traced.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionParams {
    origin: Vector3f,
    direction: Vector3f,
    weight: Float,
    pub order: u32,
    pub first: bool,
}

impl IntersectionParams {
    pub fn new(origin: Vector3f, direction: Vector3f, weight: Float) -> Self {
        Self { origin, direction, weight, order: 0, first: true }
    }

    pub fn origin(&self) -> Vector3f {
        self.origin
    }

    pub fn direction(&self) -> Vector3f {
        self.direction
    }

    pub fn weight(&self) -> Float {
        self.weight
    }

    pub fn set_origin(&mut self, origin: Vector3f) {
        self.origin = origin;
        self.first = true;
    }

    pub fn set_direction(&mut self, direction: Vector3f) {
        self.direction = direction;
        self.first = true;
    }

    pub fn set_weight(&mut self, weight: Float) {
        self.weight = weight;
    }

    pub fn mark_traced(&mut self) {
        self.first = false;
    }

    /// Segment used by box tests; it starts just off the origin so a ray
    /// leaving a surface does not hit that surface again.
    pub fn to_ray(&self) -> Ray3f {
        Ray3f::new(self.origin, self.direction, Some(RAY_EPSILON), Some(FLOAT_MAX))
    }
}

/// Nearest hit of a traced ray, with the struck face already resolved from
/// the incoming direction. `wraps` counts the periodic tiles crossed before
/// the hit; `point` lies in the original tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub distance: Float,
    pub point: Vector3f,
    pub diffuser: usize,
    pub face: Face,
    pub id: u32,
    pub wraps: u32,
}
