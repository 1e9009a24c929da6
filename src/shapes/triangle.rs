// Copyright @yucwang 2023

use crate::core::error::{RadiosityError, RadiosityResult};
use crate::core::interaction::IntersectionParams;
use crate::core::primitive::Primitive;
use crate::math::aabb::AABB;
use crate::math::constants::{ EPSILON, Float, Vector2f, Vector3f };
use crate::math::warp::square_to_triangle;

/// Flat triangle; the normal follows the winding `p0 -> p1 -> p2`.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    p0: Vector3f,
    p1: Vector3f,
    p2: Vector3f,
    normal: Vector3f,
    area: Float,
    label: u64,
}

impl Primitive for Triangle {
    fn normal(&self) -> Vector3f {
        self.normal
    }

    fn centre(&self) -> Vector3f {
        (self.p0 + self.p1 + self.p2) / 3.0
    }

    fn surface(&self) -> Float {
        self.area
    }

    fn name(&self) -> u64 {
        self.label
    }

    fn azimuth(&self) -> Vector3f {
        (self.p1 - self.p0).normalize()
    }

    fn bounding_box(&self) -> AABB {
        let mut bound = AABB::new(self.p0, self.p1);
        bound.expand_by_point(&self.p2);

        bound
    }

    fn intersect(&self, params: &IntersectionParams) -> Option<(Float, Vector3f)> {
        let ray = params.to_ray();
        let n_dot_dir = self.normal.dot(&ray.dir());

        if n_dot_dir.abs() < EPSILON {
            return None;
        }

        let plane_d = self.normal.dot(&self.p0);
        let t = (plane_d - self.normal.dot(&ray.origin())) / n_dot_dir;
        if !ray.test_segment(t) {
            return None;
        }

        let p = ray.at(t);
        if self.is_in_triangle(&p) {
            Some((t, p))
        } else {
            None
        }
    }

    fn sample_point(&self, u: &Vector2f) -> RadiosityResult<Vector3f> {
        let b = square_to_triangle(u)?;
        Ok(self.p0 * b.x + self.p1 * b.y + self.p2 * b.z)
    }
}

impl Triangle {
    pub fn new(p0: Vector3f, p1: Vector3f, p2: Vector3f, label: u64) -> RadiosityResult<Self> {
        let cross = (p1 - p0).cross(&(p2 - p0));
        let double_area = cross.norm();
        if double_area < EPSILON {
            return Err(RadiosityError::invalid_argument(
                "Triangle::new", format!("degenerate triangle with label {}", label)));
        }

        Ok(Triangle {
            p0,
            p1,
            p2,
            normal: cross / double_area,
            area: 0.5 * double_area,
            label,
        })
    }

    fn is_in_triangle(&self, p: &Vector3f) -> bool {
        let n0 = (self.p1 - self.p0).cross(&(p - self.p0));
        let n1 = (self.p2 - self.p1).cross(&(p - self.p1));
        let n2 = (self.p0 - self.p2).cross(&(p - self.p2));

        (n0.dot(&self.normal) >= 0.0) && (n1.dot(&self.normal) >= 0.0) && (n2.dot(&self.normal) >= 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> Triangle {
        Triangle::new(Vector3f::new(1.0, 1.0, 0.0),
                      Vector3f::new(2.0, 1.0, 0.0),
                      Vector3f::new(2.0, 2.0, 0.0), 3).unwrap()
    }

    #[test]
    fn test_bounding_box1() {
        let p0 = Vector3f::new(1.0, 1.0, 1.0);
        let p1 = Vector3f::new(1.5, 4.0, -1.0);
        let p2 = Vector3f::new(-1.0, 2.0, 2.5);

        let triangle = Triangle::new(p0, p1, p2, 0).unwrap();
        let bounding_box = triangle.bounding_box();

        assert_eq!(bounding_box.p_min, Vector3f::new(-1.0, 1.0, -1.0));
        assert_eq!(bounding_box.p_max, Vector3f::new(1.5, 4.0, 2.5));
    }

    #[test]
    fn test_geometry_queries() {
        let triangle = unit_triangle();
        assert_eq!(triangle.normal(), Vector3f::new(0.0, 0.0, 1.0));
        assert!((triangle.surface() - 0.5).abs() < 1e-12);
        assert_eq!(triangle.name(), 3);
        assert_eq!(triangle.azimuth(), Vector3f::new(1.0, 0.0, 0.0));
        assert!((triangle.centre() - Vector3f::new(5.0 / 3.0, 4.0 / 3.0, 0.0)).norm() < 1e-12);
        assert!(Triangle::new(Vector3f::zeros(), Vector3f::zeros(), Vector3f::new(1.0, 0.0, 0.0), 0).is_err());
    }

    #[test]
    fn test_intersect() {
        let triangle = unit_triangle();

        let down = IntersectionParams::new(Vector3f::new(1.5, 1.1, 3.0), Vector3f::new(0.0, 0.0, -1.0), 1.0);
        let up = IntersectionParams::new(Vector3f::new(1.5, 1.1, 3.0), Vector3f::new(0.0, 0.0, 1.0), 1.0);
        let outside = IntersectionParams::new(Vector3f::new(1.5, 1.9, 3.0), Vector3f::new(0.0, 0.0, -1.0), 1.0);

        let (t, p) = triangle.intersect(&down).unwrap();
        assert!((t - 3.0).abs() < 1e-12);
        assert!((p - Vector3f::new(1.5, 1.1, 0.0)).norm() < 1e-12);
        assert!(triangle.intersect(&up).is_none());
        assert!(triangle.intersect(&outside).is_none());
    }

    #[test]
    fn test_intersect_is_pure() {
        let triangle = unit_triangle();
        let params = IntersectionParams::new(Vector3f::new(1.7, 1.3, -2.0), Vector3f::new(0.0, 0.1, 1.0), 1.0);
        let first = triangle.intersect(&params);
        let second = triangle.intersect(&params);
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn test_sample_point_lies_on_triangle() {
        let triangle = unit_triangle();
        let p = triangle.sample_point(&Vector2f::new(0.4, 0.7)).unwrap();
        assert!(triangle.is_in_triangle(&p));
        assert!(p.z.abs() < 1e-12);
    }
}
