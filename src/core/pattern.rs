// Copyright @yucwang 2026

use crate::core::error::{RadiosityError, RadiosityResult};
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector2f, Vector3f, EPSILON};

/// Lateral extent of one tile of a periodic canopy. The tile repeats along
/// x and y without bound; z is left open.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Pattern {
    min: Vector2f,
    max: Vector2f,
}

impl Pattern {
    pub fn new(xmin: Float, ymin: Float, xmax: Float, ymax: Float) -> RadiosityResult<Self> {
        if !(xmax - xmin > EPSILON) || !(ymax - ymin > EPSILON) {
            return Err(RadiosityError::invalid_argument(
                "Pattern::new",
                format!("empty tile [{}, {}] x [{}, {}]", xmin, xmax, ymin, ymax)));
        }
        Ok(Self { min: Vector2f::new(xmin, ymin), max: Vector2f::new(xmax, ymax) })
    }

    pub fn min(&self) -> Vector2f {
        self.min
    }

    pub fn max(&self) -> Vector2f {
        self.max
    }

    pub fn period(&self, axis: usize) -> Float {
        self.max[axis] - self.min[axis]
    }

    /// True when `extent` fits laterally inside the tile.
    pub fn holds(&self, extent: &AABB) -> bool {
        (0..2).all(|axis| extent.p_min[axis] >= self.min[axis] - EPSILON
                       && extent.p_max[axis] <= self.max[axis] + EPSILON)
    }

    /// Where a ray from `origin` along the unit vector `dir` leaves the tile
    /// through a lateral face: the distance travelled and the translation
    /// that carries the exit point onto the opposite face. Corner exits
    /// translate along both axes. `None` for vertical rays.
    pub fn exit(&self, origin: &Vector3f, dir: &Vector3f) -> Option<(Float, Vector3f)> {
        let mut t_axis: [Option<Float>; 2] = [None, None];
        for axis in 0..2 {
            let d = dir[axis];
            let t = if d > EPSILON {
                (self.max[axis] - origin[axis]) / d
            } else if d < -EPSILON {
                (self.min[axis] - origin[axis]) / d
            } else {
                continue;
            };
            t_axis[axis] = Some(t.max(0.0));
        }

        let t_exit = t_axis.iter().flatten().cloned().fold(None, |best: Option<Float>, t| {
            Some(best.map_or(t, |b| b.min(t)))
        })?;

        let mut shift = Vector3f::zeros();
        for axis in 0..2 {
            if let Some(t) = t_axis[axis] {
                if t - t_exit <= EPSILON {
                    shift[axis] = if dir[axis] > 0.0 { -self.period(axis) } else { self.period(axis) };
                }
            }
        }
        Some((t_exit, shift))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_rejects_empty_tiles() {
        assert!(Pattern::new(0.0, 0.0, 0.0, 1.0).is_err());
        assert!(Pattern::new(0.0, 2.0, 1.0, 1.0).is_err());
        assert!(Pattern::new(0.0, 0.0, Float::NAN, 1.0).is_err());
        let tile = Pattern::new(-1.0, 0.0, 1.0, 3.0).unwrap();
        assert_eq!(tile.period(0), 2.0);
        assert_eq!(tile.period(1), 3.0);
    }

    #[test]
    fn test_exit_through_lateral_faces() {
        let tile = Pattern::new(0.0, 0.0, 1.0, 1.0).unwrap();

        let (t, shift) = tile.exit(&Vector3f::new(0.25, 0.5, 2.0), &Vector3f::new(1.0, 0.0, 0.0)).unwrap();
        assert!((t - 0.75).abs() < 1e-12);
        assert_eq!(shift, Vector3f::new(-1.0, 0.0, 0.0));

        let d = Vector3f::new(0.0, -1.0, 1.0).normalize();
        let (t, shift) = tile.exit(&Vector3f::new(0.5, 0.5, 0.0), &d).unwrap();
        assert!((t - 0.5 * std::f64::consts::SQRT_2).abs() < 1e-12);
        assert_eq!(shift, Vector3f::new(0.0, 1.0, 0.0));

        let d = Vector3f::new(1.0, 1.0, 0.0).normalize();
        let (_, shift) = tile.exit(&Vector3f::new(0.5, 0.5, 0.0), &d).unwrap();
        assert_eq!(shift, Vector3f::new(-1.0, -1.0, 0.0));

        assert!(tile.exit(&Vector3f::new(0.5, 0.5, 0.0), &Vector3f::new(0.0, 0.0, 1.0)).is_none());
    }

    #[test]
    fn test_holds_checks_lateral_extent_only() {
        let tile = Pattern::new(0.0, 0.0, 1.0, 1.0).unwrap();
        assert!(tile.holds(&AABB::new(Vector3f::new(0.0, 0.2, -5.0), Vector3f::new(1.0, 0.8, 9.0))));
        assert!(!tile.holds(&AABB::new(Vector3f::new(0.5, 0.2, 0.0), Vector3f::new(1.5, 0.8, 0.0))));
    }
}
