// Copyright @yucwang 2026

use crate::core::error::{RadiosityError, RadiosityResult};
use crate::core::interaction::IntersectionParams;
use crate::core::rng::Sampler;
use crate::core::scene::Scene;
use crate::math::constants::{Float, VectorXf};
use crate::math::frame::Frame;
use crate::math::warp::sample_cosine_hemisphere;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::collections::BTreeMap;

/// Sparse coefficient matrix in triplet form. Entry `(k, j)` is the share
/// of the flux leaving face `j` that arrives on face `k`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransportMatrix {
    rows: usize,
    cols: usize,
    entries: Vec<(usize, usize, Float)>,
}

impl TransportMatrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols, entries: Vec::new() }
    }

    pub fn nrows(&self) -> usize {
        self.rows
    }

    pub fn ncols(&self) -> usize {
        self.cols
    }

    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[(usize, usize, Float)] {
        &self.entries
    }

    /// Records `value` at `(row, col)`. Repeated positions add up.
    pub fn push(&mut self, row: usize, col: usize, value: Float) -> RadiosityResult<()> {
        if row >= self.rows || col >= self.cols {
            return Err(RadiosityError::invalid_argument(
                "TransportMatrix::push",
                format!("({}, {}) outside {}x{}", row, col, self.rows, self.cols)));
        }
        if value != 0.0 {
            self.entries.push((row, col, value));
        }
        Ok(())
    }

    pub fn get(&self, row: usize, col: usize) -> Float {
        self.entries.iter()
            .filter(|&&(r, c, _)| r == row && c == col)
            .map(|&(_, _, v)| v)
            .sum()
    }

    /// Sum of column `col`: the share of flux leaving that face which is
    /// caught by some other face.
    pub fn column_sum(&self, col: usize) -> Float {
        self.entries.iter()
            .filter(|&&(_, c, _)| c == col)
            .map(|&(_, _, v)| v)
            .sum()
    }

    pub fn apply(&self, x: &VectorXf) -> VectorXf {
        let mut y = VectorXf::zeros(self.rows);
        for &(r, c, v) in &self.entries {
            y[r] += v * x[c];
        }
        y
    }

    pub fn apply_transpose(&self, x: &VectorXf) -> VectorXf {
        let mut y = VectorXf::zeros(self.cols);
        for &(r, c, v) in &self.entries {
            y[c] += v * x[r];
        }
        y
    }
}

/// Face-to-face coupling plus the share of each face's flux that crosses
/// a sensor before reaching anything physical.
#[derive(Debug, Clone)]
pub struct TransportEstimate {
    pub faces: TransportMatrix,
    pub sensors: TransportMatrix,
}

/// Monte-Carlo estimate of transport coefficients by cosine-weighted rays.
pub struct TransportEstimator {
    samples_per_face: usize,
    show_progress: bool,
}

impl TransportEstimator {
    pub fn new(samples_per_face: usize, show_progress: bool) -> Self {
        Self { samples_per_face: samples_per_face.max(1), show_progress }
    }

    pub fn samples_per_face(&self) -> usize {
        self.samples_per_face
    }

    pub fn estimate(&self, scene: &Scene, sampler: &mut Sampler) -> RadiosityResult<TransportEstimate> {
        let n = scene.face_count();
        let mut faces = TransportMatrix::new(n, n);
        let mut sensors = TransportMatrix::new(n, n);
        let weight = 1.0 / self.samples_per_face as Float;

        let emitting: Vec<usize> = scene.diffusers().iter()
            .enumerate()
            .filter(|(_, d)| d.is_real())
            .map(|(idx, _)| idx)
            .collect();
        let total_faces: usize = emitting.iter().map(|&idx| scene.diffuser(idx).faces().len()).sum();

        let progress = if self.show_progress {
            ProgressBar::new(total_faces as u64)
        } else {
            ProgressBar::with_draw_target(Some(total_faces as u64), ProgressDrawTarget::hidden())
        };
        progress.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} faces")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let has_sensors = scene.diffusers().iter().any(|d| !d.is_real());
        for &idx in &emitting {
            let diffuser = scene.diffuser(idx);
            for &face in diffuser.faces() {
                let source = diffuser.id_of(face) as usize;
                let frame = Frame::from_normal(&diffuser.normal_of(face));
                let mut caught: BTreeMap<usize, Float> = BTreeMap::new();
                let mut crossed: BTreeMap<usize, Float> = BTreeMap::new();

                for _ in 0..self.samples_per_face {
                    let origin = diffuser.sample_point(&sampler.next_2d())?;
                    let local = sample_cosine_hemisphere(&sampler.next_2d())?;
                    let mut params = IntersectionParams::new(origin, frame.from_local(&local), weight);
                    params.order = 1;

                    let real_hit = scene.intersect_where(&mut params, |d| d.is_real());
                    let reach = match real_hit {
                        Some(hit) => {
                            // A periodic copy of the source is another surface.
                            let other = hit.diffuser != idx || hit.wraps > 0;
                            if other && scene.diffuser(hit.diffuser).receives(&params.direction()) {
                                *caught.entry(hit.id as usize).or_insert(0.0) += params.weight();
                            }
                            hit.distance
                        }
                        None => Float::INFINITY,
                    };

                    if has_sensors {
                        params.set_origin(origin);
                        if let Some(hit) = scene.intersect_where(&mut params, |d| !d.is_real()) {
                            if hit.distance < reach {
                                *crossed.entry(hit.id as usize).or_insert(0.0) += params.weight();
                            }
                        }
                    }
                }

                for (row, value) in caught {
                    faces.push(row, source, value)?;
                }
                for (row, value) in crossed {
                    sensors.push(row, source, value)?;
                }
                progress.inc(1);
            }
        }
        progress.finish_and_clear();

        log::info!("Transport: {} faces, {} rays each, {} couplings, {} sensor couplings.",
                   total_faces, self.samples_per_face, faces.nnz(), sensors.nnz());
        Ok(TransportEstimate { faces, sensors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bsp::BspPolicy;
    use crate::core::diffuser::Face;
    use crate::core::pattern::Pattern;
    use crate::materials::lambertian_diffuse::LambertianDiffuse;
    use crate::math::constants::Vector3f;
    use crate::shapes::triangle::Triangle;
    use std::sync::Arc;

    fn square(half: Float, z: Float, label: u64, up: bool) -> [Triangle; 2] {
        let a = Vector3f::new(-half, -half, z);
        let b = Vector3f::new(half, -half, z);
        let c = Vector3f::new(half, half, z);
        let d = Vector3f::new(-half, half, z);
        if up {
            [Triangle::new(a, b, c, label).unwrap(), Triangle::new(a, c, d, label).unwrap()]
        } else {
            [Triangle::new(a, c, b, label).unwrap(), Triangle::new(a, d, c, label).unwrap()]
        }
    }

    #[test]
    fn test_matrix_products() {
        let mut m = TransportMatrix::new(2, 3);
        m.push(0, 1, 0.5).unwrap();
        m.push(1, 2, 0.25).unwrap();
        m.push(0, 1, 0.25).unwrap();
        assert!(m.push(2, 0, 1.0).is_err());

        assert_eq!(m.get(0, 1), 0.75);
        assert_eq!(m.column_sum(1), 0.75);
        let y = m.apply(&VectorXf::from_vec(vec![1.0, 2.0, 4.0]));
        assert_eq!(y, VectorXf::from_vec(vec![1.5, 1.0]));
        let z = m.apply_transpose(&VectorXf::from_vec(vec![1.0, 2.0]));
        assert_eq!(z, VectorXf::from_vec(vec![0.0, 0.75, 0.5]));
    }

    #[test]
    fn test_close_parallel_plates_see_each_other() {
        let mut scene = Scene::new();
        let soil = Arc::new(LambertianDiffuse::opaque(0.2).unwrap());
        let leaf = Arc::new(LambertianDiffuse::new(0.4, 0.3).unwrap());
        let mut lower = Vec::new();
        for t in square(5.0, 0.0, 1, true).iter() {
            lower.push(scene.add_opaque(Box::new(t.clone()), soil.clone()));
        }
        let mut upper = Vec::new();
        for t in square(5.0, 0.1, 2, true).iter() {
            upper.push(scene.add_translucent(Box::new(t.clone()), leaf.clone(), leaf.clone()));
        }
        scene.build_bsp(BspPolicy::default());

        let estimate = TransportEstimator::new(500, false).estimate(&scene, &mut Sampler::new(7)).unwrap();
        let t = &estimate.faces;

        for &src in &lower {
            let col = scene.diffuser(src).id() as usize;
            let onto_upper_back: Float = upper.iter()
                .map(|&dst| t.get(scene.diffuser(dst).id_of(Face::Back) as usize, col))
                .sum();
            assert!(onto_upper_back > 0.9, "coupling {}", onto_upper_back);
            assert!(t.column_sum(col) <= 1.0 + 1e-12);
        }

        // The upper plate's front looks at an empty sky.
        for &src in &upper {
            assert_eq!(t.column_sum(scene.diffuser(src).id_of(Face::Front) as usize), 0.0);
        }
        assert_eq!(estimate.sensors.nnz(), 0);
    }

    #[test]
    fn test_sensors_record_without_blocking() {
        let mut scene = Scene::new();
        let soil = Arc::new(LambertianDiffuse::opaque(0.3).unwrap());
        let ground = scene.add_opaque(Box::new(square(5.0, 0.0, 1, true)[0].clone()), soil.clone());
        let roof = scene.add_opaque(Box::new(square(5.0, 0.2, 2, false)[0].clone()), soil);
        let sensor = scene.add_sensor(Box::new(square(5.0, 0.1, 3, true)[0].clone()), None);
        scene.build_bsp(BspPolicy::default());

        let estimate = TransportEstimator::new(200, false).estimate(&scene, &mut Sampler::new(11)).unwrap();
        let from_ground = scene.diffuser(ground).id() as usize;
        let roof_id = scene.diffuser(roof).id() as usize;
        let sensor_id = scene.diffuser(sensor).id() as usize;

        assert!(estimate.faces.get(roof_id, from_ground) > 0.5);
        assert!(estimate.sensors.get(sensor_id, from_ground) > 0.5);
        assert_eq!(estimate.faces.column_sum(sensor_id), 0.0);
        assert_eq!(estimate.faces.apply(&VectorXf::zeros(scene.face_count())).norm(), 0.0);
    }

    #[test]
    fn test_periodic_copies_receive_transport() {
        let leaf = Arc::new(LambertianDiffuse::new(0.4, 0.4).unwrap());
        let a = Vector3f::new(0.5, 0.0, 0.0);
        let b = Vector3f::new(0.5, 1.0, 0.0);
        let c = Vector3f::new(0.5, 1.0, 2.0);
        let d = Vector3f::new(0.5, 0.0, 2.0);
        let mut scene = Scene::new();
        let halves = [
            scene.add_translucent(Box::new(Triangle::new(a, b, c, 1).unwrap()), leaf.clone(), leaf.clone()),
            scene.add_translucent(Box::new(Triangle::new(a, c, d, 1).unwrap()), leaf.clone(), leaf),
        ];
        scene.build_bsp(BspPolicy::default());

        let alone = TransportEstimator::new(200, false).estimate(&scene, &mut Sampler::new(3)).unwrap();
        assert_eq!(alone.faces.nnz(), 0);

        scene.set_pattern(Some(Pattern::new(0.0, 0.0, 1.0, 1.0).unwrap()));
        let tiled = TransportEstimator::new(200, false).estimate(&scene, &mut Sampler::new(3)).unwrap();
        for &idx in &halves {
            // The front looks along +x and meets the backs of the copies.
            let col = scene.diffuser(idx).id_of(Face::Front) as usize;
            let onto_backs: Float = halves.iter()
                .map(|&dst| tiled.faces.get(scene.diffuser(dst).id_of(Face::Back) as usize, col))
                .sum();
            assert!(onto_backs > 0.3, "coupling {}", onto_backs);
            assert!(tiled.faces.column_sum(col) <= 1.0 + 1e-12);
        }
    }

    #[test]
    fn test_backs_of_opaque_faces_block_without_receiving() {
        let mut scene = Scene::new();
        let soil = Arc::new(LambertianDiffuse::opaque(0.3).unwrap());
        let ground = scene.add_opaque(Box::new(square(5.0, 0.0, 1, true)[0].clone()), soil.clone());
        // Faces away from the ground, so the ground sees its back.
        let lid = scene.add_opaque(Box::new(square(5.0, 0.2, 2, true)[0].clone()), soil);
        scene.build_bsp(BspPolicy::default());

        let estimate = TransportEstimator::new(200, false).estimate(&scene, &mut Sampler::new(13)).unwrap();
        let from_ground = scene.diffuser(ground).id() as usize;
        let lid_id = scene.diffuser(lid).id() as usize;
        assert_eq!(estimate.faces.get(lid_id, from_ground), 0.0);
        assert_eq!(estimate.faces.column_sum(lid_id), 0.0);
    }
}
