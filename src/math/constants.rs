/* Copyright 2020 @Yuchen Wong */

use nalgebra as na;

pub type Float = f64;

pub type Vector2f = na::Vector2<Float>;
pub type Vector3f = na::Vector3<Float>;
pub type VectorXf = na::DVector<Float>;
pub type MatrixXf = na::DMatrix<Float>;

pub const EPSILON: Float = 1e-9;
pub const RAY_EPSILON: Float = 1e-7;
pub const PI: Float = std::f64::consts::PI;
pub const INV_PI: Float = std::f64::consts::FRAC_1_PI;
pub const MACHINE_EPSILON: Float = std::f64::EPSILON;
pub const FLOAT_MAX: Float = std::f64::MAX;
pub const FLOAT_MIN: Float = std::f64::MIN;
