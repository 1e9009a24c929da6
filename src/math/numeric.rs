// Copyright @yucwang 2026

//! Domain-guarded versions of `acos`, `asin` and `sqrt`.
//!
//! Rounding routinely pushes dot products of unit vectors a hair past
//! `[-1, 1]` and squared lengths a hair below zero. Values within
//! `DOMAIN_SLACK` of the domain are clamped onto its boundary; anything
//! further out is reported as an error.

use crate::core::error::{RadiosityError, RadiosityResult};
use crate::math::constants::{Float, PI};

pub const DOMAIN_SLACK: Float = 1e-5;

pub fn safe_acos(x: Float) -> RadiosityResult<Float> {
    if x.abs() > 1.0 {
        if x.abs() - DOMAIN_SLACK > 1.0 {
            return Err(RadiosityError::NumericDomain { function: "acos", value: x });
        }
        return Ok(if x > 0.0 { 0.0 } else { PI });
    }
    if x.is_nan() {
        return Err(RadiosityError::NumericDomain { function: "acos", value: x });
    }
    Ok(x.acos())
}

pub fn safe_asin(x: Float) -> RadiosityResult<Float> {
    if x.abs() > 1.0 {
        if x.abs() - DOMAIN_SLACK > 1.0 {
            return Err(RadiosityError::NumericDomain { function: "asin", value: x });
        }
        return Ok(if x > 0.0 { 0.5 * PI } else { -0.5 * PI });
    }
    if x.is_nan() {
        return Err(RadiosityError::NumericDomain { function: "asin", value: x });
    }
    Ok(x.asin())
}

pub fn safe_sqrt(x: Float) -> RadiosityResult<Float> {
    if x < 0.0 {
        if x < -DOMAIN_SLACK {
            return Err(RadiosityError::NumericDomain { function: "sqrt", value: x });
        }
        return Ok(0.0);
    }
    if x.is_nan() {
        return Err(RadiosityError::NumericDomain { function: "sqrt", value: x });
    }
    Ok(x.sqrt())
}
