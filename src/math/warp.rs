// Copyright @yucwang 2023

use super::constants::{ INV_PI, PI, Float, Vector2f, Vector3f };
use super::numeric::safe_sqrt;
use crate::core::error::RadiosityResult;

fn sample_uniform_disk_concentric(u: &Vector2f) -> Vector2f {
    let r1: Float = 2.0 * u.x - 1.0;
    let r2: Float = 2.0 * u.y - 1.0;

    let phi: Float;
    let r:   Float;

    if r1 == 0. && r2 == 0. {
        r = 0.0;
        phi = 0.0;
    } else if r1 * r1 > r2 * r2 {
        r = r1;
        phi = (PI / 4.0) * (r2 / r1);
    } else {
        r = r2;
        phi = (PI / 2.0) - (r1 / r2) * (PI / 4.0);
    }

    let (sin_phi, cos_phi) = phi.sin_cos();

    Vector2f::new(r * cos_phi, r * sin_phi)
}

/// Cosine-weighted direction around +z.
pub fn sample_cosine_hemisphere(u: &Vector2f) -> RadiosityResult<Vector3f> {
    let p = sample_uniform_disk_concentric(u);
    let z = safe_sqrt(1. - p.x * p.x - p.y * p.y)?;

    Ok(Vector3f::new(p.x, p.y, z))
}

pub fn sample_cosine_hemisphere_pdf(cos_theta: Float) -> Float {
    cos_theta * INV_PI
}

/// Uniform barycentric coordinates `(b0, b1, b2)`.
pub fn square_to_triangle(u: &Vector2f) -> RadiosityResult<Vector3f> {
    let su = safe_sqrt(u.x)?;
    let b1 = 1.0 - su;
    let b2 = u.y * su;

    Ok(Vector3f::new(1.0 - b1 - b2, b1, b2))
}
