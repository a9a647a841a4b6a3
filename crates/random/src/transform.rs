//! Deterministic geometric transforms
//!
//! Pure functions mapping uniform/Gaussian variates onto directions and
//! positions. Keeping them free of any engine makes the sampling math
//! testable in isolation and keeps the call sites explicit about how many
//! variates each shape consumes.

// crate modules
use gray_vrmath::{ref_vec_to_map, Vec3};

use std::f64::consts::TAU;

/// Uniform direction on the unit sphere from two uniform variates
pub fn uniform_sphere(u_theta: f64, u_cos_phi: f64) -> Vec3 {
    let z = 2.0 * u_cos_phi - 1.0;
    let r = (1.0 - z * z).sqrt();
    let theta = TAU * u_theta;
    Vec3::new(r * theta.cos(), r * theta.sin(), z)
}

/// Uniform point in the unit ball from three uniform variates
pub fn uniform_sphere_filled(u_theta: f64, u_cos_phi: f64, u_radius: f64) -> Vec3 {
    uniform_sphere(u_theta, u_cos_phi) * u_radius.cbrt()
}

/// Direction at a fixed polar cosine from `reference`, azimuth from `u_phi`
///
/// This is the scattering deflection: the new direction makes an angle of
/// `acos(cos_theta)` with the incoming one.
pub fn deflection(reference: &Vec3, cos_theta: f64, u_phi: f64) -> Vec3 {
    let cos_theta = cos_theta.clamp(-1.0, 1.0);
    let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
    let phi = TAU * u_phi;
    let frame = ref_vec_to_map(reference);
    frame.rotate(&Vec3::new(
        sin_theta * phi.cos(),
        sin_theta * phi.sin(),
        cos_theta,
    ))
}

/// Small Gaussian deviation from `reference`
///
/// The polar angle is `sigma_radians` times the supplied standard normal
/// variate, the azimuth uniform. A zero sigma reproduces `reference`
/// exactly, which the back-to-back decay paths rely on.
pub fn acolinearity(reference: &Vec3, sigma_radians: f64, u_phi: f64, gaussian: f64) -> Vec3 {
    if sigma_radians == 0.0 {
        return *reference;
    }
    deflection(reference, (sigma_radians * gaussian).cos(), u_phi)
}

/// Uniform point in a z-aligned cylinder centred on the origin
pub fn uniform_cylinder(height: f64, radius: f64, u_r: f64, u_phi: f64, u_z: f64) -> Vec3 {
    let r = radius * u_r.sqrt();
    let phi = TAU * u_phi;
    Vec3::new(r * phi.cos(), r * phi.sin(), height * (u_z - 0.5))
}

/// Uniform point on the shell of a z-aligned cylinder
pub fn uniform_annulus_cylinder(height: f64, radius: f64, u_phi: f64, u_z: f64) -> Vec3 {
    let phi = TAU * u_phi;
    Vec3::new(
        radius * phi.cos(),
        radius * phi.sin(),
        height * (u_z - 0.5),
    )
}

/// Uniform point in an axis-aligned box of the given size, centred on origin
pub fn uniform_rectangle(size: &Vec3, u_x: f64, u_y: f64, u_z: f64) -> Vec3 {
    Vec3::new(
        size.x * (u_x - 0.5),
        size.y * (u_y - 0.5),
        size.z * (u_z - 0.5),
    )
}
