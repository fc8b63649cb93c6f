//! Vector helpers layered on top of [`glam`] that the reference renderer
//! needs but `glam` doesn't provide directly: arbitrary-index-of-refraction
//! refraction, Frisvad's orthonormal basis construction, and spherical ↔
//! Cartesian conversion.

use glam::Vec3;

/// Orthonormal basis with `x` as the original vector, `y`/`z` orthogonal to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Basis3 {
    pub x: Vec3,
    pub y: Vec3,
    pub z: Vec3,
}

impl Basis3 {
    /// Reorients `local` (expressed in the standard XYZ basis) into this basis.
    pub fn reorient(&self, local: Vec3) -> Vec3 {
        self.x * local.x + self.y * local.y + self.z * local.z
    }
}

/// Frisvad's branch-free construction of an orthonormal basis from a unit
/// vector `bx`. `bx` must be normalized.
///
/// <https://backend.orbit.dtu.dk/ws/portalfiles/portal/126824972/onb_frisvad_jgt2012_v2.pdf>
pub fn orthonormal_basis(bx: Vec3) -> Basis3 {
    if bx.z < -0.9999999 {
        return Basis3 {
            x: bx,
            y: Vec3::new(0.0, -1.0, 0.0),
            z: Vec3::new(-1.0, 0.0, 0.0),
        };
    }

    let a = 1.0 / (1.0 + bx.z);
    let b = -bx.x * bx.y * a;

    Basis3 {
        x: bx,
        y: Vec3::new(b, 1.0 - bx.y * bx.y * a, -bx.y),
        z: Vec3::new(1.0 - bx.x * bx.x * a, b, -bx.x),
    }
}

/// Refracts `v` through a surface with unit normal `n` (pointing against `v`)
/// and relative index of refraction `eta = eta_incident / eta_transmitted`.
pub fn refract(v: Vec3, n: Vec3, eta: f32) -> Vec3 {
    let cos_theta = (-v).dot(n).min(1.0);
    let out_perp = (v + n * cos_theta) * eta;
    let out_para = n * -((1.0 - out_perp.dot(out_perp)).abs()).sqrt();
    out_perp + out_para
}

/// Converts `(rho, theta, phi)` spherical coordinates to Cartesian.
pub fn spherical_to_cartesian(rho: f32, theta: f32, phi: f32) -> Vec3 {
    Vec3::new(
        rho * theta.sin() * phi.cos(),
        rho * theta.sin() * phi.sin(),
        rho * theta.cos(),
    )
}

/// Converts a Cartesian vector to `(rho, theta, phi)` spherical coordinates.
pub fn cartesian_to_spherical(v: Vec3) -> (f32, f32, f32) {
    let rho = v.length();
    (rho, (v.z / rho).acos(), v.y.atan2(v.x))
}

/// An orthonormal tangent frame whose `z` axis is the shading normal, used
/// by the Disney metal and clearcoat lobes, which sample and shade entirely
/// in a local frame where the macrosurface normal is `(0, 0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrame {
    tangent: Vec3,
    bitangent: Vec3,
    normal: Vec3,
}

impl LocalFrame {
    pub fn from_normal(unit_normal: Vec3) -> Self {
        let onb = orthonormal_basis(unit_normal);
        Self {
            tangent: onb.y,
            bitangent: onb.z,
            normal: onb.x,
        }
    }

    pub fn to_local(&self, world: Vec3) -> Vec3 {
        Vec3::new(
            world.dot(self.tangent),
            world.dot(self.bitangent),
            world.dot(self.normal),
        )
    }

    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.tangent * local.x + self.bitangent * local.y + self.normal * local.z
    }
}
