//! Disney principled BSDF lobes: diffuse (with subsurface), metal
//! (anisotropic GGX via VNDF importance sampling), and clearcoat (GTR1).
//!
//! All three lobes sample and shade in a local tangent frame whose `z` axis
//! is the macrosurface normal; [`crate::math::LocalFrame`] handles the
//! world/local transform.

use std::f32::consts::PI;

use glam::Vec3;

use crate::hit::HitInfo;
use crate::math::LocalFrame;
use crate::random::Rng;
use crate::ray::Ray;

use super::BounceResult;

fn half_vector(w_in: Vec3, w_out: Vec3) -> Vec3 {
    (w_in + w_out).normalize()
}

fn schlick_weight(cos_theta: f32) -> f32 {
    (1.0 - cos_theta).clamp(0.0, 1.0).powi(5)
}

// ---- Diffuse (Burley 2012) -------------------------------------------------

fn fresnel_diffuse(n_dot_w: f32, f90: f32) -> f32 {
    1.0 + (f90 - 1.0) * schlick_weight(n_dot_w.abs())
}

fn brdf_diffuse(albedo: Vec3, roughness: f32, subsurface: f32, n: Vec3, w_in: Vec3, w_out: Vec3) -> Vec3 {
    let h = half_vector(w_in, w_out);
    let h_dot_out = h.dot(w_out);
    let n_dot_in = n.dot(w_in);
    let n_dot_out = n.dot(w_out);

    let f_d90 = 0.5 + 2.0 * roughness * h_dot_out * h_dot_out;
    let base = (1.0 / PI) * fresnel_diffuse(n_dot_in, f_d90) * fresnel_diffuse(n_dot_out, f_d90) * albedo;

    let f_ss90 = roughness * h_dot_out * h_dot_out;
    let subsurf = (1.25 / PI)
        * (fresnel_diffuse(n_dot_in, f_ss90) * fresnel_diffuse(n_dot_out, f_ss90)
            * (1.0 / (n_dot_in.abs() + n_dot_out.abs()) - 0.5)
            + 0.5)
        * albedo;

    base.lerp(subsurf, subsurface)
}

pub(super) fn bounce(
    albedo: Vec3,
    roughness: f32,
    subsurface: f32,
    ray_in: &Ray,
    hit: &HitInfo,
    rng: &mut Rng,
) -> BounceResult {
    let w_in = -ray_in.dir.normalize();
    let w_out = rng.cosine_weighted_hemisphere(hit.unit_normal);

    // The cosine hemisphere pdf is cos(theta)/pi; the brdf above carries no
    // cosine term of its own, so brdf * cos(theta) / pdf = brdf * pi.
    let surface_color = brdf_diffuse(albedo, roughness, subsurface, hit.unit_normal, w_in, w_out) * PI;

    BounceResult {
        scattered: true,
        surface_color,
        emitted_color: Vec3::ZERO,
        ray_out: Ray::new(hit.position, w_out, ray_in.time),
    }
}

// ---- Metal (anisotropic GGX, Heitz 2018 VNDF sampling) --------------------

fn fresnel_schlick_chromatic(r0: Vec3, cos_theta: f32) -> Vec3 {
    r0 + (Vec3::ONE - r0) * schlick_weight(cos_theta)
}

fn lambda_anisotropic(w: Vec3, a_x: f32, a_y: f32) -> f32 {
    let tan2 = (w.x * w.x * a_x * a_x + w.y * w.y * a_y * a_y) / (w.z * w.z);
    (-1.0 + (1.0 + tan2).sqrt()) / 2.0
}

fn g1_anisotropic(w: Vec3, a_x: f32, a_y: f32) -> f32 {
    1.0 / (1.0 + lambda_anisotropic(w, a_x, a_y))
}

fn g2_anisotropic(w_out: Vec3, w_in: Vec3, m: Vec3, a_x: f32, a_y: f32) -> f32 {
    if w_out.dot(m) < 0.0 || w_in.dot(m) < 0.0 {
        return 0.0;
    }
    1.0 / (1.0 + lambda_anisotropic(w_out, a_x, a_y) + lambda_anisotropic(w_in, a_x, a_y))
}

fn brdf_metal(w_in: Vec3, w_out: Vec3, m: Vec3, a_x: f32, a_y: f32, albedo: Vec3) -> Vec3 {
    let f = fresnel_schlick_chromatic(albedo, w_in.dot(m).max(0.0));
    f * (g2_anisotropic(w_out, w_in, m, a_x, a_y) / g1_anisotropic(w_in, a_x, a_y))
}

/// Heitz 2018, "Sampling the GGX Distribution of Visible Normals". `ve` is
/// the view direction in the local frame with `ve.z >= 0`.
fn ggx_vndf_sample(ve: Vec3, a_x: f32, a_y: f32, u1: f32, u2: f32) -> Vec3 {
    let vh = Vec3::new(a_x * ve.x, a_y * ve.y, ve.z).normalize();

    let len_sq = vh.x * vh.x + vh.y * vh.y;
    let t1 = if len_sq > 0.0 {
        Vec3::new(-vh.y, vh.x, 0.0) / len_sq.sqrt()
    } else {
        Vec3::new(1.0, 0.0, 0.0)
    };
    let t2 = vh.cross(t1);

    let r = u1.sqrt();
    let phi = 2.0 * PI * u2;
    let t1_sample = r * phi.cos();
    let mut t2_sample = r * phi.sin();
    let s = 0.5 * (1.0 + vh.z);
    t2_sample = (1.0 - s) * (1.0 - t1_sample * t1_sample).max(0.0).sqrt() + s * t2_sample;

    let nh = t1 * t1_sample
        + t2 * t2_sample
        + vh * (1.0 - t1_sample * t1_sample - t2_sample * t2_sample).max(0.0).sqrt();

    Vec3::new(a_x * nh.x, a_y * nh.y, nh.z.max(0.0)).normalize()
}

pub(super) fn bounce_metal(
    albedo: Vec3,
    roughness: f32,
    anisotropic: f32,
    ray_in: &Ray,
    hit: &HitInfo,
    rng: &mut Rng,
) -> BounceResult {
    let frame = LocalFrame::from_normal(hit.unit_normal);
    let w_in = frame.to_local(-ray_in.dir.normalize());

    let aspect = (1.0 - 0.9 * anisotropic).sqrt();
    let a_min = 0.0001_f32;
    let a_x = (roughness * roughness / aspect).max(a_min);
    let a_y = (roughness * roughness * aspect).max(a_min);

    let m = ggx_vndf_sample(w_in, a_x, a_y, rng.uniform01(), rng.uniform01());
    let w_out = m * (2.0 * w_in.dot(m)) - w_in;

    if w_out.z <= 0.0 {
        return BounceResult {
            scattered: false,
            surface_color: Vec3::ZERO,
            emitted_color: Vec3::ZERO,
            ray_out: Ray::new(hit.position, hit.unit_normal, ray_in.time),
        };
    }

    let surface_color = brdf_metal(w_in, w_out, m, a_x, a_y, albedo);

    BounceResult {
        scattered: true,
        surface_color,
        emitted_color: Vec3::ZERO,
        ray_out: Ray::new(hit.position, frame.to_world(w_out), ray_in.time),
    }
}

// ---- Clearcoat (fixed-roughness GTR1) --------------------------------------

const CLEARCOAT_ROUGHNESS2: f32 = 0.25 * 0.25;

fn fresnel_schlick_achromatic(cos_theta: f32) -> f32 {
    const ETA: f32 = 1.5;
    const R0: f32 = (ETA - 1.0) * (ETA - 1.0) / ((ETA + 1.0) * (ETA + 1.0));
    R0 + (1.0 - R0) * schlick_weight(cos_theta)
}

fn gtr1(m: Vec3, a_g: f32) -> f32 {
    let a_g2 = a_g * a_g;
    (a_g2 - 1.0) / (2.0 * PI * a_g.ln() * (1.0 + (a_g2 - 1.0) * m.z * m.z))
}

fn lambda_clearcoat(w: Vec3) -> f32 {
    let tan2 = CLEARCOAT_ROUGHNESS2 * (1.0 - w.z * w.z) / (w.z * w.z);
    (-1.0 + (1.0 + tan2).sqrt()) / 2.0
}

fn g1_clearcoat(w: Vec3) -> f32 {
    1.0 / (1.0 + lambda_clearcoat(w))
}

fn g2_clearcoat(w_out: Vec3, w_in: Vec3, m: Vec3) -> f32 {
    if w_out.dot(m) < 0.0 || w_in.dot(m) < 0.0 {
        return 0.0;
    }
    1.0 / (1.0 + lambda_clearcoat(w_out) + lambda_clearcoat(w_in))
}

fn brdf_clearcoat(w_in: Vec3, w_out: Vec3, m: Vec3, a_g: f32) -> f32 {
    let f = fresnel_schlick_achromatic(w_in.dot(m).max(0.0));
    f * gtr1(m, a_g) * g2_clearcoat(w_out, w_in, m) / (4.0 * w_in.z.abs())
}

fn sample_clearcoat_normal(a_g: f32, u0: f32, u1: f32) -> Vec3 {
    let a_g2 = a_g * a_g;
    let cos_h_elev = ((1.0 - a_g2.powf(1.0 - u0)) / (1.0 - a_g2)).max(0.0).sqrt();
    let sin_h_elev = (1.0 - cos_h_elev * cos_h_elev).max(0.0).sqrt();
    let h_azi = 2.0 * PI * u1;
    Vec3::new(sin_h_elev * h_azi.cos(), sin_h_elev * h_azi.sin(), cos_h_elev)
}

fn sample_clearcoat_normal_pdf(m: Vec3, w_out: Vec3, a_g: f32) -> f32 {
    gtr1(m, a_g) * m.z.abs() / (4.0 * m.dot(w_out).abs())
}

pub(super) fn bounce_clearcoat(gloss: f32, ray_in: &Ray, hit: &HitInfo, rng: &mut Rng) -> BounceResult {
    let frame = LocalFrame::from_normal(hit.unit_normal);
    let w_in = frame.to_local(-ray_in.dir.normalize());

    let a_g = (1.0 - gloss) * 0.1 + gloss * 0.001;
    let m = sample_clearcoat_normal(a_g, rng.uniform01(), rng.uniform01());
    let w_out = m * (2.0 * w_in.dot(m)) - w_in;

    if w_out.z <= 0.0 {
        return BounceResult {
            scattered: false,
            surface_color: Vec3::ZERO,
            emitted_color: Vec3::ZERO,
            ray_out: Ray::new(hit.position, hit.unit_normal, ray_in.time),
        };
    }

    let pdf = sample_clearcoat_normal_pdf(m, w_out, a_g);
    let color = if pdf > 1e-6 {
        brdf_clearcoat(w_in, w_out, m, a_g) / pdf
    } else {
        0.0
    };

    BounceResult {
        scattered: true,
        surface_color: Vec3::splat(color),
        emitted_color: Vec3::ZERO,
        ray_out: Ray::new(hit.position, frame.to_world(w_out), ray_in.time),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_down_hit() -> (Ray, HitInfo) {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, -1.0), 0.0);
        let mut hit = HitInfo::default();
        hit.set_face_normal(&ray, Vec3::Z);
        hit.position = Vec3::ZERO;
        (ray, hit)
    }

    #[test]
    fn diffuse_bounce_stays_in_hemisphere_and_has_nonnegative_color() {
        let (ray, hit) = straight_down_hit();
        let mut rng = Rng::seed(11, 22);
        for _ in 0..64 {
            let result = bounce(Vec3::splat(0.8), 0.5, 0.3, &ray, &hit, &mut rng);
            assert!(result.scattered);
            assert!(result.ray_out.dir.dot(hit.unit_normal) >= -1e-5);
            assert!(result.surface_color.x >= 0.0);
            assert!(result.surface_color.y >= 0.0);
            assert!(result.surface_color.z >= 0.0);
        }
    }

    #[test]
    fn metal_bounce_reflects_above_hemisphere_when_scattered() {
        let (ray, hit) = straight_down_hit();
        let mut rng = Rng::seed(3, 4);
        for _ in 0..64 {
            let result = bounce_metal(Vec3::splat(0.9), 0.3, 0.0, &ray, &hit, &mut rng);
            if result.scattered {
                assert!(result.ray_out.dir.dot(hit.unit_normal) > 0.0);
            }
        }
    }

    #[test]
    fn clearcoat_bounce_color_is_nonnegative() {
        let (ray, hit) = straight_down_hit();
        let mut rng = Rng::seed(5, 6);
        for _ in 0..64 {
            let result = bounce_clearcoat(0.5, &ray, &hit, &mut rng);
            assert!(result.surface_color.x >= 0.0);
        }
    }

    #[test]
    fn ggx_vndf_sample_normal_is_unit_length() {
        let ve = Vec3::new(0.1, 0.2, 0.97).normalize();
        let n = ggx_vndf_sample(ve, 0.2, 0.4, 0.3, 0.7);
        assert!((n.length() - 1.0).abs() < 1e-4);
    }
}
