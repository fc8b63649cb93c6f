//! Per-thread xoshiro128+ pseudorandom generator.
//!
//! Every render worker owns one [`Rng`]; it is seeded from a hardware
//! entropy source and then advanced with [`Rng::jump`] so that concurrent
//! workers draw from non-overlapping subsequences of the same generator.

use glam::{Vec2, Vec3};
use std::cell::RefCell;

use crate::math::{self, Basis3};

/// This is xoshiro128+ 1.0: David Blackman and Sebastiano Vigna's fastest
/// 32-bit generator for 32-bit floating point numbers. The top bits of each
/// `u32` output are used for float generation; the low four bits have lower
/// linear complexity and are avoided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rng {
    s: [u32; 4],
}

const JUMP: [u32; 4] = [0x8764000b, 0xf542d2d3, 0x6fa035c3, 0x77f2db5b];

impl Rng {
    /// Seeds from two 64-bit values and immediately jumps ahead, matching
    /// the reference generator's `Random_Seed`.
    pub fn seed(s1: u64, s2: u64) -> Self {
        let mut rng = Self {
            s: [s1 as u32, (s1 >> 32) as u32, s2 as u32, (s2 >> 32) as u32],
        };
        rng.jump();
        rng
    }

    /// Seeds from the hardware `RDRAND` instruction on `x86_64`, falling
    /// back to a time/address-derived seed on other architectures (there is
    /// no portable hardware entropy instruction to call instead).
    pub fn seed_high_entropy() -> Self {
        let (s1, s2) = Self::hardware_entropy();
        Self::seed(s1, s2)
    }

    #[cfg(target_arch = "x86_64")]
    fn hardware_entropy() -> (u64, u64) {
        use std::arch::x86_64::_rdrand64_step;

        let mut draw = |mut slot: u64| -> u64 {
            // SAFETY: _rdrand64_step only ever writes through the pointer we give it.
            while unsafe { _rdrand64_step(&mut slot) } == 0 {}
            slot
        };
        (draw(0), draw(0))
    }

    #[cfg(not(target_arch = "x86_64"))]
    fn hardware_entropy() -> (u64, u64) {
        use std::time::{SystemTime, UNIX_EPOCH};
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        let addr = &nanos as *const u64 as u64;
        (nanos, addr)
    }

    #[cfg(test)]
    fn from_raw_state(s: [u32; 4]) -> Self {
        Self { s }
    }

    #[inline]
    fn rotl(x: u32, k: u32) -> u32 {
        (x << k) | (x >> (32 - k))
    }

    /// Advances the generator one step, returning the next raw `u32`.
    pub fn next_u32(&mut self) -> u32 {
        let result = self.s[0].wrapping_add(self.s[3]);
        let t = self.s[1] << 9;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = Self::rotl(self.s[3], 11);

        result
    }

    /// Equivalent to 2^64 calls to [`Rng::next_u32`]; advances to a
    /// non-overlapping subsequence, used to decorrelate parallel workers.
    pub fn jump(&mut self) {
        let mut s0 = 0u32;
        let mut s1 = 0u32;
        let mut s2 = 0u32;
        let mut s3 = 0u32;

        for word in JUMP {
            for b in 0..32 {
                if word & (1 << b) != 0 {
                    s0 ^= self.s[0];
                    s1 ^= self.s[1];
                    s2 ^= self.s[2];
                    s3 ^= self.s[3];
                }
                self.next_u32();
            }
        }

        self.s = [s0, s1, s2, s3];
    }

    /// A uniform float in `[0, 1)`, built directly from the top 23 bits of
    /// the next raw output (the IEEE-754 mantissa trick).
    pub fn uniform01(&mut self) -> f32 {
        let bits = (self.next_u32() >> 9) | 0x3f80_0000;
        f32::from_bits(bits) - 1.0
    }

    /// A uniform float in `[min, max)`.
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.uniform01()
    }

    /// A uniform point inside the unit disc, used for thin-lens sampling.
    pub fn in_unit_disc(&mut self) -> Vec2 {
        loop {
            let p = Vec2::new(self.range(-1.0, 1.0), self.range(-1.0, 1.0));
            if p.length_squared() < 1.0 {
                return p;
            }
        }
    }

    /// A uniform direction on the unit sphere surface.
    pub fn on_unit_sphere(&mut self) -> Vec3 {
        let cos_theta = self.range(-1.0, 1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
        let phi = self.range(0.0, std::f32::consts::TAU);
        Vec3::new(phi.cos() * sin_theta, phi.sin() * sin_theta, cos_theta)
    }

    /// A uniform direction in the hemisphere around `normal`, scaled by `radius`.
    pub fn in_hemisphere(&mut self, normal: Vec3, radius: f32) -> Vec3 {
        let v = self.on_unit_sphere() * radius;
        if v.dot(normal) > 0.0 { v } else { -v }
    }

    /// A direction sampled uniformly over the hemisphere around `unit_normal`.
    pub fn uniform_hemisphere(&mut self, unit_normal: Vec3) -> Vec3 {
        let e0 = self.uniform01();
        let e1 = self.uniform01();

        let cos_theta = e0;
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
        let phi = std::f32::consts::TAU * e1;

        let local = Vec3::new(phi.cos() * sin_theta, cos_theta, phi.sin() * sin_theta);
        reoriented_basis(unit_normal).reorient(local)
    }

    /// A direction sampled with probability proportional to `cos(theta)`
    /// over the hemisphere around `unit_normal`. Used by the Disney diffuse
    /// lobe, whose `1/pdf = pi` cancels this sampler's cosine weighting.
    pub fn cosine_weighted_hemisphere(&mut self, unit_normal: Vec3) -> Vec3 {
        let e0 = self.uniform01();
        let e1 = self.uniform01();

        let sin_theta = (1.0 - e0).sqrt();
        let cos_theta = e0.sqrt();
        let phi = std::f32::consts::TAU * e1;

        let local = Vec3::new(phi.cos() * sin_theta, cos_theta, phi.sin() * sin_theta);
        reoriented_basis(unit_normal).reorient(local)
    }
}

/// `Distribution_*_Sample` in the reference build the basis from the
/// normal, then swap `x`/`y` so the sampled local frame's `y` axis (the
/// cosine-weighted pole) aligns with the basis's original `x` (the normal).
fn reoriented_basis(unit_normal: Vec3) -> Basis3 {
    let b = math::orthonormal_basis(unit_normal);
    Basis3 {
        x: b.y,
        y: b.x,
        z: b.z,
    }
}

thread_local! {
    static THREAD_RNG: RefCell<Option<Rng>> = const { RefCell::new(None) };
}

/// Runs `f` with this thread's [`Rng`], seeding it from hardware entropy on
/// first use. Each render worker thread gets its own independent state.
pub fn with_thread_rng<R>(f: impl FnOnce(&mut Rng) -> R) -> R {
    THREAD_RNG.with(|cell| {
        let mut slot = cell.borrow_mut();
        let rng = slot.get_or_insert_with(Rng::seed_high_entropy);
        f(rng)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_stream_from_fixed_state() {
        let mut rng = Rng::from_raw_state([1, 2, 3, 4]);
        assert_eq!(rng.next_u32(), 5);
        assert_eq!(rng.next_u32(), 12295);
        assert_eq!(rng.s, [12295, 1029, 1029, 25_165_824]);
    }

    #[test]
    fn uniform01_is_in_unit_interval() {
        let mut rng = Rng::seed(42, 1337);
        for _ in 0..1000 {
            let x = rng.uniform01();
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn jump_decorrelates_two_streams() {
        let mut a = Rng::seed(1, 1);
        let mut b = a;
        b.jump();

        let seq_a: Vec<u32> = (0..8).map(|_| a.next_u32()).collect();
        let seq_b: Vec<u32> = (0..8).map(|_| b.next_u32()).collect();
        assert_ne!(seq_a, seq_b);
    }

    #[test]
    fn cosine_weighted_hemisphere_mean_approaches_two_thirds() {
        let mut rng = Rng::seed(7, 99);
        let normal = Vec3::new(0.0, 0.0, 1.0);
        let n = 20_000;
        let mut sum = Vec3::ZERO;
        for _ in 0..n {
            let d = rng.cosine_weighted_hemisphere(normal);
            assert!(d.dot(normal) >= -1e-5);
            sum += d;
        }
        let mean = sum / n as f32;
        let tolerance = 3.0 / (n as f32).sqrt();
        assert!((mean.z - 2.0 / 3.0).abs() < tolerance, "mean.z = {}", mean.z);
    }
}
