//! Seeded pseudo-random stream and 1-D value noise.
//!
//! Everything here is pure integer mixing: the same seed always yields the
//! same sequence, which is what lets the tree and ground regenerate
//! identically after a resize.

/// Small deterministic generator (mulberry32 mixing).
#[derive(Debug, Clone)]
pub struct NoiseRng {
    state: u32,
}

impl NoiseRng {
    pub fn seed(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Next value in `[0, 1)`.
    pub fn next(&mut self) -> f32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^= t >> 14;
        // top 24 bits keep the result strictly below 1.0 in f32
        (t >> 8) as f32 / 16_777_216.0
    }

    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + self.next() * (hi - lo)
    }

    /// Integer in `lo..=hi`.
    pub fn range_u32(&mut self, lo: u32, hi: u32) -> u32 {
        let span = (hi - lo + 1) as f32;
        (lo + (self.next() * span) as u32).min(hi)
    }
}

/// Stateless hash of an integer lattice point, in `[-1, 1]`.
pub fn hash1(i: i32, seed: u32) -> f32 {
    let mut h = (i as u32).wrapping_mul(0x1656_67B1) ^ seed.wrapping_mul(0x27D4_EB2F);
    h = (h ^ (h >> 13)).wrapping_mul(0x4BEA_5A21);
    h ^= h >> 16;
    (h as f64 / u32::MAX as f64 * 2.0 - 1.0) as f32
}

fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

pub fn value_noise_1d(x: f32, seed: u32) -> f32 {
    let x0 = x.floor();
    let t = smoothstep(x - x0);
    let i = x0 as i32;
    let a = hash1(i, seed);
    let b = hash1(i.wrapping_add(1), seed);
    a + (b - a) * t
}

/// Three-octave fBm. Weights sum to one, so the result stays in `[-1, 1]`.
pub fn fbm_1d(x: f32, seed: u32) -> f32 {
    0.62 * value_noise_1d(x, seed)
        + 0.26 * value_noise_1d(x * 2.03 + 17.13, seed)
        + 0.12 * value_noise_1d(x * 4.01 + 41.7, seed)
}

/// Mixes two dimensions into one seed.
pub fn mix_seed(a: u32, b: u32) -> u32 {
    let mut h = a.wrapping_mul(0x9E37_79B1) ^ b.wrapping_mul(0x85EB_CA77);
    h ^= h >> 16;
    h = h.wrapping_mul(0x7FEB_352D);
    h ^= h >> 15;
    h = h.wrapping_mul(0x846C_A68B);
    h ^ (h >> 16)
}
