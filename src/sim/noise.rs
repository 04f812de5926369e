//! Seeded 1-D gradient noise
//!
//! Coherent and continuous: nearby inputs give nearby outputs, unlike raw
//! random samples. The permutation table is fixed at construction, so a seed
//! fully determines the signal.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;

const TABLE_SIZE: usize = 256;

#[derive(Debug, Clone)]
pub struct SmoothNoise {
    perm: [u8; TABLE_SIZE],
}

impl SmoothNoise {
    pub fn new(seed: u64) -> Self {
        let mut perm = [0u8; TABLE_SIZE];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = i as u8;
        }
        let mut rng = Pcg32::seed_from_u64(seed);
        perm.shuffle(&mut rng);
        Self { perm }
    }

    /// Gradient at lattice point `i`, in [-1, 1]
    #[inline]
    fn gradient(&self, i: i32) -> f32 {
        let h = self.perm[(i & (TABLE_SIZE as i32 - 1)) as usize];
        h as f32 / 127.5 - 1.0
    }

    /// Sample at `t`, in [-1, 1]
    pub fn sample(&self, t: f32) -> f32 {
        let t = crate::finite_or_zero(t);
        let cell = t.floor();
        let i0 = cell as i32;
        let f = t - cell;

        let d0 = self.gradient(i0) * f;
        let d1 = self.gradient(i0.wrapping_add(1)) * (f - 1.0);

        // Quintic fade keeps the first and second derivative continuous
        let u = f * f * f * (f * (f * 6.0 - 15.0) + 10.0);
        (crate::lerp(d0, d1, u) * 2.0).clamp(-1.0, 1.0)
    }
}
