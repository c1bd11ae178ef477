//! Seeded random source for reproducible training.
//!
//! A small xorshift64 generator. Every randomized operation in the crate
//! (parameter initialization, dropout masks, batch shuffling) takes one of
//! these explicitly, so two runs with the same seed are identical.

const FALLBACK_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

fn splitmix64(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Xorshift64 pseudo random number generator.
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    /// Create a new RNG with explicit seed (zero maps to a fixed value).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { FALLBACK_SEED } else { seed };
        Self { state }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform sample in [0, 1) with 53 bits of precision.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform sample in [low, high).
    pub fn gen_range_f64(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_f64()
    }

    /// Integer sample in [0, upper).
    pub fn gen_usize(&mut self, upper: usize) -> usize {
        if upper == 0 {
            0
        } else {
            (self.next_u64() % upper as u64) as usize
        }
    }

    /// Derive an independent generator, advancing this one.
    ///
    /// Layers that sample on every forward pass own a forked stream so that
    /// the parent can keep feeding other consumers. The child seed is
    /// scrambled with splitmix64 so the child never replays the parent.
    pub fn fork(&mut self) -> SimpleRng {
        SimpleRng::new(splitmix64(self.next_u64()))
    }

    /// Fisher-Yates shuffle for usize slices.
    pub fn shuffle_usize(&mut self, data: &mut [usize]) {
        if data.len() <= 1 {
            return;
        }
        for i in (1..data.len()).rev() {
            let j = self.gen_usize(i + 1);
            data.swap(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut rng1 = SimpleRng::new(42);
        let mut rng2 = SimpleRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.next_u64(), rng2.next_u64());
        }
    }

    #[test]
    fn test_zero_seed_uses_fallback() {
        let mut zero = SimpleRng::new(0);
        let mut fallback = SimpleRng::new(FALLBACK_SEED);
        assert_eq!(zero.next_u64(), fallback.next_u64());
    }

    #[test]
    fn test_rng_next_f64_range() {
        let mut rng = SimpleRng::new(12345);

        for _ in 0..1000 {
            let val = rng.next_f64();
            assert!((0.0..1.0).contains(&val));
        }
    }

    #[test]
    fn test_rng_gen_range_f64() {
        let mut rng = SimpleRng::new(67890);

        for _ in 0..1000 {
            let val = rng.gen_range_f64(-1.0, 1.0);
            assert!((-1.0..1.0).contains(&val));
        }
    }

    #[test]
    fn test_rng_gen_usize() {
        let mut rng = SimpleRng::new(11111);

        for _ in 0..1000 {
            assert!(rng.gen_usize(10) < 10);
        }
        assert_eq!(rng.gen_usize(0), 0);
    }

    #[test]
    fn test_fork_diverges_from_parent() {
        let mut parent = SimpleRng::new(7);
        let mut child = parent.fork();
        assert_ne!(parent.next_u64(), child.next_u64());
    }

    #[test]
    fn test_fork_does_not_replay_parent() {
        let mut parent = SimpleRng::new(5);
        let mut child = parent.fork();
        let from_parent: Vec<u64> = (0..100).map(|_| parent.next_u64()).collect();
        let from_child: Vec<u64> = (0..100).map(|_| child.next_u64()).collect();
        assert!(from_child.iter().all(|v| !from_parent.contains(v)));
    }

    #[test]
    fn test_shuffle_usize() {
        let mut rng = SimpleRng::new(33333);
        let mut data: Vec<usize> = (0..10).collect();
        let original = data.clone();

        rng.shuffle_usize(&mut data);

        let mut sorted = data.clone();
        sorted.sort();
        assert_eq!(sorted, original);
        assert_ne!(data, original);
    }

    #[test]
    fn test_shuffle_single() {
        let mut rng = SimpleRng::new(55555);
        let mut data = vec![42];
        rng.shuffle_usize(&mut data);
        assert_eq!(data, vec![42]);
    }
}
