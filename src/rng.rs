//! Deterministic random stream.
//!
//! Every random choice made during synthesis flows through one [`RngStream`],
//! so a seed pins the entire generation. The stream is SplitMix64: fast,
//! portable, and reproducible across platforms. Batch generation derives one
//! independent substream per generation index, so the programs in a batch do
//! not depend on each other or on thread scheduling.

/// A seedable pseudo-random stream.
///
/// Streams only ever advance; reproducing a draw sequence means recreating
/// the stream from the same seed and replaying the same calls in the same
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RngStream {
    state: u64,
}

impl RngStream {
    /// Create a stream from a seed.
    #[inline]
    pub const fn new(seed: u64) -> Self {
        // SplitMix64 needs a non-zero state
        let state = if seed == 0 { 0x9E3779B97F4A7C15 } else { seed };
        Self { state }
    }

    /// Derive the independent substream for `index` under a parent seed.
    ///
    /// Used for batches: generation `i` draws from `derive(seed, i)` and is
    /// unaffected by how many other generations run or in what order.
    #[inline]
    pub fn derive(parent_seed: u64, index: u64) -> Self {
        Self::new(splitmix64_mix(parent_seed ^ index))
    }

    /// Current internal state. `new(state())` clones the stream position.
    #[inline]
    pub const fn state(&self) -> u64 {
        self.state
    }

    /// Next raw u64.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E3779B97F4A7C15);
        splitmix64_mix(self.state)
    }

    /// Next u32, uniform over the full 32-bit range.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        // Upper bits of SplitMix64 output are the well-mixed ones
        (self.next_u64() >> 32) as u32
    }

    /// Uniform f64 in [0, 1).
    #[inline]
    pub fn uniform(&mut self) -> f64 {
        // Upper 53 bits, matching f64 mantissa precision
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// True with the given probability.
    #[inline]
    pub fn chance(&mut self, probability: f64) -> bool {
        self.uniform() < probability
    }

    /// Uniform index in `[0, len)`, or 0 when `len` is 0.
    #[inline]
    pub fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        (self.next_u64() % len as u64) as usize
    }
}

/// SplitMix64 mixing function, also used for substream derivation.
#[inline]
const fn splitmix64_mix(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = RngStream::new(42);
        let mut b = RngStream::new(42);
        for _ in 0..1000 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn test_zero_seed_is_remapped() {
        let stream = RngStream::new(0);
        assert_ne!(stream.state(), 0);
    }

    #[test]
    fn test_uniform_in_unit_interval() {
        let mut stream = RngStream::new(12345);
        for _ in 0..1000 {
            let v = stream.uniform();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_index_in_bounds() {
        let mut stream = RngStream::new(12345);
        for _ in 0..1000 {
            assert!(stream.index(7) < 7);
        }
        assert_eq!(stream.index(1), 0);
        assert_eq!(stream.index(0), 0);
    }

    #[test]
    fn test_chance_ratio_roughly_half() {
        let mut stream = RngStream::new(12345);
        let n = 10_000;
        let hits = (0..n).filter(|_| stream.chance(0.5)).count();
        let ratio = hits as f64 / n as f64;
        assert!(
            (ratio - 0.5).abs() < 0.05,
            "expected ~50%, got {}%",
            ratio * 100.0
        );
    }

    #[test]
    fn test_derive_is_deterministic_and_distinct() {
        assert_eq!(RngStream::derive(7, 0), RngStream::derive(7, 0));
        assert_ne!(RngStream::derive(7, 0), RngStream::derive(7, 1));
        assert_ne!(RngStream::derive(7, 1), RngStream::derive(8, 1));
    }

    #[test]
    fn test_state_round_trips_stream_position() {
        let mut stream = RngStream::new(99);
        stream.next_u64();
        stream.next_u64();
        let mut resumed = RngStream::new(stream.state());
        assert_eq!(stream.next_u64(), resumed.next_u64());
    }

    /// Pinned outputs; if this fails, every seeded generation changes.
    #[test]
    fn test_determinism_regression() {
        let mut stream = RngStream::new(0xC0FFEE);
        assert_eq!(stream.next_u64(), 0xCA8216FA9058D0FA);
        assert_eq!(stream.next_u64(), 0xECE45BABCE870479);
        assert_eq!(stream.next_u64(), 0x87BE93A4A16A73CB);
        assert_eq!(stream.next_u32(), 0x5A71C089);
    }
}
