use rand::{Rng, SeedableRng, rngs::SmallRng};

/// Source of random positions for [`crate::RandMap`].
///
/// `index(len)` is only called with `len > 0` and must return a value in
/// `0..len`. Any `FnMut(usize) -> usize` is a source, so a test can pass
/// `|_| 0` to always pick the first key in the list.
pub trait RandomSource {
    fn index(&mut self, len: usize) -> usize;
}

impl<FunctionT> RandomSource for FunctionT
where
    FunctionT: FnMut(usize) -> usize,
{
    #[inline(always)]
    fn index(&mut self, len: usize) -> usize {
        self(len)
    }
}

/// Uniform source backed by a `SmallRng`.
#[derive(Clone, Debug)]
pub struct SmallRngSource {
    rng: SmallRng,
}

impl SmallRngSource {
    /// Same seed, same sequence of positions.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }
}

impl Default for SmallRngSource {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl RandomSource for SmallRngSource {
    #[inline(always)]
    fn index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        self.rng.gen_range(0..len)
    }
}

/// Uniform source drawing from the thread-local generator of the calling thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadRngSource;

impl RandomSource for ThreadRngSource {
    #[inline(always)]
    fn index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        rand::thread_rng().gen_range(0..len)
    }
}
