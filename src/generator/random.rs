use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Source of randomness for account synthesis
///
/// Injected so tests can fix the sequence of genders, names and pictures.
pub trait RandomSource: Send + Sync {
    /// Uniform index in `0..len`; `len` is never zero
    fn pick_index(&self, len: usize) -> usize;

    /// Fair coin flip
    fn coin_flip(&self) -> bool;
}

/// Seedable StdRng behind a mutex
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_os() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }
}

impl RandomSource for SeededRandom {
    fn pick_index(&self, len: usize) -> usize {
        self.rng.lock().unwrap().random_range(0..len)
    }

    fn coin_flip(&self) -> bool {
        self.rng.lock().unwrap().random_bool(0.5)
    }
}

/// Picks one element uniformly at random
pub fn choose<'a, T>(random: &dyn RandomSource, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        None
    } else {
        items.get(random.pick_index(items.len()))
    }
}
