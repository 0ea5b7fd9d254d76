use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Source of every random decision the bot makes: fallback feelings,
/// category order, media picks and the attachment roll.
pub trait RandomSource: Send + Sync {
    /// Uniform index in `0..len`. `len` is never zero.
    fn index(&self, len: usize) -> usize;

    /// Shuffles `items` in place.
    fn shuffle(&self, items: &mut [&'static str]);

    /// Uniform draw in `[0, 1)`.
    fn roll(&self) -> f64;
}

/// Thread-local RNG, fresh handle per call so nothing is held across awaits.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn index(&self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }

    fn shuffle(&self, items: &mut [&'static str]) {
        items.shuffle(&mut rand::rng());
    }

    fn roll(&self) -> f64 {
        rand::rng().random::<f64>()
    }
}

/// Reproducible source for tests and replays.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        SeededRandom {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut guard = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut *guard)
    }
}

impl RandomSource for SeededRandom {
    fn index(&self, len: usize) -> usize {
        self.with_rng(|rng| rng.random_range(0..len))
    }

    fn shuffle(&self, items: &mut [&'static str]) {
        self.with_rng(|rng| items.shuffle(rng));
    }

    fn roll(&self) -> f64 {
        self.with_rng(|rng| rng.random::<f64>())
    }
}
