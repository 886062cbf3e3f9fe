//! Access key generation.
//!
//! Keys are drawn uniformly from [`KEY_ALPHABET`]. Access keys are
//! [`ACCESS_KEY_LEN`] characters, secret keys [`SECRET_KEY_LEN`].

use std::fmt;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Characters keys are drawn from.
pub const KEY_ALPHABET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789/+=";

/// Length of a generated access key ID.
pub const ACCESS_KEY_LEN: usize = 20;

/// Length of a generated secret access key.
pub const SECRET_KEY_LEN: usize = 40;

/// Source of random key material.
pub trait KeyGenerator: Send + Sync + fmt::Debug {
    /// Generate a random string of `len` characters from [`KEY_ALPHABET`].
    fn generate(&self, len: usize) -> String;

    /// Generate an `(access_key, secret_key)` pair.
    fn key_pair(&self) -> (String, String) {
        (self.generate(ACCESS_KEY_LEN), self.generate(SECRET_KEY_LEN))
    }
}

/// Key generator backed by the thread-local OS-seeded RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomKeyGenerator;

impl KeyGenerator for RandomKeyGenerator {
    fn generate(&self, len: usize) -> String {
        draw(&mut rand::rng(), len)
    }
}

/// Deterministic key generator for tests and reproducible runs.
pub struct SeededKeyGenerator {
    rng: Mutex<StdRng>,
}

impl SeededKeyGenerator {
    /// Create a generator from a fixed seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl fmt::Debug for SeededKeyGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeededKeyGenerator").finish_non_exhaustive()
    }
}

impl KeyGenerator for SeededKeyGenerator {
    fn generate(&self, len: usize) -> String {
        draw(&mut *self.rng.lock(), len)
    }
}

fn draw<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| char::from(KEY_ALPHABET[rng.random_range(0..KEY_ALPHABET.len())]))
        .collect()
}
