use crate::ports::RandomSource;
use rand::Rng;

/// Random source backed by the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandomSource;

impl OsRandomSource {
    /// Create a new random source.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl RandomSource for OsRandomSource {
    fn unit(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}
