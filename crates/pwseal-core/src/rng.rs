use thiserror::Error;

#[derive(Debug, Error)]
pub enum RngError {
    #[error("secure randomness source unavailable")]
    EntropyUnavailable,
}

/// Injected source of cryptographically secure randomness.
///
/// Every operation that consumes entropy takes one of these instead of
/// reaching for a process-wide generator, so tests can substitute a
/// deterministic source.
pub trait SecureRandom {
    fn fill(&mut self, out: &mut [u8]) -> Result<(), RngError>;

    /// Uniform index in `[0, bound)` without modulo bias.
    ///
    /// # Panics
    ///
    /// Panics if `bound` is zero.
    fn next_index(&mut self, bound: usize) -> Result<usize, RngError> {
        assert!(bound > 0, "cannot sample from an empty range");

        let limit = bound as u64;
        let max = u64::MAX - (u64::MAX % limit);
        loop {
            let mut bytes = [0_u8; 8];
            self.fill(&mut bytes)?;
            let candidate = u64::from_le_bytes(bytes);
            if candidate < max {
                return Ok((candidate % limit) as usize);
            }
        }
    }
}

/// Operating-system entropy via `getrandom`.
///
/// Failure to read the OS source is surfaced as
/// [`RngError::EntropyUnavailable`]; there is no fallback to a weaker
/// generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl SecureRandom for OsEntropy {
    fn fill(&mut self, out: &mut [u8]) -> Result<(), RngError> {
        getrandom::fill(out).map_err(|_| RngError::EntropyUnavailable)
    }
}

pub(crate) fn random_bytes<const N: usize>(
    rng: &mut dyn SecureRandom,
) -> Result<[u8; N], RngError> {
    let mut out = [0_u8; N];
    rng.fill(&mut out)?;
    Ok(out)
}
