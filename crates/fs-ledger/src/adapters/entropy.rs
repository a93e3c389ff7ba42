//! Entropy sources for oracle index draws

use crate::ports::outbound::EntropySource;
use rand::rngs::OsRng;
use rand::RngCore;

/// Operating-system randomness
#[derive(Clone, Copy, Debug, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn entropy(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        bytes
    }
}

/// Constant entropy, for reproducible runs and tests
#[derive(Clone, Copy, Debug)]
pub struct FixedEntropy(pub [u8; 32]);

impl EntropySource for FixedEntropy {
    fn entropy(&self) -> [u8; 32] {
        self.0
    }
}
