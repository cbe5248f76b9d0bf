//! Identifier generators.
//!
//! Three encodings are provided:
//! - [`RandomIdGenerator`]: 16 random bytes as 32 lowercase hex characters
//! - [`TimestampIdGenerator`]: `<secs>.<micros>.<4 hex>` (the default)
//! - [`UuidIdGenerator`]: hyphenated UUID v4
//!
//! Time and randomness are injected through [`ClockSource`] and
//! [`EntropySource`] so tests can pin both.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rand::rngs::OsRng;
use rand::TryRngCore;
use tracing::debug;

use crate::error::IdError;
use crate::traits::IdGenerator;
use crate::types::RequestId;

const RANDOM_ID_BYTES: usize = 16;
const TIMESTAMP_SUFFIX_BYTES: usize = 2;

// ---------------------------------------------------------------------------
// Injected collaborators
// ---------------------------------------------------------------------------

/// Abstraction over the wall clock.
pub trait ClockSource: Send + Sync {
    /// Returns the time elapsed since the Unix epoch.
    fn now(&self) -> Duration;
}

/// Reads the real system time. A clock set before the epoch reads as zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now(&self) -> Duration {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
    }
}

/// Source of cryptographically secure random bytes.
pub trait EntropySource: Send + Sync {
    /// Fills `buf` completely.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::Entropy`] if the bytes could not be produced.
    fn fill(&self, buf: &mut [u8]) -> Result<(), IdError>;
}

/// Operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, buf: &mut [u8]) -> Result<(), IdError> {
        OsRng.try_fill_bytes(buf).map_err(|e| IdError::Entropy {
            reason: e.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// RandomIdGenerator
// ---------------------------------------------------------------------------

/// 128 bits of entropy encoded as 32 lowercase hex characters.
#[derive(Clone)]
pub struct RandomIdGenerator {
    entropy: Arc<dyn EntropySource>,
}

impl RandomIdGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::with_entropy(OsEntropy)
    }

    #[must_use]
    pub fn with_entropy(entropy: impl EntropySource + 'static) -> Self {
        Self {
            entropy: Arc::new(entropy),
        }
    }
}

impl Default for RandomIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for RandomIdGenerator {
    fn generate(&self) -> Result<RequestId, IdError> {
        let mut buf = [0u8; RANDOM_ID_BYTES];
        self.entropy.fill(&mut buf)?;
        Ok(RequestId::new(hex::encode(buf)))
    }
}

// ---------------------------------------------------------------------------
// TimestampIdGenerator
// ---------------------------------------------------------------------------

/// Wall-clock seconds with microsecond precision plus a short random suffix,
/// e.g. `1700000000.123456.9f3a`.
///
/// The suffix separates identifiers minted within the same clock tick. If
/// entropy is unavailable the suffix falls back to `0000` rather than
/// failing, so this generator never returns an error.
#[derive(Clone)]
pub struct TimestampIdGenerator {
    clock: Arc<dyn ClockSource>,
    entropy: Arc<dyn EntropySource>,
}

impl TimestampIdGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::with_sources(SystemClock, OsEntropy)
    }

    #[must_use]
    pub fn with_sources(
        clock: impl ClockSource + 'static,
        entropy: impl EntropySource + 'static,
    ) -> Self {
        Self {
            clock: Arc::new(clock),
            entropy: Arc::new(entropy),
        }
    }
}

impl Default for TimestampIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for TimestampIdGenerator {
    fn generate(&self) -> Result<RequestId, IdError> {
        let mut suffix = [0u8; TIMESTAMP_SUFFIX_BYTES];
        if let Err(error) = self.entropy.fill(&mut suffix) {
            debug!(%error, "timestamp id suffix falling back to zero bytes");
            suffix = [0u8; TIMESTAMP_SUFFIX_BYTES];
        }

        let now = self.clock.now();
        Ok(RequestId::new(format!(
            "{}.{:06}.{}",
            now.as_secs(),
            now.subsec_micros(),
            hex::encode(suffix)
        )))
    }
}

// ---------------------------------------------------------------------------
// UuidIdGenerator
// ---------------------------------------------------------------------------

/// Hyphenated lowercase UUID v4.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn generate(&self) -> Result<RequestId, IdError> {
        Ok(RequestId::new(uuid::Uuid::new_v4().to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
