//! Complaint code generation.
//!
//! A code is the last six digits of the current millisecond timestamp followed
//! by three random digits. Codes are unique by convention only; the store
//! rejects duplicates and callers regenerate.

use crate::datetime::Clock;
use parking_lot::Mutex;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::fmt;
use std::sync::Arc;
use vcm_domain::ComplaintCode;

/// Produces complaint codes for new submissions
pub trait CodeGenerator: Send + Sync + fmt::Debug {
    fn next_code(&self) -> ComplaintCode;
}

/// Timestamp-plus-random generator driven by an injected clock and RNG
pub struct TimestampCodeGenerator {
    clock: Arc<dyn Clock>,
    rng: Mutex<StdRng>,
}

impl TimestampCodeGenerator {
    /// Generator seeded from OS entropy
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic generator for tests
    pub fn seeded(clock: Arc<dyn Clock>, seed: u64) -> Self {
        Self {
            clock,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl fmt::Debug for TimestampCodeGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimestampCodeGenerator")
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl CodeGenerator for TimestampCodeGenerator {
    fn next_code(&self) -> ComplaintCode {
        let millis = self.clock.now().timestamp_millis();
        let random: u32 = self.rng.lock().gen_range(0..1_000);
        ComplaintCode::compose(millis, random)
    }
}
