//! Wall-clock abstraction used for token expiry checks.
//!
//! Production code reads the system clock; tests pin time with [`FixedClock`]
//! so expiry decisions are deterministic.

use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the current UTC instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;

    /// Current time as whole seconds since the Unix epoch.
    ///
    /// Instants before the epoch clamp to zero.
    fn unix_seconds(&self) -> i64 {
        self.now()
            .duration_since(UNIX_EPOCH)
            .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// A clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub SystemTime);

impl FixedClock {
    pub fn at_unix(secs: u64) -> Self {
        Self(UNIX_EPOCH + std::time::Duration::from_secs(secs))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> SystemTime {
        self.0
    }
}
