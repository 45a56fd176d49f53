//! Millisecond duration with a plain-integer serde form.
//!
//! Budgets and metrics are configuration and telemetry payloads, so they
//! serialize as a single `u64` rather than serde's `{"secs", "nanos"}` pair.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Duration in whole milliseconds.
///
/// ```
/// use reprise_types::DurationMs;
///
/// let d = DurationMs::from_secs(2);
/// assert_eq!(d.as_millis(), 2000);
/// assert_eq!(serde_json::to_string(&d).unwrap(), "2000");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DurationMs(u64);

impl DurationMs {
    /// Zero duration.
    pub const ZERO: Self = Self(0);

    /// Create from milliseconds.
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// Create from seconds, saturating on overflow.
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(1000))
    }

    /// Create from minutes, saturating on overflow.
    pub const fn from_mins(mins: u64) -> Self {
        Self::from_secs(mins.saturating_mul(60))
    }

    /// Value in milliseconds.
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Whether this is the zero duration.
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Convert to [`std::time::Duration`].
    pub const fn to_std(&self) -> Duration {
        Duration::from_millis(self.0)
    }
}

impl From<Duration> for DurationMs {
    fn from(d: Duration) -> Self {
        Self(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }
}

impl From<DurationMs> for Duration {
    fn from(d: DurationMs) -> Self {
        d.to_std()
    }
}

impl Default for DurationMs {
    fn default() -> Self {
        Self::ZERO
    }
}

impl std::fmt::Display for DurationMs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ms", self.0)
    }
}
