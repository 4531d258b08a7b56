//! Deterministic time for tests.

use chrono::{DateTime, Utc};
use roomshare_core::host::Clock;

/// Clock that stands still.
///
/// Rooms and audit entries carry creation timestamps; pinning the clock
/// keeps them stable across runs.
///
/// # Example
///
/// ```
/// use roomshare_core::host::Clock;
/// use roomshare_testing::test_clock;
///
/// let clock = test_clock();
/// assert_eq!(clock.now(), clock.now());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct FixedClock {
    time: DateTime<Utc>,
}

impl FixedClock {
    /// Pins the clock to `time`.
    #[must_use]
    pub const fn new(time: DateTime<Utc>) -> Self {
        Self { time }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.time
    }
}

/// A clock pinned to an arbitrary but stable instant in 2025.
///
/// # Panics
///
/// Never in practice; the timestamp literal is well-formed.
#[must_use]
#[allow(clippy::expect_used)]
pub fn test_clock() -> FixedClock {
    let pinned = DateTime::parse_from_rfc3339("2025-03-07T18:30:00Z")
        .expect("literal is valid RFC 3339")
        .with_timezone(&Utc);
    FixedClock::new(pinned)
}
