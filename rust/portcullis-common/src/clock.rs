use chrono::{DateTime, Utc};

/// A source of the current time.
///
/// All time comparisons in the portcullis crates go through an injected
/// [Clock] so that expiry behavior is deterministic under test. Production
/// deployments use [SystemClock].
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// A [Clock] backed by the operating system's wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
