//! Clock abstraction so the scheduling and ledger logic can be exercised
//! with injected time instead of the wall clock.

use chrono::{DateTime, Local};

/// Source of "now" for all temporal decisions in the engine.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Production clock backed by the system's local time.
#[derive(Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Test clock pinned to a fixed instant.
#[cfg(test)]
pub struct FixedClock(pub DateTime<Local>);

#[cfg(test)]
impl FixedClock {
    /// Pin the clock to a local date and time.
    pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Self {
        use chrono::TimeZone;
        Self(
            Local
                .with_ymd_and_hms(year, month, day, hour, minute, 0)
                .unwrap(),
        )
    }
}

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}
