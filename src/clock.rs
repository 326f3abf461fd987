// src/clock.rs

use chrono::NaiveDate;

/// Source of "today" for the daily selection pipeline.
///
/// Injected rather than read from the system so tests can pin arbitrary
/// dates without touching wall-clock time. The daily pool is a pure
/// function of the date this trait returns.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Production clock: the local calendar date.
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Clock pinned to a fixed date, for tests.
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
