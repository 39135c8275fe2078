//! Clock abstraction so date-sensitive logic stays deterministic in tests

use chrono::{DateTime, NaiveDate, Utc};

/// Supplies the current instant to the services that need one.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall-clock time, used everywhere outside of tests.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
