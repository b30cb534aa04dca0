use kernel::interface::clock::Clock;
use time::{Date, OffsetDateTime};

/// Calendar day in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> Date {
        OffsetDateTime::now_utc().date()
    }
}
