use serde::{Deserialize, Serialize};
use time::{Date, Duration};
use vodca::{AsRefln, Fromln};

/// Number of days a book may be kept before it becomes overdue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct LendingDuration(i64);

impl LendingDuration {
    pub fn new(days: impl Into<i64>) -> Self {
        Self(days.into())
    }

    /// Day the duration ends when counted from `start`, `None` past the supported calendar.
    pub fn end_from(&self, start: Date) -> Option<Date> {
        let room = (Date::MAX - start).whole_days();
        if !(0..=room).contains(&self.0) {
            return None;
        }
        start.checked_add(Duration::days(self.0))
    }
}

#[cfg(test)]
mod test {
    use time::macros::date;
    use time::Date;

    use super::LendingDuration;

    #[test]
    fn end_is_bounded_by_the_calendar() {
        let start = date!(2024 - 06 - 15);
        assert_eq!(
            LendingDuration::new(15).end_from(start),
            Some(date!(2024 - 06 - 30))
        );
        let room = (Date::MAX - start).whole_days();
        assert_eq!(LendingDuration::new(room).end_from(start), Some(Date::MAX));
        assert_eq!(LendingDuration::new(room + 1).end_from(start), None);
        assert_eq!(LendingDuration::new(i64::MAX).end_from(start), None);
        assert_eq!(LendingDuration::new(i64::MIN).end_from(start), None);
    }
}
