mod commentary;
mod date;
mod duration;
mod filter;
mod fine_rate;
mod number;

pub use self::{commentary::*, date::*, duration::*, filter::*, fine_rate::*, number::*};
use crate::entity::{Borrower, LentBook, Version};
use crate::KernelError;
use destructure::Destructure;
use error_stack::Report;
use time::Date;
use vodca::References;

/// A single loan of one book to one reader, from issue to return.
///
/// Duration and fine rate are captured when the lending is opened, so later policy changes never
/// reach lendings that already exist. Every date-dependent value takes `today` from the caller.
#[derive(Debug, Clone, Eq, PartialEq, References, Destructure)]
pub struct Lending {
    lending_number: LendingNumber,
    book: LentBook,
    reader: Borrower,
    start_date: StartDate,
    returned_date: Option<ReturnedDate>,
    returned_commentary: Option<ReturnCommentary>,
    duration: LendingDuration,
    fine_per_day: FinePerDay,
    version: Version<Lending>,
}

impl Lending {
    /// Rehydrates a stored lending without validation.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        lending_number: LendingNumber,
        book: LentBook,
        reader: Borrower,
        start_date: StartDate,
        returned_date: Option<ReturnedDate>,
        returned_commentary: Option<ReturnCommentary>,
        duration: LendingDuration,
        fine_per_day: FinePerDay,
        version: Version<Lending>,
    ) -> Self {
        Self {
            lending_number,
            book,
            reader,
            start_date,
            returned_date,
            returned_commentary,
            duration,
            fine_per_day,
            version,
        }
    }

    /// Opens a lending starting today. `sequence` is the next free sequence of the current year.
    pub fn create(
        book: Option<LentBook>,
        reader: Option<Borrower>,
        sequence: i64,
        duration: LendingDuration,
        fine_per_day: FinePerDay,
        today: Date,
    ) -> error_stack::Result<Self, KernelError> {
        if sequence < 1 {
            return Err(Report::new(KernelError::Validation)
                .attach_printable(format!("sequence of a new lending must be positive, got {sequence}")));
        }
        let lending_number = LendingNumber::from_sequence(sequence, today)?;
        Self::validated(
            book,
            reader,
            lending_number,
            StartDate::new(today),
            None,
            duration,
            fine_per_day,
        )
    }

    /// Imports a historical lending with explicit identity and dates.
    #[allow(clippy::too_many_arguments)]
    pub fn bootstrap(
        book: Option<LentBook>,
        reader: Option<Borrower>,
        year: i32,
        sequence: i64,
        start_date: Date,
        returned_date: Option<Date>,
        duration: LendingDuration,
        fine_per_day: FinePerDay,
        today: Date,
    ) -> error_stack::Result<Self, KernelError> {
        let lending_number = LendingNumber::from_year_and_sequence(year, sequence, today)?;
        if let Some(returned) = returned_date.filter(|returned| *returned < start_date) {
            return Err(Report::new(KernelError::Validation).attach_printable(format!(
                "lending {lending_number} cannot be returned on {returned}, before it started on {start_date}"
            )));
        }
        Self::validated(
            book,
            reader,
            lending_number,
            StartDate::new(start_date),
            returned_date.map(ReturnedDate::new),
            duration,
            fine_per_day,
        )
    }

    fn validated(
        book: Option<LentBook>,
        reader: Option<Borrower>,
        lending_number: LendingNumber,
        start_date: StartDate,
        returned_date: Option<ReturnedDate>,
        duration: LendingDuration,
        fine_per_day: FinePerDay,
    ) -> error_stack::Result<Self, KernelError> {
        let book = book.ok_or_else(|| {
            Report::new(KernelError::Validation).attach_printable("a lending needs a book")
        })?;
        let reader = reader.ok_or_else(|| {
            Report::new(KernelError::Validation).attach_printable("a lending needs a reader")
        })?;
        if *duration.as_ref() < 1 {
            return Err(Report::new(KernelError::Validation).attach_printable(format!(
                "lending duration must be at least one day, got {}",
                duration.as_ref()
            )));
        }
        if *fine_per_day.as_ref() < 0 {
            return Err(Report::new(KernelError::Validation).attach_printable(format!(
                "fine per day cannot be negative, got {}",
                fine_per_day.as_ref()
            )));
        }
        if duration.end_from(*start_date.as_ref()).is_none() {
            return Err(Report::new(KernelError::Validation)
                .attach_printable("limit date is out of the supported calendar range"));
        }
        Ok(Self {
            lending_number,
            book,
            reader,
            start_date,
            returned_date,
            returned_commentary: None,
            duration,
            fine_per_day,
            version: Version::initial(),
        })
    }

    /// Records the return of the book. The only mutation a lending accepts.
    pub fn mark_returned(
        &mut self,
        expected_version: &Version<Lending>,
        commentary: Option<ReturnCommentary>,
        today: Date,
    ) -> error_stack::Result<(), KernelError> {
        if let Some(returned) = &self.returned_date {
            return Err(Report::new(KernelError::State).attach_printable(format!(
                "lending {} was already returned on {}",
                self.lending_number,
                returned.as_ref()
            )));
        }
        if expected_version != &self.version {
            return Err(Report::new(KernelError::Concurrency).attach_printable(format!(
                "stale version {expected_version} for lending {}, current is {}",
                self.lending_number, self.version
            )));
        }
        if today < *self.start_date.as_ref() {
            return Err(Report::new(KernelError::Validation).attach_printable(format!(
                "lending {} cannot be returned on {today}, before it started on {}",
                self.lending_number,
                self.start_date.as_ref()
            )));
        }
        self.returned_date = Some(ReturnedDate::new(today));
        self.returned_commentary = commentary;
        self.version = self.version.next();
        Ok(())
    }

    pub fn limit_date(&self) -> Date {
        self.duration
            .end_from(*self.start_date.as_ref())
            .unwrap_or(Date::MAX)
    }

    pub fn is_returned(&self) -> bool {
        self.returned_date.is_some()
    }

    /// Days past the limit date, counted up to the return date or, while open, up to `today`.
    pub fn days_delayed(&self, today: Date) -> i64 {
        let end = self
            .returned_date
            .map_or(today, |returned| *returned.as_ref());
        let elapsed = (end - *self.start_date.as_ref()).whole_days();
        (elapsed - *self.duration.as_ref()).max(0)
    }

    pub fn days_until_return(&self, today: Date) -> Option<i64> {
        let limit = self.limit_date();
        if self.is_returned() || today > limit {
            return None;
        }
        Some((limit - today).whole_days())
    }

    /// Live overdue state: always `None` once the book is back.
    pub fn days_overdue(&self, today: Date) -> Option<i64> {
        let limit = self.limit_date();
        if self.is_returned() || today <= limit {
            return None;
        }
        Some((today - limit).whole_days())
    }

    pub fn fine_value_in_cents(&self, today: Date) -> Option<i64> {
        match self.days_delayed(today) {
            0 => None,
            days => Some(days.saturating_mul(*self.fine_per_day.as_ref())),
        }
    }
}
