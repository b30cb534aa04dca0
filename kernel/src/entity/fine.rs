mod cents;

pub use self::cents::*;
use crate::entity::{FinePerDay, Lending};
use crate::KernelError;
use destructure::Destructure;
use error_stack::Report;
use time::Date;
use vodca::References;

/// Monetary penalty derived from an overdue lending.
///
/// The per-day rate is copied from the lending when the fine is derived and `cents` is
/// `days_delayed * fine_per_day` on that day.
#[derive(Debug, Clone, Eq, PartialEq, References, Destructure)]
pub struct Fine {
    lending: Lending,
    fine_per_day: FinePerDay,
    cents: FineCents,
}

impl Fine {
    pub fn new(lending: Option<Lending>, today: Date) -> error_stack::Result<Self, KernelError> {
        let lending = lending.ok_or_else(|| {
            Report::new(KernelError::NullReference)
                .attach_printable("a fine cannot be derived without a lending")
        })?;
        if lending.days_delayed(today) == 0 {
            return Err(Report::new(KernelError::Validation).attach_printable(format!(
                "lending {} is not overdue",
                lending.lending_number()
            )));
        }
        Ok(Self::derive(lending, today))
    }

    /// Rehydrates a stored fine snapshot.
    pub fn restore(lending: Lending, fine_per_day: FinePerDay, cents: FineCents) -> Self {
        Self {
            lending,
            fine_per_day,
            cents,
        }
    }

    /// Points the fine at another lending, deriving rate and amount from it as of `today`.
    /// Unlike [`Fine::new`], a lending that is not overdue is accepted and yields zero cents.
    pub fn set_lending(&mut self, lending: Lending, today: Date) {
        *self = Self::derive(lending, today);
    }

    fn derive(lending: Lending, today: Date) -> Self {
        let fine_per_day = *lending.fine_per_day();
        let cents = FineCents::new(
            lending
                .days_delayed(today)
                .saturating_mul(*fine_per_day.as_ref()),
        );
        Self {
            lending,
            fine_per_day,
            cents,
        }
    }
}

#[cfg(test)]
mod test {
    use time::macros::date;
    use time::{Date, Duration};
    use uuid::Uuid;

    use crate::entity::{
        BookId, BookTitle, Borrower, FinePerDay, Lending, LendingDuration, LentBook, ReaderId,
        ReaderName,
    };
    use crate::KernelError;

    use super::Fine;

    const TODAY: Date = date!(2024 - 06 - 15);

    fn lending(sequence: i64, started_days_ago: i64, fine_per_day: i64) -> Lending {
        Lending::bootstrap(
            Some(LentBook::new(
                BookId::new(Uuid::new_v4()),
                BookTitle::new("O Inspetor Max"),
            )),
            Some(Borrower::new(
                ReaderId::new(Uuid::new_v4()),
                ReaderName::new("Manuel"),
            )),
            2024,
            sequence,
            TODAY - Duration::days(started_days_ago),
            None,
            LendingDuration::new(15),
            FinePerDay::new(fine_per_day),
            TODAY,
        )
        .unwrap()
    }

    #[test]
    fn fine_for_overdue_lending() {
        let overdue = lending(1, 30, 200);
        let fine = Fine::new(Some(overdue.clone()), TODAY).unwrap();
        assert_eq!(fine.lending(), &overdue);
        assert_eq!(*fine.fine_per_day().as_ref(), 200);
        assert_eq!(*fine.cents().as_ref(), 15 * 200);
    }

    #[test]
    fn cents_follow_days_delayed() {
        let twenty = Fine::new(Some(lending(1, 35, 200)), TODAY).unwrap();
        assert_eq!(*twenty.cents().as_ref(), 4000);
        let five = Fine::new(Some(lending(2, 20, 200)), TODAY).unwrap();
        assert_eq!(*five.cents().as_ref(), 1000);
    }

    #[test]
    fn rejects_lending_that_is_not_overdue() {
        let report = Fine::new(Some(lending(1, 3, 200)), TODAY).unwrap_err();
        assert!(matches!(report.current_context(), KernelError::Validation));
        let report = Fine::new(Some(lending(1, 15, 200)), TODAY).unwrap_err();
        assert!(matches!(report.current_context(), KernelError::Validation));
    }

    #[test]
    fn rejects_missing_lending() {
        let report = Fine::new(None, TODAY).unwrap_err();
        assert!(matches!(report.current_context(), KernelError::NullReference));
    }

    #[test]
    fn can_be_pointed_at_another_lending() {
        let first = lending(1, 30, 200);
        let second = lending(2, 25, 300);
        let mut fine = Fine::new(Some(first), TODAY).unwrap();
        fine.set_lending(second.clone(), TODAY);
        assert_eq!(fine.lending(), &second);
        assert_eq!(*fine.fine_per_day().as_ref(), 300);
        assert_eq!(*fine.cents().as_ref(), 10 * 300);
    }

    #[test]
    fn pointing_at_a_lending_on_time_yields_no_cents() {
        let mut fine = Fine::new(Some(lending(1, 30, 200)), TODAY).unwrap();
        let on_time = lending(2, 3, 250);
        fine.set_lending(on_time.clone(), TODAY);
        assert_eq!(fine.lending(), &on_time);
        assert_eq!(*fine.fine_per_day().as_ref(), 250);
        assert_eq!(*fine.cents().as_ref(), 0);
    }

    #[test]
    fn rate_is_captured_from_the_lending() {
        let overdue = lending(1, 30, 150);
        let fine = Fine::new(Some(overdue.clone()), TODAY).unwrap();
        assert_eq!(fine.fine_per_day(), overdue.fine_per_day());
    }
}
