use time::Date;
use uuid::Uuid;

use kernel::prelude::entity::{DestructLending, Lending};

/// Read model of a lending, including the values derived for `today`.
#[derive(Debug, Clone, PartialEq)]
pub struct LendingDto {
    pub lending_number: String,
    pub book_id: Uuid,
    pub book_title: String,
    pub reader_id: Uuid,
    pub reader_name: String,
    pub start_date: Date,
    pub limit_date: Date,
    pub returned_date: Option<Date>,
    pub returned_commentary: Option<String>,
    pub duration_days: i64,
    pub fine_per_day_cents: i64,
    pub version: i64,
    pub days_delayed: i64,
    pub days_until_return: Option<i64>,
    pub days_overdue: Option<i64>,
    pub fine_value_in_cents: Option<i64>,
}

impl LendingDto {
    pub fn new(lending: Lending, today: Date) -> Self {
        let limit_date = lending.limit_date();
        let days_delayed = lending.days_delayed(today);
        let days_until_return = lending.days_until_return(today);
        let days_overdue = lending.days_overdue(today);
        let fine_value_in_cents = lending.fine_value_in_cents(today);
        let DestructLending {
            lending_number,
            book,
            reader,
            start_date,
            returned_date,
            returned_commentary,
            duration,
            fine_per_day,
            version,
        } = lending.into_destruct();
        let book = book.into_destruct();
        let reader = reader.into_destruct();
        Self {
            lending_number: lending_number.to_string(),
            book_id: book.id.into(),
            book_title: book.title.into(),
            reader_id: reader.id.into(),
            reader_name: reader.name.into(),
            start_date: start_date.into(),
            limit_date,
            returned_date: returned_date.map(Into::into),
            returned_commentary: returned_commentary.map(Into::into),
            duration_days: duration.into(),
            fine_per_day_cents: fine_per_day.into(),
            version: version.into(),
            days_delayed,
            days_until_return,
            days_overdue,
            fine_value_in_cents,
        }
    }
}

pub struct CreateLendingDto {
    pub book_id: Uuid,
    pub reader_id: Uuid,
}

/// Historical lending brought in from another system.
pub struct BootstrapLendingDto {
    pub book_id: Uuid,
    pub reader_id: Uuid,
    pub year: i32,
    pub sequence: i64,
    pub start_date: Date,
    pub returned_date: Option<Date>,
}

pub struct ReturnLendingDto {
    pub lending_number: String,
    pub version: i64,
    pub commentary: Option<String>,
}

pub struct GetLendingDto {
    pub lending_number: String,
}

#[derive(Debug, Default)]
pub struct SearchLendingDto {
    pub reader_id: Option<Uuid>,
    pub book_id: Option<Uuid>,
    pub returned: Option<bool>,
    pub started_from: Option<Date>,
    pub started_until: Option<Date>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PageDto {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
