use error_stack::Report;
use sqlx::PgConnection;
use time::Date;
use uuid::Uuid;

use kernel::interface::query::LendingQuery;
use kernel::interface::update::LendingModifier;
use kernel::prelude::entity::{
    BookId, BookTitle, Borrower, FinePerDay, Lending, LendingDuration, LendingFilter,
    LendingNumber, LentBook, ReaderId, ReaderName, ReturnCommentary, ReturnedDate, SelectLimit,
    SelectOffset, StartDate, Version,
};
use kernel::KernelError;

use crate::database::postgres::PostgresTransaction;
use crate::error::ConvertError;

pub struct PostgresLendingRepository;

#[async_trait::async_trait]
impl LendingQuery for PostgresLendingRepository {
    type Transaction = PostgresTransaction;

    async fn find_by_lending_number(
        &self,
        con: &mut PostgresTransaction,
        lending_number: &LendingNumber,
    ) -> error_stack::Result<Option<Lending>, KernelError> {
        PgLendingInternal::find_by_lending_number(&mut con.0, lending_number)
            .await
            .convert_error()
    }

    async fn find_outstanding_by_reader(
        &self,
        con: &mut PostgresTransaction,
        reader_id: &ReaderId,
    ) -> error_stack::Result<Vec<Lending>, KernelError> {
        PgLendingInternal::find_outstanding_by_reader(&mut con.0, reader_id)
            .await
            .convert_error()
    }

    async fn max_sequence_of_year(
        &self,
        con: &mut PostgresTransaction,
        year: i32,
    ) -> error_stack::Result<i64, KernelError> {
        PgLendingInternal::max_sequence_of_year(&mut con.0, year)
            .await
            .convert_error()
    }

    async fn search(
        &self,
        con: &mut PostgresTransaction,
        filter: &LendingFilter,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> error_stack::Result<Vec<Lending>, KernelError> {
        PgLendingInternal::search(&mut con.0, filter, limit, offset)
            .await
            .convert_error()
    }

    async fn average_duration(
        &self,
        con: &mut PostgresTransaction,
    ) -> error_stack::Result<Option<f64>, KernelError> {
        PgLendingInternal::average_duration(&mut con.0)
            .await
            .convert_error()
    }

    async fn find_overdue(
        &self,
        con: &mut PostgresTransaction,
        today: &Date,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> error_stack::Result<Vec<Lending>, KernelError> {
        PgLendingInternal::find_overdue(&mut con.0, today, limit, offset)
            .await
            .convert_error()
    }
}

#[async_trait::async_trait]
impl LendingModifier for PostgresLendingRepository {
    type Transaction = PostgresTransaction;

    async fn create(
        &self,
        con: &mut PostgresTransaction,
        lending: &Lending,
    ) -> error_stack::Result<(), KernelError> {
        PgLendingInternal::create(&mut con.0, lending)
            .await
            .convert_error()
    }

    async fn update(
        &self,
        con: &mut PostgresTransaction,
        lending: &Lending,
        expected_version: &Version<Lending>,
    ) -> error_stack::Result<(), KernelError> {
        let updated = PgLendingInternal::update(&mut con.0, lending, expected_version)
            .await
            .convert_error()?;
        if updated == 0 {
            tracing::warn!(
                lending_number = %lending.lending_number(),
                expected_version = %expected_version,
                "rejected stale lending write"
            );
            return Err(Report::new(KernelError::Concurrency).attach_printable(format!(
                "lending {} is no longer at version {expected_version}",
                lending.lending_number()
            )));
        }
        Ok(())
    }

    async fn delete(
        &self,
        con: &mut PostgresTransaction,
        lending_number: &LendingNumber,
    ) -> error_stack::Result<(), KernelError> {
        PgLendingInternal::delete(&mut con.0, lending_number)
            .await
            .convert_error()
    }
}

#[derive(sqlx::FromRow)]
struct LendingRow {
    year: i32,
    sequence: i64,
    book_id: Uuid,
    book_title: String,
    reader_id: Uuid,
    reader_name: String,
    start_date: Date,
    returned_date: Option<Date>,
    returned_commentary: Option<String>,
    duration_days: i64,
    fine_per_day_cents: i64,
    version: i64,
}

impl From<LendingRow> for Lending {
    fn from(value: LendingRow) -> Self {
        Lending::new(
            LendingNumber::new(value.year, value.sequence),
            LentBook::new(BookId::new(value.book_id), BookTitle::new(value.book_title)),
            Borrower::new(
                ReaderId::new(value.reader_id),
                ReaderName::new(value.reader_name),
            ),
            StartDate::new(value.start_date),
            value.returned_date.map(ReturnedDate::new),
            value.returned_commentary.map(ReturnCommentary::new),
            LendingDuration::new(value.duration_days),
            FinePerDay::new(value.fine_per_day_cents),
            Version::new(value.version),
        )
    }
}

pub(in crate::database) struct PgLendingInternal;

impl PgLendingInternal {
    pub(in crate::database) async fn find_by_lending_number(
        con: &mut PgConnection,
        lending_number: &LendingNumber,
    ) -> Result<Option<Lending>, sqlx::Error> {
        let row = sqlx::query_as::<_, LendingRow>(
            // language=postgresql
            r#"
            SELECT
                l.year, l.sequence,
                l.book_id, b.title AS book_title,
                l.reader_id, r.name AS reader_name,
                l.start_date, l.returned_date, l.returned_commentary,
                l.duration_days, l.fine_per_day_cents, l.version
            FROM lendings l
                JOIN books b ON b.id = l.book_id
                JOIN readers r ON r.id = l.reader_id
            WHERE l.year = $1 AND l.sequence = $2
            "#,
        )
        .bind(lending_number.year())
        .bind(lending_number.sequence())
        .fetch_optional(con)
        .await?;
        Ok(row.map(Lending::from))
    }

    async fn find_outstanding_by_reader(
        con: &mut PgConnection,
        reader_id: &ReaderId,
    ) -> Result<Vec<Lending>, sqlx::Error> {
        let rows = sqlx::query_as::<_, LendingRow>(
            // language=postgresql
            r#"
            SELECT
                l.year, l.sequence,
                l.book_id, b.title AS book_title,
                l.reader_id, r.name AS reader_name,
                l.start_date, l.returned_date, l.returned_commentary,
                l.duration_days, l.fine_per_day_cents, l.version
            FROM lendings l
                JOIN books b ON b.id = l.book_id
                JOIN readers r ON r.id = l.reader_id
            WHERE l.reader_id = $1 AND l.returned_date IS NULL
            ORDER BY l.year, l.sequence
            "#,
        )
        .bind(reader_id.as_ref())
        .fetch_all(con)
        .await?;
        Ok(rows.into_iter().map(Lending::from).collect())
    }

    async fn max_sequence_of_year(con: &mut PgConnection, year: i32) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            // language=postgresql
            r#"
            SELECT COALESCE(MAX(sequence), 0)
            FROM lendings
            WHERE year = $1
            "#,
        )
        .bind(year)
        .fetch_one(con)
        .await
    }

    async fn search(
        con: &mut PgConnection,
        filter: &LendingFilter,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> Result<Vec<Lending>, sqlx::Error> {
        let reader_id = filter.reader_id().clone().map(Uuid::from);
        let book_id = filter.book_id().clone().map(Uuid::from);
        let rows = sqlx::query_as::<_, LendingRow>(
            // language=postgresql
            r#"
            SELECT
                l.year, l.sequence,
                l.book_id, b.title AS book_title,
                l.reader_id, r.name AS reader_name,
                l.start_date, l.returned_date, l.returned_commentary,
                l.duration_days, l.fine_per_day_cents, l.version
            FROM lendings l
                JOIN books b ON b.id = l.book_id
                JOIN readers r ON r.id = l.reader_id
            WHERE ($1::uuid IS NULL OR l.reader_id = $1)
                AND ($2::uuid IS NULL OR l.book_id = $2)
                AND ($3::boolean IS NULL OR (l.returned_date IS NOT NULL) = $3)
                AND ($4::date IS NULL OR l.start_date >= $4)
                AND ($5::date IS NULL OR l.start_date <= $5)
            ORDER BY l.year, l.sequence
            LIMIT $6 OFFSET $7
            "#,
        )
        .bind(reader_id)
        .bind(book_id)
        .bind(*filter.returned())
        .bind(*filter.started_from())
        .bind(*filter.started_until())
        .bind(limit.as_ref())
        .bind(offset.as_ref())
        .fetch_all(con)
        .await?;
        Ok(rows.into_iter().map(Lending::from).collect())
    }

    async fn average_duration(con: &mut PgConnection) -> Result<Option<f64>, sqlx::Error> {
        sqlx::query_scalar::<_, Option<f64>>(
            // language=postgresql
            r#"
            SELECT AVG(returned_date - start_date)::float8
            FROM lendings
            WHERE returned_date IS NOT NULL
            "#,
        )
        .fetch_one(con)
        .await
    }

    async fn find_overdue(
        con: &mut PgConnection,
        today: &Date,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> Result<Vec<Lending>, sqlx::Error> {
        let rows = sqlx::query_as::<_, LendingRow>(
            // language=postgresql
            r#"
            SELECT
                l.year, l.sequence,
                l.book_id, b.title AS book_title,
                l.reader_id, r.name AS reader_name,
                l.start_date, l.returned_date, l.returned_commentary,
                l.duration_days, l.fine_per_day_cents, l.version
            FROM lendings l
                JOIN books b ON b.id = l.book_id
                JOIN readers r ON r.id = l.reader_id
            WHERE l.returned_date IS NULL
                AND l.start_date + l.duration_days::integer < $1
            ORDER BY l.start_date + l.duration_days::integer, l.year, l.sequence
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(today)
        .bind(limit.as_ref())
        .bind(offset.as_ref())
        .fetch_all(con)
        .await?;
        Ok(rows.into_iter().map(Lending::from).collect())
    }

    async fn create(con: &mut PgConnection, lending: &Lending) -> Result<(), sqlx::Error> {
        sqlx::query(
            // language=postgresql
            r#"
            INSERT INTO lendings (
                year, sequence, book_id, reader_id, start_date, returned_date,
                returned_commentary, duration_days, fine_per_day_cents, version
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(lending.lending_number().year())
        .bind(lending.lending_number().sequence())
        .bind(lending.book().id().as_ref())
        .bind(lending.reader().id().as_ref())
        .bind(lending.start_date().as_ref())
        .bind(lending.returned_date().map(Date::from))
        .bind(lending.returned_commentary().clone().map(String::from))
        .bind(lending.duration().as_ref())
        .bind(lending.fine_per_day().as_ref())
        .bind(lending.version().as_ref())
        .execute(con)
        .await?;
        Ok(())
    }

    async fn update(
        con: &mut PgConnection,
        lending: &Lending,
        expected_version: &Version<Lending>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            // language=postgresql
            r#"
            UPDATE lendings
            SET returned_date = $3, returned_commentary = $4, version = $5
            WHERE year = $1 AND sequence = $2 AND version = $6
            "#,
        )
        .bind(lending.lending_number().year())
        .bind(lending.lending_number().sequence())
        .bind(lending.returned_date().map(Date::from))
        .bind(lending.returned_commentary().clone().map(String::from))
        .bind(lending.version().as_ref())
        .bind(expected_version.as_ref())
        .execute(con)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete(
        con: &mut PgConnection,
        lending_number: &LendingNumber,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            // language=postgresql
            r#"
            DELETE FROM lendings
            WHERE year = $1 AND sequence = $2
            "#,
        )
        .bind(lending_number.year())
        .bind(lending_number.sequence())
        .execute(con)
        .await?;
        Ok(())
    }
}
