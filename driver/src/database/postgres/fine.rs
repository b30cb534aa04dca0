use sqlx::PgConnection;

use kernel::interface::query::FineQuery;
use kernel::interface::update::FineModifier;
use kernel::prelude::entity::{Fine, FineCents, FinePerDay, LendingNumber};
use kernel::KernelError;

use super::lending::PgLendingInternal;
use crate::database::postgres::PostgresTransaction;
use crate::error::ConvertError;

pub struct PostgresFineRepository;

#[async_trait::async_trait]
impl FineQuery for PostgresFineRepository {
    type Transaction = PostgresTransaction;

    async fn find_by_lending_number(
        &self,
        con: &mut PostgresTransaction,
        lending_number: &LendingNumber,
    ) -> error_stack::Result<Option<Fine>, KernelError> {
        PgFineInternal::find_by_lending_number(&mut con.0, lending_number)
            .await
            .convert_error()
    }
}

#[async_trait::async_trait]
impl FineModifier for PostgresFineRepository {
    type Transaction = PostgresTransaction;

    async fn create(
        &self,
        con: &mut PostgresTransaction,
        fine: &Fine,
    ) -> error_stack::Result<(), KernelError> {
        PgFineInternal::create(&mut con.0, fine).await.convert_error()
    }
}

#[derive(sqlx::FromRow)]
struct FineRow {
    fine_per_day_cents: i64,
    cents: i64,
}

pub(in crate::database) struct PgFineInternal;

impl PgFineInternal {
    async fn find_by_lending_number(
        con: &mut PgConnection,
        lending_number: &LendingNumber,
    ) -> Result<Option<Fine>, sqlx::Error> {
        let row = sqlx::query_as::<_, FineRow>(
            // language=postgresql
            r#"
            SELECT fine_per_day_cents, cents
            FROM fines
            WHERE year = $1 AND sequence = $2
            "#,
        )
        .bind(lending_number.year())
        .bind(lending_number.sequence())
        .fetch_optional(&mut *con)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let lending = PgLendingInternal::find_by_lending_number(con, lending_number).await?;
        Ok(lending.map(|lending| {
            Fine::restore(
                lending,
                FinePerDay::new(row.fine_per_day_cents),
                FineCents::new(row.cents),
            )
        }))
    }

    async fn create(con: &mut PgConnection, fine: &Fine) -> Result<(), sqlx::Error> {
        sqlx::query(
            // language=postgresql
            r#"
            INSERT INTO fines (year, sequence, fine_per_day_cents, cents)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(fine.lending().lending_number().year())
        .bind(fine.lending().lending_number().sequence())
        .bind(fine.fine_per_day().as_ref())
        .bind(fine.cents().as_ref())
        .execute(con)
        .await?;
        Ok(())
    }
}
