use kernel::interface::clock::{Clock, DependOnClock};
use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection};
use kernel::interface::query::{DependOnFineQuery, DependOnLendingQuery, FineQuery, LendingQuery};
use kernel::prelude::entity::{Fine, LendingNumber};
use kernel::KernelError;

use crate::service::lending::not_found;
use crate::transfer::{FineDto, GetLendingDto};

#[async_trait::async_trait]
pub trait FineService:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection
    + DependOnClock
    + DependOnLendingQuery
    + DependOnFineQuery
{
    /// Fine of a lending: the snapshot taken at return time, or the live amount while it is
    /// still out. A lending that is not overdue has no fine and yields a validation error.
    async fn compute_fine(&self, dto: GetLendingDto) -> error_stack::Result<FineDto, KernelError> {
        let today = self.clock().today();
        let lending_number = LendingNumber::parse(&dto.lending_number, today)?;
        let mut connection = self.database_connection().transact().await?;

        let lending = self
            .lending_query()
            .find_by_lending_number(&mut connection, &lending_number)
            .await?
            .ok_or_else(|| not_found(&lending_number))?;
        if lending.is_returned() {
            if let Some(fine) = self
                .fine_query()
                .find_by_lending_number(&mut connection, &lending_number)
                .await?
            {
                tracing::debug!(%lending_number, "loaded stored fine");
                return Ok(FineDto::new(fine, today));
            }
        }
        let fine = Fine::new(Some(lending), today)?;
        tracing::debug!(%lending_number, cents = *fine.cents().as_ref(), "computed fine");
        Ok(FineDto::new(fine, today))
    }
}

impl<T> FineService for T where
    T: DependOnDatabaseConnection + DependOnClock + DependOnLendingQuery + DependOnFineQuery
{
}
