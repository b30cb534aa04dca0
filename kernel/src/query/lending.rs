use time::Date;

use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{Lending, LendingFilter, LendingNumber, ReaderId, SelectLimit, SelectOffset};
use crate::KernelError;

#[async_trait::async_trait]
pub trait LendingQuery: 'static + Sync + Send {
    type Transaction: Transaction;

    async fn find_by_lending_number(
        &self,
        con: &mut Self::Transaction,
        lending_number: &LendingNumber,
    ) -> error_stack::Result<Option<Lending>, KernelError>;

    /// Lendings of the reader that are not returned yet.
    async fn find_outstanding_by_reader(
        &self,
        con: &mut Self::Transaction,
        reader_id: &ReaderId,
    ) -> error_stack::Result<Vec<Lending>, KernelError>;

    /// Highest sequence used in `year`, `0` when the year has no lending yet.
    async fn max_sequence_of_year(
        &self,
        con: &mut Self::Transaction,
        year: i32,
    ) -> error_stack::Result<i64, KernelError>;

    async fn search(
        &self,
        con: &mut Self::Transaction,
        filter: &LendingFilter,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> error_stack::Result<Vec<Lending>, KernelError>;

    /// Mean number of days between start and return over returned lendings.
    async fn average_duration(
        &self,
        con: &mut Self::Transaction,
    ) -> error_stack::Result<Option<f64>, KernelError>;

    /// Open lendings whose limit date is before `today`, oldest limit date first.
    async fn find_overdue(
        &self,
        con: &mut Self::Transaction,
        today: &Date,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> error_stack::Result<Vec<Lending>, KernelError>;
}

pub trait DependOnLendingQuery: 'static + Sync + Send + DependOnDatabaseConnection {
    type LendingQuery: LendingQuery<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn lending_query(&self) -> &Self::LendingQuery;
}
