use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{Fine, LendingNumber};
use crate::KernelError;

#[async_trait::async_trait]
pub trait FineQuery: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn find_by_lending_number(
        &self,
        con: &mut Self::Transaction,
        lending_number: &LendingNumber,
    ) -> error_stack::Result<Option<Fine>, KernelError>;
}

pub trait DependOnFineQuery: 'static + Sync + Send + DependOnDatabaseConnection {
    type FineQuery: FineQuery<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn fine_query(&self) -> &Self::FineQuery;
}
