use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{Borrower, ReaderId};
use crate::KernelError;

#[async_trait::async_trait]
pub trait ReaderQuery: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn find_by_id(
        &self,
        con: &mut Self::Transaction,
        id: &ReaderId,
    ) -> error_stack::Result<Option<Borrower>, KernelError>;
}

pub trait DependOnReaderQuery: 'static + Sync + Send + DependOnDatabaseConnection {
    type ReaderQuery: ReaderQuery<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn reader_query(&self) -> &Self::ReaderQuery;
}
