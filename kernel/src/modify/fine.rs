use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::Fine;
use crate::KernelError;

#[async_trait::async_trait]
pub trait FineModifier: 'static + Sync + Send {
    type Transaction: Transaction;
    /// Stores the fine snapshot of a lending returned late.
    async fn create(
        &self,
        con: &mut Self::Transaction,
        fine: &Fine,
    ) -> error_stack::Result<(), KernelError>;
}

pub trait DependOnFineModifier: 'static + Sync + Send + DependOnDatabaseConnection {
    type FineModifier: FineModifier<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn fine_modifier(&self) -> &Self::FineModifier;
}
