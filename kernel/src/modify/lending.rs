use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{Lending, LendingNumber, Version};
use crate::KernelError;

#[async_trait::async_trait]
pub trait LendingModifier: 'static + Sync + Send {
    type Transaction: Transaction;

    /// Inserts a new lending. A taken lending number is reported as [`KernelError::Concurrency`].
    async fn create(
        &self,
        con: &mut Self::Transaction,
        lending: &Lending,
    ) -> error_stack::Result<(), KernelError>;

    /// Stores `lending` only if the stored version still equals `expected_version`, otherwise
    /// fails with [`KernelError::Concurrency`].
    async fn update(
        &self,
        con: &mut Self::Transaction,
        lending: &Lending,
        expected_version: &Version<Lending>,
    ) -> error_stack::Result<(), KernelError>;

    async fn delete(
        &self,
        con: &mut Self::Transaction,
        lending_number: &LendingNumber,
    ) -> error_stack::Result<(), KernelError>;
}

pub trait DependOnLendingModifier: 'static + Sync + Send + DependOnDatabaseConnection {
    type LendingModifier: LendingModifier<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn lending_modifier(&self) -> &Self::LendingModifier;
}
