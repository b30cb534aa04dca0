use error_stack::Report;

use kernel::interface::query::FineQuery;
use kernel::interface::update::FineModifier;
use kernel::prelude::entity::{Fine, LendingNumber};
use kernel::KernelError;

use crate::database::memory::InMemoryTransaction;

pub struct InMemoryFineRepository;

#[async_trait::async_trait]
impl FineQuery for InMemoryFineRepository {
    type Transaction = InMemoryTransaction;

    async fn find_by_lending_number(
        &self,
        con: &mut InMemoryTransaction,
        lending_number: &LendingNumber,
    ) -> error_stack::Result<Option<Fine>, KernelError> {
        Ok(con.staged.fines.get(lending_number).cloned())
    }
}

#[async_trait::async_trait]
impl FineModifier for InMemoryFineRepository {
    type Transaction = InMemoryTransaction;

    async fn create(
        &self,
        con: &mut InMemoryTransaction,
        fine: &Fine,
    ) -> error_stack::Result<(), KernelError> {
        let lending_number = *fine.lending().lending_number();
        if con.staged.fines.contains_key(&lending_number) {
            return Err(Report::new(KernelError::Concurrency)
                .attach_printable(format!("fine of lending {lending_number} is already stored")));
        }
        con.staged.fines.insert(lending_number, fine.clone());
        Ok(())
    }
}
