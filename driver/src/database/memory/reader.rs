use kernel::interface::query::ReaderQuery;
use kernel::prelude::entity::{Borrower, ReaderId};
use kernel::KernelError;

use crate::database::memory::InMemoryTransaction;

pub struct InMemoryReaderRepository;

#[async_trait::async_trait]
impl ReaderQuery for InMemoryReaderRepository {
    type Transaction = InMemoryTransaction;

    async fn find_by_id(
        &self,
        con: &mut InMemoryTransaction,
        id: &ReaderId,
    ) -> error_stack::Result<Option<Borrower>, KernelError> {
        Ok(con.staged.readers.get(id).cloned())
    }
}
