use kernel::interface::query::BookQuery;
use kernel::prelude::entity::{BookId, LentBook};
use kernel::KernelError;

use crate::database::memory::InMemoryTransaction;

pub struct InMemoryBookRepository;

#[async_trait::async_trait]
impl BookQuery for InMemoryBookRepository {
    type Transaction = InMemoryTransaction;

    async fn find_by_id(
        &self,
        con: &mut InMemoryTransaction,
        id: &BookId,
    ) -> error_stack::Result<Option<LentBook>, KernelError> {
        Ok(con.staged.books.get(id).cloned())
    }
}
