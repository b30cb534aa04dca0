use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use kernel::interface::database::{DatabaseConnection, Transaction};
use kernel::prelude::entity::{
    BookId, Borrower, Fine, LendingNumber, LentBook, Lending, ReaderId, SelectLimit, SelectOffset,
};
use kernel::KernelError;

pub use self::{book::*, fine::*, lending::*, reader::*};

mod book;
mod fine;
mod lending;
mod reader;

#[derive(Debug, Clone, Default)]
struct MemoryStore {
    books: HashMap<BookId, LentBook>,
    readers: HashMap<ReaderId, Borrower>,
    lendings: BTreeMap<LendingNumber, Lending>,
    fines: BTreeMap<LendingNumber, Fine>,
}

/// Process-local lending directory.
///
/// A transaction owns the whole store until it is committed or dropped, so writers are
/// serialized the same way row locks serialize them in Postgres.
#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    store: Arc<Mutex<MemoryStore>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register_book(&self, book: LentBook) {
        let mut store = self.store.lock().await;
        store.books.insert(book.id().clone(), book);
    }

    pub async fn register_reader(&self, reader: Borrower) {
        let mut store = self.store.lock().await;
        store.readers.insert(reader.id().clone(), reader);
    }
}

pub struct InMemoryTransaction {
    guard: OwnedMutexGuard<MemoryStore>,
    staged: MemoryStore,
}

#[async_trait::async_trait]
impl DatabaseConnection for InMemoryDatabase {
    type Transaction = InMemoryTransaction;

    async fn transact(&self) -> error_stack::Result<Self::Transaction, KernelError> {
        let guard = self.store.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(InMemoryTransaction { guard, staged })
    }
}

#[async_trait::async_trait]
impl Transaction for InMemoryTransaction {
    async fn commit(self) -> error_stack::Result<(), KernelError> {
        let Self { mut guard, staged } = self;
        *guard = staged;
        Ok(())
    }

    async fn roll_back(self) -> error_stack::Result<(), KernelError> {
        Ok(())
    }
}

fn page<T>(items: impl Iterator<Item = T>, limit: &SelectLimit, offset: &SelectOffset) -> Vec<T> {
    let offset = usize::try_from(*offset.as_ref()).unwrap_or(0);
    let limit = usize::try_from(*limit.as_ref()).unwrap_or(usize::MAX);
    items.skip(offset).take(limit).collect()
}
