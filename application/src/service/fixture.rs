use std::sync::{Arc, Mutex};

use time::{Date, Duration};
use uuid::Uuid;

use driver::database::{
    InMemoryBookRepository, InMemoryDatabase, InMemoryFineRepository, InMemoryLendingRepository,
    InMemoryReaderRepository,
};
use kernel::interface::clock::{Clock, DependOnClock};
use kernel::interface::database::DependOnDatabaseConnection;
use kernel::interface::policy::DependOnLendingPolicy;
use kernel::interface::query::{
    DependOnBookQuery, DependOnFineQuery, DependOnLendingQuery, DependOnReaderQuery,
};
use kernel::interface::update::{DependOnFineModifier, DependOnLendingModifier};
use kernel::prelude::entity::{
    BookId, BookTitle, Borrower, LendingPolicy, LentBook, ReaderId, ReaderName,
};

/// Clock that only moves when a test tells it to.
#[derive(Clone)]
pub(crate) struct ManualClock(Arc<Mutex<Date>>);

impl ManualClock {
    pub(crate) fn new(today: Date) -> Self {
        Self(Arc::new(Mutex::new(today)))
    }

    pub(crate) fn advance(&self, days: i64) {
        let mut today = self.0.lock().unwrap();
        *today += Duration::days(days);
    }
}

impl Clock for ManualClock {
    fn today(&self) -> Date {
        *self.0.lock().unwrap()
    }
}

pub(crate) struct TestModule {
    pub(crate) database: InMemoryDatabase,
    pub(crate) clock: ManualClock,
    pub(crate) policy: LendingPolicy,
}

impl TestModule {
    pub(crate) fn new(today: Date) -> Self {
        Self {
            database: InMemoryDatabase::new(),
            clock: ManualClock::new(today),
            policy: LendingPolicy::default(),
        }
    }

    pub(crate) async fn book(&self, title: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.database
            .register_book(LentBook::new(BookId::new(id), BookTitle::new(title)))
            .await;
        id
    }

    pub(crate) async fn reader(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.database
            .register_reader(Borrower::new(ReaderId::new(id), ReaderName::new(name)))
            .await;
        id
    }
}

impl DependOnDatabaseConnection for TestModule {
    type DatabaseConnection = InMemoryDatabase;
    fn database_connection(&self) -> &Self::DatabaseConnection {
        &self.database
    }
}

impl DependOnClock for TestModule {
    type Clock = ManualClock;
    fn clock(&self) -> &Self::Clock {
        &self.clock
    }
}

impl DependOnLendingPolicy for TestModule {
    fn lending_policy(&self) -> &LendingPolicy {
        &self.policy
    }
}

impl DependOnBookQuery for TestModule {
    type BookQuery = InMemoryBookRepository;
    fn book_query(&self) -> &Self::BookQuery {
        &InMemoryBookRepository
    }
}

impl DependOnReaderQuery for TestModule {
    type ReaderQuery = InMemoryReaderRepository;
    fn reader_query(&self) -> &Self::ReaderQuery {
        &InMemoryReaderRepository
    }
}

impl DependOnLendingQuery for TestModule {
    type LendingQuery = InMemoryLendingRepository;
    fn lending_query(&self) -> &Self::LendingQuery {
        &InMemoryLendingRepository
    }
}

impl DependOnLendingModifier for TestModule {
    type LendingModifier = InMemoryLendingRepository;
    fn lending_modifier(&self) -> &Self::LendingModifier {
        &InMemoryLendingRepository
    }
}

impl DependOnFineQuery for TestModule {
    type FineQuery = InMemoryFineRepository;
    fn fine_query(&self) -> &Self::FineQuery {
        &InMemoryFineRepository
    }
}

impl DependOnFineModifier for TestModule {
    type FineModifier = InMemoryFineRepository;
    fn fine_modifier(&self) -> &Self::FineModifier {
        &InMemoryFineRepository
    }
}
