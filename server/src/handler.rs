use std::ops::Deref;
use std::sync::Arc;

use driver::clock::SystemClock;
use driver::config;
use driver::database::{
    PostgresBookRepository, PostgresDatabase, PostgresFineRepository, PostgresLendingRepository,
    PostgresReaderRepository,
};
use kernel::interface::clock::DependOnClock;
use kernel::interface::database::DependOnDatabaseConnection;
use kernel::interface::policy::DependOnLendingPolicy;
use kernel::interface::query::{
    DependOnBookQuery, DependOnFineQuery, DependOnLendingQuery, DependOnReaderQuery,
};
use kernel::interface::update::{DependOnFineModifier, DependOnLendingModifier};
use kernel::prelude::entity::LendingPolicy;
use kernel::KernelError;

#[derive(Clone)]
pub struct AppModule(Arc<Handler>);

impl AppModule {
    pub async fn new() -> error_stack::Result<Self, KernelError> {
        Ok(Self(Arc::new(Handler::init().await?)))
    }
}

impl Deref for AppModule {
    type Target = Handler;
    fn deref(&self) -> &Self::Target {
        Deref::deref(&self.0)
    }
}

pub struct Handler {
    pgpool: PostgresDatabase,
    clock: SystemClock,
    policy: LendingPolicy,
}

impl Handler {
    pub async fn init() -> error_stack::Result<Self, KernelError> {
        let policy = config::lending_policy()?;
        let pgpool = PostgresDatabase::new().await?;

        Ok(Self {
            pgpool,
            clock: SystemClock,
            policy,
        })
    }
}

impl DependOnDatabaseConnection for Handler {
    type DatabaseConnection = PostgresDatabase;
    fn database_connection(&self) -> &Self::DatabaseConnection {
        &self.pgpool
    }
}

impl DependOnClock for Handler {
    type Clock = SystemClock;
    fn clock(&self) -> &Self::Clock {
        &self.clock
    }
}

impl DependOnLendingPolicy for Handler {
    fn lending_policy(&self) -> &LendingPolicy {
        &self.policy
    }
}

impl DependOnBookQuery for Handler {
    type BookQuery = PostgresBookRepository;
    fn book_query(&self) -> &Self::BookQuery {
        &PostgresBookRepository
    }
}

impl DependOnReaderQuery for Handler {
    type ReaderQuery = PostgresReaderRepository;
    fn reader_query(&self) -> &Self::ReaderQuery {
        &PostgresReaderRepository
    }
}

impl DependOnLendingQuery for Handler {
    type LendingQuery = PostgresLendingRepository;
    fn lending_query(&self) -> &Self::LendingQuery {
        &PostgresLendingRepository
    }
}

impl DependOnLendingModifier for Handler {
    type LendingModifier = PostgresLendingRepository;
    fn lending_modifier(&self) -> &Self::LendingModifier {
        &PostgresLendingRepository
    }
}

impl DependOnFineQuery for Handler {
    type FineQuery = PostgresFineRepository;
    fn fine_query(&self) -> &Self::FineQuery {
        &PostgresFineRepository
    }
}

impl DependOnFineModifier for Handler {
    type FineModifier = PostgresFineRepository;
    fn fine_modifier(&self) -> &Self::FineModifier {
        &PostgresFineRepository
    }
}
