use error_stack::Report;

use kernel::interface::clock::{Clock, DependOnClock};
use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use kernel::interface::policy::DependOnLendingPolicy;
use kernel::interface::query::{
    BookQuery, DependOnBookQuery, DependOnLendingQuery, DependOnReaderQuery, LendingQuery,
    ReaderQuery,
};
use kernel::interface::update::{
    DependOnFineModifier, DependOnLendingModifier, FineModifier, LendingModifier,
};
use kernel::prelude::entity::{
    BookId, Fine, Lending, LendingFilter, LendingNumber, ReaderId, ReturnCommentary, SelectLimit,
    SelectOffset, Version,
};
use kernel::KernelError;

use crate::transfer::{
    BootstrapLendingDto, CreateLendingDto, GetLendingDto, LendingDto, PageDto, ReturnLendingDto,
    SearchLendingDto,
};

#[async_trait::async_trait]
pub trait CreateLendingService:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection
    + DependOnClock
    + DependOnLendingPolicy
    + DependOnBookQuery
    + DependOnReaderQuery
    + DependOnLendingQuery
    + DependOnLendingModifier
{
    /// Opens a lending of the book to the reader, starting today under the current policy.
    async fn create_lending(
        &self,
        dto: CreateLendingDto,
    ) -> error_stack::Result<LendingDto, KernelError> {
        let today = self.clock().today();
        let policy = self.lending_policy();
        let mut connection = self.database_connection().transact().await?;

        let book = self
            .book_query()
            .find_by_id(&mut connection, &BookId::new(dto.book_id))
            .await?;
        let reader = self
            .reader_query()
            .find_by_id(&mut connection, &ReaderId::new(dto.reader_id))
            .await?;

        if let Some(reader) = &reader {
            let outstanding = self
                .lending_query()
                .find_outstanding_by_reader(&mut connection, reader.id())
                .await?;
            let limit = *policy.outstanding_limit().as_ref();
            if outstanding.len() >= limit {
                tracing::warn!(reader_id = %dto.reader_id, limit, "reader reached the outstanding limit");
                return Err(Report::new(KernelError::State).attach_printable(format!(
                    "reader {} already holds {} lendings, the limit is {limit}",
                    dto.reader_id,
                    outstanding.len()
                )));
            }
            if let Some(overdue) = outstanding
                .iter()
                .find(|lending| lending.days_overdue(today).is_some())
            {
                tracing::warn!(reader_id = %dto.reader_id, lending_number = %overdue.lending_number(), "reader has an overdue lending");
                return Err(Report::new(KernelError::State).attach_printable(format!(
                    "reader {} must return overdue lending {} first",
                    dto.reader_id,
                    overdue.lending_number()
                )));
            }
        }

        let sequence = self
            .lending_query()
            .max_sequence_of_year(&mut connection, today.year())
            .await?
            + 1;
        let lending = Lending::create(
            book,
            reader,
            sequence,
            *policy.duration(),
            *policy.fine_per_day(),
            today,
        )?;
        self.lending_modifier()
            .create(&mut connection, &lending)
            .await?;
        connection.commit().await?;

        tracing::info!(lending_number = %lending.lending_number(), "opened lending");
        Ok(LendingDto::new(lending, today))
    }

    /// Imports a lending with explicit identity and dates, under the current policy.
    async fn bootstrap_lending(
        &self,
        dto: BootstrapLendingDto,
    ) -> error_stack::Result<LendingDto, KernelError> {
        let today = self.clock().today();
        let policy = self.lending_policy();
        let mut connection = self.database_connection().transact().await?;

        let book = self
            .book_query()
            .find_by_id(&mut connection, &BookId::new(dto.book_id))
            .await?;
        let reader = self
            .reader_query()
            .find_by_id(&mut connection, &ReaderId::new(dto.reader_id))
            .await?;
        let lending = Lending::bootstrap(
            book,
            reader,
            dto.year,
            dto.sequence,
            dto.start_date,
            dto.returned_date,
            *policy.duration(),
            *policy.fine_per_day(),
            today,
        )?;
        self.lending_modifier()
            .create(&mut connection, &lending)
            .await?;
        connection.commit().await?;

        tracing::info!(lending_number = %lending.lending_number(), "imported lending");
        Ok(LendingDto::new(lending, today))
    }
}

impl<T> CreateLendingService for T where
    T: DependOnDatabaseConnection
        + DependOnClock
        + DependOnLendingPolicy
        + DependOnBookQuery
        + DependOnReaderQuery
        + DependOnLendingQuery
        + DependOnLendingModifier
{
}

#[async_trait::async_trait]
pub trait ReturnLendingService:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection
    + DependOnClock
    + DependOnLendingQuery
    + DependOnLendingModifier
    + DependOnFineModifier
{
    /// Records the return of a lending last read at `dto.version`. A late return leaves a
    /// fine snapshot behind.
    async fn return_lending(
        &self,
        dto: ReturnLendingDto,
    ) -> error_stack::Result<LendingDto, KernelError> {
        let today = self.clock().today();
        let lending_number = LendingNumber::parse(&dto.lending_number, today)?;
        let expected_version = Version::<Lending>::new(dto.version);
        let mut connection = self.database_connection().transact().await?;

        let mut lending = self
            .lending_query()
            .find_by_lending_number(&mut connection, &lending_number)
            .await?
            .ok_or_else(|| not_found(&lending_number))?;
        if lending.version() != &expected_version {
            tracing::warn!(%lending_number, %expected_version, current = %lending.version(), "rejected stale return");
            return Err(Report::new(KernelError::Concurrency).attach_printable(format!(
                "lending {lending_number} is at version {}, not {expected_version}",
                lending.version()
            )));
        }
        lending
            .mark_returned(
                &expected_version,
                dto.commentary.map(ReturnCommentary::new),
                today,
            )
            .map_err(|report| {
                tracing::warn!(%lending_number, "rejected return");
                report
            })?;
        self.lending_modifier()
            .update(&mut connection, &lending, &expected_version)
            .await?;
        if lending.days_delayed(today) > 0 {
            let fine = Fine::new(Some(lending.clone()), today)?;
            self.fine_modifier().create(&mut connection, &fine).await?;
            tracing::info!(%lending_number, cents = *fine.cents().as_ref(), "stored fine of late return");
        }
        connection.commit().await?;

        tracing::info!(%lending_number, version = %lending.version(), "returned lending");
        Ok(LendingDto::new(lending, today))
    }
}

impl<T> ReturnLendingService for T where
    T: DependOnDatabaseConnection
        + DependOnClock
        + DependOnLendingQuery
        + DependOnLendingModifier
        + DependOnFineModifier
{
}

#[async_trait::async_trait]
pub trait GetLendingService:
    'static + Sync + Send + DependOnDatabaseConnection + DependOnClock + DependOnLendingQuery
{
    async fn get_lending(&self, dto: GetLendingDto) -> error_stack::Result<LendingDto, KernelError> {
        let today = self.clock().today();
        let lending_number = LendingNumber::parse(&dto.lending_number, today)?;
        let mut connection = self.database_connection().transact().await?;

        let lending = self
            .lending_query()
            .find_by_lending_number(&mut connection, &lending_number)
            .await?
            .ok_or_else(|| not_found(&lending_number))?;
        tracing::debug!(%lending_number, "loaded lending");
        Ok(LendingDto::new(lending, today))
    }

    async fn search_lendings(
        &self,
        dto: SearchLendingDto,
        page: PageDto,
    ) -> error_stack::Result<Vec<LendingDto>, KernelError> {
        let today = self.clock().today();
        let filter = LendingFilter::new(
            dto.reader_id.map(ReaderId::new),
            dto.book_id.map(BookId::new),
            dto.returned,
            dto.started_from,
            dto.started_until,
        );
        let (limit, offset) = paging(page);
        let mut connection = self.database_connection().transact().await?;

        let lendings = self
            .lending_query()
            .search(&mut connection, &filter, &limit, &offset)
            .await?;
        tracing::debug!(found = lendings.len(), "searched lendings");
        Ok(lendings
            .into_iter()
            .map(|lending| LendingDto::new(lending, today))
            .collect())
    }

    async fn overdue_lendings(
        &self,
        page: PageDto,
    ) -> error_stack::Result<Vec<LendingDto>, KernelError> {
        let today = self.clock().today();
        let (limit, offset) = paging(page);
        let mut connection = self.database_connection().transact().await?;

        let lendings = self
            .lending_query()
            .find_overdue(&mut connection, &today, &limit, &offset)
            .await?;
        tracing::debug!(found = lendings.len(), "listed overdue lendings");
        Ok(lendings
            .into_iter()
            .map(|lending| LendingDto::new(lending, today))
            .collect())
    }

    /// Mean days between start and return over returned lendings, `None` when nothing came back yet.
    async fn average_duration(&self) -> error_stack::Result<Option<f64>, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        self.lending_query()
            .average_duration(&mut connection)
            .await
    }
}

impl<T> GetLendingService for T where
    T: DependOnDatabaseConnection + DependOnClock + DependOnLendingQuery
{
}

fn paging(page: PageDto) -> (SelectLimit, SelectOffset) {
    (
        page.limit.map(SelectLimit::new).unwrap_or_default(),
        page.offset.map(SelectOffset::new).unwrap_or_default(),
    )
}

pub(in crate::service) fn not_found(lending_number: &LendingNumber) -> Report<KernelError> {
    Report::new(KernelError::NotFound)
        .attach_printable(format!("lending {lending_number} does not exist"))
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use time::macros::date;
    use uuid::Uuid;

    use kernel::KernelError;

    use crate::service::fixture::TestModule;
    use crate::service::{CreateLendingService, GetLendingService, ReturnLendingService};
    use crate::transfer::{
        BootstrapLendingDto, CreateLendingDto, GetLendingDto, PageDto, ReturnLendingDto,
        SearchLendingDto,
    };

    #[tokio::test]
    async fn lending_becomes_overdue_as_days_pass() -> error_stack::Result<(), KernelError> {
        let module = TestModule::new(date!(2024 - 06 - 01));
        let book_id = module.book("The Left Hand of Darkness").await;
        let reader_id = module.reader("Ursula").await;

        let created = module
            .create_lending(CreateLendingDto { book_id, reader_id })
            .await?;
        assert_eq!(created.lending_number, "2024/1");
        assert_eq!(created.limit_date, date!(2024 - 06 - 16));
        assert_eq!(created.days_until_return, Some(15));
        assert_eq!(created.fine_value_in_cents, None);
        assert_eq!(created.version, 0);

        module.clock.advance(20);
        let lending = module
            .get_lending(GetLendingDto {
                lending_number: created.lending_number.clone(),
            })
            .await?;
        assert_eq!(lending.days_overdue, Some(5));
        assert_eq!(lending.fine_value_in_cents, Some(1000));

        let overdue = module.overdue_lendings(PageDto::default()).await?;
        assert_eq!(overdue, vec![lending]);
        Ok(())
    }

    #[tokio::test]
    async fn racing_returns_admit_exactly_one() -> error_stack::Result<(), KernelError> {
        let module = Arc::new(TestModule::new(date!(2024 - 06 - 01)));
        let book_id = module.book("Solaris").await;
        let reader_id = module.reader("Stanislaw").await;
        let created = module
            .create_lending(CreateLendingDto { book_id, reader_id })
            .await?;

        let handles = (0..2)
            .map(|_| {
                let module = Arc::clone(&module);
                let lending_number = created.lending_number.clone();
                tokio::spawn(async move {
                    module
                        .return_lending(ReturnLendingDto {
                            lending_number,
                            version: 0,
                            commentary: None,
                        })
                        .await
                })
            })
            .collect::<Vec<_>>();
        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }

        assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
        let rejected = results.into_iter().find_map(Result::err).unwrap();
        assert!(matches!(rejected.current_context(), KernelError::Concurrency));

        let lending = module
            .get_lending(GetLendingDto {
                lending_number: created.lending_number,
            })
            .await?;
        assert_eq!(lending.version, 1);
        assert_eq!(lending.returned_date, Some(date!(2024 - 06 - 01)));
        Ok(())
    }

    #[tokio::test]
    async fn second_return_is_a_state_error() -> error_stack::Result<(), KernelError> {
        let module = TestModule::new(date!(2024 - 06 - 01));
        let book_id = module.book("Kindred").await;
        let reader_id = module.reader("Octavia").await;
        let created = module
            .create_lending(CreateLendingDto { book_id, reader_id })
            .await?;

        let returned = module
            .return_lending(ReturnLendingDto {
                lending_number: created.lending_number.clone(),
                version: 0,
                commentary: Some("cover torn".to_string()),
            })
            .await?;
        assert_eq!(returned.returned_commentary.as_deref(), Some("cover torn"));

        let again = module
            .return_lending(ReturnLendingDto {
                lending_number: created.lending_number,
                version: returned.version,
                commentary: None,
            })
            .await;
        assert!(matches!(
            again.unwrap_err().current_context(),
            KernelError::State
        ));
        Ok(())
    }

    #[tokio::test]
    async fn reader_limits_are_enforced() -> error_stack::Result<(), KernelError> {
        let module = TestModule::new(date!(2024 - 06 - 01));
        let reader_id = module.reader("Iain").await;
        for title in ["Excession", "Use of Weapons", "Look to Windward"] {
            let book_id = module.book(title).await;
            module
                .create_lending(CreateLendingDto { book_id, reader_id })
                .await?;
        }
        let book_id = module.book("Matter").await;
        let over_limit = module
            .create_lending(CreateLendingDto { book_id, reader_id })
            .await;
        assert!(matches!(
            over_limit.unwrap_err().current_context(),
            KernelError::State
        ));

        let late_reader = module.reader("Jo").await;
        module
            .create_lending(CreateLendingDto {
                book_id,
                reader_id: late_reader,
            })
            .await?;
        module.clock.advance(16);
        let another = module.book("Inversions").await;
        let blocked = module
            .create_lending(CreateLendingDto {
                book_id: another,
                reader_id: late_reader,
            })
            .await;
        assert!(matches!(
            blocked.unwrap_err().current_context(),
            KernelError::State
        ));
        Ok(())
    }

    #[tokio::test]
    async fn sequence_follows_highest_of_the_year() -> error_stack::Result<(), KernelError> {
        let module = TestModule::new(date!(2024 - 06 - 01));
        let book_id = module.book("Hyperion").await;
        let reader_id = module.reader("Dan").await;
        let imported = module
            .bootstrap_lending(BootstrapLendingDto {
                book_id,
                reader_id,
                year: 2024,
                sequence: 7,
                start_date: date!(2024 - 01 - 10),
                returned_date: Some(date!(2024 - 01 - 20)),
            })
            .await?;
        assert_eq!(imported.lending_number, "2024/7");
        module
            .bootstrap_lending(BootstrapLendingDto {
                book_id,
                reader_id,
                year: 2023,
                sequence: 40,
                start_date: date!(2023 - 11 - 02),
                returned_date: Some(date!(2023 - 11 - 08)),
            })
            .await?;

        let created = module
            .create_lending(CreateLendingDto { book_id, reader_id })
            .await?;
        assert_eq!(created.lending_number, "2024/8");

        let average = module.average_duration().await?;
        assert_eq!(average, Some(8.0));

        let open = module
            .search_lendings(
                SearchLendingDto {
                    reader_id: Some(reader_id),
                    returned: Some(false),
                    ..Default::default()
                },
                PageDto::default(),
            )
            .await?;
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].lending_number, "2024/8");

        let duplicate = module
            .bootstrap_lending(BootstrapLendingDto {
                book_id,
                reader_id,
                year: 2024,
                sequence: 7,
                start_date: date!(2024 - 02 - 01),
                returned_date: None,
            })
            .await;
        assert!(matches!(
            duplicate.unwrap_err().current_context(),
            KernelError::Concurrency
        ));
        Ok(())
    }

    #[tokio::test]
    async fn unknown_references_are_rejected() -> error_stack::Result<(), KernelError> {
        let module = TestModule::new(date!(2024 - 06 - 01));
        let reader_id = module.reader("Becky").await;

        let missing_book = module
            .create_lending(CreateLendingDto {
                book_id: Uuid::new_v4(),
                reader_id,
            })
            .await;
        assert!(matches!(
            missing_book.unwrap_err().current_context(),
            KernelError::Validation
        ));

        let missing = module
            .get_lending(GetLendingDto {
                lending_number: "2024/99".to_string(),
            })
            .await;
        assert!(matches!(
            missing.unwrap_err().current_context(),
            KernelError::NotFound
        ));

        let malformed = module
            .return_lending(ReturnLendingDto {
                lending_number: "2024-1".to_string(),
                version: 0,
                commentary: None,
            })
            .await;
        assert!(matches!(
            malformed.unwrap_err().current_context(),
            KernelError::Validation
        ));
        Ok(())
    }
}
