use error_stack::Report;
use time::Date;

use kernel::interface::query::LendingQuery;
use kernel::interface::update::LendingModifier;
use kernel::prelude::entity::{
    Lending, LendingFilter, LendingNumber, ReaderId, SelectLimit, SelectOffset, Version,
};
use kernel::KernelError;

use crate::database::memory::{page, InMemoryTransaction};

pub struct InMemoryLendingRepository;

#[async_trait::async_trait]
impl LendingQuery for InMemoryLendingRepository {
    type Transaction = InMemoryTransaction;

    async fn find_by_lending_number(
        &self,
        con: &mut InMemoryTransaction,
        lending_number: &LendingNumber,
    ) -> error_stack::Result<Option<Lending>, KernelError> {
        Ok(con.staged.lendings.get(lending_number).cloned())
    }

    async fn find_outstanding_by_reader(
        &self,
        con: &mut InMemoryTransaction,
        reader_id: &ReaderId,
    ) -> error_stack::Result<Vec<Lending>, KernelError> {
        Ok(con
            .staged
            .lendings
            .values()
            .filter(|lending| !lending.is_returned() && lending.reader().id() == reader_id)
            .cloned()
            .collect())
    }

    async fn max_sequence_of_year(
        &self,
        con: &mut InMemoryTransaction,
        year: i32,
    ) -> error_stack::Result<i64, KernelError> {
        Ok(con
            .staged
            .lendings
            .keys()
            .filter(|number| number.year() == year)
            .map(LendingNumber::sequence)
            .max()
            .unwrap_or(0))
    }

    async fn search(
        &self,
        con: &mut InMemoryTransaction,
        filter: &LendingFilter,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> error_stack::Result<Vec<Lending>, KernelError> {
        let matched = con
            .staged
            .lendings
            .values()
            .filter(|lending| filter.matches(lending))
            .cloned();
        Ok(page(matched, limit, offset))
    }

    async fn average_duration(
        &self,
        con: &mut InMemoryTransaction,
    ) -> error_stack::Result<Option<f64>, KernelError> {
        let days = con
            .staged
            .lendings
            .values()
            .filter_map(|lending| {
                lending
                    .returned_date()
                    .map(|returned| (*returned.as_ref() - *lending.start_date().as_ref()).whole_days())
            })
            .collect::<Vec<_>>();
        if days.is_empty() {
            return Ok(None);
        }
        Ok(Some(days.iter().sum::<i64>() as f64 / days.len() as f64))
    }

    async fn find_overdue(
        &self,
        con: &mut InMemoryTransaction,
        today: &Date,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> error_stack::Result<Vec<Lending>, KernelError> {
        let mut overdue = con
            .staged
            .lendings
            .values()
            .filter(|lending| lending.days_overdue(*today).is_some())
            .cloned()
            .collect::<Vec<_>>();
        overdue.sort_by_key(|lending| (lending.limit_date(), *lending.lending_number()));
        Ok(page(overdue.into_iter(), limit, offset))
    }
}

#[async_trait::async_trait]
impl LendingModifier for InMemoryLendingRepository {
    type Transaction = InMemoryTransaction;

    async fn create(
        &self,
        con: &mut InMemoryTransaction,
        lending: &Lending,
    ) -> error_stack::Result<(), KernelError> {
        let lending_number = *lending.lending_number();
        if con.staged.lendings.contains_key(&lending_number) {
            return Err(Report::new(KernelError::Concurrency)
                .attach_printable(format!("lending number {lending_number} is already taken")));
        }
        con.staged.lendings.insert(lending_number, lending.clone());
        Ok(())
    }

    async fn update(
        &self,
        con: &mut InMemoryTransaction,
        lending: &Lending,
        expected_version: &Version<Lending>,
    ) -> error_stack::Result<(), KernelError> {
        let lending_number = *lending.lending_number();
        let Some(stored) = con.staged.lendings.get_mut(&lending_number) else {
            return Err(Report::new(KernelError::NotFound)
                .attach_printable(format!("lending {lending_number} does not exist")));
        };
        if stored.version() != expected_version {
            tracing::warn!(
                lending_number = %lending_number,
                expected_version = %expected_version,
                "rejected stale lending write"
            );
            return Err(Report::new(KernelError::Concurrency).attach_printable(format!(
                "lending {lending_number} is no longer at version {expected_version}"
            )));
        }
        *stored = lending.clone();
        Ok(())
    }

    async fn delete(
        &self,
        con: &mut InMemoryTransaction,
        lending_number: &LendingNumber,
    ) -> error_stack::Result<(), KernelError> {
        con.staged.lendings.remove(lending_number);
        con.staged.fines.remove(lending_number);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use time::macros::date;
    use uuid::Uuid;

    use kernel::interface::database::{DatabaseConnection, Transaction};
    use kernel::interface::query::{FineQuery, LendingQuery};
    use kernel::interface::update::{FineModifier, LendingModifier};
    use kernel::prelude::entity::{
        BookId, BookTitle, Borrower, Fine, FinePerDay, LendingDuration, LendingFilter, LendingNumber,
        LentBook, Lending, ReaderId, ReaderName, SelectLimit, SelectOffset,
    };
    use kernel::KernelError;

    use crate::database::{InMemoryDatabase, InMemoryFineRepository, InMemoryLendingRepository};

    fn lending(reader: &Borrower, sequence: i64, start: time::Date, returned: Option<time::Date>) -> Lending {
        let book = LentBook::new(BookId::new(Uuid::new_v4()), BookTitle::new("Dune"));
        Lending::bootstrap(
            Some(book),
            Some(reader.clone()),
            2024,
            sequence,
            start,
            returned,
            LendingDuration::new(15),
            FinePerDay::new(200),
            date!(2024 - 12 - 31),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let reader = Borrower::new(ReaderId::new(Uuid::new_v4()), ReaderName::new("Ada"));
        let first = lending(&reader, 1, date!(2024 - 03 - 01), None);
        let second = lending(&reader, 2, date!(2024 - 03 - 10), Some(date!(2024 - 03 - 14)));

        let mut con = db.transact().await?;
        InMemoryLendingRepository.create(&mut con, &first).await?;
        InMemoryLendingRepository.create(&mut con, &second).await?;
        con.commit().await?;

        let mut con = db.transact().await?;
        let found = InMemoryLendingRepository
            .find_by_lending_number(&mut con, first.lending_number())
            .await?;
        assert_eq!(found, Some(first.clone()));
        assert_eq!(
            InMemoryLendingRepository.max_sequence_of_year(&mut con, 2024).await?,
            2
        );
        assert_eq!(
            InMemoryLendingRepository.max_sequence_of_year(&mut con, 2023).await?,
            0
        );
        let outstanding = InMemoryLendingRepository
            .find_outstanding_by_reader(&mut con, reader.id())
            .await?;
        assert_eq!(outstanding, vec![first.clone()]);
        let overdue = InMemoryLendingRepository
            .find_overdue(
                &mut con,
                &date!(2024 - 04 - 01),
                &SelectLimit::default(),
                &SelectOffset::default(),
            )
            .await?;
        assert_eq!(overdue, vec![first.clone()]);
        let returned = InMemoryLendingRepository
            .search(
                &mut con,
                &LendingFilter::new(Some(reader.id().clone()), None, Some(true), None, None),
                &SelectLimit::default(),
                &SelectOffset::default(),
            )
            .await?;
        assert_eq!(returned, vec![second.clone()]);
        assert_eq!(
            InMemoryLendingRepository.average_duration(&mut con).await?,
            Some(4.0)
        );
        con.roll_back().await?;
        Ok(())
    }

    #[tokio::test]
    async fn stale_update_and_duplicate_create_are_rejected() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let reader = Borrower::new(ReaderId::new(Uuid::new_v4()), ReaderName::new("Ada"));
        let original = lending(&reader, 1, date!(2024 - 03 - 01), None);

        let mut con = db.transact().await?;
        InMemoryLendingRepository.create(&mut con, &original).await?;
        let duplicate = InMemoryLendingRepository.create(&mut con, &original).await;
        assert!(matches!(
            duplicate.unwrap_err().current_context(),
            KernelError::Concurrency
        ));

        let mut returned = original.clone();
        returned.mark_returned(original.version(), None, date!(2024 - 03 - 05))?;
        InMemoryLendingRepository
            .update(&mut con, &returned, original.version())
            .await?;
        let stale = InMemoryLendingRepository
            .update(&mut con, &returned, original.version())
            .await;
        assert!(matches!(
            stale.unwrap_err().current_context(),
            KernelError::Concurrency
        ));

        let missing = lending(&reader, 9, date!(2024 - 03 - 01), None);
        let absent = InMemoryLendingRepository
            .update(&mut con, &missing, missing.version())
            .await;
        assert!(matches!(
            absent.unwrap_err().current_context(),
            KernelError::NotFound
        ));
        con.commit().await?;

        let mut con = db.transact().await?;
        InMemoryLendingRepository
            .delete(&mut con, &LendingNumber::new(2024, 1))
            .await?;
        con.roll_back().await?;

        let mut con = db.transact().await?;
        let kept = InMemoryLendingRepository
            .find_by_lending_number(&mut con, &LendingNumber::new(2024, 1))
            .await?;
        assert_eq!(kept, Some(returned));
        Ok(())
    }

    #[tokio::test]
    async fn delete_drops_the_fine_snapshot() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let reader = Borrower::new(ReaderId::new(Uuid::new_v4()), ReaderName::new("Ada"));
        let late = lending(&reader, 4, date!(2024 - 03 - 01), Some(date!(2024 - 04 - 01)));
        let fine = Fine::new(Some(late.clone()), date!(2024 - 04 - 01))?;

        let mut con = db.transact().await?;
        InMemoryLendingRepository.create(&mut con, &late).await?;
        InMemoryFineRepository.create(&mut con, &fine).await?;
        InMemoryLendingRepository
            .delete(&mut con, late.lending_number())
            .await?;
        let gone = InMemoryFineRepository
            .find_by_lending_number(&mut con, late.lending_number())
            .await?;
        assert_eq!(gone, None);

        InMemoryLendingRepository.create(&mut con, &late).await?;
        InMemoryFineRepository.create(&mut con, &fine).await?;
        let stored = InMemoryFineRepository
            .find_by_lending_number(&mut con, late.lending_number())
            .await?;
        assert_eq!(stored, Some(fine));
        con.commit().await?;
        Ok(())
    }
}
