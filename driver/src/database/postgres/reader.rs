use sqlx::PgConnection;
use uuid::Uuid;

use kernel::interface::query::ReaderQuery;
use kernel::prelude::entity::{Borrower, ReaderId, ReaderName};
use kernel::KernelError;

use crate::database::postgres::PostgresTransaction;
use crate::error::ConvertError;

pub struct PostgresReaderRepository;

#[async_trait::async_trait]
impl ReaderQuery for PostgresReaderRepository {
    type Transaction = PostgresTransaction;

    async fn find_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &ReaderId,
    ) -> error_stack::Result<Option<Borrower>, KernelError> {
        PgReaderInternal::find_by_id(&mut con.0, id).await.convert_error()
    }
}

#[derive(sqlx::FromRow)]
struct ReaderRow {
    id: Uuid,
    name: String,
}

impl From<ReaderRow> for Borrower {
    fn from(value: ReaderRow) -> Self {
        Borrower::new(ReaderId::new(value.id), ReaderName::new(value.name))
    }
}

pub(in crate::database) struct PgReaderInternal;

impl PgReaderInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &ReaderId,
    ) -> Result<Option<Borrower>, sqlx::Error> {
        let row = sqlx::query_as::<_, ReaderRow>(
            // language=postgresql
            r#"
            SELECT id, name
            FROM readers
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await?;
        Ok(row.map(Borrower::from))
    }

    #[cfg(test)]
    pub(in crate::database) async fn create(
        con: &mut PgConnection,
        reader: &Borrower,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            // language=postgresql
            r#"
            INSERT INTO readers (id, name)
            VALUES ($1, $2)
            "#,
        )
        .bind(reader.id().as_ref())
        .bind(reader.name().as_ref())
        .execute(con)
        .await?;
        Ok(())
    }
}
