use sqlx::PgConnection;
use uuid::Uuid;

use kernel::interface::query::BookQuery;
use kernel::prelude::entity::{BookId, BookTitle, LentBook};
use kernel::KernelError;

use crate::database::postgres::PostgresTransaction;
use crate::error::ConvertError;

pub struct PostgresBookRepository;

#[async_trait::async_trait]
impl BookQuery for PostgresBookRepository {
    type Transaction = PostgresTransaction;

    async fn find_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &BookId,
    ) -> error_stack::Result<Option<LentBook>, KernelError> {
        PgBookInternal::find_by_id(&mut con.0, id).await.convert_error()
    }
}

#[derive(sqlx::FromRow)]
struct BookRow {
    id: Uuid,
    title: String,
}

impl From<BookRow> for LentBook {
    fn from(value: BookRow) -> Self {
        LentBook::new(BookId::new(value.id), BookTitle::new(value.title))
    }
}

pub(in crate::database) struct PgBookInternal;

impl PgBookInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &BookId,
    ) -> Result<Option<LentBook>, sqlx::Error> {
        let row = sqlx::query_as::<_, BookRow>(
            // language=postgresql
            r#"
            SELECT id, title
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await?;
        Ok(row.map(LentBook::from))
    }

    #[cfg(test)]
    pub(in crate::database) async fn create(
        con: &mut PgConnection,
        book: &LentBook,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            // language=postgresql
            r#"
            INSERT INTO books (id, title)
            VALUES ($1, $2)
            "#,
        )
        .bind(book.id().as_ref())
        .bind(book.title().as_ref())
        .execute(con)
        .await?;
        Ok(())
    }
}
