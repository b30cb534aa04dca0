use time::Date;
use vodca::References;

use crate::entity::{BookId, Lending, ReaderId};

/// Criteria of a lending search. Every unset criterion matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, References)]
pub struct LendingFilter {
    reader_id: Option<ReaderId>,
    book_id: Option<BookId>,
    returned: Option<bool>,
    started_from: Option<Date>,
    started_until: Option<Date>,
}

impl LendingFilter {
    pub fn new(
        reader_id: Option<ReaderId>,
        book_id: Option<BookId>,
        returned: Option<bool>,
        started_from: Option<Date>,
        started_until: Option<Date>,
    ) -> Self {
        Self {
            reader_id,
            book_id,
            returned,
            started_from,
            started_until,
        }
    }

    pub fn matches(&self, lending: &Lending) -> bool {
        let start = *lending.start_date().as_ref();
        self.reader_id
            .as_ref()
            .map_or(true, |id| lending.reader().id() == id)
            && self
                .book_id
                .as_ref()
                .map_or(true, |id| lending.book().id() == id)
            && self
                .returned
                .map_or(true, |returned| lending.returned_date().is_some() == returned)
            && self.started_from.map_or(true, |from| start >= from)
            && self.started_until.map_or(true, |until| start <= until)
    }
}
