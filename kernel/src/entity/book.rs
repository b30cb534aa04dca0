mod id;
mod title;

pub use self::{id::*, title::*};
use destructure::Destructure;
use vodca::References;

/// The book side of a lending, as handed over by the catalog.
#[derive(Debug, Clone, Eq, PartialEq, References, Destructure)]
pub struct LentBook {
    id: BookId,
    title: BookTitle,
}

impl LentBook {
    pub fn new(id: BookId, title: BookTitle) -> Self {
        Self { id, title }
    }
}
