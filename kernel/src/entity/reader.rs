mod id;
mod name;

pub use self::{id::*, name::*};
use destructure::Destructure;
use vodca::References;

/// The reader holding a lending.
#[derive(Debug, Clone, Eq, PartialEq, References, Destructure)]
pub struct Borrower {
    id: ReaderId,
    name: ReaderName,
}

impl Borrower {
    pub fn new(id: ReaderId, name: ReaderName) -> Self {
        Self { id, name }
    }
}
