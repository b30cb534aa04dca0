use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

/// Free text left by the reader when handing the book back. Blank text is kept as given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct ReturnCommentary(String);

impl ReturnCommentary {
    pub fn new(commentary: impl Into<String>) -> Self {
        Self(commentary.into())
    }
}
