use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct FineCents(i64);

impl FineCents {
    pub fn new(cents: impl Into<i64>) -> Self {
        Self(cents.into())
    }
}
