use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct FinePerDay(i64);

impl FinePerDay {
    pub fn new(cents: impl Into<i64>) -> Self {
        Self(cents.into())
    }
}
