use serde::{Deserialize, Serialize};
use time::Date;
use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct StartDate(Date);

impl StartDate {
    pub fn new(date: impl Into<Date>) -> Self {
        Self(date.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct ReturnedDate(Date);

impl ReturnedDate {
    pub fn new(date: impl Into<Date>) -> Self {
        Self(date.into())
    }
}
