use kernel::prelude::entity::{DestructFine, Fine};

use crate::transfer::LendingDto;
use time::Date;

#[derive(Debug, Clone, PartialEq)]
pub struct FineDto {
    pub lending: LendingDto,
    pub fine_per_day_cents: i64,
    pub cents: i64,
}

impl FineDto {
    pub fn new(fine: Fine, today: Date) -> Self {
        let DestructFine {
            lending,
            fine_per_day,
            cents,
        } = fine.into_destruct();
        Self {
            lending: LendingDto::new(lending, today),
            fine_per_day_cents: fine_per_day.into(),
            cents: cents.into(),
        }
    }
}
