use std::fmt::{Display, Formatter};
use std::str::FromStr;

use error_stack::Report;
use serde::{Serialize, Serializer};
use time::Date;

use crate::KernelError;

static MIN_YEAR: i32 = 1970;

/// Human-readable identity of a lending, rendered as `"{year}/{sequence}"`.
///
/// The year must lie between 1970 and the current year; the sequence is never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LendingNumber {
    year: i32,
    sequence: i64,
}

impl LendingNumber {
    /// Rebuilds a number that was validated before it was stored.
    pub fn new(year: impl Into<i32>, sequence: impl Into<i64>) -> Self {
        Self {
            year: year.into(),
            sequence: sequence.into(),
        }
    }

    pub fn from_year_and_sequence(
        year: i32,
        sequence: i64,
        today: Date,
    ) -> error_stack::Result<Self, KernelError> {
        if year < MIN_YEAR || year > today.year() {
            return Err(Report::new(KernelError::Validation).attach_printable(format!(
                "lending year {year} is outside {MIN_YEAR}..={}",
                today.year()
            )));
        }
        if sequence < 0 {
            return Err(Report::new(KernelError::Validation)
                .attach_printable(format!("lending sequence {sequence} is negative")));
        }
        Ok(Self { year, sequence })
    }

    pub fn from_sequence(sequence: i64, today: Date) -> error_stack::Result<Self, KernelError> {
        Self::from_year_and_sequence(today.year(), sequence, today)
    }

    pub fn parse(text: &str, today: Date) -> error_stack::Result<Self, KernelError> {
        let (year, sequence) = text.split_once('/').ok_or_else(|| malformed(text))?;
        let year = numeric::<i32>(year, text)?;
        let sequence = numeric::<i64>(sequence, text)?;
        Self::from_year_and_sequence(year, sequence, today)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn sequence(&self) -> i64 {
        self.sequence
    }
}

fn numeric<N: FromStr>(part: &str, text: &str) -> error_stack::Result<N, KernelError> {
    if part.is_empty() || !part.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(malformed(text));
    }
    part.parse::<N>().map_err(|_| malformed(text))
}

fn malformed(text: &str) -> Report<KernelError> {
    Report::new(KernelError::Validation)
        .attach_printable(format!("`{text}` is not a lending number of the form YEAR/SEQUENCE"))
}

impl Display for LendingNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.year, self.sequence)
    }
}

impl Serialize for LendingNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
