use std::str::FromStr;

use error_stack::Report;
use time::OffsetDateTime;
use kernel::prelude::entity::{FinePerDay, LendingDuration, LendingPolicy, OutstandingLimit};
use kernel::KernelError;

use crate::error::{ConvertError, DriverError};

static LENDING_DURATION_IN_DAYS: &str = "LENDING_DURATION_IN_DAYS";
static FINE_VALUE_PER_DAY_IN_CENTS: &str = "FINE_VALUE_PER_DAY_IN_CENTS";
static LENDING_OUTSTANDING_LIMIT: &str = "LENDING_OUTSTANDING_LIMIT";
static SERVER_PORT: &str = "SERVER_PORT";

/// Reads the lending policy from the environment (`.env` included), falling back to the
/// defaults for unset keys.
pub fn lending_policy() -> error_stack::Result<LendingPolicy, KernelError> {
    let defaults = LendingPolicy::default();
    let duration = optional_env::<i64>(LENDING_DURATION_IN_DAYS)
        .convert_error()?
        .map_or(*defaults.duration(), LendingDuration::new);
    let fine_per_day = optional_env::<i64>(FINE_VALUE_PER_DAY_IN_CENTS)
        .convert_error()?
        .map_or(*defaults.fine_per_day(), FinePerDay::new);
    let outstanding_limit = optional_env::<usize>(LENDING_OUTSTANDING_LIMIT)
        .convert_error()?
        .map_or(*defaults.outstanding_limit(), OutstandingLimit::new);

    if *duration.as_ref() < 1 {
        return Err(Report::new(KernelError::Validation)
            .attach_printable(format!("{LENDING_DURATION_IN_DAYS} must be at least 1")));
    }
    if duration.end_from(OffsetDateTime::now_utc().date()).is_none() {
        return Err(Report::new(KernelError::Validation).attach_printable(format!(
            "{LENDING_DURATION_IN_DAYS} {} runs past the supported calendar",
            duration.as_ref()
        )));
    }
    if *fine_per_day.as_ref() < 0 {
        return Err(Report::new(KernelError::Validation)
            .attach_printable(format!("{FINE_VALUE_PER_DAY_IN_CENTS} cannot be negative")));
    }

    tracing::info!(
        duration = duration.as_ref(),
        fine_per_day = fine_per_day.as_ref(),
        outstanding_limit = outstanding_limit.as_ref(),
        "lending policy loaded"
    );
    Ok(LendingPolicy::new(duration, fine_per_day, outstanding_limit))
}

pub fn server_port() -> error_stack::Result<u16, KernelError> {
    Ok(optional_env::<u16>(SERVER_PORT).convert_error()?.unwrap_or(8080))
}

fn optional_env<T>(key: &str) -> Result<Option<T>, DriverError>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match crate::env(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|error| DriverError::Conversion(anyhow::Error::new(error).context(key.to_string()))),
        Err(DriverError::Env(dotenvy::Error::EnvVar(std::env::VarError::NotPresent))) => Ok(None),
        Err(error) => Err(error),
    }
}
