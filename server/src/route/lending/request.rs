use axum::http::header::IF_MATCH;
use axum::http::HeaderMap;
use error_stack::Report;
use serde::Deserialize;
use time::macros::format_description;
use time::Date;
use uuid::Uuid;

use application::transfer::{
    CreateLendingDto, GetLendingDto, PageDto, ReturnLendingDto, SearchLendingDto,
};
use kernel::KernelError;

use crate::controller::{Intake, TryIntake};

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    book_id: Uuid,
    reader_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct LendingPath {
    year: String,
    sequence: String,
}

impl LendingPath {
    fn lending_number(&self) -> String {
        format!("{}/{}", self.year, self.sequence)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ReturnRequest {
    #[serde(default)]
    commentary: Option<String>,
}

/// Search criteria; dates are `YYYY-MM-DD`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchRequest {
    reader_id: Option<Uuid>,
    book_id: Option<Uuid>,
    returned: Option<bool>,
    started_from: Option<String>,
    started_until: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageRequest {
    limit: Option<i64>,
    offset: Option<i64>,
}

pub struct Transformer;

impl Intake<CreateRequest> for Transformer {
    type To = CreateLendingDto;
    fn emit(&self, input: CreateRequest) -> Self::To {
        CreateLendingDto {
            book_id: input.book_id,
            reader_id: input.reader_id,
        }
    }
}

impl Intake<LendingPath> for Transformer {
    type To = GetLendingDto;
    fn emit(&self, input: LendingPath) -> Self::To {
        GetLendingDto {
            lending_number: input.lending_number(),
        }
    }
}

impl Intake<PageRequest> for Transformer {
    type To = PageDto;
    fn emit(&self, input: PageRequest) -> Self::To {
        PageDto {
            limit: input.limit,
            offset: input.offset,
        }
    }
}

impl TryIntake<(LendingPath, HeaderMap, ReturnRequest)> for Transformer {
    type To = ReturnLendingDto;
    type Error = Report<KernelError>;
    fn emit(
        &self,
        (path, headers, input): (LendingPath, HeaderMap, ReturnRequest),
    ) -> Result<Self::To, Self::Error> {
        let version = if_match_version(&headers)?;
        Ok(ReturnLendingDto {
            lending_number: path.lending_number(),
            version,
            commentary: input.commentary,
        })
    }
}

impl TryIntake<(SearchRequest, PageRequest)> for Transformer {
    type To = (SearchLendingDto, PageDto);
    type Error = Report<KernelError>;
    fn emit(
        &self,
        (input, page): (SearchRequest, PageRequest),
    ) -> Result<Self::To, Self::Error> {
        let search = SearchLendingDto {
            reader_id: input.reader_id,
            book_id: input.book_id,
            returned: input.returned,
            started_from: input.started_from.as_deref().map(parse_date).transpose()?,
            started_until: input.started_until.as_deref().map(parse_date).transpose()?,
        };
        Ok((search, Intake::emit(self, page)))
    }
}

/// Reads the version from `If-Match`, accepting `"3"`, `W/"3"` and bare `3`.
fn if_match_version(headers: &HeaderMap) -> error_stack::Result<i64, KernelError> {
    let value = headers.get(IF_MATCH).ok_or_else(|| {
        Report::new(KernelError::Validation).attach_printable("If-Match header is required")
    })?;
    let text = value.to_str().map_err(|_| {
        Report::new(KernelError::Validation).attach_printable("If-Match header is not visible ASCII")
    })?;
    let tag = text.trim();
    let tag = tag.strip_prefix("W/").unwrap_or(tag).trim_matches('"');
    tag.parse::<i64>().map_err(|_| {
        Report::new(KernelError::Validation)
            .attach_printable(format!("If-Match `{text}` is not a lending version"))
    })
}

fn parse_date(text: &str) -> error_stack::Result<Date, KernelError> {
    Date::parse(text, format_description!("[year]-[month]-[day]")).map_err(|_| {
        Report::new(KernelError::Validation)
            .attach_printable(format!("`{text}` is not a date of the form YYYY-MM-DD"))
    })
}

#[cfg(test)]
mod test {
    use axum::http::header::IF_MATCH;
    use axum::http::{HeaderMap, HeaderValue};
    use kernel::KernelError;
    use time::macros::date;

    use super::{if_match_version, parse_date};

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(IF_MATCH, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn if_match_accepts_entity_tags() {
        assert_eq!(if_match_version(&headers("\"3\"")).unwrap(), 3);
        assert_eq!(if_match_version(&headers("W/\"4\"")).unwrap(), 4);
        assert_eq!(if_match_version(&headers("5")).unwrap(), 5);
        let missing = if_match_version(&HeaderMap::new()).unwrap_err();
        assert!(matches!(missing.current_context(), KernelError::Validation));
        let garbage = if_match_version(&headers("\"abc\"")).unwrap_err();
        assert!(matches!(garbage.current_context(), KernelError::Validation));
    }

    #[test]
    fn dates_are_iso_calendar_dates() {
        assert_eq!(parse_date("2024-06-01").unwrap(), date!(2024 - 06 - 01));
        assert!(parse_date("01/06/2024").is_err());
    }
}
