use axum::http::header::ETAG;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use application::transfer::{FineDto, LendingDto};

use crate::controller::Exhaust;

#[derive(Debug, Serialize)]
pub struct BookResponse {
    id: Uuid,
    title: String,
}

#[derive(Debug, Serialize)]
pub struct ReaderResponse {
    id: Uuid,
    name: String,
}

#[derive(Debug, Serialize)]
pub struct LendingResponse {
    lending_number: String,
    book: BookResponse,
    reader: ReaderResponse,
    start_date: String,
    limit_date: String,
    returned_date: Option<String>,
    returned_commentary: Option<String>,
    duration_days: i64,
    fine_per_day_cents: i64,
    version: i64,
    days_delayed: i64,
    days_until_return: Option<i64>,
    days_overdue: Option<i64>,
    fine_value_in_cents: Option<i64>,
}

impl From<LendingDto> for LendingResponse {
    fn from(value: LendingDto) -> Self {
        Self {
            lending_number: value.lending_number,
            book: BookResponse {
                id: value.book_id,
                title: value.book_title,
            },
            reader: ReaderResponse {
                id: value.reader_id,
                name: value.reader_name,
            },
            start_date: value.start_date.to_string(),
            limit_date: value.limit_date.to_string(),
            returned_date: value.returned_date.map(|date| date.to_string()),
            returned_commentary: value.returned_commentary,
            duration_days: value.duration_days,
            fine_per_day_cents: value.fine_per_day_cents,
            version: value.version,
            days_delayed: value.days_delayed,
            days_until_return: value.days_until_return,
            days_overdue: value.days_overdue,
            fine_value_in_cents: value.fine_value_in_cents,
        }
    }
}

fn entity_tag(version: i64) -> String {
    format!("\"{version}\"")
}

impl IntoResponse for LendingResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, [(ETAG, entity_tag(self.version))], Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse(LendingResponse);

impl IntoResponse for CreatedResponse {
    fn into_response(self) -> Response {
        let tag = entity_tag(self.0.version);
        (StatusCode::CREATED, [(ETAG, tag)], Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct LendingsResponse(Vec<LendingResponse>);

impl IntoResponse for LendingsResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct FineResponse {
    lending_number: String,
    days_delayed: i64,
    fine_per_day_cents: i64,
    cents: i64,
}

impl IntoResponse for FineResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct AverageDurationResponse {
    average_days: Option<f64>,
}

impl IntoResponse for AverageDurationResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

pub struct Presenter;

impl Exhaust<LendingDto> for Presenter {
    type To = LendingResponse;
    fn emit(&self, input: LendingDto) -> Self::To {
        LendingResponse::from(input)
    }
}

impl Exhaust<Vec<LendingDto>> for Presenter {
    type To = LendingsResponse;
    fn emit(&self, input: Vec<LendingDto>) -> Self::To {
        LendingsResponse(input.into_iter().map(LendingResponse::from).collect())
    }
}

impl Exhaust<FineDto> for Presenter {
    type To = FineResponse;
    fn emit(&self, input: FineDto) -> Self::To {
        FineResponse {
            lending_number: input.lending.lending_number,
            days_delayed: input.lending.days_delayed,
            fine_per_day_cents: input.fine_per_day_cents,
            cents: input.cents,
        }
    }
}

impl Exhaust<Option<f64>> for Presenter {
    type To = AverageDurationResponse;
    fn emit(&self, input: Option<f64>) -> Self::To {
        AverageDurationResponse {
            average_days: input,
        }
    }
}

/// Presents a freshly opened lending as `201 Created`.
pub struct CreatedPresenter;

impl Exhaust<LendingDto> for CreatedPresenter {
    type To = CreatedResponse;
    fn emit(&self, input: LendingDto) -> Self::To {
        CreatedResponse(LendingResponse::from(input))
    }
}

#[cfg(test)]
mod test {
    use axum::http::header::ETAG;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use serde_json::json;
    use time::macros::date;
    use uuid::Uuid;

    use application::transfer::LendingDto;

    use super::{CreatedPresenter, LendingResponse};
    use crate::controller::Exhaust;

    fn dto() -> LendingDto {
        LendingDto {
            lending_number: "2024/12".to_string(),
            book_id: Uuid::nil(),
            book_title: "Dhalgren".to_string(),
            reader_id: Uuid::nil(),
            reader_name: "Chip".to_string(),
            start_date: date!(2024 - 06 - 01),
            limit_date: date!(2024 - 06 - 16),
            returned_date: None,
            returned_commentary: None,
            duration_days: 15,
            fine_per_day_cents: 200,
            version: 2,
            days_delayed: 0,
            days_until_return: Some(15),
            days_overdue: None,
            fine_value_in_cents: None,
        }
    }

    #[test]
    fn lending_is_rendered_with_iso_dates() {
        let value = serde_json::to_value(LendingResponse::from(dto())).unwrap();
        assert_eq!(value["lending_number"], json!("2024/12"));
        assert_eq!(value["start_date"], json!("2024-06-01"));
        assert_eq!(value["limit_date"], json!("2024-06-16"));
        assert_eq!(value["book"]["title"], json!("Dhalgren"));
        assert_eq!(value["days_overdue"], json!(null));
    }

    #[test]
    fn created_lending_carries_its_version_tag() {
        let response = CreatedPresenter.emit(dto()).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[ETAG], "\"2\"");
    }
}
