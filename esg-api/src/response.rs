//! JSON envelopes returned by every endpoint.
//!
//! Successful calls and validation failures use [`ApiResponse`]. Everything
//! else that goes wrong (missing records, bad arguments, auth failures and
//! internal errors) is reported through [`ErrorResponse`], which carries the
//! request's trace id so log lines can be matched to client reports.

use chrono::{DateTime, Utc};
use rocket::Request;
use rocket::http::Status;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
    pub errors: Vec<String>,
    #[ts(type = "string")]
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        ApiResponse {
            success: true,
            message: message.into(),
            data: Some(data),
            errors: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn failure(message: impl Into<String>, errors: Vec<String>) -> Self {
        ApiResponse {
            success: false,
            message: message.into(),
            data: None,
            errors,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ErrorResponse {
    pub message: String,
    pub details: Option<String>,
    pub status_code: u16,
    #[ts(type = "string")]
    pub timestamp: DateTime<Utc>,
    pub trace_id: Option<String>,
}

impl ErrorResponse {
    pub fn new(status: Status, message: impl Into<String>, details: Option<String>, req: &Request<'_>) -> Self {
        ErrorResponse {
            message: message.into(),
            details,
            status_code: status.code,
            timestamp: Utc::now(),
            trace_id: Some(trace_id(req)),
        }
    }
}

/// One page of a filtered, sorted collection.
#[derive(Debug, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PagedResult<T> {
    pub data: Vec<T>,
    pub current_page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub total_records: i64,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

impl<T> PagedResult<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PagedResult<U> {
        PagedResult {
            data: self.data.into_iter().map(f).collect(),
            current_page: self.current_page,
            page_size: self.page_size,
            total_pages: self.total_pages,
            total_records: self.total_records,
            has_previous_page: self.has_previous_page,
            has_next_page: self.has_next_page,
        }
    }
}

struct TraceId(String);

/// Per-request correlation id, generated on first use and cached on the request.
pub fn trace_id(req: &Request<'_>) -> String {
    req.local_cache(|| TraceId(Uuid::new_v4().to_string())).0.clone()
}
