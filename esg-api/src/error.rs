//! Application error type and its HTTP mapping.

use rocket::http::Status;
use rocket::response::{self, Responder, status::Custom};
use rocket::serde::json::Json;
use rocket::Request;
use thiserror::Error;
use validator::ValidationErrors;

use crate::aggregation::AggregationError;
use crate::response::{ApiResponse, ErrorResponse};

#[derive(Debug, Error)]
pub enum EsgError {
    /// Payload failed field validation. Rendered as an `ApiResponse` with one
    /// message per violation.
    #[error("Invalid data")]
    Validation(Vec<String>),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("{0}")]
    Internal(String),
}

pub type EsgResult<T> = Result<T, EsgError>;

impl EsgError {
    pub fn status(&self) -> Status {
        match self {
            EsgError::Validation(_) | EsgError::BadRequest(_) => Status::BadRequest,
            EsgError::Unauthorized(_) => Status::Unauthorized,
            EsgError::Forbidden(_) => Status::Forbidden,
            EsgError::NotFound(_) => Status::NotFound,
            EsgError::Database(_) | EsgError::Token(_) | EsgError::Internal(_) => {
                Status::InternalServerError
            }
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        EsgError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        EsgError::NotFound(message.into())
    }
}

impl From<ValidationErrors> for EsgError {
    fn from(errors: ValidationErrors) -> Self {
        EsgError::Validation(validation_messages(&errors))
    }
}

impl From<AggregationError> for EsgError {
    fn from(err: AggregationError) -> Self {
        EsgError::BadRequest(err.to_string())
    }
}

/// Flattens validator output into sorted, human readable messages.
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect();
    messages.sort();
    messages
}

/// Merges derive-based validation with checks that need the whole payload.
pub fn collect_violations(
    derived: Result<(), ValidationErrors>,
    extra: Vec<String>,
) -> Result<(), EsgError> {
    let mut messages = match derived {
        Ok(()) => Vec::new(),
        Err(e) => validation_messages(&e),
    };
    messages.extend(extra);
    if messages.is_empty() {
        Ok(())
    } else {
        Err(EsgError::Validation(messages))
    }
}

impl<'r> Responder<'r, 'static> for EsgError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        if let EsgError::Validation(errors) = self {
            warn!("{} {} rejected: {:?}", req.method(), req.uri().path(), errors);
            return Custom(status, Json(ApiResponse::<()>::failure("Invalid data", errors)))
                .respond_to(req);
        }

        let body = if status == Status::InternalServerError {
            error!("{} {} failed: {}", req.method(), req.uri().path(), self);
            ErrorResponse::new(status, "Internal server error", Some(self.to_string()), req)
        } else {
            ErrorResponse::new(status, self.to_string(), None, req)
        };
        Custom(status, Json(body)).respond_to(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
        #[validate(range(min = 1, max = 4, message = "Quarter must be between 1 and 4"))]
        quarter: i32,
    }

    #[test]
    fn validation_messages_are_sorted() {
        let probe = Probe {
            name: String::new(),
            quarter: 9,
        };
        let err = collect_violations(probe.validate(), vec!["Company is required".into()])
            .unwrap_err();
        match err {
            EsgError::Validation(messages) => assert_eq!(
                messages,
                vec![
                    "Name is required".to_string(),
                    "Quarter must be between 1 and 4".to_string(),
                    "Company is required".to_string(),
                ]
            ),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn status_mapping() {
        assert_eq!(EsgError::bad_request("x").status(), Status::BadRequest);
        assert_eq!(EsgError::not_found("x").status(), Status::NotFound);
        assert_eq!(
            EsgError::Database(diesel::result::Error::NotFound).status(),
            Status::InternalServerError
        );
    }
}
