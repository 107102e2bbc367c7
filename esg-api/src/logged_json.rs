//! JSON body guard that logs the parsed request before handing it over.
//!
//! Drop-in replacement for `Json<T>` on the write endpoints. Fields named
//! like passwords are masked before logging.

use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::{
    Data, Request,
    data::{self, FromData},
};

const MASKED_FIELDS: [&str; 4] = ["password", "currentPassword", "newPassword", "confirmPassword"];

/// A wrapper around Rocket's Json that logs the request data.
pub struct LoggedJson<T>(pub T);

impl<T> LoggedJson<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for LoggedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Serializes `value` with password-like fields replaced by `***`.
fn masked_body<T: Serialize>(value: &T) -> Option<String> {
    let mut json = serde_json::to_value(value).ok()?;
    if let Some(object) = json.as_object_mut() {
        for field in MASKED_FIELDS {
            if let Some(v) = object.get_mut(field) {
                *v = serde_json::Value::String("***".into());
            }
        }
    }
    serde_json::to_string(&json).ok()
}

#[rocket::async_trait]
impl<'r, T: Deserialize<'r> + Serialize> FromData<'r> for LoggedJson<T> {
    type Error = rocket::serde::json::Error<'r>;

    async fn from_data(req: &'r Request<'_>, data: Data<'r>) -> data::Outcome<'r, Self> {
        match Json::<T>::from_data(req, data).await {
            data::Outcome::Success(json_data) => {
                let body = masked_body(&json_data.0).unwrap_or_else(|| "<failed to serialize>".to_string());
                info!(
                    "API Request Body: {} {} | Data: {}",
                    req.method().as_str(),
                    req.uri().path(),
                    body
                );
                data::Outcome::Success(LoggedJson(json_data.into_inner()))
            }
            data::Outcome::Error(e) => {
                warn!("[request] malformed JSON body on {}: {:?}", req.uri().path(), e.1);
                data::Outcome::Error(e)
            }
            data::Outcome::Forward(f) => data::Outcome::Forward(f),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for LoggedJson<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
