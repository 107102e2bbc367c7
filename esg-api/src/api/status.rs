//! Service info and health endpoints, mounted at the root.

use chrono::{DateTime, Utc};
use rocket::Route;
use rocket::serde::json::Json;
use serde::Serialize;

use crate::built_info;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub health: &'static str,
    pub build_time: &'static str,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// Service info endpoint.
///
/// - **URL:** `/`
/// - **Method:** `GET`
/// - **Authentication:** None
#[get("/")]
pub fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: "ESG Sustainability API",
        version: built_info::PKG_VERSION,
        description: "Environmental, social and governance data and reporting API",
        health: "/health",
        build_time: built_info::BUILT_TIME_UTC,
        timestamp: Utc::now(),
    })
}

/// Health endpoint.
///
/// - **URL:** `/health`
/// - **Method:** `GET`
/// - **Authentication:** None
#[get("/health")]
pub fn health_status() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "Healthy",
        timestamp: Utc::now(),
    })
}

pub fn routes() -> Vec<Route> {
    routes![service_info, health_status]
}
