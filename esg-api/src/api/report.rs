//! Sustainability report endpoints, including automatic quarterly
//! generation.

use chrono::Utc;
use rocket::form::FromForm;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::Route;

use crate::aggregation::{QuarterWindow, draft_automatic_report};
use crate::auth_guards::{AuthenticatedUser, ManagerUser};
use crate::error::{EsgError, EsgResult};
use crate::logged_json::LoggedJson;
use crate::models::{CreateReportRequest, ReportDetail, ReportListItem};
use crate::orm::company::get_company_by_id;
use crate::orm::emission::load_emissions;
use crate::orm::energy::load_energy;
use crate::orm::report::{
    ReportFilter, get_report_with_company, insert_report, list_reports_with_company,
    report_exists_for_period,
};
use crate::orm::{DbConn, RecordFilter};
use crate::query::{ListQuery, run_pipeline};
use crate::response::{ApiResponse, PagedResult};

pub const DUPLICATE_PERIOD: &str = "A sustainability report already exists for this period";

/// Query parameters of the generate endpoint.
#[derive(FromForm, Debug, Default)]
pub struct GenerateQuery {
    #[field(name = "companyId")]
    pub company_id: Option<i32>,
    pub year: Option<i32>,
    pub quarter: Option<i32>,
}

/// List Reports endpoint.
///
/// - **URL:** `/api/SustainabilityReports`
/// - **Method:** `GET`
/// - **Purpose:** Paged report list with company names
/// - **Authentication:** Required
///
/// Besides the common list parameters this accepts `year` and `quarter`.
/// Without `sortBy`, reports come newest period first.
#[get("/SustainabilityReports?<year>&<quarter>&<query..>")]
pub async fn list_reports(
    db: DbConn,
    year: Option<i32>,
    quarter: Option<i32>,
    query: ListQuery,
    _auth_user: AuthenticatedUser,
) -> EsgResult<Json<ApiResponse<PagedResult<ReportListItem>>>> {
    let pagination = query.pagination()?;
    let filter = ReportFilter {
        company_id: query.company_id,
        year,
        quarter,
    };

    let rows = db.run(move |conn| list_reports_with_company(conn, &filter)).await?;
    let page = run_pipeline(rows, query.search().as_deref(), query.sort(), pagination).map(ReportListItem::from);
    Ok(Json(ApiResponse::ok(page, "Sustainability reports retrieved successfully")))
}

/// Get Report endpoint.
///
/// - **URL:** `/api/SustainabilityReports/<id>`
/// - **Method:** `GET`
/// - **Authentication:** Required
#[get("/SustainabilityReports/<id>")]
pub async fn get_report(
    db: DbConn,
    id: i32,
    _auth_user: AuthenticatedUser,
) -> EsgResult<Json<ApiResponse<ReportDetail>>> {
    let row = db
        .run(move |conn| get_report_with_company(conn, id))
        .await?
        .ok_or_else(|| EsgError::not_found("Sustainability report not found"))?;
    Ok(Json(ApiResponse::ok(ReportDetail::from(row), "Sustainability report found")))
}

/// Create Report endpoint.
///
/// - **URL:** `/api/SustainabilityReports`
/// - **Method:** `POST`
/// - **Purpose:** Stores a manually written report
/// - **Authentication:** Manager or Admin
///
/// At most one manual report per company, year and quarter: a second one
/// is rejected with 400.
#[post("/SustainabilityReports", data = "<request>")]
pub async fn create_report(
    db: DbConn,
    request: LoggedJson<CreateReportRequest>,
    _manager: ManagerUser,
) -> EsgResult<status::Created<Json<ApiResponse<ReportDetail>>>> {
    let new_report = request.into_inner().validated(Utc::now().naive_utc())?;

    let detail = db
        .run(move |conn| -> EsgResult<ReportDetail> {
            let company = get_company_by_id(conn, new_report.company_id)?
                .ok_or_else(|| EsgError::bad_request("Company not found"))?;
            if report_exists_for_period(conn, company.id, new_report.year, new_report.quarter)? {
                return Err(EsgError::bad_request(DUPLICATE_PERIOD));
            }
            let stored = insert_report(conn, &new_report)?;
            Ok(ReportDetail::from((stored, company.name)))
        })
        .await?;

    info!(
        "[report] created report {} for company {} ({}Q{})",
        detail.report.id, detail.report.company_id, detail.report.year, detail.report.quarter
    );
    let location = format!("/api/SustainabilityReports/{}", detail.report.id);
    Ok(status::Created::new(location).body(Json(ApiResponse::ok(
        detail,
        "Sustainability report created successfully",
    ))))
}

/// Generate Report endpoint.
///
/// - **URL:** `/api/SustainabilityReports/generate?companyId=1&year=2024&quarter=1`
/// - **Method:** `POST`
/// - **Purpose:** Builds a report from the company's emission and energy
///   records inside the quarter and stores it
/// - **Authentication:** Manager or Admin
///
/// The ESG score is derived from the quarter's totals and average renewable
/// share. Unlike manual creation this never checks for an existing report
/// in the same period.
#[post("/SustainabilityReports/generate?<params..>")]
pub async fn generate_report(
    db: DbConn,
    params: GenerateQuery,
    _manager: ManagerUser,
) -> EsgResult<status::Created<Json<ApiResponse<ReportDetail>>>> {
    let mut missing = Vec::new();
    if params.company_id.is_none() {
        missing.push("Company is required".to_string());
    }
    if params.year.is_none() {
        missing.push("Year is required".to_string());
    }
    if params.quarter.is_none() {
        missing.push("Quarter is required".to_string());
    }
    let (Some(company_id), Some(year), Some(quarter)) = (params.company_id, params.year, params.quarter) else {
        return Err(EsgError::Validation(missing));
    };
    let window = QuarterWindow::new(year, quarter)?;

    let detail = db
        .run(move |conn| -> EsgResult<ReportDetail> {
            let company = get_company_by_id(conn, company_id)?
                .ok_or_else(|| EsgError::bad_request("Company not found"))?;
            let filter = RecordFilter {
                company_id: Some(company.id),
                range: window.date_range(),
                ..Default::default()
            };
            let emissions = load_emissions(conn, &filter)?;
            let energy = load_energy(conn, &filter)?;

            let draft = draft_automatic_report(&company, &window, &emissions, &energy, Utc::now().naive_utc());
            let stored = insert_report(conn, &draft)?;
            Ok(ReportDetail::from((stored, company.name)))
        })
        .await?;

    info!(
        "[report] generated report {} for company {} ({}Q{}), score {}",
        detail.report.id, company_id, year, quarter, detail.report.esg_score
    );
    let location = format!("/api/SustainabilityReports/{}", detail.report.id);
    Ok(status::Created::new(location).body(Json(ApiResponse::ok(
        detail,
        "Sustainability report generated automatically",
    ))))
}

pub fn routes() -> Vec<Route> {
    routes![list_reports, get_report, create_report, generate_report]
}
