//! Carbon emission endpoints.

use chrono::Utc;
use rocket::Route;
use rocket::response::status;
use rocket::serde::json::Json;

use crate::auth_guards::{AuthenticatedUser, ManagerUser};
use crate::error::{EsgError, EsgResult};
use crate::logged_json::LoggedJson;
use crate::models::{CreateEmissionRequest, EmissionDetail, EmissionListItem};
use crate::orm::company::get_company_by_id;
use crate::orm::emission::{get_emission_with_company, insert_emission, list_emissions_with_company};
use crate::orm::{DbConn, RecordFilter};
use crate::query::{ListQuery, run_pipeline};
use crate::response::{ApiResponse, PagedResult};

/// List Emissions endpoint.
///
/// - **URL:** `/api/Emissions`
/// - **Method:** `GET`
/// - **Purpose:** Paged emission list with company names
/// - **Authentication:** Required
///
/// Filters: `companyId`, `startDate`, `endDate` (inclusive, on record
/// date), `searchTerm` (source, category, location, company name).
/// Sorting: `sortBy` one of `source`, `amount`, `date`, `company`; newest
/// first when omitted.
#[get("/Emissions?<query..>")]
pub async fn list_emissions(
    db: DbConn,
    query: ListQuery,
    _auth_user: AuthenticatedUser,
) -> EsgResult<Json<ApiResponse<PagedResult<EmissionListItem>>>> {
    let pagination = query.pagination()?;
    let filter = RecordFilter {
        company_id: query.company_id,
        range: query.date_range()?,
        ..Default::default()
    };

    let rows = db.run(move |conn| list_emissions_with_company(conn, &filter)).await?;
    let page = run_pipeline(rows, query.search().as_deref(), query.sort(), pagination).map(EmissionListItem::from);
    Ok(Json(ApiResponse::ok(page, "Carbon emissions retrieved successfully")))
}

/// Get Emission endpoint.
///
/// - **URL:** `/api/Emissions/<id>`
/// - **Method:** `GET`
/// - **Authentication:** Required
#[get("/Emissions/<id>")]
pub async fn get_emission(
    db: DbConn,
    id: i32,
    _auth_user: AuthenticatedUser,
) -> EsgResult<Json<ApiResponse<EmissionDetail>>> {
    let row = db
        .run(move |conn| get_emission_with_company(conn, id))
        .await?
        .ok_or_else(|| EsgError::not_found("Carbon emission not found"))?;
    Ok(Json(ApiResponse::ok(EmissionDetail::from(row), "Carbon emission found")))
}

/// Create Emission endpoint.
///
/// - **URL:** `/api/Emissions`
/// - **Method:** `POST`
/// - **Purpose:** Records an emission for an existing company
/// - **Authentication:** Manager or Admin
///
/// # Request Format
///
/// ```json
/// {
///   "source": "Energia Elétrica",
///   "emissionAmount": 15.5,
///   "recordDate": "2024-01-15",
///   "category": "Escopo 2",
///   "companyId": 1
/// }
/// ```
///
/// Responds 400 "Company not found" when `companyId` is unknown.
#[post("/Emissions", data = "<request>")]
pub async fn create_emission(
    db: DbConn,
    request: LoggedJson<CreateEmissionRequest>,
    _manager: ManagerUser,
) -> EsgResult<status::Created<Json<ApiResponse<EmissionDetail>>>> {
    let new_emission = request.into_inner().validated(Utc::now().naive_utc())?;

    let detail = db
        .run(move |conn| -> EsgResult<EmissionDetail> {
            let company = get_company_by_id(conn, new_emission.company_id)?
                .ok_or_else(|| EsgError::bad_request("Company not found"))?;
            let stored = insert_emission(conn, &new_emission)?;
            Ok(EmissionDetail::from((stored, company.name)))
        })
        .await?;

    info!("[emission] recorded {} {} for company {}", detail.emission_amount, detail.unit, detail.company_id);
    let location = format!("/api/Emissions/{}", detail.id);
    Ok(status::Created::new(location).body(Json(ApiResponse::ok(detail, "Carbon emission created successfully"))))
}

pub fn routes() -> Vec<Route> {
    routes![list_emissions, get_emission, create_emission]
}
