//! Energy consumption endpoints.

use chrono::Utc;
use rocket::Route;
use rocket::response::status;
use rocket::serde::json::Json;

use crate::aggregation::statistics::{EnergyStatistics, energy_statistics};
use crate::auth_guards::{AuthenticatedUser, ManagerUser};
use crate::error::{EsgError, EsgResult};
use crate::logged_json::LoggedJson;
use crate::models::{CreateEnergyRequest, EnergyDetail, EnergyListItem};
use crate::orm::company::get_company_by_id;
use crate::orm::energy::{get_energy_with_company, insert_energy, list_energy_with_company, load_energy};
use crate::orm::{DbConn, RecordFilter};
use crate::query::{FilterQuery, ListQuery, run_pipeline};
use crate::response::{ApiResponse, PagedResult};

/// List Energy Consumption endpoint.
///
/// - **URL:** `/api/EnergyConsumption`
/// - **Method:** `GET`
/// - **Purpose:** Paged energy consumption list with company names
/// - **Authentication:** Required
///
/// Sorting: `sortBy` one of `energytype`, `amount`, `date`, `cost`,
/// `renewable`, `company`; newest first when omitted.
#[get("/EnergyConsumption?<query..>")]
pub async fn list_energy(
    db: DbConn,
    query: ListQuery,
    _auth_user: AuthenticatedUser,
) -> EsgResult<Json<ApiResponse<PagedResult<EnergyListItem>>>> {
    let pagination = query.pagination()?;
    let filter = RecordFilter {
        company_id: query.company_id,
        range: query.date_range()?,
        ..Default::default()
    };

    let rows = db.run(move |conn| list_energy_with_company(conn, &filter)).await?;
    let page = run_pipeline(rows, query.search().as_deref(), query.sort(), pagination).map(EnergyListItem::from);
    Ok(Json(ApiResponse::ok(page, "Energy consumption records retrieved successfully")))
}

/// Energy Statistics endpoint.
///
/// - **URL:** `/api/EnergyConsumption/statistics`
/// - **Method:** `GET`
/// - **Purpose:** Totals, cost, renewable share, per-type and monthly sums
/// - **Authentication:** Required
#[get("/EnergyConsumption/statistics?<filter..>")]
pub async fn get_energy_statistics(
    db: DbConn,
    filter: FilterQuery,
    _auth_user: AuthenticatedUser,
) -> EsgResult<Json<ApiResponse<EnergyStatistics>>> {
    let records = RecordFilter {
        company_id: filter.company_id,
        range: filter.date_range()?,
        ..Default::default()
    };
    let energy = db.run(move |conn| load_energy(conn, &records)).await?;
    let stats = energy_statistics(&energy);
    Ok(Json(ApiResponse::ok(stats, "Energy consumption statistics calculated successfully")))
}

/// Get Energy Consumption endpoint.
///
/// - **URL:** `/api/EnergyConsumption/<id>`
/// - **Method:** `GET`
/// - **Authentication:** Required
#[get("/EnergyConsumption/<id>")]
pub async fn get_energy(
    db: DbConn,
    id: i32,
    _auth_user: AuthenticatedUser,
) -> EsgResult<Json<ApiResponse<EnergyDetail>>> {
    let row = db
        .run(move |conn| get_energy_with_company(conn, id))
        .await?
        .ok_or_else(|| EsgError::not_found("Energy consumption record not found"))?;
    Ok(Json(ApiResponse::ok(EnergyDetail::from(row), "Energy consumption record found")))
}

/// Create Energy Consumption endpoint.
///
/// - **URL:** `/api/EnergyConsumption`
/// - **Method:** `POST`
/// - **Purpose:** Records energy use for an existing company
/// - **Authentication:** Manager or Admin
///
/// # Request Format
///
/// ```json
/// {
///   "energyType": "Elétrica",
///   "consumptionAmount": 2500,
///   "recordDate": "2024-01-15",
///   "cost": 1250,
///   "renewablePercentage": 35,
///   "companyId": 1
/// }
/// ```
#[post("/EnergyConsumption", data = "<request>")]
pub async fn create_energy(
    db: DbConn,
    request: LoggedJson<CreateEnergyRequest>,
    _manager: ManagerUser,
) -> EsgResult<status::Created<Json<ApiResponse<EnergyDetail>>>> {
    let new_record = request.into_inner().validated(Utc::now().naive_utc())?;

    let detail = db
        .run(move |conn| -> EsgResult<EnergyDetail> {
            let company = get_company_by_id(conn, new_record.company_id)?
                .ok_or_else(|| EsgError::bad_request("Company not found"))?;
            let stored = insert_energy(conn, &new_record)?;
            Ok(EnergyDetail::from((stored, company.name)))
        })
        .await?;

    info!(
        "[energy] recorded {} {} for company {}",
        detail.consumption_amount, detail.unit, detail.company_id
    );
    let location = format!("/api/EnergyConsumption/{}", detail.id);
    Ok(status::Created::new(location).body(Json(ApiResponse::ok(
        detail,
        "Energy consumption record created successfully",
    ))))
}

pub fn routes() -> Vec<Route> {
    routes![list_energy, get_energy_statistics, get_energy, create_energy]
}
