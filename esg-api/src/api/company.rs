//! API endpoints for managing companies.
//!
//! Reads are open to any authenticated user; creating, updating and deleting
//! companies is reserved for administrators.

use chrono::Utc;
use rocket::Route;
use rocket::response::status;
use rocket::serde::json::Json;

use crate::auth_guards::{AdminUser, AuthenticatedUser};
use crate::error::{EsgError, EsgResult};
use crate::logged_json::LoggedJson;
use crate::models::{Company, CompanyInput};
use crate::orm::DbConn;
use crate::orm::company::{
    delete_company, get_all_companies, get_company_by_cnpj, get_company_by_id, insert_company,
    update_company,
};
use crate::query::{ListQuery, run_pipeline};
use crate::response::{ApiResponse, PagedResult};

const CNPJ_TAKEN: &str = "A company with this CNPJ already exists";

/// List Companies endpoint.
///
/// - **URL:** `/api/Companies`
/// - **Method:** `GET`
/// - **Purpose:** Paged company list
/// - **Authentication:** Required
///
/// Accepts `page`, `pageSize`, `searchTerm` (name, CNPJ, industry, city),
/// `sortBy` (`name`, `industry`, `employees`) and `sortDirection`.
#[get("/Companies?<query..>")]
pub async fn list_companies(
    db: DbConn,
    query: ListQuery,
    _auth_user: AuthenticatedUser,
) -> EsgResult<Json<ApiResponse<PagedResult<Company>>>> {
    let pagination = query.pagination()?;
    let rows = db.run(get_all_companies).await?;
    let page = run_pipeline(rows, query.search().as_deref(), query.sort(), pagination);
    Ok(Json(ApiResponse::ok(page, "Companies retrieved successfully")))
}

/// Get Company endpoint.
///
/// - **URL:** `/api/Companies/<id>`
/// - **Method:** `GET`
/// - **Authentication:** Required
#[get("/Companies/<id>")]
pub async fn get_company(
    db: DbConn,
    id: i32,
    _auth_user: AuthenticatedUser,
) -> EsgResult<Json<ApiResponse<Company>>> {
    let company = db
        .run(move |conn| get_company_by_id(conn, id))
        .await?
        .ok_or_else(|| EsgError::not_found("Company not found"))?;
    Ok(Json(ApiResponse::ok(company, "Company found")))
}

/// Create Company endpoint.
///
/// - **URL:** `/api/Companies`
/// - **Method:** `POST`
/// - **Purpose:** Registers a company
/// - **Authentication:** Admin
///
/// # Request Format
///
/// ```json
/// {
///   "name": "EcoTech Solutions Ltda",
///   "cnpj": "12.345.678/0001-90",
///   "industry": "Tecnologia",
///   "employeeCount": 150
/// }
/// ```
///
/// The CNPJ must not belong to another company.
#[post("/Companies", data = "<input>")]
pub async fn create_company(
    db: DbConn,
    input: LoggedJson<CompanyInput>,
    _admin: AdminUser,
) -> EsgResult<status::Created<Json<ApiResponse<Company>>>> {
    let new_company = input.into_inner().validated(Utc::now().naive_utc())?;

    let company = db
        .run(move |conn| -> EsgResult<Company> {
            if get_company_by_cnpj(conn, &new_company.cnpj)?.is_some() {
                return Err(EsgError::bad_request(CNPJ_TAKEN));
            }
            Ok(insert_company(conn, &new_company)?)
        })
        .await?;

    info!("[company] created '{}' ({})", company.name, company.id);
    let location = format!("/api/Companies/{}", company.id);
    Ok(status::Created::new(location).body(Json(ApiResponse::ok(company, "Company created successfully"))))
}

/// Update Company endpoint.
///
/// - **URL:** `/api/Companies/<id>`
/// - **Method:** `PUT`
/// - **Purpose:** Replaces every editable field of a company
/// - **Authentication:** Admin
#[put("/Companies/<id>", data = "<input>")]
pub async fn update_company_route(
    db: DbConn,
    id: i32,
    input: LoggedJson<CompanyInput>,
    _admin: AdminUser,
) -> EsgResult<Json<ApiResponse<Company>>> {
    let now = Utc::now().naive_utc();
    let changes = input.into_inner().validated(now)?;

    let company = db
        .run(move |conn| -> EsgResult<Company> {
            if get_company_by_id(conn, id)?.is_none() {
                return Err(EsgError::not_found("Company not found"));
            }
            if let Some(other) = get_company_by_cnpj(conn, &changes.cnpj)? {
                if other.id != id {
                    return Err(EsgError::bad_request(CNPJ_TAKEN));
                }
            }
            update_company(conn, id, &changes, now)?.ok_or_else(|| EsgError::not_found("Company not found"))
        })
        .await?;

    info!("[company] updated '{}' ({})", company.name, company.id);
    Ok(Json(ApiResponse::ok(company, "Company updated successfully")))
}

/// Delete Company endpoint.
///
/// - **URL:** `/api/Companies/<id>`
/// - **Method:** `DELETE`
/// - **Purpose:** Deletes a company with its emissions, energy records and
///   reports; users of the company are detached
/// - **Authentication:** Admin
#[delete("/Companies/<id>")]
pub async fn delete_company_route(
    db: DbConn,
    id: i32,
    _admin: AdminUser,
) -> EsgResult<Json<ApiResponse<bool>>> {
    let deleted = db.run(move |conn| delete_company(conn, id)).await?;
    if !deleted {
        return Err(EsgError::not_found("Company not found"));
    }
    info!("[company] deleted company {}", id);
    Ok(Json(ApiResponse::ok(true, "Company deleted successfully")))
}

pub fn routes() -> Vec<Route> {
    routes![
        list_companies,
        get_company,
        create_company,
        update_company_route,
        delete_company_route
    ]
}
