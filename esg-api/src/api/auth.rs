//! Authentication endpoints: login, registration, profile and password
//! change.

use chrono::Utc;
use rocket::Route;
use rocket::State;
use rocket::response::status;
use rocket::serde::json::Json;
use validator::Validate;

use crate::auth_guards::AuthenticatedUser;
use crate::error::{EsgError, EsgResult, collect_violations};
use crate::jwt::JwtConfig;
use crate::logged_json::LoggedJson;
use crate::models::{
    AuthResponse, ChangePasswordRequest, LoginRequest, NewUser, RegisterRequest, Role, UserInfo,
};
use crate::orm::DbConn;
use crate::orm::company::get_company_by_id;
use crate::orm::login::{hash_password, process_login, verify_password};
use crate::orm::user::{email_taken, insert_user, update_password_hash, username_taken};
use crate::response::ApiResponse;

/// Login endpoint.
///
/// - **URL:** `/api/Auth/login`
/// - **Method:** `POST`
/// - **Purpose:** Exchanges a username and password for a bearer token
/// - **Authentication:** None
///
/// # Request Format
///
/// ```json
/// { "username": "admin", "password": "admin123" }
/// ```
///
/// # Response
///
/// **Success (HTTP 200 OK):** `ApiResponse<AuthResponse>` carrying the token,
/// its expiry and the user's public profile.
///
/// **Failure (HTTP 401 Unauthorized):** unknown user, inactive user or wrong
/// password, all reported as "Invalid credentials".
#[post("/Auth/login", data = "<login>")]
pub async fn login(
    db: DbConn,
    config: &State<JwtConfig>,
    login: LoggedJson<LoginRequest>,
) -> EsgResult<Json<ApiResponse<AuthResponse>>> {
    let auth = process_login(&db, config.inner(), &login).await?;
    Ok(Json(ApiResponse::ok(auth, "Login successful")))
}

/// Register endpoint.
///
/// - **URL:** `/api/Auth/register`
/// - **Method:** `POST`
/// - **Purpose:** Creates a `User`-role account
/// - **Authentication:** None
///
/// Username and email must both be unused; a given `companyId` must exist.
/// New accounts always start with the `User` role.
#[post("/Auth/register", data = "<request>")]
pub async fn register(
    db: DbConn,
    request: LoggedJson<RegisterRequest>,
) -> EsgResult<status::Created<Json<ApiResponse<UserInfo>>>> {
    let request = request.into_inner();
    collect_violations(request.validate(), Vec::new())?;

    let info = db
        .run(move |conn| -> EsgResult<UserInfo> {
            if username_taken(conn, &request.username)? || email_taken(conn, &request.email)? {
                return Err(EsgError::bad_request("Username or email already exists"));
            }
            let company_name = match request.company_id {
                Some(id) => match get_company_by_id(conn, id)? {
                    Some(company) => Some(company.name),
                    None => return Err(EsgError::bad_request("Company not found")),
                },
                None => None,
            };

            let now = Utc::now().naive_utc();
            let user = insert_user(
                conn,
                &NewUser {
                    username: request.username,
                    email: request.email,
                    password_hash: hash_password(&request.password)?,
                    first_name: request.first_name,
                    last_name: request.last_name,
                    role: Role::User.as_str().to_string(),
                    company_id: request.company_id,
                    is_active: true,
                    created_at: now,
                    updated_at: now,
                },
            )?;
            Ok(UserInfo::new(&user, company_name))
        })
        .await?;

    info!("[auth] registered user '{}'", info.username);
    Ok(status::Created::new("/api/Auth/profile").body(Json(ApiResponse::ok(info, "User registered successfully"))))
}

/// Profile endpoint.
///
/// - **URL:** `/api/Auth/profile`
/// - **Method:** `GET`
/// - **Purpose:** Returns the authenticated user's public profile
/// - **Authentication:** Required
#[get("/Auth/profile")]
pub async fn profile(db: DbConn, auth_user: AuthenticatedUser) -> EsgResult<Json<ApiResponse<UserInfo>>> {
    let company_name = match auth_user.user.company_id {
        Some(id) => db.run(move |conn| get_company_by_id(conn, id)).await?.map(|c| c.name),
        None => None,
    };
    let info = UserInfo::new(&auth_user.user, company_name);
    Ok(Json(ApiResponse::ok(info, "Profile retrieved successfully")))
}

/// Change Password endpoint.
///
/// - **URL:** `/api/Auth/change-password`
/// - **Method:** `POST`
/// - **Purpose:** Replaces the authenticated user's password
/// - **Authentication:** Required
///
/// The current password must verify, the new one must be 6 to 100
/// characters, and `confirmPassword` must repeat it exactly.
#[post("/Auth/change-password", data = "<request>")]
pub async fn change_password(
    db: DbConn,
    auth_user: AuthenticatedUser,
    request: LoggedJson<ChangePasswordRequest>,
) -> EsgResult<Json<ApiResponse<bool>>> {
    let request = request.into_inner();
    let mut extra = Vec::new();
    if request.new_password != request.confirm_password {
        extra.push("Password confirmation does not match".to_string());
    }
    collect_violations(request.validate(), extra)?;

    if !verify_password(&request.current_password, &auth_user.user.password_hash) {
        return Err(EsgError::bad_request("Current password is incorrect"));
    }

    let user_id = auth_user.user.id;
    let new_hash = hash_password(&request.new_password)?;
    let now = Utc::now().naive_utc();
    db.run(move |conn| update_password_hash(conn, user_id, &new_hash, now))
        .await?;

    info!("[auth] user '{}' changed password", auth_user.user.username);
    Ok(Json(ApiResponse::ok(true, "Password changed successfully")))
}

pub fn routes() -> Vec<Route> {
    routes![login, register, profile, change_password]
}
