//! Bearer-token authentication and role-based authorization guards.
//!
//! # Basic Authentication
//!
//! ```rust,ignore
//! use rocket::get;
//! use esg_api::auth_guards::AuthenticatedUser;
//!
//! #[get("/profile")]
//! fn get_profile(user: AuthenticatedUser) -> String {
//!     format!("Welcome, {}! Role: {}", user.user.username, user.role())
//! }
//! ```
//!
//! # Role-Based Authorization
//!
//! ```rust,ignore
//! use rocket::get;
//! use esg_api::auth_guards::{AdminUser, ManagerUser};
//!
//! #[get("/admin")]
//! fn admin_only(user: AdminUser) -> String {
//!     format!("Admin access granted to {}", user.user.username)
//! }
//!
//! #[post("/reports")]
//! fn managers_and_admins(user: ManagerUser) -> String {
//!     format!("{} may write", user.user.username)
//! }
//! ```

use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest, Request};

use crate::DbConn;
use crate::jwt::{Claims, JwtConfig, validate_token};
use crate::models::{Role, User};
use crate::orm::user::get_user_by_id;

/// A request guard for routes that require an authenticated user.
///
/// Checks, in order:
///
/// 1. An `Authorization: Bearer <token>` header is present
/// 2. The token's signature, issuer, audience and expiry are valid
/// 3. The subject names an existing, active user
///
/// Any failure yields `401 Unauthorized`.
#[derive(Debug)]
pub struct AuthenticatedUser {
    /// The authenticated user, freshly loaded from the database
    pub user: User,
    /// Claims of the presented token
    pub claims: Claims,
}

fn bearer_token<'a>(request: &'a Request<'_>) -> Option<&'a str> {
    let header = request.headers().get_one("Authorization")?;
    let (scheme, token) = header.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() {
        Some(token.trim())
    } else {
        None
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let Some(config) = request.rocket().state::<JwtConfig>() else {
            error!("[auth] JWT configuration is not managed");
            return Outcome::Error((Status::InternalServerError, ()));
        };

        let Some(token) = bearer_token(request) else {
            return Outcome::Error((Status::Unauthorized, ()));
        };

        let claims = match validate_token(config, token) {
            Ok(claims) => claims,
            Err(e) => {
                info!("[auth] rejected token: {}", e);
                return Outcome::Error((Status::Unauthorized, ()));
            }
        };

        let Some(user_id) = claims.user_id() else {
            return Outcome::Error((Status::Unauthorized, ()));
        };

        let db = match request.guard::<DbConn>().await {
            Outcome::Success(db) => db,
            _ => return Outcome::Error((Status::InternalServerError, ())),
        };

        match db.run(move |conn| get_user_by_id(conn, user_id)).await {
            Ok(Some(user)) if user.is_active => Outcome::Success(AuthenticatedUser { user, claims }),
            Ok(_) => Outcome::Error((Status::Unauthorized, ())),
            Err(e) => {
                error!("Database error finding user: {:?}", e);
                Outcome::Error((Status::Unauthorized, ()))
            }
        }
    }
}

impl AuthenticatedUser {
    pub fn role(&self) -> Role {
        self.user.role()
    }

    /// Helper method to check if the user has a specific role
    pub fn has_role(&self, role: Role) -> bool {
        self.role() == role
    }

    /// Helper method to check if the user has any of the specified roles
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role())
    }
}

/// Macro to create role-specific request guards
macro_rules! create_role_guard {
    ($name:ident, $roles:expr) => {
        #[derive(Debug)]
        pub struct $name {
            pub user: User,
            pub claims: Claims,
        }

        #[rocket::async_trait]
        impl<'r> FromRequest<'r> for $name {
            type Error = ();

            async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
                let auth_user = match AuthenticatedUser::from_request(request).await {
                    Outcome::Success(user) => user,
                    Outcome::Error(e) => return Outcome::Error(e),
                    Outcome::Forward(f) => return Outcome::Forward(f),
                };

                if auth_user.has_any_role($roles) {
                    Outcome::Success($name {
                        user: auth_user.user,
                        claims: auth_user.claims,
                    })
                } else {
                    Outcome::Error((Status::Forbidden, ()))
                }
            }
        }
    };
}

// Requires the Admin role. 401 when unauthenticated, 403 for other roles.
create_role_guard!(AdminUser, &[Role::Admin]);

// Requires Admin or Manager; used by every write except company management.
create_role_guard!(ManagerUser, &[Role::Admin, Role::Manager]);
