//! Password hashing and the username/password login flow.
//!
//! The login flow is written against [`DbRunner`] so it can be driven by the
//! pooled [`DbConn`] in production and by [`FakeDbConn`] in unit tests.

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::Utc;
use rand_core::OsRng;

use crate::DbConn;
use crate::error::EsgError;
use crate::jwt::{JwtConfig, issue_token};
use crate::models::{AuthResponse, LoginRequest, User, UserInfo};
use crate::orm::company::get_company_by_id;
use crate::orm::testing::FakeDbConn;
use crate::orm::user::{get_user_by_username, record_login};

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Trait for abstracting database operations to support both production and testing.
pub trait DbRunner {
    fn run<F, R>(&self, f: F) -> impl std::future::Future<Output = R>
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
        R: Send + 'static;
}

impl DbRunner for DbConn {
    fn run<F, R>(&self, f: F) -> impl std::future::Future<Output = R>
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
        R: Send + 'static,
    {
        DbConn::run(self, f)
    }
}

impl DbRunner for FakeDbConn<'_> {
    fn run<F, R>(&self, f: F) -> impl std::future::Future<Output = R>
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
        R: Send + 'static,
    {
        FakeDbConn::run(self, f)
    }
}

/// Hashes a password using Argon2 with a random salt.
pub fn hash_password(password: &str) -> Result<String, EsgError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| EsgError::Internal(format!("password hashing failed: {}", e)))
}

/// Verifies a password against a stored hash. Malformed hashes never match.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!("[login] stored password hash is malformed: {}", e);
            false
        }
    }
}

/// Authenticates `login`, stamps `last_login_at` and issues a token.
///
/// Unknown users, inactive users and wrong passwords all yield the same
/// 401 so callers cannot probe for usernames.
pub async fn process_login<D: DbRunner>(
    db: &D,
    config: &JwtConfig,
    login: &LoginRequest,
) -> Result<AuthResponse, EsgError> {
    if login.username.trim().is_empty() || login.password.is_empty() {
        return Err(EsgError::Validation(vec![
            "Username and password are required".to_string(),
        ]));
    }

    let username = login.username.trim().to_string();
    let user: Option<User> = db.run(move |conn| get_user_by_username(conn, &username)).await?;
    let user = match user {
        Some(user) if user.is_active && verify_password(&login.password, &user.password_hash) => user,
        _ => {
            info!("[login] failed login for '{}'", login.username.trim());
            return Err(EsgError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }
    };

    let now = Utc::now().naive_utc();
    let user_id = user.id;
    let company_id = user.company_id;
    let company_name = db
        .run(move |conn| -> Result<Option<String>, EsgError> {
            record_login(conn, user_id, now)?;
            Ok(match company_id {
                Some(id) => get_company_by_id(conn, id)?.map(|c| c.name),
                None => None,
            })
        })
        .await?;

    let (token, expires_at) = issue_token(config, &user)?;
    let mut info = UserInfo::new(&user, company_name);
    info.last_login_at = Some(now);

    info!("[login] user '{}' logged in", user.username);
    Ok(AuthResponse {
        token,
        expires_at,
        user: info,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::validate_token;
    use crate::models::Role;
    use crate::orm::testing::{sample_user, setup_test_db, setup_test_dbconn};
    use crate::orm::user::insert_user;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
        assert!(!verify_password("correct horse", "not-a-phc-string"));
    }

    #[rocket::async_test]
    async fn login_issues_token_and_records_time() {
        let mut conn = setup_test_db();
        let mut new_user = sample_user("ana", "ana@example.com", Role::Manager, None);
        new_user.password_hash = hash_password("secret123").unwrap();
        let user = insert_user(&mut conn, &new_user).unwrap();
        let db = setup_test_dbconn(&mut conn);
        let config = JwtConfig::default();

        let login = LoginRequest {
            username: "ana".into(),
            password: "secret123".into(),
        };
        let response = process_login(&db, &config, &login).await.unwrap();

        assert_eq!(response.user.id, user.id);
        assert_eq!(response.user.role, "Manager");
        assert!(response.user.last_login_at.is_some());
        let claims = validate_token(&config, &response.token).unwrap();
        assert_eq!(claims.user_id(), Some(user.id));

        let stored = db
            .run(move |c| crate::orm::user::get_user_by_id(c, user.id))
            .await
            .unwrap()
            .unwrap();
        assert!(stored.last_login_at.is_some());
    }

    #[rocket::async_test]
    async fn login_rejects_bad_password_and_inactive_users() {
        let mut conn = setup_test_db();
        let mut active = sample_user("bob", "bob@example.com", Role::User, None);
        active.password_hash = hash_password("secret123").unwrap();
        insert_user(&mut conn, &active).unwrap();
        let mut inactive = sample_user("eve", "eve@example.com", Role::User, None);
        inactive.password_hash = hash_password("secret123").unwrap();
        inactive.is_active = false;
        insert_user(&mut conn, &inactive).unwrap();
        let db = setup_test_dbconn(&mut conn);
        let config = JwtConfig::default();

        let wrong = LoginRequest {
            username: "bob".into(),
            password: "nope".into(),
        };
        assert!(matches!(
            process_login(&db, &config, &wrong).await,
            Err(EsgError::Unauthorized(_))
        ));

        let disabled = LoginRequest {
            username: "eve".into(),
            password: "secret123".into(),
        };
        assert!(matches!(
            process_login(&db, &config, &disabled).await,
            Err(EsgError::Unauthorized(_))
        ));

        let blank = LoginRequest {
            username: " ".into(),
            password: String::new(),
        };
        assert!(matches!(
            process_login(&db, &config, &blank).await,
            Err(EsgError::Validation(_))
        ));
    }
}
