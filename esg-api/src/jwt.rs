//! JWT issuance and validation.
//!
//! Tokens are HS256 signed and carry the user's id, username, email, role
//! and company. Settings come from the `[jwt]` table of the Rocket config,
//! overridden per key by `ROCKET_JWT_*` environment variables (see
//! [`jwt_env_provider`]), and are managed as state by [`jwt_config_fairing`].

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rocket::fairing::AdHoc;
use rocket::figment::providers::Env;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EsgError;
use crate::models::User;

pub const JWT_ENV_PREFIX: &str = "ROCKET_JWT_";

pub const DEFAULT_SECRET: &str = "esg-sustainability-api-development-secret-key-change-me";

fn default_secret() -> String {
    DEFAULT_SECRET.to_string()
}

fn default_issuer() -> String {
    "ESGSustainabilityAPI".to_string()
}

fn default_audience() -> String {
    "ESGSustainabilityAPI_Users".to_string()
}

fn default_expiry_minutes() -> i64 {
    60
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    #[serde(default = "default_secret")]
    pub secret: String,
    #[serde(default = "default_issuer")]
    pub issuer: String,
    #[serde(default = "default_audience")]
    pub audience: String,
    #[serde(default = "default_expiry_minutes")]
    pub expiry_minutes: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        JwtConfig {
            secret: default_secret(),
            issuer: default_issuer(),
            audience: default_audience(),
            expiry_minutes: default_expiry_minutes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(rename = "companyId")]
    pub company_id: Option<i32>,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

impl Claims {
    pub fn user_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

/// Signs a token for `user`; returns it with its expiry instant.
pub fn issue_token(config: &JwtConfig, user: &User) -> Result<(String, DateTime<Utc>), EsgError> {
    let now = Utc::now();
    let expires_at = now + Duration::minutes(config.expiry_minutes);
    let claims = Claims {
        sub: user.id.to_string(),
        name: user.username.clone(),
        email: user.email.clone(),
        role: user.role.clone(),
        company_id: user.company_id,
        jti: Uuid::new_v4().to_string(),
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
        iss: config.issuer.clone(),
        aud: config.audience.clone(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?;
    Ok((token, expires_at))
}

/// Checks signature, expiry, issuer and audience.
pub fn validate_token(config: &JwtConfig, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_issuer(&[config.issuer.as_str()]);
    validation.set_audience(&[config.audience.as_str()]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}

/// Maps `<prefix>SECRET`, `<prefix>ISSUER`, ... onto the `jwt` table.
///
/// Rocket's own `ROCKET_` provider would turn `ROCKET_JWT_SECRET` into a
/// top-level `jwt_secret` key, which nothing reads.
pub fn jwt_env_provider(prefix: &str) -> Env {
    Env::prefixed(prefix)
        .map(|key| format!("jwt.{}", key).into())
        .global()
}

/// Loads [`JwtConfig`] from the `jwt` config table and manages it.
pub fn jwt_config_fairing() -> AdHoc {
    AdHoc::on_ignite("JWT Configuration", |rocket| async {
        let config = match rocket.figment().extract_inner::<JwtConfig>("jwt") {
            Ok(config) => config,
            Err(e) => {
                warn!("[jwt] no usable jwt config ({}), using defaults", e);
                JwtConfig::default()
            }
        };
        if config.secret == DEFAULT_SECRET {
            warn!("[jwt] using the built-in development secret; set ROCKET_JWT_SECRET in production");
        }
        info!(
            "[jwt] issuer '{}', audience '{}', tokens valid for {} minutes",
            config.issuer, config.audience, config.expiry_minutes
        );
        rocket.manage(config)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::fixtures::at;
    use rocket::figment::Figment;

    fn user() -> User {
        User {
            id: 7,
            username: "manager".into(),
            email: "manager@esg.local".into(),
            password_hash: String::new(),
            first_name: "Maria".into(),
            last_name: "Silva".into(),
            role: "Manager".into(),
            company_id: Some(1),
            is_active: true,
            created_at: at(2024, 1, 1),
            updated_at: at(2024, 1, 1),
            last_login_at: None,
        }
    }

    #[test]
    fn issued_token_validates() {
        let config = JwtConfig::default();
        let (token, expires_at) = issue_token(&config, &user()).unwrap();

        let claims = validate_token(&config, &token).unwrap();
        assert_eq!(claims.user_id(), Some(7));
        assert_eq!(claims.role, "Manager");
        assert_eq!(claims.company_id, Some(1));
        assert_eq!(claims.exp, expires_at.timestamp());
        assert_eq!(claims.iss, "ESGSustainabilityAPI");
    }

    #[test]
    fn rejects_foreign_secret_and_audience() {
        let config = JwtConfig::default();
        let (token, _) = issue_token(&config, &user()).unwrap();

        let other_secret = JwtConfig {
            secret: "another-secret-entirely".into(),
            ..JwtConfig::default()
        };
        assert!(validate_token(&other_secret, &token).is_err());

        let other_audience = JwtConfig {
            audience: "someone-else".into(),
            ..JwtConfig::default()
        };
        assert!(validate_token(&other_audience, &token).is_err());
    }

    #[test]
    fn rejects_expired_tokens() {
        let config = JwtConfig {
            expiry_minutes: -5,
            ..JwtConfig::default()
        };
        let (token, _) = issue_token(&config, &user()).unwrap();
        assert!(validate_token(&config, &token).is_err());
    }

    #[test]
    fn env_variables_override_the_jwt_table() {
        // SAFETY: no other test reads or writes this variable.
        unsafe { std::env::set_var("ESG_JWT_ENV_TEST_SECRET", "prod-secret") };

        let config: JwtConfig = Figment::new()
            .merge(("jwt.secret", "dev"))
            .merge(("jwt.issuer", "FileIssuer"))
            .merge(jwt_env_provider("ESG_JWT_ENV_TEST_"))
            .extract_inner("jwt")
            .unwrap();

        assert_eq!(config.secret, "prod-secret");
        assert_eq!(config.issuer, "FileIssuer");
        assert_eq!(config.expiry_minutes, 60);
    }
}
