use chrono::Utc;
use diesel::prelude::*;
use dotenvy::dotenv;
use rocket::fairing::AdHoc;

use crate::error::EsgError;
use crate::models::{Company, NewCompany, NewUser, Role};
use crate::orm::DbConn;
use crate::orm::company::{get_company_by_cnpj, insert_company};
use crate::orm::login::hash_password;
use crate::orm::user::{get_user_by_username, insert_user};

pub const DEFAULT_COMPANY_NAME: &str = "EcoTech Solutions Ltda";
pub const DEFAULT_COMPANY_CNPJ: &str = "12.345.678/0001-90";

/// Add the default company and admin user if needed.
///
/// The admin's credentials come from ESG_ADMIN_USERNAME, ESG_ADMIN_EMAIL and
/// ESG_ADMIN_PASSWORD.
pub fn admin_init_fairing() -> AdHoc {
    AdHoc::try_on_ignite("Admin User Initialization", |rocket| async {
        dotenv().ok();

        let Some(conn) = DbConn::get_one(&rocket).await else {
            error!("[admin-init] ERROR: Could not get DB connection.");
            return Err(rocket);
        };

        let settings = AdminSettings::from_env();
        match conn.run(move |c| seed_admin(c, &settings)).await {
            Ok(()) => Ok(rocket),
            Err(e) => {
                error!("[admin-init] FATAL: {}", e);
                Err(rocket)
            }
        }
    })
}

struct AdminSettings {
    username: String,
    email: String,
    password: String,
}

impl AdminSettings {
    fn from_env() -> Self {
        let var = |key: &str, default: &str| std::env::var(key).unwrap_or_else(|_| default.to_string());
        AdminSettings {
            username: var("ESG_ADMIN_USERNAME", "admin"),
            email: var("ESG_ADMIN_EMAIL", "admin@esg.local"),
            password: var("ESG_ADMIN_PASSWORD", "admin123"),
        }
    }
}

fn seed_admin(c: &mut SqliteConnection, settings: &AdminSettings) -> Result<(), EsgError> {
    let company = find_or_create_company(c)?;
    create_admin_user_if_needed(c, settings, &company)
}

fn find_or_create_company(c: &mut SqliteConnection) -> Result<Company, EsgError> {
    if let Some(found) = get_company_by_cnpj(c, DEFAULT_COMPANY_CNPJ)? {
        info!("[admin-init] Matched company: '{}'", found.name);
        return Ok(found);
    }

    info!("[admin-init] No matching company found. Creating '{}'.", DEFAULT_COMPANY_NAME);
    let now = Utc::now().naive_utc();
    let company = NewCompany {
        name: DEFAULT_COMPANY_NAME.to_string(),
        cnpj: DEFAULT_COMPANY_CNPJ.to_string(),
        industry: "Tecnologia".to_string(),
        address: "Rua das Flores, 123".to_string(),
        city: "São Paulo".to_string(),
        state: "SP".to_string(),
        zip_code: "01234-567".to_string(),
        contact_email: "contato@ecotech.com.br".to_string(),
        contact_phone: "(11) 99999-9999".to_string(),
        employee_count: 150,
        created_at: now,
        updated_at: now,
    };
    Ok(insert_company(c, &company)?)
}

fn create_admin_user_if_needed(
    c: &mut SqliteConnection,
    settings: &AdminSettings,
    company: &Company,
) -> Result<(), EsgError> {
    if get_user_by_username(c, &settings.username)?.is_some() {
        info!("[admin-init] Admin user '{}' already exists", settings.username);
        return Ok(());
    }

    let now = Utc::now().naive_utc();
    let admin = NewUser {
        username: settings.username.clone(),
        email: settings.email.clone(),
        password_hash: hash_password(&settings.password)?,
        first_name: "Administrador".to_string(),
        last_name: "Sistema".to_string(),
        role: Role::Admin.as_str().to_string(),
        company_id: Some(company.id),
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    insert_user(c, &admin)?;
    info!("[admin-init] Created admin user: '{}'", settings.username);
    Ok(())
}
