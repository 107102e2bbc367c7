use std::sync::Mutex;

use chrono::{NaiveDateTime, Utc};
use diesel::connection::SimpleConnection;
use diesel::sqlite::SqliteConnection;
use rocket::figment::{
    util::map,
    value::{Map, Value},
};
use rocket::{Build, Rocket, fairing::AdHoc};

use super::company::get_company_by_cnpj;
use super::db::{DbConn, run_pending_migrations, set_foreign_keys};
use super::emission::insert_emission;
use super::energy::insert_energy;
use super::login::hash_password;
use super::user::{get_user_by_username, insert_user};
use crate::admin_init_fairing::{DEFAULT_COMPANY_CNPJ, admin_init_fairing};
use crate::models::datetime::parse_datetime;
use crate::models::{NewCarbonEmission, NewCompany, NewEnergyConsumption, NewSustainabilityReport, NewUser, Role};

/// Configures SQLite for speed over durability. Only for tests.
fn set_sqlite_test_pragmas(conn: &mut SqliteConnection) -> diesel::QueryResult<()> {
    conn.batch_execute(
        r#"
        PRAGMA synchronous = OFF;
        PRAGMA journal_mode = OFF;
        "#,
    )
}

fn set_sqlite_test_pragmas_fairing() -> AdHoc {
    AdHoc::try_on_ignite("Set SQLite Test Pragmas", |rocket| async {
        let Some(conn) = DbConn::get_one(&rocket).await else {
            return Err(rocket);
        };
        match conn.run(set_sqlite_test_pragmas).await {
            Ok(()) => Ok(rocket),
            Err(e) => {
                error!("[testing] failed to set test pragmas: {}", e);
                Err(rocket)
            }
        }
    })
}

/// Seeds the fixed accounts and records the integration tests log in with:
/// `manager`/`manager123` (Manager), `user`/`user123` (User), plus one
/// emission and one energy record for the seeded company.
pub fn test_data_init_fairing() -> AdHoc {
    AdHoc::try_on_ignite("Test Data Initialization", |rocket| async {
        let Some(conn) = DbConn::get_one(&rocket).await else {
            return Err(rocket);
        };
        match conn.run(seed_test_data).await {
            Ok(()) => Ok(rocket),
            Err(e) => {
                error!("[testing] seeding failed: {}", e);
                Err(rocket)
            }
        }
    })
}

fn seed_test_data(conn: &mut SqliteConnection) -> Result<(), crate::error::EsgError> {
    let company = get_company_by_cnpj(conn, DEFAULT_COMPANY_CNPJ)?
        .ok_or_else(|| crate::error::EsgError::Internal("seed company missing".into()))?;

    for (username, password, role) in [
        ("manager", "manager123", Role::Manager),
        ("user", "user123", Role::User),
    ] {
        if get_user_by_username(conn, username)?.is_some() {
            continue;
        }
        let mut new_user = sample_user(username, &format!("{}@esg.local", username), role, Some(company.id));
        new_user.password_hash = hash_password(password)?;
        insert_user(conn, &new_user)?;
    }

    let mut emission = sample_emission(company.id, 15.5, "2024-01-15");
    emission.category = "Escopo 2".to_string();
    emission.source = "Energia Elétrica".to_string();
    insert_emission(conn, &emission)?;

    let mut energy = sample_energy(company.id, 2500.0, Some(35.0), "2024-01-15");
    energy.cost = Some(1250.0);
    energy.cost_currency = Some("BRL".to_string());
    insert_energy(conn, &energy)?;

    Ok(())
}

/// Rocket instance backed by a fresh in-memory database, with the admin
/// and test seed data loaded and every API route mounted.
pub fn test_rocket() -> Rocket<Build> {
    use uuid::Uuid;

    let unique_db_name = format!("file:test_db_{}?mode=memory&cache=shared", Uuid::new_v4());

    let db_config: Map<_, Value> = map! {
        "url" => unique_db_name.into(),
        "pool_size" => 5.into(),
        "timeout" => 5.into(),
    };

    let figment = rocket::Config::figment()
        .merge(("databases", map!["sqlite_db" => db_config]))
        .merge(("log_level", "critical"));

    let rocket = rocket::custom(figment)
        .attach(DbConn::fairing())
        .attach(super::db::set_foreign_keys_fairing())
        .attach(set_sqlite_test_pragmas_fairing())
        .attach(super::db::run_migrations_fairing())
        .attach(admin_init_fairing())
        .attach(test_data_init_fairing())
        .attach(crate::jwt::jwt_config_fairing());
    crate::mount_api_routes(rocket)
}

/// Fresh in-memory database with migrations applied.
///
/// Each call returns a new, independent database.
pub fn setup_test_db() -> SqliteConnection {
    use diesel::Connection;

    let mut conn = SqliteConnection::establish(":memory:").expect("Failed to create in-memory SQLite database");
    set_foreign_keys(&mut conn).expect("Failed to enable foreign keys");
    run_pending_migrations(&mut conn).expect("Failed to run migrations");
    conn
}

/// Wraps a plain connection behind the same async `.run()` interface as
/// [`DbConn`], so code written against `DbRunner` can be unit tested.
pub struct FakeDbConn<'a>(Mutex<&'a mut SqliteConnection>);

impl FakeDbConn<'_> {
    pub async fn run<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut SqliteConnection) -> R + Send + 'static,
        R: Send + 'static,
    {
        let mut guard = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut **guard)
    }
}

pub fn setup_test_dbconn(conn: &mut SqliteConnection) -> FakeDbConn<'_> {
    FakeDbConn(Mutex::new(conn))
}

fn test_date(date: &str) -> NaiveDateTime {
    parse_datetime(date).unwrap_or_else(|| panic!("bad test date '{}'", date))
}

pub fn sample_company(name: &str, cnpj: &str) -> NewCompany {
    let now = Utc::now().naive_utc();
    NewCompany {
        name: name.to_string(),
        cnpj: cnpj.to_string(),
        industry: "Tecnologia".to_string(),
        address: "Av. Paulista, 1000".to_string(),
        city: "São Paulo".to_string(),
        state: "SP".to_string(),
        zip_code: "01310-100".to_string(),
        contact_email: format!("contato@{}.com.br", name.to_lowercase().replace(' ', "")),
        contact_phone: "(11) 3000-0000".to_string(),
        employee_count: 100,
        created_at: now,
        updated_at: now,
    }
}

/// Emission of `amount` tCO2e recorded on `date` (`YYYY-MM-DD`).
pub fn sample_emission(company_id: i32, amount: f64, date: &str) -> NewCarbonEmission {
    let recorded = test_date(date);
    NewCarbonEmission {
        source: "Diesel generator".to_string(),
        emission_amount: amount,
        unit: "tCO2e".to_string(),
        record_date: recorded,
        category: "Escopo 1".to_string(),
        location: "Matriz".to_string(),
        description: String::new(),
        company_id,
        created_at: recorded,
        updated_at: recorded,
    }
}

pub fn sample_energy(company_id: i32, amount: f64, renewable: Option<f64>, date: &str) -> NewEnergyConsumption {
    let recorded = test_date(date);
    NewEnergyConsumption {
        energy_type: "Elétrica".to_string(),
        consumption_amount: amount,
        unit: "kWh".to_string(),
        record_date: recorded,
        source: "Rede".to_string(),
        cost: None,
        cost_currency: None,
        renewable_percentage: renewable,
        description: String::new(),
        company_id,
        created_at: recorded,
        updated_at: recorded,
    }
}

pub fn sample_report(company_id: i32, year: i32, quarter: i32) -> NewSustainabilityReport {
    let now = Utc::now().naive_utc();
    NewSustainabilityReport {
        title: format!("Relatório Q{} {}", quarter, year),
        year,
        quarter,
        total_carbon_emissions: 20.0,
        total_energy_consumption: 4000.0,
        renewable_energy_percentage: 40.0,
        water_consumption: 0.0,
        waste_generated: 0.0,
        waste_recycled: 0.0,
        esg_score: "B".to_string(),
        environmental_initiatives: String::new(),
        social_initiatives: String::new(),
        governance_initiatives: String::new(),
        challenges: String::new(),
        future_goals: String::new(),
        company_id,
        created_at: now,
        updated_at: now,
    }
}

/// User with an unusable password hash; set `password_hash` to log in.
pub fn sample_user(username: &str, email: &str, role: Role, company_id: Option<i32>) -> NewUser {
    let now = Utc::now().naive_utc();
    NewUser {
        username: username.to_string(),
        email: email.to_string(),
        password_hash: "not-a-hash".to_string(),
        first_name: username.to_string(),
        last_name: "Teste".to_string(),
        role: role.as_str().to_string(),
        company_id,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}
