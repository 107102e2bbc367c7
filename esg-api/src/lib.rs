#[macro_use]
extern crate rocket;

use rocket::figment::value::Map;
use rocket::figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use rocket::http::Status;
use rocket::request::Request;
use rocket::serde::json::{Json, Value};
use rocket::{Build, Rocket};

pub mod admin_init_fairing;
pub mod aggregation;
pub mod api;
pub mod auth_guards;
pub mod error;
pub mod jwt;
pub mod logged_json;
pub mod models;
pub mod orm;
pub use orm::DbConn;
pub mod query;
pub mod response;
pub mod schema;

use response::ErrorResponse;

pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const DEFAULT_DATABASE_URL: &str = "esg_sustainability.db";

#[catch(400)]
fn bad_request(req: &Request) -> Json<ErrorResponse> {
    Json(ErrorResponse::new(Status::BadRequest, "Bad request", None, req))
}

#[catch(401)]
fn unauthorized(req: &Request) -> Json<ErrorResponse> {
    Json(ErrorResponse::new(
        Status::Unauthorized,
        "Unauthorized",
        Some("A valid bearer token is required".to_string()),
        req,
    ))
}

#[catch(403)]
fn forbidden(req: &Request) -> Json<ErrorResponse> {
    Json(ErrorResponse::new(
        Status::Forbidden,
        "Forbidden",
        Some("Your role does not allow this operation".to_string()),
        req,
    ))
}

#[catch(404)]
fn not_found(req: &Request) -> Json<ErrorResponse> {
    Json(ErrorResponse::new(
        Status::NotFound,
        "Not Found",
        Some(req.uri().path().to_string()),
        req,
    ))
}

#[catch(422)]
fn unprocessable_entity(req: &Request) -> Json<ErrorResponse> {
    Json(ErrorResponse::new(
        Status::UnprocessableEntity,
        "Unprocessable Entity",
        Some("The request body could not be read".to_string()),
        req,
    ))
}

#[catch(500)]
fn internal_server_error(req: &Request) -> Json<ErrorResponse> {
    Json(ErrorResponse::new(Status::InternalServerError, "Internal server error", None, req))
}

#[catch(default)]
fn default_catcher(status: Status, req: &Request) -> Json<ErrorResponse> {
    Json(ErrorResponse::new(status, status.reason().unwrap_or("Unknown Error"), None, req))
}

/// Mounts every route and the JSON catchers.
pub fn mount_api_routes(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .mount("/", api::status::routes())
        .mount("/api", api::routes())
        .register(
            "/",
            catchers![
                bad_request,
                unauthorized,
                forbidden,
                not_found,
                unprocessable_entity,
                internal_server_error,
                default_catcher
            ],
        )
}

fn log_rocket_info(rocket: &Rocket<Build>) {
    let figment = rocket.figment();

    if let Ok(address) = figment.extract_inner::<String>("address") {
        info!("Rocket is running at: {}", address);
    }

    if let Ok(port) = figment.extract_inner::<u16>("port") {
        info!("Rocket is listening on port: {}", port);
    }

    match figment.extract_inner::<Map<String, Value>>("databases.sqlite_db") {
        Ok(db_config) => {
            if let Some(Value::String(url)) = db_config.get("url") {
                info!("Database URL: {}", url);
            } else {
                warn!("Database URL not found in configuration");
            }
        }
        Err(e) => {
            warn!("Failed to extract database configuration: {}", e);
        }
    }
}

/// Production Rocket instance. Tests use `orm::testing::test_rocket`, which
/// swaps in an in-memory database and seeds demo data.
pub fn rocket() -> Rocket<Build> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

    let figment = Figment::from(rocket::Config::default())
        .merge(Toml::file("Rocket.toml").nested())
        .merge(Env::prefixed("ROCKET_").global())
        .merge(jwt::jwt_env_provider(jwt::JWT_ENV_PREFIX))
        .merge(("databases.sqlite_db.url", database_url));

    let mut rocket = rocket::custom(figment)
        .attach(DbConn::fairing())
        .attach(orm::set_foreign_keys_fairing())
        .attach(orm::run_migrations_fairing())
        .attach(admin_init_fairing::admin_init_fairing())
        .attach(jwt::jwt_config_fairing());

    match rocket_cors::CorsOptions::default().to_cors() {
        Ok(cors) => rocket = rocket.attach(cors),
        Err(e) => warn!("CORS disabled, invalid configuration: {}", e),
    }

    log_rocket_info(&rocket);
    mount_api_routes(rocket)
}
