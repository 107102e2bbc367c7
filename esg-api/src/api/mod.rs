pub mod auth;
pub mod company;
pub mod dashboard;
pub mod emission;
pub mod energy;
pub mod report;
pub mod status;

use rocket::Route;

/// Every route served under `/api`.
pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(auth::routes());
    routes.extend(company::routes());
    routes.extend(dashboard::routes());
    routes.extend(emission::routes());
    routes.extend(energy::routes());
    routes.extend(report::routes());
    routes
}
