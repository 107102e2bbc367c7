//! ESG dashboard endpoints: statistics, emission trends, company ranking
//! and company comparison.
//!
//! Each handler loads a snapshot of the relevant rows and hands it to the
//! pure functions in [`crate::aggregation`].

use chrono::Utc;
use rocket::Route;
use rocket::form::FromForm;
use rocket::serde::json::Json;

use crate::aggregation::{
    CompanyRanking, Comparison, ComparisonSelection, DateRange, EsgStatistics, RankingLimit, RankingMetric,
    TrendBucket, TrendPeriod, compare_companies, emissions_trend, esg_statistics, rank_companies,
};
use crate::auth_guards::AuthenticatedUser;
use crate::error::{EsgError, EsgResult};
use crate::orm::company::{count_companies, get_all_companies, get_companies_by_ids};
use crate::orm::emission::load_emissions;
use crate::orm::energy::load_energy;
use crate::orm::report::{count_reports, load_reports};
use crate::orm::{DbConn, RecordFilter};
use crate::query::{FilterQuery, parse_date_param};
use crate::response::ApiResponse;

#[derive(FromForm, Debug, Default)]
pub struct TrendQuery {
    #[field(name = "companyId")]
    pub company_id: Option<i32>,
    pub period: Option<String>,
}

#[derive(FromForm, Debug, Default)]
pub struct RankingQuery {
    pub metric: Option<String>,
    pub limit: Option<i64>,
}

#[derive(FromForm, Debug, Default)]
pub struct ComparisonQuery {
    /// Repeated (`companyIds=1&companyIds=2`) or comma separated.
    #[field(name = "companyIds")]
    pub company_ids: Option<Vec<String>>,
    #[field(name = "startDate")]
    pub start_date: Option<String>,
    #[field(name = "endDate")]
    pub end_date: Option<String>,
}

impl ComparisonQuery {
    fn ids(&self) -> Result<Vec<i32>, EsgError> {
        let mut ids = Vec::new();
        for raw in self.company_ids.iter().flatten() {
            for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                let id = part
                    .parse::<i32>()
                    .map_err(|_| EsgError::bad_request(format!("Invalid companyIds '{}'", part)))?;
                ids.push(id);
            }
        }
        Ok(ids)
    }
}

/// ESG Statistics endpoint.
///
/// - **URL:** `/api/ESGDashboard/statistics`
/// - **Method:** `GET`
/// - **Purpose:** Emission and energy totals, average renewable share,
///   per-category and per-type sums
/// - **Authentication:** Required
///
/// Optional `companyId`, `startDate` and `endDate` narrow the records.
/// `totalCompanies` is 1 when a company is given; `totalReports` always
/// counts every report.
#[get("/ESGDashboard/statistics?<filter..>")]
pub async fn get_statistics(
    db: DbConn,
    filter: FilterQuery,
    _auth_user: AuthenticatedUser,
) -> EsgResult<Json<ApiResponse<EsgStatistics>>> {
    let records = RecordFilter {
        company_id: filter.company_id,
        range: filter.date_range()?,
        ..Default::default()
    };
    let single_company = filter.company_id.is_some();

    let stats = db
        .run(move |conn| -> EsgResult<EsgStatistics> {
            let emissions = load_emissions(conn, &records)?;
            let energy = load_energy(conn, &records)?;
            let total_companies = if single_company { 1 } else { count_companies(conn)? };
            let total_reports = count_reports(conn)?;
            Ok(esg_statistics(&emissions, &energy, total_companies, total_reports, Utc::now()))
        })
        .await?;

    Ok(Json(ApiResponse::ok(stats, "ESG statistics calculated successfully")))
}

/// Emissions Trends endpoint.
///
/// - **URL:** `/api/ESGDashboard/emissions-trends`
/// - **Method:** `GET`
/// - **Purpose:** Emission totals bucketed by month, quarter or year
/// - **Authentication:** Required
///
/// `period` defaults to `month`; any other value than `month`, `quarter` or
/// `year` is a 400.
#[get("/ESGDashboard/emissions-trends?<query..>")]
pub async fn get_emissions_trends(
    db: DbConn,
    query: TrendQuery,
    _auth_user: AuthenticatedUser,
) -> EsgResult<Json<ApiResponse<Vec<TrendBucket>>>> {
    let period = match query.period.as_deref() {
        Some(raw) => raw.parse::<TrendPeriod>()?,
        None => TrendPeriod::default(),
    };
    let records = RecordFilter {
        company_id: query.company_id,
        ..Default::default()
    };

    let emissions = db.run(move |conn| load_emissions(conn, &records)).await?;
    let buckets = emissions_trend(&emissions, period);
    Ok(Json(ApiResponse::ok(buckets, "Emission trends calculated successfully")))
}

/// Company Ranking endpoint.
///
/// - **URL:** `/api/ESGDashboard/company-ranking`
/// - **Method:** `GET`
/// - **Purpose:** Ranks companies by `emissions` (lowest first), `energy`
///   (highest renewable share first) or `esg_score` (best letter first)
/// - **Authentication:** Required
///
/// `limit` defaults to 10 and must lie in 1..=100.
#[get("/ESGDashboard/company-ranking?<query..>")]
pub async fn get_company_ranking(
    db: DbConn,
    query: RankingQuery,
    _auth_user: AuthenticatedUser,
) -> EsgResult<Json<ApiResponse<CompanyRanking>>> {
    let limit = match query.limit {
        Some(limit) => RankingLimit::new(limit)?,
        None => RankingLimit::default(),
    };
    let metric = match query.metric.as_deref() {
        Some(raw) => raw.parse::<RankingMetric>()?,
        None => RankingMetric::default(),
    };

    let ranking = db
        .run(move |conn| -> EsgResult<CompanyRanking> {
            let companies = get_all_companies(conn)?;
            let everything = RecordFilter::default();
            let (emissions, energy, reports) = match metric {
                RankingMetric::Emissions => (load_emissions(conn, &everything)?, Vec::new(), Vec::new()),
                RankingMetric::Energy => (Vec::new(), load_energy(conn, &everything)?, Vec::new()),
                RankingMetric::EsgScore => (Vec::new(), Vec::new(), load_reports(conn, None)?),
            };
            Ok(rank_companies(metric, limit, &companies, &emissions, &energy, &reports))
        })
        .await?;

    Ok(Json(ApiResponse::ok(ranking, "Company ranking calculated successfully")))
}

/// Company Comparison endpoint.
///
/// - **URL:** `/api/ESGDashboard/comparison?companyIds=1&companyIds=2`
/// - **Method:** `GET`
/// - **Purpose:** Side-by-side ESG figures for 1 to 10 companies
/// - **Authentication:** Required
///
/// Unknown ids are skipped; the others keep their requested order.
/// `startDate` and `endDate` narrow the emission and energy records.
#[get("/ESGDashboard/comparison?<query..>")]
pub async fn get_comparison(
    db: DbConn,
    query: ComparisonQuery,
    _auth_user: AuthenticatedUser,
) -> EsgResult<Json<ApiResponse<Comparison>>> {
    let selection = ComparisonSelection::new(query.ids()?)?;
    let period = DateRange::new(
        parse_date_param("startDate", query.start_date.as_deref())?,
        parse_date_param("endDate", query.end_date.as_deref())?,
    );

    let comparison = db
        .run(move |conn| -> EsgResult<Comparison> {
            let ids = selection.ids().to_vec();
            let companies = get_companies_by_ids(conn, &ids)?;
            let records = RecordFilter {
                company_ids: Some(ids.clone()),
                range: period,
                ..Default::default()
            };
            let emissions = load_emissions(conn, &records)?;
            let energy = load_energy(conn, &records)?;
            let reports = load_reports(conn, Some(&ids))?;
            Ok(compare_companies(&selection, period, &companies, &emissions, &energy, &reports, Utc::now()))
        })
        .await?;

    Ok(Json(ApiResponse::ok(comparison, "Company comparison calculated successfully")))
}

pub fn routes() -> Vec<Route> {
    routes![get_statistics, get_emissions_trends, get_company_ranking, get_comparison]
}
