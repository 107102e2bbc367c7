//! Side-by-side comparison of up to ten companies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::ranking::latest_score;
use super::{AggregationError, DateRange, mean, per_employee};
use crate::models::{CarbonEmission, Company, EnergyConsumption, SustainabilityReport};

/// Validated, order-preserving list of 1 to 10 company ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonSelection(Vec<i32>);

impl ComparisonSelection {
    pub const MAX_COMPANIES: usize = 10;

    pub fn new(company_ids: Vec<i32>) -> Result<Self, AggregationError> {
        match company_ids.len() {
            0 => Err(AggregationError::NoCompaniesSelected),
            n if n > Self::MAX_COMPANIES => Err(AggregationError::TooManyCompanies(n)),
            _ => Ok(ComparisonSelection(company_ids)),
        }
    }

    pub fn ids(&self) -> &[i32] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CompanyComparison {
    pub company_id: i32,
    pub company_name: String,
    pub industry: String,
    pub employee_count: i32,
    pub total_emissions: f64,
    pub total_energy_consumption: f64,
    pub average_renewable_percentage: f64,
    pub emissions_per_employee: f64,
    pub energy_per_employee: f64,
    #[serde(rename = "latestESGScore")]
    pub latest_esg_score: Option<String>,
    pub period: DateRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Comparison {
    pub companies: Vec<CompanyComparison>,
    #[ts(type = "string")]
    pub comparison_date: DateTime<Utc>,
    pub period: DateRange,
}

/// Builds one row per selected company that exists, in selection order.
///
/// Emission and energy snapshots are expected to be pre-filtered to
/// `period`; reports are not, since the latest score ignores dates.
pub fn compare_companies(
    selection: &ComparisonSelection,
    period: DateRange,
    companies: &[Company],
    emissions: &[CarbonEmission],
    energy: &[EnergyConsumption],
    reports: &[SustainabilityReport],
    now: DateTime<Utc>,
) -> Comparison {
    let rows = selection
        .ids()
        .iter()
        .filter_map(|id| companies.iter().find(|c| c.id == *id))
        .map(|company| {
            let total_emissions: f64 = emissions
                .iter()
                .filter(|e| e.company_id == company.id)
                .map(|e| e.emission_amount)
                .sum();
            let company_energy: Vec<&EnergyConsumption> =
                energy.iter().filter(|e| e.company_id == company.id).collect();
            let total_energy: f64 = company_energy.iter().map(|e| e.consumption_amount).sum();

            CompanyComparison {
                company_id: company.id,
                company_name: company.name.clone(),
                industry: company.industry.clone(),
                employee_count: company.employee_count,
                total_emissions,
                total_energy_consumption: total_energy,
                average_renewable_percentage: mean(
                    company_energy.iter().filter_map(|e| e.renewable_percentage),
                ),
                emissions_per_employee: per_employee(total_emissions, company.employee_count),
                energy_per_employee: per_employee(total_energy, company.employee_count),
                latest_esg_score: latest_score(reports.iter().filter(|r| r.company_id == company.id)),
                period,
            }
        })
        .collect();

    Comparison {
        companies: rows,
        comparison_date: now,
        period,
    }
}
