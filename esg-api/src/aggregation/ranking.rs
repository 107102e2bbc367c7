//! Company rankings by emissions, renewable share or latest ESG score.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{AggregationError, mean, per_employee};
use crate::models::{CarbonEmission, Company, EnergyConsumption, SustainabilityReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankingMetric {
    #[default]
    Emissions,
    Energy,
    EsgScore,
}

impl FromStr for RankingMetric {
    type Err = AggregationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "emissions" => Ok(RankingMetric::Emissions),
            "energy" => Ok(RankingMetric::Energy),
            "esg_score" => Ok(RankingMetric::EsgScore),
            _ => Err(AggregationError::InvalidMetric(s.to_string())),
        }
    }
}

/// Number of entries to return, always within `1..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingLimit(usize);

impl RankingLimit {
    pub const MAX: i64 = 100;

    pub fn new(limit: i64) -> Result<Self, AggregationError> {
        if (1..=Self::MAX).contains(&limit) {
            Ok(RankingLimit(limit as usize))
        } else {
            Err(AggregationError::LimitOutOfRange(limit))
        }
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for RankingLimit {
    fn default() -> Self {
        RankingLimit(10)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EmissionsRankingEntry {
    pub company_id: i32,
    pub company_name: String,
    pub industry: String,
    pub total_emissions: f64,
    pub emissions_per_employee: f64,
    pub record_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EnergyRankingEntry {
    pub company_id: i32,
    pub company_name: String,
    pub industry: String,
    pub total_energy_consumption: f64,
    pub average_renewable_percentage: f64,
    pub energy_per_employee: f64,
    pub record_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EsgScoreRankingEntry {
    pub company_id: i32,
    pub company_name: String,
    pub industry: String,
    #[serde(rename = "latestESGScore")]
    pub latest_esg_score: String,
    pub report_count: usize,
    #[ts(type = "string")]
    pub latest_report_date: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum CompanyRanking {
    Emissions(Vec<EmissionsRankingEntry>),
    Energy(Vec<EnergyRankingEntry>),
    EsgScore(Vec<EsgScoreRankingEntry>),
}

impl CompanyRanking {
    pub fn len(&self) -> usize {
        match self {
            CompanyRanking::Emissions(v) => v.len(),
            CompanyRanking::Energy(v) => v.len(),
            CompanyRanking::EsgScore(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Groups `items` by company id, keeping only companies that are known.
fn by_company<'a, T>(
    companies: &'a [Company],
    items: &'a [T],
    company_of: impl Fn(&T) -> i32,
) -> Vec<(&'a Company, Vec<&'a T>)> {
    let mut grouped: BTreeMap<i32, Vec<&T>> = BTreeMap::new();
    for item in items {
        grouped.entry(company_of(item)).or_default().push(item);
    }
    companies
        .iter()
        .filter_map(|c| grouped.remove(&c.id).map(|records| (c, records)))
        .collect()
}

pub fn rank_companies(
    metric: RankingMetric,
    limit: RankingLimit,
    companies: &[Company],
    emissions: &[CarbonEmission],
    energy: &[EnergyConsumption],
    reports: &[SustainabilityReport],
) -> CompanyRanking {
    match metric {
        RankingMetric::Emissions => CompanyRanking::Emissions(rank_by_emissions(limit, companies, emissions)),
        RankingMetric::Energy => CompanyRanking::Energy(rank_by_energy(limit, companies, energy)),
        RankingMetric::EsgScore => CompanyRanking::EsgScore(rank_by_esg_score(limit, companies, reports)),
    }
}

/// Lowest total emissions first.
fn rank_by_emissions(
    limit: RankingLimit,
    companies: &[Company],
    emissions: &[CarbonEmission],
) -> Vec<EmissionsRankingEntry> {
    let mut entries: Vec<EmissionsRankingEntry> = by_company(companies, emissions, |e| e.company_id)
        .into_iter()
        .map(|(company, records)| {
            let total: f64 = records.iter().map(|e| e.emission_amount).sum();
            EmissionsRankingEntry {
                company_id: company.id,
                company_name: company.name.clone(),
                industry: company.industry.clone(),
                total_emissions: total,
                emissions_per_employee: per_employee(total, company.employee_count),
                record_count: records.len(),
            }
        })
        .collect();

    entries.sort_by(|a, b| a.total_emissions.total_cmp(&b.total_emissions));
    entries.truncate(limit.get());
    entries
}

/// Highest average renewable share first.
fn rank_by_energy(
    limit: RankingLimit,
    companies: &[Company],
    energy: &[EnergyConsumption],
) -> Vec<EnergyRankingEntry> {
    let mut entries: Vec<EnergyRankingEntry> = by_company(companies, energy, |e| e.company_id)
        .into_iter()
        .map(|(company, records)| {
            let total: f64 = records.iter().map(|e| e.consumption_amount).sum();
            EnergyRankingEntry {
                company_id: company.id,
                company_name: company.name.clone(),
                industry: company.industry.clone(),
                total_energy_consumption: total,
                average_renewable_percentage: mean(records.iter().filter_map(|e| e.renewable_percentage)),
                energy_per_employee: per_employee(total, company.employee_count),
                record_count: records.len(),
            }
        })
        .collect();

    entries.sort_by(|a, b| b.average_renewable_percentage.total_cmp(&a.average_renewable_percentage));
    entries.truncate(limit.get());
    entries
}

/// Best (alphabetically lowest) latest score first.
fn rank_by_esg_score(
    limit: RankingLimit,
    companies: &[Company],
    reports: &[SustainabilityReport],
) -> Vec<EsgScoreRankingEntry> {
    let mut entries: Vec<EsgScoreRankingEntry> = by_company(companies, reports, |r| r.company_id)
        .into_iter()
        .filter_map(|(company, records)| {
            let latest = records.iter().max_by_key(|r| (r.year, r.quarter))?;
            if latest.esg_score.is_empty() {
                return None;
            }
            let latest_report_date = records.iter().map(|r| r.created_at).max()?;
            Some(EsgScoreRankingEntry {
                company_id: company.id,
                company_name: company.name.clone(),
                industry: company.industry.clone(),
                latest_esg_score: latest.esg_score.clone(),
                report_count: records.len(),
                latest_report_date,
            })
        })
        .collect();

    entries.sort_by(|a, b| a.latest_esg_score.cmp(&b.latest_esg_score));
    entries.truncate(limit.get());
    entries
}

/// Score of the most recent report by `(year, quarter)`, if any.
pub fn latest_score<'a>(reports: impl IntoIterator<Item = &'a SustainabilityReport>) -> Option<String> {
    reports
        .into_iter()
        .max_by_key(|r| (r.year, r.quarter))
        .map(|r| r.esg_score.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::fixtures::{at, company, emission, energy, report};

    fn companies() -> Vec<Company> {
        vec![
            company(1, "Alpha", 10),
            company(2, "Beta", 0),
            company(3, "Gamma", 50),
        ]
    }

    #[test]
    fn limit_must_be_between_one_and_hundred() {
        assert!(RankingLimit::new(0).is_err());
        assert!(RankingLimit::new(-5).is_err());
        assert!(RankingLimit::new(101).is_err());
        assert_eq!(RankingLimit::new(1).unwrap().get(), 1);
        assert_eq!(RankingLimit::new(100).unwrap().get(), 100);
    }

    #[test]
    fn unknown_metric_is_rejected() {
        assert_eq!("ESG_SCORE".parse::<RankingMetric>(), Ok(RankingMetric::EsgScore));
        assert!(matches!(
            "water".parse::<RankingMetric>(),
            Err(AggregationError::InvalidMetric(_))
        ));
    }

    #[test]
    fn emissions_ranking_is_ascending_and_skips_companies_without_records() {
        let emissions = vec![
            emission(1, 1, 40.0, "Scope 1", at(2024, 1, 1)),
            emission(2, 1, 10.0, "Scope 1", at(2024, 2, 1)),
            emission(3, 2, 5.0, "Scope 2", at(2024, 1, 1)),
        ];

        let ranking = rank_companies(
            RankingMetric::Emissions,
            RankingLimit::default(),
            &companies(),
            &emissions,
            &[],
            &[],
        );

        let CompanyRanking::Emissions(entries) = ranking else {
            panic!("expected an emissions ranking");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].company_name, "Beta");
        assert_eq!(entries[0].emissions_per_employee, 0.0);
        assert_eq!(entries[1].company_name, "Alpha");
        assert_eq!(entries[1].total_emissions, 50.0);
        assert_eq!(entries[1].emissions_per_employee, 5.0);
        assert_eq!(entries[1].record_count, 2);
    }

    #[test]
    fn energy_ranking_prefers_renewables_and_respects_limit() {
        let energy = vec![
            energy(1, 1, 1000.0, "Grid", Some(10.0), at(2024, 1, 1)),
            energy(2, 3, 500.0, "Solar", Some(90.0), at(2024, 1, 1)),
            energy(3, 3, 500.0, "Grid", Some(70.0), at(2024, 2, 1)),
            energy(4, 2, 200.0, "Grid", None, at(2024, 1, 1)),
        ];

        let ranking = rank_companies(
            RankingMetric::Energy,
            RankingLimit::new(2).unwrap(),
            &companies(),
            &[],
            &energy,
            &[],
        );

        let CompanyRanking::Energy(entries) = ranking else {
            panic!("expected an energy ranking");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].company_name, "Gamma");
        assert_eq!(entries[0].average_renewable_percentage, 80.0);
        assert_eq!(entries[0].energy_per_employee, 20.0);
        assert_eq!(entries[1].company_name, "Alpha");
    }

    #[test]
    fn esg_ranking_uses_latest_report_and_drops_empty_scores() {
        let reports = vec![
            report(1, 1, 2023, 4, "A"),
            report(2, 1, 2024, 1, "C"),
            report(3, 2, 2024, 2, "B"),
            report(4, 3, 2024, 3, ""),
            report(5, 3, 2024, 1, "A"),
        ];

        let ranking = rank_companies(
            RankingMetric::EsgScore,
            RankingLimit::default(),
            &companies(),
            &[],
            &[],
            &reports,
        );

        let CompanyRanking::EsgScore(entries) = ranking else {
            panic!("expected an ESG score ranking");
        };
        let summary: Vec<(&str, &str, usize)> = entries
            .iter()
            .map(|e| (e.company_name.as_str(), e.latest_esg_score.as_str(), e.report_count))
            .collect();
        assert_eq!(summary, vec![("Beta", "B", 1), ("Alpha", "C", 2)]);
        assert_eq!(entries[1].latest_report_date, at(2024, 1, 15));
    }
}
