//! Dashboard and energy statistics.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::mean;
use crate::models::{CarbonEmission, EnergyConsumption};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EsgStatistics {
    pub total_carbon_emissions: f64,
    pub total_energy_consumption: f64,
    pub average_renewable_percentage: f64,
    pub total_companies: i64,
    pub total_reports: i64,
    pub emissions_by_category: BTreeMap<String, f64>,
    pub energy_by_type: BTreeMap<String, f64>,
    #[ts(type = "string")]
    pub last_updated: DateTime<Utc>,
}

/// Summarises the already filtered emission and energy snapshots.
///
/// `total_companies` and `total_reports` are counted by the caller since they
/// depend on whether a company filter was applied.
pub fn esg_statistics(
    emissions: &[CarbonEmission],
    energy: &[EnergyConsumption],
    total_companies: i64,
    total_reports: i64,
    now: DateTime<Utc>,
) -> EsgStatistics {
    let mut emissions_by_category = BTreeMap::new();
    for e in emissions {
        *emissions_by_category.entry(e.category.clone()).or_insert(0.0) += e.emission_amount;
    }

    let mut energy_by_type = BTreeMap::new();
    for e in energy {
        *energy_by_type.entry(e.energy_type.clone()).or_insert(0.0) += e.consumption_amount;
    }

    EsgStatistics {
        total_carbon_emissions: emissions.iter().map(|e| e.emission_amount).sum(),
        total_energy_consumption: energy.iter().map(|e| e.consumption_amount).sum(),
        average_renewable_percentage: mean(energy.iter().filter_map(|e| e.renewable_percentage)),
        total_companies,
        total_reports,
        emissions_by_category,
        energy_by_type,
        last_updated: now,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ConsumptionByType {
    pub energy_type: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MonthlyConsumption {
    pub year: i32,
    pub month: u32,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EnergyStatistics {
    pub total_consumption: f64,
    pub average_consumption: f64,
    pub total_cost: f64,
    pub average_renewable_percentage: f64,
    pub consumption_by_type: Vec<ConsumptionByType>,
    pub monthly_trend: Vec<MonthlyConsumption>,
}

pub fn energy_statistics(energy: &[EnergyConsumption]) -> EnergyStatistics {
    let mut by_type: BTreeMap<&str, f64> = BTreeMap::new();
    let mut by_month: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for e in energy {
        *by_type.entry(e.energy_type.as_str()).or_insert(0.0) += e.consumption_amount;
        *by_month
            .entry((e.record_date.year(), e.record_date.month()))
            .or_insert(0.0) += e.consumption_amount;
    }

    EnergyStatistics {
        total_consumption: energy.iter().map(|e| e.consumption_amount).sum(),
        average_consumption: mean(energy.iter().map(|e| e.consumption_amount)),
        total_cost: energy.iter().filter_map(|e| e.cost).sum(),
        average_renewable_percentage: mean(energy.iter().filter_map(|e| e.renewable_percentage)),
        consumption_by_type: by_type
            .into_iter()
            .map(|(energy_type, total)| ConsumptionByType {
                energy_type: energy_type.to_string(),
                total,
            })
            .collect(),
        monthly_trend: by_month
            .into_iter()
            .map(|((year, month), total)| MonthlyConsumption { year, month, total })
            .collect(),
    }
}
