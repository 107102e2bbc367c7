//! Pure ESG aggregation functions over already loaded record snapshots.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

pub mod comparison;
pub mod ranking;
pub mod report;
pub mod scoring;
pub mod statistics;
pub mod trends;

pub use comparison::{CompanyComparison, Comparison, ComparisonSelection, compare_companies};
pub use ranking::{CompanyRanking, RankingLimit, RankingMetric, rank_companies};
pub use report::{QuarterWindow, draft_automatic_report};
pub use scoring::{EsgScore, derive_esg_score, esg_points};
pub use statistics::{EnergyStatistics, EsgStatistics, energy_statistics, esg_statistics};
pub use trends::{TrendBucket, TrendPeriod, emissions_trend};

/// Argument errors raised before any computation happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregationError {
    #[error("Invalid period. Use: month, quarter or year")]
    InvalidPeriod(String),
    #[error("Invalid metric. Use: emissions, energy or esg_score")]
    InvalidMetric(String),
    #[error("The limit must be between 1 and 100")]
    LimitOutOfRange(i64),
    #[error("At least one company must be specified for comparison")]
    NoCompaniesSelected,
    #[error("A maximum of 10 companies can be compared at once")]
    TooManyCompanies(usize),
    #[error("The quarter must be between 1 and 4")]
    InvalidQuarter(i32),
    #[error("The year must be between 2000 and 2100")]
    InvalidYear(i32),
}

/// Inclusive `[start_date, end_date]` filter on record dates. Either side
/// may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DateRange {
    #[ts(type = "string | null")]
    pub start_date: Option<NaiveDateTime>,
    #[ts(type = "string | null")]
    pub end_date: Option<NaiveDateTime>,
}

impl DateRange {
    pub fn new(start_date: Option<NaiveDateTime>, end_date: Option<NaiveDateTime>) -> Self {
        DateRange {
            start_date,
            end_date,
        }
    }

    pub fn contains(&self, at: &NaiveDateTime) -> bool {
        self.start_date.is_none_or(|start| *at >= start)
            && self.end_date.is_none_or(|end| *at <= end)
    }
}

/// Arithmetic mean, or 0 for an empty input.
pub fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// `amount / employees`, with 0 employees yielding 0.
pub fn per_employee(amount: f64, employees: i32) -> f64 {
    if employees > 0 {
        amount / employees as f64
    } else {
        0.0
    }
}
