//! Emissions trend bucketing.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::AggregationError;
use crate::models::CarbonEmission;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrendPeriod {
    #[default]
    Month,
    Quarter,
    Year,
}

impl FromStr for TrendPeriod {
    type Err = AggregationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "month" => Ok(TrendPeriod::Month),
            "quarter" => Ok(TrendPeriod::Quarter),
            "year" => Ok(TrendPeriod::Year),
            _ => Err(AggregationError::InvalidPeriod(s.to_string())),
        }
    }
}

impl TrendPeriod {
    /// `(year, sub-period)` key; the sub-period is 0 for yearly buckets.
    fn key(&self, emission: &CarbonEmission) -> (i32, u32) {
        let date = emission.record_date;
        match self {
            TrendPeriod::Month => (date.year(), date.month()),
            TrendPeriod::Quarter => (date.year(), (date.month() - 1) / 3 + 1),
            TrendPeriod::Year => (date.year(), 0),
        }
    }
}

/// One point on the trend line. Only the field matching the requested period
/// (`month` or `quarter`) is serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TrendBucket {
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub quarter: Option<u32>,
    pub total_emissions: f64,
    pub average_emissions: f64,
    pub record_count: usize,
}

/// Groups emissions into non-overlapping buckets sorted by year, then
/// sub-period.
pub fn emissions_trend(emissions: &[CarbonEmission], period: TrendPeriod) -> Vec<TrendBucket> {
    let mut buckets: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();
    for e in emissions {
        let entry = buckets.entry(period.key(e)).or_insert((0.0, 0));
        entry.0 += e.emission_amount;
        entry.1 += 1;
    }

    buckets
        .into_iter()
        .map(|((year, sub), (total, count))| TrendBucket {
            year,
            month: (period == TrendPeriod::Month).then_some(sub),
            quarter: (period == TrendPeriod::Quarter).then_some(sub),
            total_emissions: total,
            average_emissions: total / count as f64,
            record_count: count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::fixtures::{at, emission};

    fn sample() -> Vec<CarbonEmission> {
        vec![
            emission(1, 1, 30.0, "Scope 1", at(2024, 5, 3)),
            emission(2, 1, 10.0, "Scope 1", at(2023, 12, 31)),
            emission(3, 1, 20.0, "Scope 2", at(2024, 5, 20)),
            emission(4, 2, 6.0, "Scope 3", at(2024, 1, 1)),
            emission(5, 2, 4.0, "Scope 3", at(2024, 4, 1)),
        ]
    }

    #[test]
    fn parses_periods_case_insensitively() {
        assert_eq!("Quarter".parse::<TrendPeriod>(), Ok(TrendPeriod::Quarter));
        assert_eq!("YEAR".parse::<TrendPeriod>(), Ok(TrendPeriod::Year));
        assert_eq!(
            "week".parse::<TrendPeriod>(),
            Err(AggregationError::InvalidPeriod("week".into()))
        );
    }

    #[test]
    fn monthly_buckets_are_sorted_and_averaged() {
        let trend = emissions_trend(&sample(), TrendPeriod::Month);
        let keys: Vec<(i32, Option<u32>)> = trend.iter().map(|b| (b.year, b.month)).collect();
        assert_eq!(
            keys,
            vec![(2023, Some(12)), (2024, Some(1)), (2024, Some(4)), (2024, Some(5))]
        );
        let may = &trend[3];
        assert_eq!(may.total_emissions, 50.0);
        assert_eq!(may.average_emissions, 25.0);
        assert_eq!(may.record_count, 2);
        assert!(trend.iter().all(|b| b.quarter.is_none()));
    }

    #[test]
    fn quarterly_buckets_use_calendar_quarters() {
        let trend = emissions_trend(&sample(), TrendPeriod::Quarter);
        let keys: Vec<(i32, Option<u32>)> = trend.iter().map(|b| (b.year, b.quarter)).collect();
        assert_eq!(keys, vec![(2023, Some(4)), (2024, Some(1)), (2024, Some(2))]);
        assert_eq!(trend[2].total_emissions, 54.0);
        assert_eq!(trend[2].record_count, 3);
    }

    #[test]
    fn yearly_buckets_cover_every_record_once() {
        let trend = emissions_trend(&sample(), TrendPeriod::Year);
        assert_eq!(trend.len(), 2);
        assert_eq!(trend.iter().map(|b| b.record_count).sum::<usize>(), 5);
        assert_eq!(trend[1].total_emissions, 60.0);
        assert!(trend.iter().all(|b| b.month.is_none() && b.quarter.is_none()));
    }

    #[test]
    fn serialized_bucket_omits_unused_subperiod() {
        let trend = emissions_trend(&sample(), TrendPeriod::Quarter);
        let json = serde_json::to_value(&trend[0]).unwrap();
        assert_eq!(json["quarter"], 4);
        assert!(json.get("month").is_none());
        assert_eq!(json["recordCount"], 1);
    }
}
