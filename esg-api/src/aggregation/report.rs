//! Automatic quarterly report drafting.

use chrono::{Months, NaiveDate, NaiveDateTime};

use super::{AggregationError, DateRange, derive_esg_score, mean};
use crate::models::{CarbonEmission, Company, EnergyConsumption, NewSustainabilityReport};

pub const ENVIRONMENTAL_PLACEHOLDER: &str = "Automatically generated from available data.";
pub const NO_DATA_PLACEHOLDER: &str = "Data not available for automatic generation.";
pub const CHALLENGES_PLACEHOLDER: &str = "Detailed analysis required to identify specific challenges.";
pub const GOALS_PLACEHOLDER: &str = "Goal setting requires personalized strategic analysis.";

/// Calendar days of one quarter, first and last day inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuarterWindow {
    pub year: i32,
    pub quarter: i32,
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
}

impl QuarterWindow {
    pub fn new(year: i32, quarter: i32) -> Result<Self, AggregationError> {
        if !(1..=4).contains(&quarter) {
            return Err(AggregationError::InvalidQuarter(quarter));
        }
        if !(2000..=2100).contains(&year) {
            return Err(AggregationError::InvalidYear(year));
        }
        let first_month = ((quarter - 1) * 3 + 1) as u32;
        let first_day = NaiveDate::from_ymd_opt(year, first_month, 1)
            .ok_or(AggregationError::InvalidYear(year))?;
        let last_day = first_day
            .checked_add_months(Months::new(3))
            .and_then(|d| d.pred_opt())
            .ok_or(AggregationError::InvalidYear(year))?;
        Ok(QuarterWindow {
            year,
            quarter,
            first_day,
            last_day,
        })
    }

    /// Record-date range covering the whole of the last day.
    pub fn date_range(&self) -> DateRange {
        DateRange::new(
            self.first_day.and_hms_opt(0, 0, 0),
            self.last_day.and_hms_milli_opt(23, 59, 59, 999),
        )
    }

    pub fn contains(&self, at: &NaiveDateTime) -> bool {
        let day = at.date();
        day >= self.first_day && day <= self.last_day
    }
}

/// Drafts a report for `company` from the records falling inside `window`.
///
/// Records outside the window or belonging to other companies are ignored,
/// so callers may pass a broader snapshot.
pub fn draft_automatic_report(
    company: &Company,
    window: &QuarterWindow,
    emissions: &[CarbonEmission],
    energy: &[EnergyConsumption],
    now: NaiveDateTime,
) -> NewSustainabilityReport {
    let emissions_in_window = emissions
        .iter()
        .filter(|e| e.company_id == company.id && window.contains(&e.record_date));
    let energy_in_window: Vec<&EnergyConsumption> = energy
        .iter()
        .filter(|e| e.company_id == company.id && window.contains(&e.record_date))
        .collect();

    let total_emissions: f64 = emissions_in_window.map(|e| e.emission_amount).sum();
    let total_energy: f64 = energy_in_window.iter().map(|e| e.consumption_amount).sum();
    let renewable = mean(energy_in_window.iter().filter_map(|e| e.renewable_percentage));

    NewSustainabilityReport {
        title: format!(
            "Sustainability Report - {} - {}Q{}",
            company.name, window.year, window.quarter
        ),
        year: window.year,
        quarter: window.quarter,
        total_carbon_emissions: total_emissions,
        total_energy_consumption: total_energy,
        renewable_energy_percentage: renewable,
        water_consumption: 0.0,
        waste_generated: 0.0,
        waste_recycled: 0.0,
        esg_score: derive_esg_score(total_emissions, total_energy, renewable).to_string(),
        environmental_initiatives: ENVIRONMENTAL_PLACEHOLDER.to_string(),
        social_initiatives: NO_DATA_PLACEHOLDER.to_string(),
        governance_initiatives: NO_DATA_PLACEHOLDER.to_string(),
        challenges: CHALLENGES_PLACEHOLDER.to_string(),
        future_goals: GOALS_PLACEHOLDER.to_string(),
        company_id: company.id,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::fixtures::{at, company, emission, energy};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn quarter_bounds() {
        let q1 = QuarterWindow::new(2024, 1).unwrap();
        assert_eq!((q1.first_day, q1.last_day), (day(2024, 1, 1), day(2024, 3, 31)));
        let q2 = QuarterWindow::new(2024, 2).unwrap();
        assert_eq!((q2.first_day, q2.last_day), (day(2024, 4, 1), day(2024, 6, 30)));
        let q4 = QuarterWindow::new(2023, 4).unwrap();
        assert_eq!((q4.first_day, q4.last_day), (day(2023, 10, 1), day(2023, 12, 31)));
    }

    #[test]
    fn rejects_bad_quarter_and_year() {
        assert_eq!(QuarterWindow::new(2024, 0), Err(AggregationError::InvalidQuarter(0)));
        assert_eq!(QuarterWindow::new(2024, 5), Err(AggregationError::InvalidQuarter(5)));
        assert_eq!(QuarterWindow::new(1999, 1), Err(AggregationError::InvalidYear(1999)));
    }

    #[test]
    fn last_day_is_included_all_day() {
        let q1 = QuarterWindow::new(2024, 1).unwrap();
        let late = day(2024, 3, 31).and_hms_opt(18, 30, 0).unwrap();
        assert!(q1.contains(&late));
        assert!(q1.date_range().contains(&late));
        assert!(!q1.contains(&at(2024, 4, 1)));
        assert!(!q1.contains(&at(2023, 12, 31)));
    }

    #[test]
    fn drafts_scored_report_from_window() {
        let acme = company(7, "Acme", 100);
        let emissions = vec![
            emission(1, 7, 30.0, "Scope 1", at(2024, 4, 2)),
            emission(2, 7, 25.0, "Scope 2", at(2024, 6, 30)),
            emission(3, 7, 99.0, "Scope 1", at(2024, 7, 1)),
            emission(4, 8, 99.0, "Scope 1", at(2024, 5, 1)),
        ];
        let energy = vec![
            energy(1, 7, 4000.0, "Grid", Some(60.0), at(2024, 5, 1)),
            energy(2, 7, 2000.0, "Solar", Some(100.0), at(2024, 5, 2)),
            energy(3, 7, 500.0, "Gas", None, at(2024, 5, 3)),
        ];
        let window = QuarterWindow::new(2024, 2).unwrap();
        let now = at(2024, 7, 10);

        let draft = draft_automatic_report(&acme, &window, &emissions, &energy, now);

        assert_eq!(draft.title, "Sustainability Report - Acme - 2024Q2");
        assert_eq!(draft.total_carbon_emissions, 55.0);
        assert_eq!(draft.total_energy_consumption, 6500.0);
        assert_eq!(draft.renewable_energy_percentage, 80.0);
        // 100 - 20 (emissions > 50) - 8 (energy > 5000) + 5 (renewable > 50) = 77
        assert_eq!(draft.esg_score, "C");
        assert_eq!(draft.water_consumption, 0.0);
        assert_eq!(draft.waste_recycled, 0.0);
        assert_eq!(draft.environmental_initiatives, ENVIRONMENTAL_PLACEHOLDER);
        assert_eq!(draft.social_initiatives, NO_DATA_PLACEHOLDER);
        assert_eq!(draft.company_id, 7);
        assert_eq!(draft.created_at, now);
    }

    #[test]
    fn empty_quarter_scores_with_zero_renewables() {
        let acme = company(7, "Acme", 100);
        let window = QuarterWindow::new(2024, 3).unwrap();

        let draft = draft_automatic_report(&acme, &window, &[], &[], at(2024, 10, 1));

        assert_eq!(draft.total_carbon_emissions, 0.0);
        assert_eq!(draft.renewable_energy_percentage, 0.0);
        // Only the low-renewables penalty applies: 100 - 10 = 90.
        assert_eq!(draft.esg_score, "A");
    }
}
