use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use validator::Validate;

use crate::aggregation::EsgScore;
use crate::error::{EsgError, collect_violations};
use crate::schema::sustainability_reports;

#[derive(Queryable, Identifiable, Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[diesel(table_name = sustainability_reports)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SustainabilityReport {
    pub id: i32,
    pub title: String,
    pub year: i32,
    pub quarter: i32,
    pub total_carbon_emissions: f64,
    pub total_energy_consumption: f64,
    pub renewable_energy_percentage: f64,
    pub water_consumption: f64,
    pub waste_generated: f64,
    pub waste_recycled: f64,
    pub esg_score: String,
    pub environmental_initiatives: String,
    pub social_initiatives: String,
    pub governance_initiatives: String,
    pub challenges: String,
    pub future_goals: String,
    pub company_id: i32,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    #[ts(type = "string")]
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = sustainability_reports)]
pub struct NewSustainabilityReport {
    pub title: String,
    pub year: i32,
    pub quarter: i32,
    pub total_carbon_emissions: f64,
    pub total_energy_consumption: f64,
    pub renewable_energy_percentage: f64,
    pub water_consumption: f64,
    pub waste_generated: f64,
    pub waste_recycled: f64,
    pub esg_score: String,
    pub environmental_initiatives: String,
    pub social_initiatives: String,
    pub governance_initiatives: String,
    pub challenges: String,
    pub future_goals: String,
    pub company_id: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct CreateReportRequest {
    #[validate(length(min = 1, max = 200, message = "Title is required and must be at most 200 characters"))]
    pub title: String,
    #[validate(range(min = 2000, max = 2100, message = "Year must be between 2000 and 2100"))]
    pub year: i32,
    #[validate(range(min = 1, max = 4, message = "Quarter must be between 1 and 4"))]
    pub quarter: i32,
    #[validate(range(min = 0.0, message = "Carbon emissions must be zero or greater"))]
    pub total_carbon_emissions: f64,
    #[validate(range(min = 0.0, message = "Energy consumption must be zero or greater"))]
    pub total_energy_consumption: f64,
    #[validate(range(min = 0.0, max = 100.0, message = "Renewable energy percentage must be between 0 and 100"))]
    pub renewable_energy_percentage: f64,
    #[validate(range(min = 0.0, message = "Water consumption must be zero or greater"))]
    pub water_consumption: f64,
    #[validate(range(min = 0.0, message = "Waste generated must be zero or greater"))]
    pub waste_generated: f64,
    #[validate(range(min = 0.0, message = "Waste recycled must be zero or greater"))]
    pub waste_recycled: f64,
    pub esg_score: String,
    pub environmental_initiatives: String,
    pub social_initiatives: String,
    pub governance_initiatives: String,
    pub challenges: String,
    pub future_goals: String,
    pub company_id: Option<i32>,
}

impl CreateReportRequest {
    pub fn validated(self, now: NaiveDateTime) -> Result<NewSustainabilityReport, EsgError> {
        let mut extra = Vec::new();
        let esg_score = self.esg_score.trim().to_uppercase();
        if !esg_score.is_empty() && esg_score.parse::<EsgScore>().is_err() {
            extra.push("ESG score must be one of A, B, C, D or E".to_string());
        }
        if self.company_id.is_none() {
            extra.push("Company is required".to_string());
        }
        collect_violations(self.validate(), extra)?;

        let Some(company_id) = self.company_id else {
            return Err(EsgError::Internal("validated report lost its company".into()));
        };
        Ok(NewSustainabilityReport {
            title: self.title,
            year: self.year,
            quarter: self.quarter,
            total_carbon_emissions: self.total_carbon_emissions,
            total_energy_consumption: self.total_energy_consumption,
            renewable_energy_percentage: self.renewable_energy_percentage,
            water_consumption: self.water_consumption,
            waste_generated: self.waste_generated,
            waste_recycled: self.waste_recycled,
            esg_score,
            environmental_initiatives: self.environmental_initiatives,
            social_initiatives: self.social_initiatives,
            governance_initiatives: self.governance_initiatives,
            challenges: self.challenges,
            future_goals: self.future_goals,
            company_id,
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReportListItem {
    pub id: i32,
    pub title: String,
    pub year: i32,
    pub quarter: i32,
    pub total_carbon_emissions: f64,
    pub total_energy_consumption: f64,
    pub renewable_energy_percentage: f64,
    pub esg_score: String,
    pub company_name: String,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
}

impl From<(SustainabilityReport, String)> for ReportListItem {
    fn from((r, company_name): (SustainabilityReport, String)) -> Self {
        ReportListItem {
            id: r.id,
            title: r.title,
            year: r.year,
            quarter: r.quarter,
            total_carbon_emissions: r.total_carbon_emissions,
            total_energy_consumption: r.total_energy_consumption,
            renewable_energy_percentage: r.renewable_energy_percentage,
            esg_score: r.esg_score,
            company_name,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReportDetail {
    #[serde(flatten)]
    pub report: SustainabilityReport,
    pub company_name: String,
}

impl From<(SustainabilityReport, String)> for ReportDetail {
    fn from((report, company_name): (SustainabilityReport, String)) -> Self {
        ReportDetail {
            report,
            company_name,
        }
    }
}
