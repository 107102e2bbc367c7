use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use validator::Validate;

use crate::error::{EsgError, collect_violations};
use crate::models::datetime::lenient_datetime;
use crate::schema::carbon_emissions;

#[derive(Queryable, Identifiable, Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[diesel(table_name = carbon_emissions)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CarbonEmission {
    pub id: i32,
    pub source: String,
    pub emission_amount: f64,
    pub unit: String,
    #[ts(type = "string")]
    pub record_date: NaiveDateTime,
    pub category: String,
    pub location: String,
    pub description: String,
    pub company_id: i32,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    #[ts(type = "string")]
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = carbon_emissions)]
pub struct NewCarbonEmission {
    pub source: String,
    pub emission_amount: f64,
    pub unit: String,
    pub record_date: NaiveDateTime,
    pub category: String,
    pub location: String,
    pub description: String,
    pub company_id: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

fn default_emission_unit() -> String {
    "tCO2e".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateEmissionRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Source is required and must be at most 100 characters"))]
    pub source: String,
    #[serde(default)]
    #[validate(range(min = 0.01, message = "Emission amount must be greater than zero"))]
    pub emission_amount: f64,
    #[serde(default = "default_emission_unit")]
    #[validate(length(min = 1, max = 10, message = "Unit is required and must be at most 10 characters"))]
    pub unit: String,
    #[serde(default, deserialize_with = "lenient_datetime")]
    #[ts(type = "string")]
    pub record_date: Option<NaiveDateTime>,
    #[serde(default)]
    #[validate(length(max = 50, message = "Category must be at most 50 characters"))]
    pub category: String,
    #[serde(default)]
    #[validate(length(max = 100, message = "Location must be at most 100 characters"))]
    pub location: String,
    #[serde(default)]
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: String,
    #[serde(default)]
    pub company_id: Option<i32>,
}

impl CreateEmissionRequest {
    pub fn validated(self, now: NaiveDateTime) -> Result<NewCarbonEmission, EsgError> {
        let mut extra = Vec::new();
        if self.record_date.is_none() {
            extra.push("Record date is required".to_string());
        }
        if self.company_id.is_none() {
            extra.push("Company is required".to_string());
        }
        collect_violations(self.validate(), extra)?;

        let (Some(record_date), Some(company_id)) = (self.record_date, self.company_id) else {
            return Err(EsgError::Internal("validated emission lost required fields".into()));
        };
        Ok(NewCarbonEmission {
            source: self.source,
            emission_amount: self.emission_amount,
            unit: self.unit,
            record_date,
            category: self.category,
            location: self.location,
            description: self.description,
            company_id,
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EmissionListItem {
    pub id: i32,
    pub source: String,
    pub emission_amount: f64,
    pub unit: String,
    #[ts(type = "string")]
    pub record_date: NaiveDateTime,
    pub category: String,
    pub location: String,
    pub company_name: String,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
}

impl From<(CarbonEmission, String)> for EmissionListItem {
    fn from((e, company_name): (CarbonEmission, String)) -> Self {
        EmissionListItem {
            id: e.id,
            source: e.source,
            emission_amount: e.emission_amount,
            unit: e.unit,
            record_date: e.record_date,
            category: e.category,
            location: e.location,
            company_name,
            created_at: e.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EmissionDetail {
    pub id: i32,
    pub source: String,
    pub emission_amount: f64,
    pub unit: String,
    #[ts(type = "string")]
    pub record_date: NaiveDateTime,
    pub category: String,
    pub location: String,
    pub description: String,
    pub company_id: i32,
    pub company_name: String,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    #[ts(type = "string")]
    pub updated_at: NaiveDateTime,
}

impl From<(CarbonEmission, String)> for EmissionDetail {
    fn from((e, company_name): (CarbonEmission, String)) -> Self {
        EmissionDetail {
            id: e.id,
            source: e.source,
            emission_amount: e.emission_amount,
            unit: e.unit,
            record_date: e.record_date,
            category: e.category,
            location: e.location,
            description: e.description,
            company_id: e.company_id,
            company_name,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}
