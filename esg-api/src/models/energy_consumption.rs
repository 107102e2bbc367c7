use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use validator::Validate;

use crate::error::{EsgError, collect_violations};
use crate::models::datetime::lenient_datetime;
use crate::schema::energy_consumptions;

#[derive(Queryable, Identifiable, Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[diesel(table_name = energy_consumptions)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EnergyConsumption {
    pub id: i32,
    pub energy_type: String,
    pub consumption_amount: f64,
    pub unit: String,
    #[ts(type = "string")]
    pub record_date: NaiveDateTime,
    pub source: String,
    pub cost: Option<f64>,
    pub cost_currency: Option<String>,
    pub renewable_percentage: Option<f64>,
    pub description: String,
    pub company_id: i32,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    #[ts(type = "string")]
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = energy_consumptions)]
pub struct NewEnergyConsumption {
    pub energy_type: String,
    pub consumption_amount: f64,
    pub unit: String,
    pub record_date: NaiveDateTime,
    pub source: String,
    pub cost: Option<f64>,
    pub cost_currency: Option<String>,
    pub renewable_percentage: Option<f64>,
    pub description: String,
    pub company_id: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

fn default_energy_unit() -> String {
    "kWh".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateEnergyRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 50, message = "Energy type is required and must be at most 50 characters"))]
    pub energy_type: String,
    #[serde(default)]
    #[validate(range(min = 0.01, message = "Consumption amount must be greater than zero"))]
    pub consumption_amount: f64,
    #[serde(default = "default_energy_unit")]
    #[validate(length(min = 1, max = 10, message = "Unit is required and must be at most 10 characters"))]
    pub unit: String,
    #[serde(default, deserialize_with = "lenient_datetime")]
    #[ts(type = "string")]
    pub record_date: Option<NaiveDateTime>,
    #[serde(default)]
    #[validate(length(max = 100, message = "Source must be at most 100 characters"))]
    pub source: String,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "Cost must be zero or greater"))]
    pub cost: Option<f64>,
    #[serde(default)]
    #[validate(length(max = 3, message = "Currency must be at most 3 characters"))]
    pub cost_currency: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0, message = "Renewable percentage must be between 0 and 100"))]
    pub renewable_percentage: Option<f64>,
    #[serde(default)]
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: String,
    #[serde(default)]
    pub company_id: Option<i32>,
}

impl CreateEnergyRequest {
    pub fn validated(self, now: NaiveDateTime) -> Result<NewEnergyConsumption, EsgError> {
        let mut extra = Vec::new();
        if self.record_date.is_none() {
            extra.push("Record date is required".to_string());
        }
        if self.company_id.is_none() {
            extra.push("Company is required".to_string());
        }
        collect_violations(self.validate(), extra)?;

        let (Some(record_date), Some(company_id)) = (self.record_date, self.company_id) else {
            return Err(EsgError::Internal("validated energy record lost required fields".into()));
        };
        // A cost without a currency is billed in BRL.
        let cost_currency = match (self.cost, self.cost_currency) {
            (Some(_), None) => Some("BRL".to_string()),
            (_, currency) => currency,
        };
        Ok(NewEnergyConsumption {
            energy_type: self.energy_type,
            consumption_amount: self.consumption_amount,
            unit: self.unit,
            record_date,
            source: self.source,
            cost: self.cost,
            cost_currency,
            renewable_percentage: self.renewable_percentage,
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
pub struct EnergyListItem {
    pub id: i32,
    pub energy_type: String,
    pub consumption_amount: f64,
    pub unit: String,
    #[ts(type = "string")]
    pub record_date: NaiveDateTime,
    pub source: String,
    pub cost: Option<f64>,
    pub cost_currency: Option<String>,
    pub renewable_percentage: Option<f64>,
    pub company_name: String,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
}

impl From<(EnergyConsumption, String)> for EnergyListItem {
    fn from((e, company_name): (EnergyConsumption, String)) -> Self {
        EnergyListItem {
            id: e.id,
            energy_type: e.energy_type,
            consumption_amount: e.consumption_amount,
            unit: e.unit,
            record_date: e.record_date,
            source: e.source,
            cost: e.cost,
            cost_currency: e.cost_currency,
            renewable_percentage: e.renewable_percentage,
            company_name,
            created_at: e.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EnergyDetail {
    pub id: i32,
    pub energy_type: String,
    pub consumption_amount: f64,
    pub unit: String,
    #[ts(type = "string")]
    pub record_date: NaiveDateTime,
    pub source: String,
    pub cost: Option<f64>,
    pub cost_currency: Option<String>,
    pub renewable_percentage: Option<f64>,
    pub description: String,
    pub company_id: i32,
    pub company_name: String,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    #[ts(type = "string")]
    pub updated_at: NaiveDateTime,
}

impl From<(EnergyConsumption, String)> for EnergyDetail {
    fn from((e, company_name): (EnergyConsumption, String)) -> Self {
        EnergyDetail {
            id: e.id,
            energy_type: e.energy_type,
            consumption_amount: e.consumption_amount,
            unit: e.unit,
            record_date: e.record_date,
            source: e.source,
            cost: e.cost,
            cost_currency: e.cost_currency,
            renewable_percentage: e.renewable_percentage,
            description: e.description,
            company_id: e.company_id,
            company_name,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}
