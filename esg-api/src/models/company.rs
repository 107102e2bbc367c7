use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use validator::Validate;

use crate::error::{EsgError, collect_violations};
use crate::schema::companies;

#[derive(Queryable, Identifiable, Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[diesel(table_name = companies)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Company {
    pub id: i32,
    pub name: String,
    pub cnpj: String,
    pub industry: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub employee_count: i32,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    #[ts(type = "string")]
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = companies)]
pub struct NewCompany {
    pub name: String,
    pub cnpj: String,
    pub industry: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub employee_count: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Payload for creating or fully replacing a company.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct CompanyInput {
    #[validate(length(min = 1, max = 200, message = "Company name is required and must be at most 200 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 20, message = "CNPJ is required and must be at most 20 characters"))]
    pub cnpj: String,
    #[validate(length(max = 100, message = "Industry must be at most 100 characters"))]
    pub industry: String,
    #[validate(length(max = 300, message = "Address must be at most 300 characters"))]
    pub address: String,
    #[validate(length(max = 100, message = "City must be at most 100 characters"))]
    pub city: String,
    #[validate(length(max = 50, message = "State must be at most 50 characters"))]
    pub state: String,
    #[validate(length(max = 20, message = "Zip code must be at most 20 characters"))]
    pub zip_code: String,
    #[validate(length(max = 200, message = "Contact email must be at most 200 characters"))]
    pub contact_email: String,
    #[validate(length(max = 30, message = "Contact phone must be at most 30 characters"))]
    pub contact_phone: String,
    #[validate(range(min = 0, message = "Employee count must be zero or greater"))]
    pub employee_count: i32,
}

impl CompanyInput {
    /// Validates the payload and produces a row stamped with `now`.
    pub fn validated(self, now: NaiveDateTime) -> Result<NewCompany, EsgError> {
        let mut extra = Vec::new();
        if !self.contact_email.is_empty() && !validator::validate_email(&self.contact_email) {
            extra.push("Contact email must be a valid email address".to_string());
        }
        collect_violations(self.validate(), extra)?;

        Ok(NewCompany {
            name: self.name.trim().to_string(),
            cnpj: self.cnpj.trim().to_string(),
            industry: self.industry,
            address: self.address,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            contact_email: self.contact_email,
            contact_phone: self.contact_phone,
            employee_count: self.employee_count,
            created_at: now,
            updated_at: now,
        })
    }
}
