use std::cmp::Ordering;

use diesel::prelude::*;

use super::RecordFilter;
use super::db::last_insert_rowid;
use crate::models::{EnergyConsumption, NewEnergyConsumption};
use crate::query::{Listable, SortField, contains_term};
use crate::schema::{companies, energy_consumptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergySortField {
    EnergyType,
    Amount,
    Date,
    Cost,
    Renewable,
    Company,
}

impl SortField for EnergySortField {
    fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "energytype" => Some(EnergySortField::EnergyType),
            "amount" => Some(EnergySortField::Amount),
            "date" => Some(EnergySortField::Date),
            "cost" => Some(EnergySortField::Cost),
            "renewable" => Some(EnergySortField::Renewable),
            "company" => Some(EnergySortField::Company),
            _ => None,
        }
    }
}

/// Missing values sort before any present value.
fn cmp_optional(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (a, b) => a.is_some().cmp(&b.is_some()),
    }
}

impl Listable for (EnergyConsumption, String) {
    type Field = EnergySortField;

    fn matches(&self, term: &str) -> bool {
        let (e, company_name) = self;
        contains_term(&e.energy_type, term)
            || contains_term(&e.source, term)
            || contains_term(company_name, term)
    }

    fn compare_by(&self, other: &Self, field: EnergySortField) -> Ordering {
        match field {
            EnergySortField::EnergyType => self.0.energy_type.cmp(&other.0.energy_type),
            EnergySortField::Amount => self.0.consumption_amount.total_cmp(&other.0.consumption_amount),
            EnergySortField::Date => self.0.record_date.cmp(&other.0.record_date),
            EnergySortField::Cost => cmp_optional(self.0.cost, other.0.cost),
            EnergySortField::Renewable => {
                cmp_optional(self.0.renewable_percentage, other.0.renewable_percentage)
            }
            EnergySortField::Company => self.1.cmp(&other.1),
        }
    }

    fn default_order(&self, other: &Self) -> Ordering {
        other.0.created_at.cmp(&self.0.created_at)
    }
}

pub fn insert_energy(
    conn: &mut SqliteConnection,
    new_record: &NewEnergyConsumption,
) -> QueryResult<EnergyConsumption> {
    diesel::insert_into(energy_consumptions::table)
        .values(new_record)
        .execute(conn)?;

    let id = last_insert_rowid(conn)?;
    energy_consumptions::table.find(id).first::<EnergyConsumption>(conn)
}

pub fn get_energy_with_company(
    conn: &mut SqliteConnection,
    record_id: i32,
) -> QueryResult<Option<(EnergyConsumption, String)>> {
    energy_consumptions::table
        .inner_join(companies::table)
        .filter(energy_consumptions::id.eq(record_id))
        .select((energy_consumptions::all_columns, companies::name))
        .first::<(EnergyConsumption, String)>(conn)
        .optional()
}

pub fn list_energy_with_company(
    conn: &mut SqliteConnection,
    filter: &RecordFilter,
) -> QueryResult<Vec<(EnergyConsumption, String)>> {
    let mut query = energy_consumptions::table
        .inner_join(companies::table)
        .select((energy_consumptions::all_columns, companies::name))
        .into_boxed();

    if let Some(company_id) = filter.company_id {
        query = query.filter(energy_consumptions::company_id.eq(company_id));
    }
    if let Some(start) = filter.range.start_date {
        query = query.filter(energy_consumptions::record_date.ge(start));
    }
    if let Some(end) = filter.range.end_date {
        query = query.filter(energy_consumptions::record_date.le(end));
    }

    query
        .order(energy_consumptions::id.asc())
        .load::<(EnergyConsumption, String)>(conn)
}

pub fn load_energy(conn: &mut SqliteConnection, filter: &RecordFilter) -> QueryResult<Vec<EnergyConsumption>> {
    let mut query = energy_consumptions::table.into_boxed();

    if let Some(company_id) = filter.company_id {
        query = query.filter(energy_consumptions::company_id.eq(company_id));
    }
    if let Some(ids) = &filter.company_ids {
        query = query.filter(energy_consumptions::company_id.eq_any(ids.clone()));
    }
    if let Some(start) = filter.range.start_date {
        query = query.filter(energy_consumptions::record_date.ge(start));
    }
    if let Some(end) = filter.range.end_date {
        query = query.filter(energy_consumptions::record_date.le(end));
    }

    query
        .order(energy_consumptions::id.asc())
        .load::<EnergyConsumption>(conn)
}
