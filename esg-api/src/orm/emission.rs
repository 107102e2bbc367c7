use std::cmp::Ordering;

use diesel::prelude::*;

use super::RecordFilter;
use super::db::last_insert_rowid;
use crate::models::{CarbonEmission, NewCarbonEmission};
use crate::query::{Listable, SortField, contains_term};
use crate::schema::{carbon_emissions, companies};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmissionSortField {
    Source,
    Amount,
    Date,
    Company,
}

impl SortField for EmissionSortField {
    fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "source" => Some(EmissionSortField::Source),
            "amount" => Some(EmissionSortField::Amount),
            "date" => Some(EmissionSortField::Date),
            "company" => Some(EmissionSortField::Company),
            _ => None,
        }
    }
}

/// An emission paired with its company's name.
impl Listable for (CarbonEmission, String) {
    type Field = EmissionSortField;

    fn matches(&self, term: &str) -> bool {
        let (e, company_name) = self;
        contains_term(&e.source, term)
            || contains_term(&e.category, term)
            || contains_term(&e.location, term)
            || contains_term(company_name, term)
    }

    fn compare_by(&self, other: &Self, field: EmissionSortField) -> Ordering {
        match field {
            EmissionSortField::Source => self.0.source.cmp(&other.0.source),
            EmissionSortField::Amount => self.0.emission_amount.total_cmp(&other.0.emission_amount),
            EmissionSortField::Date => self.0.record_date.cmp(&other.0.record_date),
            EmissionSortField::Company => self.1.cmp(&other.1),
        }
    }

    /// Newest first.
    fn default_order(&self, other: &Self) -> Ordering {
        other.0.created_at.cmp(&self.0.created_at)
    }
}

pub fn insert_emission(conn: &mut SqliteConnection, new_emission: &NewCarbonEmission) -> QueryResult<CarbonEmission> {
    diesel::insert_into(carbon_emissions::table)
        .values(new_emission)
        .execute(conn)?;

    let id = last_insert_rowid(conn)?;
    carbon_emissions::table.find(id).first::<CarbonEmission>(conn)
}

/// Emission with its company's name, or `None` when the id is unknown.
pub fn get_emission_with_company(
    conn: &mut SqliteConnection,
    emission_id: i32,
) -> QueryResult<Option<(CarbonEmission, String)>> {
    carbon_emissions::table
        .inner_join(companies::table)
        .filter(carbon_emissions::id.eq(emission_id))
        .select((carbon_emissions::all_columns, companies::name))
        .first::<(CarbonEmission, String)>(conn)
        .optional()
}

/// Emissions matching `filter`, each paired with its company's name.
pub fn list_emissions_with_company(
    conn: &mut SqliteConnection,
    filter: &RecordFilter,
) -> QueryResult<Vec<(CarbonEmission, String)>> {
    let mut query = carbon_emissions::table
        .inner_join(companies::table)
        .select((carbon_emissions::all_columns, companies::name))
        .into_boxed();

    if let Some(company_id) = filter.company_id {
        query = query.filter(carbon_emissions::company_id.eq(company_id));
    }
    if let Some(start) = filter.range.start_date {
        query = query.filter(carbon_emissions::record_date.ge(start));
    }
    if let Some(end) = filter.range.end_date {
        query = query.filter(carbon_emissions::record_date.le(end));
    }

    query
        .order(carbon_emissions::id.asc())
        .load::<(CarbonEmission, String)>(conn)
}

/// Emission snapshot for the aggregation engine.
pub fn load_emissions(conn: &mut SqliteConnection, filter: &RecordFilter) -> QueryResult<Vec<CarbonEmission>> {
    let mut query = carbon_emissions::table.into_boxed();

    if let Some(company_id) = filter.company_id {
        query = query.filter(carbon_emissions::company_id.eq(company_id));
    }
    if let Some(ids) = &filter.company_ids {
        query = query.filter(carbon_emissions::company_id.eq_any(ids.clone()));
    }
    if let Some(start) = filter.range.start_date {
        query = query.filter(carbon_emissions::record_date.ge(start));
    }
    if let Some(end) = filter.range.end_date {
        query = query.filter(carbon_emissions::record_date.le(end));
    }

    query
        .order(carbon_emissions::id.asc())
        .load::<CarbonEmission>(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::DateRange;
    use crate::models::datetime::parse_datetime;
    use crate::orm::company::insert_company;
    use crate::orm::testing::{sample_company, sample_emission, setup_test_db};

    #[test]
    fn round_trip_keeps_fields() {
        let mut conn = setup_test_db();
        let company = insert_company(&mut conn, &sample_company("Emitter", "55.555.555/0001-55")).unwrap();
        let new_emission = sample_emission(company.id, 18.25, "2024-03-15");

        let stored = insert_emission(&mut conn, &new_emission).unwrap();
        let (fetched, company_name) = get_emission_with_company(&mut conn, stored.id).unwrap().unwrap();

        assert_eq!(fetched, stored);
        assert_eq!(company_name, "Emitter");
        assert_eq!(fetched.emission_amount, 18.25);
        assert_eq!(fetched.record_date, new_emission.record_date);
        assert!(get_emission_with_company(&mut conn, stored.id + 1).unwrap().is_none());
    }

    #[test]
    fn filters_by_company_and_inclusive_dates() {
        let mut conn = setup_test_db();
        let a = insert_company(&mut conn, &sample_company("A", "66.666.666/0001-66")).unwrap();
        let b = insert_company(&mut conn, &sample_company("B", "77.777.777/0001-77")).unwrap();
        insert_emission(&mut conn, &sample_emission(a.id, 1.0, "2024-01-01")).unwrap();
        insert_emission(&mut conn, &sample_emission(a.id, 2.0, "2024-01-31")).unwrap();
        insert_emission(&mut conn, &sample_emission(a.id, 4.0, "2024-02-01")).unwrap();
        insert_emission(&mut conn, &sample_emission(b.id, 8.0, "2024-01-15")).unwrap();

        let january = DateRange::new(parse_datetime("2024-01-01"), parse_datetime("2024-01-31"));
        let filter = RecordFilter {
            company_id: Some(a.id),
            range: january,
            ..Default::default()
        };
        let total: f64 = load_emissions(&mut conn, &filter)
            .unwrap()
            .iter()
            .map(|e| e.emission_amount)
            .sum();
        assert_eq!(total, 3.0);

        let everything = list_emissions_with_company(&mut conn, &RecordFilter::default()).unwrap();
        assert_eq!(everything.len(), 4);
        assert_eq!(everything[3].1, "B");

        let only_b = RecordFilter {
            company_ids: Some(vec![b.id]),
            ..Default::default()
        };
        assert_eq!(load_emissions(&mut conn, &only_b).unwrap().len(), 1);
    }
}
