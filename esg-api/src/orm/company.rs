use std::cmp::Ordering;

use chrono::NaiveDateTime;
use diesel::prelude::*;

use super::db::last_insert_rowid;
use crate::models::{Company, NewCompany};
use crate::query::{Listable, SortField, contains_term};
use crate::schema::{carbon_emissions, companies, energy_consumptions, sustainability_reports, users};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanySortField {
    Name,
    Industry,
    Employees,
}

impl SortField for CompanySortField {
    fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "name" => Some(CompanySortField::Name),
            "industry" => Some(CompanySortField::Industry),
            "employees" | "employeecount" => Some(CompanySortField::Employees),
            _ => None,
        }
    }
}

impl Listable for Company {
    type Field = CompanySortField;

    fn matches(&self, term: &str) -> bool {
        contains_term(&self.name, term)
            || contains_term(&self.cnpj, term)
            || contains_term(&self.industry, term)
            || contains_term(&self.city, term)
    }

    fn compare_by(&self, other: &Self, field: CompanySortField) -> Ordering {
        match field {
            CompanySortField::Name => self.name.cmp(&other.name),
            CompanySortField::Industry => self.industry.cmp(&other.industry),
            CompanySortField::Employees => self.employee_count.cmp(&other.employee_count),
        }
    }

    fn default_order(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

pub fn get_company_by_id(conn: &mut SqliteConnection, company_id: i32) -> QueryResult<Option<Company>> {
    companies::table
        .find(company_id)
        .first::<Company>(conn)
        .optional()
}

pub fn get_company_by_cnpj(conn: &mut SqliteConnection, tax_id: &str) -> QueryResult<Option<Company>> {
    companies::table
        .filter(companies::cnpj.eq(tax_id))
        .first::<Company>(conn)
        .optional()
}

pub fn company_exists(conn: &mut SqliteConnection, company_id: i32) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(companies::table.find(company_id))).get_result(conn)
}

pub fn get_all_companies(conn: &mut SqliteConnection) -> QueryResult<Vec<Company>> {
    companies::table.order(companies::id.asc()).load::<Company>(conn)
}

pub fn get_companies_by_ids(conn: &mut SqliteConnection, ids: &[i32]) -> QueryResult<Vec<Company>> {
    companies::table
        .filter(companies::id.eq_any(ids))
        .order(companies::id.asc())
        .load::<Company>(conn)
}

pub fn count_companies(conn: &mut SqliteConnection) -> QueryResult<i64> {
    companies::table.count().get_result(conn)
}

pub fn insert_company(conn: &mut SqliteConnection, new_company: &NewCompany) -> QueryResult<Company> {
    diesel::insert_into(companies::table)
        .values(new_company)
        .execute(conn)?;

    let id = last_insert_rowid(conn)?;
    companies::table.find(id).first::<Company>(conn)
}

/// Overwrites every editable column. `created_at` is preserved and
/// `updated_at` is set to `now`.
pub fn update_company(
    conn: &mut SqliteConnection,
    company_id: i32,
    changes: &NewCompany,
    now: NaiveDateTime,
) -> QueryResult<Option<Company>> {
    let updated = diesel::update(companies::table.find(company_id))
        .set((
            companies::name.eq(&changes.name),
            companies::cnpj.eq(&changes.cnpj),
            companies::industry.eq(&changes.industry),
            companies::address.eq(&changes.address),
            companies::city.eq(&changes.city),
            companies::state.eq(&changes.state),
            companies::zip_code.eq(&changes.zip_code),
            companies::contact_email.eq(&changes.contact_email),
            companies::contact_phone.eq(&changes.contact_phone),
            companies::employee_count.eq(changes.employee_count),
            companies::updated_at.eq(now),
        ))
        .execute(conn)?;

    if updated == 0 {
        return Ok(None);
    }
    get_company_by_id(conn, company_id)
}

/// Deletes a company together with its records and detaches its users.
///
/// The schema declares the same cascade, but SQLite only honours it on
/// connections with `PRAGMA foreign_keys` set, which is not guaranteed for
/// every pooled connection.
pub fn delete_company(conn: &mut SqliteConnection, company_id: i32) -> QueryResult<bool> {
    conn.transaction(|conn| {
        diesel::delete(carbon_emissions::table.filter(carbon_emissions::company_id.eq(company_id)))
            .execute(conn)?;
        diesel::delete(energy_consumptions::table.filter(energy_consumptions::company_id.eq(company_id)))
            .execute(conn)?;
        diesel::delete(
            sustainability_reports::table.filter(sustainability_reports::company_id.eq(company_id)),
        )
        .execute(conn)?;
        diesel::update(users::table.filter(users::company_id.eq(company_id)))
            .set(users::company_id.eq(None::<i32>))
            .execute(conn)?;

        let deleted = diesel::delete(companies::table.find(company_id)).execute(conn)?;
        Ok(deleted > 0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::testing::{sample_company, setup_test_db};

    #[test]
    fn insert_and_lookup() {
        let mut conn = setup_test_db();
        let company = insert_company(&mut conn, &sample_company("Test Co", "11.111.111/0001-11")).unwrap();

        assert!(company.id > 0);
        assert_eq!(company.name, "Test Co");
        assert!(company_exists(&mut conn, company.id).unwrap());
        assert!(!company_exists(&mut conn, company.id + 100).unwrap());
        assert_eq!(
            get_company_by_cnpj(&mut conn, "11.111.111/0001-11").unwrap().map(|c| c.id),
            Some(company.id)
        );
        assert_eq!(count_companies(&mut conn).unwrap(), 1);
    }

    #[test]
    fn cnpj_is_unique() {
        let mut conn = setup_test_db();
        insert_company(&mut conn, &sample_company("First", "22.222.222/0001-22")).unwrap();
        let dup = insert_company(&mut conn, &sample_company("Second", "22.222.222/0001-22"));
        assert!(dup.is_err());
    }

    #[test]
    fn update_preserves_creation_time() {
        let mut conn = setup_test_db();
        let company = insert_company(&mut conn, &sample_company("Before", "33.333.333/0001-33")).unwrap();
        let later = company.created_at + chrono::Duration::days(1);
        let mut changes = sample_company("After", "33.333.333/0001-33");
        changes.employee_count = 42;

        let updated = update_company(&mut conn, company.id, &changes, later).unwrap().unwrap();

        assert_eq!(updated.name, "After");
        assert_eq!(updated.employee_count, 42);
        assert_eq!(updated.created_at, company.created_at);
        assert_eq!(updated.updated_at, later);
        assert!(update_company(&mut conn, 999, &changes, later).unwrap().is_none());
    }

    #[test]
    fn delete_cascades_to_records() {
        use crate::orm::RecordFilter;
        use crate::orm::emission::{insert_emission, load_emissions};
        use crate::orm::testing::sample_emission;

        let mut conn = setup_test_db();
        let company = insert_company(&mut conn, &sample_company("Doomed", "44.444.444/0001-44")).unwrap();
        insert_emission(&mut conn, &sample_emission(company.id, 12.0, "2024-02-01")).unwrap();

        assert!(delete_company(&mut conn, company.id).unwrap());
        assert!(get_company_by_id(&mut conn, company.id).unwrap().is_none());
        assert!(load_emissions(&mut conn, &RecordFilter::default()).unwrap().is_empty());
        assert!(!delete_company(&mut conn, company.id).unwrap());
    }
}
