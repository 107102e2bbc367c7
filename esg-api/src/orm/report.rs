use std::cmp::Ordering;

use diesel::prelude::*;

use super::db::last_insert_rowid;
use crate::models::{NewSustainabilityReport, SustainabilityReport};
use crate::query::{Listable, SortField, contains_term};
use crate::schema::{companies, sustainability_reports};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportSortField {
    Title,
    Year,
    Quarter,
    EsgScore,
    Emissions,
    Energy,
    Company,
}

impl SortField for ReportSortField {
    fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "title" => Some(ReportSortField::Title),
            "year" => Some(ReportSortField::Year),
            "quarter" => Some(ReportSortField::Quarter),
            "esgscore" => Some(ReportSortField::EsgScore),
            "emissions" => Some(ReportSortField::Emissions),
            "energy" => Some(ReportSortField::Energy),
            "company" => Some(ReportSortField::Company),
            _ => None,
        }
    }
}

impl Listable for (SustainabilityReport, String) {
    type Field = ReportSortField;

    fn matches(&self, term: &str) -> bool {
        let (r, company_name) = self;
        contains_term(&r.title, term)
            || contains_term(&r.esg_score, term)
            || contains_term(company_name, term)
    }

    fn compare_by(&self, other: &Self, field: ReportSortField) -> Ordering {
        let (a, b) = (&self.0, &other.0);
        match field {
            ReportSortField::Title => a.title.cmp(&b.title),
            ReportSortField::Year => a.year.cmp(&b.year),
            ReportSortField::Quarter => a.quarter.cmp(&b.quarter),
            ReportSortField::EsgScore => a.esg_score.cmp(&b.esg_score),
            ReportSortField::Emissions => a.total_carbon_emissions.total_cmp(&b.total_carbon_emissions),
            ReportSortField::Energy => a.total_energy_consumption.total_cmp(&b.total_energy_consumption),
            ReportSortField::Company => self.1.cmp(&other.1),
        }
    }

    /// Most recent period first.
    fn default_order(&self, other: &Self) -> Ordering {
        (other.0.year, other.0.quarter).cmp(&(self.0.year, self.0.quarter))
    }
}

/// Column filters for the report listing.
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub company_id: Option<i32>,
    pub year: Option<i32>,
    pub quarter: Option<i32>,
}

pub fn insert_report(
    conn: &mut SqliteConnection,
    new_report: &NewSustainabilityReport,
) -> QueryResult<SustainabilityReport> {
    diesel::insert_into(sustainability_reports::table)
        .values(new_report)
        .execute(conn)?;

    let id = last_insert_rowid(conn)?;
    sustainability_reports::table.find(id).first::<SustainabilityReport>(conn)
}

pub fn report_exists_for_period(
    conn: &mut SqliteConnection,
    company_id: i32,
    year: i32,
    quarter: i32,
) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(
        sustainability_reports::table
            .filter(sustainability_reports::company_id.eq(company_id))
            .filter(sustainability_reports::year.eq(year))
            .filter(sustainability_reports::quarter.eq(quarter)),
    ))
    .get_result(conn)
}

pub fn get_report_with_company(
    conn: &mut SqliteConnection,
    report_id: i32,
) -> QueryResult<Option<(SustainabilityReport, String)>> {
    sustainability_reports::table
        .inner_join(companies::table)
        .filter(sustainability_reports::id.eq(report_id))
        .select((sustainability_reports::all_columns, companies::name))
        .first::<(SustainabilityReport, String)>(conn)
        .optional()
}

pub fn list_reports_with_company(
    conn: &mut SqliteConnection,
    filter: &ReportFilter,
) -> QueryResult<Vec<(SustainabilityReport, String)>> {
    let mut query = sustainability_reports::table
        .inner_join(companies::table)
        .select((sustainability_reports::all_columns, companies::name))
        .into_boxed();

    if let Some(company_id) = filter.company_id {
        query = query.filter(sustainability_reports::company_id.eq(company_id));
    }
    if let Some(year) = filter.year {
        query = query.filter(sustainability_reports::year.eq(year));
    }
    if let Some(quarter) = filter.quarter {
        query = query.filter(sustainability_reports::quarter.eq(quarter));
    }

    query
        .order(sustainability_reports::id.asc())
        .load::<(SustainabilityReport, String)>(conn)
}

/// All reports, optionally limited to the given companies.
pub fn load_reports(
    conn: &mut SqliteConnection,
    company_ids: Option<&[i32]>,
) -> QueryResult<Vec<SustainabilityReport>> {
    let mut query = sustainability_reports::table.into_boxed();
    if let Some(ids) = company_ids {
        query = query.filter(sustainability_reports::company_id.eq_any(ids.to_vec()));
    }
    query
        .order(sustainability_reports::id.asc())
        .load::<SustainabilityReport>(conn)
}

pub fn count_reports(conn: &mut SqliteConnection) -> QueryResult<i64> {
    sustainability_reports::table.count().get_result(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::company::insert_company;
    use crate::orm::testing::{sample_company, sample_report, setup_test_db};

    #[test]
    fn period_lookup_is_scoped_to_company() {
        let mut conn = setup_test_db();
        let a = insert_company(&mut conn, &sample_company("A", "10.000.000/0001-10")).unwrap();
        let b = insert_company(&mut conn, &sample_company("B", "20.000.000/0001-20")).unwrap();
        insert_report(&mut conn, &sample_report(a.id, 2024, 2)).unwrap();

        assert!(report_exists_for_period(&mut conn, a.id, 2024, 2).unwrap());
        assert!(!report_exists_for_period(&mut conn, a.id, 2024, 3).unwrap());
        assert!(!report_exists_for_period(&mut conn, b.id, 2024, 2).unwrap());
    }

    #[test]
    fn storage_allows_duplicate_periods() {
        let mut conn = setup_test_db();
        let a = insert_company(&mut conn, &sample_company("A", "30.000.000/0001-30")).unwrap();
        insert_report(&mut conn, &sample_report(a.id, 2024, 1)).unwrap();
        insert_report(&mut conn, &sample_report(a.id, 2024, 1)).unwrap();

        assert_eq!(count_reports(&mut conn).unwrap(), 2);
    }

    #[test]
    fn list_filters_by_year_and_quarter() {
        let mut conn = setup_test_db();
        let a = insert_company(&mut conn, &sample_company("A", "40.000.000/0001-40")).unwrap();
        insert_report(&mut conn, &sample_report(a.id, 2023, 4)).unwrap();
        insert_report(&mut conn, &sample_report(a.id, 2024, 1)).unwrap();
        insert_report(&mut conn, &sample_report(a.id, 2024, 2)).unwrap();

        let filter = ReportFilter {
            year: Some(2024),
            ..Default::default()
        };
        assert_eq!(list_reports_with_company(&mut conn, &filter).unwrap().len(), 2);

        let filter = ReportFilter {
            year: Some(2024),
            quarter: Some(2),
            company_id: Some(a.id),
        };
        let rows = list_reports_with_company(&mut conn, &filter).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].1, "A");
    }
}
