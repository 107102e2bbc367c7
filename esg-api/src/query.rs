//! List query options and the filter, sort and paginate pipeline.
//!
//! List endpoints accept a common set of query parameters (`page`,
//! `pageSize`, `searchTerm`, `startDate`, `endDate`, `sortBy`,
//! `sortDirection`, `companyId`). Date and company filters are pushed down to
//! SQL by the ORM layer; free-text search, sorting and paging run over the
//! loaded rows through [`Listable`], so each entity only declares which
//! fields it searches and how its sort fields compare.

use std::cmp::Ordering;

use rocket::form::FromForm;

use crate::aggregation::DateRange;
use crate::error::EsgError;
use crate::models::datetime::parse_datetime;
use crate::response::PagedResult;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Query options shared by every list endpoint.
#[derive(FromForm, Debug, Clone, Default)]
pub struct ListQuery {
    /// 1-based page number
    pub page: Option<i64>,

    /// Records per page, capped at [`MAX_PAGE_SIZE`]
    #[field(name = "pageSize")]
    pub page_size: Option<i64>,

    /// Case-insensitive substring matched against the entity's search fields
    #[field(name = "searchTerm")]
    pub search_term: Option<String>,

    #[field(name = "startDate")]
    pub start_date: Option<String>,

    #[field(name = "endDate")]
    pub end_date: Option<String>,

    #[field(name = "sortBy")]
    pub sort_by: Option<String>,

    /// `desc` sorts descending, anything else ascending
    #[field(name = "sortDirection")]
    pub sort_direction: Option<String>,

    #[field(name = "companyId")]
    pub company_id: Option<i32>,
}

/// Company and date filters accepted by the statistics endpoints.
#[derive(FromForm, Debug, Clone, Default)]
pub struct FilterQuery {
    #[field(name = "companyId")]
    pub company_id: Option<i32>,

    #[field(name = "startDate")]
    pub start_date: Option<String>,

    #[field(name = "endDate")]
    pub end_date: Option<String>,
}

impl FilterQuery {
    pub fn date_range(&self) -> Result<DateRange, EsgError> {
        Ok(DateRange::new(
            parse_date_param("startDate", self.start_date.as_deref())?,
            parse_date_param("endDate", self.end_date.as_deref())?,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(d) if d.trim().eq_ignore_ascii_case("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// A named sort key an entity can be ordered by.
pub trait SortField: Sized + Copy {
    /// Case-insensitive lookup; unknown names yield `None`.
    fn parse(name: &str) -> Option<Self>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec<F> {
    /// `None` selects the entity's default ordering.
    pub field: Option<F>,
    pub direction: SortDirection,
}

/// Row type that can go through [`run_pipeline`].
pub trait Listable {
    type Field: SortField;

    /// `term` is already lowercased.
    fn matches(&self, term: &str) -> bool;

    fn compare_by(&self, other: &Self, field: Self::Field) -> Ordering;

    /// Ordering used when no recognised sort field was requested. It is not
    /// affected by the requested direction.
    fn default_order(&self, other: &Self) -> Ordering;
}

impl ListQuery {
    pub fn pagination(&self) -> Result<Pagination, EsgError> {
        let page = self.page.unwrap_or(1);
        if page < 1 {
            return Err(EsgError::bad_request("The page must be 1 or greater"));
        }
        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size < 1 {
            return Err(EsgError::bad_request("The page size must be 1 or greater"));
        }
        Ok(Pagination {
            page,
            page_size: page_size.min(MAX_PAGE_SIZE),
        })
    }

    pub fn date_range(&self) -> Result<DateRange, EsgError> {
        Ok(DateRange::new(
            parse_date_param("startDate", self.start_date.as_deref())?,
            parse_date_param("endDate", self.end_date.as_deref())?,
        ))
    }

    /// Normalised search term, or `None` when blank.
    pub fn search(&self) -> Option<String> {
        self.search_term
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
    }

    pub fn sort<F: SortField>(&self) -> SortSpec<F> {
        SortSpec {
            field: self.sort_by.as_deref().and_then(F::parse),
            direction: SortDirection::parse(self.sort_direction.as_deref()),
        }
    }
}

/// Parses an optional date query parameter. Blank values count as absent.
pub fn parse_date_param(name: &str, raw: Option<&str>) -> Result<Option<chrono::NaiveDateTime>, EsgError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => parse_datetime(value)
            .map(Some)
            .ok_or_else(|| EsgError::bad_request(format!("Invalid {} '{}'", name, value))),
    }
}

/// Filters by `search`, orders by `sort` and cuts out the requested page.
pub fn run_pipeline<T: Listable>(
    items: Vec<T>,
    search: Option<&str>,
    sort: SortSpec<T::Field>,
    pagination: Pagination,
) -> PagedResult<T> {
    let mut rows: Vec<T> = match search {
        Some(term) => items.into_iter().filter(|row| row.matches(term)).collect(),
        None => items,
    };

    match sort.field {
        Some(field) => rows.sort_by(|a, b| sort.direction.apply(a.compare_by(b, field))),
        None => rows.sort_by(|a, b| a.default_order(b)),
    }

    paginate(rows, pagination)
}

pub fn paginate<T>(rows: Vec<T>, pagination: Pagination) -> PagedResult<T> {
    let total_records = rows.len() as i64;
    let total_pages = (total_records + pagination.page_size - 1) / pagination.page_size;
    let skip = ((pagination.page - 1) * pagination.page_size) as usize;

    let data: Vec<T> = rows
        .into_iter()
        .skip(skip)
        .take(pagination.page_size as usize)
        .collect();

    PagedResult {
        data,
        current_page: pagination.page,
        page_size: pagination.page_size,
        total_pages,
        total_records,
        has_previous_page: pagination.page > 1,
        has_next_page: pagination.page < total_pages,
    }
}

/// Case-insensitive substring test used by [`Listable::matches`] impls.
pub fn contains_term(haystack: &str, term: &str) -> bool {
    haystack.to_lowercase().contains(term)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum NumberField {
        Value,
    }

    impl SortField for NumberField {
        fn parse(name: &str) -> Option<Self> {
            name.eq_ignore_ascii_case("value").then_some(NumberField::Value)
        }
    }

    #[derive(Debug, PartialEq)]
    struct Row(i32, &'static str);

    impl Listable for Row {
        type Field = NumberField;

        fn matches(&self, term: &str) -> bool {
            contains_term(self.1, term)
        }

        fn compare_by(&self, other: &Self, _field: NumberField) -> Ordering {
            self.0.cmp(&other.0)
        }

        fn default_order(&self, other: &Self) -> Ordering {
            other.1.cmp(self.1)
        }
    }

    fn rows() -> Vec<Row> {
        vec![Row(3, "gamma"), Row(1, "Alpha"), Row(2, "beta"), Row(4, "alphabet")]
    }

    #[test]
    fn defaults_and_caps() {
        let query = ListQuery { ..Default::default() };
        assert_eq!(query.pagination().unwrap(), Pagination::default());

        let query = ListQuery {
            page_size: Some(500),
            ..Default::default()
        };
        assert_eq!(query.pagination().unwrap().page_size, MAX_PAGE_SIZE);

        let query = ListQuery {
            page: Some(0),
            ..Default::default()
        };
        assert!(query.pagination().is_err());
    }

    #[test]
    fn date_parameters_must_parse() {
        let query = ListQuery {
            start_date: Some("2024-01-01".into()),
            end_date: Some("not a date".into()),
            ..Default::default()
        };
        assert!(matches!(query.date_range(), Err(EsgError::BadRequest(_))));

        let query = ListQuery {
            start_date: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(query.date_range().unwrap(), DateRange::default());
    }

    #[test]
    fn search_is_case_insensitive() {
        let query = ListQuery {
            search_term: Some(" ALPHA ".into()),
            ..Default::default()
        };
        let page = run_pipeline(rows(), query.search().as_deref(), query.sort(), Pagination::default());
        assert_eq!(page.data, vec![Row(4, "alphabet"), Row(1, "Alpha")]);
        assert_eq!(page.total_records, 2);
    }

    #[test]
    fn sorts_by_field_and_direction() {
        let query = ListQuery {
            sort_by: Some("VALUE".into()),
            sort_direction: Some("asc".into()),
            ..Default::default()
        };
        let page = run_pipeline(rows(), None, query.sort(), Pagination::default());
        let order: Vec<i32> = page.data.iter().map(|r| r.0).collect();
        assert_eq!(order, vec![1, 2, 3, 4]);

        let query = ListQuery {
            sort_by: Some("value".into()),
            sort_direction: Some("DESC".into()),
            ..Default::default()
        };
        let page = run_pipeline(rows(), None, query.sort(), Pagination::default());
        let order: Vec<i32> = page.data.iter().map(|r| r.0).collect();
        assert_eq!(order, vec![4, 3, 2, 1]);

        let query = ListQuery {
            sort_by: Some("value".into()),
            ..Default::default()
        };
        let page = run_pipeline(rows(), None, query.sort(), Pagination::default());
        let order: Vec<i32> = page.data.iter().map(|r| r.0).collect();
        assert_eq!(order, vec![1, 2, 3, 4]);
    }

    #[test]
    fn direction_defaults_to_ascending() {
        assert_eq!(SortDirection::parse(None), SortDirection::Asc);
        assert_eq!(SortDirection::parse(Some("ascending")), SortDirection::Asc);
        assert_eq!(SortDirection::parse(Some(" Desc ")), SortDirection::Desc);
    }

    #[test]
    fn unknown_sort_field_uses_default_order() {
        let query = ListQuery {
            sort_by: Some("colour".into()),
            sort_direction: Some("asc".into()),
            ..Default::default()
        };
        let page = run_pipeline(rows(), None, query.sort(), Pagination::default());
        let names: Vec<&str> = page.data.iter().map(|r| r.1).collect();
        assert_eq!(names, vec!["gamma", "beta", "alphabet", "Alpha"]);
    }

    #[test]
    fn pages_report_their_neighbours() {
        let pagination = Pagination { page: 2, page_size: 3 };
        let page = paginate((1..=7).collect::<Vec<i32>>(), pagination);
        assert_eq!(page.data, vec![4, 5, 6]);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_records, 7);
        assert!(page.has_previous_page);
        assert!(page.has_next_page);

        let empty = paginate(Vec::<i32>::new(), Pagination::default());
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next_page);
        assert!(!empty.has_previous_page);
    }
}
