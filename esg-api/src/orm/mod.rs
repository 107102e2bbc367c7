pub mod company;
pub mod db;
pub mod emission;
pub mod energy;
pub mod login;
pub mod report;
pub mod testing;
pub mod user;

pub use db::*;

use crate::aggregation::DateRange;

/// Row selection shared by the emission and energy queries.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub company_id: Option<i32>,
    pub company_ids: Option<Vec<i32>>,
    pub range: DateRange,
}
