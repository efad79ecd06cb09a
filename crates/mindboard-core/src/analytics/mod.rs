//! Derived aggregations over a set of survey rows
//!
//! Everything here is a pure function of its input rows, so widgets can
//! recompute freely on every update without touching shared state.

use serde::Serialize;

use crate::config::DashboardConfig;
use crate::models::{AggregateTable, CounselingUse, MinMax, Row};

pub mod categories;
pub mod grouping;
pub mod tables;


pub use categories::{category_breakdown, CategoryShare};
pub use grouping::{
    count_by_key, mean_by_key, percent_by_key, round_to, KeyCount, KeyMean, KeyShare,
};
pub use tables::{course_age_counts, course_attribute_counts, min_max, HeatCell};

/// Financial stress levels shown in the dot matrix legend
pub const FINANCIAL_STRESS_LEVELS: [u8; 6] = [0, 1, 2, 3, 4, 5];

/// Counts and mean CGPA per counseling use
pub fn counseling_summary(
    rows: &[Row],
) -> (Vec<KeyCount<CounselingUse>>, Vec<KeyMean<CounselingUse>>) {
    let order: &[CounselingUse] = &CounselingUse::ORDER;
    let counts = count_by_key(rows, |r| r.counseling, Some(order));
    let means = mean_by_key(rows, |r| r.counseling, |r| r.cgpa, Some(order));
    (counts, means)
}

/// Every aggregate of a row set, computed together
#[derive(Debug, Clone, Serialize)]
pub struct SurveySummary {
    pub rows: usize,
    pub table: AggregateTable,
    pub range: MinMax,
    pub counseling: Vec<KeyCount<CounselingUse>>,
    pub cgpa_by_counseling: Vec<KeyMean<CounselingUse>>,
    pub financial_stress: Vec<KeyShare<u8>>,
    pub categories: Vec<CategoryShare>,
}

impl SurveySummary {
    pub fn compute(rows: &[Row], config: &DashboardConfig) -> Self {
        let table = course_attribute_counts(rows);
        let range = min_max(&table);
        let (counseling, cgpa_by_counseling) = counseling_summary(rows);

        Self {
            rows: rows.len(),
            range,
            table,
            counseling,
            cgpa_by_counseling,
            financial_stress: percent_by_key(
                rows,
                |r| r.financial_stress,
                Some(&FINANCIAL_STRESS_LEVELS[..]),
            ),
            categories: category_breakdown(rows, config.severity_threshold),
        }
    }
}
