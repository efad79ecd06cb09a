//! Dataset store: immutable original rows plus the derived working set
//!
//! The working set is always recomputed from the original by predicate,
//! never edited in place. Sets are shared as `Arc<[Row]>` so widgets can
//! hold a snapshot cheaply.

use crate::models::{CourseAge, MentalHealthCategory, Row};
use std::sync::Arc;
use tracing::{debug, warn};

/// A shared, immutable slice of rows
pub type WorkingSet = Arc<[Row]>;

/// Predicate that narrows the original dataset
#[derive(Debug, Clone, PartialEq)]
pub enum RowFilter {
    /// Every row
    All,
    /// Rows matching any of the (course, age) pairs; empty means every row
    CourseAge(Vec<CourseAge>),
    /// Rows classified into `category` at `threshold`
    Category {
        category: MentalHealthCategory,
        threshold: u8,
    },
}

impl RowFilter {
    pub fn matches(&self, row: &Row) -> bool {
        match self {
            RowFilter::All => true,
            RowFilter::CourseAge(pairs) => {
                pairs.is_empty()
                    || pairs
                        .iter()
                        .any(|p| p.course == row.course && p.age == row.age)
            }
            RowFilter::Category {
                category,
                threshold,
            } => MentalHealthCategory::classify(row, *threshold) == *category,
        }
    }

    /// True when the filter keeps every row regardless of data
    pub fn is_identity(&self) -> bool {
        match self {
            RowFilter::All => true,
            RowFilter::CourseAge(pairs) => pairs.is_empty(),
            RowFilter::Category { .. } => false,
        }
    }
}

/// Canonical rows and the current working subset
#[derive(Debug, Clone)]
pub struct DatasetStore {
    original: WorkingSet,
    working: WorkingSet,
    filter: RowFilter,
    loaded: bool,
}

impl Default for DatasetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetStore {
    pub fn new() -> Self {
        let empty: WorkingSet = Arc::from(Vec::new());
        Self {
            original: empty.clone(),
            working: empty,
            filter: RowFilter::All,
            loaded: false,
        }
    }

    /// Store the loaded rows. Only the first call has an effect.
    pub fn load(&mut self, rows: Vec<Row>) -> bool {
        if self.loaded {
            warn!(
                existing = self.original.len(),
                ignored = rows.len(),
                "Dataset already loaded, ignoring reload"
            );
            return false;
        }

        let rows: WorkingSet = Arc::from(rows);
        debug!(rows = rows.len(), "Dataset loaded");
        self.original = rows.clone();
        self.working = rows;
        self.filter = RowFilter::All;
        self.loaded = true;
        true
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Install the subset of the original rows matching `filter`.
    ///
    /// Matching nothing yields an empty set; that is a valid state.
    pub fn apply_filter(&mut self, filter: RowFilter) -> WorkingSet {
        if filter.is_identity() {
            return self.reset();
        }

        let subset: Vec<Row> = self
            .original
            .iter()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect();

        debug!(
            matched = subset.len(),
            total = self.original.len(),
            "Working set filtered"
        );
        self.working = Arc::from(subset);
        self.filter = filter;
        self.working.clone()
    }

    /// Restore the working set to the full original dataset
    pub fn reset(&mut self) -> WorkingSet {
        self.working = self.original.clone();
        self.filter = RowFilter::All;
        self.working.clone()
    }

    pub fn original(&self) -> &WorkingSet {
        &self.original
    }

    pub fn working(&self) -> &WorkingSet {
        &self.working
    }

    pub fn filter(&self) -> &RowFilter {
        &self.filter
    }

    /// True when the working set is narrower than the original
    pub fn is_filtered(&self) -> bool {
        !self.filter.is_identity()
    }

    /// Number of rows in the original dataset
    pub fn len(&self) -> usize {
        self.original.len()
    }

    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::survey::fixtures::row;
    use crate::models::Course;

    fn store() -> DatasetStore {
        let mut store = DatasetStore::new();
        store.load(vec![
            row(0, Course::Law, 20),
            row(1, Course::Medical, 21),
            row(2, Course::Law, 21),
            row(3, Course::Law, 20),
        ]);
        store
    }

    #[test]
    fn test_load_is_idempotent() {
        let mut store = store();
        assert!(!store.load(vec![row(9, Course::Others, 19)]));
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_course_age_filter_selects_exact_pairs() {
        let mut store = store();
        let working = store.apply_filter(RowFilter::CourseAge(vec![CourseAge::new(Course::Law, 20)]));

        assert_eq!(working.len(), 2);
        assert!(working.iter().all(|r| r.course == Course::Law && r.age == 20));
        assert_eq!(store.original().len(), 4);
        assert!(store.is_filtered());
    }

    #[test]
    fn test_empty_pairs_yield_full_dataset() {
        let mut store = store();
        store.apply_filter(RowFilter::CourseAge(vec![CourseAge::new(Course::Law, 20)]));
        let working = store.apply_filter(RowFilter::CourseAge(Vec::new()));

        assert_eq!(working.len(), 4);
        assert!(!store.is_filtered());
    }

    #[test]
    fn test_filter_matching_nothing_is_empty() {
        let mut store = store();
        let working = store.apply_filter(RowFilter::CourseAge(vec![CourseAge::new(Course::Business, 24)]));
        assert!(working.is_empty());
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_union_of_pairs() {
        let mut store = store();
        let working = store.apply_filter(RowFilter::CourseAge(vec![
            CourseAge::new(Course::Law, 20),
            CourseAge::new(Course::Medical, 21),
        ]));
        assert_eq!(working.len(), 3);
    }

    #[test]
    fn test_reset_restores_original() {
        let mut store = store();
        store.apply_filter(RowFilter::Category {
            category: MentalHealthCategory::All,
            threshold: 3,
        });
        assert!(store.working().is_empty());

        let working = store.reset();
        assert_eq!(working.len(), 4);
        assert_eq!(store.filter(), &RowFilter::All);
    }
}
