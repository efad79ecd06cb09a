//! Data models for mindboard

pub mod aggregate;
pub mod category;
pub mod survey;

pub use aggregate::{AggregateTable, CourseAge, LevelCounts, MinMax, TableRow};
pub use category::{CategoryGroup, MentalHealthCategory};
pub use survey::{row_identity, CounselingUse, Course, Indicator, Level, Row, RowId, RowKey};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of the two well-being views is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Aggregate circle heat map
    Overall,
    /// Per-category mini bar charts
    #[default]
    Listed,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Overall => ViewMode::Listed,
            ViewMode::Listed => ViewMode::Overall,
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Overall => f.write_str("Overall"),
            ViewMode::Listed => f.write_str("Listed"),
        }
    }
}
