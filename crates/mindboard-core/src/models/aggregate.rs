//! Aggregate shapes consumed by the chart widgets

use super::survey::{Course, Indicator, Level};
use serde::{Serialize, Serializer};
use serde::ser::SerializeMap;
use std::fmt;

/// Level counts for one indicator, indexed by `Level::index()`
pub type LevelCounts = [u32; 3];

/// Nested count table: course -> indicator -> level -> count, plus `Total`.
///
/// Every course is present (zero-filled), so a lookup can never miss and
/// scale computations always see full coverage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateTable {
    courses: [[LevelCounts; 5]; 6],
    total: [LevelCounts; 5],
    course_rows: [u32; 6],
    rows: u32,
}

/// Row selector of an aggregate table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableRow {
    Course(Course),
    Total,
}

impl AggregateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one respondent's answers
    pub(crate) fn record(&mut self, course: Course, levels: [Level; 5]) {
        let c = course.index();
        for (i, level) in levels.iter().enumerate() {
            self.courses[c][i][level.index()] += 1;
            self.total[i][level.index()] += 1;
        }
        self.course_rows[c] += 1;
        self.rows += 1;
    }

    pub fn get(&self, row: TableRow, indicator: Indicator, level: Level) -> u32 {
        match row {
            TableRow::Course(course) => {
                self.courses[course.index()][indicator.index()][level.index()]
            }
            TableRow::Total => self.total[indicator.index()][level.index()],
        }
    }

    pub fn count(&self, course: Course, indicator: Indicator, level: Level) -> u32 {
        self.get(TableRow::Course(course), indicator, level)
    }

    pub fn total(&self, indicator: Indicator, level: Level) -> u32 {
        self.get(TableRow::Total, indicator, level)
    }

    /// String-keyed lookup; unknown course, indicator or level resolves to 0
    pub fn get_by_name(&self, course: &str, indicator: &str, level: &str) -> u32 {
        let row = if course == "Total" {
            Some(TableRow::Total)
        } else {
            Course::parse(course).map(TableRow::Course)
        };
        let indicator = Indicator::from_column(indicator);
        let level = Level::ALL.into_iter().find(|l| l.name() == level);

        match (row, indicator, level) {
            (Some(row), Some(indicator), Some(level)) => self.get(row, indicator, level),
            _ => 0,
        }
    }

    /// Number of rows counted for a course
    pub fn course_rows(&self, course: Course) -> u32 {
        self.course_rows[course.index()]
    }

    /// Number of rows counted overall
    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Min/max over every course leaf (Total excluded)
    pub fn course_min_max(&self) -> MinMax {
        MinMax::over(self.courses.iter().flatten().flatten().copied())
    }

    /// Min/max over the Total leaves
    pub fn total_min_max(&self) -> MinMax {
        MinMax::over(self.total.iter().flatten().copied())
    }
}

impl Serialize for AggregateTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Course::ALL.len() + 1))?;
        for course in Course::ALL {
            map.serialize_entry(course.name(), &IndicatorView(self, TableRow::Course(course)))?;
        }
        map.serialize_entry("Total", &IndicatorView(self, TableRow::Total))?;
        map.end()
    }
}

struct IndicatorView<'a>(&'a AggregateTable, TableRow);

impl Serialize for IndicatorView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Indicator::ALL.len()))?;
        for indicator in Indicator::ALL {
            let levels: std::collections::BTreeMap<&str, u32> = Level::ALL
                .into_iter()
                .map(|level| (level.name(), self.0.get(self.1, indicator, level)))
                .collect();
            map.serialize_entry(indicator.column(), &levels)?;
        }
        map.end()
    }
}

/// Inclusive value range used to size a value-to-visual scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MinMax {
    pub min: u32,
    pub max: u32,
}

impl MinMax {
    /// Range of the given values; `{0, 0}` when there are none
    pub fn over(values: impl IntoIterator<Item = u32>) -> Self {
        let mut iter = values.into_iter();
        let Some(first) = iter.next() else {
            return Self { min: 0, max: 0 };
        };
        iter.fold(Self { min: first, max: first }, |acc, v| Self {
            min: acc.min.min(v),
            max: acc.max.max(v),
        })
    }

    pub fn span(&self) -> u32 {
        self.max - self.min
    }
}

/// One (course, age) pair selected on the heat map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CourseAge {
    pub course: Course,
    pub age: u8,
}

impl CourseAge {
    pub fn new(course: Course, age: u8) -> Self {
        Self { course, age }
    }
}

impl fmt::Display for CourseAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.course, self.age)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moderate() -> [Level; 5] {
        [Level::Moderate; 5]
    }

    #[test]
    fn test_empty_table_is_zero_filled() {
        let table = AggregateTable::new();
        for course in Course::ALL {
            for indicator in Indicator::ALL {
                for level in Level::ALL {
                    assert_eq!(table.count(course, indicator, level), 0);
                }
            }
        }
        assert_eq!(table.course_min_max(), MinMax { min: 0, max: 0 });
        assert!(table.is_empty());
    }

    #[test]
    fn test_get_by_name_unknown_resolves_to_zero() {
        let mut table = AggregateTable::new();
        table.record(Course::Law, moderate());

        assert_eq!(table.get_by_name("Law", "Sleep_Quality", "Moderate"), 1);
        assert_eq!(table.get_by_name("Total", "Diet_Quality", "Moderate"), 1);
        assert_eq!(table.get_by_name("Art", "Sleep_Quality", "Moderate"), 0);
        assert_eq!(table.get_by_name("Law", "Happiness", "Moderate"), 0);
        assert_eq!(table.get_by_name("Law", "Sleep_Quality", "Extreme"), 0);
    }

    #[test]
    fn test_min_max_over_values() {
        assert_eq!(MinMax::over([3, 9, 1]), MinMax { min: 1, max: 9 });
        assert_eq!(MinMax::over(std::iter::empty()), MinMax { min: 0, max: 0 });
    }

    #[test]
    fn test_table_serializes_nested_shape() {
        let mut table = AggregateTable::new();
        table.record(Course::Medical, moderate());
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["Medical"]["Sleep_Quality"]["Moderate"], 1);
        assert_eq!(json["Total"]["Social_Support"]["Moderate"], 1);
        assert_eq!(json["Law"]["Sleep_Quality"]["High"], 0);
    }
}
