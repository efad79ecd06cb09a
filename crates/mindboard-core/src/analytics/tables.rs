//! Cross-tab aggregations: course x indicator x level and course x age

use crate::models::{AggregateTable, Course, CourseAge, Indicator, MinMax, Row};
use serde::Serialize;
use std::ops::RangeInclusive;

/// Build the course/indicator/level count table in a single pass
pub fn course_attribute_counts(rows: &[Row]) -> AggregateTable {
    let mut table = AggregateTable::new();
    for row in rows {
        table.record(row.course, Indicator::ALL.map(|indicator| row.level(indicator)));
    }
    table
}

/// Value range over the course leaves of `table` (Total excluded)
pub fn min_max(table: &AggregateTable) -> MinMax {
    table.course_min_max()
}

/// One heat map cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeatCell {
    pub pair: CourseAge,
    pub count: u32,
}

impl HeatCell {
    /// Colour bucket for `bucket_size` respondents per step, clamped to `buckets - 1`
    pub fn bucket(&self, bucket_size: u32, buckets: usize) -> usize {
        let step = (self.count / bucket_size.max(1)) as usize;
        step.min(buckets.saturating_sub(1))
    }
}

/// Course x age count grid, zero-filled for every course and age.
///
/// Cells come out row-major in `Course::HEAT_MAP_ORDER`, ages ascending.
/// Rows with an age outside `ages` are not counted.
pub fn course_age_counts(rows: &[Row], ages: RangeInclusive<u8>) -> Vec<HeatCell> {
    let width = ages.clone().count();
    let start = *ages.start();
    let mut counts = vec![[0u32; 6]; width];

    for row in rows.iter().filter(|r| ages.contains(&r.age)) {
        counts[usize::from(row.age - start)][row.course.index()] += 1;
    }

    Course::HEAT_MAP_ORDER
        .into_iter()
        .flat_map(|course| {
            let counts = &counts;
            ages.clone().map(move |age| HeatCell {
                pair: CourseAge::new(course, age),
                count: counts[usize::from(age - start)][course.index()],
            })
        })
        .collect()
}
