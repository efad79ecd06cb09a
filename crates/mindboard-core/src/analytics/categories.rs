//! Mental-health category breakdown (tree map leaves)

use super::grouping::round_to;
use crate::models::{MentalHealthCategory, Row};
use serde::Serialize;

/// One tree map leaf
#[derive(Debug, Clone, Serialize)]
pub struct CategoryShare {
    pub category: MentalHealthCategory,
    pub count: usize,
    /// Share of the input rows, 2 decimals
    pub percent: f64,
    #[serde(skip)]
    pub rows: Vec<Row>,
}

impl CategoryShare {
    pub fn label(&self) -> String {
        format!("{} ({:.2}%)", self.category.abbreviation(), self.percent)
    }
}

/// Partition rows into the eight categories at `threshold`.
///
/// Empty categories are skipped. Leaves are ordered by group (all, none,
/// one of three, two of three) and by count descending within a group.
pub fn category_breakdown(rows: &[Row], threshold: u8) -> Vec<CategoryShare> {
    let mut buckets: Vec<(MentalHealthCategory, Vec<Row>)> = MentalHealthCategory::ALL
        .into_iter()
        .map(|c| (c, Vec::new()))
        .collect();

    for row in rows {
        let category = MentalHealthCategory::classify(row, threshold);
        if let Some((_, members)) = buckets.iter_mut().find(|(c, _)| *c == category) {
            members.push(row.clone());
        }
    }

    let total = rows.len();
    let mut leaves: Vec<CategoryShare> = buckets
        .into_iter()
        .filter(|(_, members)| !members.is_empty())
        .map(|(category, members)| CategoryShare {
            category,
            count: members.len(),
            percent: round_to(members.len() as f64 / total as f64 * 100.0, 2),
            rows: members,
        })
        .collect();

    // stable: equal counts keep canonical category order
    leaves.sort_by(|a, b| {
        a.category
            .group()
            .cmp(&b.category.group())
            .then(b.count.cmp(&a.count))
    });
    leaves
}
