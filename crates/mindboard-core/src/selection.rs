//! Selection state machine
//!
//! Four mutually exclusive modes: NONE, ROW (a highlighted respondent),
//! COURSE_AGE (heat map cells) and CATEGORY (a tree map leaf). Entering a
//! mode always wipes the previous one; the returned `Transition` tells the
//! controller whether the clear cascade must run before the new state is
//! applied.

use crate::models::{CourseAge, MentalHealthCategory, Row, RowId, RowKey};
use crate::store::RowFilter;
use std::collections::BTreeSet;
use std::fmt;

/// Filter mechanism currently driving the working set
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ActiveFilter {
    #[default]
    None,
    CourseAge(Vec<CourseAge>),
    Category(MentalHealthCategory),
}

impl ActiveFilter {
    /// Store predicate for this filter
    pub fn row_filter(&self, threshold: u8) -> RowFilter {
        match self {
            ActiveFilter::None => RowFilter::All,
            ActiveFilter::CourseAge(pairs) => RowFilter::CourseAge(pairs.clone()),
            ActiveFilter::Category(category) => RowFilter::Category {
                category: *category,
                threshold,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionMode {
    None,
    Row,
    CourseAge,
    Category,
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SelectionMode::None => "NONE",
            SelectionMode::Row => "ROW",
            SelectionMode::CourseAge => "COURSE_AGE",
            SelectionMode::Category => "CATEGORY",
        })
    }
}

/// What the controller must do after a selection change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing to do
    Unchanged,
    /// Back to NONE; run the clear cascade
    Cleared,
    /// Entered `mode`; run the clear cascade, then apply the new filter
    Entered(SelectionMode),
    /// Same mode, new parameters; apply the new filter without clearing
    Refined(SelectionMode),
}

impl Transition {
    pub fn requires_clear(&self) -> bool {
        matches!(self, Transition::Cleared | Transition::Entered(_))
    }
}

/// Highlighted row, clicked rows and the active filter
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    highlighted: Option<(Row, RowKey)>,
    clicked_rows: BTreeSet<RowId>,
    active_filter: ActiveFilter,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> SelectionMode {
        match (&self.active_filter, &self.highlighted) {
            (ActiveFilter::CourseAge(_), _) => SelectionMode::CourseAge,
            (ActiveFilter::Category(_), _) => SelectionMode::Category,
            (ActiveFilter::None, Some(_)) => SelectionMode::Row,
            (ActiveFilter::None, None) => SelectionMode::None,
        }
    }

    pub fn highlighted_row(&self) -> Option<&Row> {
        self.highlighted.as_ref().map(|(row, _)| row)
    }

    pub fn highlighted_key(&self) -> Option<&RowKey> {
        self.highlighted.as_ref().map(|(_, key)| key)
    }

    /// True when `row` is the same respondent as the highlighted one
    pub fn is_highlighted(&self, row: &Row) -> bool {
        self.highlighted_key()
            .is_some_and(|key| *key == row.identity())
    }

    pub fn clicked_rows(&self) -> &BTreeSet<RowId> {
        &self.clicked_rows
    }

    pub fn is_clicked(&self, id: RowId) -> bool {
        self.clicked_rows.contains(&id)
    }

    pub fn active_filter(&self) -> &ActiveFilter {
        &self.active_filter
    }

    /// Heat map pairs in effect; empty outside COURSE_AGE
    pub fn selected_pairs(&self) -> &[CourseAge] {
        match &self.active_filter {
            ActiveFilter::CourseAge(pairs) => pairs,
            _ => &[],
        }
    }

    pub fn selected_category(&self) -> Option<MentalHealthCategory> {
        match self.active_filter {
            ActiveFilter::Category(category) => Some(category),
            _ => None,
        }
    }

    /// Reset to NONE
    pub fn clear(&mut self) -> Transition {
        *self = Self::default();
        Transition::Cleared
    }

    /// A single row was clicked. Clicking the highlighted row again clears.
    pub fn select_row(&mut self, row: Row) -> Transition {
        if self.mode() == SelectionMode::Row && self.is_highlighted(&row) {
            return self.clear();
        }

        let key = row.identity();
        *self = Self::default();
        self.clicked_rows.insert(row.id);
        self.highlighted = Some((row, key));
        Transition::Entered(SelectionMode::Row)
    }

    /// Heat map selection changed to `pairs` (the full list).
    ///
    /// An empty list clears. A new list while already in COURSE_AGE refines
    /// the selection in place.
    pub fn set_pairs(&mut self, pairs: Vec<CourseAge>) -> Transition {
        if pairs.is_empty() {
            return match self.mode() {
                SelectionMode::CourseAge => self.clear(),
                _ => Transition::Unchanged,
            };
        }

        if self.mode() == SelectionMode::CourseAge {
            if self.selected_pairs() == pairs.as_slice() {
                return Transition::Unchanged;
            }
            self.active_filter = ActiveFilter::CourseAge(pairs);
            return Transition::Refined(SelectionMode::CourseAge);
        }

        *self = Self::default();
        self.active_filter = ActiveFilter::CourseAge(pairs);
        Transition::Entered(SelectionMode::CourseAge)
    }

    /// Tree map leaf clicked. Clicking the selected leaf again clears.
    pub fn toggle_category(&mut self, category: MentalHealthCategory) -> Transition {
        if self.selected_category() == Some(category) {
            return self.clear();
        }

        *self = Self::default();
        self.active_filter = ActiveFilter::Category(category);
        Transition::Entered(SelectionMode::Category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::survey::fixtures::row;
    use crate::models::Course;

    #[test]
    fn test_starts_in_none() {
        let state = SelectionState::new();
        assert_eq!(state.mode(), SelectionMode::None);
        assert!(state.highlighted_row().is_none());
        assert!(state.selected_pairs().is_empty());
    }

    #[test]
    fn test_select_row_enters_row_mode() {
        let mut state = SelectionState::new();
        let transition = state.select_row(row(4, Course::Law, 20));

        assert_eq!(transition, Transition::Entered(SelectionMode::Row));
        assert!(transition.requires_clear());
        assert_eq!(state.mode(), SelectionMode::Row);
        assert!(state.is_clicked(RowId(4)));
        assert_eq!(state.active_filter().row_filter(3), RowFilter::All);
    }

    #[test]
    fn test_reclicking_same_row_clears() {
        let mut state = SelectionState::new();
        state.select_row(row(4, Course::Law, 20));
        assert_eq!(state.select_row(row(4, Course::Law, 20)), Transition::Cleared);
        assert_eq!(state.mode(), SelectionMode::None);
        assert!(state.clicked_rows().is_empty());
    }

    #[test]
    fn test_entering_course_age_wipes_row() {
        let mut state = SelectionState::new();
        state.select_row(row(4, Course::Law, 20));
        let transition = state.set_pairs(vec![CourseAge::new(Course::Law, 20)]);

        assert_eq!(transition, Transition::Entered(SelectionMode::CourseAge));
        assert!(state.highlighted_row().is_none());
        assert!(state.clicked_rows().is_empty());
    }

    #[test]
    fn test_more_pairs_refine_without_clear() {
        let mut state = SelectionState::new();
        state.set_pairs(vec![CourseAge::new(Course::Law, 20)]);
        let transition = state.set_pairs(vec![
            CourseAge::new(Course::Law, 20),
            CourseAge::new(Course::Medical, 21),
        ]);

        assert_eq!(transition, Transition::Refined(SelectionMode::CourseAge));
        assert!(!transition.requires_clear());
        assert_eq!(state.selected_pairs().len(), 2);
    }

    #[test]
    fn test_empty_pairs_return_to_none() {
        let mut state = SelectionState::new();
        state.set_pairs(vec![CourseAge::new(Course::Law, 20)]);
        assert_eq!(state.set_pairs(Vec::new()), Transition::Cleared);
        assert_eq!(state.mode(), SelectionMode::None);
    }

    #[test]
    fn test_empty_pairs_do_not_disturb_row_mode() {
        let mut state = SelectionState::new();
        state.select_row(row(1, Course::Law, 20));
        assert_eq!(state.set_pairs(Vec::new()), Transition::Unchanged);
        assert_eq!(state.mode(), SelectionMode::Row);
    }

    #[test]
    fn test_category_double_toggle_returns_to_none() {
        let mut state = SelectionState::new();
        let first = state.toggle_category(MentalHealthCategory::OnlyStress);
        assert_eq!(first, Transition::Entered(SelectionMode::Category));
        assert_eq!(
            state.active_filter().row_filter(3),
            RowFilter::Category {
                category: MentalHealthCategory::OnlyStress,
                threshold: 3
            }
        );

        let second = state.toggle_category(MentalHealthCategory::OnlyStress);
        assert_eq!(second, Transition::Cleared);
        assert_eq!(state.mode(), SelectionMode::None);
    }

    #[test]
    fn test_switching_category_reenters() {
        let mut state = SelectionState::new();
        state.toggle_category(MentalHealthCategory::All);
        let transition = state.toggle_category(MentalHealthCategory::None);
        assert_eq!(transition, Transition::Entered(SelectionMode::Category));
        assert_eq!(state.selected_category(), Some(MentalHealthCategory::None));
    }

    #[test]
    fn test_highlight_compares_by_identity() {
        let mut state = SelectionState::new();
        state.select_row(row(1, Course::Law, 20));

        // same answers, different load position
        assert!(state.is_highlighted(&row(7, Course::Law, 20)));
        assert!(!state.is_highlighted(&row(1, Course::Law, 21)));
    }
}
