//! One dot per respondent, grouped by financial stress
//!
//! Every original row is drawn; rows outside the working set are dimmed
//! (`inactive`) rather than removed so the layout stays stable. Clicking a
//! dot selects that respondent.

use super::{
    background, background_pointer, hover, palette, ChartWidget, Layers, PointerAction,
    PointerOutcome, Tooltip, WidgetContext, WidgetFrame, WidgetId, BACKGROUND,
};
use crate::analytics::{percent_by_key, FINANCIAL_STRESS_LEVELS};
use crate::event::{DashboardEvent, Topic};
use crate::models::{Row, RowId};
use crate::scene::{Classes, Color, Element};
use std::collections::HashSet;

const MARGIN_LEFT: f64 = 10.0;
const MARGIN_TOP: f64 = 30.0;
const RADIUS: f64 = 4.0;
const SPACING: f64 = RADIUS * 2.0 + 2.0;
/// Vertical room for a group's legend line
const GROUP_HEADER: f64 = 18.0;
const GROUP_GAP: f64 = 8.0;

/// Green (no financial stress) to red (level 5)
const COLORS: [Color; 6] = [
    Color::hex(0x1a9850),
    Color::hex(0xa6d96a),
    Color::hex(0xffffbf),
    Color::hex(0xfdae61),
    Color::hex(0xf46d43),
    Color::hex(0xd73027),
];

fn level_color(level: u8) -> Color {
    COLORS[usize::from(level).min(COLORS.len() - 1)]
}

fn dot_key(id: RowId) -> String {
    id.to_string()
}

fn parse_dot_key(key: &str) -> Option<RowId> {
    key.strip_prefix("row-")?.parse().ok().map(RowId)
}

pub struct DotMatrix {
    frame: WidgetFrame,
    per_line: usize,
}

impl DotMatrix {
    pub fn new(per_line: usize) -> Self {
        let per_line = per_line.max(1);
        Self {
            frame: WidgetFrame::new(WidgetId::DotMatrix, width_for(per_line), MARGIN_TOP),
            per_line,
        }
    }

    /// Financial stress levels to draw, in order, with their original rows
    fn groups<'a>(&self, original: &'a [Row]) -> Vec<(u8, Vec<&'a Row>)> {
        percent_by_key(original, |r| r.financial_stress, Some(&FINANCIAL_STRESS_LEVELS[..]))
            .into_iter()
            .map(|share| {
                let members = original
                    .iter()
                    .filter(|r| r.financial_stress == share.key)
                    .collect();
                (share.key, members)
            })
            .collect()
    }

    fn group_height(&self, members: usize) -> f64 {
        let lines = members.div_ceil(self.per_line);
        GROUP_HEADER + lines as f64 * SPACING + GROUP_GAP
    }
}

fn width_for(per_line: usize) -> f64 {
    MARGIN_LEFT * 2.0 + per_line as f64 * SPACING
}

impl ChartWidget for DotMatrix {
    fn frame(&self) -> &WidgetFrame {
        &self.frame
    }

    fn frame_mut(&mut self) -> &mut WidgetFrame {
        &mut self.frame
    }

    fn topics(&self) -> &'static [Topic] {
        &[Topic::Selection, Topic::Filter, Topic::Category, Topic::Clear]
    }

    fn extent(&self, ctx: &WidgetContext<'_>) -> (f64, f64) {
        let height = self
            .groups(ctx.original())
            .iter()
            .map(|(_, members)| self.group_height(members.len()))
            .sum::<f64>();
        (width_for(self.per_line), MARGIN_TOP + height)
    }

    fn build(&self, ctx: &WidgetContext<'_>) -> Layers {
        let working = ctx.working();
        let filtered = ctx.store.is_filtered();
        let in_working: HashSet<RowId> = if filtered {
            working.iter().map(|r| r.id).collect()
        } else {
            HashSet::new()
        };
        let shares = percent_by_key(working, |r| r.financial_stress, Some(&FINANCIAL_STRESS_LEVELS[..]));

        let mut legend = vec![Element::text("title", MARGIN_LEFT, 16.0, self.id().title()).fill(palette::TEXT)];
        let mut dots = Vec::with_capacity(ctx.original().len());
        let mut y = MARGIN_TOP;

        for (level, members) in self.groups(ctx.original()) {
            let percent = shares
                .iter()
                .find(|s| s.key == level)
                .map_or(0.0, |s| s.percent);
            legend.push(
                Element::text(
                    format!("group/{level}"),
                    MARGIN_LEFT,
                    y + GROUP_HEADER - 6.0,
                    format!("Financial Stress Level: {level} ({percent:.2}%)"),
                )
                .fill(level_color(level)),
            );

            let top = y + GROUP_HEADER;
            for (i, row) in members.iter().enumerate() {
                let col = (i % self.per_line) as f64;
                let line = (i / self.per_line) as f64;
                dots.push(
                    Element::circle(
                        dot_key(row.id),
                        MARGIN_LEFT + col * SPACING + RADIUS,
                        top + line * SPACING + RADIUS,
                        RADIUS,
                    )
                    .fill(level_color(level))
                    .classes(Classes {
                        inactive: filtered && !in_working.contains(&row.id),
                        clicked: ctx.selection.is_highlighted(row),
                        ..Classes::default()
                    })
                    .label(format!("{} / {} / age {}", row.id, row.course, row.age))
                    .interactive(),
                );
            }
            y += self.group_height(members.len());
        }

        let (width, height) = self.extent(ctx);
        vec![
            ("background", vec![background(width, height)]),
            ("legend", legend),
            ("dots", dots),
        ]
    }

    fn pointer(&mut self, action: PointerAction, key: &str, ctx: &WidgetContext<'_>) -> PointerOutcome {
        if key == BACKGROUND {
            return background_pointer(&mut self.frame, action);
        }
        let Some(row) = parse_dot_key(key).and_then(|id| ctx.row(id)) else {
            return PointerOutcome::Ignored;
        };

        match action {
            PointerAction::Click => PointerOutcome::Publish(DashboardEvent::SelectionChanged { row: row.clone() }),
            PointerAction::Hover => {
                let title = format!("Financial Stress Level: {}", row.financial_stress);
                hover(&mut self.frame, key, Tooltip::new(title, row.describe()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::survey::fixtures::row;
    use crate::models::{Course, CourseAge};
    use crate::store::RowFilter;
    use crate::widgets::testing::Fixture;

    fn rows() -> Vec<Row> {
        let mut rows: Vec<Row> = (0..5).map(|i| row(i, Course::Law, 20)).collect();
        rows[0].financial_stress = 0;
        rows[1].financial_stress = 5;
        rows[2].financial_stress = 5;
        rows[3].financial_stress = 5;
        rows[4].course = Course::Medical;
        rows[4].age = 21;
        rows
    }

    fn legend_text(widget: &DotMatrix, level: u8) -> String {
        match widget
            .scene()
            .element("legend", &format!("group/{level}"))
            .map(|e| &e.shape)
        {
            Some(crate::scene::Shape::Text { text, .. }) => text.clone(),
            _ => panic!("missing legend for level {level}"),
        }
    }

    #[test]
    fn test_one_dot_per_original_row() {
        let fixture = Fixture::new(rows());
        let mut widget = DotMatrix::new(112);
        widget.render(&fixture.ctx()).unwrap();

        assert_eq!(widget.scene().elements("dots").len(), 5);
        assert_eq!(legend_text(&widget, 5), "Financial Stress Level: 5 (60.00%)");
        assert_eq!(legend_text(&widget, 3), "Financial Stress Level: 3 (0.00%)");
    }

    #[test]
    fn test_dots_wrap_at_line_width() {
        let fixture = Fixture::new(rows());
        let mut widget = DotMatrix::new(2);
        widget.render(&fixture.ctx()).unwrap();

        let cy = |id: u32| match widget.scene().element("dots", &dot_key(RowId(id))).map(|e| &e.shape) {
            Some(crate::scene::Shape::Circle { cy, .. }) => *cy,
            _ => panic!("missing dot"),
        };
        // rows 1, 2, 3 are level 5: two on the first line, one on the next
        assert_eq!(cy(1), cy(2));
        assert_eq!(cy(3), cy(1) + SPACING);
    }

    #[test]
    fn test_rows_outside_working_set_are_inactive() {
        let mut fixture = Fixture::new(rows());
        fixture
            .store
            .apply_filter(RowFilter::CourseAge(vec![CourseAge::new(Course::Medical, 21)]));
        let mut widget = DotMatrix::new(112);
        widget.render(&fixture.ctx()).unwrap();

        let dots = widget.scene().elements("dots");
        assert_eq!(dots.len(), 5);
        let active: Vec<_> = dots.iter().filter(|e| !e.classes.inactive).map(|e| e.key.as_str()).collect();
        assert_eq!(active, vec!["row-4"]);
        assert_eq!(legend_text(&widget, 2), "Financial Stress Level: 2 (100.00%)");
    }

    #[test]
    fn test_click_publishes_selection() {
        let fixture = Fixture::new(rows());
        let mut widget = DotMatrix::new(112);
        widget.render(&fixture.ctx()).unwrap();

        match widget.pointer(PointerAction::Click, "row-4", &fixture.ctx()) {
            PointerOutcome::Publish(DashboardEvent::SelectionChanged { row }) => {
                assert_eq!(row.id, RowId(4));
                assert_eq!(row.course, Course::Medical);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(
            widget.pointer(PointerAction::Click, "row-99", &fixture.ctx()),
            PointerOutcome::Ignored
        );
    }

    #[test]
    fn test_hover_describes_row() {
        let fixture = Fixture::new(rows());
        let mut widget = DotMatrix::new(112);
        widget.render(&fixture.ctx()).unwrap();

        match widget.pointer(PointerAction::Hover, "row-0", &fixture.ctx()) {
            PointerOutcome::Tooltip(tooltip) => {
                assert_eq!(tooltip.title, "Financial Stress Level: 0");
                assert!(tooltip.lines.contains(&"Major: Law".to_string()));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(widget.scene().element("dots", "row-0").unwrap().classes.highlighted);
    }

    #[test]
    fn test_extent_grows_with_data() {
        let fixture = Fixture::new(rows());
        let mut widget = DotMatrix::new(112);
        widget.render(&fixture.ctx()).unwrap();
        assert!(widget.scene().height() > MARGIN_TOP);
        assert_eq!(widget.scene().width(), width_for(112));
    }
}
