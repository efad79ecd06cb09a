//! Course x age heat map
//!
//! Always aggregates the original dataset. Clicking a cell toggles its
//! (course, age) pair and publishes the complete pair list, which drives the
//! COURSE_AGE filter.

use super::scale::BandScale;
use super::{
    background, background_pointer, hover, palette, ChartWidget, Layers, PointerAction,
    PointerOutcome, Tooltip, WidgetContext, WidgetFrame, WidgetId, BACKGROUND,
};
use crate::analytics::{course_age_counts, HeatCell};
use crate::event::{DashboardEvent, Topic};
use crate::models::{Course, CourseAge};
use crate::scene::{Anchor, Classes, Color, Element};
use std::ops::RangeInclusive;

const WIDTH: f64 = 460.0;
const HEIGHT: f64 = 280.0;
const MARGIN_LEFT: f64 = 120.0;
const MARGIN_RIGHT: f64 = 10.0;
const MARGIN_TOP: f64 = 30.0;
const MARGIN_BOTTOM: f64 = 50.0;

/// Light to dark, one step per bucket
pub const COLORS: [Color; 5] = [
    Color::hex(0xd5f0f9),
    Color::hex(0xadd8e6),
    Color::hex(0x80d4f2),
    Color::hex(0x31a2cb),
    Color::hex(0x095c7b),
];

const CELL_PREFIX: &str = "cell:";

fn cell_key(pair: CourseAge) -> String {
    format!("{CELL_PREFIX}{}:{}", pair.course.name(), pair.age)
}

fn parse_cell_key(key: &str) -> Option<CourseAge> {
    let rest = key.strip_prefix(CELL_PREFIX)?;
    let (course, age) = rest.rsplit_once(':')?;
    Some(CourseAge::new(Course::parse(course)?, age.parse().ok()?))
}

/// Selection after toggling `pair` in `current`
pub fn toggle_pair(current: &[CourseAge], pair: CourseAge) -> Vec<CourseAge> {
    if current.contains(&pair) {
        current.iter().copied().filter(|p| *p != pair).collect()
    } else {
        let mut pairs = current.to_vec();
        pairs.push(pair);
        pairs
    }
}

pub struct HeatMap {
    frame: WidgetFrame,
    ages: RangeInclusive<u8>,
    bucket_size: u32,
}

impl HeatMap {
    pub fn new(ages: RangeInclusive<u8>, bucket_size: u32) -> Self {
        Self {
            frame: WidgetFrame::new(WidgetId::HeatMap, WIDTH, HEIGHT),
            ages,
            bucket_size,
        }
    }

    fn cells(&self, ctx: &WidgetContext<'_>) -> Vec<HeatCell> {
        course_age_counts(ctx.original(), self.ages.clone())
    }
}

impl ChartWidget for HeatMap {
    fn frame(&self) -> &WidgetFrame {
        &self.frame
    }

    fn frame_mut(&mut self) -> &mut WidgetFrame {
        &mut self.frame
    }

    fn topics(&self) -> &'static [Topic] {
        &[Topic::Selection, Topic::Filter, Topic::Category, Topic::Clear]
    }

    fn build(&self, ctx: &WidgetContext<'_>) -> Layers {
        let ages: Vec<u8> = self.ages.clone().collect();
        let x = BandScale::new(ages.len(), MARGIN_LEFT, WIDTH - MARGIN_RIGHT).padding(0.05);
        let y = BandScale::new(Course::HEAT_MAP_ORDER.len(), MARGIN_TOP, HEIGHT - MARGIN_BOTTOM)
            .padding(0.05);

        let selected = ctx.selection.selected_pairs();
        let clicked = ctx
            .selection
            .highlighted_row()
            .map(|r| CourseAge::new(r.course, r.age));

        let cells = self
            .cells(ctx)
            .into_iter()
            .filter_map(|cell| {
                let col = ages.iter().position(|a| *a == cell.pair.age)?;
                let row = Course::HEAT_MAP_ORDER
                    .iter()
                    .position(|c| *c == cell.pair.course)?;
                let bucket = cell.bucket(self.bucket_size, COLORS.len());
                Some(
                    Element::rect(
                        cell_key(cell.pair),
                        x.position(col),
                        y.position(row),
                        x.bandwidth(),
                        y.bandwidth(),
                    )
                    .fill(COLORS[bucket])
                    .classes(Classes {
                        active: selected.contains(&cell.pair),
                        clicked: clicked == Some(cell.pair),
                        ..Classes::default()
                    })
                    .label(format!("{}, age {}: {}", cell.pair.course, cell.pair.age, cell.count))
                    .interactive(),
                )
            })
            .collect();

        let mut axes = vec![Element::text("title", WIDTH / 2.0, 16.0, self.id().title())
            .anchored(Anchor::Middle)
            .fill(palette::TEXT)];
        for (col, age) in ages.iter().enumerate() {
            axes.push(
                Element::text(format!("x/{age}"), x.center(col), HEIGHT - MARGIN_BOTTOM + 14.0, age.to_string())
                    .anchored(Anchor::Middle),
            );
        }
        for (row, course) in Course::HEAT_MAP_ORDER.iter().enumerate() {
            axes.push(
                Element::text(format!("y/{}", course.name()), MARGIN_LEFT - 6.0, y.center(row), course.name())
                    .anchored(Anchor::End),
            );
        }

        let legend_x = BandScale::new(COLORS.len(), MARGIN_LEFT, WIDTH - MARGIN_RIGHT);
        let legend_y = HEIGHT - 20.0;
        let mut legend = Vec::with_capacity(COLORS.len() * 2);
        for (i, color) in COLORS.iter().enumerate() {
            let from = i as u32 * self.bucket_size;
            let text = if i + 1 == COLORS.len() {
                format!("{from}+")
            } else {
                format!("{}-{}", from, from + self.bucket_size - 1)
            };
            legend.push(Element::rect(format!("legend/{i}"), legend_x.position(i), legend_y, 12.0, 10.0).fill(*color));
            legend.push(Element::text(format!("legend-text/{i}"), legend_x.position(i) + 16.0, legend_y + 9.0, text));
        }

        vec![
            ("background", vec![background(WIDTH, HEIGHT)]),
            ("axes", axes),
            ("cells", cells),
            ("legend", legend),
        ]
    }

    fn pointer(&mut self, action: PointerAction, key: &str, ctx: &WidgetContext<'_>) -> PointerOutcome {
        if key == BACKGROUND {
            return background_pointer(&mut self.frame, action);
        }
        let Some(pair) = parse_cell_key(key) else {
            return PointerOutcome::Ignored;
        };

        match action {
            PointerAction::Click => PointerOutcome::Publish(DashboardEvent::FilterChanged {
                pairs: toggle_pair(ctx.selection.selected_pairs(), pair),
            }),
            PointerAction::Hover => {
                let count = self
                    .cells(ctx)
                    .into_iter()
                    .find(|c| c.pair == pair)
                    .map_or(0, |c| c.count);
                let tooltip = Tooltip::new(
                    pair.course.name(),
                    vec![format!("Age: {}", pair.age), format!("Students: {count}")],
                );
                hover(&mut self.frame, key, tooltip)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::survey::fixtures::row;
    use crate::models::Row;
    use crate::widgets::testing::Fixture;

    fn rows() -> Vec<Row> {
        vec![row(0, Course::Law, 20), row(1, Course::Medical, 21)]
    }

    fn heat_map() -> HeatMap {
        HeatMap::new(18..=24, 50)
    }

    #[test]
    fn test_cell_key_round_trip_with_spaces() {
        let pair = CourseAge::new(Course::ComputerScience, 19);
        assert_eq!(parse_cell_key(&cell_key(pair)), Some(pair));
        assert_eq!(parse_cell_key("legend/1"), None);
    }

    #[test]
    fn test_zero_filled_grid() {
        let fixture = Fixture::new(rows());
        let mut widget = heat_map();
        widget.render(&fixture.ctx()).unwrap();
        assert_eq!(widget.scene().elements("cells").len(), 6 * 7);
    }

    #[test]
    fn test_click_toggles_pair_into_filter_event() {
        let fixture = Fixture::new(rows());
        let mut widget = heat_map();
        widget.render(&fixture.ctx()).unwrap();

        let key = cell_key(CourseAge::new(Course::Law, 20));
        let outcome = widget.pointer(PointerAction::Click, &key, &fixture.ctx());
        assert_eq!(
            outcome,
            PointerOutcome::Publish(DashboardEvent::FilterChanged {
                pairs: vec![CourseAge::new(Course::Law, 20)]
            })
        );
    }

    #[test]
    fn test_click_on_active_cell_removes_it() {
        let mut fixture = Fixture::new(rows());
        fixture.selection.set_pairs(vec![
            CourseAge::new(Course::Law, 20),
            CourseAge::new(Course::Medical, 21),
        ]);
        let mut widget = heat_map();
        widget.render(&fixture.ctx()).unwrap();

        let law = cell_key(CourseAge::new(Course::Law, 20));
        assert!(widget.scene().element("cells", &law).unwrap().classes.active);

        let outcome = widget.pointer(PointerAction::Click, &law, &fixture.ctx());
        assert_eq!(
            outcome,
            PointerOutcome::Publish(DashboardEvent::FilterChanged {
                pairs: vec![CourseAge::new(Course::Medical, 21)]
            })
        );
    }

    #[test]
    fn test_counts_ignore_working_set() {
        let mut fixture = Fixture::new(rows());
        fixture
            .store
            .apply_filter(crate::store::RowFilter::CourseAge(vec![CourseAge::new(Course::Law, 20)]));
        let mut widget = heat_map();
        widget.render(&fixture.ctx()).unwrap();

        let medical = cell_key(CourseAge::new(Course::Medical, 21));
        assert_eq!(
            widget.scene().element("cells", &medical).unwrap().label.as_deref(),
            Some("Medical, age 21: 1")
        );
    }

    #[test]
    fn test_legend_ranges() {
        let fixture = Fixture::new(rows());
        let mut widget = heat_map();
        widget.render(&fixture.ctx()).unwrap();

        let texts: Vec<_> = widget
            .scene()
            .elements("legend")
            .iter()
            .filter_map(|e| match &e.shape {
                crate::scene::Shape::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["0-49", "50-99", "100-149", "150-199", "200+"]);
    }
}
