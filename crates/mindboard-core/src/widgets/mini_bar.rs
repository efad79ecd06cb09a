//! Per-course mini bar chart for one (level, indicator) pair
//!
//! Fifteen of these form the listed view: one per well-being level and
//! indicator. All share the y-domain of the full course table so bars are
//! comparable across charts.

use super::scale::{BandScale, LinearScale};
use super::{
    background, background_pointer, hover, palette, ChartWidget, Layers, PointerAction,
    PointerOutcome, Tooltip, WidgetContext, WidgetFrame, WidgetId, BACKGROUND,
};
use crate::analytics::{course_attribute_counts, min_max};
use crate::event::Topic;
use crate::models::{Course, Indicator, Level, ViewMode};
use crate::scene::{Anchor, Classes, Element};

const WIDTH: f64 = 200.0;
const HEIGHT: f64 = 140.0;
const MARGIN_LEFT: f64 = 30.0;
const MARGIN_RIGHT: f64 = 8.0;
const MARGIN_TOP: f64 = 20.0;
const MARGIN_BOTTOM: f64 = 26.0;
/// Smallest count still gets a visible stub
const MIN_BAR: f64 = 10.0;

fn glyph(course: Course) -> char {
    match course {
        Course::Business => 'B',
        Course::ComputerScience => 'C',
        Course::Engineering => 'E',
        Course::Law => 'L',
        Course::Medical => 'M',
        Course::Others => 'O',
    }
}

pub struct MiniBarChart {
    frame: WidgetFrame,
    level: Level,
    indicator: Indicator,
}

impl MiniBarChart {
    pub fn new(level: Level, indicator: Indicator) -> Self {
        Self {
            frame: WidgetFrame::new(WidgetId::MiniBar { level, indicator }, WIDTH, HEIGHT),
            level,
            indicator,
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn indicator(&self) -> Indicator {
        self.indicator
    }
}

impl ChartWidget for MiniBarChart {
    fn frame(&self) -> &WidgetFrame {
        &self.frame
    }

    fn frame_mut(&mut self) -> &mut WidgetFrame {
        &mut self.frame
    }

    fn topics(&self) -> &'static [Topic] {
        &[
            Topic::Selection,
            Topic::Filter,
            Topic::Category,
            Topic::ViewMode,
            Topic::Clear,
        ]
    }

    fn is_visible(&self, mode: ViewMode) -> bool {
        mode == ViewMode::Listed
    }

    fn build(&self, ctx: &WidgetContext<'_>) -> Layers {
        let table = course_attribute_counts(ctx.working());
        let range = min_max(&table);
        let bottom = HEIGHT - MARGIN_BOTTOM;

        let x = BandScale::new(Course::ALL.len(), MARGIN_LEFT, WIDTH - MARGIN_RIGHT).padding(0.2);
        let y = LinearScale::new(
            (f64::from(range.min), f64::from(range.max)),
            (bottom - MIN_BAR, MARGIN_TOP),
        );

        let clicked_course = ctx
            .selection
            .highlighted_row()
            .filter(|row| row.level(self.indicator) == self.level)
            .map(|row| row.course);

        let mut bars = Vec::with_capacity(Course::ALL.len());
        let mut icons = Vec::with_capacity(Course::ALL.len());
        for (i, course) in Course::ALL.into_iter().enumerate() {
            let count = table.count(course, self.indicator, self.level);
            let top = y.map(f64::from(count));
            bars.push(
                Element::rect(course.name(), x.position(i), top, x.bandwidth(), bottom - top)
                    .fill(palette::course(course))
                    .classes(Classes {
                        clicked: clicked_course == Some(course),
                        ..Classes::default()
                    })
                    .label(format!("{}: {}", course, count))
                    .interactive(),
            );
            icons.push(
                Element::icon(
                    format!("icon/{}", course.name()),
                    x.center(i),
                    bottom + 10.0,
                    x.bandwidth().min(12.0),
                    glyph(course),
                )
                .fill(palette::course(course))
                .label(course.short_label()),
            );
        }

        let axes = vec![
            Element::text("title", MARGIN_LEFT, 12.0, self.id().title()).fill(palette::TEXT),
            Element::text("y/max", MARGIN_LEFT - 4.0, MARGIN_TOP, range.max.to_string())
                .anchored(Anchor::End),
            Element::text("y/min", MARGIN_LEFT - 4.0, bottom - MIN_BAR, range.min.to_string())
                .anchored(Anchor::End),
        ];

        vec![
            ("background", vec![background(WIDTH, HEIGHT)]),
            ("axes", axes),
            ("bars", bars),
            ("icons", icons),
        ]
    }

    fn pointer(&mut self, action: PointerAction, key: &str, ctx: &WidgetContext<'_>) -> PointerOutcome {
        if key == BACKGROUND {
            return background_pointer(&mut self.frame, action);
        }
        if action == PointerAction::Click {
            return PointerOutcome::Ignored;
        }

        let Some(course) = Course::parse(key) else {
            return PointerOutcome::Ignored;
        };
        let count = course_attribute_counts(ctx.working()).count(course, self.indicator, self.level);
        let tooltip = Tooltip::new(
            course.name(),
            vec![
                format!("{}: {}", self.indicator.label(), self.level),
                format!("Students: {count}"),
            ],
        );
        hover(&mut self.frame, key, tooltip)
    }
}
