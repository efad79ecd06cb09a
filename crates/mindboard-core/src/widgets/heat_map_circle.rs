//! Indicator x level circle grid (overall view)

use super::scale::{BandScale, LinearScale};
use super::{
    background, background_pointer, hover, palette, ChartWidget, Layers, PointerAction,
    PointerOutcome, Tooltip, WidgetContext, WidgetFrame, WidgetId, BACKGROUND,
};
use crate::analytics::course_attribute_counts;
use crate::event::Topic;
use crate::models::{Indicator, Level, ViewMode};
use crate::scene::{Anchor, Classes, Element};

const WIDTH: f64 = 520.0;
const HEIGHT: f64 = 300.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 10.0;
const MARGIN_TOP: f64 = 30.0;
const MARGIN_BOTTOM: f64 = 40.0;
const MIN_RADIUS: f64 = 3.0;

/// Levels top to bottom
const ROWS: [Level; 3] = [Level::High, Level::Moderate, Level::Low];

fn circle_key(indicator: Indicator, level: Level) -> String {
    format!("{}:{}", indicator.column(), level.name())
}

fn parse_key(key: &str) -> Option<(Indicator, Level)> {
    let (column, level) = key.split_once(':')?;
    let indicator = Indicator::from_column(column)?;
    let level = Level::ALL.into_iter().find(|l| l.name() == level)?;
    Some((indicator, level))
}

pub struct HeatMapCircle {
    frame: WidgetFrame,
}

impl Default for HeatMapCircle {
    fn default() -> Self {
        Self::new()
    }
}

impl HeatMapCircle {
    pub fn new() -> Self {
        Self {
            frame: WidgetFrame::new(WidgetId::HeatMapCircle, WIDTH, HEIGHT),
        }
    }
}

impl ChartWidget for HeatMapCircle {
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
        mode == ViewMode::Overall
    }

    fn build(&self, ctx: &WidgetContext<'_>) -> Layers {
        let table = course_attribute_counts(ctx.working());
        let range = table.total_min_max();

        let x = BandScale::new(Indicator::ALL.len(), MARGIN_LEFT, WIDTH - MARGIN_RIGHT);
        let y = BandScale::new(ROWS.len(), MARGIN_TOP, HEIGHT - MARGIN_BOTTOM);
        let max_radius = (x.step().min(y.step()) / 2.0 - 2.0).max(MIN_RADIUS);
        let radius = LinearScale::new(
            (f64::from(range.min), f64::from(range.max)),
            (MIN_RADIUS, max_radius),
        );
        let highlighted = ctx.selection.highlighted_row();

        let mut circles = Vec::with_capacity(Indicator::ALL.len() * ROWS.len());
        for (col, indicator) in Indicator::ALL.into_iter().enumerate() {
            for (row, level) in ROWS.into_iter().enumerate() {
                let total = table.total(indicator, level);
                circles.push(
                    Element::circle(
                        circle_key(indicator, level),
                        x.center(col),
                        y.center(row),
                        radius.map(f64::from(total)),
                    )
                    .fill(palette::CIRCLE)
                    .stroke(palette::CIRCLE_STROKE)
                    .classes(Classes {
                        clicked: highlighted.is_some_and(|r| r.level(indicator) == level),
                        ..Classes::default()
                    })
                    .label(format!("{} {}: {}", level, indicator.label(), total))
                    .interactive(),
                );
            }
        }

        let mut axes = vec![Element::text("title", WIDTH / 2.0, 16.0, self.id().title())
            .anchored(Anchor::Middle)
            .fill(palette::TEXT)];
        for (col, indicator) in Indicator::ALL.into_iter().enumerate() {
            axes.push(
                Element::text(
                    format!("x/{}", indicator.short_name()),
                    x.center(col),
                    HEIGHT - MARGIN_BOTTOM + 16.0,
                    indicator.label(),
                )
                .anchored(Anchor::Middle),
            );
        }
        for (row, level) in ROWS.into_iter().enumerate() {
            axes.push(
                Element::text(format!("y/{}", level.name()), MARGIN_LEFT - 8.0, y.center(row), level.name())
                    .anchored(Anchor::End),
            );
        }

        vec![
            ("background", vec![background(WIDTH, HEIGHT)]),
            ("axes", axes),
            ("circles", circles),
        ]
    }

    fn pointer(&mut self, action: PointerAction, key: &str, ctx: &WidgetContext<'_>) -> PointerOutcome {
        if key == BACKGROUND {
            return background_pointer(&mut self.frame, action);
        }
        if action == PointerAction::Click {
            return PointerOutcome::Ignored;
        }
        let Some((indicator, level)) = parse_key(key) else {
            return PointerOutcome::Ignored;
        };

        let table = course_attribute_counts(ctx.working());
        let total = table.total(indicator, level);
        let share = if table.is_empty() {
            0.0
        } else {
            f64::from(total) / f64::from(table.rows()) * 100.0
        };
        let tooltip = Tooltip::new(
            indicator.label(),
            vec![
                format!("Level: {level}"),
                format!("Students: {total} ({share:.1}%)"),
            ],
        );
        hover(&mut self.frame, key, tooltip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::survey::fixtures::row;
    use crate::models::{Course, Row};
    use crate::scene::Shape;
    use crate::widgets::testing::Fixture;

    fn radius_of(widget: &HeatMapCircle, indicator: Indicator, level: Level) -> f64 {
        match widget
            .scene()
            .element("circles", &circle_key(indicator, level))
            .map(|e| &e.shape)
        {
            Some(Shape::Circle { r, .. }) => *r,
            _ => panic!("missing circle"),
        }
    }

    fn rows() -> Vec<Row> {
        let mut rows: Vec<Row> = (0..4).map(|i| row(i, Course::Law, 20)).collect();
        rows[0].diet_quality = Level::High;
        rows
    }

    #[test]
    fn test_grid_has_fifteen_circles() {
        let fixture = Fixture::new(rows());
        let mut widget = HeatMapCircle::new();
        widget.render(&fixture.ctx()).unwrap();
        assert_eq!(widget.scene().elements("circles").len(), 15);
    }

    #[test]
    fn test_radius_scales_with_total_count() {
        let fixture = Fixture::new(rows());
        let mut widget = HeatMapCircle::new();
        widget.render(&fixture.ctx()).unwrap();

        let moderate_sleep = radius_of(&widget, Indicator::SleepQuality, Level::Moderate);
        let moderate_diet = radius_of(&widget, Indicator::DietQuality, Level::Moderate);
        let low_sleep = radius_of(&widget, Indicator::SleepQuality, Level::Low);

        assert!(moderate_sleep > moderate_diet);
        assert!(moderate_diet > low_sleep);
        assert_eq!(low_sleep, MIN_RADIUS);
    }

    #[test]
    fn test_clicked_marks_highlighted_levels() {
        let mut fixture = Fixture::new(rows());
        let first = fixture.store.original()[0].clone();
        fixture.selection.select_row(first);

        let mut widget = HeatMapCircle::new();
        widget.render(&fixture.ctx()).unwrap();

        let clicked: Vec<_> = widget
            .scene()
            .elements("circles")
            .iter()
            .filter(|e| e.classes.clicked)
            .map(|e| e.key.as_str())
            .collect();
        assert_eq!(clicked.len(), 5);
        assert!(clicked.contains(&"Diet_Quality:High"));
        assert!(clicked.contains(&"Sleep_Quality:Moderate"));
    }

    #[test]
    fn test_visible_only_in_overall_mode() {
        let widget = HeatMapCircle::new();
        assert!(widget.is_visible(ViewMode::Overall));
        assert!(!widget.is_visible(ViewMode::Listed));
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(
            parse_key("Social_Support:Low"),
            Some((Indicator::SocialSupport, Level::Low))
        );
        assert_eq!(parse_key("Social_Support"), None);
        assert_eq!(parse_key("Mood:Low"), None);
    }
}
