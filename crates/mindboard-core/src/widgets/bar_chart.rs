//! Counseling use bar chart with a mean CGPA line
//!
//! Bars count respondents per counseling use (Never, Occasionally,
//! Frequently) over the working set. The line plots mean CGPA on a right
//! axis and breaks wherever a group is empty.

use super::scale::{BandScale, LinearScale};
use super::{
    background, background_pointer, hover, palette, ChartWidget, Layers, PointerAction,
    PointerOutcome, Tooltip, WidgetContext, WidgetFrame, WidgetId, BACKGROUND,
};
use crate::analytics::{counseling_summary, KeyMean};
use crate::event::Topic;
use crate::models::CounselingUse;
use crate::scene::{Anchor, Classes, Color, Element};

const WIDTH: f64 = 420.0;
const HEIGHT: f64 = 300.0;
const MARGIN_LEFT: f64 = 50.0;
const MARGIN_RIGHT: f64 = 50.0;
const MARGIN_TOP: f64 = 30.0;
const MARGIN_BOTTOM: f64 = 40.0;

const BAR_COLORS: [Color; 3] = [
    Color::hex(0xfdbe85),
    Color::hex(0xe6550d),
    Color::hex(0xa63603),
];

const MEAN_PREFIX: &str = "mean/";

/// Right axis domain: means floored/ceiled to 2 decimals
pub fn mean_domain(means: &[KeyMean<CounselingUse>]) -> Option<(f64, f64)> {
    let min = means.iter().map(|m| m.mean).reduce(f64::min)?;
    let max = means.iter().map(|m| m.mean).reduce(f64::max)?;
    Some(((min * 100.0).floor() / 100.0, (max * 100.0).ceil() / 100.0))
}

pub struct BarChart {
    frame: WidgetFrame,
}

impl Default for BarChart {
    fn default() -> Self {
        Self::new()
    }
}

impl BarChart {
    pub fn new() -> Self {
        Self {
            frame: WidgetFrame::new(WidgetId::BarChart, WIDTH, HEIGHT),
        }
    }
}

impl ChartWidget for BarChart {
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
        let (counts, means) = counseling_summary(ctx.working());
        let clicked = ctx.selection.highlighted_row().map(|r| r.counseling);

        let bottom = HEIGHT - MARGIN_BOTTOM;
        let x = BandScale::new(counts.len(), MARGIN_LEFT, WIDTH - MARGIN_RIGHT).padding(0.3);
        let max_count = counts.iter().map(|c| c.count).max().unwrap_or(0).max(1);
        let y = LinearScale::new((0.0, max_count as f64), (bottom, MARGIN_TOP));

        let bars = counts
            .iter()
            .enumerate()
            .map(|(i, kc)| {
                let top = y.map(kc.count as f64);
                Element::rect(kc.key.name(), x.position(i), top, x.bandwidth(), bottom - top)
                    .fill(BAR_COLORS[i % BAR_COLORS.len()])
                    .stroke(palette::STROKE)
                    .classes(Classes {
                        clicked: clicked == Some(kc.key),
                        ..Classes::default()
                    })
                    .label(format!("{}: {} students", kc.key, kc.count))
                    .interactive()
            })
            .collect();

        let mut line = Vec::new();
        let mut axes = vec![
            Element::text("title", WIDTH / 2.0, 16.0, WidgetId::BarChart.title())
                .anchored(Anchor::Middle)
                .fill(palette::TEXT),
            Element::text("y/max", MARGIN_LEFT - 6.0, MARGIN_TOP, max_count.to_string())
                .anchored(Anchor::End),
            Element::text("y/min", MARGIN_LEFT - 6.0, bottom, "0").anchored(Anchor::End),
        ];
        for (i, kc) in counts.iter().enumerate() {
            axes.push(
                Element::text(format!("x/{}", kc.key), x.center(i), bottom + 16.0, kc.key.name())
                    .anchored(Anchor::Middle),
            );
        }

        if let Some((lo, hi)) = mean_domain(&means) {
            let y_right = LinearScale::new((lo, hi), (bottom, MARGIN_TOP));
            axes.push(Element::text("y2/max", WIDTH - MARGIN_RIGHT + 6.0, MARGIN_TOP, format!("{hi:.2}")));
            axes.push(Element::text("y2/min", WIDTH - MARGIN_RIGHT + 6.0, bottom, format!("{lo:.2}")));

            // one segment per run of consecutive non-empty groups
            let mut segment: Vec<(f64, f64)> = Vec::new();
            let mut segments = 0;
            for (i, key) in counts.iter().map(|c| c.key).enumerate() {
                match means.iter().find(|m| m.key == key) {
                    Some(m) => {
                        let point = (x.center(i), y_right.map(m.mean));
                        segment.push(point);
                        line.push(
                            Element::circle(format!("{MEAN_PREFIX}{key}"), point.0, point.1, 4.0)
                                .fill(palette::STROKE)
                                .label(format!("Mean CGPA ({key}): {:.3}", m.mean))
                                .interactive(),
                        );
                    }
                    None if !segment.is_empty() => {
                        line.push(mean_segment(segments, std::mem::take(&mut segment)));
                        segments += 1;
                    }
                    None => {}
                }
            }
            if !segment.is_empty() {
                line.push(mean_segment(segments, segment));
            }
        }

        vec![
            ("background", vec![background(WIDTH, HEIGHT)]),
            ("axes", axes),
            ("bars", bars),
            ("line", line),
        ]
    }

    fn pointer(&mut self, action: PointerAction, key: &str, ctx: &WidgetContext<'_>) -> PointerOutcome {
        if key == BACKGROUND {
            return background_pointer(&mut self.frame, action);
        }
        if action == PointerAction::Click {
            return PointerOutcome::Ignored;
        }

        match self.frame.label_of(key).map(str::to_string) {
            Some(label) => {
                let title = match key.strip_prefix(MEAN_PREFIX) {
                    Some(_) => "Mean CGPA".to_string(),
                    None => format!("Counseling: {key}"),
                };
                let mut lines = vec![label];
                if ctx.store.is_filtered() {
                    lines.push(format!("Filtered: {} of {} rows", ctx.working().len(), ctx.store.len()));
                }
                hover(&mut self.frame, key, Tooltip::new(title, lines))
            }
            None => PointerOutcome::Ignored,
        }
    }
}

fn mean_segment(index: usize, points: Vec<(f64, f64)>) -> Element {
    Element::polyline(format!("segment/{index}"), points).stroke(palette::STROKE)
}
