//! Mental-health category tree map
//!
//! Leaves are sized by row count with a squarified layout. In CATEGORY mode
//! the map keeps showing the full dataset so other leaves stay clickable;
//! the selected leaf is marked instead.

use super::{
    background, background_pointer, hover, palette, ChartWidget, Layers, PointerAction,
    PointerOutcome, Tooltip, WidgetContext, WidgetFrame, WidgetId, BACKGROUND,
};
use crate::analytics::{category_breakdown, CategoryShare};
use crate::event::{DashboardEvent, Topic};
use crate::models::{CategoryGroup, MentalHealthCategory};
use crate::scene::{Anchor, Classes, Color, Element};

const WIDTH: f64 = 340.0;
const HEIGHT: f64 = 460.0;
const MAP_X: f64 = 20.0;
const MAP_Y: f64 = 40.0;
const MAP_WIDTH: f64 = 300.0;
const MAP_HEIGHT: f64 = 320.0;
const PADDING: f64 = 1.0;
/// Target aspect ratio of squarified tiles
const PHI: f64 = 1.618_033_988_749_895;

fn group_color(group: CategoryGroup) -> Color {
    match group {
        CategoryGroup::None => Color::hex(0xd3d3d3),
        CategoryGroup::All => Color::hex(0x90ee90),
        CategoryGroup::TwoOfThree => Color::hex(0xffa500),
        CategoryGroup::OneOfThree => Color::hex(0xadd8e6),
    }
}

/// Tile rectangle as (x0, y0, x1, y1)
pub type Tile = (f64, f64, f64, f64);

/// Lay `values` out in `bounds` as a squarified tree map, preserving order.
///
/// Zero and negative values get empty tiles.
pub fn squarify(values: &[f64], bounds: Tile) -> Vec<Tile> {
    let (mut x0, mut y0, x1, y1) = bounds;
    let mut tiles = vec![(x0, y0, x0, y0); values.len()];
    let mut remaining: f64 = values.iter().filter(|v| **v > 0.0).sum();
    let mut start = 0;

    while start < values.len() && remaining > 0.0 {
        let dx = x1 - x0;
        let dy = y1 - y0;
        let alpha = (dy / dx).max(dx / dy) / (remaining * PHI);

        let mut end = start;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = 0.0_f64;
        let mut best = f64::INFINITY;
        while end < values.len() {
            let value = values[end].max(0.0);
            let next_sum = sum + value;
            let next_min = if value > 0.0 { min.min(value) } else { min };
            let next_max = max.max(value);
            let beta = next_sum * next_sum * alpha;
            let ratio = if beta > 0.0 {
                (next_max / beta).max(beta / next_min)
            } else {
                f64::INFINITY
            };
            if sum > 0.0 && ratio > best {
                break;
            }
            sum = next_sum;
            min = next_min;
            max = next_max;
            best = ratio;
            end += 1;
        }
        if sum <= 0.0 {
            break;
        }

        // dice the row across the short side
        if dx < dy {
            let row_y1 = y0 + dy * sum / remaining;
            let mut x = x0;
            for i in start..end {
                let w = dx * values[i].max(0.0) / sum;
                tiles[i] = (x, y0, x + w, row_y1);
                x += w;
            }
            y0 = row_y1;
        } else {
            let row_x1 = x0 + dx * sum / remaining;
            let mut y = y0;
            for i in start..end {
                let h = dy * values[i].max(0.0) / sum;
                tiles[i] = (x0, y, row_x1, y + h);
                y += h;
            }
            x0 = row_x1;
        }
        remaining -= sum;
        start = end;
    }
    tiles
}

pub struct TreeMap {
    frame: WidgetFrame,
    threshold: u8,
}

impl TreeMap {
    pub fn new(threshold: u8) -> Self {
        Self {
            frame: WidgetFrame::new(WidgetId::TreeMap, WIDTH, HEIGHT),
            threshold,
        }
    }

    /// Leaves for the current state
    fn leaves(&self, ctx: &WidgetContext<'_>) -> Vec<CategoryShare> {
        let rows = if ctx.selection.selected_category().is_some() {
            ctx.original()
        } else {
            ctx.working()
        };
        category_breakdown(rows, self.threshold)
    }

    fn legend(&self) -> Vec<Element> {
        let entries = [
            (CategoryGroup::None, "No"),
            (CategoryGroup::OneOfThree, "One"),
            (CategoryGroup::TwoOfThree, "Two"),
            (CategoryGroup::All, "Three"),
        ];
        let top = MAP_Y + MAP_HEIGHT + 20.0;
        entries
            .iter()
            .enumerate()
            .flat_map(|(i, (group, count))| {
                let y = top + i as f64 * 18.0;
                [
                    Element::rect(format!("legend/{i}"), MAP_X, y, 12.0, 12.0).fill(group_color(*group)),
                    Element::text(
                        format!("legend-text/{i}"),
                        MAP_X + 18.0,
                        y + 10.0,
                        format!("{count} mental indices >= {}", self.threshold),
                    ),
                ]
            })
            .collect()
    }
}

impl ChartWidget for TreeMap {
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
        let leaves = self.leaves(ctx);
        let values: Vec<f64> = leaves.iter().map(|l| l.count as f64).collect();
        let tiles = squarify(&values, (MAP_X, MAP_Y, MAP_X + MAP_WIDTH, MAP_Y + MAP_HEIGHT));
        let selected = ctx.selection.selected_category();

        let mut rects = Vec::with_capacity(leaves.len());
        let mut labels = Vec::with_capacity(leaves.len() * 2);
        for (leaf, (x0, y0, x1, y1)) in leaves.iter().zip(tiles) {
            let key = leaf.category.key();
            let width = (x1 - x0 - 2.0 * PADDING).max(0.0);
            let height = (y1 - y0 - 2.0 * PADDING).max(0.0);
            let (cx, cy) = ((x0 + x1) / 2.0, (y0 + y1) / 2.0);

            rects.push(
                Element::rect(key, x0 + PADDING, y0 + PADDING, width, height)
                    .fill(group_color(leaf.category.group()))
                    .stroke(palette::STROKE)
                    .classes(Classes {
                        selected: selected == Some(leaf.category),
                        clicked: leaf.rows.iter().any(|r| ctx.selection.is_highlighted(r)),
                        ..Classes::default()
                    })
                    .label(leaf.label())
                    .interactive(),
            );
            labels.push(
                Element::text(format!("name/{key}"), cx, cy, leaf.category.abbreviation())
                    .anchored(Anchor::Middle)
                    .fill(palette::TEXT),
            );
            labels.push(
                Element::text(format!("percent/{key}"), cx, cy + 14.0, format!("{:.2}%", leaf.percent))
                    .anchored(Anchor::Middle)
                    .fill(palette::TEXT),
            );
        }

        let title = vec![Element::text("title", MAP_X, 20.0, self.id().title()).fill(palette::TEXT)];
        vec![
            ("background", vec![background(WIDTH, HEIGHT)]),
            ("title", title),
            ("leaves", rects),
            ("labels", labels),
            ("legend", self.legend()),
        ]
    }

    fn pointer(&mut self, action: PointerAction, key: &str, ctx: &WidgetContext<'_>) -> PointerOutcome {
        if key == BACKGROUND {
            return background_pointer(&mut self.frame, action);
        }
        let Some(category) = MentalHealthCategory::from_key(key) else {
            return PointerOutcome::Ignored;
        };

        match action {
            PointerAction::Click => PointerOutcome::Publish(DashboardEvent::CategoryToggled { category }),
            PointerAction::Hover => {
                let Some(leaf) = self.leaves(ctx).into_iter().find(|l| l.category == category) else {
                    return PointerOutcome::Ignored;
                };
                let tooltip = Tooltip::new(
                    category.abbreviation(),
                    vec![
                        format!("Students: {}", leaf.count),
                        format!("Share: {:.2}%", leaf.percent),
                    ],
                );
                hover(&mut self.frame, key, tooltip)
            }
        }
    }
}
