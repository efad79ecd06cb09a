//! Main UI rendering

use crate::app::{App, HoverTip, Panel};
use crate::theme;
use mindboard_core::models::{Indicator, Level};
use mindboard_core::scene::{Anchor, Scene, Shape};
use mindboard_core::widgets::BACKGROUND;
use mindboard_core::{ChartWidget, Dashboard, WidgetId};
use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Circle, Context, Line as CanvasLine, Rectangle},
        Block, Borders, Clear, Paragraph,
    },
};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Main UI state
pub struct Ui {
    tick: usize,
}

impl Default for Ui {
    fn default() -> Self {
        Self::new()
    }
}

impl Ui {
    pub fn new() -> Self {
        Self { tick: 0 }
    }

    /// Render the full UI
    pub fn render(&mut self, frame: &mut Frame, app: &mut App) {
        let size = frame.area();

        if app.is_loading {
            self.render_loading_screen(frame, size, app);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let panels = match app.dashboard.as_ref() {
            Some(dashboard) => self.render_dashboard(frame, chunks[0], dashboard),
            None => {
                self.render_error_screen(frame, chunks[0], app);
                Vec::new()
            }
        };
        app.panels = panels;

        if let Some(tip) = &app.tooltip {
            self.render_tooltip(frame, chunks[0], tip);
        }
        self.render_status_bar(frame, chunks[1], app);
    }

    fn render_dashboard(&self, frame: &mut Frame, area: Rect, dashboard: &Dashboard) -> Vec<Panel> {
        let ids: Vec<WidgetId> = dashboard.visible_widgets().map(|w| w.id()).collect();
        panel_layout(area, &ids)
            .into_iter()
            .filter_map(|(id, rect)| {
                let widget = dashboard.widget(id)?;
                Some(Panel {
                    id,
                    area: render_panel(frame, rect, widget),
                })
            })
            .collect()
    }

    fn render_loading_screen(&mut self, frame: &mut Frame, area: Rect, app: &App) {
        self.tick = self.tick.wrapping_add(1);
        let loading_area = centered(area, 40, 7);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(Span::styled(
                " mindboard ",
                Style::default().fg(Color::Cyan).bold(),
            ));

        let inner = block.inner(loading_area);
        frame.render_widget(block, loading_area);

        let message = app.loading_message.as_deref().unwrap_or("Loading...");
        let lines = vec![
            Line::default(),
            Line::from(vec![
                Span::raw("  "),
                Span::styled(SPINNER[self.tick % SPINNER.len()], Style::default().fg(Color::Cyan)),
                Span::raw("  "),
                Span::styled(message, Style::default().fg(Color::White)),
            ]),
            Line::default(),
            Line::from(Span::styled(
                "  Press 'q' to quit",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_error_screen(&self, frame: &mut Frame, area: Rect, app: &App) {
        let error_area = centered(area, 60, 7);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(Span::styled(" mindboard ", Style::default().fg(Color::Red).bold()));

        let message = app.status_message.as_deref().unwrap_or("No data");
        let lines = vec![
            Line::default(),
            Line::from(Span::styled(format!("  {}", message), Style::default().fg(Color::White))),
            Line::default(),
            Line::from(Span::styled(
                "  Press 'q' to quit",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        frame.render_widget(Paragraph::new(lines).block(block), error_area);
    }

    fn render_tooltip(&self, frame: &mut Frame, area: Rect, tip: &HoverTip) {
        let text_width = tip
            .tooltip
            .lines
            .iter()
            .map(|l| l.chars().count())
            .chain(std::iter::once(tip.tooltip.title.chars().count() + 2))
            .max()
            .unwrap_or(0);
        let width = (text_width as u16 + 2).min(area.width);
        let height = (tip.tooltip.lines.len() as u16 + 2).min(area.height);

        // Below-right of the pointer, pushed back inside the screen
        let x = tip.column.saturating_add(2).min(area.right().saturating_sub(width));
        let y = tip.row.saturating_add(1).min(area.bottom().saturating_sub(height));
        let rect = Rect::new(x, y, width, height);

        let lines: Vec<Line> = tip
            .tooltip
            .lines
            .iter()
            .map(|l| Line::from(l.as_str()))
            .collect();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(Span::styled(
                format!(" {} ", tip.tooltip.title),
                Style::default().fg(Color::Yellow).bold(),
            ));

        frame.render_widget(Clear, rect);
        frame.render_widget(Paragraph::new(lines).block(block), rect);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect, app: &App) {
        let mut spans = vec![Span::styled(
            " mindboard ",
            Style::default().fg(Color::Black).bg(Color::Cyan).bold(),
        )];

        if let Some(dashboard) = &app.dashboard {
            spans.push(Span::styled(
                format!(" {} ", dashboard.selection().mode()),
                Style::default().fg(Color::Cyan).bold(),
            ));
            spans.push(Span::raw(format!(
                "│ {} view │ {}/{} students ",
                dashboard.view_mode(),
                dashboard.store().working().len(),
                dashboard.store().len()
            )));
        }
        if let Some(event) = app.last_event {
            spans.push(Span::styled(
                format!("│ {} ", event),
                Style::default().fg(Color::DarkGray),
            ));
        }
        if let Some(message) = &app.status_message {
            spans.push(Span::styled(
                format!("│ {} ", message),
                Style::default().fg(Color::Yellow),
            ));
        }
        spans.push(Span::styled(
            "│ v view  c clear  q quit",
            Style::default().fg(Color::DarkGray),
        ));

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

/// `width` percent of `area`, `height` rows tall, centred
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - width) / 2),
            Constraint::Percentage(width),
            Constraint::Percentage((100 - width) / 2),
        ])
        .split(vertical[1])[1]
}

/// Place the visible widgets: dot matrix and heat map on the left, the
/// well-being view in the middle, bar chart and tree map on the right.
/// Mini bars form a grid of indicators (rows) by level (columns).
pub fn panel_layout(area: Rect, ids: &[WidgetId]) -> Vec<(WidgetId, Rect)> {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(40),
            Constraint::Percentage(30),
        ])
        .split(area);

    let left = split_vertical(columns[0], [55, 45]);
    let right = split_vertical(columns[2], [50, 50]);

    let grid_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Ratio(1, Indicator::ALL.len() as u32); 5])
        .split(columns[1]);

    ids.iter()
        .map(|id| {
            let rect = match id {
                WidgetId::DotMatrix => left[0],
                WidgetId::HeatMap => left[1],
                WidgetId::HeatMapCircle => columns[1],
                WidgetId::MiniBar { level, indicator } => {
                    let cells = Layout::default()
                        .direction(Direction::Horizontal)
                        .constraints([Constraint::Ratio(1, Level::ALL.len() as u32); 3])
                        .split(grid_rows[indicator.index()]);
                    cells[level.index()]
                }
                WidgetId::BarChart => right[0],
                WidgetId::TreeMap => right[1],
            };
            (*id, rect)
        })
        .collect()
}

fn split_vertical(area: Rect, percents: [u16; 2]) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints(percents.map(Constraint::Percentage))
        .split(area)
}

/// Draw one widget in a bordered panel; returns the canvas area
fn render_panel(frame: &mut Frame, area: Rect, widget: &dyn ChartWidget) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {} ", widget.id().title()),
            Style::default().fg(Color::White).bold(),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let scene = widget.scene();
    if inner.width == 0 || inner.height == 0 || scene.width() <= 0.0 || scene.height() <= 0.0 {
        return inner;
    }

    let cell = CellSize {
        width: scene.width() / f64::from(inner.width),
        height: scene.height() / f64::from(inner.height),
    };
    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([0.0, scene.width()])
        .y_bounds([0.0, scene.height()])
        .paint(|ctx| paint_scene(ctx, scene, cell));
    frame.render_widget(canvas, inner);

    inner
}

/// One terminal cell in scene units
#[derive(Debug, Clone, Copy)]
struct CellSize {
    width: f64,
    height: f64,
}

/// Scene y grows downward, canvas y grows upward
fn paint_scene(ctx: &mut Context, scene: &Scene, cell: CellSize) {
    let flip = |y: f64| scene.height() - y;

    for (_, elements) in scene.layers() {
        for element in elements.iter().filter(|e| e.key != BACKGROUND) {
            let color = theme::element_color(element);
            match &element.shape {
                Shape::Rect {
                    x,
                    y,
                    width,
                    height,
                } => {
                    let bottom = flip(y + height);
                    if element.fill.is_some() {
                        // braille rows are a quarter cell
                        let step = (cell.height / 4.0).max(f64::EPSILON);
                        let mut row = bottom;
                        while row <= bottom + height {
                            ctx.draw(&CanvasLine {
                                x1: *x,
                                y1: row,
                                x2: x + width,
                                y2: row,
                                color,
                            });
                            row += step;
                        }
                    }
                    ctx.draw(&Rectangle {
                        x: *x,
                        y: bottom,
                        width: *width,
                        height: *height,
                        color,
                    });
                }
                Shape::Circle { cx, cy, r } => ctx.draw(&Circle {
                    x: *cx,
                    y: flip(*cy),
                    radius: *r,
                    color,
                }),
                Shape::Polyline { points } => {
                    for pair in points.windows(2) {
                        ctx.draw(&CanvasLine {
                            x1: pair[0].0,
                            y1: flip(pair[0].1),
                            x2: pair[1].0,
                            y2: flip(pair[1].1),
                            color,
                        });
                    }
                }
                Shape::Text { x, y, text, anchor } => {
                    let x = anchored_x(*x, text.chars().count(), *anchor, cell.width);
                    ctx.print(x, flip(*y), Span::styled(text.clone(), theme::text_style(element)));
                }
                Shape::Icon { x, y, glyph, .. } => {
                    ctx.print(
                        x - cell.width / 2.0,
                        flip(*y),
                        Span::styled(glyph.to_string(), Style::default().fg(color)),
                    );
                }
            }
        }
    }
}

/// Left edge of a text run of `chars` cells anchored at `x`
fn anchored_x(x: f64, chars: usize, anchor: Anchor, cell_width: f64) -> f64 {
    let run = chars as f64 * cell_width;
    match anchor {
        Anchor::Start => x,
        Anchor::Middle => x - run / 2.0,
        Anchor::End => x - run,
    }
}
