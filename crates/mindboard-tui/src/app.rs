//! TUI application state and input handling

use crossterm::event::{KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use mindboard_core::{
    CoreError, Dashboard, DashboardEvent, LoadReport, PointerOutcome, Tooltip, WidgetId,
};
use ratatui::layout::{Position, Rect};
use std::path::Path;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Where a widget was last drawn (canvas area, inside the panel border)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Panel {
    pub id: WidgetId,
    pub area: Rect,
}

/// Tooltip anchored at the terminal cell under the pointer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverTip {
    pub tooltip: Tooltip,
    pub column: u16,
    pub row: u16,
}

/// Map a terminal cell inside `area` to scene coordinates (cell centre)
pub fn to_scene(area: Rect, width: f64, height: f64, column: u16, row: u16) -> Option<(f64, f64)> {
    if area.width == 0 || area.height == 0 || !area.contains(Position::new(column, row)) {
        return None;
    }
    let x = (f64::from(column - area.x) + 0.5) * width / f64::from(area.width);
    let y = (f64::from(row - area.y) + 0.5) * height / f64::from(area.height);
    Some((x, y))
}

pub struct App {
    /// Available once the survey has loaded
    pub dashboard: Option<Dashboard>,

    /// Out-of-band mirror of every published event
    event_rx: Option<broadcast::Receiver<DashboardEvent>>,

    pub is_loading: bool,

    pub loading_message: Option<String>,

    pub should_quit: bool,

    /// Error/warning message to display
    pub status_message: Option<String>,

    /// Name of the last event seen on the bus
    pub last_event: Option<&'static str>,

    pub tooltip: Option<HoverTip>,

    /// Widget under the pointer at the last motion event
    hovered: Option<WidgetId>,

    /// Panel areas from the last draw, used for hit testing
    pub panels: Vec<Panel>,
}

impl App {
    pub fn new(csv_path: &Path) -> Self {
        Self {
            dashboard: None,
            event_rx: None,
            is_loading: true,
            loading_message: Some(format!("Loading {}...", csv_path.display())),
            should_quit: false,
            status_message: None,
            last_event: None,
            tooltip: None,
            hovered: None,
            panels: Vec::new(),
        }
    }

    /// App over an already loaded dashboard
    pub fn with_dashboard(dashboard: Dashboard) -> Self {
        let mut app = Self::new(Path::new(""));
        app.install(dashboard);
        app
    }

    fn install(&mut self, dashboard: Dashboard) {
        self.event_rx = Some(dashboard.observe());
        self.dashboard = Some(dashboard);
        self.is_loading = false;
        self.loading_message = None;
    }

    /// Finish the loading phase with the background task's result
    pub fn complete_loading(&mut self, result: Result<(Dashboard, LoadReport), CoreError>) {
        match result {
            Ok((dashboard, report)) => {
                if report.rows_dropped() > 0 {
                    self.status_message = Some(report.summary_line());
                }
                self.install(dashboard);
            }
            Err(e) => {
                warn!(error = %e, "Survey load failed");
                self.is_loading = false;
                self.loading_message = None;
                self.status_message = Some(format!("Load failed: {}", e));
            }
        }
    }

    /// Drain the event mirror for the status bar
    pub fn poll_events(&mut self) {
        let Some(rx) = self.event_rx.as_mut() else {
            return;
        };
        loop {
            match rx.try_recv() {
                Ok(event) => self.last_event = Some(event.name()),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    debug!(skipped, "Status bar lagged behind the event bus");
                }
                Err(_) => break,
            }
        }
    }

    /// Handle keyboard input. Returns true if the key was handled.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        match key {
            KeyCode::Char('q') => {
                self.should_quit = true;
                true
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                true
            }
            KeyCode::Char('v') => {
                let Some(dashboard) = self.dashboard.as_mut() else {
                    return false;
                };
                dashboard.toggle_view_mode();
                self.tooltip = None;
                true
            }
            KeyCode::Char('c') | KeyCode::Esc => {
                let Some(dashboard) = self.dashboard.as_mut() else {
                    return false;
                };
                dashboard.clear();
                self.tooltip = None;
                true
            }
            _ => false,
        }
    }

    /// Left click selects, pointer motion hovers
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.tooltip = None;
                if let Some((id, x, y)) = self.locate(mouse.column, mouse.row) {
                    if let Some(dashboard) = self.dashboard.as_mut() {
                        if let PointerOutcome::Publish(event) = dashboard.click(id, x, y) {
                            debug!(widget = %id, event = event.name(), "Click");
                        }
                    }
                }
            }
            MouseEventKind::Moved => {
                let located = self.locate(mouse.column, mouse.row);
                let entered = located.map(|(id, _, _)| id);
                if let (Some(left), Some(dashboard)) = (self.hovered, self.dashboard.as_mut()) {
                    if entered != Some(left) {
                        dashboard.leave(left);
                    }
                }
                self.hovered = entered;
                self.tooltip = match (located, self.dashboard.as_mut()) {
                    (Some((id, x, y)), Some(dashboard)) => dashboard.hover(id, x, y).map(|tooltip| HoverTip {
                        tooltip,
                        column: mouse.column,
                        row: mouse.row,
                    }),
                    _ => None,
                };
            }
            _ => {}
        }
    }

    /// Panel under a terminal cell, with the cell in that widget's scene coordinates
    fn locate(&self, column: u16, row: u16) -> Option<(WidgetId, f64, f64)> {
        let dashboard = self.dashboard.as_ref()?;
        self.panels.iter().find_map(|panel| {
            let scene = dashboard.widget(panel.id)?.scene();
            let (x, y) = to_scene(panel.area, scene.width(), scene.height(), column, row)?;
            Some((panel.id, x, y))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindboard_core::models::ViewMode;
    use mindboard_core::{DashboardConfig, SelectionMode, SurveyParser};

    const CSV: &str = "Age,Course,Gender,CGPA,Stress_Level,Depression_Score,Anxiety_Score,Sleep_Quality,Physical_Activity,Diet_Quality,Social_Support,Relationship_Status,Substance_Use,Counseling_Service_Use,Family_History,Chronic_Illness,Financial_Stress,Extracurricular_Involvement,Semester_Credit_Load,Residence_Type
20,Law,Female,3.2,1,1,1,Good,Average,Poor,High,Single,Never,Never,No,No,2,Moderate,17,On-Campus
21,Medical,Male,3.6,4,4,4,Poor,Low,Good,Low,Single,Never,Frequently,No,No,4,High,20,Off-Campus";

    fn loaded_app() -> App {
        let (rows, _) = SurveyParser::new().parse_str(CSV, Path::new("test.csv")).unwrap();
        let mut dashboard = Dashboard::new(DashboardConfig::default());
        dashboard.load(rows);
        App::with_dashboard(dashboard)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_to_scene_maps_cell_centres() {
        let area = Rect::new(10, 5, 20, 10);
        assert_eq!(to_scene(area, 200.0, 100.0, 10, 5), Some((5.0, 5.0)));
        assert_eq!(to_scene(area, 200.0, 100.0, 29, 14), Some((195.0, 95.0)));
        assert_eq!(to_scene(area, 200.0, 100.0, 30, 5), None);
        assert_eq!(to_scene(area, 200.0, 100.0, 9, 5), None);
        assert_eq!(to_scene(Rect::new(0, 0, 0, 0), 1.0, 1.0, 0, 0), None);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = App::new(Path::new("survey.csv"));
        assert!(app.handle_key(KeyCode::Char('q'), KeyModifiers::NONE));
        assert!(app.should_quit);

        let mut app = App::new(Path::new("survey.csv"));
        assert!(app.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_dashboard_keys_need_data() {
        let mut app = App::new(Path::new("survey.csv"));
        assert!(app.is_loading);
        assert!(!app.handle_key(KeyCode::Char('v'), KeyModifiers::NONE));
        assert!(!app.handle_key(KeyCode::Esc, KeyModifiers::NONE));
    }

    #[test]
    fn test_view_toggle_key() {
        let mut app = loaded_app();
        assert!(app.handle_key(KeyCode::Char('v'), KeyModifiers::NONE));
        assert_eq!(app.dashboard.as_ref().unwrap().view_mode(), ViewMode::Overall);

        app.poll_events();
        assert_eq!(app.last_event, Some(DashboardEvent::ViewModeChanged { mode: ViewMode::Overall }.name()));
    }

    #[test]
    fn test_clear_key_resets_selection() {
        let mut app = loaded_app();
        let dashboard = app.dashboard.as_mut().unwrap();
        dashboard.interact(WidgetId::DotMatrix, mindboard_core::PointerAction::Click, "row-0");
        assert_eq!(dashboard.selection().mode(), SelectionMode::Row);

        assert!(app.handle_key(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(app.dashboard.as_ref().unwrap().selection().mode(), SelectionMode::None);
    }

    #[test]
    fn test_click_on_panel_reaches_widget() {
        let mut app = loaded_app();
        let dashboard = app.dashboard.as_mut().unwrap();
        dashboard.interact(WidgetId::DotMatrix, mindboard_core::PointerAction::Click, "row-1");
        assert_eq!(dashboard.selection().mode(), SelectionMode::Row);

        // top-left cell of the bar chart panel is chart background
        app.panels = vec![Panel {
            id: WidgetId::BarChart,
            area: Rect::new(0, 0, 40, 20),
        }];
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 0, 0));
        assert_eq!(app.dashboard.as_ref().unwrap().selection().mode(), SelectionMode::None);
    }

    #[test]
    fn test_pointer_outside_panels_drops_tooltip() {
        let mut app = loaded_app();
        app.tooltip = Some(HoverTip {
            tooltip: Tooltip::new("stale", Vec::new()),
            column: 0,
            row: 0,
        });
        app.handle_mouse(mouse(MouseEventKind::Moved, 100, 100));
        assert!(app.tooltip.is_none());
    }

    #[test]
    fn test_hover_highlight_cleared_when_pointer_leaves_panel() {
        let mut app = loaded_app();
        let area = Rect::new(1, 1, 40, 20);
        app.panels = vec![Panel {
            id: WidgetId::BarChart,
            area,
        }];

        let over_element = (area.x..area.right())
            .flat_map(|column| (area.y..area.bottom()).map(move |row| (column, row)))
            .find(|&(column, row)| {
                app.handle_mouse(mouse(MouseEventKind::Moved, column, row));
                app.tooltip.is_some()
            });
        assert!(over_element.is_some(), "no bar under any cell");

        let highlighted = |app: &App| {
            app.dashboard
                .as_ref()
                .unwrap()
                .widget(WidgetId::BarChart)
                .unwrap()
                .scene()
                .layers()
                .flat_map(|(_, elements)| elements.iter())
                .filter(|e| e.classes.highlighted)
                .count()
        };
        assert_eq!(highlighted(&app), 1);

        // border cell, outside the canvas area
        app.handle_mouse(mouse(MouseEventKind::Moved, 0, 0));
        assert!(app.tooltip.is_none());
        assert_eq!(highlighted(&app), 0);
    }

    #[test]
    fn test_failed_load_reports_error() {
        let mut app = App::new(Path::new("missing.csv"));
        app.complete_loading(Err(CoreError::FileNotFound {
            path: "missing.csv".into(),
        }));
        assert!(!app.is_loading);
        assert!(app.dashboard.is_none());
        assert!(app.status_message.as_deref().unwrap().starts_with("Load failed"));
    }
}
