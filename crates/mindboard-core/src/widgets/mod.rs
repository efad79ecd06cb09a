//! Chart widgets
//!
//! A widget turns the shared dataset and selection into a keyed element list
//! and joins it into its own retained `Scene`. Widgets read shared state
//! through a `WidgetContext` borrow and never write it: a click yields at
//! most one `DashboardEvent` for the controller to publish, a hover only
//! changes the widget's own cosmetic highlight.

use crate::config::DashboardConfig;
use crate::error::WidgetError;
use crate::event::{DashboardEvent, Topic};
use crate::models::{Indicator, Level, Row, RowId, ViewMode};
use crate::scene::{Element, JoinSummary, Scene};
use crate::selection::SelectionState;
use crate::store::{DatasetStore, WorkingSet};
use std::fmt;
use tracing::debug;

pub mod bar_chart;
pub mod dot_matrix;
pub mod heat_map;
pub mod heat_map_circle;
pub mod mini_bar;
pub mod scale;
pub mod tree_map;

pub use bar_chart::BarChart;
pub use dot_matrix::DotMatrix;
pub use heat_map::HeatMap;
pub use heat_map_circle::HeatMapCircle;
pub use mini_bar::MiniBarChart;
pub use tree_map::TreeMap;

/// Key of the clickable background every widget draws first
pub const BACKGROUND: &str = "background";

/// Shared colours
pub mod palette {
    use crate::models::Course;
    use crate::scene::Color;

    pub const HIGHLIGHT: Color = Color::hex(0xffff00);
    pub const STROKE: Color = Color::hex(0x000000);
    pub const BACKGROUND: Color = Color::hex(0xffffff);
    pub const TEXT: Color = Color::hex(0x333333);
    pub const INACTIVE: Color = Color::hex(0xd9d9d9);

    pub const CIRCLE: Color = Color::hex(0xe0f4ff);
    pub const CIRCLE_STROKE: Color = Color::hex(0x87c4ff);

    pub fn course(course: Course) -> Color {
        match course {
            Course::Business => Color::hex(0xff8c38),
            Course::ComputerScience => Color::hex(0x6e40aa),
            Course::Engineering => Color::hex(0xe600db),
            Course::Law => Color::hex(0xffe133),
            Course::Medical => Color::hex(0xe60031),
            Course::Others => Color::hex(0xaff05b),
        }
    }
}

/// Widget type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    DotMatrix,
    HeatMap,
    HeatMapCircle,
    MiniBar,
    BarChart,
    TreeMap,
}

/// Identity of one widget instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetId {
    DotMatrix,
    HeatMap,
    HeatMapCircle,
    MiniBar { level: Level, indicator: Indicator },
    BarChart,
    TreeMap,
}

impl WidgetId {
    pub fn kind(&self) -> WidgetKind {
        match self {
            WidgetId::DotMatrix => WidgetKind::DotMatrix,
            WidgetId::HeatMap => WidgetKind::HeatMap,
            WidgetId::HeatMapCircle => WidgetKind::HeatMapCircle,
            WidgetId::MiniBar { .. } => WidgetKind::MiniBar,
            WidgetId::BarChart => WidgetKind::BarChart,
            WidgetId::TreeMap => WidgetKind::TreeMap,
        }
    }

    /// Panel title
    pub fn title(&self) -> String {
        match self {
            WidgetId::DotMatrix => "Financial Stress".to_string(),
            WidgetId::HeatMap => "Students by Course and Age".to_string(),
            WidgetId::HeatMapCircle => "Well-being Overview".to_string(),
            WidgetId::MiniBar { level, indicator } => format!("{} {}", level, indicator.label()),
            WidgetId::BarChart => "Counseling Use and CGPA".to_string(),
            WidgetId::TreeMap => "Mental Health Indices".to_string(),
        }
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetId::DotMatrix => f.write_str("dot-matrix"),
            WidgetId::HeatMap => f.write_str("heat-map"),
            WidgetId::HeatMapCircle => f.write_str("heat-map-circle"),
            WidgetId::MiniBar { level, indicator } => write!(
                f,
                "mini-bar/{}-{}",
                level.name().to_lowercase(),
                indicator.short_name()
            ),
            WidgetId::BarChart => f.write_str("bar-chart"),
            WidgetId::TreeMap => f.write_str("tree-map"),
        }
    }
}

/// Read-only view of shared state handed to widgets
#[derive(Debug, Clone, Copy)]
pub struct WidgetContext<'a> {
    pub store: &'a DatasetStore,
    pub selection: &'a SelectionState,
    pub view_mode: ViewMode,
    pub config: &'a DashboardConfig,
}

impl<'a> WidgetContext<'a> {
    pub fn working(&self) -> &'a WorkingSet {
        self.store.working()
    }

    pub fn original(&self) -> &'a WorkingSet {
        self.store.original()
    }

    /// Original row by load id
    pub fn row(&self, id: RowId) -> Option<&'a Row> {
        let original = self.store.original();
        original
            .get(id.0 as usize)
            .filter(|r| r.id == id)
            .or_else(|| original.iter().find(|r| r.id == id))
    }
}

/// Cosmetic highlight criterion; never changes data
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Highlight {
    #[default]
    None,
    /// The element with this key
    Element(String),
}

impl Highlight {
    pub fn matches(&self, key: &str) -> bool {
        match self {
            Highlight::None => false,
            Highlight::Element(k) => k == key,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    Click,
    Hover,
}

/// Local tooltip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tooltip {
    pub title: String,
    pub lines: Vec<String>,
}

impl Tooltip {
    pub fn new(title: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            title: title.into(),
            lines,
        }
    }
}

/// Result of a pointer interaction
#[derive(Debug, Clone, PartialEq)]
pub enum PointerOutcome {
    Ignored,
    /// Click: the single event to publish
    Publish(DashboardEvent),
    /// Hover: show locally
    Tooltip(Tooltip),
}

/// Layers produced by one build, in draw order
pub type Layers = Vec<(&'static str, Vec<Element>)>;

/// State every widget carries: identity, retained scene, local highlight
#[derive(Debug, Clone)]
pub struct WidgetFrame {
    id: WidgetId,
    scene: Scene,
    highlight: Highlight,
}

impl WidgetFrame {
    pub fn new(id: WidgetId, width: f64, height: f64) -> Self {
        Self {
            id,
            scene: Scene::new(width, height),
            highlight: Highlight::None,
        }
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn highlight(&self) -> &Highlight {
        &self.highlight
    }

    /// Label of the interactive element with `key`
    pub fn label_of(&self, key: &str) -> Option<&str> {
        self.scene
            .layers()
            .flat_map(|(_, elements)| elements.iter())
            .find(|e| e.interactive && e.key == key)
            .and_then(|e| e.label.as_deref())
    }

    /// Join every layer, all or nothing
    fn commit(&mut self, layers: Layers, extent: (f64, f64)) -> Result<JoinSummary, WidgetError> {
        let mut next = self.scene.clone();
        next.resize(extent.0, extent.1);
        let mut summary = JoinSummary::default();
        for (name, mut elements) in layers {
            for e in &mut elements {
                e.classes.highlighted = e.interactive && self.highlight.matches(&e.key);
            }
            summary += next.join(name, elements).map_err(|source| WidgetError::Scene {
                widget: self.id,
                source,
            })?;
        }
        self.scene = next;
        Ok(summary)
    }

    fn restyle_layer(&mut self, layer: &str) -> usize {
        let highlight = &self.highlight;
        self.scene.restyle(layer, |e| {
            e.classes.highlighted = e.interactive && highlight.matches(&e.key);
        })
    }

    fn set_highlight(&mut self, highlight: Highlight) -> usize {
        if self.highlight == highlight {
            return 0;
        }
        self.highlight = highlight;
        let names: Vec<String> = self.scene.layers().map(|(name, _)| name.to_string()).collect();
        names.iter().map(|name| self.restyle_layer(name)).sum()
    }
}

/// Background rectangle covering the whole widget; clicking it clears
pub fn background(width: f64, height: f64) -> Element {
    Element::rect(BACKGROUND, 0.0, 0.0, width, height)
        .fill(palette::BACKGROUND)
        .interactive()
}

/// Shared click/hover handling for the background element
pub fn background_pointer(frame: &mut WidgetFrame, action: PointerAction) -> PointerOutcome {
    match action {
        PointerAction::Click => PointerOutcome::Publish(DashboardEvent::Cleared),
        PointerAction::Hover => {
            frame.set_highlight(Highlight::None);
            PointerOutcome::Ignored
        }
    }
}

/// Hover over a data element: highlight it locally and return its tooltip
pub fn hover(frame: &mut WidgetFrame, key: &str, tooltip: Tooltip) -> PointerOutcome {
    frame.set_highlight(Highlight::Element(key.to_string()));
    PointerOutcome::Tooltip(tooltip)
}

/// A chart bound to the shared dataset
pub trait ChartWidget: Send {
    fn frame(&self) -> &WidgetFrame;

    fn frame_mut(&mut self) -> &mut WidgetFrame;

    /// Topics this widget reacts to
    fn topics(&self) -> &'static [Topic];

    /// Full element list for the current state
    fn build(&self, ctx: &WidgetContext<'_>) -> Layers;

    /// Handle a click or hover on the element with `key`
    fn pointer(&mut self, action: PointerAction, key: &str, ctx: &WidgetContext<'_>) -> PointerOutcome;

    fn id(&self) -> WidgetId {
        self.frame().id()
    }

    fn kind(&self) -> WidgetKind {
        self.id().kind()
    }

    fn is_visible(&self, _mode: ViewMode) -> bool {
        true
    }

    fn scene(&self) -> &Scene {
        self.frame().scene()
    }

    /// Scene size for the current data; fixed unless the layout grows with it
    fn extent(&self, _ctx: &WidgetContext<'_>) -> (f64, f64) {
        let scene = self.scene();
        (scene.width(), scene.height())
    }

    /// First draw: start from an empty scene
    fn render(&mut self, ctx: &WidgetContext<'_>) -> Result<JoinSummary, WidgetError> {
        let frame = self.frame_mut();
        let (width, height) = (frame.scene.width(), frame.scene.height());
        frame.scene = Scene::new(width, height);
        frame.highlight = Highlight::None;
        self.update(ctx)
    }

    /// Rebuild and join. On error the previous scene is kept.
    fn update(&mut self, ctx: &WidgetContext<'_>) -> Result<JoinSummary, WidgetError> {
        if !ctx.store.is_loaded() {
            return Err(WidgetError::NotLoaded { widget: self.id() });
        }
        let layers = self.build(ctx);
        let extent = self.extent(ctx);
        let summary = self.frame_mut().commit(layers, extent)?;
        debug!(
            widget = %self.id(),
            entered = summary.entered,
            updated = summary.updated,
            exited = summary.exited,
            "Widget updated"
        );
        Ok(summary)
    }

    /// Cosmetic highlight; no data recompute
    fn set_highlight(&mut self, highlight: &Highlight) {
        self.frame_mut().set_highlight(highlight.clone());
    }

    fn clear_interaction(&mut self) {
        self.set_highlight(&Highlight::None);
    }

    /// React to a delivered event. Hidden widgets skip the rebuild.
    fn on_event(&mut self, _event: &DashboardEvent, ctx: &WidgetContext<'_>) -> Result<(), WidgetError> {
        if self.is_visible(ctx.view_mode) {
            self.update(ctx)?;
        }
        Ok(())
    }
}

/// All 20 dashboard widgets, in registration order
pub fn default_widgets(config: &DashboardConfig) -> Vec<Box<dyn ChartWidget>> {
    let mut widgets: Vec<Box<dyn ChartWidget>> = vec![
        Box::new(DotMatrix::new(config.dots_per_line)),
        Box::new(HeatMap::new(config.age_range(), config.heat_bucket_size)),
        Box::new(HeatMapCircle::new()),
    ];
    for level in Level::ALL {
        for indicator in Indicator::ALL {
            widgets.push(Box::new(MiniBarChart::new(level, indicator)));
        }
    }
    widgets.push(Box::new(BarChart::new()));
    widgets.push(Box::new(TreeMap::new(config.severity_threshold)));
    widgets
}


#[cfg(test)]
mod tests {
    use super::testing::Fixture;
    use super::*;
    use crate::models::survey::fixtures::row;
    use crate::models::Course;

    #[test]
    fn test_default_widgets_has_twenty_unique_ids() {
        let widgets = default_widgets(&DashboardConfig::default());
        assert_eq!(widgets.len(), 20);

        let ids: std::collections::HashSet<_> = widgets.iter().map(|w| w.id()).collect();
        assert_eq!(ids.len(), 20);
        assert_eq!(
            widgets.iter().filter(|w| w.kind() == WidgetKind::MiniBar).count(),
            15
        );
    }

    #[test]
    fn test_widget_id_display() {
        let id = WidgetId::MiniBar {
            level: Level::High,
            indicator: Indicator::SleepQuality,
        };
        assert_eq!(id.to_string(), "mini-bar/high-sleep");
        assert_eq!(WidgetId::TreeMap.to_string(), "tree-map");
        assert_eq!(id.title(), "High Sleep Quality");
    }

    #[test]
    fn test_update_before_load_fails() {
        let fixture = Fixture {
            store: DatasetStore::new(),
            ..Fixture::new(Vec::new())
        };
        let mut widget = BarChart::new();
        let err = widget.update(&fixture.ctx()).unwrap_err();
        assert!(matches!(err, WidgetError::NotLoaded { .. }));
        assert!(widget.scene().is_empty());
    }

    #[test]
    fn test_every_widget_renders_a_background() {
        let fixture = Fixture::new(vec![row(0, Course::Law, 20), row(1, Course::Medical, 21)]);
        for mut widget in default_widgets(&fixture.config) {
            widget.render(&fixture.ctx()).unwrap();
            let scene = widget.scene();
            assert_eq!(
                scene.hit_test(0.5, 0.5).map(|e| e.key.as_str()),
                Some(BACKGROUND),
                "{}",
                widget.id()
            );
        }
    }

    #[test]
    fn test_background_click_publishes_cleared() {
        let fixture = Fixture::new(vec![row(0, Course::Law, 20)]);
        for mut widget in default_widgets(&fixture.config) {
            widget.render(&fixture.ctx()).unwrap();
            let outcome = widget.pointer(PointerAction::Click, BACKGROUND, &fixture.ctx());
            assert_eq!(outcome, PointerOutcome::Publish(DashboardEvent::Cleared));
        }
    }

    #[test]
    fn test_set_highlight_is_cosmetic() {
        let fixture = Fixture::new(vec![row(0, Course::Law, 20)]);
        let mut widget = BarChart::new();
        widget.render(&fixture.ctx()).unwrap();
        let before = widget.scene().len();

        widget.set_highlight(&Highlight::Element("Never".to_string()));
        assert_eq!(widget.scene().len(), before);
        let highlighted: Vec<_> = widget
            .scene()
            .layers()
            .flat_map(|(_, elements)| elements.iter())
            .filter(|e| e.classes.highlighted)
            .map(|e| e.key.clone())
            .collect();
        assert_eq!(highlighted, vec!["Never".to_string()]);

        widget.clear_interaction();
        assert!(widget
            .scene()
            .layers()
            .flat_map(|(_, elements)| elements.iter())
            .all(|e| !e.classes.highlighted));
    }
}
