//! Dashboard controller
//!
//! Owns every piece of shared state (dataset store, selection, view mode)
//! and the widgets. Widgets report clicks as events; the controller is the
//! first subscriber of every topic, so by the time a widget is notified the
//! selection and working set already reflect the event.

use crate::config::DashboardConfig;
use crate::error::{CoreError, LoadReport};
use crate::event::{DashboardEvent, EventBus, Subscriber, Topic};
use crate::models::{Row, ViewMode};
use crate::parsers::SurveyParser;
use crate::selection::{SelectionState, Transition};
use crate::store::DatasetStore;
use crate::widgets::{
    default_widgets, ChartWidget, PointerAction, PointerOutcome, Tooltip, WidgetContext, WidgetId,
};
use std::path::Path;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Who gets an event after the controller has handled it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    /// Nothing changed
    Skip,
    /// Subscribers of the event's topic, in order
    Subscribers,
    /// Clear cascade: every widget
    All,
}

/// The coordinated dashboard: shared state, event bus and widgets
pub struct Dashboard {
    config: DashboardConfig,
    store: DatasetStore,
    selection: SelectionState,
    view_mode: ViewMode,
    bus: EventBus,
    widgets: Vec<Box<dyn ChartWidget>>,
}

impl Dashboard {
    /// Dashboard with the standard 20 widgets
    pub fn new(config: DashboardConfig) -> Self {
        let widgets = default_widgets(&config);
        Self::with_widgets(config, widgets)
    }

    /// Dashboard with a custom widget set, subscribed in the given order
    pub fn with_widgets(config: DashboardConfig, widgets: Vec<Box<dyn ChartWidget>>) -> Self {
        let mut bus = EventBus::new(config.bus_capacity.max(1));
        for topic in Topic::ALL {
            bus.subscribe(topic, Subscriber::Controller);
        }
        for widget in &widgets {
            for topic in widget.topics() {
                bus.subscribe(*topic, Subscriber::Widget(widget.id()));
            }
        }

        Self {
            view_mode: config.default_view_mode,
            config,
            store: DatasetStore::new(),
            selection: SelectionState::new(),
            bus,
            widgets,
        }
    }

    /// Load a survey CSV and build a dashboard over it
    pub async fn open(config: DashboardConfig, path: &Path) -> Result<(Self, LoadReport), CoreError> {
        let parser = SurveyParser::from_config(&config);
        let (rows, report) = parser.load(path).await?;
        let mut dashboard = Self::new(config);
        dashboard.load(rows);
        Ok((dashboard, report))
    }

    /// Install the dataset and draw every widget. Only the first call has an effect.
    pub fn load(&mut self, rows: Vec<Row>) -> bool {
        if !self.store.load(rows) {
            return false;
        }
        info!(rows = self.store.len(), widgets = self.widgets.len(), "Dashboard loaded");

        let ctx = WidgetContext {
            store: &self.store,
            selection: &self.selection,
            view_mode: self.view_mode,
            config: &self.config,
        };
        for widget in self.widgets.iter_mut() {
            if let Err(e) = widget.render(&ctx) {
                warn!(widget = %widget.id(), error = %e, "Initial render failed");
            }
        }
        true
    }

    // ===================
    // Event flow
    // ===================

    /// Publish an event and deliver everything queued
    pub fn dispatch(&mut self, event: DashboardEvent) -> usize {
        self.bus.publish(event);
        self.pump()
    }

    /// Deliver queued events one at a time, oldest first. Returns how many were delivered.
    pub fn pump(&mut self) -> usize {
        let mut delivered = 0;
        while let Some(event) = self.bus.next() {
            self.deliver(&event);
            delivered += 1;
        }
        delivered
    }

    fn deliver(&mut self, event: &DashboardEvent) {
        let mut delivery = Delivery::Skip;
        let mut targets = Vec::new();
        for subscriber in self.bus.subscribers(event.topic()) {
            match subscriber {
                Subscriber::Controller => delivery = self.handle(event),
                Subscriber::Widget(id) => targets.push(id),
            }
        }

        debug!(
            event = event.name(),
            mode = %self.selection.mode(),
            working = self.store.working().len(),
            ?delivery,
            "Event delivered"
        );

        match delivery {
            Delivery::Skip => {}
            Delivery::Subscribers => self.notify(event, |id| targets.contains(&id)),
            Delivery::All => self.notify(event, |_| true),
        }
    }

    /// Apply an event to shared state
    fn handle(&mut self, event: &DashboardEvent) -> Delivery {
        let transition = match event {
            DashboardEvent::SelectionChanged { row } => self.selection.select_row(row.clone()),
            DashboardEvent::FilterChanged { pairs } => self.selection.set_pairs(pairs.clone()),
            DashboardEvent::CategoryToggled { category } => self.selection.toggle_category(*category),
            DashboardEvent::Cleared => self.selection.clear(),
            DashboardEvent::ViewModeChanged { mode } => {
                if *mode == self.view_mode {
                    return Delivery::Skip;
                }
                self.view_mode = *mode;
                return Delivery::Subscribers;
            }
        };

        match transition {
            Transition::Unchanged => Delivery::Skip,
            Transition::Refined(_) => {
                self.apply_filter();
                Delivery::Subscribers
            }
            Transition::Cleared | Transition::Entered(_) => {
                self.store.reset();
                for widget in self.widgets.iter_mut() {
                    widget.clear_interaction();
                }
                self.apply_filter();
                Delivery::All
            }
        }
    }

    fn apply_filter(&mut self) {
        let filter = self
            .selection
            .active_filter()
            .row_filter(self.config.severity_threshold);
        self.store.apply_filter(filter);
    }

    /// Run `on_event` on matching widgets. A failing widget keeps its previous render.
    fn notify(&mut self, event: &DashboardEvent, mut wanted: impl FnMut(WidgetId) -> bool) {
        let ctx = WidgetContext {
            store: &self.store,
            selection: &self.selection,
            view_mode: self.view_mode,
            config: &self.config,
        };
        for widget in self.widgets.iter_mut().filter(|w| wanted(w.id())) {
            if let Err(e) = widget.on_event(event, &ctx) {
                warn!(
                    widget = %widget.id(),
                    event = event.name(),
                    error = %e,
                    "Widget update failed, keeping previous render"
                );
            }
        }
    }

    // ===================
    // User input
    // ===================

    /// Click at widget coordinates
    pub fn click(&mut self, id: WidgetId, x: f64, y: f64) -> PointerOutcome {
        self.pointer_at(id, PointerAction::Click, x, y)
    }

    /// Hover at widget coordinates; returns the tooltip to show, if any
    pub fn hover(&mut self, id: WidgetId, x: f64, y: f64) -> Option<Tooltip> {
        match self.pointer_at(id, PointerAction::Hover, x, y) {
            PointerOutcome::Tooltip(tooltip) => Some(tooltip),
            _ => None,
        }
    }

    /// Pointer left the widget: drop its hover highlight
    pub fn leave(&mut self, id: WidgetId) {
        if let Some(widget) = self.widgets.iter_mut().find(|w| w.id() == id) {
            widget.clear_interaction();
        }
    }

    fn pointer_at(&mut self, id: WidgetId, action: PointerAction, x: f64, y: f64) -> PointerOutcome {
        let Some(widget) = self.widgets.iter_mut().find(|w| w.id() == id) else {
            return PointerOutcome::Ignored;
        };
        match widget.scene().hit_test(x, y).map(|e| e.key.clone()) {
            Some(key) => self.interact(id, action, &key),
            None => {
                if action == PointerAction::Hover {
                    widget.clear_interaction();
                }
                PointerOutcome::Ignored
            }
        }
    }

    /// Pointer action on the element `key` of widget `id`
    pub fn interact(&mut self, id: WidgetId, action: PointerAction, key: &str) -> PointerOutcome {
        let ctx = WidgetContext {
            store: &self.store,
            selection: &self.selection,
            view_mode: self.view_mode,
            config: &self.config,
        };
        let Some(widget) = self.widgets.iter_mut().find(|w| w.id() == id) else {
            return PointerOutcome::Ignored;
        };
        if !widget.is_visible(self.view_mode) {
            return PointerOutcome::Ignored;
        }

        let outcome = widget.pointer(action, key, &ctx);
        if let PointerOutcome::Publish(event) = &outcome {
            self.dispatch(event.clone());
        }
        outcome
    }

    /// Background click anywhere: back to NONE
    pub fn clear(&mut self) {
        self.dispatch(DashboardEvent::Cleared);
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.dispatch(DashboardEvent::ViewModeChanged { mode });
    }

    pub fn toggle_view_mode(&mut self) {
        self.set_view_mode(self.view_mode.toggled());
    }

    // ===================
    // Read accessors
    // ===================

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn store(&self) -> &DatasetStore {
        &self.store
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Observe every published event out of band
    pub fn observe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.bus.observe()
    }

    pub fn widgets(&self) -> &[Box<dyn ChartWidget>] {
        &self.widgets
    }

    pub fn widget(&self, id: WidgetId) -> Option<&dyn ChartWidget> {
        self.widgets.iter().find(|w| w.id() == id).map(|w| w.as_ref())
    }

    /// Widgets shown in the current view mode
    pub fn visible_widgets(&self) -> impl Iterator<Item = &dyn ChartWidget> {
        let mode = self.view_mode;
        self.widgets
            .iter()
            .filter(move |w| w.is_visible(mode))
            .map(|w| w.as_ref())
    }
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("rows", &self.store.len())
            .field("working", &self.store.working().len())
            .field("mode", &self.selection.mode())
            .field("view_mode", &self.view_mode)
            .field("widgets", &self.widgets.len())
            .finish()
    }
}
