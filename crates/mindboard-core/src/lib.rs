//! mindboard-core - Core library for mindboard
//!
//! Provides the survey model and CSV loader, aggregations, the selection
//! state machine, the event bus and the chart widgets coordinated by
//! `Dashboard`.

pub mod analytics;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod models;
pub mod parsers;
pub mod scene;
pub mod selection;
pub mod store;
pub mod widgets;

pub use analytics::SurveySummary;
pub use config::DashboardConfig;
pub use controller::Dashboard;
pub use error::{CoreError, LoadReport, WidgetError};
pub use event::{DashboardEvent, EventBus, Topic};
pub use parsers::SurveyParser;
pub use scene::{Element, Scene};
pub use selection::{SelectionMode, SelectionState};
pub use store::DatasetStore;
pub use widgets::{ChartWidget, PointerAction, PointerOutcome, Tooltip, WidgetId};
