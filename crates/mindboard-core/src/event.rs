//! Event bus for dashboard coordination
//!
//! Delivery is synchronous and ordered: published events go into a FIFO
//! queue that the controller drains one event at a time, handing each to
//! its topic's subscribers in subscription order. An event published while
//! another is being delivered waits its turn, so no subscriber is ever
//! re-entered.
//!
//! Every event is also mirrored on a tokio::broadcast channel for
//! out-of-band observers (status line, logging).

use crate::models::{CourseAge, MentalHealthCategory, Row, ViewMode};
use crate::widgets::WidgetId;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::broadcast;

/// Events exchanged between widgets and the controller
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    /// A single respondent was clicked
    SelectionChanged { row: Row },
    /// Heat map selection is now exactly `pairs`
    FilterChanged { pairs: Vec<CourseAge> },
    /// A tree map leaf was clicked
    CategoryToggled { category: MentalHealthCategory },
    /// The view toggle changed
    ViewModeChanged { mode: ViewMode },
    /// A background was clicked
    Cleared,
}

/// Subscription channel of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Selection,
    Filter,
    Category,
    ViewMode,
    Clear,
}

impl DashboardEvent {
    pub fn topic(&self) -> Topic {
        match self {
            DashboardEvent::SelectionChanged { .. } => Topic::Selection,
            DashboardEvent::FilterChanged { .. } => Topic::Filter,
            DashboardEvent::CategoryToggled { .. } => Topic::Category,
            DashboardEvent::ViewModeChanged { .. } => Topic::ViewMode,
            DashboardEvent::Cleared => Topic::Clear,
        }
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            DashboardEvent::SelectionChanged { .. } => "selection-changed",
            DashboardEvent::FilterChanged { .. } => "filter-changed",
            DashboardEvent::CategoryToggled { .. } => "category-toggled",
            DashboardEvent::ViewModeChanged { .. } => "view-mode-changed",
            DashboardEvent::Cleared => "cleared",
        }
    }
}

impl Topic {
    pub const ALL: [Topic; 5] = [
        Topic::Selection,
        Topic::Filter,
        Topic::Category,
        Topic::ViewMode,
        Topic::Clear,
    ];
}

/// Receiver of delivered events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subscriber {
    /// The coordination controller (owner of shared state)
    Controller,
    Widget(WidgetId),
}

/// Ordered pub/sub bus with a broadcast mirror
pub struct EventBus {
    subscriptions: Vec<(Topic, Subscriber)>,
    queue: Mutex<VecDeque<DashboardEvent>>,
    mirror: broadcast::Sender<DashboardEvent>,
}

impl EventBus {
    /// Create a new event bus; `capacity` bounds the broadcast mirror
    pub fn new(capacity: usize) -> Self {
        let (mirror, _) = broadcast::channel(capacity);
        Self {
            subscriptions: Vec::new(),
            queue: Mutex::new(VecDeque::new()),
            mirror,
        }
    }

    /// Create with default capacity (256 events)
    pub fn default_capacity() -> Self {
        Self::new(256)
    }

    /// Register `subscriber` for `topic`. Duplicate registrations are ignored.
    pub fn subscribe(&mut self, topic: Topic, subscriber: Subscriber) {
        if !self.subscriptions.contains(&(topic, subscriber)) {
            self.subscriptions.push((topic, subscriber));
        }
    }

    /// Subscribers of `topic`, in subscription order
    pub fn subscribers(&self, topic: Topic) -> Vec<Subscriber> {
        self.subscriptions
            .iter()
            .filter(|(t, _)| *t == topic)
            .map(|(_, s)| *s)
            .collect()
    }

    /// Queue an event for delivery and mirror it to observers
    pub fn publish(&self, event: DashboardEvent) {
        // Ignore send errors (no observers)
        let _ = self.mirror.send(event.clone());
        self.queue.lock().push_back(event);
    }

    /// Next queued event, oldest first
    pub fn next(&self) -> Option<DashboardEvent> {
        self.queue.lock().pop_front()
    }

    /// Number of events waiting for delivery
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Observe every published event out of band
    pub fn observe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.mirror.subscribe()
    }

    /// Get current number of active observers
    pub fn observer_count(&self) -> usize {
        self.mirror.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::default_capacity()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscriptions.len())
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Course, Indicator, Level};

    #[test]
    fn test_subscribers_in_subscription_order() {
        let mut bus = EventBus::default_capacity();
        bus.subscribe(Topic::Filter, Subscriber::Controller);
        bus.subscribe(Topic::Filter, Subscriber::Widget(WidgetId::BarChart));
        bus.subscribe(Topic::Clear, Subscriber::Widget(WidgetId::TreeMap));
        bus.subscribe(
            Topic::Filter,
            Subscriber::Widget(WidgetId::MiniBar {
                level: Level::High,
                indicator: Indicator::SleepQuality,
            }),
        );
        bus.subscribe(Topic::Filter, Subscriber::Controller);

        let subscribers = bus.subscribers(Topic::Filter);
        assert_eq!(subscribers.len(), 3);
        assert_eq!(subscribers[0], Subscriber::Controller);
        assert_eq!(subscribers[1], Subscriber::Widget(WidgetId::BarChart));
    }

    #[test]
    fn test_queue_is_fifo() {
        let bus = EventBus::default_capacity();
        bus.publish(DashboardEvent::Cleared);
        bus.publish(DashboardEvent::CategoryToggled {
            category: MentalHealthCategory::All,
        });

        assert_eq!(bus.pending(), 2);
        assert_eq!(bus.next(), Some(DashboardEvent::Cleared));
        assert!(matches!(
            bus.next(),
            Some(DashboardEvent::CategoryToggled { .. })
        ));
        assert_eq!(bus.next(), None);
    }

    #[tokio::test]
    async fn test_events_are_mirrored() {
        let bus = EventBus::default_capacity();
        let mut rx = bus.observe();
        assert_eq!(bus.observer_count(), 1);

        bus.publish(DashboardEvent::FilterChanged {
            pairs: vec![CourseAge::new(Course::Law, 20)],
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(event.topic(), Topic::Filter);
    }

    #[test]
    fn test_publish_without_observers_ok() {
        let bus = EventBus::default_capacity();
        // Should not panic even with no observers
        bus.publish(DashboardEvent::ViewModeChanged {
            mode: ViewMode::Overall,
        });
        assert_eq!(bus.pending(), 1);
    }
}
