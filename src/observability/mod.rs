//! Observability subsystem
//!
//! - Structured logging (JSON lines)
//! - Counters
//! - Typed events
//!
//! Observability is read-only: it never changes the outcome of an operation
//! and never fails one. The publish projector does not log at all.

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::ObservationScope;

/// Log an event at the severity its kind implies
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    if event.is_rejection() {
        Logger::error(event.as_str(), fields);
    } else if event.is_warning() {
        Logger::warn(event.as_str(), fields);
    } else {
        Logger::info(event.as_str(), fields);
    }
}
