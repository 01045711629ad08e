//! In-memory event capture for tests
//!
//! One capture layer is installed per test binary. Tests in the same binary
//! run in parallel and share it, so assertions should select events by a
//! value unique to the test (an op name or an identity) rather than by count
//! over the whole buffer.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// One recorded event, every field rendered to a string
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub component: Option<String>,
    pub op: Option<String>,
    pub event: Option<String>,
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    fn from_fields(level: Level, fields: HashMap<String, String>) -> Self {
        Self {
            level,
            component: fields.get("component").cloned(),
            op: fields.get("op").cloned(),
            event: fields.get("event").cloned(),
            fields,
        }
    }

    fn is(&self, op: &str, event: &str) -> bool {
        self.op.as_deref() == Some(op) && self.event.as_deref() == Some(event)
    }
}

#[derive(Default)]
struct Fields(HashMap<String, String>);

impl Fields {
    fn put(&mut self, field: &Field, value: String) {
        self.0.insert(field.name().to_string(), value);
    }
}

impl Visit for Fields {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value.to_string());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.put(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value.to_string());
    }
}

type Buffer = Arc<Mutex<Vec<CapturedEvent>>>;

struct CaptureLayer {
    buffer: Buffer,
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = Fields::default();
        event.record(&mut fields);
        let captured = CapturedEvent::from_fields(*event.metadata().level(), fields.0);

        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.push(captured);
        }
    }
}

/// Read handle over the shared capture buffer
#[derive(Clone)]
pub struct TestCapture {
    buffer: Buffer,
}

impl TestCapture {
    /// Snapshot of everything captured so far
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.buffer
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// # Panics
    ///
    /// Panics unless an event with this `op` and `event` was captured.
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let events = self.events();
        assert!(
            events.iter().any(|e| e.is(op, event)),
            "Expected event op={} event={} not found among {} captured events",
            op,
            event,
            events.len()
        );
    }

    /// Events whose field `key` equals `value`
    pub fn events_with_field(&self, key: &str, value: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.fields.get(key).map(String::as_str) == Some(value))
            .collect()
    }

    pub fn count_events<F>(&self, predicate: F) -> usize
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.events().iter().filter(|e| predicate(e)).count()
    }
}

static GLOBAL_CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture layer as the global subscriber (first call only) and
/// return a handle to it.
///
/// ```
/// use stashit_core::logging_facility::init_test_capture;
/// use stashit_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("scan_triggers");
/// capture.assert_event_exists("scan_triggers", "start");
/// ```
pub fn init_test_capture() -> TestCapture {
    GLOBAL_CAPTURE
        .get_or_init(|| {
            let buffer = Buffer::default();
            let layer = CaptureLayer {
                buffer: buffer.clone(),
            };
            let _ = tracing_subscriber::registry().with(layer).try_init();
            TestCapture { buffer }
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture_with(events: Vec<CapturedEvent>) -> TestCapture {
        TestCapture {
            buffer: Arc::new(Mutex::new(events)),
        }
    }

    fn rejected(identity: &str) -> CapturedEvent {
        let mut fields = HashMap::new();
        fields.insert("op".to_string(), "process_candidate".to_string());
        fields.insert("event".to_string(), "rejected".to_string());
        fields.insert("identity".to_string(), identity.to_string());
        CapturedEvent::from_fields(Level::WARN, fields)
    }

    #[test]
    fn test_well_known_fields_are_lifted() {
        let event = rejected("coll1");
        assert_eq!(event.op.as_deref(), Some("process_candidate"));
        assert_eq!(event.event.as_deref(), Some("rejected"));
        assert!(event.component.is_none());
        assert_eq!(event.level, Level::WARN);
    }

    #[test]
    fn test_events_with_field_filters_on_value() {
        let capture = capture_with(vec![rejected("coll1"), rejected("coll2")]);

        assert_eq!(capture.events_with_field("identity", "coll1").len(), 1);
        assert!(capture.events_with_field("identity", "coll3").is_empty());
        assert_eq!(capture.count_events(|e| e.level == Level::WARN), 2);
    }

    #[test]
    fn test_assert_event_exists_matches_op_and_event() {
        let capture = capture_with(vec![rejected("coll1")]);
        capture.assert_event_exists("process_candidate", "rejected");
    }
}
