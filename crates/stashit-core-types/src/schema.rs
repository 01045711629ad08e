//! Canonical event names for structured logging
//!
//! The logging macros and the pipeline emit these as the `event` field;
//! tests match captured events against the same constants.

pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

/// A candidate that was turned away without failing the run
pub const EVENT_REJECTED: &str = "rejected";
/// A trigger file that does not name a usable transfer directory
pub const EVENT_SKIPPED: &str = "skipped";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_distinct() {
        let events = [
            EVENT_START,
            EVENT_END,
            EVENT_END_ERROR,
            EVENT_REJECTED,
            EVENT_SKIPPED,
        ];
        for (i, a) in events.iter().enumerate() {
            for b in &events[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
