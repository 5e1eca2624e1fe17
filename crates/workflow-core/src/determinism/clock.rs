use chrono::{DateTime, Utc};

/// The workflow-visible wall clock.
///
/// Holds exactly the last `timestamp` an activation carried — never the
/// host's own clock. Query-only activations carry no timestamp (§4.3) and
/// must not advance it, so [`Clock::advance`] takes an `Option`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Clock {
    now: DateTime<Utc>,
}

impl Clock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Advance to `timestamp` if present. A `None` (query-only batch) leaves
    /// the clock untouched — invariant 4 in the data model.
    pub fn advance(&mut self, timestamp: Option<DateTime<Utc>>) {
        if let Some(timestamp) = timestamp {
            self.now = timestamp;
        }
    }
}
