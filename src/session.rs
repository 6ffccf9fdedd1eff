//! Explicit backend session context
//!
//! Notebook workflows re-run cells and rebuild models many times in one
//! process. Layer names and other per-session bookkeeping live in a
//! [`Session`] value that the caller creates, passes around, and replaces via
//! [`reset_session`]. Nothing here is process-global.

use std::collections::HashMap;
use uuid::Uuid;

/// Per-session state for building models
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    name_counters: HashMap<String, usize>,
}

impl Session {
    /// Start a fresh session
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            name_counters: HashMap::new(),
        }
    }

    /// Identifier distinguishing this session from ones created before or after it
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Next unique name for `prefix`: `dense_1`, `dense_2`, ...
    pub fn unique_name(&mut self, prefix: &str) -> String {
        let counter = self.name_counters.entry(prefix.to_string()).or_insert(0);
        *counter += 1;
        format!("{prefix}_{counter}")
    }

    /// Number of names handed out for `prefix` so far
    pub fn names_issued(&self, prefix: &str) -> usize {
        self.name_counters.get(prefix).copied().unwrap_or(0)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Tear down `old` and return a clean session
///
/// Taking the old session by value means no handle to its state survives
/// the reset.
pub fn reset_session(old: Session) -> Session {
    let fresh = Session::new();
    tracing::info!(old = %old.id, new = %fresh.id, "session reset");
    fresh
}
