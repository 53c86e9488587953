//! Latest-request-wins bookkeeping for upstream fetches.
//!
//! Each refresh takes a ticket before it starts. When the response arrives
//! it is applied only if no newer ticket was issued for the same key in the
//! meantime, so a slow early fetch cannot overwrite a later one.

use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    key: String,
    seq: u64,
}

impl Ticket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: Mutex<HashMap<String, u64>>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket newer than every earlier one for `key`.
    pub fn begin(&self, key: &str) -> Ticket {
        let mut latest = self.latest.lock().unwrap_or_else(|e| e.into_inner());
        let seq = latest.entry(key.to_string()).or_insert(0);
        *seq += 1;
        Ticket {
            key: key.to_string(),
            seq: *seq,
        }
    }

    /// Run `apply` only while `ticket` is still the newest for its key.
    ///
    /// The check and the apply happen under one lock so a ticket issued
    /// concurrently cannot slip in between.
    pub fn apply_if_current<F>(&self, ticket: &Ticket, apply: F) -> bool
    where
        F: FnOnce(),
    {
        let latest = self.latest.lock().unwrap_or_else(|e| e.into_inner());
        if latest.get(&ticket.key) != Some(&ticket.seq) {
            return false;
        }
        apply();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_ticket_supersedes_older() {
        let seq = RequestSequencer::new();
        let first = seq.begin("prop-1");
        let second = seq.begin("prop-1");

        assert!(second.seq() > first.seq());
        assert!(!seq.apply_if_current(&first, || {}));
        assert!(seq.apply_if_current(&second, || {}));
    }

    #[test]
    fn keys_are_independent() {
        let seq = RequestSequencer::new();
        let a = seq.begin("a");
        let _b = seq.begin("b");
        assert!(seq.apply_if_current(&a, || {}));
    }

    #[test]
    fn stale_apply_is_discarded() {
        let seq = RequestSequencer::new();
        let slow = seq.begin("prop-1");
        let fast = seq.begin("prop-1");

        let mut applied = Vec::new();
        assert!(seq.apply_if_current(&fast, || applied.push("fast")));
        assert!(!seq.apply_if_current(&slow, || applied.push("slow")));
        assert_eq!(applied, vec!["fast"]);
    }
}
