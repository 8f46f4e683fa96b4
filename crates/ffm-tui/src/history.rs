//! Navigation history — the native analogue of the browser history stack.
//!
//! A session pushes one entry when it activates; going back parks that
//! entry on the forward stack and lands on the station picker; going
//! forward rehydrates the parked entry without touching the network.
//! A fresh push discards anything on the forward stack.

use serde::{Deserialize, Serialize};

use crate::navigator::ClipRef;

/// Serialized session snapshot, as of the moment it was pushed.
/// Clips recorded after the push are deliberately not part of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub username: String,
    pub frequency: f64,
    pub station_files: Vec<ClipRef>,
}

#[derive(Debug, Default)]
pub struct NavigationHistory {
    back: Vec<HistoryEntry>,
    forward: Vec<HistoryEntry>,
}

impl NavigationHistory {
    pub fn push(&mut self, entry: HistoryEntry) {
        self.back.push(entry);
        self.forward.clear();
    }

    /// Leave the current entry. Returns false when there is nothing behind.
    pub fn go_back(&mut self) -> bool {
        match self.back.pop() {
            Some(entry) => {
                self.forward.push(entry);
                true
            }
            None => false,
        }
    }

    /// Re-enter the most recently left entry, if any.
    pub fn go_forward(&mut self) -> Option<&HistoryEntry> {
        let entry = self.forward.pop()?;
        self.back.push(entry);
        self.back.last()
    }

    pub fn can_go_forward(&self) -> bool {
        !self.forward.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> HistoryEntry {
        HistoryEntry {
            username: name.to_string(),
            frequency: 91.0,
            station_files: Vec::new(),
        }
    }

    #[test]
    fn test_back_then_forward_restores_entry() {
        let mut history = NavigationHistory::default();
        history.push(entry("alice"));

        assert!(history.go_back());
        assert!(history.can_go_forward());

        let restored = history.go_forward().unwrap();
        assert_eq!(restored.username, "alice");
        assert!(!history.can_go_forward());
    }

    #[test]
    fn test_push_clears_forward_stack() {
        let mut history = NavigationHistory::default();
        history.push(entry("alice"));
        history.go_back();
        assert!(history.can_go_forward());

        history.push(entry("bob"));
        assert!(!history.can_go_forward());
    }

    #[test]
    fn test_back_on_empty_is_noop() {
        let mut history = NavigationHistory::default();
        assert!(!history.go_back());
        assert!(history.go_forward().is_none());
    }
}
