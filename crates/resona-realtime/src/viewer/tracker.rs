//! Tracks which users currently have a conversation open.

use std::collections::HashSet;

use dashmap::DashMap;

use resona_core::types::id::{ConversationId, UserId};

/// Concurrency-safe map from conversation to its current viewers.
///
/// A user actively looking at a conversation should not receive a
/// redundant push for a message they can already see rendered live; the
/// fan-out coordinator consults this before delivering `Message`-kind
/// notifications. Entries with no viewers are removed immediately to
/// bound memory.
#[derive(Debug, Default)]
pub struct ActiveViewerTracker {
    viewers: DashMap<ConversationId, HashSet<UserId>>,
}

impl ActiveViewerTracker {
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self {
            viewers: DashMap::new(),
        }
    }

    /// Records that a user opened a conversation view. Idempotent.
    pub fn enter(&self, conversation_id: ConversationId, user_id: UserId) {
        self.viewers
            .entry(conversation_id)
            .or_default()
            .insert(user_id);
    }

    /// Records that a user left a conversation view. Idempotent.
    pub fn leave(&self, conversation_id: ConversationId, user_id: UserId) {
        if let Some(mut viewers) = self.viewers.get_mut(&conversation_id) {
            viewers.remove(&user_id);
        }
        self.viewers
            .remove_if(&conversation_id, |_, viewers| viewers.is_empty());
    }

    /// Removes a user from every conversation it was viewing.
    ///
    /// Called on full disconnect, since a dropped connection cannot
    /// reliably signal which conversations it was viewing.
    pub fn leave_all(&self, user_id: UserId) {
        let mut affected = Vec::new();
        for mut entry in self.viewers.iter_mut() {
            if entry.value_mut().remove(&user_id) && entry.value().is_empty() {
                affected.push(*entry.key());
            }
        }
        for conversation_id in affected {
            self.viewers
                .remove_if(&conversation_id, |_, viewers| viewers.is_empty());
        }
    }

    /// Whether a user currently has a conversation open.
    pub fn is_viewing(&self, conversation_id: ConversationId, user_id: UserId) -> bool {
        self.viewers
            .get(&conversation_id)
            .map(|viewers| viewers.contains(&user_id))
            .unwrap_or(false)
    }

    /// Current viewer count for a conversation.
    pub fn viewer_count(&self, conversation_id: ConversationId) -> usize {
        self.viewers
            .get(&conversation_id)
            .map(|viewers| viewers.len())
            .unwrap_or(0)
    }

    /// Number of conversations with at least one viewer.
    pub fn tracked_conversations(&self) -> usize {
        self.viewers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_leave_is_idempotent() {
        let tracker = ActiveViewerTracker::new();
        let conv = ConversationId::new();
        let user = UserId::new();

        tracker.enter(conv, user);
        tracker.enter(conv, user);
        assert!(tracker.is_viewing(conv, user));
        assert_eq!(tracker.viewer_count(conv), 1);

        tracker.leave(conv, user);
        assert!(!tracker.is_viewing(conv, user));
        tracker.leave(conv, user);
        assert_eq!(tracker.tracked_conversations(), 0);
    }

    #[test]
    fn test_empty_entries_do_not_persist() {
        let tracker = ActiveViewerTracker::new();
        let conv = ConversationId::new();
        let alice = UserId::new();
        let bob = UserId::new();

        tracker.enter(conv, alice);
        tracker.enter(conv, bob);
        tracker.leave(conv, alice);
        assert_eq!(tracker.tracked_conversations(), 1);
        tracker.leave(conv, bob);
        assert_eq!(tracker.tracked_conversations(), 0);
    }

    #[test]
    fn test_leave_all_clears_every_conversation() {
        let tracker = ActiveViewerTracker::new();
        let user = UserId::new();
        let other = UserId::new();
        let conv_a = ConversationId::new();
        let conv_b = ConversationId::new();

        tracker.enter(conv_a, user);
        tracker.enter(conv_b, user);
        tracker.enter(conv_b, other);

        tracker.leave_all(user);
        assert!(!tracker.is_viewing(conv_a, user));
        assert!(!tracker.is_viewing(conv_b, user));
        assert!(tracker.is_viewing(conv_b, other));
        assert_eq!(tracker.tracked_conversations(), 1);
    }
}
