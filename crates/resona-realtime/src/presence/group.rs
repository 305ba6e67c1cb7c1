//! Group registry — named delivery groups with a reverse index.

use std::collections::HashSet;

use dashmap::DashMap;

use resona_core::types::id::{ConnectionId, UserId};

/// Typed group identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKey {
    /// A user's personal group; every connection of the user is a member.
    User(UserId),
    /// All live connections.
    Online,
}

impl GroupKey {
    /// Parses a group string into a typed key.
    pub fn parse(group: &str) -> Option<Self> {
        match group.split_once(':') {
            Some(("user", id)) => id.parse().ok().map(GroupKey::User),
            None if group == "online" => Some(GroupKey::Online),
            _ => None,
        }
    }

    /// Converts to the group string form.
    pub fn to_group_string(&self) -> String {
        match self {
            GroupKey::User(id) => format!("user:{id}"),
            GroupKey::Online => "online".to_string(),
        }
    }
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_group_string())
    }
}

/// Registry of group memberships.
///
/// Keeps a reverse index so tearing down a connection touches only the
/// groups it actually joined. Groups with no members are removed
/// immediately.
#[derive(Debug, Default)]
pub struct GroupRegistry {
    /// Group string → member connection IDs.
    groups: DashMap<String, HashSet<ConnectionId>>,
    /// Connection ID → group strings it joined (reverse index).
    memberships: DashMap<ConnectionId, HashSet<String>>,
}

impl GroupRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            groups: DashMap::new(),
            memberships: DashMap::new(),
        }
    }

    /// Adds a connection to a group.
    pub fn join(&self, group: &GroupKey, conn_id: ConnectionId) {
        let name = group.to_group_string();
        self.groups.entry(name.clone()).or_default().insert(conn_id);
        self.memberships.entry(conn_id).or_default().insert(name);
    }

    /// Removes a connection from a group.
    pub fn leave(&self, group: &GroupKey, conn_id: ConnectionId) {
        let name = group.to_group_string();
        if let Some(mut members) = self.groups.get_mut(&name) {
            members.remove(&conn_id);
        }
        self.groups.remove_if(&name, |_, members| members.is_empty());
        if let Some(mut groups) = self.memberships.get_mut(&conn_id) {
            groups.remove(&name);
        }
    }

    /// Removes a connection from every group it joined. Idempotent.
    pub fn leave_all(&self, conn_id: ConnectionId) {
        let Some((_, names)) = self.memberships.remove(&conn_id) else {
            return;
        };
        for name in &names {
            if let Some(mut members) = self.groups.get_mut(name) {
                members.remove(&conn_id);
            }
            self.groups.remove_if(name, |_, members| members.is_empty());
        }
    }

    /// Member connection IDs of a group.
    pub fn members(&self, group: &GroupKey) -> Vec<ConnectionId> {
        self.groups
            .get(&group.to_group_string())
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Member count of a group.
    pub fn member_count(&self, group: &GroupKey) -> usize {
        self.groups
            .get(&group.to_group_string())
            .map(|members| members.len())
            .unwrap_or(0)
    }

    /// Number of non-empty groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_key_roundtrip() {
        let user = GroupKey::User(UserId::new());
        assert_eq!(GroupKey::parse(&user.to_group_string()), Some(user));
        assert_eq!(GroupKey::parse("online"), Some(GroupKey::Online));
        assert_eq!(GroupKey::parse("admin:sessions"), None);
    }

    #[test]
    fn test_empty_groups_are_dropped() {
        let registry = GroupRegistry::new();
        let group = GroupKey::User(UserId::new());
        let conn = ConnectionId::new();

        registry.join(&group, conn);
        assert_eq!(registry.group_count(), 1);

        registry.leave(&group, conn);
        assert_eq!(registry.group_count(), 0);
    }

    #[test]
    fn test_leave_all_clears_reverse_index() {
        let registry = GroupRegistry::new();
        let conn = ConnectionId::new();
        let user_group = GroupKey::User(UserId::new());

        registry.join(&user_group, conn);
        registry.join(&GroupKey::Online, conn);

        registry.leave_all(conn);
        assert_eq!(registry.group_count(), 0);
        assert!(registry.members(&user_group).is_empty());

        // Second teardown is a safe no-op.
        registry.leave_all(conn);
    }
}
