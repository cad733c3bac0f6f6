use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::RwLock;

use tracing::info;
use uuid::Uuid;

use logbook_types::{Error, Result};

#[derive(Default)]
struct Graph {
    friends: HashMap<String, BTreeSet<String>>,
    grants: HashMap<Uuid, HashSet<String>>,
    grants_by_user: HashMap<String, HashSet<Uuid>>,
}

/// Friendships and share grants.
///
/// Friendships are symmetric and permanent. A grant is a one-directional
/// read permission on a single record; it may only come into existence
/// between mutual friends, which the facade checks at the single call
/// site of [`record_grant`](Self::record_grant).
#[derive(Default)]
pub struct SocialGraph {
    inner: RwLock<Graph>,
}

impl SocialGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provision an empty entry so the user counts as a known member.
    /// Idempotent; `add_friend` uses membership for its target check.
    pub fn ensure_member(&self, username: &str) {
        let mut g = self.inner.write().expect("social graph lock poisoned");
        g.friends.entry(username.to_string()).or_default();
    }

    pub fn is_member(&self, username: &str) -> bool {
        let g = self.inner.read().expect("social graph lock poisoned");
        g.friends.contains_key(username)
    }

    /// Establish an immediately mutual friendship. There is no pending
    /// state: both directions appear atomically under one write lock.
    pub fn add_friend(&self, requester: &str, target: &str) -> Result<()> {
        if requester == target {
            return Err(Error::InvalidPayload("cannot befriend yourself"));
        }

        let mut g = self.inner.write().expect("social graph lock poisoned");
        if !g.friends.contains_key(target) {
            return Err(Error::NotFound);
        }
        g.friends
            .entry(requester.to_string())
            .or_default()
            .insert(target.to_string());
        g.friends
            .entry(target.to_string())
            .or_default()
            .insert(requester.to_string());
        info!("{} and {} are now friends", requester, target);
        Ok(())
    }

    pub fn friends_of(&self, username: &str) -> BTreeSet<String> {
        let g = self.inner.read().expect("social graph lock poisoned");
        g.friends.get(username).cloned().unwrap_or_default()
    }

    pub fn are_friends(&self, a: &str, b: &str) -> bool {
        let g = self.inner.read().expect("social graph lock poisoned");
        g.friends.get(a).is_some_and(|set| set.contains(b))
    }

    /// Record a grant. Ownership and friendship have already been
    /// checked by the facade.
    pub(crate) fn record_grant(&self, id: Uuid, grantee: &str) {
        let mut g = self.inner.write().expect("social graph lock poisoned");
        g.grants.entry(id).or_default().insert(grantee.to_string());
        g.grants_by_user
            .entry(grantee.to_string())
            .or_default()
            .insert(id);
    }

    pub fn has_grant(&self, id: Uuid, grantee: &str) -> bool {
        let g = self.inner.read().expect("social graph lock poisoned");
        g.grants.get(&id).is_some_and(|set| set.contains(grantee))
    }

    /// All record ids shared with this user.
    pub fn granted_to(&self, username: &str) -> HashSet<Uuid> {
        let g = self.inner.read().expect("social graph lock poisoned");
        g.grants_by_user.get(username).cloned().unwrap_or_default()
    }
}
