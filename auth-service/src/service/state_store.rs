//! # Authorization State Store
//!
//! In-memory registry binding an OAuth `state` value to the client id,
//! redirect URI and requested scope that opened the flow.
//!
//! ## Lifecycle
//!
//! ```text
//! (none) ──GET /authorize──▶ registered ──POST /token OK──▶ deleted
//!                                 │
//!                                 └──sweep (age > TTL)──▶ deleted
//! ```
//!
//! An entry exists exactly while its flow is in progress: created when the
//! login page is served, validated on the credential post and the token
//! exchange, removed after a successful exchange. The sweep bounds memory
//! when flows are abandoned.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// What an OAuth `state` value is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateEntry {
    pub client_id: String,
    pub redirect_uri: String,
    pub requested_scope: String,
    created_at: DateTime<Utc>,
}

/// Mutex-guarded state registry.
///
/// All operations take the lock; none performs I/O while holding it.
#[derive(Debug, Default)]
pub struct StateStore {
    states: Mutex<HashMap<String, StateEntry>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a state with its client info, replacing any previous entry
    /// under the same value.
    pub fn add(&self, state: &str, client_id: &str, redirect_uri: &str, requested_scope: &str) {
        let mut states = self.states.lock().expect("state store mutex poisoned");
        states.insert(
            state.to_string(),
            StateEntry {
                client_id: client_id.to_string(),
                redirect_uri: redirect_uri.to_string(),
                requested_scope: requested_scope.to_string(),
                created_at: Utc::now(),
            },
        );
    }

    /// The scope requested when the state was registered, if the state is
    /// known.
    pub fn requested_scope(&self, state: &str) -> Option<String> {
        let states = self.states.lock().expect("state store mutex poisoned");
        states.get(state).map(|e| e.requested_scope.clone())
    }

    /// Checks that a state exists, without checking client info.
    pub fn validate_state(&self, state: &str) -> bool {
        let states = self.states.lock().expect("state store mutex poisoned");
        states.contains_key(state)
    }

    /// Checks that a state exists and matches both `client_id` and
    /// `redirect_uri` exactly.
    pub fn validate_with_client_info(
        &self,
        state: &str,
        client_id: &str,
        redirect_uri: &str,
    ) -> bool {
        let states = self.states.lock().expect("state store mutex poisoned");
        match states.get(state) {
            Some(entry) => entry.client_id == client_id && entry.redirect_uri == redirect_uri,
            None => false,
        }
    }

    /// Checks that a state exists and matches `redirect_uri`.
    pub fn validate_redirect_uri(&self, state: &str, redirect_uri: &str) -> bool {
        let states = self.states.lock().expect("state store mutex poisoned");
        match states.get(state) {
            Some(entry) => entry.redirect_uri == redirect_uri,
            None => false,
        }
    }

    /// Removes the state from the store.
    pub fn delete_state(&self, state: &str) {
        let mut states = self.states.lock().expect("state store mutex poisoned");
        states.remove(state);
    }

    /// Drops entries older than `max_age` and returns how many were removed.
    ///
    /// Abandoned flows (user never posts the login form) would otherwise
    /// accumulate forever.
    pub fn sweep_older_than(&self, max_age: Duration) -> usize {
        let cutoff = Utc::now() - max_age;
        let mut states = self.states.lock().expect("state store mutex poisoned");
        let before = states.len();
        states.retain(|_, entry| entry.created_at > cutoff);
        before - states.len()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_validate() {
        let store = StateStore::new();
        store.add("s1", "client-1", "http://ex/cb", "profile");

        assert!(store.validate_state("s1"));
        assert!(!store.validate_state("s2"));
        assert!(store.validate_with_client_info("s1", "client-1", "http://ex/cb"));
        assert!(store.validate_redirect_uri("s1", "http://ex/cb"));
        assert_eq!(store.requested_scope("s1").as_deref(), Some("profile"));
    }

    #[test]
    fn test_validate_rejects_mismatched_client_info() {
        let store = StateStore::new();
        store.add("s1", "client-1", "http://ex/cb", "profile");

        assert!(!store.validate_with_client_info("s1", "client-2", "http://ex/cb"));
        assert!(!store.validate_with_client_info("s1", "client-1", "http://evil/cb"));
        assert!(!store.validate_with_client_info("missing", "client-1", "http://ex/cb"));
        assert!(!store.validate_redirect_uri("s1", "http://evil/cb"));
    }

    #[test]
    fn test_delete_state() {
        let store = StateStore::new();
        store.add("s1", "client-1", "http://ex/cb", "profile");

        store.delete_state("s1");
        assert!(!store.validate_state("s1"));
        assert_eq!(store.requested_scope("s1"), None);

        // deleting a missing state is a no-op
        store.delete_state("s1");
    }

    #[test]
    fn test_add_replaces_existing_entry() {
        let store = StateStore::new();
        store.add("s1", "client-1", "http://ex/cb", "profile");
        store.add("s1", "client-2", "http://other/cb", "admin");

        assert!(store.validate_with_client_info("s1", "client-2", "http://other/cb"));
        assert!(!store.validate_with_client_info("s1", "client-1", "http://ex/cb"));
    }

    #[test]
    fn test_sweep_removes_only_old_entries() {
        let store = StateStore::new();
        store.add("fresh", "client-1", "http://ex/cb", "profile");

        // nothing is older than an hour yet
        assert_eq!(store.sweep_older_than(Duration::hours(1)), 0);
        assert!(store.validate_state("fresh"));

        // everything is older than "zero seconds ago"
        assert_eq!(store.sweep_older_than(Duration::seconds(-1)), 1);
        assert!(!store.validate_state("fresh"));
    }
}
