//! Session registry: the map from game code to live session.
//!
//! Sessions are created lazily on the first join to an unseen code and
//! destroyed when their roster empties out. The registry is owned
//! exclusively by the engine task, so plain map access is enough: no
//! two command handlers ever touch it concurrently.

use log::info;
use std::collections::HashMap;

use crate::session::{ConnectionId, GameSession};

/// All live sessions in this process, keyed by game code.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<String, GameSession>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    /// Resolve a code to its session, creating an empty one on first
    /// sight. Never fails: unknown codes simply start a new game.
    pub fn get_or_create(&mut self, code: &str) -> &mut GameSession {
        self.sessions.entry(code.to_string()).or_insert_with(|| {
            info!("created session {}", code);
            GameSession::new(code)
        })
    }

    pub fn get_mut(&mut self, code: &str) -> Option<&mut GameSession> {
        self.sessions.get_mut(code)
    }

    /// Drop a session. Called only when its last participant left.
    pub fn remove(&mut self, code: &str) {
        if self.sessions.remove(code).is_some() {
            info!("destroyed session {}", code);
        }
    }

    /// Codes of every session this connection is seated in. Used on
    /// disconnect, which must leave all of them.
    pub fn codes_for(&self, connection_id: ConnectionId) -> Vec<String> {
        self.sessions
            .values()
            .filter(|session| session.has_participant(connection_id))
            .map(|session| session.code().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_or_create_reuses_existing_session() {
        let mut registry = SessionRegistry::new();

        registry.get_or_create("AB12C").join(1, "P1");
        assert_eq!(registry.len(), 1);

        // Second resolve of the same code must not reset anything.
        let session = registry.get_or_create("AB12C");
        assert!(session.has_participant(1));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn distinct_codes_get_distinct_sessions() {
        let mut registry = SessionRegistry::new();
        registry.get_or_create("AB12C").join(1, "P1");
        registry.get_or_create("ZZ99Z").join(2, "P2");

        assert_eq!(registry.len(), 2);
        assert!(registry.get_mut("AB12C").unwrap().has_participant(1));
        assert!(!registry.get_mut("ZZ99Z").unwrap().has_participant(1));
    }

    #[test]
    fn remove_destroys_the_session() {
        let mut registry = SessionRegistry::new();
        registry.get_or_create("AB12C");
        registry.remove("AB12C");

        assert!(registry.is_empty());
        assert!(registry.get_mut("AB12C").is_none());

        // Removing an unknown code is harmless.
        registry.remove("AB12C");
    }

    #[test]
    fn codes_for_lists_every_membership() {
        let mut registry = SessionRegistry::new();
        registry.get_or_create("AB12C").join(1, "P1");
        registry.get_or_create("ZZ99Z").join(1, "P1");
        registry.get_or_create("QQ00Q").join(2, "P2");

        let mut codes = registry.codes_for(1);
        codes.sort();
        assert_eq!(codes, vec!["AB12C".to_string(), "ZZ99Z".to_string()]);
        assert!(registry.codes_for(3).is_empty());
    }
}
