// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

use crate::domain::session::Session;

/// Registry of live sessions keyed by opaque session id.
///
/// Ids are produced by the caller (the facade composes
/// `<client_id>-<nonce>`). Backed by a sharded concurrent map;
/// `find` does not serialize behind a concurrent `register` or
/// `close` on another key.
#[derive(Default)]
pub struct SessionManager {
    sessions: DashMap<String, Arc<Session>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, session_id: impl Into<String>, session: Session) -> Arc<Session> {
        let session_id = session_id.into();
        let session = Arc::new(session);
        debug!(%session_id, "registering session");
        self.sessions.insert(session_id, session.clone());
        session
    }

    pub fn find(&self, session_id: &str) -> Option<Arc<Session>> {
        self.sessions
            .get(session_id)
            .map(|entry| entry.value().clone())
    }

    /// Evict the session. Returns it when it was still registered.
    pub fn close(&self, session_id: &str) -> Option<Arc<Session>> {
        let closed = self.sessions.remove(session_id).map(|(_, session)| session);
        if closed.is_some() {
            debug!(%session_id, "closed session");
        }
        closed
    }

    pub fn close_all(&self) {
        self.sessions.clear();
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
