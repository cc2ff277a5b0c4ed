// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use dashmap::DashMap;
use metrics::{counter, histogram};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::application::group_manager::GroupManager;
use crate::application::permission_evaluator::PermissionEvaluator;
use crate::application::session_factory::{Credentials, SessionFactory};
use crate::application::session_manager::SessionManager;
use crate::domain::errors::{AuthenticationError, AuthorizationError, ConfigurationError};
use crate::infrastructure::configuration::DeviceGroupsDocument;

/// The operation surface other on-device components call: session
/// lifecycle, authorization decisions, and configuration replacement.
/// Each exposed operation is timed and counted.
pub struct DeviceAuthService {
    session_factory: SessionFactory,
    session_manager: Arc<SessionManager>,
    group_manager: Arc<GroupManager>,
    evaluator: PermissionEvaluator,
    // client id → its live session id, for stale-session eviction on
    // reconnect.
    client_sessions: DashMap<String, String>,
}

impl DeviceAuthService {
    pub fn new(
        session_factory: SessionFactory,
        session_manager: Arc<SessionManager>,
        group_manager: Arc<GroupManager>,
    ) -> Self {
        Self {
            session_factory,
            session_manager,
            group_manager,
            evaluator: PermissionEvaluator::new(),
            client_sessions: DashMap::new(),
        }
    }

    /// Authenticate `credentials` and register the resulting session.
    /// Returns the opaque session id. A client reconnecting while an
    /// earlier session is still registered evicts the stale one.
    pub async fn create_session(
        &self,
        credentials: Credentials,
    ) -> Result<String, AuthenticationError> {
        let started = std::time::Instant::now();
        let outcome = self.session_factory.create_session(&credentials).await;
        histogram!("devicegate_create_session_seconds").record(started.elapsed().as_secs_f64());

        match outcome {
            Ok(session) => {
                let session_id = format!("{}-{}", credentials.client_id, Uuid::new_v4());
                if let Some((_, stale)) = self
                    .client_sessions
                    .remove(&credentials.client_id)
                {
                    debug!(client_id = %credentials.client_id, "evicting stale session on reconnect");
                    self.session_manager.close(&stale);
                }
                self.client_sessions
                    .insert(credentials.client_id, session_id.clone());
                self.session_manager.register(session_id.clone(), session);
                counter!("devicegate_sessions_created_total").increment(1);
                Ok(session_id)
            }
            Err(error) => {
                counter!("devicegate_sessions_rejected_total").increment(1);
                Err(error)
            }
        }
    }

    /// Evict a session. Unknown ids report [`AuthorizationError::InvalidSession`].
    pub fn close_session(&self, session_id: &str) -> Result<(), AuthorizationError> {
        match self.session_manager.close(session_id) {
            Some(_) => {
                self.client_sessions
                    .retain(|_, live_session_id| live_session_id.as_str() != session_id);
                Ok(())
            }
            None => Err(AuthorizationError::InvalidSession),
        }
    }

    /// Whether the session's device may perform `operation` on
    /// `resource`. In-process component sessions are implicitly
    /// allowed.
    pub fn can_device_perform(
        &self,
        session_id: &str,
        operation: &str,
        resource: Option<&str>,
    ) -> Result<bool, AuthorizationError> {
        let started = std::time::Instant::now();
        let session = self
            .session_manager
            .find(session_id)
            .ok_or(AuthorizationError::InvalidSession)?;

        let decision = if session.is_component() {
            true
        } else {
            let permissions = self.group_manager.applicable_policy_permissions(&session);
            self.evaluator.is_authorized(operation, resource, &permissions)
        };

        histogram!("devicegate_authorize_seconds").record(started.elapsed().as_secs_f64());
        if decision {
            counter!("devicegate_requests_allowed_total").increment(1);
        } else {
            counter!("devicegate_requests_denied_total").increment(1);
        }
        Ok(decision)
    }

    /// Replace the device-grouping model. On failure the previous
    /// configuration stays in effect.
    pub fn set_group_configuration(
        &self,
        document: DeviceGroupsDocument,
    ) -> Result<(), ConfigurationError> {
        let configuration = document.into_configuration()?;
        self.group_manager.replace(configuration);
        counter!("devicegate_configuration_updates_total").increment(1);
        Ok(())
    }
}
