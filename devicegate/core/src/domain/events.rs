// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome carried by a [`DomainEvent::SessionCreation`] notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionCreationStatus {
    Success,
    Failure,
}

/// Cross-component notifications delivered over the in-process event
/// bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    SessionCreation {
        status: SessionCreationStatus,
        reason: Option<String>,
        occurred_at: DateTime<Utc>,
    },
    ServiceError {
        message: String,
        occurred_at: DateTime<Utc>,
    },
    ThingUpdated {
        thing_name: String,
        occurred_at: DateTime<Utc>,
    },
    ConnectivityConfigurationChanged {
        occurred_at: DateTime<Utc>,
    },
    CaCertificateChainChanged {
        occurred_at: DateTime<Utc>,
    },
}

impl DomainEvent {
    pub fn session_created() -> Self {
        Self::SessionCreation {
            status: SessionCreationStatus::Success,
            reason: None,
            occurred_at: Utc::now(),
        }
    }

    pub fn session_rejected(reason: impl Into<String>) -> Self {
        Self::SessionCreation {
            status: SessionCreationStatus::Failure,
            reason: Some(reason.into()),
            occurred_at: Utc::now(),
        }
    }

    pub fn service_error(message: impl Into<String>) -> Self {
        Self::ServiceError {
            message: message.into(),
            occurred_at: Utc::now(),
        }
    }

    pub fn thing_updated(thing_name: impl Into<String>) -> Self {
        Self::ThingUpdated {
            thing_name: thing_name.into(),
            occurred_at: Utc::now(),
        }
    }

    /// The kind listeners subscribe under.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::SessionCreation { .. } => EventKind::SessionCreation,
            Self::ServiceError { .. } => EventKind::ServiceError,
            Self::ThingUpdated { .. } => EventKind::ThingUpdated,
            Self::ConnectivityConfigurationChanged { .. } => {
                EventKind::ConnectivityConfigurationChanged
            }
            Self::CaCertificateChainChanged { .. } => EventKind::CaCertificateChainChanged,
        }
    }
}

/// Subscription key for the event bus: one per [`DomainEvent`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    SessionCreation,
    ServiceError,
    ThingUpdated,
    ConnectivityConfigurationChanged,
    CaCertificateChainChanged,
}
