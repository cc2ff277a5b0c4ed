// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Current on-disk aggregate version for persisted things.
pub const THING_VERSION: u64 = 0;

/// A named IoT device identity, together with the certificates the
/// cloud has confirmed as attached to it and when each binding was
/// last verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thing {
    thing_name: String,
    version: u64,
    attached_certificates: HashMap<String, DateTime<Utc>>,
}

impl Thing {
    pub fn new(thing_name: impl Into<String>) -> Self {
        Self {
            thing_name: thing_name.into(),
            version: THING_VERSION,
            attached_certificates: HashMap::new(),
        }
    }

    pub fn with_attachments(
        thing_name: impl Into<String>,
        version: u64,
        attached_certificates: HashMap<String, DateTime<Utc>>,
    ) -> Self {
        Self {
            thing_name: thing_name.into(),
            version,
            attached_certificates,
        }
    }

    pub fn thing_name(&self) -> &str {
        &self.thing_name
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn attached_certificates(&self) -> &HashMap<String, DateTime<Utc>> {
        &self.attached_certificates
    }

    /// When the binding to `certificate_id` was last confirmed by the
    /// cloud, if it is attached at all.
    pub fn attachment_verified_at(&self, certificate_id: &str) -> Option<DateTime<Utc>> {
        self.attached_certificates.get(certificate_id).copied()
    }

    /// Whether the binding exists and was verified inside the trust
    /// window ending at `now`.
    pub fn has_fresh_attachment(
        &self,
        certificate_id: &str,
        now: DateTime<Utc>,
        trust_duration: Duration,
    ) -> bool {
        self.attachment_verified_at(certificate_id)
            .is_some_and(|verified_at| now.signed_duration_since(verified_at) <= trust_duration)
    }

    /// Record a cloud-confirmed binding.
    pub fn attach(&mut self, certificate_id: impl Into<String>, verified_at: DateTime<Utc>) {
        self.attached_certificates
            .insert(certificate_id.into(), verified_at);
    }

    /// Drop a binding the cloud no longer confirms. Returns whether the
    /// binding existed.
    pub fn detach(&mut self, certificate_id: &str) -> bool {
        self.attached_certificates.remove(certificate_id).is_some()
    }
}
