// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::errors::CloudServiceError;

/// Upstream verdict for a presented certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateActivity {
    Active,
    Inactive,
}

/// Upstream verification service the broker consults when a cached
/// record is missing or older than the trust window.
///
/// Implementations own retries for transient failures and honor the
/// caller's timeout budget; the core never retries and treats every
/// error as [`CloudServiceError`].
#[async_trait]
pub trait CloudVerifier: Send + Sync {
    /// Whether the certificate is currently valid upstream.
    async fn verify_certificate(
        &self,
        certificate_pem: &str,
    ) -> Result<CertificateActivity, CloudServiceError>;

    /// Whether `certificate_id` is attached to `thing_name` upstream.
    async fn verify_thing_attached(
        &self,
        thing_name: &str,
        certificate_id: &str,
    ) -> Result<bool, CloudServiceError>;

    /// The thing's registry attributes, for future attribute-based
    /// grouping.
    async fn thing_attributes(
        &self,
        thing_name: &str,
    ) -> Result<HashMap<String, String>, CloudServiceError>;
}
