// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Duration, Utc};
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use thiserror::Error;
use x509_parser::pem::parse_x509_pem;

/// Cached verification state of a client-device certificate.
///
/// `Unknown` is the conservative initial value and must stay the first
/// ordinal for forward-compatible decoding of persisted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CertificateStatus {
    #[default]
    Unknown,
    Active,
}

impl CertificateStatus {
    const UNKNOWN: &'static str = "UNKNOWN";
    const ACTIVE: &'static str = "ACTIVE";

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => Self::UNKNOWN,
            Self::Active => Self::ACTIVE,
        }
    }
}

impl Serialize for CertificateStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CertificateStatus {
    // Unrecognized status names decode to `Unknown` so records written
    // by a newer runtime still load.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(match name.as_str() {
            Self::ACTIVE => Self::Active,
            _ => Self::Unknown,
        })
    }
}

/// The presented PEM did not decode to an X.509 certificate.
#[derive(Debug, Error)]
pub enum InvalidCertificateError {
    #[error("input is not a PEM document: {0}")]
    Pem(String),

    #[error("unexpected PEM label `{0}`, expected CERTIFICATE")]
    UnexpectedLabel(String),

    #[error("PEM contents are not an X.509 certificate: {0}")]
    X509(String),
}

/// A client-device certificate as known locally: a stable id derived
/// from the DER bytes, the last cloud-verified status, and when that
/// verification happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    certificate_id: String,
    status: CertificateStatus,
    last_updated: DateTime<Utc>,
}

impl Certificate {
    pub fn new(
        certificate_id: String,
        status: CertificateStatus,
        last_updated: DateTime<Utc>,
    ) -> Self {
        Self {
            certificate_id,
            status,
            last_updated,
        }
    }

    /// A record for a certificate the cloud has confirmed active.
    pub fn active(certificate_id: String, verified_at: DateTime<Utc>) -> Self {
        Self::new(certificate_id, CertificateStatus::Active, verified_at)
    }

    /// Derive the stable certificate id from a PEM document: the
    /// hex-encoded SHA-256 digest of the decoded DER bytes. Validates
    /// that the contents actually parse as X.509.
    pub fn id_from_pem(pem: &str) -> Result<String, InvalidCertificateError> {
        let (_, document) = parse_x509_pem(pem.as_bytes())
            .map_err(|error| InvalidCertificateError::Pem(error.to_string()))?;
        if document.label != "CERTIFICATE" {
            return Err(InvalidCertificateError::UnexpectedLabel(
                document.label.clone(),
            ));
        }
        document
            .parse_x509()
            .map_err(|error| InvalidCertificateError::X509(error.to_string()))?;
        Ok(hex::encode(Sha256::digest(&document.contents)))
    }

    pub fn certificate_id(&self) -> &str {
        &self.certificate_id
    }

    pub fn status(&self) -> CertificateStatus {
        self.status
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    pub fn is_active(&self) -> bool {
        self.status == CertificateStatus::Active
    }

    /// Whether this record can back a new session at `now` without a
    /// fresh cloud check: active, and verified inside the trust window.
    pub fn is_trusted_at(&self, now: DateTime<Utc>, trust_duration: Duration) -> bool {
        self.is_active() && now.signed_duration_since(self.last_updated) <= trust_duration
    }

    /// Record a positive cloud verification.
    pub fn mark_verified(&mut self, at: DateTime<Utc>) {
        self.status = CertificateStatus::Active;
        self.last_updated = at;
    }
}
