// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Error taxonomy of the broker boundary.
//
// Cloud failures are internal and get converted at the session-factory
// boundary; authentication errors are user-visible and must never carry
// the presented PEM.

use thiserror::Error;

use crate::domain::certificate::InvalidCertificateError;

/// Credentials were rejected. Carries a short human reason only.
#[derive(Debug, Error)]
pub enum AuthenticationError {
    #[error("unknown certificate")]
    UnknownCertificate,

    #[error("certificate is not active")]
    CertificateNotActive,

    #[error("client is not attached to certificate")]
    ClientNotAttached,

    #[error("invalid client certificate: {0}")]
    InvalidCertificate(#[from] InvalidCertificateError),

    #[error("could not verify credentials with the cloud: {0}")]
    CloudUnavailable(#[from] CloudServiceError),

    #[error("credential registry failure: {0}")]
    Registry(#[from] RegistryError),
}

/// An authorization evaluation could not produce a decision, or the
/// decision was a definitive deny.
#[derive(Debug, Error)]
pub enum AuthorizationError {
    /// The session id is unknown or already closed; the client must
    /// re-authenticate.
    #[error("unknown or expired session")]
    InvalidSession,

    /// Definitive deny; retrying the same request cannot succeed.
    #[error("operation denied by policy")]
    Denied,

    #[error("authorization registry failure: {0}")]
    Registry(#[from] RegistryError),
}

/// The upstream verification service was unreachable, timed out, or
/// returned an explicit failure. Internal; never shown to devices.
#[derive(Debug, Error)]
pub enum CloudServiceError {
    #[error("cloud service unreachable: {0}")]
    Unavailable(String),

    #[error("cloud request timed out: {0}")]
    Timeout(String),

    #[error("cloud rejected the request: {0}")]
    Rejected(String),
}

/// A group-configuration update was rejected. The previous
/// configuration stays in effect.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("unsupported device-groups format version `{0}`")]
    UnsupportedFormatVersion(String),

    #[error("group `{group}` references missing policy `{policy}`")]
    MissingPolicy { group: String, policy: String },

    #[error("invalid configuration document: {0}")]
    InvalidDocument(String),
}

/// Unexpected fault in a backing store. Logged and counted; surfaced to
/// callers as an authentication or authorization failure.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("storage failure: {0}")]
    Storage(String),

    #[error("corrupt record for key `{key}`: {reason}")]
    CorruptRecord { key: String, reason: String },
}

impl From<sled::Error> for RegistryError {
    fn from(error: sled::Error) -> Self {
        Self::Storage(error.to_string())
    }
}
