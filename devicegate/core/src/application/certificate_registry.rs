// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::sync::Arc;
use thiserror::Error;

use crate::domain::certificate::{Certificate, InvalidCertificateError};
use crate::domain::errors::RegistryError;
use crate::domain::repository::CertificateRepository;

/// Outcome of resolving a PEM against the local cache: the derived id,
/// and the stored record when one exists.
#[derive(Debug)]
pub struct PemLookup {
    pub certificate_id: String,
    pub certificate: Option<Certificate>,
}

#[derive(Debug, Error)]
pub enum CertificateLookupError {
    #[error(transparent)]
    Invalid(#[from] InvalidCertificateError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Cache of client-device certificate state. Creation and activation
/// are driven by the session factory after cloud verification; this
/// registry enforces the status-transition rules.
pub struct CertificateRegistry {
    repository: Arc<dyn CertificateRepository>,
}

impl CertificateRegistry {
    pub fn new(repository: Arc<dyn CertificateRepository>) -> Self {
        Self { repository }
    }

    /// Validate the PEM, derive the certificate id, and look up the
    /// stored record. A missing record is not an error; the caller
    /// decides whether cloud verification should create one.
    pub async fn certificate_from_pem(
        &self,
        pem: &str,
    ) -> Result<PemLookup, CertificateLookupError> {
        let certificate_id = Certificate::id_from_pem(pem)?;
        let certificate = self.repository.find_by_id(&certificate_id).await?;
        Ok(PemLookup {
            certificate_id,
            certificate,
        })
    }

    /// Persist a certificate record.
    ///
    /// `Unknown → Active` happens only after a positive cloud
    /// verification (callers mark the record first). An `Active →
    /// Unknown` downgrade is ignored; the stored record wins.
    pub async fn create_or_update(
        &self,
        certificate: Certificate,
    ) -> Result<Certificate, RegistryError> {
        if !certificate.is_active() {
            if let Some(existing) = self
                .repository
                .find_by_id(certificate.certificate_id())
                .await?
            {
                if existing.is_active() {
                    return Ok(existing);
                }
            }
        }
        self.repository.save(&certificate).await?;
        Ok(certificate)
    }
}
