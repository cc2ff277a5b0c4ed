// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::certificate::{Certificate, CertificateStatus};
use crate::domain::errors::RegistryError;
use crate::domain::repository::CertificateRepository;
use crate::infrastructure::store::RuntimeStore;

/// On-disk shape of a certificate record. The status is stored by name
/// so records survive enum evolution in either direction.
#[derive(Debug, Serialize, Deserialize)]
struct StoredCertificate {
    status: CertificateStatus,
    #[serde(rename = "statusUpdated")]
    status_updated: i64,
}

impl StoredCertificate {
    fn from_domain(certificate: &Certificate) -> Self {
        Self {
            status: certificate.status(),
            status_updated: certificate.last_updated().timestamp_millis(),
        }
    }

    fn into_domain(self, certificate_id: &str) -> Result<Certificate, RegistryError> {
        let last_updated = DateTime::<Utc>::from_timestamp_millis(self.status_updated)
            .ok_or_else(|| RegistryError::CorruptRecord {
                key: certificate_id.to_string(),
                reason: format!("timestamp {} out of range", self.status_updated),
            })?;
        Ok(Certificate::new(
            certificate_id.to_string(),
            self.status,
            last_updated,
        ))
    }
}

/// sled-backed certificate records under the `clientDeviceCerts` tree,
/// keyed by certificate id, JSON values.
pub struct SledCertificateRepository {
    store: RuntimeStore,
}

impl SledCertificateRepository {
    pub fn new(store: RuntimeStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CertificateRepository for SledCertificateRepository {
    async fn find_by_id(
        &self,
        certificate_id: &str,
    ) -> Result<Option<Certificate>, RegistryError> {
        let Some(raw) = self.store.certificates().get(certificate_id)? else {
            return Ok(None);
        };
        let stored: StoredCertificate =
            serde_json::from_slice(&raw).map_err(|error| RegistryError::CorruptRecord {
                key: certificate_id.to_string(),
                reason: error.to_string(),
            })?;
        stored.into_domain(certificate_id).map(Some)
    }

    async fn save(&self, certificate: &Certificate) -> Result<(), RegistryError> {
        let encoded = serde_json::to_vec(&StoredCertificate::from_domain(certificate))
            .map_err(|error| RegistryError::Storage(error.to_string()))?;
        self.store
            .certificates()
            .insert(certificate.certificate_id(), encoded)?;
        self.store.certificates().flush()?;
        Ok(())
    }
}
