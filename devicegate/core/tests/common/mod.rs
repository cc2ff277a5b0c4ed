// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Duration;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use aegis_devicegate_core::application::{
    CertificateRegistry, ComponentGate, Credentials, DeviceAuthService, GroupManager,
    RefreshQueue, SessionFactory, SessionManager, ThingRegistry,
};
use aegis_devicegate_core::domain::cloud::{CertificateActivity, CloudVerifier};
use aegis_devicegate_core::domain::errors::CloudServiceError;
use aegis_devicegate_core::infrastructure::repositories::{
    SledCertificateRepository, SledThingRepository,
};
use aegis_devicegate_core::infrastructure::{DomainEventBus, RuntimeStore};

// Self-signed P-256 certificates generated for the test suite.
pub const DEVICE_CERT_PEM: &str = "-----BEGIN CERTIFICATE-----\n\
MIIBejCCAR+gAwIBAgIUMuZdYx5UmPmVw7BkWnoaYmnR4rAwCgYIKoZIzj0EAwIw\n\
EjEQMA4GA1UEAwwHZGV2aWNlMTAeFw0yNjA4MDEwNjA2MzFaFw0zNjA3MjkwNjA2\n\
MzFaMBIxEDAOBgNVBAMMB2RldmljZTEwWTATBgcqhkjOPQIBBggqhkjOPQMBBwNC\n\
AAR3c+6fOU4CjXdWYQ2E0VXTF9NmhvkWbH2IxYun3BcD3pZsXBr8ImJn7nKpZq7G\n\
8R4ubc5ub9iVhsgOtKZR3nzPo1MwUTAdBgNVHQ4EFgQU4CrNohw8/1BSYm4+Vh/O\n\
XWxnyn4wHwYDVR0jBBgwFoAU4CrNohw8/1BSYm4+Vh/OXWxnyn4wDwYDVR0TAQH/\n\
BAUwAwEB/zAKBggqhkjOPQQDAgNJADBGAiEAxSVJLPb+oX6Cy1d6rNQZ220WSIcv\n\
zkNHVXM9a+kLVKoCIQC1EXqJk5qpgJbNJkn0zDuEEbgMlxKSz6jvnqsLReHutw==\n\
-----END CERTIFICATE-----\n";

pub const SECOND_DEVICE_CERT_PEM: &str = "-----BEGIN CERTIFICATE-----\n\
MIIBeTCCAR+gAwIBAgIUY/fBjqUQNvoCNPuyLmx/KbKSqcYwCgYIKoZIzj0EAwIw\n\
EjEQMA4GA1UEAwwHZGV2aWNlMjAeFw0yNjA4MDEwNjA2MzFaFw0zNjA3MjkwNjA2\n\
MzFaMBIxEDAOBgNVBAMMB2RldmljZTIwWTATBgcqhkjOPQIBBggqhkjOPQMBBwNC\n\
AATmyhDY8C0+VBnwQveeSvbrofeNMqV6Zt2nSiifUcoMMHL5vZtzGGFmhfxnRPNL\n\
GbEOD41Bcs1DW4aLSKwrT2Y+o1MwUTAdBgNVHQ4EFgQUhQcKuGTZ6bEJiF4Hwqio\n\
YPrGiVcwHwYDVR0jBBgwFoAUhQcKuGTZ6bEJiF4HwqioYPrGiVcwDwYDVR0TAQH/\n\
BAUwAwEB/zAKBggqhkjOPQQDAgNIADBFAiByt8RnnC3bUhy0P0Jeq206vo1veH/Y\n\
Mkpv5Uz8bXB+QAIhAM2Zq6rYL8e8U8uC6XRxcwEbfa1by2cCUEtt8v6r76vo\n\
-----END CERTIFICATE-----\n";

/// Cloud verifier double whose answers can be changed mid-test.
pub struct FakeCloud {
    certificate_response: Mutex<Option<CertificateActivity>>,
    attachment_response: Mutex<Option<bool>>,
    certificate_calls: AtomicUsize,
    attachment_calls: AtomicUsize,
}

impl FakeCloud {
    fn with(
        certificate_response: Option<CertificateActivity>,
        attachment_response: Option<bool>,
    ) -> Self {
        Self {
            certificate_response: Mutex::new(certificate_response),
            attachment_response: Mutex::new(attachment_response),
            certificate_calls: AtomicUsize::new(0),
            attachment_calls: AtomicUsize::new(0),
        }
    }

    pub fn attached() -> Self {
        Self::with(Some(CertificateActivity::Active), Some(true))
    }

    pub fn detached() -> Self {
        Self::with(Some(CertificateActivity::Active), Some(false))
    }

    pub fn inactive() -> Self {
        Self::with(Some(CertificateActivity::Inactive), Some(false))
    }

    pub fn offline() -> Self {
        Self::with(None, None)
    }

    pub fn go_offline(&self) {
        *self.certificate_response.lock() = None;
        *self.attachment_response.lock() = None;
    }

    pub fn certificate_calls(&self) -> usize {
        self.certificate_calls.load(Ordering::SeqCst)
    }

    pub fn attachment_calls(&self) -> usize {
        self.attachment_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.certificate_calls() + self.attachment_calls()
    }
}

#[async_trait]
impl CloudVerifier for FakeCloud {
    async fn verify_certificate(
        &self,
        _certificate_pem: &str,
    ) -> Result<CertificateActivity, CloudServiceError> {
        self.certificate_calls.fetch_add(1, Ordering::SeqCst);
        (*self.certificate_response.lock())
            .ok_or_else(|| CloudServiceError::Unavailable("cloud offline".to_string()))
    }

    async fn verify_thing_attached(
        &self,
        _thing_name: &str,
        _certificate_id: &str,
    ) -> Result<bool, CloudServiceError> {
        self.attachment_calls.fetch_add(1, Ordering::SeqCst);
        (*self.attachment_response.lock())
            .ok_or_else(|| CloudServiceError::Unavailable("cloud offline".to_string()))
    }

    async fn thing_attributes(
        &self,
        _thing_name: &str,
    ) -> Result<HashMap<String, String>, CloudServiceError> {
        Ok(HashMap::new())
    }
}

/// Gate that recognizes no component credentials.
pub struct NoComponents;

#[async_trait]
impl ComponentGate for NoComponents {
    async fn is_component(&self, _credentials: &Credentials) -> bool {
        false
    }
}

/// Fully wired broker over a temporary store and a scripted cloud.
pub struct Harness {
    pub service: DeviceAuthService,
    pub certificate_registry: Arc<CertificateRegistry>,
    pub thing_registry: Arc<ThingRegistry>,
    pub group_manager: Arc<GroupManager>,
    pub event_bus: Arc<DomainEventBus>,
    pub cloud: Arc<FakeCloud>,
    pub refresh_queue: Arc<RefreshQueue>,
    _dir: Option<tempfile::TempDir>,
}

pub fn harness(cloud: FakeCloud) -> Harness {
    harness_with_trust(cloud, 24)
}

pub fn harness_with_trust(cloud: FakeCloud, trust_hours: i64) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let mut harness = harness_over(dir.path(), cloud, trust_hours);
    harness._dir = Some(dir);
    harness
}

/// Harness over an existing store path, for restart scenarios.
pub fn harness_over(
    store_path: &std::path::Path,
    cloud: FakeCloud,
    trust_hours: i64,
) -> Harness {
    let store = RuntimeStore::open(store_path).unwrap();
    let cloud = Arc::new(cloud);
    let event_bus = Arc::new(DomainEventBus::new());
    let refresh_queue = Arc::new(RefreshQueue::new());
    let trust_duration = Duration::hours(trust_hours);

    let certificate_registry = Arc::new(CertificateRegistry::new(Arc::new(
        SledCertificateRepository::new(store.clone()),
    )));
    let thing_registry = Arc::new(ThingRegistry::new(
        Arc::new(SledThingRepository::new(store)),
        cloud.clone(),
        event_bus.clone(),
        trust_duration,
    ));
    let group_manager = Arc::new(GroupManager::new(event_bus.clone()));
    let factory = SessionFactory::new(
        certificate_registry.clone(),
        thing_registry.clone(),
        cloud.clone(),
        Arc::new(NoComponents),
        event_bus.clone(),
        refresh_queue.clone(),
        trust_duration,
    );
    let service = DeviceAuthService::new(
        factory,
        Arc::new(SessionManager::new()),
        group_manager.clone(),
    );

    Harness {
        service,
        certificate_registry,
        thing_registry,
        group_manager,
        event_bus,
        cloud,
        refresh_queue,
        _dir: None,
    }
}

pub fn credentials(client_id: &str) -> Credentials {
    Credentials {
        certificate_pem: DEVICE_CERT_PEM.to_string(),
        client_id: client_id.to_string(),
        username: String::new(),
        password: String::new(),
    }
}
