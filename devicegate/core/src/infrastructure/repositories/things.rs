// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::errors::RegistryError;
use crate::domain::repository::ThingRepository;
use crate::domain::thing::Thing;
use crate::infrastructure::store::RuntimeStore;

/// On-disk shape of a thing record: aggregate version plus the
/// attachment map as `certificateId → lastVerified` epoch-millis.
#[derive(Debug, Serialize, Deserialize)]
struct StoredThing {
    version: u64,
    #[serde(default)]
    certificates: HashMap<String, i64>,
}

impl StoredThing {
    fn from_domain(thing: &Thing) -> Self {
        Self {
            version: thing.version(),
            certificates: thing
                .attached_certificates()
                .iter()
                .map(|(id, verified_at)| (id.clone(), verified_at.timestamp_millis()))
                .collect(),
        }
    }

    fn into_domain(self, thing_name: &str) -> Result<Thing, RegistryError> {
        let mut attachments = HashMap::with_capacity(self.certificates.len());
        for (certificate_id, millis) in self.certificates {
            let verified_at = DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
                RegistryError::CorruptRecord {
                    key: thing_name.to_string(),
                    reason: format!("timestamp {millis} out of range"),
                }
            })?;
            attachments.insert(certificate_id, verified_at);
        }
        Ok(Thing::with_attachments(thing_name, self.version, attachments))
    }
}

fn decode(key: &[u8], value: &[u8]) -> Result<Thing, RegistryError> {
    let thing_name = std::str::from_utf8(key).map_err(|error| RegistryError::CorruptRecord {
        key: String::from_utf8_lossy(key).into_owned(),
        reason: error.to_string(),
    })?;
    let stored: StoredThing =
        serde_json::from_slice(value).map_err(|error| RegistryError::CorruptRecord {
            key: thing_name.to_string(),
            reason: error.to_string(),
        })?;
    stored.into_domain(thing_name)
}

/// sled-backed thing records under the `clientDeviceThings` tree, keyed
/// by thing name, JSON values.
pub struct SledThingRepository {
    store: RuntimeStore,
}

impl SledThingRepository {
    pub fn new(store: RuntimeStore) -> Self {
        Self { store }
    }

    fn scan(
        &self,
        filter: impl Fn(&Thing) -> bool + Send + 'static,
    ) -> BoxStream<'static, Result<Thing, RegistryError>> {
        let iter = self.store.things().iter();
        Box::pin(futures::stream::iter(iter.filter_map(move |entry| {
            match entry {
                Ok((key, value)) => match decode(&key, &value) {
                    Ok(thing) if filter(&thing) => Some(Ok(thing)),
                    Ok(_) => None,
                    Err(error) => Some(Err(error)),
                },
                Err(error) => Some(Err(error.into())),
            }
        })))
    }
}

#[async_trait]
impl ThingRepository for SledThingRepository {
    async fn find_by_name(&self, thing_name: &str) -> Result<Option<Thing>, RegistryError> {
        let Some(raw) = self.store.things().get(thing_name)? else {
            return Ok(None);
        };
        decode(thing_name.as_bytes(), &raw).map(Some)
    }

    async fn save(&self, thing: &Thing) -> Result<(), RegistryError> {
        let encoded = serde_json::to_vec(&StoredThing::from_domain(thing))
            .map_err(|error| RegistryError::Storage(error.to_string()))?;
        self.store.things().insert(thing.thing_name(), encoded)?;
        self.store.things().flush()?;
        Ok(())
    }

    fn with_certificate(
        &self,
        certificate_id: &str,
    ) -> BoxStream<'static, Result<Thing, RegistryError>> {
        let certificate_id = certificate_id.to_string();
        self.scan(move |thing| thing.attachment_verified_at(&certificate_id).is_some())
    }

    fn all(&self) -> BoxStream<'static, Result<Thing, RegistryError>> {
        self.scan(|_thing| true)
    }
}
