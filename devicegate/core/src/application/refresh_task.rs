// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Background re-verification of thing↔certificate bindings.
//
// Optional: first-cut correctness does not depend on it. The task walks
// the thing registry on an interval and re-verifies bindings nearing
// the end of the trust window before the session path has to. Cloud
// outages are logged and retried on the next tick, never propagated.

use futures::StreamExt;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::application::thing_registry::ThingRegistry;
use crate::domain::cloud::CloudVerifier;
use crate::domain::thing::Thing;

/// A binding flagged for early re-verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRequest {
    pub thing_name: String,
    pub certificate_id: String,
}

/// Bindings the session path served from cache while they were nearing
/// expiry. Drained by the background refresher.
#[derive(Default)]
pub struct RefreshQueue {
    entries: Mutex<VecDeque<RefreshRequest>>,
}

impl RefreshQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a request; duplicates already waiting are dropped.
    pub fn push(&self, request: RefreshRequest) {
        let mut entries = self.entries.lock();
        if !entries.contains(&request) {
            entries.push_back(request);
        }
    }

    pub fn drain(&self) -> Vec<RefreshRequest> {
        self.entries.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// Walks the thing registry and refreshes bindings whose last
/// verification has aged past three quarters of the trust window.
pub struct BackgroundRefresher {
    thing_registry: Arc<ThingRegistry>,
    cloud: Arc<dyn CloudVerifier>,
    queue: Arc<RefreshQueue>,
    interval: std::time::Duration,
}

impl BackgroundRefresher {
    pub fn new(
        thing_registry: Arc<ThingRegistry>,
        cloud: Arc<dyn CloudVerifier>,
        queue: Arc<RefreshQueue>,
        interval: std::time::Duration,
    ) -> Self {
        Self {
            thing_registry,
            cloud,
            queue,
            interval,
        }
    }

    /// Spawn the periodic task. Abort the returned handle to stop it.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.refresh_once().await;
            }
        })
    }

    /// One full pass: flagged bindings first, then a registry sweep for
    /// bindings nearing expiry.
    pub async fn refresh_once(&self) {
        for request in self.queue.drain() {
            match self.thing_registry.get_or_create(&request.thing_name).await {
                Ok(mut thing) => self.refresh_binding(&mut thing, &request.certificate_id).await,
                Err(error) => {
                    warn!(thing = %request.thing_name, %error, "skipping flagged binding refresh")
                }
            }
        }

        let refresh_after = self.thing_registry.trust_duration() * 3 / 4;
        let now = chrono::Utc::now();
        let mut things = self.thing_registry.all_things();
        while let Some(entry) = things.next().await {
            let mut thing = match entry {
                Ok(thing) => thing,
                Err(error) => {
                    warn!(%error, "skipping unreadable thing during refresh sweep");
                    continue;
                }
            };
            let aging: Vec<String> = thing
                .attached_certificates()
                .iter()
                .filter(|(_, verified_at)| {
                    now.signed_duration_since(**verified_at) >= refresh_after
                })
                .map(|(certificate_id, _)| certificate_id.clone())
                .collect();
            for certificate_id in aging {
                self.refresh_binding(&mut thing, &certificate_id).await;
            }
        }
    }

    async fn refresh_binding(&self, thing: &mut Thing, certificate_id: &str) {
        let verdict = self
            .cloud
            .verify_thing_attached(thing.thing_name(), certificate_id)
            .await;
        match verdict {
            Ok(true) => {
                thing.attach(certificate_id, chrono::Utc::now());
            }
            Ok(false) => {
                thing.detach(certificate_id);
            }
            Err(error) => {
                debug!(thing = %thing.thing_name(), %error, "binding refresh deferred, cloud unavailable");
                return;
            }
        }
        if let Err(error) = self.thing_registry.update(thing.clone()).await {
            warn!(thing = %thing.thing_name(), %error, "failed to persist refreshed binding");
        }
    }
}
