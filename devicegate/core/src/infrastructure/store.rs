// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Runtime Key/Value Store
//!
//! Wraps a `sled::Db` in a thin `RuntimeStore` newtype that can be
//! injected into the registry repository implementations. The store
//! holds the broker's `runtime` root as two named trees:
//!
//! ```text
//! clientDeviceCerts/   <certificateId> → { status, statusUpdated }
//! clientDeviceThings/  <thingName>     → { version, certificates }
//! ```

use std::path::Path;

use crate::domain::errors::RegistryError;

pub(crate) const CERTIFICATES_TREE: &str = "clientDeviceCerts";
pub(crate) const THINGS_TREE: &str = "clientDeviceThings";

#[derive(Clone)]
pub struct RuntimeStore {
    certificates: sled::Tree,
    things: sled::Tree,
}

impl RuntimeStore {
    /// Open (or create) the store rooted at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let db = sled::open(path)?;
        Ok(Self {
            certificates: db.open_tree(CERTIFICATES_TREE)?,
            things: db.open_tree(THINGS_TREE)?,
        })
    }

    pub(crate) fn certificates(&self) -> &sled::Tree {
        &self.certificates
    }

    pub(crate) fn things(&self) -> &sled::Tree {
        &self.things
    }
}
