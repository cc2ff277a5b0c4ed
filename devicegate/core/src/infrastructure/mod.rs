// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod configuration;
pub mod event_bus;
pub mod repositories;
pub mod store;

pub use event_bus::DomainEventBus;
pub use store::RuntimeStore;
