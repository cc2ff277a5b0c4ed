// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # aegis-devicegate-core
//!
//! On-device authentication and authorization broker for client devices
//! (IoT things) connecting to brokers hosted by the AEGIS edge runtime.
//! Devices present an X.509 certificate PEM and a client id; local
//! verifiers then ask this crate whether an authenticated device may
//! perform an operation on a resource. Decisions are computed from a
//! locally cached policy model so they stay deterministic while the
//! upstream cloud is unreachable, inside a configured trust window.
//!
//! ## Bounded Contexts Implemented
//!
//! | Bounded Context | Domain files | Notes |
//! |---|---|---|
//! | **Device Identity** | [`domain::certificate`], [`domain::thing`] | cloud-verified, trust-bounded |
//! | **Device Grouping** | [`domain::rule`], [`domain::group`] | selection rules → policies |
//! | **Authorization** | [`domain::attribute`], [`domain::wildcard`], [`domain::policy_variable`] | pattern evaluation |
//! | **Session Lifecycle** | [`domain::session`], [`application::session_factory`] | credential pipeline |
//!
//! ## Layer Structure
//!
//! ```text
//! application/    ← use-cases: registries, session factory, group manager, evaluator
//!     ↓
//! domain/         ← aggregates, value objects, domain events, repository traits
//!     ↓
//! infrastructure/ ← sled persistence, event bus, host configuration parsing
//! ```
//!
//! ## Integration Tests
//!
//! See `devicegate/core/tests/` for end-to-end authorization scenarios.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use domain::*;
