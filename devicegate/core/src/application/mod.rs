// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod certificate_registry;
pub mod device_auth;
pub mod group_manager;
pub mod permission_evaluator;
pub mod refresh_task;
pub mod session_factory;
pub mod session_manager;
pub mod thing_registry;

pub use certificate_registry::CertificateRegistry;
pub use device_auth::DeviceAuthService;
pub use group_manager::{GroupManager, PermissionSet};
pub use permission_evaluator::PermissionEvaluator;
pub use refresh_task::{BackgroundRefresher, RefreshQueue};
pub use session_factory::{ComponentGate, Credentials, SessionFactory};
pub use session_manager::SessionManager;
pub use thing_registry::ThingRegistry;
