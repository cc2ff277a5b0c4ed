// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod certificates;
pub mod things;

pub use certificates::SledCertificateRepository;
pub use things::SledThingRepository;
