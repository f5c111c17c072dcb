// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Test support for transaction coordination: recording sessions, a counting
//! session provider and a sample service error type.

use tracing_subscriber::EnvFilter;

pub mod error;
pub mod provider;
pub mod session;
pub mod util;

pub use error::ServiceError;
pub use provider::MockProvider;
pub use session::{Journal, MockSavepoint, MockSession, Mode, Op, StoreError};

/// Routes `tracing` output through the test harness, filtered by `RUST_LOG`.
/// Safe to call from every test.
pub fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).with_test_writer().try_init();
}
