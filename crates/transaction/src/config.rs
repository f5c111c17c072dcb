// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

/// Configuration shared by coordinators and the wrapping combinators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionConfig {
	/// Open a nested checkpoint around the body of
	/// [`scoped_async`](crate::TransactionCoordinator::scoped_async).
	/// Disabling it makes the async scope behave like the sync one.
	pub checkpoint_async_scope: bool,
	/// Close sessions the combinators obtained from a provider once their
	/// scope has ended.
	pub close_provided_sessions: bool,
}

impl Default for TransactionConfig {
	fn default() -> Self {
		Self {
			checkpoint_async_scope: true,
			close_provided_sessions: true,
		}
	}
}

impl TransactionConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn checkpoint_async_scope(mut self, enabled: bool) -> Self {
		self.checkpoint_async_scope = enabled;
		self
	}

	pub fn close_provided_sessions(mut self, enabled: bool) -> Self {
		self.close_provided_sessions = enabled;
		self
	}
}
