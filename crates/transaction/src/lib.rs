// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Transaction lifecycle coordination over caller-supplied session handles.
//!
//! A [`TransactionCoordinator`] guarantees commit-on-success and
//! rollback-on-failure for one unit of work, a [`NestedTransactionCoordinator`]
//! isolates sub-units behind savepoints, and the wrapping combinators
//! ([`wrap_transactional`], [`wrap_async_transactional`]) run arbitrary
//! operations inside a scope and normalize their failures into
//! [`TransactionError`].

use std::{
	fmt::{Display, Formatter},
	ops::Deref,
};

use uuid::Uuid;

pub mod completion;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod nested;
pub mod scope;
pub mod session;
pub mod wrap;

pub use completion::Completion;
pub use config::TransactionConfig;
pub use coordinator::TransactionCoordinator;
pub use error::{TransactionError, TransactionalError};
pub use nested::NestedTransactionCoordinator;
pub use scope::{session_scope, session_scope_async};
pub use session::{FnProvider, Session, SessionProvider, provider_fn};
pub use wrap::{AsyncTransactional, Call, SessionOrigin, Transactional, wrap_async_transactional, wrap_transactional};

/// Correlation identifier for one coordinator instance, using UUIDv7 for
/// time-ordered uniqueness. Only used to tie log lines together.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct TransactionId(Uuid);

impl Default for TransactionId {
	fn default() -> Self {
		Self::generate()
	}
}

impl Deref for TransactionId {
	type Target = Uuid;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl TransactionId {
	pub fn generate() -> Self {
		Self(Uuid::now_v7())
	}
}

impl Display for TransactionId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Wraps `$op` with [`wrap_transactional`], naming it after the identifier.
///
/// ```ignore
/// let create_user = transactional!(create_user, provider);
/// create_user.call(Call::new(data))?;
/// ```
#[macro_export]
macro_rules! transactional {
	($op:ident, $provider:expr) => {
		$crate::wrap_transactional(stringify!($op), $provider, $op)
	};
}

/// Async counterpart of [`transactional!`].
#[macro_export]
macro_rules! async_transactional {
	($op:ident, $provider:expr) => {
		$crate::wrap_async_transactional(stringify!($op), $provider, $op)
	};
}
