// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use unitwork_transaction::{TransactionError, TransactionalError};

use crate::session::StoreError;

/// Error type of a sample service built on wrapped operations
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
	/// A request rejection that must reach the caller untouched.
	#[error("{status}: {detail}")]
	Rejected {
		status: u16,
		detail: String,
	},

	#[error("{0}")]
	Invalid(String),

	#[error(transparent)]
	Store(#[from] StoreError),

	#[error(transparent)]
	Transaction(#[from] TransactionError),
}

impl ServiceError {
	pub fn rejected(status: u16, detail: &str) -> Self {
		Self::Rejected {
			status,
			detail: detail.to_string(),
		}
	}

	pub fn invalid(message: &str) -> Self {
		Self::Invalid(message.to_string())
	}

	pub fn as_transaction(&self) -> Option<&TransactionError> {
		match self {
			Self::Transaction(err) => Some(err),
			_ => None,
		}
	}
}

impl TransactionalError for ServiceError {
	fn is_control_flow(&self) -> bool {
		matches!(self, Self::Rejected { .. })
	}

	fn kind(&self) -> &'static str {
		match self {
			Self::Rejected { .. } => "Rejected",
			Self::Invalid(_) => "Invalid",
			Self::Store(_) => "StoreError",
			Self::Transaction(_) => "TransactionError",
		}
	}
}
