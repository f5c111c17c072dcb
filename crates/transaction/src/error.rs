// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::any::type_name;

/// The domain transaction error produced by the wrapping combinators for any
/// failure that is not a control-flow error.
///
/// Carries the human readable message, the name of the wrapped operation and
/// the string form and kind of the failure it replaced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransactionError {
	message: String,
	function: Option<String>,
	cause: String,
	underlying_error_kind: String,
}

impl TransactionError {
	pub const CODE: &'static str = "DATABASE_ERROR";

	/// Translates `err`, raised while running `function` transactionally.
	pub fn wrap<E: TransactionalError>(function: &str, err: &E) -> Self {
		Self {
			message: format!("Transaction failed in {}: {}", function, err),
			function: Some(function.to_string()),
			cause: err.to_string(),
			underlying_error_kind: err.kind().to_string(),
		}
	}

	pub fn message(&self) -> &str {
		&self.message
	}

	pub fn function(&self) -> Option<&str> {
		self.function.as_deref()
	}

	/// String form of the failure this error replaced.
	pub fn cause(&self) -> &str {
		&self.cause
	}

	pub fn underlying_error_kind(&self) -> &str {
		&self.underlying_error_kind
	}

	pub fn code(&self) -> &'static str {
		Self::CODE
	}
}

/// Error types that can flow through the wrapping combinators.
///
/// Control-flow errors (request rejections and similar user-facing signals)
/// reach the caller unchanged; everything else is replaced by a
/// [`TransactionError`].
pub trait TransactionalError: std::error::Error + From<TransactionError> {
	fn is_control_flow(&self) -> bool {
		false
	}

	/// Reported as `error_type` in failure logs.
	fn kind(&self) -> &'static str {
		short_type_name(type_name::<Self>())
	}
}

impl TransactionalError for TransactionError {}

/// Kind of an error value, for log fields where no [`TransactionalError`]
/// implementation is available: the bare type name, without module path or
/// generic arguments.
pub(crate) fn kind_of<E>(_: &E) -> &'static str {
	short_type_name(type_name::<E>())
}

fn short_type_name(name: &'static str) -> &'static str {
	let base = name.split('<').next().unwrap_or(name);
	base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
	use super::{TransactionError, TransactionalError, kind_of, short_type_name};

	#[derive(Debug, thiserror::Error)]
	enum SampleError {
		#[error("{0}")]
		Invalid(String),
		#[error("rejected")]
		Rejected,
		#[error(transparent)]
		Transaction(#[from] TransactionError),
	}

	impl TransactionalError for SampleError {
		fn is_control_flow(&self) -> bool {
			matches!(self, SampleError::Rejected)
		}

		fn kind(&self) -> &'static str {
			match self {
				SampleError::Invalid(_) => "Invalid",
				SampleError::Rejected => "Rejected",
				SampleError::Transaction(_) => "Transaction",
			}
		}
	}

	#[test]
	fn test_wrap_message() {
		let err = TransactionError::wrap("create_user", &SampleError::Invalid("dup".to_string()));
		assert_eq!(err.message(), "Transaction failed in create_user: dup");
		assert_eq!(err.to_string(), "Transaction failed in create_user: dup");
		assert_eq!(err.function(), Some("create_user"));
		assert_eq!(err.cause(), "dup");
		assert_eq!(err.underlying_error_kind(), "Invalid");
		assert_eq!(err.code(), "DATABASE_ERROR");
	}

	#[test]
	fn test_control_flow_classification() {
		assert!(SampleError::Rejected.is_control_flow());
		assert!(!SampleError::Invalid("x".to_string()).is_control_flow());

		let err = TransactionError::wrap("op", &SampleError::Rejected);
		assert!(!err.is_control_flow());
	}

	#[test]
	fn test_default_kind_is_type_name() {
		let inner = TransactionError::wrap("op", &SampleError::Invalid("x".to_string()));
		assert_eq!(inner.kind(), "TransactionError");
	}

	#[test]
	fn test_kind_of_is_bare_type_name() {
		assert_eq!(kind_of(&SampleError::Rejected), "SampleError");
		assert_eq!(kind_of(&"x".to_string()), "String");
		assert_eq!(short_type_name("alloc::vec::Vec<core::option::Option<u8>>"), "Vec");
		assert_eq!(short_type_name("u32"), "u32");
	}
}
