// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Wrapping combinators that run an operation inside a top-level transaction
//! scope.
//!
//! The session an invocation runs against is taken from its positional slot,
//! then from its `db` slot, and only when both are empty from the wrapper's
//! [`SessionProvider`]. Failures leave the wrapper either unchanged, for
//! control-flow errors, or translated into a [`TransactionError`].

use futures_util::future::BoxFuture;
use tracing::{debug, error, instrument};

use crate::{
	Session, SessionProvider, TransactionConfig, TransactionCoordinator, TransactionError, TransactionalError,
	scope::{close_session, close_session_async},
};

/// Arguments of one invocation of a wrapped operation.
pub struct Call<'s, S, A> {
	session: Option<&'s mut S>,
	db: Option<&'s mut S>,
	args: A,
}

impl<'s, S, A> Call<'s, S, A> {
	/// An invocation without a session; one is obtained from the provider.
	pub fn new(args: A) -> Self {
		Self {
			session: None,
			db: None,
			args,
		}
	}

	/// An invocation passing its session positionally.
	pub fn with_session(session: &'s mut S, args: A) -> Self {
		Self {
			session: Some(session),
			db: None,
			args,
		}
	}

	/// Passes a session in the conventional `db` slot.
	pub fn db(mut self, session: &'s mut S) -> Self {
		self.db = Some(session);
		self
	}

	fn into_parts(self) -> (Option<(SessionOrigin, &'s mut S)>, A) {
		let session = match (self.session, self.db) {
			(Some(session), _) => Some((SessionOrigin::Positional, session)),
			(None, Some(session)) => Some((SessionOrigin::Named, session)),
			(None, None) => None,
		};
		(session, self.args)
	}
}

/// Where the session of a wrapped invocation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOrigin {
	Positional,
	Named,
	Provided,
}

/// A blocking operation that runs transactionally on every call.
pub struct Transactional<P, F> {
	name: &'static str,
	provider: P,
	operation: F,
	config: TransactionConfig,
}

/// Wraps `operation`, reported as `name` in errors and logs, so that each
/// [`call`](Transactional::call) runs it inside
/// [`scoped_sync`](TransactionCoordinator::scoped_sync).
pub fn wrap_transactional<P, F>(name: &'static str, provider: P, operation: F) -> Transactional<P, F> {
	Transactional {
		name,
		provider,
		operation,
		config: TransactionConfig::default(),
	}
}

impl<P, F> Transactional<P, F> {
	pub fn with_config(mut self, config: TransactionConfig) -> Self {
		self.config = config;
		self
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	#[instrument(name = "transaction::wrap::call", level = "debug", skip_all, fields(function = self.name))]
	pub fn call<S, A, R, E>(&self, call: Call<'_, S, A>) -> Result<R, E>
	where
		S: Session,
		P: SessionProvider<S>,
		F: Fn(&mut S, A) -> Result<R, E>,
		E: TransactionalError + From<S::Error>,
	{
		let (session, args) = call.into_parts();

		let result = match session {
			Some((origin, session)) => {
				debug!(origin = ?origin, "session resolved");
				self.run(session, args)
			}
			None => match self.provider.provide().wait() {
				Ok(mut session) => {
					debug!(origin = ?SessionOrigin::Provided, "session resolved");
					let result = self.run(&mut session, args);
					if self.config.close_provided_sessions {
						close_session(&mut session);
					}
					result
				}
				Err(err) => Err(<E as From<S::Error>>::from(err)),
			},
		};

		result.map_err(|err| translate(self.name, "transaction error", err))
	}

	fn run<S, A, R, E>(&self, session: &mut S, args: A) -> Result<R, E>
	where
		S: Session,
		F: Fn(&mut S, A) -> Result<R, E>,
		E: TransactionalError + From<S::Error>,
	{
		TransactionCoordinator::with_config(session, self.config.clone())
			.scoped_sync(|session| (self.operation)(session, args))
	}
}

/// An async operation that runs transactionally on every call.
pub struct AsyncTransactional<P, F> {
	name: &'static str,
	provider: P,
	operation: F,
	config: TransactionConfig,
}

/// Async counterpart of [`wrap_transactional`]; calls run inside
/// [`scoped_async`](TransactionCoordinator::scoped_async) and await the
/// provider when it hands out sessions asynchronously.
pub fn wrap_async_transactional<P, F>(name: &'static str, provider: P, operation: F) -> AsyncTransactional<P, F> {
	AsyncTransactional {
		name,
		provider,
		operation,
		config: TransactionConfig::default(),
	}
}

impl<P, F> AsyncTransactional<P, F> {
	pub fn with_config(mut self, config: TransactionConfig) -> Self {
		self.config = config;
		self
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	#[instrument(name = "transaction::wrap::call_async", level = "debug", skip_all, fields(function = self.name))]
	pub async fn call<S, A, R, E>(&self, call: Call<'_, S, A>) -> Result<R, E>
	where
		S: Session,
		P: SessionProvider<S>,
		F: for<'c> Fn(&'c mut S, A) -> BoxFuture<'c, Result<R, E>>,
		E: TransactionalError + From<S::Error>,
	{
		let (session, args) = call.into_parts();

		let result = match session {
			Some((origin, session)) => {
				debug!(origin = ?origin, "session resolved");
				self.run(session, args).await
			}
			None => match self.provider.provide().await {
				Ok(mut session) => {
					debug!(origin = ?SessionOrigin::Provided, "session resolved");
					let result = self.run(&mut session, args).await;
					if self.config.close_provided_sessions {
						close_session_async(&mut session).await;
					}
					result
				}
				Err(err) => Err(<E as From<S::Error>>::from(err)),
			},
		};

		result.map_err(|err| translate(self.name, "async transaction error", err))
	}

	async fn run<S, A, R, E>(&self, session: &mut S, args: A) -> Result<R, E>
	where
		S: Session,
		F: for<'c> Fn(&'c mut S, A) -> BoxFuture<'c, Result<R, E>>,
		E: TransactionalError + From<S::Error>,
	{
		TransactionCoordinator::with_config(session, self.config.clone())
			.scoped_async(|session| (self.operation)(session, args))
			.await
	}
}

fn translate<E: TransactionalError>(function: &'static str, event: &'static str, err: E) -> E {
	error!(function, error = %err, error_type = err.kind(), "{}", event);
	if err.is_control_flow() {
		return err;
	}
	E::from(TransactionError::wrap(function, &err))
}
