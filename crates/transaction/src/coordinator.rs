// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::Display;

use futures_util::future::BoxFuture;
use tracing::{debug, error, instrument};

use crate::{Session, TransactionConfig, TransactionId, error::kind_of};

/// Owns one session handle for the duration of a top-level unit of work and
/// guarantees it ends in exactly one commit or one rollback.
///
/// Operations against the handle are strictly sequential. A failed commit is
/// followed by exactly one rollback attempt and never by a second commit.
pub struct TransactionCoordinator<'s, S: Session> {
	id: TransactionId,
	session: &'s mut S,
	config: TransactionConfig,
}

impl<'s, S: Session> TransactionCoordinator<'s, S> {
	pub fn new(session: &'s mut S) -> Self {
		Self::with_config(session, TransactionConfig::default())
	}

	pub fn with_config(session: &'s mut S, config: TransactionConfig) -> Self {
		Self {
			id: TransactionId::generate(),
			session,
			config,
		}
	}

	pub fn id(&self) -> TransactionId {
		self.id
	}

	pub fn config(&self) -> &TransactionConfig {
		&self.config
	}

	pub fn session(&mut self) -> &mut S {
		&mut *self.session
	}

	#[instrument(name = "transaction::begin", level = "debug", skip_all, fields(transaction_id = %self.id))]
	pub fn begin(&mut self) -> Result<(), S::Error> {
		debug!("transaction begin");
		self.session.begin().wait().inspect_err(|err| error!(error = %err, "transaction begin failed"))
	}

	/// Commits the handle, blocking on a pending commit. On failure the
	/// handle is rolled back once and the commit error is returned, unless
	/// the rollback fails too, in which case its error wins.
	#[instrument(name = "transaction::commit", level = "debug", skip_all, fields(transaction_id = %self.id))]
	pub fn commit(&mut self) -> Result<(), S::Error> {
		match self.session.commit().wait() {
			Ok(()) => {
				debug!("transaction commit succeeded");
				Ok(())
			}
			Err(err) => {
				error!(error = %err, "transaction commit failed");
				self.rollback()?;
				Err(err)
			}
		}
	}

	#[instrument(name = "transaction::rollback", level = "debug", skip_all, fields(transaction_id = %self.id))]
	pub fn rollback(&mut self) -> Result<(), S::Error> {
		self.session
			.rollback()
			.wait()
			.inspect(|_| debug!("transaction rollback succeeded"))
			.inspect_err(|err| error!(error = %err, "transaction rollback failed"))
	}

	#[instrument(name = "transaction::commit_async", level = "debug", skip_all, fields(transaction_id = %self.id))]
	pub async fn commit_async(&mut self) -> Result<(), S::Error> {
		match self.session.commit().await {
			Ok(()) => {
				debug!("transaction commit succeeded");
				Ok(())
			}
			Err(err) => {
				error!(error = %err, "transaction commit failed");
				self.rollback_async().await?;
				Err(err)
			}
		}
	}

	#[instrument(name = "transaction::rollback_async", level = "debug", skip_all, fields(transaction_id = %self.id))]
	pub async fn rollback_async(&mut self) -> Result<(), S::Error> {
		self.session
			.rollback()
			.await
			.inspect(|_| debug!("transaction rollback succeeded"))
			.inspect_err(|err| error!(error = %err, "transaction rollback failed"))
	}

	/// Runs `body` against the handle, committing if it returns `Ok` and
	/// rolling back if it returns `Err`.
	///
	/// The body's error is returned after the rollback. A failing rollback
	/// replaces it.
	#[instrument(name = "transaction::scoped_sync", level = "debug", skip_all, fields(transaction_id = %self.id))]
	pub fn scoped_sync<F, R, E>(&mut self, body: F) -> Result<R, E>
	where
		F: FnOnce(&mut S) -> Result<R, E>,
		E: From<S::Error> + Display,
	{
		let outcome = match self.begin() {
			Ok(()) => body(&mut *self.session),
			Err(err) => Err(E::from(err)),
		};

		match outcome {
			Ok(value) => match self.commit() {
				Ok(()) => Ok(value),
				Err(err) => {
					// commit already rolled back
					error!(error = %err, error_type = kind_of(&err), "transaction failed");
					Err(err.into())
				}
			},
			Err(err) => {
				self.rollback()?;
				error!(error = %err, error_type = kind_of(&err), "transaction failed");
				Err(err)
			}
		}
	}

	/// Async counterpart of [`scoped_sync`](Self::scoped_sync).
	///
	/// Unlike the sync scope, the body runs inside a nested checkpoint opened
	/// on the handle unless `checkpoint_async_scope` is disabled. A failure to
	/// open the checkpoint is returned without a rollback.
	#[instrument(name = "transaction::scoped_async", level = "debug", skip_all, fields(transaction_id = %self.id))]
	pub async fn scoped_async<F, R, E>(&mut self, body: F) -> Result<R, E>
	where
		F: for<'c> FnOnce(&'c mut S) -> BoxFuture<'c, Result<R, E>>,
		E: From<S::Error> + Display,
	{
		let checkpoint = if self.config.checkpoint_async_scope {
			match self.session.begin_nested().await {
				Ok(savepoint) => {
					debug!("transaction checkpoint opened");
					Some(savepoint)
				}
				Err(err) => {
					error!(error = %err, error_type = kind_of(&err), "transaction checkpoint failed");
					return Err(err.into());
				}
			}
		} else {
			None
		};

		let outcome = body(&mut *self.session).await;
		// the terminal commit or rollback below covers the checkpoint
		drop(checkpoint);

		match outcome {
			Ok(value) => match self.commit_async().await {
				Ok(()) => Ok(value),
				Err(err) => {
					error!(error = %err, error_type = kind_of(&err), "async transaction failed");
					Err(err.into())
				}
			},
			Err(err) => {
				self.rollback_async().await?;
				error!(error = %err, error_type = kind_of(&err), "async transaction failed");
				Err(err)
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use std::convert::Infallible;

	use super::TransactionCoordinator;
	use crate::{Completion, Session};

	#[derive(Default)]
	struct Counting {
		begins: usize,
		commits: usize,
		rollbacks: usize,
	}

	impl Session for Counting {
		type Savepoint = ();
		type Error = Infallible;

		fn begin(&mut self) -> Completion<'_, (), Infallible> {
			self.begins += 1;
			Completion::ready(Ok(()))
		}

		fn commit(&mut self) -> Completion<'_, (), Infallible> {
			self.commits += 1;
			Completion::ready(Ok(()))
		}

		fn rollback(&mut self) -> Completion<'_, (), Infallible> {
			self.rollbacks += 1;
			Completion::ready(Ok(()))
		}

		fn begin_nested(&mut self) -> Completion<'_, (), Infallible> {
			Completion::ready(Ok(()))
		}

		fn rollback_savepoint<'a>(&'a mut self, _: &'a ()) -> Completion<'a, (), Infallible> {
			Completion::ready(Ok(()))
		}
	}

	#[derive(Debug, thiserror::Error)]
	#[error("{0}")]
	struct BodyError(String);

	impl From<Infallible> for BodyError {
		fn from(err: Infallible) -> Self {
			match err {}
		}
	}

	#[test]
	fn test_scoped_sync_begins_before_body() {
		let mut session = Counting::default();
		let result = TransactionCoordinator::new(&mut session).scoped_sync(|session| {
			assert_eq!(session.begins, 1);
			Ok::<_, BodyError>("ok")
		});
		assert_eq!(result.unwrap(), "ok");
		assert_eq!(session.commits, 1);
		assert_eq!(session.rollbacks, 0);
	}

	#[test]
	fn test_scoped_sync_body_error() {
		let mut session = Counting::default();
		let result: Result<(), _> = TransactionCoordinator::new(&mut session)
			.scoped_sync(|_| Err(BodyError("boom".to_string())));
		assert_eq!(result.unwrap_err().to_string(), "boom");
		assert_eq!(session.commits, 0);
		assert_eq!(session.rollbacks, 1);
	}

	#[test]
	fn test_coordinators_get_distinct_ids() {
		let mut a = Counting::default();
		let mut b = Counting::default();
		let first = TransactionCoordinator::new(&mut a).id();
		let second = TransactionCoordinator::new(&mut b).id();
		assert_ne!(first, second);
	}
}
