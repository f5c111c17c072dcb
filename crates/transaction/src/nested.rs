// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::Display;

use futures_util::future::BoxFuture;
use tracing::{debug, error, instrument, warn};

use crate::{Session, TransactionId, error::kind_of};

/// Isolates a sub-unit of work behind a savepoint, so that its failure only
/// undoes its own changes and leaves the enclosing transaction usable.
///
/// Holds at most one savepoint. Savepoints are single-use: a terminal commit
/// or rollback clears it, and `commit`/`rollback` without a held savepoint
/// are no-ops that never touch the session.
pub struct NestedTransactionCoordinator<'s, S: Session> {
	id: TransactionId,
	session: &'s mut S,
	savepoint: Option<S::Savepoint>,
}

impl<'s, S: Session> NestedTransactionCoordinator<'s, S> {
	pub fn new(session: &'s mut S) -> Self {
		Self {
			id: TransactionId::generate(),
			session,
			savepoint: None,
		}
	}

	pub fn id(&self) -> TransactionId {
		self.id
	}

	pub fn session(&mut self) -> &mut S {
		&mut *self.session
	}

	pub fn has_savepoint(&self) -> bool {
		self.savepoint.is_some()
	}

	#[instrument(name = "transaction::nested::begin", level = "debug", skip_all, fields(nested_transaction_id = %self.id))]
	pub fn begin(&mut self) -> Result<(), S::Error> {
		debug!("nested transaction begin");
		let savepoint = self
			.session
			.begin_nested()
			.wait()
			.inspect_err(|err| error!(error = %err, "nested transaction begin failed"))?;
		self.hold(savepoint);
		Ok(())
	}

	#[instrument(name = "transaction::nested::commit", level = "debug", skip_all, fields(nested_transaction_id = %self.id))]
	pub fn commit(&mut self) -> Result<(), S::Error> {
		let Some(savepoint) = self.savepoint.as_ref() else {
			return Ok(());
		};

		match self.session.release_savepoint(savepoint).wait() {
			Ok(()) => {
				self.savepoint = None;
				debug!("nested transaction commit succeeded");
				Ok(())
			}
			Err(err) => {
				error!(error = %err, "nested transaction commit failed");
				self.rollback()?;
				Err(err)
			}
		}
	}

	#[instrument(name = "transaction::nested::rollback", level = "debug", skip_all, fields(nested_transaction_id = %self.id))]
	pub fn rollback(&mut self) -> Result<(), S::Error> {
		let Some(savepoint) = self.savepoint.take() else {
			return Ok(());
		};

		self.session
			.rollback_savepoint(&savepoint)
			.wait()
			.inspect(|_| debug!("nested transaction rollback succeeded"))
			.inspect_err(|err| error!(error = %err, "nested transaction rollback failed"))
	}

	/// Runs `body` inside a fresh savepoint. On `Err` only the savepoint is
	/// rolled back; the body's error is returned unless the rollback fails.
	#[instrument(name = "transaction::nested::scoped", level = "debug", skip_all, fields(nested_transaction_id = %self.id))]
	pub fn scoped<F, R, E>(&mut self, body: F) -> Result<R, E>
	where
		F: FnOnce(&mut S) -> Result<R, E>,
		E: From<S::Error> + Display,
	{
		self.begin()?;

		match body(&mut *self.session) {
			Ok(value) => {
				self.commit()?;
				Ok(value)
			}
			Err(err) => {
				self.rollback()?;
				error!(error = %err, error_type = kind_of(&err), "nested transaction failed");
				Err(err)
			}
		}
	}

	#[instrument(name = "transaction::nested::begin_async", level = "debug", skip_all, fields(nested_transaction_id = %self.id))]
	pub async fn begin_async(&mut self) -> Result<(), S::Error> {
		debug!("nested transaction begin");
		let savepoint = self
			.session
			.begin_nested()
			.await
			.inspect_err(|err| error!(error = %err, "nested transaction begin failed"))?;
		self.hold(savepoint);
		Ok(())
	}

	#[instrument(name = "transaction::nested::commit_async", level = "debug", skip_all, fields(nested_transaction_id = %self.id))]
	pub async fn commit_async(&mut self) -> Result<(), S::Error> {
		let Some(savepoint) = self.savepoint.as_ref() else {
			return Ok(());
		};

		match self.session.release_savepoint(savepoint).await {
			Ok(()) => {
				self.savepoint = None;
				debug!("nested transaction commit succeeded");
				Ok(())
			}
			Err(err) => {
				error!(error = %err, "nested transaction commit failed");
				self.rollback_async().await?;
				Err(err)
			}
		}
	}

	#[instrument(name = "transaction::nested::rollback_async", level = "debug", skip_all, fields(nested_transaction_id = %self.id))]
	pub async fn rollback_async(&mut self) -> Result<(), S::Error> {
		let Some(savepoint) = self.savepoint.take() else {
			return Ok(());
		};

		self.session
			.rollback_savepoint(&savepoint)
			.await
			.inspect(|_| debug!("nested transaction rollback succeeded"))
			.inspect_err(|err| error!(error = %err, "nested transaction rollback failed"))
	}

	#[instrument(name = "transaction::nested::scoped_async", level = "debug", skip_all, fields(nested_transaction_id = %self.id))]
	pub async fn scoped_async<F, R, E>(&mut self, body: F) -> Result<R, E>
	where
		F: for<'c> FnOnce(&'c mut S) -> BoxFuture<'c, Result<R, E>>,
		E: From<S::Error> + Display,
	{
		self.begin_async().await?;

		match body(&mut *self.session).await {
			Ok(value) => {
				self.commit_async().await?;
				Ok(value)
			}
			Err(err) => {
				self.rollback_async().await?;
				error!(error = %err, error_type = kind_of(&err), "nested transaction failed");
				Err(err)
			}
		}
	}

	fn hold(&mut self, savepoint: S::Savepoint) {
		if self.savepoint.replace(savepoint).is_some() {
			warn!("nested transaction begin replaced a savepoint that was still held");
		}
	}
}
