// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use crate::Completion;

/// A live connection or transaction context against a backing store.
///
/// Handles are created and owned elsewhere; coordinators only borrow them for
/// the duration of one scope. Every operation returns a [`Completion`], so the
/// same trait covers blocking and asynchronous stores.
pub trait Session: Send {
	/// Checkpoint token returned by [`Session::begin_nested`].
	type Savepoint: Send;

	type Error: std::error::Error + Send + Sync + 'static;

	/// Starts a transaction. Stores that begin implicitly keep the default.
	fn begin(&mut self) -> Completion<'_, (), Self::Error> {
		Completion::ready(Ok(()))
	}

	fn commit(&mut self) -> Completion<'_, (), Self::Error>;

	fn rollback(&mut self) -> Completion<'_, (), Self::Error>;

	/// Opens a nested checkpoint inside the current transaction.
	fn begin_nested(&mut self) -> Completion<'_, Self::Savepoint, Self::Error>;

	/// Makes the work done since `savepoint` part of the enclosing
	/// transaction. Defaults to the handle's commit.
	fn release_savepoint<'a>(&'a mut self, savepoint: &'a Self::Savepoint) -> Completion<'a, (), Self::Error> {
		let _ = savepoint;
		self.commit()
	}

	/// Undoes the work done since `savepoint`.
	fn rollback_savepoint<'a>(&'a mut self, savepoint: &'a Self::Savepoint) -> Completion<'a, (), Self::Error>;

	/// Returns the handle to wherever it came from.
	fn close(&mut self) -> Completion<'_, (), Self::Error> {
		Completion::ready(Ok(()))
	}
}

/// Source of fresh sessions for operations called without one.
///
/// Each call yields exactly one live handle whose ownership passes to the
/// caller.
pub trait SessionProvider<S: Session> {
	fn provide(&self) -> Completion<'_, S, S::Error>;
}

/// Provider backed by a closure, see [`provider_fn`].
#[derive(Clone)]
pub struct FnProvider<F> {
	f: F,
}

/// Turns a blocking session factory into a [`SessionProvider`].
pub fn provider_fn<F>(f: F) -> FnProvider<F> {
	FnProvider {
		f,
	}
}

impl<S, F> SessionProvider<S> for FnProvider<F>
where
	S: Session,
	F: Fn() -> Result<S, S::Error>,
{
	fn provide(&self) -> Completion<'_, S, S::Error> {
		Completion::ready((self.f)())
	}
}

impl<S, P> SessionProvider<S> for &P
where
	S: Session,
	P: SessionProvider<S> + ?Sized,
{
	fn provide(&self) -> Completion<'_, S, S::Error> {
		(**self).provide()
	}
}

impl<S, P> SessionProvider<S> for Arc<P>
where
	S: Session,
	P: SessionProvider<S> + ?Sized,
{
	fn provide(&self) -> Completion<'_, S, S::Error> {
		(**self).provide()
	}
}
