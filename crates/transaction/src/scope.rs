// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Session scopes for work running outside of any request, such as
//! background jobs: a fresh session is obtained, used for one transaction and
//! closed again.

use std::fmt::Display;

use futures_util::future::BoxFuture;
use tracing::{instrument, warn};

use crate::{Session, SessionProvider, TransactionCoordinator};

#[instrument(name = "transaction::session_scope", level = "debug", skip_all)]
pub fn session_scope<S, P, F, R, E>(provider: &P, body: F) -> Result<R, E>
where
	S: Session,
	P: SessionProvider<S> + ?Sized,
	F: FnOnce(&mut S) -> Result<R, E>,
	E: From<S::Error> + Display,
{
	let mut session = provider.provide().wait()?;
	let result = TransactionCoordinator::new(&mut session).scoped_sync(body);
	close_session(&mut session);
	result
}

#[instrument(name = "transaction::session_scope_async", level = "debug", skip_all)]
pub async fn session_scope_async<S, P, F, R, E>(provider: &P, body: F) -> Result<R, E>
where
	S: Session,
	P: SessionProvider<S> + ?Sized,
	F: for<'c> FnOnce(&'c mut S) -> BoxFuture<'c, Result<R, E>>,
	E: From<S::Error> + Display,
{
	let mut session = provider.provide().await?;
	let result = TransactionCoordinator::new(&mut session).scoped_async(body).await;
	close_session_async(&mut session).await;
	result
}

pub(crate) fn close_session<S: Session>(session: &mut S) {
	if let Err(err) = session.close().wait() {
		warn!(error = %err, "failed to close session");
	}
}

pub(crate) async fn close_session_async<S: Session>(session: &mut S) {
	if let Err(err) = session.close().await {
		warn!(error = %err, "failed to close session");
	}
}
