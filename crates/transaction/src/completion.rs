// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::future::{Future, IntoFuture};

use futures_util::future::{BoxFuture, Either, Ready, ready};

/// Outcome of a session operation that either finished on the spot or still
/// has to be driven to completion.
///
/// Blocking handles return [`Completion::Ready`], cooperatively scheduled ones
/// return [`Completion::Pending`]. Coordinators accept both: sync entry points
/// call [`Completion::wait`], async ones `.await` the completion.
#[must_use = "a completion does nothing until it is waited on or awaited"]
pub enum Completion<'a, T, E> {
	Ready(Result<T, E>),
	Pending(BoxFuture<'a, Result<T, E>>),
}

impl<'a, T, E> Completion<'a, T, E> {
	pub fn ready(result: Result<T, E>) -> Self {
		Self::Ready(result)
	}

	pub fn pending<F>(future: F) -> Self
	where
		F: Future<Output = Result<T, E>> + Send + 'a,
	{
		Self::Pending(Box::pin(future))
	}

	pub fn is_pending(&self) -> bool {
		matches!(self, Self::Pending(_))
	}

	/// Drives the completion on the calling thread, blocking until a pending
	/// computation resolves.
	pub fn wait(self) -> Result<T, E> {
		match self {
			Self::Ready(result) => result,
			Self::Pending(future) => futures_executor::block_on(future),
		}
	}
}

impl<'a, T, E> IntoFuture for Completion<'a, T, E> {
	type Output = Result<T, E>;
	type IntoFuture = Either<Ready<Result<T, E>>, BoxFuture<'a, Result<T, E>>>;

	fn into_future(self) -> Self::IntoFuture {
		match self {
			Self::Ready(result) => Either::Left(ready(result)),
			Self::Pending(future) => Either::Right(future),
		}
	}
}

impl<T, E> From<Result<T, E>> for Completion<'_, T, E> {
	fn from(result: Result<T, E>) -> Self {
		Self::Ready(result)
	}
}

#[cfg(test)]
mod tests {
	use std::task::Poll;

	use futures_util::future::poll_fn;

	use super::Completion;

	fn pending_after_one_poll(value: u32) -> Completion<'static, u32, String> {
		let mut polled = false;
		Completion::pending(poll_fn(move |cx| {
			if polled {
				Poll::Ready(Ok(value))
			} else {
				polled = true;
				cx.waker().wake_by_ref();
				Poll::Pending
			}
		}))
	}

	#[test]
	fn test_wait_ready() {
		let completion: Completion<'_, u32, String> = Completion::ready(Ok(1));
		assert!(!completion.is_pending());
		assert_eq!(completion.wait(), Ok(1));
	}

	#[test]
	fn test_wait_drives_pending() {
		let completion = pending_after_one_poll(7);
		assert!(completion.is_pending());
		assert_eq!(completion.wait(), Ok(7));
	}

	#[test]
	fn test_wait_pending_failure() {
		let completion: Completion<'_, u32, String> = Completion::pending(async { Err("boom".to_string()) });
		assert_eq!(completion.wait(), Err("boom".to_string()));
	}

	#[tokio::test]
	async fn test_await_both_variants() {
		let ready: Completion<'_, u32, String> = Err::<u32, _>("nope".to_string()).into();
		assert_eq!(ready.await, Err("nope".to_string()));
		assert_eq!(pending_after_one_poll(3).await, Ok(3));
	}
}
