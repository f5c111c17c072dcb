// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Executor-agnostic suspension for tests
//!
//! Lets mock handles hand out computations that really are pending on first
//! poll, without tying them to a particular runtime, so they can be driven
//! both by `Completion::wait` and from inside `#[tokio::test]`.

use std::task::Poll;

use futures_util::future::poll_fn;

/// Returns `Pending` once, waking itself, then completes.
pub async fn yield_once() {
	let mut yielded = false;
	poll_fn(move |cx| {
		if yielded {
			Poll::Ready(())
		} else {
			yielded = true;
			cx.waker().wake_by_ref();
			Poll::Pending
		}
	})
	.await
}
