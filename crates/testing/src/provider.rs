// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};

use unitwork_transaction::{Completion, SessionProvider};

use crate::{
	session::{Journal, MockSession, Mode, StoreError},
	util::pending::yield_once,
};

type Configure = Box<dyn Fn(MockSession) -> MockSession + Send + Sync>;

/// Hands out [`MockSession`]s that all record into one shared journal and
/// counts how often it was asked for one.
pub struct MockProvider {
	mode: Mode,
	journal: Journal,
	calls: Arc<AtomicUsize>,
	configure: Option<Configure>,
	failure: Option<String>,
}

impl MockProvider {
	pub fn new(mode: Mode) -> Self {
		Self {
			mode,
			journal: Journal::new(),
			calls: Arc::new(AtomicUsize::new(0)),
			configure: None,
			failure: None,
		}
	}

	pub fn blocking() -> Self {
		Self::new(Mode::Blocking)
	}

	pub fn asynchronous() -> Self {
		Self::new(Mode::Async)
	}

	/// Applied to every session before it is handed out.
	pub fn configure(mut self, configure: impl Fn(MockSession) -> MockSession + Send + Sync + 'static) -> Self {
		self.configure = Some(Box::new(configure));
		self
	}

	/// Makes every request for a session fail with `message`.
	pub fn fail(mut self, message: &str) -> Self {
		self.failure = Some(message.to_string());
		self
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	/// Journal shared by every session this provider handed out.
	pub fn journal(&self) -> &Journal {
		&self.journal
	}
}

impl SessionProvider<MockSession> for MockProvider {
	fn provide(&self) -> Completion<'_, MockSession, StoreError> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let result = match &self.failure {
			Some(message) => Err(StoreError(message.clone())),
			None => {
				let session = MockSession::new("provided", self.mode).with_journal(self.journal.clone());
				Ok(match &self.configure {
					Some(configure) => configure(session),
					None => session,
				})
			}
		};

		match self.mode {
			Mode::Blocking => Completion::ready(result),
			Mode::Async => Completion::pending(async move {
				yield_once().await;
				result
			}),
		}
	}
}

#[cfg(test)]
mod tests {
	use unitwork_transaction::{Session, SessionProvider};

	use super::MockProvider;
	use crate::session::Op;

	#[test]
	fn test_provided_sessions_share_the_journal() {
		let provider = MockProvider::blocking();
		let mut first = provider.provide().wait().unwrap();
		let mut second = provider.provide().wait().unwrap();
		first.commit().wait().unwrap();
		second.rollback().wait().unwrap();

		assert_eq!(provider.calls(), 2);
		assert_eq!(provider.journal().ops(), vec![Op::Commit, Op::Rollback]);
	}

	#[test]
	fn test_failing_provider() {
		let provider = MockProvider::asynchronous().fail("pool exhausted");
		let err = provider.provide().wait().unwrap_err();
		assert_eq!(err.to_string(), "pool exhausted");
		assert_eq!(provider.calls(), 1);
	}
}
