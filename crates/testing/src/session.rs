// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use parking_lot::Mutex;
use unitwork_transaction::{Completion, Session};

use crate::util::pending::yield_once;

/// How a [`MockSession`] completes its operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
	/// Every operation is finished when it returns.
	Blocking,
	/// Every operation returns a computation that is pending on first poll.
	Async,
}

/// A session operation, as recorded in a [`Journal`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
	Begin,
	Commit,
	Rollback,
	BeginNested(u64),
	RollbackSavepoint(u64),
	Close,
}

/// Ordered record of the operations issued against one or more sessions.
/// Operations are recorded when they are issued, whether they fail or not.
#[derive(Debug, Clone, Default)]
pub struct Journal {
	ops: Arc<Mutex<Vec<Op>>>,
}

impl Journal {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn record(&self, op: Op) {
		self.ops.lock().push(op);
	}

	pub fn ops(&self) -> Vec<Op> {
		self.ops.lock().clone()
	}

	pub fn count(&self, op: &Op) -> usize {
		self.ops.lock().iter().filter(|o| *o == op).count()
	}

	pub fn commits(&self) -> usize {
		self.count(&Op::Commit)
	}

	pub fn rollbacks(&self) -> usize {
		self.count(&Op::Rollback)
	}

	pub fn savepoint_rollbacks(&self) -> usize {
		self.ops.lock().iter().filter(|o| matches!(o, Op::RollbackSavepoint(_))).count()
	}

	pub fn is_empty(&self) -> bool {
		self.ops.lock().is_empty()
	}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct StoreError(pub String);

#[derive(Debug, PartialEq, Eq)]
pub struct MockSavepoint(pub u64);

#[derive(Debug, Clone, Default)]
struct Failures {
	begin: Option<String>,
	commit: Option<String>,
	rollback: Option<String>,
	begin_nested: Option<String>,
	rollback_savepoint: Option<String>,
	close: Option<String>,
}

/// In-memory session that records every operation and fails on demand.
///
/// Savepoints are numbered from 1 in the order they are opened.
#[derive(Debug)]
pub struct MockSession {
	label: &'static str,
	mode: Mode,
	journal: Journal,
	failures: Failures,
	next_savepoint: u64,
}

impl MockSession {
	pub fn new(label: &'static str, mode: Mode) -> Self {
		Self {
			label,
			mode,
			journal: Journal::new(),
			failures: Failures::default(),
			next_savepoint: 1,
		}
	}

	pub fn blocking(label: &'static str) -> Self {
		Self::new(label, Mode::Blocking)
	}

	pub fn asynchronous(label: &'static str) -> Self {
		Self::new(label, Mode::Async)
	}

	pub fn with_journal(mut self, journal: Journal) -> Self {
		self.journal = journal;
		self
	}

	pub fn label(&self) -> &'static str {
		self.label
	}

	pub fn journal(&self) -> &Journal {
		&self.journal
	}

	pub fn fail_begin(mut self, message: &str) -> Self {
		self.failures.begin = Some(message.to_string());
		self
	}

	pub fn fail_commit(mut self, message: &str) -> Self {
		self.failures.commit = Some(message.to_string());
		self
	}

	pub fn fail_rollback(mut self, message: &str) -> Self {
		self.failures.rollback = Some(message.to_string());
		self
	}

	pub fn fail_begin_nested(mut self, message: &str) -> Self {
		self.failures.begin_nested = Some(message.to_string());
		self
	}

	pub fn fail_rollback_savepoint(mut self, message: &str) -> Self {
		self.failures.rollback_savepoint = Some(message.to_string());
		self
	}

	pub fn fail_close(mut self, message: &str) -> Self {
		self.failures.close = Some(message.to_string());
		self
	}

	fn complete<T>(&self, op: Op, failure: Option<&String>, value: T) -> Completion<'static, T, StoreError>
	where
		T: Send + 'static,
	{
		self.journal.record(op);
		let result = match failure {
			Some(message) => Err(StoreError(message.clone())),
			None => Ok(value),
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

impl Session for MockSession {
	type Savepoint = MockSavepoint;
	type Error = StoreError;

	fn begin(&mut self) -> Completion<'_, (), StoreError> {
		self.complete(Op::Begin, self.failures.begin.as_ref(), ())
	}

	fn commit(&mut self) -> Completion<'_, (), StoreError> {
		self.complete(Op::Commit, self.failures.commit.as_ref(), ())
	}

	fn rollback(&mut self) -> Completion<'_, (), StoreError> {
		self.complete(Op::Rollback, self.failures.rollback.as_ref(), ())
	}

	fn begin_nested(&mut self) -> Completion<'_, MockSavepoint, StoreError> {
		let id = self.next_savepoint;
		if self.failures.begin_nested.is_none() {
			self.next_savepoint += 1;
		}
		self.complete(Op::BeginNested(id), self.failures.begin_nested.as_ref(), MockSavepoint(id))
	}

	fn rollback_savepoint<'a>(&'a mut self, savepoint: &'a MockSavepoint) -> Completion<'a, (), StoreError> {
		self.complete(Op::RollbackSavepoint(savepoint.0), self.failures.rollback_savepoint.as_ref(), ())
	}

	fn close(&mut self) -> Completion<'_, (), StoreError> {
		self.complete(Op::Close, self.failures.close.as_ref(), ())
	}
}

#[cfg(test)]
mod tests {
	use unitwork_transaction::Session;

	use super::{MockSavepoint, MockSession, Op, StoreError};

	#[test]
	fn test_blocking_operations_are_ready() {
		let mut session = MockSession::blocking("db");
		let completion = session.commit();
		assert!(!completion.is_pending());
		assert_eq!(completion.wait(), Ok(()));
		assert_eq!(session.journal().ops(), vec![Op::Commit]);
	}

	#[test]
	fn test_async_operations_are_pending() {
		let mut session = MockSession::asynchronous("db").fail_rollback("down");
		let completion = session.rollback();
		assert!(completion.is_pending());
		assert_eq!(completion.wait(), Err(StoreError("down".to_string())));
		assert_eq!(session.journal().rollbacks(), 1);
	}

	#[test]
	fn test_savepoints_are_numbered() {
		let mut session = MockSession::blocking("db");
		assert_eq!(session.begin_nested().wait(), Ok(MockSavepoint(1)));
		assert_eq!(session.begin_nested().wait(), Ok(MockSavepoint(2)));
		assert_eq!(session.journal().ops(), vec![Op::BeginNested(1), Op::BeginNested(2)]);
	}
}
