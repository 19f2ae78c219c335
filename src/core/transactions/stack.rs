use super::transaction::Transaction;
use log::debug;
use std::collections::VecDeque;

/// Linear undo/redo history.
///
/// Entries before `caret` are applied; entries from `caret` up to `max` can
/// be redone. Pushing discards everything from the caret on.
#[derive(Debug, Clone, Default)]
pub struct TransactionStack {
    entries: VecDeque<Transaction>,
    caret: usize,
    limit: Option<usize>,
}

impl TransactionStack {
    /// Unbounded history
    pub fn new() -> Self {
        Self::default()
    }

    /// History keeping at most `limit` entries; the oldest go first
    pub fn with_limit(limit: usize) -> Self {
        Self { limit: Some(limit), ..Self::default() }
    }

    /// Record an applied transaction, dropping the redo branch
    pub fn push(&mut self, transaction: Transaction) {
        if self.caret < self.entries.len() {
            debug!("Discarding {} redo entries", self.entries.len() - self.caret);
            self.entries.truncate(self.caret);
        }
        self.entries.push_back(transaction);
        self.caret += 1;

        if let Some(limit) = self.limit {
            while self.entries.len() > limit {
                self.entries.pop_front();
                self.caret -= 1;
            }
        }
    }

    /// Transaction the next undo would revert, without moving the caret
    pub fn peek_undo(&self) -> Option<&Transaction> {
        self.caret.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    /// Transaction the next redo would re-apply, without moving the caret
    pub fn peek_redo(&self) -> Option<&Transaction> {
        self.entries.get(self.caret)
    }

    /// Step back; the returned transaction must be reverted by the caller
    pub fn try_undo(&mut self) -> Option<&Transaction> {
        if self.caret == 0 {
            return None;
        }
        self.caret -= 1;
        self.entries.get(self.caret)
    }

    /// Step forward; the returned transaction must be re-applied by the caller
    pub fn try_redo(&mut self) -> Option<&Transaction> {
        if self.caret == self.entries.len() {
            return None;
        }
        self.caret += 1;
        self.entries.get(self.caret - 1)
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    /// Furthest redo position
    pub fn max(&self) -> usize {
        self.entries.len()
    }

    pub fn can_undo(&self) -> bool {
        self.caret > 0
    }

    pub fn can_redo(&self) -> bool {
        self.caret < self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.caret = 0;
    }
}
