//! Reversible-delete ledger.
//!
//! One generic abstraction backs both undo stacks in the application: the
//! pending-list ledger (multi-item frames from "delete selected" / "delete
//! all") and the viewer's single-item ledger. Sharing the type guarantees
//! both stacks have identical LIFO and index-replay semantics.
//!
//! A [`Frame`] is the set of entries removed together in one user action,
//! captured in **descending** index order so the live list can be drained
//! without index drift, and replayed in **ascending** order so each entry
//! lands back at its original position.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LedgerError {
    /// Undo was requested with nothing to restore — a user-facing notice,
    /// never a crash.
    #[error("nothing to undo")]
    EmptyLedger,
}

/// One undoable deletion: `(original_index, entry)` tuples captured together.
pub type Frame<T> = Vec<(usize, T)>;

/// Strict-LIFO stack of deletion frames.
///
/// Frames are exclusively owned by the ledger; [`Ledger::pop`] is the only
/// way to consume one, and frames can only be applied in
/// reverse-chronological order.
#[derive(Debug)]
pub struct Ledger<T> {
    frames: Vec<Frame<T>>,
}

// Not derived: the derive would demand `T: Default`, and entry types have
// no reason to be defaultable just to sit in an empty ledger.
impl<T> Default for Ledger<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Ledger<T> {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Record one deletion frame. Empty frames are discarded — an action
    /// that removed nothing is not undoable.
    pub fn push(&mut self, frame: Frame<T>) {
        if !frame.is_empty() {
            self.frames.push(frame);
        }
    }

    /// Take the most recent frame, sorted ascending by original index and
    /// ready for replay.
    pub fn pop(&mut self) -> Result<Frame<T>, LedgerError> {
        let mut frame = self.frames.pop().ok_or(LedgerError::EmptyLedger)?;
        frame.sort_by_key(|(index, _)| *index);
        Ok(frame)
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_works_for_non_default_entry_types() {
        struct Plain(#[allow(dead_code)] u8);
        let ledger: Ledger<Plain> = Ledger::default();
        assert!(ledger.is_empty());
    }

    #[test]
    fn pop_is_lifo() {
        let mut ledger: Ledger<&str> = Ledger::new();
        ledger.push(vec![(0, "first")]);
        ledger.push(vec![(1, "second")]);

        assert_eq!(ledger.pop().unwrap(), vec![(1, "second")]);
        assert_eq!(ledger.pop().unwrap(), vec![(0, "first")]);
        assert_eq!(ledger.pop(), Err(LedgerError::EmptyLedger));
    }

    #[test]
    fn pop_sorts_ascending_for_replay() {
        let mut ledger: Ledger<char> = Ledger::new();
        // Captured descending, as the roster does.
        ledger.push(vec![(4, 'e'), (2, 'c'), (0, 'a')]);

        let frame = ledger.pop().unwrap();
        assert_eq!(frame, vec![(0, 'a'), (2, 'c'), (4, 'e')]);
    }

    #[test]
    fn empty_frames_are_not_recorded() {
        let mut ledger: Ledger<u32> = Ledger::new();
        ledger.push(Vec::new());
        assert!(ledger.is_empty());
        assert_eq!(ledger.pop(), Err(LedgerError::EmptyLedger));
    }

    #[test]
    fn n_frames_allow_exactly_n_undos() {
        let mut ledger: Ledger<u32> = Ledger::new();
        for i in 0..3 {
            ledger.push(vec![(i, i as u32)]);
        }
        assert_eq!(ledger.len(), 3);
        for _ in 0..3 {
            assert!(ledger.pop().is_ok());
        }
        assert_eq!(ledger.pop(), Err(LedgerError::EmptyLedger));
    }
}
