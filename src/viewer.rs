//! Viewer-local delete/restore list.
//!
//! The preview viewer keeps its own ordered subset of the pending paths and
//! its own undo ledger — one entry per frame, never shared with the roster's
//! ledger. Deleting here must not consume a roster frame and vice versa.
//!
//! Because the viewer is a separate representation of the same list, every
//! delete and restore fires a callback so the owner can mirror the change in
//! the roster-backed view.

use crate::ledger::{Ledger, LedgerError};
use std::path::{Path, PathBuf};

/// Fired after a viewer delete, with the removed path.
pub type DeleteCallback<'a> = dyn FnMut(&Path) + 'a;
/// Fired after a viewer restore, with the path and the index it returned to.
pub type RestoreCallback<'a> = dyn FnMut(&Path, usize) + 'a;

/// The viewer's navigable image strip with single-item undoable deletion.
pub struct ViewerStrip<'a> {
    paths: Vec<PathBuf>,
    cursor: usize,
    ledger: Ledger<PathBuf>,
    on_delete: Box<DeleteCallback<'a>>,
    on_restore: Box<RestoreCallback<'a>>,
}

impl<'a> ViewerStrip<'a> {
    pub fn new(
        paths: Vec<PathBuf>,
        start_index: usize,
        on_delete: Box<DeleteCallback<'a>>,
        on_restore: Box<RestoreCallback<'a>>,
    ) -> Self {
        let cursor = if paths.is_empty() {
            0
        } else {
            start_index.min(paths.len() - 1)
        };
        Self {
            paths,
            cursor,
            ledger: Ledger::new(),
            on_delete,
            on_restore,
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Index of the image currently shown.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<&Path> {
        self.paths.get(self.cursor).map(PathBuf::as_path)
    }

    pub fn first(&mut self) {
        self.cursor = 0;
    }

    pub fn last(&mut self) {
        self.cursor = self.paths.len().saturating_sub(1);
    }

    pub fn next(&mut self) {
        if self.cursor + 1 < self.paths.len() {
            self.cursor += 1;
        }
    }

    pub fn previous(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Remove the current image as one single-tuple frame and notify the
    /// owner. The last remaining image cannot be deleted. Returns the
    /// removed path.
    pub fn delete_current(&mut self) -> Option<PathBuf> {
        if self.paths.len() <= 1 {
            return None;
        }
        let index = self.cursor;
        let path = self.paths.remove(index);
        self.ledger.push(vec![(index, path.clone())]);
        (self.on_delete)(&path);

        if self.cursor >= self.paths.len() {
            self.cursor = self.paths.len() - 1;
        }
        Some(path)
    }

    /// Restore the most recently deleted image to its original index and
    /// notify the owner.
    pub fn undo_delete(&mut self) -> Result<PathBuf, LedgerError> {
        let frame = self.ledger.pop()?;
        // Viewer frames hold exactly one tuple; replay covers it regardless.
        let mut restored = None;
        for (index, path) in frame {
            let index = index.min(self.paths.len());
            self.paths.insert(index, path.clone());
            self.cursor = index;
            (self.on_restore)(&path, index);
            restored = Some(path);
        }
        restored.ok_or(LedgerError::EmptyLedger)
    }
}
