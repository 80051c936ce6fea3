//! The pending-file roster: the ordered list of sources waiting for a batch
//! run, with reversible deletion.
//!
//! The roster is an interactive-context structure — single-threaded, mutated
//! only between runs. Every structural change renumbers the display sequence
//! so ranks are always a contiguous `1..=N` matching current order.
//!
//! Deletions are soft: removed entries move into a [`Ledger`] frame and come
//! back intact (same path, same original index) on undo.

use crate::format::FormatFamily;
use crate::ledger::{Frame, Ledger, LedgerError};
use std::path::{Path, PathBuf};

/// One entry in the pending list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingItem {
    /// 1-based display rank, recomputed after every structural change.
    pub seq: usize,
    /// Canonical family display name ("JPEG", "WebP", ...).
    pub format: String,
    pub path: PathBuf,
}

/// Counts reported back to the operator after an add.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AddReport {
    pub added: usize,
    pub duplicates: usize,
    pub unrecognized: usize,
}

/// Ordered pending list plus its undo ledger.
#[derive(Debug, Default)]
pub struct Roster {
    items: Vec<PendingItem>,
    ledger: Ledger<PendingItem>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[PendingItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The paths in current order, as handed to the batch driver.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.items.iter().map(|item| item.path.clone()).collect()
    }

    /// Append new sources, skipping paths already present and paths without
    /// a recognized image extension.
    pub fn add_paths<I, P>(&mut self, paths: I) -> AddReport
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut report = AddReport::default();
        for path in paths {
            let path = path.as_ref();
            let Some(family) = FormatFamily::from_path(path) else {
                report.unrecognized += 1;
                continue;
            };
            if self.items.iter().any(|item| item.path == path) {
                report.duplicates += 1;
                continue;
            }
            self.items.push(PendingItem {
                seq: 0, // fixed up below
                format: family.display_name().to_string(),
                path: path.to_path_buf(),
            });
            report.added += 1;
        }
        self.renumber();
        report
    }

    /// Remove the entries at `indices` (0-based) as one undoable frame.
    ///
    /// Capture runs in descending index order so removal never shifts an
    /// index that is still to be removed. Out-of-range indices are ignored.
    /// Returns the number of entries removed.
    pub fn delete(&mut self, indices: &[usize]) -> usize {
        let mut sorted: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.items.len())
            .collect();
        sorted.sort_unstable();
        sorted.dedup();

        let mut frame: Frame<PendingItem> = Vec::with_capacity(sorted.len());
        for &index in sorted.iter().rev() {
            frame.push((index, self.items.remove(index)));
        }
        let removed = frame.len();
        self.ledger.push(frame);
        self.renumber();
        removed
    }

    /// Remove every entry as one undoable frame.
    pub fn delete_all(&mut self) -> usize {
        let all: Vec<usize> = (0..self.items.len()).collect();
        self.delete(&all)
    }

    /// Restore the most recent deletion frame: every captured entry goes
    /// back to its original index, then ranks are renumbered.
    pub fn undo(&mut self) -> Result<usize, LedgerError> {
        let frame = self.ledger.pop()?;
        let restored = frame.len();
        for (index, item) in frame {
            let index = index.min(self.items.len());
            self.items.insert(index, item);
        }
        self.renumber();
        Ok(restored)
    }

    pub fn undo_depth(&self) -> usize {
        self.ledger.len()
    }

    fn renumber(&mut self) {
        for (i, item) in self.items.iter_mut().enumerate() {
            item.seq = i + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster_with(names: &[&str]) -> Roster {
        let mut roster = Roster::new();
        roster.add_paths(names.iter().map(|n| format!("/pics/{n}")));
        assert_eq!(roster.len(), names.len());
        roster
    }

    fn paths_of(roster: &Roster) -> Vec<String> {
        roster
            .items()
            .iter()
            .map(|i| i.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn default_roster_is_empty_with_nothing_to_undo() {
        let mut roster = Roster::default();
        assert!(roster.is_empty());
        assert_eq!(roster.undo(), Err(LedgerError::EmptyLedger));
    }

    #[test]
    fn add_assigns_contiguous_ranks_and_family_names() {
        let roster = roster_with(&["a.jpg", "b.jpeg", "c.webp"]);
        let seqs: Vec<usize> = roster.items().iter().map(|i| i.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
        assert_eq!(roster.items()[0].format, "JPEG");
        assert_eq!(roster.items()[1].format, "JPEG");
        assert_eq!(roster.items()[2].format, "WebP");
    }

    #[test]
    fn add_skips_duplicates_and_unrecognized() {
        let mut roster = roster_with(&["a.jpg"]);
        let report = roster.add_paths(["/pics/a.jpg", "/pics/b.png", "/pics/notes.txt"]);
        assert_eq!(report.added, 1);
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.unrecognized, 1);
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn delete_then_undo_restores_content_and_order() {
        let mut roster = roster_with(&["a.jpg", "b.png", "c.webp", "d.bmp"]);
        let before = paths_of(&roster);

        assert_eq!(roster.delete(&[1, 3]), 2);
        assert_eq!(paths_of(&roster), vec!["a.jpg", "c.webp"]);

        roster.undo().unwrap();
        assert_eq!(paths_of(&roster), before);
        let seqs: Vec<usize> = roster.items().iter().map(|i| i.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3, 4]);
    }

    #[test]
    fn delete_handles_unsorted_selection() {
        let mut roster = roster_with(&["a.jpg", "b.png", "c.webp", "d.bmp", "e.gif"]);
        assert_eq!(roster.delete(&[4, 0, 2]), 3);
        assert_eq!(paths_of(&roster), vec!["b.png", "d.bmp"]);
        roster.undo().unwrap();
        assert_eq!(
            paths_of(&roster),
            vec!["a.jpg", "b.png", "c.webp", "d.bmp", "e.gif"]
        );
    }

    #[test]
    fn delete_all_is_one_frame() {
        let mut roster = roster_with(&["a.jpg", "b.png", "c.webp"]);
        assert_eq!(roster.delete_all(), 3);
        assert!(roster.is_empty());
        assert_eq!(roster.undo_depth(), 1);

        roster.undo().unwrap();
        assert_eq!(roster.len(), 3);
    }

    #[test]
    fn n_plus_one_undos_reports_empty_ledger() {
        let mut roster = roster_with(&["a.jpg", "b.png", "c.webp"]);
        roster.delete(&[0]);
        roster.delete(&[0]);
        assert_eq!(roster.undo_depth(), 2);

        assert!(roster.undo().is_ok());
        assert!(roster.undo().is_ok());
        assert_eq!(roster.undo(), Err(LedgerError::EmptyLedger));
        assert_eq!(roster.len(), 3);
    }

    #[test]
    fn undo_order_is_reverse_chronological() {
        let mut roster = roster_with(&["a.jpg", "b.png", "c.webp"]);
        roster.delete(&[0]); // removes a
        roster.delete(&[0]); // removes b

        roster.undo().unwrap(); // must restore b first
        assert_eq!(paths_of(&roster), vec!["b.png", "c.webp"]);
        roster.undo().unwrap();
        assert_eq!(paths_of(&roster), vec!["a.jpg", "b.png", "c.webp"]);
    }

    #[test]
    fn out_of_range_indices_are_ignored() {
        let mut roster = roster_with(&["a.jpg"]);
        assert_eq!(roster.delete(&[5, 0]), 1);
        assert!(roster.is_empty());
    }
}
