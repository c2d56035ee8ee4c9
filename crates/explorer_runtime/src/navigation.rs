//! Breadcrumb stack from a selected root to the current directory.

use remote_fs_host::{DirectoryEntry, EntryId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// One visited directory in the breadcrumb.
pub struct NavigationFrame {
    /// Directory identifier.
    pub id: EntryId,
    /// Directory display name.
    pub name: String,
}

impl NavigationFrame {
    /// Creates a frame.
    pub fn new(id: impl Into<EntryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl From<&DirectoryEntry> for NavigationFrame {
    fn from(entry: &DirectoryEntry) -> Self {
        Self {
            id: entry.id.clone(),
            name: entry.name.clone(),
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("already at the root directory")]
/// Signals that [`NavigationState::ascend`] had no parent to move to.
pub struct AtRoot;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Ordered root-to-current path of directories. The current directory is the last frame.
///
/// Precondition violations (descending without a root, truncating out of range) are programming
/// errors and panic.
pub struct NavigationState {
    frames: Vec<NavigationFrame>,
}

impl NavigationState {
    /// Creates an empty stack (no directory displayed yet).
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole stack with a single root frame.
    pub fn reset_to(&mut self, frame: NavigationFrame) {
        self.frames.clear();
        self.frames.push(frame);
    }

    /// Pushes a child of the current directory.
    ///
    /// # Panics
    ///
    /// Panics when no root has been selected.
    pub fn descend_into(&mut self, frame: NavigationFrame) {
        assert!(
            !self.frames.is_empty(),
            "descend_into requires a selected root"
        );
        self.frames.push(frame);
    }

    /// Drops every frame after `index`.
    ///
    /// # Panics
    ///
    /// Panics unless `index < len()`.
    pub fn truncate_to(&mut self, index: usize) {
        assert!(
            index < self.frames.len(),
            "breadcrumb index {index} out of range for {} frames",
            self.frames.len()
        );
        self.frames.truncate(index + 1);
    }

    /// Moves to the parent directory. Leaves the stack untouched at the root.
    ///
    /// # Errors
    ///
    /// Returns [`AtRoot`] when the stack holds at most one frame.
    pub fn ascend(&mut self) -> Result<(), AtRoot> {
        if self.frames.len() <= 1 {
            return Err(AtRoot);
        }
        self.truncate_to(self.frames.len() - 2);
        Ok(())
    }

    /// Returns the current directory frame.
    pub fn current(&self) -> Option<&NavigationFrame> {
        self.frames.last()
    }

    /// Returns all frames in root-to-current order.
    pub fn frames(&self) -> &[NavigationFrame] {
        &self.frames
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns `true` before any root has been selected.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Display names in breadcrumb order.
    pub fn breadcrumb_names(&self) -> Vec<&str> {
        self.frames.iter().map(|frame| frame.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn stack(names: &[&str]) -> NavigationState {
        let mut nav = NavigationState::new();
        let mut frames = names.iter().map(|name| NavigationFrame::new(*name, *name));
        if let Some(root) = frames.next() {
            nav.reset_to(root);
        }
        for frame in frames {
            nav.descend_into(frame);
        }
        nav
    }

    #[test]
    fn reset_replaces_the_whole_stack() {
        let mut nav = stack(&["home", "docs", "2024"]);
        nav.reset_to(NavigationFrame::new("shared", "Shared"));
        assert_eq!(nav.len(), 1);
        assert_eq!(nav.current(), Some(&NavigationFrame::new("shared", "Shared")));
    }

    #[test]
    fn truncate_keeps_frames_up_to_index() {
        let mut nav = stack(&["home", "docs", "2024", "q1"]);
        nav.truncate_to(1);
        assert_eq!(nav.breadcrumb_names(), vec!["home", "docs"]);

        nav.truncate_to(1);
        assert_eq!(nav.len(), 2);
    }

    #[test]
    fn ascend_pops_until_root_then_reports_at_root() {
        let mut nav = stack(&["home", "docs"]);
        assert_eq!(nav.ascend(), Ok(()));
        assert_eq!(nav.breadcrumb_names(), vec!["home"]);

        let before = nav.clone();
        assert_eq!(nav.ascend(), Err(AtRoot));
        assert_eq!(nav, before);

        let mut empty = NavigationState::new();
        assert_eq!(empty.ascend(), Err(AtRoot));
        assert!(empty.current().is_none());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn truncate_out_of_range_is_a_programming_error() {
        let mut nav = stack(&["home"]);
        nav.truncate_to(1);
    }

    #[test]
    #[should_panic(expected = "requires a selected root")]
    fn descend_without_root_is_a_programming_error() {
        let mut nav = NavigationState::new();
        nav.descend_into(NavigationFrame::new("x", "x"));
    }

    #[test]
    fn frames_from_entries_copy_id_and_name() {
        let entry = DirectoryEntry::directory(5u64, "Music");
        assert_eq!(NavigationFrame::from(&entry), NavigationFrame::new(5u64, "Music"));
    }
}
