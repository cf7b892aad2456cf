//! Ordered window list with a focus cursor, shared by every layout.

use serde::Deserialize;
use smallvec::SmallVec;

use crate::modules::WindowId;

/// Window ID list. Inline storage for up to 8 windows, which covers the
/// common case without heap allocation.
pub type WindowIdList = SmallVec<[WindowId; 8]>;

/// Where to move the focus cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusDirection {
    Next,
    Previous,
    First,
    Last,
}

/// Windows managed by a layout, in arrival order, plus the focused index.
#[derive(Clone, Debug, Default)]
pub struct ClientList {
    ids: WindowIdList,
    current: Option<usize>,
}

impl ClientList {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Window IDs in order.
    #[must_use]
    pub fn ids(&self) -> &[WindowId] { &self.ids }

    #[must_use]
    pub fn len(&self) -> usize { self.ids.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.ids.is_empty() }

    #[must_use]
    pub fn contains(&self, id: WindowId) -> bool { self.ids.contains(&id) }

    /// Position of a window in the list.
    #[must_use]
    pub fn index_of(&self, id: WindowId) -> Option<usize> { self.ids.iter().position(|&w| w == id) }

    /// Currently focused window.
    #[must_use]
    pub fn current(&self) -> Option<WindowId> {
        self.current.and_then(|idx| self.ids.get(idx).copied())
    }

    /// Append a window and focus it. Adding a known window only focuses it.
    pub fn add(&mut self, id: WindowId) {
        if let Some(idx) = self.index_of(id) {
            self.current = Some(idx);
            return;
        }
        self.ids.push(id);
        self.current = Some(self.ids.len() - 1);
    }

    /// Remove a window. Focus moves to the window that took its place, or
    /// the new last window when the tail was removed.
    pub fn remove(&mut self, id: WindowId) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        self.ids.remove(idx);

        self.current = match self.current {
            _ if self.ids.is_empty() => None,
            Some(cur) if cur > idx => Some(cur - 1),
            Some(cur) => Some(cur.min(self.ids.len() - 1)),
            None => None,
        };
        true
    }

    /// Focus a window if it is in the list.
    pub fn focus(&mut self, id: WindowId) -> bool {
        match self.index_of(id) {
            Some(idx) => {
                self.current = Some(idx);
                true
            }
            None => false,
        }
    }

    pub fn focus_first(&mut self) -> Option<WindowId> {
        self.current = (!self.ids.is_empty()).then_some(0);
        self.current()
    }

    pub fn focus_last(&mut self) -> Option<WindowId> {
        self.current = self.ids.len().checked_sub(1);
        self.current()
    }

    /// Window after `id`, wrapping to the first.
    #[must_use]
    pub fn next(&self, id: WindowId) -> Option<WindowId> {
        let idx = self.index_of(id)?;
        self.ids.get((idx + 1) % self.ids.len()).copied()
    }

    /// Window before `id`, wrapping to the last.
    #[must_use]
    pub fn previous(&self, id: WindowId) -> Option<WindowId> {
        let idx = self.index_of(id)?;
        let len = self.ids.len();
        self.ids.get((idx + len - 1) % len).copied()
    }

    /// Move focus forward with wrap-around.
    pub fn focus_next(&mut self) -> Option<WindowId> {
        let next = self.next(self.current()?)?;
        self.focus(next);
        Some(next)
    }

    /// Move focus backward with wrap-around.
    pub fn focus_previous(&mut self) -> Option<WindowId> {
        let previous = self.previous(self.current()?)?;
        self.focus(previous);
        Some(previous)
    }

    /// Moves the cursor and returns the newly focused window.
    ///
    /// Without a current window, next starts at the first window and
    /// previous at the last.
    pub fn cycle(&mut self, direction: FocusDirection) -> Option<WindowId> {
        match direction {
            FocusDirection::Next => self.focus_next().or_else(|| self.focus_first()),
            FocusDirection::Previous => self.focus_previous().or_else(|| self.focus_last()),
            FocusDirection::First => self.focus_first(),
            FocusDirection::Last => self.focus_last(),
        }
    }
}
