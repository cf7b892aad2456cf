//! Semantic and ghost slots.
//!
//! A slot is a named fractional region of the screen. Committed slots bind
//! window placement; ghost slots are proposals that only show up as an
//! overlay until they are confirmed.
//!
//! Both stores keep insertion order. Overwriting a name keeps its original
//! position, so listing and promotion order are stable across updates.

use serde::{Deserialize, Serialize};

use super::types::{Rect, ScreenRect};

/// A named region in fractional screen coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    /// Free-text identifier of the agent that proposed the slot.
    pub owner: String,
    /// Whether the slot affects real window placement.
    pub committed: bool,
    /// Whether this ghost overlaps another ghost. Always false once committed.
    #[serde(default)]
    pub conflict: bool,
}

impl Slot {
    /// Create a slot from a fractional rectangle.
    #[must_use]
    pub fn new(name: impl Into<String>, rect: Rect, owner: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            x: rect.x,
            y: rect.y,
            w: rect.width,
            h: rect.height,
            owner: owner.into(),
            committed: false,
            conflict: false,
        }
    }

    /// The slot's fractional rectangle.
    #[must_use]
    pub const fn rect(&self) -> Rect { Rect::new(self.x, self.y, self.w, self.h) }

    /// The slot's rectangle in absolute device units.
    #[must_use]
    pub fn to_screen(&self, screen: &ScreenRect) -> ScreenRect { self.rect().to_screen(screen) }
}

/// Insertion-ordered slot store keyed by name.
#[derive(Clone, Debug, Default)]
struct SlotMap {
    slots: Vec<Slot>,
}

impl SlotMap {
    fn position(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|slot| slot.name == name)
    }

    fn get(&self, name: &str) -> Option<&Slot> { self.slots.iter().find(|slot| slot.name == name) }

    fn upsert(&mut self, slot: Slot) {
        match self.position(&slot.name) {
            Some(idx) => self.slots[idx] = slot,
            None => self.slots.push(slot),
        }
    }

    fn remove(&mut self, name: &str) -> Option<Slot> {
        self.position(name).map(|idx| self.slots.remove(idx))
    }
}

/// Committed and ghost slot state for one layout instance.
#[derive(Clone, Debug, Default)]
pub struct RegionModel {
    committed: SlotMap,
    ghost: SlotMap,
}

impl RegionModel {
    /// Create an empty region model.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Insert or overwrite a committed slot.
    pub fn create(&mut self, name: &str, rect: Rect, owner: &str) -> Slot {
        let mut slot = Slot::new(name, rect, owner);
        slot.committed = true;
        self.committed.upsert(slot.clone());
        slot
    }

    /// Remove a committed slot. Returns whether anything was removed.
    pub fn remove(&mut self, name: &str) -> bool { self.committed.remove(name).is_some() }

    /// Insert or overwrite a ghost slot and recompute conflicts.
    ///
    /// The returned slot carries its conflict flag as of after the proposal.
    pub fn propose(&mut self, name: &str, rect: Rect, owner: &str) -> Slot {
        self.ghost.upsert(Slot::new(name, rect, owner));
        self.recompute_conflicts();
        self.ghost.get(name).cloned().unwrap_or_else(|| Slot::new(name, rect, owner))
    }

    /// Promote every ghost slot into the committed store.
    ///
    /// Conflicting ghosts are promoted as-is; conflicts are advisory. Same-named
    /// committed entries are overwritten. Returns the number promoted.
    pub fn confirm_all(&mut self) -> usize {
        let promoted = std::mem::take(&mut self.ghost.slots);
        let count = promoted.len();
        for mut slot in promoted {
            slot.committed = true;
            slot.conflict = false;
            self.committed.upsert(slot);
        }
        count
    }

    /// Drop every ghost slot.
    pub fn clear_ghosts(&mut self) { self.ghost.slots.clear(); }

    /// Committed slot by name.
    #[must_use]
    pub fn committed_slot(&self, name: &str) -> Option<&Slot> { self.committed.get(name) }

    /// Committed slots in insertion order.
    #[must_use]
    pub fn committed(&self) -> &[Slot] { &self.committed.slots }

    /// Ghost slots in insertion order.
    #[must_use]
    pub fn ghosts(&self) -> &[Slot] { &self.ghost.slots }

    /// Clears and fully recomputes conflict flags over the ghost store.
    fn recompute_conflicts(&mut self) {
        let slots = &mut self.ghost.slots;
        for slot in slots.iter_mut() {
            slot.conflict = false;
        }

        for i in 0..slots.len() {
            for j in (i + 1)..slots.len() {
                if slots[i].rect().intersects(&slots[j].rect()) {
                    slots[i].conflict = true;
                    slots[j].conflict = true;
                }
            }
        }
    }

    /// Screen area left for tiling once committed slots are carved out.
    ///
    /// Each committed slot is classified as left- or right-anchored by its
    /// horizontal center. The screen is shrunk by the widest reservation on
    /// each side, and the result is never narrower than `min_width`.
    ///
    /// This ignores vertical stacking and full-width slots: a slot spanning
    /// the whole width reserves the whole screen on its side and the floor
    /// takes over.
    #[must_use]
    pub fn remaining_rect(&self, screen: &ScreenRect, min_width: i32) -> ScreenRect {
        let mut left_reserved = 0;
        let mut right_reserved = 0;

        for slot in self.committed() {
            let rect = slot.to_screen(screen);
            if rect.is_left_of_center(screen) {
                left_reserved = left_reserved.max(rect.right() - screen.x);
            } else {
                right_reserved = right_reserved.max(screen.right() - rect.x);
            }
        }

        ScreenRect::new(
            screen.x + left_reserved,
            screen.y,
            (screen.width - left_reserved - right_reserved).max(min_width),
            screen.height,
        )
    }
}
