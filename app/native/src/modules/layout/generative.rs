//! Generative layout - agents carve out named regions on the fly.
//!
//! Windows whose agent metadata names a committed slot are placed in that
//! slot. Every other window is tiled as a vertical stack in the screen area
//! the committed slots leave free. Ghost slots never move windows; they only
//! produce overlays.

use serde_json::{Value, json};

use super::helpers::stack_vertical;
use super::{
    ClientList, ClientView, Layout, LayoutStyle, Overlay, Placement, RegionModel,
    SemanticRegions,
};
use crate::modules::layout::types::ScreenRect;

/// Slot-aware layout with a vertical-stack fallback.
#[derive(Debug, Default)]
pub struct GenerativeLayout {
    style: LayoutStyle,
    clients: ClientList,
    regions: RegionModel,
}

impl GenerativeLayout {
    pub const NAME: &'static str = "generative";

    #[must_use]
    pub fn new(style: LayoutStyle) -> Self {
        Self {
            style,
            clients: ClientList::new(),
            regions: RegionModel::new(),
        }
    }

    /// Whether the window is bound to a committed slot.
    fn is_slotted(&self, view: &ClientView<'_>) -> bool {
        view.slot.is_some_and(|name| self.regions.committed_slot(name).is_some())
    }

    fn place(&self, view: &ClientView<'_>, frame: &ScreenRect) -> Placement {
        Placement::framed(view, frame, &self.style)
    }

    /// Absolute rectangles and colors for every ghost slot.
    #[must_use]
    pub fn ghost_overlays(&self, screen: &ScreenRect) -> Vec<Overlay> {
        self.regions
            .ghosts()
            .iter()
            .map(|slot| Overlay {
                name: slot.name.clone(),
                rect: slot.to_screen(screen),
                color: if slot.conflict {
                    self.style.conflict_color.clone()
                } else {
                    self.style.ghost_color.clone()
                },
                conflict: slot.conflict,
            })
            .collect()
    }
}

impl Layout for GenerativeLayout {
    fn name(&self) -> &'static str { Self::NAME }

    fn clients(&self) -> &ClientList { &self.clients }

    fn clients_mut(&mut self) -> &mut ClientList { &mut self.clients }

    fn arrange(&self, views: &[ClientView<'_>], screen: &ScreenRect) -> Vec<Placement> {
        let tiled: Vec<&ClientView<'_>> = views.iter().filter(|v| !self.is_slotted(v)).collect();
        let remaining = self.regions.remaining_rect(screen, self.style.min_tile_width);
        let tiles = if remaining.is_valid() {
            stack_vertical(&remaining, tiled.len())
        } else {
            Vec::new()
        };

        let mut placements = Vec::with_capacity(views.len());
        let mut next_tile = tiles.into_iter();
        for view in views {
            let slot = view.slot.and_then(|name| self.regions.committed_slot(name));
            let placement = match slot {
                Some(slot) => self.place(view, &slot.to_screen(screen)),
                None => match next_tile.next() {
                    Some(tile) => self.place(view, &tile),
                    None => Placement::Hide(view.id),
                },
            };
            placements.push(placement);
        }
        placements
    }

    fn regions(&self) -> Option<&dyn SemanticRegions> { Some(&self.regions) }

    fn regions_mut(&mut self) -> Option<&mut dyn SemanticRegions> { Some(&mut self.regions) }

    fn overlays(&self, screen: &ScreenRect) -> Vec<Overlay> { self.ghost_overlays(screen) }

    fn info(&self) -> Value {
        json!({
            "name": Self::NAME,
            "clients": self.clients.ids(),
            "current": self.clients.current(),
            "slots": self.regions.committed(),
            "ghost_slots": self.regions.ghosts(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
