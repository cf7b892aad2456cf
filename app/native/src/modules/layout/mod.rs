//! Layout engine.
//!
//! A layout owns the ordered client list of one group and turns it into
//! placements. Layouts that let agents reserve screen regions also expose
//! the [`SemanticRegions`] capability; the bridge checks for it explicitly
//! instead of probing layouts at call time.

pub mod clients;
pub mod generative;
pub mod helpers;
pub mod monocle;
pub mod regions;
pub mod types;

use std::fmt::Debug;

use serde::Serialize;
use serde_json::{Value, json};

pub use clients::{ClientList, FocusDirection, WindowIdList};
pub use generative::GenerativeLayout;
pub use monocle::MonocleLayout;
pub use regions::{RegionModel, Slot};
pub use types::{Rect, ScreenRect};

use super::WindowId;

// ============================================================================
// Style
// ============================================================================

/// Visual parameters shared by every layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutStyle {
    pub border_focus: String,
    pub border_normal: String,
    pub border_width: i32,
    pub margin: i32,
    pub ghost_color: String,
    pub conflict_color: String,
    /// Floor for the width of the tiling area.
    pub min_tile_width: i32,
}

impl Default for LayoutStyle {
    fn default() -> Self {
        Self {
            border_focus: "#00ff00".to_string(),
            border_normal: "#222222".to_string(),
            border_width: 2,
            margin: 4,
            ghost_color: "#4488ff".to_string(),
            conflict_color: "#ff0000".to_string(),
            min_tile_width: 100,
        }
    }
}

impl LayoutStyle {
    /// Border color for a window with the given focus state.
    #[must_use]
    pub fn border_color(&self, has_focus: bool) -> &str {
        if has_focus { &self.border_focus } else { &self.border_normal }
    }
}

// ============================================================================
// Arrange input/output
// ============================================================================

/// What a layout needs to know about a window to place it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClientView<'a> {
    pub id: WindowId,
    /// Slot named in the window's agent metadata, if any.
    pub slot: Option<&'a str>,
    pub has_focus: bool,
}

/// A window's on-screen geometry and decoration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WindowPlacement {
    pub window_id: WindowId,
    /// Client area, excluding the border.
    pub rect: ScreenRect,
    pub border_width: i32,
    pub border_color: String,
    pub margin: i32,
}

/// Result of arranging one window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Placement {
    Show(WindowPlacement),
    Hide(WindowId),
}

impl Placement {
    /// Places `view` inside `frame` with the style's border.
    ///
    /// Hides the window when the frame is too small to leave a client area
    /// once the border is taken out.
    #[must_use]
    pub fn framed(view: &ClientView<'_>, frame: &ScreenRect, style: &LayoutStyle) -> Self {
        let rect = frame.without_border(style.border_width);
        if !rect.is_valid() {
            return Self::Hide(view.id);
        }
        Self::Show(WindowPlacement {
            window_id: view.id,
            rect,
            border_width: style.border_width,
            border_color: style.border_color(view.has_focus).to_string(),
            margin: style.margin,
        })
    }

    #[must_use]
    pub const fn window_id(&self) -> WindowId {
        match self {
            Self::Show(placement) => placement.window_id,
            Self::Hide(id) => *id,
        }
    }
}

/// A ghost-slot rectangle the host should draw.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Overlay {
    pub name: String,
    pub rect: ScreenRect,
    pub color: String,
    pub conflict: bool,
}

// ============================================================================
// Capabilities
// ============================================================================

/// Capability of layouts that let agents reserve and propose regions.
pub trait SemanticRegions {
    /// Insert or overwrite a committed slot.
    fn create_slot(&mut self, name: &str, rect: Rect, owner: &str) -> Slot;

    /// Remove a committed slot, returning whether it existed.
    fn remove_slot(&mut self, name: &str) -> bool;

    /// Committed slots in insertion order.
    fn list_slots(&self) -> Vec<Slot>;

    /// Insert or overwrite a ghost slot.
    fn propose_slot(&mut self, name: &str, rect: Rect, owner: &str) -> Slot;

    /// Ghost slots in insertion order.
    fn ghost_slots(&self) -> Vec<Slot>;

    /// Promote every ghost slot, returning how many were promoted.
    fn confirm_slots(&mut self) -> usize;

    fn clear_ghost_slots(&mut self);
}

impl SemanticRegions for RegionModel {
    fn create_slot(&mut self, name: &str, rect: Rect, owner: &str) -> Slot {
        self.create(name, rect, owner)
    }

    fn remove_slot(&mut self, name: &str) -> bool { self.remove(name) }

    fn list_slots(&self) -> Vec<Slot> { self.committed().to_vec() }

    fn propose_slot(&mut self, name: &str, rect: Rect, owner: &str) -> Slot {
        self.propose(name, rect, owner)
    }

    fn ghost_slots(&self) -> Vec<Slot> { self.ghosts().to_vec() }

    fn confirm_slots(&mut self) -> usize { self.confirm_all() }

    fn clear_ghost_slots(&mut self) { self.clear_ghosts(); }
}

/// A placement strategy for one group's windows.
pub trait Layout: Debug + Send {
    /// Layout name as reported to agents.
    fn name(&self) -> &'static str;

    fn clients(&self) -> &ClientList;

    fn clients_mut(&mut self) -> &mut ClientList;

    /// Compute placements for `views`, which are given in client order.
    fn arrange(&self, views: &[ClientView<'_>], screen: &ScreenRect) -> Vec<Placement>;

    /// Semantic-region capability, if this layout has it.
    fn regions(&self) -> Option<&dyn SemanticRegions> { None }

    fn regions_mut(&mut self) -> Option<&mut dyn SemanticRegions> { None }

    /// Overlay rectangles to draw on top of the windows.
    fn overlays(&self, _screen: &ScreenRect) -> Vec<Overlay> { Vec::new() }

    /// Introspection data for agents.
    fn info(&self) -> Value {
        json!({
            "name": self.name(),
            "clients": self.clients().ids(),
            "current": self.clients().current(),
        })
    }
}

/// Names of the layouts [`from_name`] can build.
pub const LAYOUT_NAMES: &[&str] = &[GenerativeLayout::NAME, MonocleLayout::NAME];

/// Builds a layout by name (case-insensitive).
#[must_use]
pub fn from_name(name: &str, style: &LayoutStyle) -> Option<Box<dyn Layout>> {
    match name.to_lowercase().as_str() {
        GenerativeLayout::NAME => Some(Box::new(GenerativeLayout::new(style.clone()))),
        MonocleLayout::NAME => Some(Box::new(MonocleLayout::new(style.clone()))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        let style = LayoutStyle::default();
        assert_eq!(from_name("generative", &style).map(|l| l.name()), Some("generative"));
        assert_eq!(from_name("Monocle", &style).map(|l| l.name()), Some("monocle"));
        assert!(from_name("bsp", &style).is_none());
    }

    #[test]
    fn test_capability_presence() {
        let style = LayoutStyle::default();
        let mut generative = from_name("generative", &style).unwrap();
        let mut monocle = from_name("monocle", &style).unwrap();

        assert!(generative.regions().is_some());
        assert!(generative.regions_mut().is_some());
        assert!(monocle.regions().is_none());
        assert!(monocle.regions_mut().is_none());
    }

    #[test]
    fn test_border_color() {
        let style = LayoutStyle::default();
        assert_eq!(style.border_color(true), "#00ff00");
        assert_eq!(style.border_color(false), "#222222");
    }

    #[test]
    fn test_region_model_capability_round_trip() {
        let mut model = RegionModel::new();
        let regions: &mut dyn SemanticRegions = &mut model;

        regions.create_slot("a", Rect::new(0.0, 0.0, 0.3, 0.3), "agent");
        regions.propose_slot("b", Rect::new(0.5, 0.5, 0.2, 0.2), "agent");
        assert_eq!(regions.list_slots().len(), 1);
        assert_eq!(regions.ghost_slots().len(), 1);

        assert_eq!(regions.confirm_slots(), 1);
        assert_eq!(regions.list_slots().len(), 2);
        assert!(regions.remove_slot("a"));
        regions.clear_ghost_slots();
        assert!(regions.ghost_slots().is_empty());
    }

    #[test]
    fn test_placement_window_id() {
        assert_eq!(Placement::Hide(7).window_id(), 7);
    }
}
