//! Monocle layout - all windows maximized to fill the screen.
//!
//! Every window gets the full screen frame. This layout has no semantic
//! regions, so slot requests against it are refused.

use super::{ClientList, ClientView, Layout, LayoutStyle, Placement};
use crate::modules::layout::types::ScreenRect;

/// Monocle layout - all windows maximized to fill the screen.
#[derive(Debug, Default)]
pub struct MonocleLayout {
    style: LayoutStyle,
    clients: ClientList,
}

impl MonocleLayout {
    pub const NAME: &'static str = "monocle";

    #[must_use]
    pub fn new(style: LayoutStyle) -> Self { Self { style, clients: ClientList::new() } }
}

impl Layout for MonocleLayout {
    fn name(&self) -> &'static str { Self::NAME }

    fn clients(&self) -> &ClientList { &self.clients }

    fn clients_mut(&mut self) -> &mut ClientList { &mut self.clients }

    fn arrange(&self, views: &[ClientView<'_>], screen: &ScreenRect) -> Vec<Placement> {
        views.iter().map(|view| Placement::framed(view, screen, &self.style)).collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn screen_frame() -> ScreenRect { ScreenRect::new(0, 0, 1920, 1080) }

    fn views(ids: &[u64]) -> Vec<ClientView<'static>> {
        ids.iter().map(|&id| ClientView { id, slot: None, has_focus: false }).collect()
    }

    fn rects(placements: &[Placement]) -> Vec<(u64, ScreenRect)> {
        placements
            .iter()
            .map(|p| match p {
                Placement::Show(p) => (p.window_id, p.rect),
                Placement::Hide(id) => panic!("window {id} unexpectedly hidden"),
            })
            .collect()
    }

    #[test]
    fn test_monocle_empty() {
        let layout = MonocleLayout::default();
        assert!(layout.arrange(&[], &screen_frame()).is_empty());
    }

    #[test]
    fn test_monocle_multiple_windows() {
        let layout = MonocleLayout::new(LayoutStyle::default());
        let result = rects(&layout.arrange(&views(&[1, 2, 3]), &screen_frame()));

        assert_eq!(result.len(), 3);
        for (id, frame) in &result {
            assert_eq!(*frame, ScreenRect::new(0, 0, 1916, 1076), "Window {id} should be fullscreen");
        }
    }

    #[test]
    fn test_monocle_preserves_order() {
        let layout = MonocleLayout::new(LayoutStyle::default());
        let result = rects(&layout.arrange(&views(&[5, 3, 8, 1]), &screen_frame()));
        let ids: Vec<_> = result.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, [5, 3, 8, 1]);
    }

    #[test]
    fn test_monocle_with_offset_frame() {
        let layout = MonocleLayout::new(LayoutStyle { border_width: 0, ..LayoutStyle::default() });
        let frame = ScreenRect::new(20, 50, 1880, 1010);
        let result = rects(&layout.arrange(&views(&[1, 2]), &frame));

        assert_eq!(result[0].1, frame);
        assert_eq!(result[1].1, frame);
    }

    #[test]
    fn test_monocle_hides_windows_on_frame_smaller_than_border() {
        let layout = MonocleLayout::new(LayoutStyle::default());
        let placements = layout.arrange(&views(&[1, 2]), &ScreenRect::new(0, 0, 3, 600));
        assert_eq!(placements, [Placement::Hide(1), Placement::Hide(2)]);
    }

    #[test]
    fn test_monocle_has_no_regions() {
        let layout = MonocleLayout::default();
        assert!(layout.regions().is_none());
        assert!(layout.overlays(&screen_frame()).is_empty());
        assert_eq!(layout.info()["name"], "monocle");
    }
}
