//! In-memory windowing host.
//!
//! Keeps windows, groups, focus and placement results in plain maps so the
//! bridge can be served and tested without a display server. Each group
//! owns its own layout instance; only the current group is on screen.

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::{
    CloseGate, EventSink, GroupInfo, HostError, HostEvent, Metadata, WindowHost, WindowSnapshot,
};
use crate::modules::WindowId;
use crate::modules::layout::{
    self, ClientView, FocusDirection, GenerativeLayout, Layout, LayoutStyle, Overlay, Placement,
    ScreenRect, WindowPlacement,
};

/// Minimal 1x1 portable bitmap written in place of a real capture.
const PLACEHOLDER_CAPTURE: &[u8] = b"P1\n1 1\n0\n";

#[derive(Debug)]
struct VirtualWindow {
    name: String,
    classes: Vec<String>,
    group: usize,
    metadata: Option<Metadata>,
    placement: Option<WindowPlacement>,
    hidden: bool,
    typed: String,
}

#[derive(Debug)]
struct VirtualGroup {
    name: String,
    label: String,
    layout: Box<dyn Layout>,
}

/// A complete windowing host kept in memory.
#[derive(Debug)]
pub struct VirtualHost {
    screen: ScreenRect,
    style: LayoutStyle,
    windows: BTreeMap<WindowId, VirtualWindow>,
    groups: Vec<VirtualGroup>,
    current_group: usize,
    focused: Option<WindowId>,
    next_id: WindowId,
    overlays: Vec<Overlay>,
    screenshot_dir: PathBuf,
    sink: Option<EventSink>,
}

impl VirtualHost {
    /// Creates a host with one generative-layout group per name.
    ///
    /// An empty name list yields a single group called `"a"`.
    #[must_use]
    pub fn new(screen: ScreenRect, group_names: &[String], style: LayoutStyle) -> Self {
        let mut names: Vec<String> = group_names.to_vec();
        if names.is_empty() {
            names.push("a".to_string());
        }

        let groups = names
            .into_iter()
            .map(|name| VirtualGroup {
                label: name.clone(),
                name,
                layout: Box::new(GenerativeLayout::new(style.clone())),
            })
            .collect();

        Self {
            screen,
            style,
            windows: BTreeMap::new(),
            groups,
            current_group: 0,
            focused: None,
            next_id: 1,
            overlays: Vec::new(),
            screenshot_dir: crate::cache::get_cache_subdir("screenshots"),
            sink: None,
        }
    }

    /// Sets where captures are written.
    #[must_use]
    pub fn with_screenshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = dir.into();
        self
    }

    /// Maps a window that supports agent metadata into the current group
    /// and focuses it.
    pub fn spawn_window(&mut self, name: &str, classes: &[&str]) -> WindowId {
        self.spawn(name, classes, Some(Metadata::new()))
    }

    /// Maps a window without agent-metadata support.
    pub fn spawn_plain_window(&mut self, name: &str, classes: &[&str]) -> WindowId {
        self.spawn(name, classes, None)
    }

    fn spawn(&mut self, name: &str, classes: &[&str], metadata: Option<Metadata>) -> WindowId {
        let id = self.next_id;
        self.next_id += 1;

        self.windows.insert(id, VirtualWindow {
            name: name.to_string(),
            classes: classes.iter().map(ToString::to_string).collect(),
            group: self.current_group,
            metadata,
            placement: None,
            hidden: false,
            typed: String::new(),
        });
        self.groups[self.current_group].layout.clients_mut().add(id);
        tracing::debug!("host: spawned window {id}");

        if let Some(snapshot) = self.window(id) {
            self.emit(HostEvent::WindowCreated(snapshot));
        }
        self.set_focus(Some(id));
        self.relayout();
        id
    }

    /// Asks to close a window, honoring the gate's veto.
    ///
    /// Returns whether the window was closed.
    ///
    /// # Errors
    ///
    /// Fails when the window is absent.
    pub fn request_close(&mut self, id: WindowId, gate: &impl CloseGate) -> Result<bool, HostError> {
        if !self.windows.contains_key(&id) {
            return Err(HostError::WindowNotFound(id));
        }
        if !gate.is_close_allowed(id) {
            tracing::info!("host: close of window {id} vetoed by completion gate");
            return Ok(false);
        }
        self.close(id)?;
        Ok(true)
    }

    /// Replaces the current group's layout, keeping its clients.
    ///
    /// # Errors
    ///
    /// Fails when no layout has that name.
    pub fn set_layout(&mut self, name: &str) -> Result<(), HostError> {
        let mut next = layout::from_name(name, &self.style).ok_or_else(|| {
            HostError::Operation(format!(
                "Unknown layout '{name}', expected one of: {}",
                layout::LAYOUT_NAMES.join(", ")
            ))
        })?;

        let group = &mut self.groups[self.current_group];
        *next.clients_mut() = group.layout.clients().clone();
        group.layout = next;

        let event = HostEvent::LayoutChanged {
            layout: group.layout.name().to_string(),
            group: group.name.clone(),
        };
        self.emit(event);
        self.relayout();
        self.render_overlay();
        Ok(())
    }

    /// Makes another group current.
    ///
    /// # Errors
    ///
    /// Fails when no group has that name.
    pub fn switch_group(&mut self, name: &str) -> Result<(), HostError> {
        let idx = self
            .groups
            .iter()
            .position(|group| group.name == name)
            .ok_or_else(|| HostError::Operation(format!("Unknown group '{name}'")))?;
        self.current_group = idx;

        let focus = self.groups[idx].layout.clients().current();
        self.set_focus(focus);
        self.relayout();
        self.render_overlay();
        Ok(())
    }

    /// Last placement applied to a window.
    #[must_use]
    pub fn placement(&self, id: WindowId) -> Option<&WindowPlacement> {
        self.windows.get(&id)?.placement.as_ref()
    }

    #[must_use]
    pub fn is_hidden(&self, id: WindowId) -> bool { self.windows.get(&id).is_some_and(|w| w.hidden) }

    /// Text typed into a window so far.
    #[must_use]
    pub fn typed_text(&self, id: WindowId) -> Option<&str> {
        self.windows.get(&id).map(|w| w.typed.as_str())
    }

    /// Overlays drawn by the last [`WindowHost::render_overlay`].
    #[must_use]
    pub fn overlays(&self) -> &[Overlay] { &self.overlays }

    fn emit(&self, event: HostEvent) {
        if let Some(sink) = &self.sink
            && sink.send(event).is_err()
        {
            tracing::debug!("host: event subscriber dropped");
        }
    }

    fn set_focus(&mut self, id: Option<WindowId>) {
        if self.focused == id {
            return;
        }
        self.focused = id;
        self.emit(HostEvent::FocusChanged(self.focused()));
    }

    fn snapshot(&self, id: WindowId, window: &VirtualWindow) -> WindowSnapshot {
        WindowSnapshot {
            id,
            name: window.name.clone(),
            classes: window.classes.clone(),
            group: self.groups.get(window.group).map(|group| group.name.clone()),
            metadata: window.metadata.clone(),
        }
    }

    fn window_mut(&mut self, id: WindowId) -> Result<&mut VirtualWindow, HostError> {
        self.windows.get_mut(&id).ok_or(HostError::WindowNotFound(id))
    }
}

impl WindowHost for VirtualHost {
    fn windows(&self) -> Vec<WindowSnapshot> {
        self.windows.iter().map(|(&id, window)| self.snapshot(id, window)).collect()
    }

    fn window(&self, id: WindowId) -> Option<WindowSnapshot> {
        self.windows.get(&id).map(|window| self.snapshot(id, window))
    }

    fn focused(&self) -> Option<WindowSnapshot> { self.focused.and_then(|id| self.window(id)) }

    fn set_metadata(&mut self, id: WindowId, metadata: Metadata) -> Result<(), HostError> {
        let window = self.window_mut(id)?;
        let Some(slot) = window.metadata.as_mut() else {
            return Err(HostError::MetadataUnsupported(id));
        };
        *slot = metadata;
        Ok(())
    }

    fn metadata(&self, id: WindowId) -> Result<Metadata, HostError> {
        let window = self.windows.get(&id).ok_or(HostError::WindowNotFound(id))?;
        Ok(window.metadata.clone().unwrap_or_default())
    }

    fn update_metadata_status(&mut self, id: WindowId, status: &str) -> Result<(), HostError> {
        let window = self.window_mut(id)?;
        let Some(metadata) = window.metadata.as_mut() else {
            return Err(HostError::MetadataUnsupported(id));
        };
        metadata.insert("status".to_string(), status.into());
        Ok(())
    }

    fn focus(&mut self, id: WindowId) -> Result<(), HostError> {
        let group = self.windows.get(&id).ok_or(HostError::WindowNotFound(id))?.group;
        self.current_group = group;
        self.groups[group].layout.clients_mut().focus(id);
        self.set_focus(Some(id));
        self.relayout();
        Ok(())
    }

    fn cycle_focus(&mut self, direction: FocusDirection) -> Option<WindowId> {
        let target = self.current_layout_mut().clients_mut().cycle(direction)?;
        self.set_focus(Some(target));
        self.relayout();
        Some(target)
    }

    fn type_text(&mut self, id: WindowId, text: &str) -> Result<(), HostError> {
        self.window_mut(id)?.typed.push_str(text);
        Ok(())
    }

    fn screenshot(&mut self, id: WindowId) -> Result<PathBuf, HostError> {
        if !self.windows.contains_key(&id) {
            return Err(HostError::WindowNotFound(id));
        }

        let path = self.screenshot_dir.join(format!("window-{id}.pbm"));
        std::fs::create_dir_all(&self.screenshot_dir)
            .and_then(|()| std::fs::write(&path, PLACEHOLDER_CAPTURE))
            .map_err(|e| HostError::Operation(format!("Failed to write capture: {e}")))?;
        Ok(path)
    }

    fn groups(&self) -> Vec<GroupInfo> {
        self.groups
            .iter()
            .map(|group| GroupInfo {
                name: group.name.clone(),
                label: group.label.clone(),
                layout: group.layout.name().to_string(),
                windows: group.layout.clients().ids().to_vec(),
            })
            .collect()
    }

    fn current_group(&self) -> String { self.groups[self.current_group].name.clone() }

    fn current_layout(&self) -> &dyn Layout { self.groups[self.current_group].layout.as_ref() }

    fn current_layout_mut(&mut self) -> &mut dyn Layout {
        self.groups[self.current_group].layout.as_mut()
    }

    fn relayout(&mut self) {
        let placements: Vec<Placement> = {
            let layout = self.current_layout();
            let views: Vec<ClientView<'_>> = layout
                .clients()
                .ids()
                .iter()
                .filter_map(|&id| {
                    let window = self.windows.get(&id)?;
                    Some(ClientView {
                        id,
                        slot: window
                            .metadata
                            .as_ref()
                            .and_then(|m| m.get("slot"))
                            .and_then(|slot| slot.as_str()),
                        has_focus: self.focused == Some(id),
                    })
                })
                .collect();
            layout.arrange(&views, &self.screen)
        };

        let current = self.current_group;
        for window in self.windows.values_mut().filter(|w| w.group != current) {
            window.hidden = true;
        }
        for placement in placements {
            let Some(window) = self.windows.get_mut(&placement.window_id()) else {
                continue;
            };
            match placement {
                Placement::Show(placement) => {
                    window.placement = Some(placement);
                    window.hidden = false;
                }
                Placement::Hide(_) => window.hidden = true,
            }
        }
    }

    fn render_overlay(&mut self) { self.overlays = self.current_layout().overlays(&self.screen); }

    fn close(&mut self, id: WindowId) -> Result<(), HostError> {
        let snapshot = self.window(id).ok_or(HostError::WindowNotFound(id))?;
        let Some(window) = self.windows.remove(&id) else {
            return Err(HostError::WindowNotFound(id));
        };

        let clients = self.groups[window.group].layout.clients_mut();
        clients.remove(id);
        let successor = clients.current();
        self.emit(HostEvent::WindowDestroyed(snapshot));

        if self.focused == Some(id) {
            let next = if window.group == self.current_group { successor } else { None };
            self.set_focus(next);
        }
        self.relayout();
        Ok(())
    }

    fn subscribe(&mut self, sink: EventSink) { self.sink = Some(sink); }
}

// ============================================================================
// Tests
// ============================================================================
