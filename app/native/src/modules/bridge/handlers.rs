//! RPC method handlers and the dispatch table.
//!
//! Each handler runs with the bridge lock held. Handlers that expose window
//! data or act on a window apply the matching security check before any
//! host call, and return the refusal rather than swallowing it.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::{AgentBridge, BridgeError, BridgeState};
use crate::constants::{REDACTED_NAME, slot_defaults};
use crate::events::audit;
use crate::modules::WindowId;
use crate::modules::host::{WindowHost, WindowSnapshot};
use crate::modules::layout::{FocusDirection, Rect, SemanticRegions};
use crate::modules::security::SecurityViolation;

/// A method implementation.
pub type Handler<H> = fn(&AgentBridge<H>, &mut BridgeState<H>, Value) -> Result<Value, BridgeError>;

/// Builds the name -> handler table.
pub fn method_table<H: WindowHost>() -> HashMap<&'static str, Handler<H>> {
    let entries: [(&'static str, Handler<H>); 20] = [
        ("echo", echo),
        ("get_windows", get_windows),
        ("get_groups", get_groups),
        ("get_layout", get_layout),
        ("get_focused", get_focused),
        ("set_agent_metadata", set_agent_metadata),
        ("get_agent_metadata", get_agent_metadata),
        ("focus_window", focus_window),
        ("cycle_focus", cycle_focus),
        ("input_text", input_text),
        ("get_screenshot", get_screenshot),
        ("create_slot", create_slot),
        ("propose_slot", propose_slot),
        ("remove_slot", remove_slot),
        ("list_slots", list_slots),
        ("confirm_slots", confirm_slots),
        ("confirm_layout", confirm_layout),
        ("clear_ghost_slots", clear_ghost_slots),
        ("verify_completion", verify_completion),
        ("get_recent_events", get_recent_events),
    ];
    entries.into_iter().collect()
}

// ============================================================================
// Params
// ============================================================================

fn parse<T: DeserializeOwned>(params: Value) -> Result<T, BridgeError> {
    serde_json::from_value(params).map_err(|e| BridgeError::InvalidParams(e.to_string()))
}

fn to_json(value: impl Serialize) -> Result<Value, BridgeError> {
    serde_json::to_value(value).map_err(|e| BridgeError::Host(e.to_string()))
}

#[derive(Deserialize)]
struct WindowParams {
    window_id: WindowId,
}

#[derive(Deserialize)]
struct MetadataParams {
    window_id: WindowId,
    #[serde(default)]
    metadata: Map<String, Value>,
}

#[derive(Deserialize)]
struct CycleParams {
    direction: FocusDirection,
}

#[derive(Deserialize)]
struct InputParams {
    #[serde(default)]
    text: String,
    window_id: WindowId,
}

#[derive(Deserialize)]
struct SlotParams {
    name: String,
    #[serde(default = "default_x")]
    x: f64,
    #[serde(default = "default_y")]
    y: f64,
    #[serde(default = "default_w")]
    w: f64,
    #[serde(default = "default_h")]
    h: f64,
    owner: Option<String>,
}

const fn default_x() -> f64 { slot_defaults::X }
const fn default_y() -> f64 { slot_defaults::Y }
const fn default_w() -> f64 { slot_defaults::W }
const fn default_h() -> f64 { slot_defaults::H }

impl SlotParams {
    /// Validated rectangle and owner.
    fn into_parts(self) -> Result<(String, Rect, String), BridgeError> {
        let rect = Rect::new(self.x, self.y, self.w, self.h);
        if !rect.is_fractional() || !rect.is_valid() {
            return Err(BridgeError::InvalidParams(format!(
                "slot '{}' must have x, y, w, h in 0.0..=1.0 with positive w and h",
                self.name
            )));
        }
        let owner = self.owner.unwrap_or_else(|| slot_defaults::OWNER.to_string());
        Ok((self.name, rect, owner))
    }
}

#[derive(Deserialize)]
struct NameParams {
    name: String,
}

#[derive(Deserialize)]
struct VerifyParams {
    window_id: WindowId,
    #[serde(default)]
    complete: bool,
}

#[derive(Deserialize)]
struct RecentParams {
    #[serde(default = "default_recent")]
    n: usize,
}

const fn default_recent() -> usize { 10 }

// ============================================================================
// Helpers
// ============================================================================

/// Agent-facing description of a window the policy allows it to see.
fn window_info(window: &WindowSnapshot) -> Value {
    let mut info = Map::new();
    info.insert("id".to_string(), json!(window.id));
    info.insert("name".to_string(), json!(window.name));
    if let Some(metadata) = window.metadata.as_ref().filter(|m| !m.is_empty()) {
        info.insert("agent_metadata".to_string(), Value::Object(metadata.clone()));
    }
    if let Some(group) = &window.group {
        info.insert("group".to_string(), json!(group));
    }
    Value::Object(info)
}

/// Placeholder for a window the policy hides.
fn redacted_info(window: &WindowSnapshot) -> Value {
    json!({ "id": window.id, "name": REDACTED_NAME, "redacted": true, "agent_metadata": {} })
}

fn regions<H: WindowHost>(state: &BridgeState<H>) -> Result<&dyn SemanticRegions, BridgeError> {
    let layout = state.host.current_layout();
    layout.regions().ok_or_else(|| BridgeError::LayoutUnsupported(layout.name().to_string()))
}

fn regions_mut<H: WindowHost>(
    state: &mut BridgeState<H>,
) -> Result<&mut dyn SemanticRegions, BridgeError> {
    let layout = state.host.current_layout_mut();
    let name = layout.name();
    layout.regions_mut().ok_or_else(|| BridgeError::LayoutUnsupported(name.to_string()))
}

// ============================================================================
// Handlers
// ============================================================================

#[allow(clippy::unnecessary_wraps)]
fn echo<H: WindowHost>(
    _bridge: &AgentBridge<H>,
    _state: &mut BridgeState<H>,
    params: Value,
) -> Result<Value, BridgeError> {
    Ok(params)
}

#[allow(clippy::unnecessary_wraps)]
fn get_windows<H: WindowHost>(
    bridge: &AgentBridge<H>,
    state: &mut BridgeState<H>,
    _params: Value,
) -> Result<Value, BridgeError> {
    let windows = state
        .host
        .windows()
        .iter()
        .map(|window| {
            if bridge.policy.can_see(Some(window)) {
                window_info(window)
            } else {
                redacted_info(window)
            }
        })
        .collect();
    Ok(Value::Array(windows))
}

fn get_groups<H: WindowHost>(
    _bridge: &AgentBridge<H>,
    state: &mut BridgeState<H>,
    _params: Value,
) -> Result<Value, BridgeError> {
    to_json(state.host.groups())
}

#[allow(clippy::unnecessary_wraps)]
fn get_layout<H: WindowHost>(
    _bridge: &AgentBridge<H>,
    state: &mut BridgeState<H>,
    _params: Value,
) -> Result<Value, BridgeError> {
    let layout = state.host.current_layout();
    let mut info = json!({
        "name": layout.name(),
        "group": state.host.current_group(),
    });
    if let Some(regions) = layout.regions() {
        info["slots"] = json!(regions.list_slots());
        info["ghost_slots"] = json!(regions.ghost_slots());
    }
    Ok(info)
}

#[allow(clippy::unnecessary_wraps)]
fn get_focused<H: WindowHost>(
    bridge: &AgentBridge<H>,
    state: &mut BridgeState<H>,
    _params: Value,
) -> Result<Value, BridgeError> {
    Ok(match state.host.focused() {
        None => Value::Null,
        Some(window) if bridge.policy.can_see(Some(&window)) => window_info(&window),
        Some(window) => redacted_info(&window),
    })
}

fn set_agent_metadata<H: WindowHost>(
    _bridge: &AgentBridge<H>,
    state: &mut BridgeState<H>,
    params: Value,
) -> Result<Value, BridgeError> {
    let MetadataParams { window_id, metadata } = parse(params)?;
    state.host.set_metadata(window_id, metadata.clone())?;
    state.log.append(
        audit::AGENT_METADATA_SET,
        json!({ "window_id": window_id, "metadata": metadata }),
    );
    // A changed slot binding moves the window.
    state.host.relayout();
    Ok(json!({ "ok": true }))
}

fn get_agent_metadata<H: WindowHost>(
    _bridge: &AgentBridge<H>,
    state: &mut BridgeState<H>,
    params: Value,
) -> Result<Value, BridgeError> {
    let WindowParams { window_id } = parse(params)?;
    Ok(Value::Object(state.host.metadata(window_id)?))
}

fn focus_window<H: WindowHost>(
    _bridge: &AgentBridge<H>,
    state: &mut BridgeState<H>,
    params: Value,
) -> Result<Value, BridgeError> {
    let WindowParams { window_id } = parse(params)?;
    state.host.focus(window_id)?;
    Ok(json!({ "ok": true }))
}

fn cycle_focus<H: WindowHost>(
    _bridge: &AgentBridge<H>,
    state: &mut BridgeState<H>,
    params: Value,
) -> Result<Value, BridgeError> {
    let CycleParams { direction } = parse(params)?;
    let focused = state.host.cycle_focus(direction);
    Ok(json!({ "window_id": focused }))
}

fn input_text<H: WindowHost>(
    bridge: &AgentBridge<H>,
    state: &mut BridgeState<H>,
    params: Value,
) -> Result<Value, BridgeError> {
    let InputParams { text, window_id } = parse(params)?;

    bridge.policy.validate_input(&text)?;
    // Focus is read now, right before injecting, and never cached.
    let focused = state.host.focused();
    bridge.policy.can_inject_input(focused.as_ref(), window_id)?;
    if !bridge.policy.can_see(focused.as_ref()) {
        return Err(SecurityViolation::SensitiveWindow { action: "input" }.into());
    }

    state.host.type_text(window_id, &text)?;
    tracing::info!("bridge: typed {} chars into window {window_id}", text.chars().count());
    state.log.append(
        audit::AGENT_INPUT,
        json!({ "window_id": window_id, "length": text.chars().count() }),
    );
    Ok(json!({ "ok": true }))
}

fn get_screenshot<H: WindowHost>(
    bridge: &AgentBridge<H>,
    state: &mut BridgeState<H>,
    params: Value,
) -> Result<Value, BridgeError> {
    let WindowParams { window_id } = parse(params)?;
    let window = state.host.window(window_id).ok_or(BridgeError::WindowNotFound(window_id))?;
    if !bridge.policy.can_see(Some(&window)) {
        return Err(SecurityViolation::SensitiveWindow { action: "screenshot" }.into());
    }

    let path = state.host.screenshot(window_id)?;
    Ok(json!({ "ok": true, "path": path.display().to_string() }))
}

fn create_slot<H: WindowHost>(
    _bridge: &AgentBridge<H>,
    state: &mut BridgeState<H>,
    params: Value,
) -> Result<Value, BridgeError> {
    let (name, rect, owner) = parse::<SlotParams>(params)?.into_parts()?;
    let slot = regions_mut(state)?.create_slot(&name, rect, &owner);
    state.host.relayout();
    to_json(slot)
}

fn propose_slot<H: WindowHost>(
    _bridge: &AgentBridge<H>,
    state: &mut BridgeState<H>,
    params: Value,
) -> Result<Value, BridgeError> {
    let (name, rect, owner) = parse::<SlotParams>(params)?.into_parts()?;
    let slot = regions_mut(state)?.propose_slot(&name, rect, &owner);
    if slot.conflict {
        tracing::debug!("bridge: ghost slot '{name}' proposed by '{owner}' conflicts");
    }
    state.host.render_overlay();
    to_json(slot)
}

fn remove_slot<H: WindowHost>(
    _bridge: &AgentBridge<H>,
    state: &mut BridgeState<H>,
    params: Value,
) -> Result<Value, BridgeError> {
    let NameParams { name } = parse(params)?;
    let removed = regions_mut(state)?.remove_slot(&name);
    if removed {
        state.host.relayout();
    }
    Ok(Value::Bool(removed))
}

fn list_slots<H: WindowHost>(
    _bridge: &AgentBridge<H>,
    state: &mut BridgeState<H>,
    _params: Value,
) -> Result<Value, BridgeError> {
    to_json(regions(state)?.list_slots())
}

/// Promotes ghosts, then re-lays out and clears the overlay.
fn confirm<H: WindowHost>(state: &mut BridgeState<H>) -> Result<usize, BridgeError> {
    let count = regions_mut(state)?.confirm_slots();
    state.host.relayout();
    state.host.render_overlay();
    Ok(count)
}

fn confirm_slots<H: WindowHost>(
    _bridge: &AgentBridge<H>,
    state: &mut BridgeState<H>,
    _params: Value,
) -> Result<Value, BridgeError> {
    confirm(state).map(|count| json!(count))
}

fn confirm_layout<H: WindowHost>(
    _bridge: &AgentBridge<H>,
    state: &mut BridgeState<H>,
    _params: Value,
) -> Result<Value, BridgeError> {
    confirm(state).map(|count| json!({ "confirmed": count }))
}

fn clear_ghost_slots<H: WindowHost>(
    _bridge: &AgentBridge<H>,
    state: &mut BridgeState<H>,
    _params: Value,
) -> Result<Value, BridgeError> {
    regions_mut(state)?.clear_ghost_slots();
    state.host.render_overlay();
    Ok(Value::Null)
}

fn verify_completion<H: WindowHost>(
    _bridge: &AgentBridge<H>,
    state: &mut BridgeState<H>,
    params: Value,
) -> Result<Value, BridgeError> {
    let VerifyParams { window_id, complete } = parse(params)?;
    let BridgeState { host, gate, log, .. } = state;
    gate.mark(host, log, window_id, complete)?;
    Ok(json!({ "ok": true, "complete": complete }))
}

fn get_recent_events<H: WindowHost>(
    bridge: &AgentBridge<H>,
    state: &mut BridgeState<H>,
    params: Value,
) -> Result<Value, BridgeError> {
    // An explicit `null` means "use the defaults".
    let params = if params.is_null() { json!({}) } else { params };
    let RecentParams { n } = parse(params)?;
    to_json(state.log.recent(n.min(bridge.recent_events_limit)))
}
