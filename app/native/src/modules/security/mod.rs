//! Security policy for agent access to the windowing environment.
//!
//! Every observation and mutation an agent performs goes through one of
//! three independent guards:
//!
//! - **Privacy mask** (`can_see`): windows whose class or title looks
//!   sensitive (password managers, banking, private browsing) are never
//!   exposed to the agent.
//! - **Input gating** (`validate_input`): text that contains destructive or
//!   privilege-escalating shell constructs is rejected. This is a denylist
//!   and not a sandbox.
//! - **Focus lock** (`can_inject_input`): input may only be injected into
//!   the window that is focused at the moment of injection. The check must
//!   run immediately before every injection and never be cached.
//!
//! The policy holds no per-call state. Its tables are fixed at
//! construction, so a single instance is shared by reference with every
//! request handler.

mod patterns;

use std::collections::HashSet;

use thiserror::Error;

pub use patterns::{InputPattern, SENSITIVE_CLASSES, SENSITIVE_TITLES, input_patterns};

use super::WindowId;

/// A refusal issued by the security policy.
///
/// Every message starts with `Security violation:` so callers can tell a
/// policy refusal apart from a missing window or an unsupported operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecurityViolation {
    /// The target window is hidden from agents.
    #[error("Security violation: {action} blocked: sensitive window")]
    SensitiveWindow { action: &'static str },

    /// The text matched a dangerous input pattern.
    #[error("Security violation: input blocked: contains dangerous pattern '{description}'")]
    InputRejected { description: &'static str },

    /// No window has focus, so nothing may receive input.
    #[error("Security violation: input blocked: no window is currently focused")]
    NoFocusedWindow,

    /// Focus moved away from the window the agent meant to type into.
    #[error(
        "Security violation: focus lock: agent tried to type into window {target} but focus is on {focused}"
    )]
    FocusLockViolation { target: WindowId, focused: WindowId },
}

/// Attributes the policy inspects on a window.
pub trait WindowIdentity {
    /// Host identifier of the window.
    fn window_id(&self) -> WindowId;

    /// Window class strings (e.g. `WM_CLASS` instance and class).
    fn window_classes(&self) -> &[String];

    /// Window title.
    fn window_title(&self) -> &str;
}

/// Stateless rule evaluator.
#[derive(Debug, Clone)]
pub struct SecurityPolicy {
    sensitive_classes: HashSet<String>,
    sensitive_titles: Vec<String>,
    patterns: &'static [InputPattern],
}

impl Default for SecurityPolicy {
    fn default() -> Self { Self::new() }
}

impl SecurityPolicy {
    /// Creates a policy with the built-in rule tables.
    #[must_use]
    pub fn new() -> Self { Self::with_extra_rules(&[], &[]) }

    /// Creates a policy with additional sensitive classes and title keywords.
    ///
    /// The built-in tables are always included; extra rules can only widen
    /// what is hidden.
    #[must_use]
    pub fn with_extra_rules(extra_classes: &[String], extra_titles: &[String]) -> Self {
        let sensitive_classes = SENSITIVE_CLASSES
            .iter()
            .map(|class| (*class).to_string())
            .chain(extra_classes.iter().map(|class| class.trim().to_lowercase()))
            .filter(|class| !class.is_empty())
            .collect();

        let mut sensitive_titles: Vec<String> =
            SENSITIVE_TITLES.iter().map(|keyword| (*keyword).to_string()).collect();
        for keyword in extra_titles {
            let keyword = keyword.trim().to_lowercase();
            if !keyword.is_empty() && !sensitive_titles.contains(&keyword) {
                sensitive_titles.push(keyword);
            }
        }

        Self {
            sensitive_classes,
            sensitive_titles,
            patterns: input_patterns(),
        }
    }

    /// Returns whether an agent may perceive the window.
    ///
    /// Absent windows are never visible. A window is hidden when any of its
    /// classes equals a sensitive class, or its title contains a sensitive
    /// keyword, both compared case-insensitively.
    #[must_use]
    pub fn can_see<W: WindowIdentity + ?Sized>(&self, window: Option<&W>) -> bool {
        let Some(window) = window else {
            return false;
        };

        if window
            .window_classes()
            .iter()
            .any(|class| self.sensitive_classes.contains(&class.to_lowercase()))
        {
            return false;
        }

        let title = window.window_title().to_lowercase();
        !self.sensitive_titles.iter().any(|keyword| title.contains(keyword.as_str()))
    }

    /// Scans text against the dangerous-input patterns, in order.
    ///
    /// # Errors
    ///
    /// Returns [`SecurityViolation::InputRejected`] naming the first pattern
    /// that matched.
    pub fn validate_input(&self, text: &str) -> Result<(), SecurityViolation> {
        match self.patterns.iter().find(|pattern| pattern.is_match(text)) {
            Some(pattern) => Err(SecurityViolation::InputRejected {
                description: pattern.description,
            }),
            None => Ok(()),
        }
    }

    /// Checks that input aimed at `target` would land in the focused window.
    ///
    /// # Errors
    ///
    /// Returns [`SecurityViolation::NoFocusedWindow`] when nothing is focused
    /// and [`SecurityViolation::FocusLockViolation`] when focus is elsewhere.
    pub fn can_inject_input<W: WindowIdentity + ?Sized>(
        &self,
        focused: Option<&W>,
        target: WindowId,
    ) -> Result<(), SecurityViolation> {
        let focused = focused.ok_or(SecurityViolation::NoFocusedWindow)?;
        if focused.window_id() == target {
            Ok(())
        } else {
            Err(SecurityViolation::FocusLockViolation {
                target,
                focused: focused.window_id(),
            })
        }
    }
}
