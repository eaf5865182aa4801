//! Canonical action vocabulary and the event carried on the bus
//!
//! Downstream consumers never see physical keys or gamepad indices. Everything that
//! leaves this crate is a [`ButtonPress`] naming a [`CanonicalAction`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Device-independent identifier for a logical input
///
/// The built-in vocabulary covers the directional pad, the action pad and the four
/// shoulder buttons. Device layouts registered at runtime may bind to any other name,
/// which ends up in [`CanonicalAction::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CanonicalAction {
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
    ApadUp,
    ApadDown,
    ApadLeft,
    ApadRight,
    L1,
    L2,
    R1,
    R2,
    Custom(String),
}

impl CanonicalAction {
    /// Wire name of the action, e.g. `DPAD_up`
    pub fn as_str(&self) -> &str {
        match self {
            CanonicalAction::DpadUp => "DPAD_up",
            CanonicalAction::DpadDown => "DPAD_down",
            CanonicalAction::DpadLeft => "DPAD_left",
            CanonicalAction::DpadRight => "DPAD_right",
            CanonicalAction::ApadUp => "APAD_up",
            CanonicalAction::ApadDown => "APAD_down",
            CanonicalAction::ApadLeft => "APAD_left",
            CanonicalAction::ApadRight => "APAD_right",
            CanonicalAction::L1 => "L1",
            CanonicalAction::L2 => "L2",
            CanonicalAction::R1 => "R1",
            CanonicalAction::R2 => "R2",
            CanonicalAction::Custom(name) => name,
        }
    }

    pub fn is_builtin(&self) -> bool {
        !matches!(self, CanonicalAction::Custom(_))
    }
}

impl From<&str> for CanonicalAction {
    fn from(name: &str) -> Self {
        match name {
            "DPAD_up" => CanonicalAction::DpadUp,
            "DPAD_down" => CanonicalAction::DpadDown,
            "DPAD_left" => CanonicalAction::DpadLeft,
            "DPAD_right" => CanonicalAction::DpadRight,
            "APAD_up" => CanonicalAction::ApadUp,
            "APAD_down" => CanonicalAction::ApadDown,
            "APAD_left" => CanonicalAction::ApadLeft,
            "APAD_right" => CanonicalAction::ApadRight,
            "L1" => CanonicalAction::L1,
            "L2" => CanonicalAction::L2,
            "R1" => CanonicalAction::R1,
            "R2" => CanonicalAction::R2,
            other => CanonicalAction::Custom(other.to_string()),
        }
    }
}

impl From<String> for CanonicalAction {
    fn from(name: String) -> Self {
        match CanonicalAction::from(name.as_str()) {
            CanonicalAction::Custom(_) => CanonicalAction::Custom(name),
            builtin => builtin,
        }
    }
}

impl From<CanonicalAction> for String {
    fn from(action: CanonicalAction) -> Self {
        match action {
            CanonicalAction::Custom(name) => name,
            builtin => builtin.as_str().to_string(),
        }
    }
}

impl fmt::Display for CanonicalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single canonical event
///
/// `input == None` is the idle value a bus holds before the first real press. It is
/// never published again afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ButtonPress {
    pub input: Option<CanonicalAction>,
}

impl ButtonPress {
    pub fn new(action: CanonicalAction) -> Self {
        Self {
            input: Some(action),
        }
    }

    pub fn idle() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.input.is_none()
    }
}

impl From<CanonicalAction> for ButtonPress {
    fn from(action: CanonicalAction) -> Self {
        Self::new(action)
    }
}
