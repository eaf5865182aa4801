//! Per-device button layouts

use crate::mapping::action::CanonicalAction;
use serde::{Deserialize, Serialize};

/// One of the four face buttons of a gamepad, in default layout naming
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimaryButton {
    A,
    B,
    X,
    Y,
}

impl PrimaryButton {
    /// Resolution order when one callback reports several face buttons
    pub const PRIORITY: [PrimaryButton; 4] = [
        PrimaryButton::A,
        PrimaryButton::B,
        PrimaryButton::X,
        PrimaryButton::Y,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShoulderButton {
    L1,
    L2,
    R1,
    R2,
}

/// Binding from a physical device's buttons to canonical actions
///
/// All eight fields are mandatory; a partial layout fails to deserialize. Shoulder
/// fields normally carry the canonical shoulder names unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct ControllerMapping {
    pub a: CanonicalAction,
    pub b: CanonicalAction,
    pub x: CanonicalAction,
    pub y: CanonicalAction,
    pub l1: CanonicalAction,
    pub l2: CanonicalAction,
    pub r1: CanonicalAction,
    pub r2: CanonicalAction,
}

impl ControllerMapping {
    /// Layout with the given face-button bindings and pass-through shoulders
    pub fn with_face_buttons(
        a: CanonicalAction,
        b: CanonicalAction,
        x: CanonicalAction,
        y: CanonicalAction,
    ) -> Self {
        Self {
            a,
            b,
            x,
            y,
            l1: CanonicalAction::L1,
            l2: CanonicalAction::L2,
            r1: CanonicalAction::R1,
            r2: CanonicalAction::R2,
        }
    }

    pub fn primary(&self, button: PrimaryButton) -> &CanonicalAction {
        match button {
            PrimaryButton::A => &self.a,
            PrimaryButton::B => &self.b,
            PrimaryButton::X => &self.x,
            PrimaryButton::Y => &self.y,
        }
    }

    pub fn shoulder(&self, button: ShoulderButton) -> &CanonicalAction {
        match button {
            ShoulderButton::L1 => &self.l1,
            ShoulderButton::L2 => &self.l2,
            ShoulderButton::R1 => &self.r1,
            ShoulderButton::R2 => &self.r2,
        }
    }
}
