//! Gamepad-side inbound data: identity, discrete face-button reports and polled values

use crate::mapping::PrimaryButton;

/// Standard gamepad button indices
pub mod standard {
    pub const FACE_SOUTH: usize = 0;
    pub const FACE_EAST: usize = 1;
    pub const FACE_WEST: usize = 2;
    pub const FACE_NORTH: usize = 3;
    pub const LEFT_BUMPER: usize = 4;
    pub const RIGHT_BUMPER: usize = 5;
    pub const LEFT_TRIGGER: usize = 6;
    pub const RIGHT_TRIGGER: usize = 7;
    pub const SELECT: usize = 8;
    pub const START: usize = 9;
    pub const LEFT_STICK: usize = 10;
    pub const RIGHT_STICK: usize = 11;
    pub const DPAD_UP: usize = 12;
    pub const DPAD_DOWN: usize = 13;
    pub const DPAD_LEFT: usize = 14;
    pub const DPAD_RIGHT: usize = 15;
    pub const GUIDE: usize = 16;

    pub const BUTTON_COUNT: usize = 17;
}

/// What the input subsystem tells us about a pad when it attaches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PadInfo {
    /// Identity string used for the registry lookup
    pub id: String,
    pub index: usize,
    pub vendor: Option<String>,
    pub product: Option<String>,
}

impl PadInfo {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            index: 0,
            vendor: None,
            product: None,
        }
    }

    pub fn with_vendor_product(mut self, vendor: impl Into<String>, product: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self.product = Some(product.into());
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }
}

/// Face buttons flagged in a single "down" callback
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrimaryButtons {
    pub a: bool,
    pub b: bool,
    pub x: bool,
    pub y: bool,
}

impl PrimaryButtons {
    pub fn only(button: PrimaryButton) -> Self {
        Self::default().with(button)
    }

    pub fn with(mut self, button: PrimaryButton) -> Self {
        match button {
            PrimaryButton::A => self.a = true,
            PrimaryButton::B => self.b = true,
            PrimaryButton::X => self.x = true,
            PrimaryButton::Y => self.y = true,
        }
        self
    }

    pub fn contains(&self, button: PrimaryButton) -> bool {
        match button {
            PrimaryButton::A => self.a,
            PrimaryButton::B => self.b,
            PrimaryButton::X => self.x,
            PrimaryButton::Y => self.y,
        }
    }

    /// First flagged button in A > B > X > Y order
    pub fn resolve(&self) -> Option<PrimaryButton> {
        PrimaryButton::PRIORITY
            .into_iter()
            .find(|button| self.contains(*button))
    }
}

impl From<PrimaryButton> for PrimaryButtons {
    fn from(button: PrimaryButton) -> Self {
        Self::only(button)
    }
}

/// Button value query used by the per-tick sampler
pub trait GamepadState {
    /// Current value of button `index`; 0.0 for unknown indices
    fn button_value(&self, index: usize) -> f32;
}

/// Last reported value of every standard button of the active pad
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonValues {
    values: [f32; standard::BUTTON_COUNT],
}

impl Default for ButtonValues {
    fn default() -> Self {
        Self {
            values: [0.0; standard::BUTTON_COUNT],
        }
    }
}

impl ButtonValues {
    /// Stores `value` for `index`; false if the index is outside the standard layout
    pub fn set(&mut self, index: usize, value: f32) -> bool {
        match self.values.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn reset(&mut self) {
        self.values = [0.0; standard::BUTTON_COUNT];
    }
}

impl GamepadState for ButtonValues {
    fn button_value(&self, index: usize) -> f32 {
        self.values.get(index).copied().unwrap_or(0.0)
    }
}
