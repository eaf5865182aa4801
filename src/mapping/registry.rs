//! Device identity → layout registry
//!
//! Keys are the opaque identity strings a gamepad reports on attach (name, vendor and
//! product). Matching is exact: no trimming, no case folding, no partial matches.

use crate::mapping::action::CanonicalAction;
use crate::mapping::layout::ControllerMapping;
use std::collections::HashMap;
use tracing::{debug, info};

/// Identity string of the generic USB pad shipped as a built-in
pub const GENERIC_USB_JOYSTICK: &str =
    "Generic   USB  Joystick   (STANDARD GAMEPAD Vendor: 0079 Product: 0006)";

/// Identity string of the DualShock 4 shipped as a built-in
pub const DUALSHOCK4_WIRELESS: &str =
    "Wireless Controller (STANDARD GAMEPAD Vendor: 054c Product: 05c4)";

/// The two layouts every registry built with [`MappingRegistry::with_builtins`] knows
pub fn builtin_mappings() -> Vec<(String, ControllerMapping)> {
    vec![
        (
            GENERIC_USB_JOYSTICK.to_string(),
            ControllerMapping::with_face_buttons(
                CanonicalAction::ApadUp,
                CanonicalAction::ApadRight,
                CanonicalAction::ApadDown,
                CanonicalAction::ApadLeft,
            ),
        ),
        (
            DUALSHOCK4_WIRELESS.to_string(),
            ControllerMapping::with_face_buttons(
                CanonicalAction::ApadDown,
                CanonicalAction::ApadRight,
                CanonicalAction::ApadLeft,
                CanonicalAction::ApadUp,
            ),
        ),
    ]
}

#[derive(Debug, Clone, Default)]
pub struct MappingRegistry {
    mappings: HashMap<String, ControllerMapping>,
}

impl MappingRegistry {
    /// Creates a registry seeded with the given entries; later duplicates win
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, ControllerMapping)>,
    {
        let mut registry = Self::empty();
        for (device_id, mapping) in entries {
            registry.register(device_id, mapping);
        }
        info!(
            "Created mapping registry with {} device layouts",
            registry.len()
        );
        registry
    }

    pub fn empty() -> Self {
        Self {
            mappings: HashMap::new(),
        }
    }

    pub fn with_builtins() -> Self {
        Self::new(builtin_mappings())
    }

    /// Inserts or replaces the layout for `device_id`
    pub fn register(&mut self, device_id: impl Into<String>, mapping: ControllerMapping) {
        let device_id = device_id.into();
        match self.mappings.insert(device_id.clone(), mapping) {
            Some(_) => debug!("Replaced layout for device: {:?}", device_id),
            None => debug!("Registered layout for device: {:?}", device_id),
        }
    }

    pub fn lookup(&self, device_id: &str) -> Option<ControllerMapping> {
        self.mappings.get(device_id).cloned()
    }

    pub fn contains(&self, device_id: &str) -> bool {
        self.mappings.contains_key(device_id)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn device_ids(&self) -> impl Iterator<Item = &str> {
        self.mappings.keys().map(String::as_str)
    }
}
