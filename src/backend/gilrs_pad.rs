//! gilrs adapter: real gamepads → controller inbound signals
//!
//! Face-button presses become discrete down reports, every button value change lands
//! in the polled snapshot, and events from pads other than the active one are dropped.

use crate::backend::BackendError;
use crate::controller::gamepad::{standard, PadInfo, PrimaryButtons};
use crate::controller::ControllerHandle;
use crate::mapping::PrimaryButton;
use gilrs::{Button, Event, EventType, Gamepad, GamepadId, Gilrs};
use tracing::{debug, error, info, warn};

pub struct GilrsBackend {
    gilrs: Gilrs,
    active_gamepad: Option<GamepadId>,
}

impl GilrsBackend {
    pub fn new() -> Result<Self, BackendError> {
        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(BackendError::InitializationError(e.to_string()));
            }
        };

        Ok(Self {
            gilrs,
            active_gamepad: None,
        })
    }

    pub fn active_gamepad(&self) -> Option<GamepadId> {
        self.active_gamepad
    }

    /// Attaches the first pad that was already connected before start-up
    pub fn attach_existing(&mut self, controller: &mut ControllerHandle) -> bool {
        let gamepads: Vec<(GamepadId, PadInfo)> = self
            .gilrs
            .gamepads()
            .map(|(id, gamepad)| (id, pad_info(id, &gamepad)))
            .collect();

        info!("Found {} gamepads:", gamepads.len());
        for (idx, (id, info)) in gamepads.iter().enumerate() {
            info!("  [{}] ID: {}, Identity: {:?}", idx, id, info.id);
        }

        match gamepads.into_iter().next() {
            Some((id, info)) => self.attach(id, info, controller),
            None => {
                warn!("No gamepad connected, waiting for one to attach");
                false
            }
        }
    }

    fn attach(&mut self, id: GamepadId, info: PadInfo, controller: &mut ControllerHandle) -> bool {
        if self.active_gamepad.is_some() {
            debug!("Gamepad {} attached while another is active", id);
        }
        let accepted = controller.gamepad_connected(info);
        if accepted {
            self.active_gamepad = Some(id);
        }
        accepted
    }

    /// Drains pending gilrs events into `controller`; returns how many were handled
    pub fn pump(&mut self, controller: &mut ControllerHandle) -> usize {
        let mut handled = 0;
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            if let EventType::Connected = event {
                let info = pad_info(id, &self.gilrs.gamepad(id));
                self.attach(id, info, controller);
                handled += 1;
                continue;
            }

            if self.active_gamepad != Some(id) {
                debug!("Skipping event from non-active gamepad: {:?}", id);
                continue;
            }

            match event {
                EventType::ButtonPressed(button, _) => {
                    if let Some(primary) = primary_button(button) {
                        controller.gamepad_button_down(PrimaryButtons::only(primary));
                    }
                }
                EventType::ButtonChanged(button, value, _) => {
                    if let Some(index) = button_index(button) {
                        controller.gamepad_button_value(index, value);
                    }
                }
                EventType::ButtonReleased(button, _) => {
                    if let Some(index) = button_index(button) {
                        controller.gamepad_button_value(index, 0.0);
                    }
                }
                EventType::Disconnected => {
                    warn!("Active gamepad disconnected, detaching is left to the host");
                }
                other => debug!("Unhandled event type: {:?}", other),
            }
            handled += 1;
        }
        handled
    }
}

fn pad_info(id: GamepadId, gamepad: &Gamepad<'_>) -> PadInfo {
    let vendor = gamepad.vendor_id().map(|v| format!("{:04x}", v));
    let product = gamepad.product_id().map(|p| format!("{:04x}", p));
    let mut info = PadInfo::new(identity_string(
        gamepad.name(),
        gamepad.vendor_id(),
        gamepad.product_id(),
    ))
    .with_index(usize::from(id));
    info.vendor = vendor;
    info.product = product;
    info
}

/// `"<name> (STANDARD GAMEPAD Vendor: vvvv Product: pppp)"`, or just the name when
/// the ids are unknown
pub fn identity_string(name: &str, vendor: Option<u16>, product: Option<u16>) -> String {
    match (vendor, product) {
        (Some(vendor), Some(product)) => format!(
            "{} (STANDARD GAMEPAD Vendor: {:04x} Product: {:04x})",
            name, vendor, product
        ),
        _ => name.to_string(),
    }
}

fn primary_button(button: Button) -> Option<PrimaryButton> {
    match button {
        Button::South => Some(PrimaryButton::A),
        Button::East => Some(PrimaryButton::B),
        Button::West => Some(PrimaryButton::X),
        Button::North => Some(PrimaryButton::Y),
        _ => None,
    }
}

fn button_index(button: Button) -> Option<usize> {
    match button {
        Button::South => Some(standard::FACE_SOUTH),
        Button::East => Some(standard::FACE_EAST),
        Button::West => Some(standard::FACE_WEST),
        Button::North => Some(standard::FACE_NORTH),
        Button::LeftTrigger => Some(standard::LEFT_BUMPER),
        Button::RightTrigger => Some(standard::RIGHT_BUMPER),
        Button::LeftTrigger2 => Some(standard::LEFT_TRIGGER),
        Button::RightTrigger2 => Some(standard::RIGHT_TRIGGER),
        Button::Select => Some(standard::SELECT),
        Button::Start => Some(standard::START),
        Button::LeftThumb => Some(standard::LEFT_STICK),
        Button::RightThumb => Some(standard::RIGHT_STICK),
        Button::DPadUp => Some(standard::DPAD_UP),
        Button::DPadDown => Some(standard::DPAD_DOWN),
        Button::DPadLeft => Some(standard::DPAD_LEFT),
        Button::DPadRight => Some(standard::DPAD_RIGHT),
        Button::Mode => Some(standard::GUIDE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::DUALSHOCK4_WIRELESS;

    #[test]
    fn identity_string_matches_registry_format() {
        assert_eq!(
            identity_string("Wireless Controller", Some(0x054c), Some(0x05c4)),
            DUALSHOCK4_WIRELESS
        );
        assert_eq!(identity_string("Odd Pad", None, Some(1)), "Odd Pad");
    }

    #[test]
    fn dpad_buttons_use_standard_indices() {
        assert_eq!(button_index(Button::DPadUp), Some(12));
        assert_eq!(button_index(Button::DPadDown), Some(13));
        assert_eq!(button_index(Button::DPadLeft), Some(14));
        assert_eq!(button_index(Button::DPadRight), Some(15));
    }

    #[test]
    fn face_buttons_map_to_primary_buttons() {
        assert_eq!(primary_button(Button::South), Some(PrimaryButton::A));
        assert_eq!(primary_button(Button::West), Some(PrimaryButton::X));
        assert_eq!(primary_button(Button::DPadUp), None);
    }
}
