//! Edge-triggered action dispatch
//!
//! Two independent binding sets:
//!
//! 1. a hard-wired keyboard table (action pad + shoulders), never routed through the
//!    mapping registry
//! 2. the active pad's face buttons, translated through its resolved layout
//!
//! Both fire once per down transition. Repeat suppression for the keyboard is done
//! by the caller (see [`crate::controller::keys::HeldKeys::press`]).

use crate::controller::gamepad::PrimaryButtons;
use crate::controller::keys::KeyCode;
use crate::events::EventBus;
use crate::mapping::{ButtonPress, CanonicalAction, ControllerMapping};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ActionDispatcher {
    key_actions: HashMap<KeyCode, CanonicalAction>,
}

impl Default for ActionDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionDispatcher {
    pub fn new() -> Self {
        let key_actions = HashMap::from([
            (KeyCode::P, CanonicalAction::ApadUp),
            (KeyCode::Space, CanonicalAction::ApadDown),
            (KeyCode::M, CanonicalAction::ApadLeft),
            (KeyCode::C, CanonicalAction::ApadRight),
            (KeyCode::Q, CanonicalAction::L1),
            (KeyCode::E, CanonicalAction::R1),
            (KeyCode::Num1, CanonicalAction::L2),
            (KeyCode::Num3, CanonicalAction::R2),
        ]);
        Self { key_actions }
    }

    pub fn key_action(&self, key: KeyCode) -> Option<&CanonicalAction> {
        self.key_actions.get(&key)
    }

    /// Publishes the action bound to `key`, if any
    pub fn key_down(&self, key: KeyCode, bus: &EventBus) -> Option<CanonicalAction> {
        let action = self.key_actions.get(&key)?.clone();
        debug!("Key {:?} down -> {}", key, action);
        bus.publish(ButtonPress::new(action.clone()));
        Some(action)
    }

    /// Translates a face-button report through `mapping` and publishes one action
    ///
    /// When several face buttons are flagged only the highest priority one (A, B, X,
    /// Y) is published. Without a mapping nothing is published.
    pub fn pad_down(
        &self,
        buttons: PrimaryButtons,
        mapping: Option<&ControllerMapping>,
        bus: &EventBus,
    ) -> Option<CanonicalAction> {
        let mapping = mapping?;
        let button = buttons.resolve()?;
        let action = mapping.primary(button).clone();
        debug!("Pad button {:?} down -> {}", button, action);
        bus.publish(ButtonPress::new(action.clone()));
        Some(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{MappingRegistry, PrimaryButton, DUALSHOCK4_WIRELESS};

    #[test]
    fn keyboard_table_covers_action_pad_and_shoulders() {
        let dispatcher = ActionDispatcher::new();
        let expected = [
            (KeyCode::P, CanonicalAction::ApadUp),
            (KeyCode::Space, CanonicalAction::ApadDown),
            (KeyCode::M, CanonicalAction::ApadLeft),
            (KeyCode::C, CanonicalAction::ApadRight),
            (KeyCode::Q, CanonicalAction::L1),
            (KeyCode::E, CanonicalAction::R1),
            (KeyCode::Num1, CanonicalAction::L2),
            (KeyCode::Num3, CanonicalAction::R2),
        ];
        for (key, action) in expected {
            assert_eq!(dispatcher.key_action(key), Some(&action));
        }
        assert_eq!(dispatcher.key_action(KeyCode::W), None);
    }

    #[test]
    fn unbound_key_publishes_nothing() {
        let bus = EventBus::new();
        let dispatcher = ActionDispatcher::new();
        assert_eq!(dispatcher.key_down(KeyCode::Z, &bus), None);
        assert!(bus.latest().is_idle());
    }

    #[test]
    fn pad_down_uses_mapping_and_priority() {
        let bus = EventBus::new();
        let dispatcher = ActionDispatcher::new();
        let mapping = MappingRegistry::with_builtins()
            .lookup(DUALSHOCK4_WIRELESS)
            .unwrap();

        let both = PrimaryButtons::only(PrimaryButton::B).with(PrimaryButton::A);
        assert_eq!(
            dispatcher.pad_down(both, Some(&mapping), &bus),
            Some(CanonicalAction::ApadDown)
        );
        assert_eq!(bus.latest(), ButtonPress::new(CanonicalAction::ApadDown));
    }

    #[test]
    fn pad_down_without_mapping_is_silent() {
        let bus = EventBus::new();
        let dispatcher = ActionDispatcher::new();
        let pressed = PrimaryButtons::only(PrimaryButton::A);
        assert_eq!(dispatcher.pad_down(pressed, None, &bus), None);
        assert!(bus.latest().is_idle());
    }
}
