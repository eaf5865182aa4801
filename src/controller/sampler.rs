//! Per-tick level-triggered sampling of directional input
//!
//! Every tick each held direction is published again. There is no debouncing and no
//! edge detection here; consumers needing "just pressed" semantics derive it
//! themselves.

use crate::controller::gamepad::{standard, GamepadState};
use crate::controller::keys::{KeyCode, KeyboardState};
use crate::events::EventBus;
use crate::mapping::{ButtonPress, CanonicalAction};
use tracing::{debug, warn};

/// One logical direction bound to a cursor key and a WASD-style key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionBinding {
    pub action: CanonicalAction,
    pub keys: [KeyCode; 2],
}

impl DirectionBinding {
    pub fn new(action: CanonicalAction, cursor: KeyCode, letter: KeyCode) -> Self {
        Self {
            action,
            keys: [cursor, letter],
        }
    }

    fn is_held(&self, keyboard: &dyn KeyboardState) -> bool {
        self.keys.iter().any(|key| keyboard.is_down(*key))
    }
}

/// Samples keyboard and gamepad dpad state once per host tick
#[derive(Debug, Clone)]
pub struct PollingSampler {
    // Checked in order: up, down, left, right.
    keyboard: [DirectionBinding; 4],
    // Checked in order: up, down, right, left.
    pad: [(usize, CanonicalAction); 4],
    threshold: f32,
}

impl Default for PollingSampler {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl PollingSampler {
    /// Negative or non-finite thresholds fall back to `0.0`
    pub fn new(threshold: f32) -> Self {
        let threshold = if threshold.is_finite() && threshold >= 0.0 {
            threshold
        } else {
            warn!("Invalid button threshold {}, using 0.0", threshold);
            0.0
        };
        Self {
            keyboard: [
                DirectionBinding::new(CanonicalAction::DpadUp, KeyCode::ArrowUp, KeyCode::W),
                DirectionBinding::new(CanonicalAction::DpadDown, KeyCode::ArrowDown, KeyCode::S),
                DirectionBinding::new(CanonicalAction::DpadLeft, KeyCode::ArrowLeft, KeyCode::A),
                DirectionBinding::new(CanonicalAction::DpadRight, KeyCode::ArrowRight, KeyCode::D),
            ],
            pad: [
                (standard::DPAD_UP, CanonicalAction::DpadUp),
                (standard::DPAD_DOWN, CanonicalAction::DpadDown),
                (standard::DPAD_RIGHT, CanonicalAction::DpadRight),
                (standard::DPAD_LEFT, CanonicalAction::DpadLeft),
            ],
            threshold,
        }
    }

    pub fn keyboard_bindings(&self) -> &[DirectionBinding; 4] {
        &self.keyboard
    }

    fn is_pressed(&self, value: f32) -> bool {
        value.abs() > self.threshold
    }

    /// Publishes one event per active direction and returns how many were published
    ///
    /// The gamepad branch runs only when `pad` is present and is independent of the
    /// keyboard branch, so a direction held on both sources is published twice.
    pub fn sample(
        &self,
        keyboard: &dyn KeyboardState,
        pad: Option<&dyn GamepadState>,
        bus: &EventBus,
    ) -> usize {
        let mut published = 0;

        for binding in &self.keyboard {
            if binding.is_held(keyboard) {
                bus.publish(ButtonPress::new(binding.action.clone()));
                published += 1;
            }
        }

        if let Some(pad) = pad {
            for (index, action) in &self.pad {
                if self.is_pressed(pad.button_value(*index)) {
                    bus.publish(ButtonPress::new(action.clone()));
                    published += 1;
                }
            }
        }

        if published > 0 {
            debug!("Tick sampled {} directional events", published);
        }
        published
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::gamepad::ButtonValues;
    use crate::controller::keys::HeldKeys;
    use std::sync::{Arc, Mutex};

    fn record(bus: &EventBus) -> Arc<Mutex<Vec<CanonicalAction>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        bus.subscribe_with(move |event| {
            if let Some(action) = &event.input {
                sink.lock().unwrap().push(action.clone());
            }
        });
        seen
    }

    #[test]
    fn nothing_held_publishes_nothing() {
        let bus = EventBus::new();
        let seen = record(&bus);
        let sampler = PollingSampler::default();

        assert_eq!(sampler.sample(&HeldKeys::new(), None, &bus), 0);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn cursor_and_letter_keys_are_equivalent() {
        let bus = EventBus::new();
        let seen = record(&bus);
        let sampler = PollingSampler::default();

        sampler.sample(&[KeyCode::ArrowLeft], None, &bus);
        sampler.sample(&[KeyCode::A], None, &bus);
        sampler.sample(&[KeyCode::A, KeyCode::ArrowLeft], None, &bus);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                CanonicalAction::DpadLeft,
                CanonicalAction::DpadLeft,
                CanonicalAction::DpadLeft
            ]
        );
    }

    #[test]
    fn keyboard_directions_follow_up_down_left_right_order() {
        let bus = EventBus::new();
        let seen = record(&bus);
        let sampler = PollingSampler::default();

        let held = [KeyCode::D, KeyCode::ArrowLeft, KeyCode::S, KeyCode::W];
        assert_eq!(sampler.sample(&held, None, &bus), 4);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                CanonicalAction::DpadUp,
                CanonicalAction::DpadDown,
                CanonicalAction::DpadLeft,
                CanonicalAction::DpadRight
            ]
        );
    }

    #[test]
    fn pad_directions_follow_up_down_right_left_order() {
        let bus = EventBus::new();
        let seen = record(&bus);
        let sampler = PollingSampler::default();

        let mut values = ButtonValues::default();
        values.set(standard::DPAD_LEFT, 1.0);
        values.set(standard::DPAD_RIGHT, 1.0);
        values.set(standard::DPAD_UP, 0.5);

        assert_eq!(sampler.sample(&HeldKeys::new(), Some(&values), &bus), 3);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                CanonicalAction::DpadUp,
                CanonicalAction::DpadRight,
                CanonicalAction::DpadLeft
            ]
        );
    }

    #[test]
    fn keyboard_and_pad_are_sampled_independently() {
        let bus = EventBus::new();
        let seen = record(&bus);
        let sampler = PollingSampler::default();

        let mut values = ButtonValues::default();
        values.set(standard::DPAD_UP, 1.0);

        assert_eq!(sampler.sample(&[KeyCode::W], Some(&values), &bus), 2);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![CanonicalAction::DpadUp, CanonicalAction::DpadUp]
        );
    }

    #[test]
    fn threshold_filters_small_values() {
        let bus = EventBus::new();
        let sampler = PollingSampler::new(0.5);

        let mut values = ButtonValues::default();
        values.set(standard::DPAD_DOWN, 0.3);
        assert_eq!(sampler.sample(&HeldKeys::new(), Some(&values), &bus), 0);

        values.set(standard::DPAD_DOWN, 0.8);
        assert_eq!(sampler.sample(&HeldKeys::new(), Some(&values), &bus), 1);
    }

    #[test]
    fn negative_threshold_does_not_fire_an_idle_pad() {
        let bus = EventBus::new();
        let seen = record(&bus);
        let sampler = PollingSampler::new(-1.0);

        let values = ButtonValues::default();
        assert_eq!(sampler.sample(&HeldKeys::new(), Some(&values), &bus), 0);
        assert!(seen.lock().unwrap().is_empty());
    }
}
