//! Controller Handle - single entry point for a host scene
//!
//! Owns the mapping registry, the canonical event bus and the input state, and exposes
//! one method per inbound signal the host delivers.
//!
//! # Data Flow
//!
//! ```text
//! host tick ──────────► PollingSampler ─────┐
//! key down/up ────────► HeldKeys ─(edge)─► ActionDispatcher ──┤
//! pad attach ─────────► PadSlot (registry lookup)             ├──► EventBus ──► subscribers
//! pad face down ──────► ActionDispatcher (active layout) ─────┤
//! pad button value ───► ButtonValues ─(next tick)─────────────┘
//! ```
//!
//! # Threading Model
//!
//! All inbound methods take `&mut self` and publish synchronously: every subscriber has
//! been served before the method returns. The bus itself is `Clone + Send + Sync`, so
//! consumers may live on other threads or tasks.

use crate::config::{ControllerConfig, ControllerSettings};
use crate::controller::dispatcher::ActionDispatcher;
use crate::controller::gamepad::{ButtonValues, GamepadState, PadInfo, PrimaryButtons};
use crate::controller::handshake::{ConnectionStatus, PadSlot};
use crate::controller::keys::{HeldKeys, KeyCode};
use crate::controller::sampler::PollingSampler;
use crate::events::{EventBus, Subscription, SubscriptionId};
use crate::mapping::{ButtonPress, CanonicalAction, ControllerMapping, MappingRegistry};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// Input normalisation component owned by a host scene
///
/// # Examples
///
/// ```rust
/// use padcanon::{CanonicalAction, ControllerHandle, KeyCode};
///
/// let mut controller = ControllerHandle::new(None);
/// let mut events = controller.events(None);
///
/// controller.key_down(KeyCode::Space);
/// controller.key_down(KeyCode::W);
/// controller.tick();
///
/// assert!(events.try_recv().unwrap().is_idle());
/// assert_eq!(events.try_recv().unwrap().input, Some(CanonicalAction::ApadDown));
/// assert_eq!(events.try_recv().unwrap().input, Some(CanonicalAction::DpadUp));
/// ```
pub struct ControllerHandle {
    settings: ControllerSettings,
    registry: MappingRegistry,
    bus: EventBus,
    sampler: PollingSampler,
    dispatcher: ActionDispatcher,
    keys: HeldKeys,
    pad_values: ButtonValues,
    slot: PadSlot,
    status: Arc<watch::Sender<ConnectionStatus>>,
}

impl ControllerHandle {
    /// Creates a controller with the built-in device layouts
    pub fn new(settings: Option<ControllerSettings>) -> Self {
        Self::with_registry(settings, MappingRegistry::with_builtins())
    }

    /// Creates a controller using `registry` as the initial device layouts
    pub fn with_registry(settings: Option<ControllerSettings>, registry: MappingRegistry) -> Self {
        let settings = settings.unwrap_or_default();
        info!(
            "Initializing controller with settings: {:?}, {} known layouts",
            settings,
            registry.len()
        );

        let (status, _) = watch::channel(ConnectionStatus::Disconnected);
        let status = Arc::new(status);

        Self {
            sampler: PollingSampler::new(settings.button_threshold),
            dispatcher: ActionDispatcher::new(),
            bus: EventBus::new(),
            keys: HeldKeys::new(),
            pad_values: ButtonValues::default(),
            slot: PadSlot::idle(Arc::clone(&status)),
            status,
            registry,
            settings,
        }
    }

    /// Creates a controller from a loaded config; its layouts override the built-ins
    pub fn from_config(config: ControllerConfig) -> Self {
        let mut controller = Self::new(Some(config.settings));
        for entry in config.mappings {
            controller.register_mapping(entry.device_id, entry.mapping);
        }
        controller
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn registry(&self) -> &MappingRegistry {
        &self.registry
    }

    /// Adds or replaces a device layout
    ///
    /// An already active pad keeps the layout it resolved when it attached.
    pub fn register_mapping(&mut self, device_id: impl Into<String>, mapping: ControllerMapping) {
        let device_id = device_id.into();
        info!("Registering layout for {:?}", device_id);
        self.registry.register(device_id, mapping);
    }

    pub fn lookup_mapping(&self, device_id: &str) -> Option<ControllerMapping> {
        self.registry.lookup(device_id)
    }

    /// Host tick: publishes every held direction once
    pub fn tick(&mut self) -> usize {
        let pad = if self.slot.is_connected() {
            Some(&self.pad_values as &dyn GamepadState)
        } else {
            None
        };
        self.sampler.sample(&self.keys, pad, &self.bus)
    }

    /// Keyboard down callback; only the first down of a hold can fire an action
    pub fn key_down(&mut self, key: KeyCode) -> Option<CanonicalAction> {
        if !self.keys.press(key) {
            debug!("Ignoring repeated down for {:?}", key);
            return None;
        }
        self.dispatcher.key_down(key, &self.bus)
    }

    pub fn key_up(&mut self, key: KeyCode) {
        self.keys.release(key);
    }

    /// Drops all held keys, e.g. when the host window loses focus
    pub fn release_all_keys(&mut self) {
        self.keys.clear();
    }

    /// Gamepad attach callback; returns false if another pad is already active
    pub fn gamepad_connected(&mut self, pad: PadInfo) -> bool {
        let slot = std::mem::replace(&mut self.slot, PadSlot::idle(Arc::clone(&self.status)));
        let (slot, accepted) = slot.attach(pad, &self.registry);
        self.slot = slot;
        if accepted {
            self.pad_values.reset();
        }
        accepted
    }

    /// Gamepad face-button down callback
    ///
    /// Silently does nothing when no pad is active or the active pad has no layout.
    pub fn gamepad_button_down(&mut self, buttons: PrimaryButtons) -> Option<CanonicalAction> {
        self.dispatcher
            .pad_down(buttons, self.slot.mapping(), &self.bus)
    }

    /// Records the current value of a standard button of the active pad
    pub fn gamepad_button_value(&mut self, index: usize, value: f32) {
        if !self.slot.is_connected() {
            debug!("No active pad, dropping value {} for button {}", value, index);
            return;
        }
        if !self.pad_values.set(index, value) {
            debug!("Button index {} outside the standard layout", index);
        }
    }

    pub fn active_pad(&self) -> Option<&PadInfo> {
        self.slot.active().map(|pad| &pad.info)
    }

    pub fn active_mapping(&self) -> Option<&ControllerMapping> {
        self.slot.mapping()
    }

    pub fn connection_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.subscribe()
    }

    /// Shared handle to the canonical event bus
    pub fn bus(&self) -> EventBus {
        self.bus.clone()
    }

    /// Event stream; `coalesce_window_ms` collapses bursts to one event per window
    pub fn events(&self, coalesce_window_ms: Option<u32>) -> Subscription {
        self.bus.subscribe(coalesce_window_ms)
    }

    /// Event stream coalesced with the configured window
    pub fn throttled_events(&self) -> Subscription {
        self.bus.subscribe(Some(self.settings.coalesce_window_ms))
    }

    pub fn subscribe_with<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ButtonPress) + Send + Sync + 'static,
    {
        self.bus.subscribe_with(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }
}

impl Default for ControllerHandle {
    fn default() -> Self {
        Self::new(None)
    }
}
