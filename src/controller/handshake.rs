//! Gamepad attach handshake with statum state machine
//!
//! ```text
//! Disconnected ──(attach)──► Connected(ActivePad)
//! ```
//!
//! Only the first attached pad is tracked. There is no way back to `Disconnected`;
//! detaching is left to the host.

use crate::controller::gamepad::PadInfo;
use crate::mapping::{ControllerMapping, MappingRegistry};
use chrono::{DateTime, Local};
use statum::{machine, state};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// Observable connection status
///
/// `mapped == false` means a pad is attached but no layout is registered for it, so
/// its face buttons produce no canonical events.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connected {
        device_id: String,
        mapped: bool,
        since: DateTime<Local>,
    },
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected { .. })
    }

    pub fn is_missing_mapping(&self) -> bool {
        matches!(self, ConnectionStatus::Connected { mapped: false, .. })
    }
}

// Pad captured at attach time, plus the layout resolved for it.
#[derive(Debug, Clone)]
pub struct ActivePad {
    pub info: PadInfo,
    pub mapping: Option<ControllerMapping>,
}

#[state]
#[derive(Debug, Clone)]
pub enum LinkState {
    Disconnected,
    Connected(ActivePad),
}

#[machine]
#[derive(Debug)]
pub struct PadLink<S: LinkState> {
    status: Arc<watch::Sender<ConnectionStatus>>,
}

impl PadLink<Disconnected> {
    pub fn create(status: Arc<watch::Sender<ConnectionStatus>>) -> Self {
        Self::new(status)
    }

    /// Captures `pad`, resolves its layout and transitions to `Connected`
    pub fn connect(self, pad: PadInfo, registry: &MappingRegistry) -> PadLink<Connected> {
        let mapping = registry.lookup(&pad.id);
        match &mapping {
            Some(_) => info!("Gamepad connected: {:?} (index {})", pad.id, pad.index),
            None => warn!(
                "Gamepad connected without a registered layout: {:?}, face buttons will be ignored",
                pad.id
            ),
        }

        self.status.send_replace(ConnectionStatus::Connected {
            device_id: pad.id.clone(),
            mapped: mapping.is_some(),
            since: Local::now(),
        });

        self.transition_with(ActivePad { info: pad, mapping })
    }
}

impl PadLink<Connected> {
    pub fn active(&self) -> Option<&ActivePad> {
        self.get_state_data()
    }
}

/// Current position of the handshake, owned by the controller
#[derive(Debug)]
pub enum PadSlot {
    Idle(PadLink<Disconnected>),
    Active(PadLink<Connected>),
}

impl PadSlot {
    pub fn idle(status: Arc<watch::Sender<ConnectionStatus>>) -> Self {
        PadSlot::Idle(PadLink::create(status))
    }

    /// Runs the handshake for `pad`; a second pad is ignored
    ///
    /// Returns the new slot and whether `pad` became the active pad.
    pub fn attach(self, pad: PadInfo, registry: &MappingRegistry) -> (Self, bool) {
        match self {
            PadSlot::Idle(link) => (PadSlot::Active(link.connect(pad, registry)), true),
            PadSlot::Active(link) => {
                warn!(
                    "Ignoring gamepad {:?}, a pad is already active",
                    pad.id
                );
                (PadSlot::Active(link), false)
            }
        }
    }

    pub fn active(&self) -> Option<&ActivePad> {
        match self {
            PadSlot::Idle(_) => None,
            PadSlot::Active(link) => link.active(),
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, PadSlot::Active(_))
    }

    pub fn mapping(&self) -> Option<&ControllerMapping> {
        self.active().and_then(|pad| pad.mapping.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{CanonicalAction, GENERIC_USB_JOYSTICK};

    fn status_channel() -> (Arc<watch::Sender<ConnectionStatus>>, watch::Receiver<ConnectionStatus>) {
        let (tx, rx) = watch::channel(ConnectionStatus::Disconnected);
        (Arc::new(tx), rx)
    }

    #[test]
    fn attach_resolves_mapping_and_reports_status() {
        let (tx, rx) = status_channel();
        let registry = MappingRegistry::with_builtins();

        let (slot, accepted) = PadSlot::idle(tx).attach(PadInfo::new(GENERIC_USB_JOYSTICK), &registry);
        assert!(accepted);
        assert!(slot.is_connected());
        assert_eq!(slot.mapping().map(|m| &m.a), Some(&CanonicalAction::ApadUp));

        let status = rx.borrow().clone();
        assert!(status.is_connected());
        assert!(!status.is_missing_mapping());
    }

    #[test]
    fn unmapped_pad_connects_without_mapping() {
        let (tx, rx) = status_channel();
        let registry = MappingRegistry::with_builtins();

        let (slot, accepted) = PadSlot::idle(tx).attach(PadInfo::new("Mystery Pad"), &registry);
        assert!(accepted);
        assert!(slot.mapping().is_none());
        assert_eq!(slot.active().map(|pad| pad.info.id.as_str()), Some("Mystery Pad"));
        assert!(rx.borrow().is_missing_mapping());
    }

    #[test]
    fn second_pad_is_ignored() {
        let (tx, _rx) = status_channel();
        let registry = MappingRegistry::with_builtins();

        let (slot, _) = PadSlot::idle(tx).attach(PadInfo::new(GENERIC_USB_JOYSTICK), &registry);
        let (slot, accepted) = slot.attach(PadInfo::new("Mystery Pad").with_index(1), &registry);

        assert!(!accepted);
        assert_eq!(
            slot.active().map(|pad| pad.info.id.as_str()),
            Some(GENERIC_USB_JOYSTICK)
        );
        assert!(slot.mapping().is_some());
    }
}
