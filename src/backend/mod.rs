//! Input backends that feed a [`crate::ControllerHandle`] from real devices

pub mod gilrs_pad;

pub use gilrs_pad::GilrsBackend;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Failed to initialize input backend: {0}")]
    InitializationError(String),
}
