//! Error types for scanner device operations.
//!
//! Every failure at the device boundary maps to one of these variants. None
//! of them is fatal to the station: callers log them and continue with
//! keystroke-only input.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during scanner device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// No default scanning device is available.
    #[error("No scanner device found")]
    DeviceNotFound,

    /// Exclusive claim was refused (device busy or access denied).
    #[error("Claim denied for {device}: {reason}")]
    ClaimDenied { device: String, reason: String },

    /// Operation requires an exclusive claim that is not held.
    #[error("Device not claimed: {device}")]
    NotClaimed { device: String },

    /// Operation requires the claimed device to be enabled.
    #[error("Device not enabled: {device}")]
    NotEnabled { device: String },

    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Invalid data received from device.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },
}

impl HardwareError {
    /// Create a new claim denied error.
    pub fn claim_denied(device: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ClaimDenied {
            device: device.into(),
            reason: reason.into(),
        }
    }

    /// Create a new not claimed error.
    pub fn not_claimed(device: impl Into<String>) -> Self {
        Self::NotClaimed {
            device: device.into(),
        }
    }

    /// Create a new not enabled error.
    pub fn not_enabled(device: impl Into<String>) -> Self {
        Self::NotEnabled {
            device: device.into(),
        }
    }

    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Returns `true` if the device can no longer deliver events.
    pub fn is_disconnected(&self) -> bool {
        matches!(self, Self::Disconnected { .. })
    }
}
