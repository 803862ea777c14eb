//! Scanner device trait definitions.
//!
//! These traits are the contract between the device session and a scanning
//! device, so mock and real scanners can be swapped freely. The shape
//! follows the claim model of point-of-service scanners:
//!
//! ```text
//! get_default() ──► claim() ──► enable() ──► next_event() ...
//!                     │                         │
//!                     │                         ├─ DataReceived(report)
//!                     │                         └─ ReleaseRequested ──► retain_device()
//!                     └──────────────── release() ◄─── teardown
//! ```
//!
//! All traits use native `async fn` methods (Edition 2024), so they are not
//! object-safe. Use the enum wrappers in [`devices`](crate::devices) for
//! concrete dispatch.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::types::{DeviceInfo, ScanReport};

/// Notification delivered by an enabled scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScannerEvent {
    /// A scan was decoded.
    DataReceived(ScanReport),

    /// Another process asked for the claimed device.
    ReleaseRequested,
}

/// Source of scanning devices.
pub trait ScannerProvider: Send + Sync {
    /// Device type this provider hands out.
    type Device: ScannerDevice;

    /// Query for the default scanner.
    ///
    /// Returns `Ok(None)` when no scanner is attached.
    ///
    /// # Errors
    ///
    /// Returns an error if the device enumeration itself fails.
    async fn get_default(&self) -> Result<Option<Self::Device>>;
}

/// Scanning device abstraction.
///
/// # Examples
///
/// ```no_run
/// use pickverify_hardware::traits::{ScannerDevice, ScannerEvent};
/// use pickverify_hardware::error::Result;
///
/// async fn first_report<S: ScannerDevice>(scanner: &mut S) -> Result<()> {
///     scanner.claim().await?;
///     scanner.enable().await?;
///
///     loop {
///         match scanner.next_event().await? {
///             ScannerEvent::DataReceived(report) => {
///                 println!("{:?}", report.symbology);
///                 return Ok(());
///             }
///             ScannerEvent::ReleaseRequested => scanner.retain_device().await?,
///             _ => {}
///         }
///     }
/// }
/// ```
pub trait ScannerDevice: Send + Sync {
    /// Claim the device for exclusive use.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::ClaimDenied`](crate::HardwareError::ClaimDenied)
    /// if the device is busy or access is refused.
    async fn claim(&mut self) -> Result<()>;

    /// Enable the claimed device so it starts delivering events.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is not claimed.
    async fn enable(&mut self) -> Result<()>;

    /// Wait for the next notification from the enabled device.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The device is not enabled
    /// - The device is disconnected
    async fn next_event(&mut self) -> Result<ScannerEvent>;

    /// Keep the claim after a release request.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is not claimed.
    async fn retain_device(&mut self) -> Result<()>;

    /// Disable the device and give up the claim.
    ///
    /// Releasing an unclaimed device is a no-op.
    async fn release(&mut self) -> Result<()>;

    /// Get device information.
    async fn get_info(&self) -> Result<DeviceInfo>;
}
