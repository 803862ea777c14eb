//! Enum wrappers for scanner dispatch.
//!
//! Native `async fn` in traits is not object-safe, so `Box<dyn ScannerDevice>`
//! is not available. These enums provide concrete dispatch instead, with one
//! variant per backend.
//!
//! # Examples
//!
//! ```
//! use pickverify_hardware::devices::AnyScannerDevice;
//! use pickverify_hardware::mock::MockScanner;
//!
//! let (scanner, _handle) = MockScanner::new();
//! let any_scanner = AnyScannerDevice::Mock(scanner);
//! ```

use crate::mock::{MockScanner, MockScannerProvider};
use crate::traits::{ScannerDevice, ScannerEvent, ScannerProvider};
use crate::{DeviceInfo, Result};

/// Enum wrapper for scanner device dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyScannerDevice {
    /// Mock scanner for development and testing.
    Mock(MockScanner),
}

impl ScannerDevice for AnyScannerDevice {
    async fn claim(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.claim().await,
        }
    }

    async fn enable(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.enable().await,
        }
    }

    async fn next_event(&mut self) -> Result<ScannerEvent> {
        match self {
            Self::Mock(device) => device.next_event().await,
        }
    }

    async fn retain_device(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.retain_device().await,
        }
    }

    async fn release(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.release().await,
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Mock(device) => device.get_info().await,
        }
    }
}

/// Enum wrapper for scanner provider dispatch.
///
/// # Examples
///
/// ```
/// use pickverify_hardware::devices::AnyScannerProvider;
/// use pickverify_hardware::traits::ScannerProvider;
/// use pickverify_hardware::mock::MockScannerProvider;
///
/// #[tokio::main]
/// async fn main() -> pickverify_hardware::Result<()> {
///     let provider = AnyScannerProvider::Mock(MockScannerProvider::empty());
///     assert!(provider.get_default().await?.is_none());
///     Ok(())
/// }
/// ```
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyScannerProvider {
    /// Mock provider for development and testing.
    Mock(MockScannerProvider),
}

impl ScannerProvider for AnyScannerProvider {
    type Device = AnyScannerDevice;

    async fn get_default(&self) -> Result<Option<AnyScannerDevice>> {
        match self {
            Self::Mock(provider) => Ok(provider.get_default().await?.map(AnyScannerDevice::Mock)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_any_scanner_device_mock() {
        let (scanner, _handle) = MockScanner::new();
        let any_scanner = AnyScannerDevice::Mock(scanner);

        let info = any_scanner.get_info().await.unwrap();
        assert_eq!(info.name, "Mock Scanner");
    }

    #[tokio::test]
    async fn test_any_scanner_provider_mock() {
        let (scanner, _handle) = MockScanner::new();
        let provider = AnyScannerProvider::Mock(MockScannerProvider::new(scanner));

        let device = provider.get_default().await.unwrap();
        assert!(matches!(device, Some(AnyScannerDevice::Mock(_))));
    }

    #[tokio::test]
    async fn test_any_scanner_provider_empty() {
        let provider = AnyScannerProvider::Mock(MockScannerProvider::empty());
        assert!(provider.get_default().await.unwrap().is_none());
    }
}
