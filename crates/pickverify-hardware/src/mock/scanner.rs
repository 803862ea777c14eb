//! Mock barcode scanner implementation for testing and development.
//!
//! This module provides a simulated scanner that can be controlled
//! programmatically: reports and release requests are injected through a
//! [`MockScannerHandle`], and the claim state is observable from it.
//!
//! Clones of a [`MockScanner`] are handles to the same simulated device, so
//! the exclusive claim is shared between them, as it is for a real scanner
//! opened twice.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use tokio::sync::{Mutex, mpsc, watch};

use crate::traits::{ScannerDevice, ScannerEvent};
use crate::types::{DeviceInfo, ScanReport, Symbology};
use crate::{HardwareError, Result};

/// Default name of the mock scanner.
const DEFAULT_NAME: &str = "Mock Scanner";

/// Model string reported by the mock scanner.
const MOCK_MODEL: &str = "MOCK-SCANNER-1";

/// Capacity of the injected event queue.
const EVENT_QUEUE_CAPACITY: usize = 32;

/// Claim state of the simulated device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MockScannerStatus {
    /// An exclusive claim is held.
    pub claimed: bool,

    /// The device delivers events.
    pub enabled: bool,

    /// Number of times the claim was retained after a release request.
    pub retain_count: u32,
}

#[derive(Debug)]
struct Shared {
    name: String,
    events: Mutex<mpsc::Receiver<ScannerEvent>>,
    status: watch::Sender<MockScannerStatus>,
    deny_claim: AtomicBool,
}

impl Shared {
    fn status(&self) -> MockScannerStatus {
        *self.status.borrow()
    }
}

/// Mock barcode scanner for testing and development.
///
/// # Examples
///
/// ```
/// use pickverify_hardware::mock::MockScanner;
/// use pickverify_hardware::traits::{ScannerDevice, ScannerEvent};
/// use pickverify_hardware::Symbology;
///
/// #[tokio::main]
/// async fn main() -> pickverify_hardware::Result<()> {
///     let (mut scanner, handle) = MockScanner::new();
///
///     scanner.claim().await?;
///     scanner.enable().await?;
///
///     handle.scan(Symbology::Upca, "123456").await?;
///
///     let event = scanner.next_event().await?;
///     assert!(matches!(event, ScannerEvent::DataReceived(_)));
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MockScanner {
    shared: Arc<Shared>,
}

impl MockScanner {
    /// Create a new mock scanner with the default name.
    ///
    /// Returns the scanner and a handle to drive it.
    pub fn new() -> (Self, MockScannerHandle) {
        Self::with_name(DEFAULT_NAME)
    }

    /// Create a new mock scanner with a custom name.
    ///
    /// # Examples
    ///
    /// ```
    /// use pickverify_hardware::mock::MockScanner;
    ///
    /// let (scanner, handle) = MockScanner::with_name("Dock Scanner");
    /// assert_eq!(handle.name(), "Dock Scanner");
    /// ```
    pub fn with_name(name: impl Into<String>) -> (Self, MockScannerHandle) {
        let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let (status, _) = watch::channel(MockScannerStatus::default());

        let shared = Arc::new(Shared {
            name: name.into(),
            events: Mutex::new(event_rx),
            status,
            deny_claim: AtomicBool::new(false),
        });

        let handle = MockScannerHandle {
            event_tx,
            shared: Arc::clone(&shared),
        };

        (Self { shared }, handle)
    }

    /// Current claim state.
    pub fn status(&self) -> MockScannerStatus {
        self.shared.status()
    }

    fn name(&self) -> &str {
        &self.shared.name
    }
}

impl ScannerDevice for MockScanner {
    async fn claim(&mut self) -> Result<()> {
        if self.shared.deny_claim.load(Ordering::SeqCst) {
            return Err(HardwareError::claim_denied(
                self.name(),
                "claimed by another process",
            ));
        }

        if self.status().claimed {
            return Err(HardwareError::claim_denied(self.name(), "already claimed"));
        }

        self.shared.status.send_modify(|status| status.claimed = true);
        Ok(())
    }

    async fn enable(&mut self) -> Result<()> {
        if !self.status().claimed {
            return Err(HardwareError::not_claimed(self.name()));
        }

        self.shared.status.send_modify(|status| status.enabled = true);
        Ok(())
    }

    async fn next_event(&mut self) -> Result<ScannerEvent> {
        if !self.status().enabled {
            return Err(HardwareError::not_enabled(self.name()));
        }

        let mut events = self.shared.events.lock().await;
        events
            .recv()
            .await
            .ok_or_else(|| HardwareError::disconnected(self.name()))
    }

    async fn retain_device(&mut self) -> Result<()> {
        if !self.status().claimed {
            return Err(HardwareError::not_claimed(self.name()));
        }

        self.shared
            .status
            .send_modify(|status| status.retain_count += 1);
        Ok(())
    }

    async fn release(&mut self) -> Result<()> {
        self.shared.status.send_modify(|status| {
            status.claimed = false;
            status.enabled = false;
        });
        Ok(())
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.name(), MOCK_MODEL))
    }
}

/// Handle for controlling a mock scanner.
///
/// # Examples
///
/// ```
/// use pickverify_hardware::mock::MockScanner;
/// use pickverify_hardware::Symbology;
///
/// #[tokio::main]
/// async fn main() -> pickverify_hardware::Result<()> {
///     let (_scanner, handle) = MockScanner::new();
///
///     handle.scan(Symbology::Ean8, "12345670").await?;
///     handle.request_release().await?;
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MockScannerHandle {
    event_tx: mpsc::Sender<ScannerEvent>,
    shared: Arc<Shared>,
}

impl MockScannerHandle {
    /// Deliver a complete report to the scanner.
    ///
    /// # Errors
    ///
    /// Returns an error if the scanner has been dropped.
    pub async fn send_report(&self, report: ScanReport) -> Result<()> {
        self.send(ScannerEvent::DataReceived(report)).await
    }

    /// Simulate scanning a label of the given symbology.
    ///
    /// # Errors
    ///
    /// Returns an error if the scanner has been dropped.
    pub async fn scan(&self, symbology: Symbology, label: impl Into<Bytes>) -> Result<()> {
        self.send_report(ScanReport::new(symbology, label)).await
    }

    /// Simulate another process asking for the device.
    ///
    /// # Errors
    ///
    /// Returns an error if the scanner has been dropped.
    pub async fn request_release(&self) -> Result<()> {
        self.send(ScannerEvent::ReleaseRequested).await
    }

    /// Make subsequent claims fail.
    pub fn set_deny_claim(&self, deny: bool) {
        self.shared.deny_claim.store(deny, Ordering::SeqCst);
    }

    /// Current claim state.
    pub fn status(&self) -> MockScannerStatus {
        self.shared.status()
    }

    /// Watch claim state changes.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pickverify_hardware::mock::MockScannerHandle;
    /// # async fn example(handle: MockScannerHandle) {
    /// let mut status = handle.watch_status();
    /// status.wait_for(|s| s.retain_count > 0).await.ok();
    /// # }
    /// ```
    pub fn watch_status(&self) -> watch::Receiver<MockScannerStatus> {
        self.shared.status.subscribe()
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    async fn send(&self, event: ScannerEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| HardwareError::disconnected(self.name()))
    }
}

/// Mock provider that reports at most one default scanner.
#[derive(Debug, Default)]
pub struct MockScannerProvider {
    scanner: Option<MockScanner>,
}

impl MockScannerProvider {
    /// Provider whose default scanner is `scanner`.
    pub fn new(scanner: MockScanner) -> Self {
        Self {
            scanner: Some(scanner),
        }
    }

    /// Provider with no scanner attached.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Query for the default scanner.
    ///
    /// Each call returns a new handle to the same simulated device.
    pub async fn get_default(&self) -> Result<Option<MockScanner>> {
        Ok(self.scanner.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn enabled_scanner() -> (MockScanner, MockScannerHandle) {
        let (mut scanner, handle) = MockScanner::new();
        scanner.claim().await.unwrap();
        scanner.enable().await.unwrap();
        (scanner, handle)
    }

    #[tokio::test]
    async fn test_mock_scanner_claim_and_enable() {
        let (mut scanner, handle) = MockScanner::new();
        assert_eq!(handle.status(), MockScannerStatus::default());

        scanner.claim().await.unwrap();
        assert!(handle.status().claimed);
        assert!(!handle.status().enabled);

        scanner.enable().await.unwrap();
        assert!(handle.status().enabled);
    }

    #[tokio::test]
    async fn test_mock_scanner_enable_requires_claim() {
        let (mut scanner, _handle) = MockScanner::new();
        let result = scanner.enable().await;
        assert!(matches!(result, Err(HardwareError::NotClaimed { .. })));
    }

    #[tokio::test]
    async fn test_mock_scanner_next_event_requires_enable() {
        let (mut scanner, _handle) = MockScanner::new();
        scanner.claim().await.unwrap();

        let result = scanner.next_event().await;
        assert!(matches!(result, Err(HardwareError::NotEnabled { .. })));
    }

    #[tokio::test]
    async fn test_mock_scanner_deny_claim() {
        let (mut scanner, handle) = MockScanner::new();
        handle.set_deny_claim(true);

        let result = scanner.claim().await;
        assert!(matches!(result, Err(HardwareError::ClaimDenied { .. })));
        assert!(!handle.status().claimed);

        handle.set_deny_claim(false);
        scanner.claim().await.unwrap();
    }

    #[tokio::test]
    async fn test_mock_scanner_claim_is_exclusive_across_clones() {
        let (mut scanner, _handle) = MockScanner::new();
        let mut other = scanner.clone();

        scanner.claim().await.unwrap();
        assert!(matches!(
            other.claim().await,
            Err(HardwareError::ClaimDenied { .. })
        ));

        scanner.release().await.unwrap();
        other.claim().await.unwrap();
    }

    #[tokio::test]
    async fn test_mock_scanner_delivers_reports_in_order() {
        let (mut scanner, handle) = enabled_scanner().await;

        handle.scan(Symbology::Upca, "123456").await.unwrap();
        handle.scan(Symbology::Qr, vec![0x01, 0x02]).await.unwrap();

        let ScannerEvent::DataReceived(first) = scanner.next_event().await.unwrap() else {
            panic!("expected a report");
        };
        assert_eq!(first.symbology, Symbology::Upca);

        let ScannerEvent::DataReceived(second) = scanner.next_event().await.unwrap() else {
            panic!("expected a report");
        };
        assert_eq!(second.symbology, Symbology::Qr);
    }

    #[tokio::test]
    async fn test_mock_scanner_release_request_and_retain() {
        let (mut scanner, handle) = enabled_scanner().await;

        handle.request_release().await.unwrap();
        assert_eq!(
            scanner.next_event().await.unwrap(),
            ScannerEvent::ReleaseRequested
        );

        scanner.retain_device().await.unwrap();
        let status = handle.status();
        assert!(status.claimed);
        assert_eq!(status.retain_count, 1);
    }

    #[tokio::test]
    async fn test_mock_scanner_retain_requires_claim() {
        let (mut scanner, _handle) = MockScanner::new();
        assert!(matches!(
            scanner.retain_device().await,
            Err(HardwareError::NotClaimed { .. })
        ));
    }

    #[tokio::test]
    async fn test_mock_scanner_release_is_idempotent() {
        let (mut scanner, handle) = enabled_scanner().await;

        scanner.release().await.unwrap();
        scanner.release().await.unwrap();

        assert!(!handle.status().claimed);
        assert!(!handle.status().enabled);
    }

    #[tokio::test]
    async fn test_mock_scanner_disconnects_when_handle_dropped() {
        let (mut scanner, handle) = enabled_scanner().await;
        drop(handle);

        let result = scanner.next_event().await;
        assert!(matches!(result, Err(HardwareError::Disconnected { .. })));
    }

    #[tokio::test]
    async fn test_mock_scanner_get_info() {
        let (scanner, _handle) = MockScanner::with_name("Dock Scanner");

        let info = scanner.get_info().await.unwrap();
        assert_eq!(info.name, "Dock Scanner");
        assert_eq!(info.model, "MOCK-SCANNER-1");
    }

    #[tokio::test]
    async fn test_mock_provider_returns_same_device() {
        let (scanner, handle) = MockScanner::new();
        let provider = MockScannerProvider::new(scanner);

        let mut first = provider.get_default().await.unwrap().unwrap();
        first.claim().await.unwrap();

        let second = provider.get_default().await.unwrap().unwrap();
        assert!(second.status().claimed);
        assert!(handle.status().claimed);
    }
}
