//! Device session manager.
//!
//! The [`DeviceSessionManager`] is the only owner of the scanner claim. It
//! acquires the default scanner, keeps the claim against competing
//! claimants, and forwards decoded plain-digit scans into the station's
//! input channel.
//!
//! # Architecture
//!
//! Once the device is enabled it moves into a listener task. The task
//! handles both notifications and hands the device back when the session
//! is torn down, so the claim can be released.
//!
//! ```text
//! ┌─────────────┐  next_event()  ┌────────────────┐  Text    ┌─────────────┐
//! │   Scanner   │───────────────►│ Listener Task  │─────────►│ input (mpsc)│
//! └─────────────┘                └────────────────┘          └─────────────┘
//!        ▲                          │         │
//!        │      retain_device()     │         │ Opaque / Empty
//!        └──────────────────────────┘         └──────────────► log only
//!         on ReleaseRequested
//! ```
//!
//! # Failure semantics
//!
//! Every failure is logged where it happens and returned from
//! [`initialize`](DeviceSessionManager::initialize). None of them is fatal:
//! the station keeps running on keystroke input alone.
//!
//! # Examples
//!
//! ```no_run
//! use pickverify_hardware::devices::AnyScannerProvider;
//! use pickverify_hardware::mock::{MockScanner, MockScannerProvider};
//! use pickverify_hardware::session::DeviceSessionManager;
//! use pickverify_hardware::DecodedScan;
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (scanner, _handle) = MockScanner::new();
//!     let provider = AnyScannerProvider::Mock(MockScannerProvider::new(scanner));
//!     let mut session = DeviceSessionManager::new(provider);
//!
//!     let (tx, mut rx) = mpsc::channel::<DecodedScan>(16);
//!     if let Err(e) = session.initialize(tx).await {
//!         eprintln!("continuing without scanner: {e}");
//!     }
//!
//!     while let Some(scan) = rx.recv().await {
//!         println!("scanned {}", scan.text);
//!     }
//!
//!     session.teardown().await;
//! }
//! ```

use std::fmt;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::devices::{AnyScannerDevice, AnyScannerProvider};
use crate::traits::{ScannerDevice, ScannerEvent, ScannerProvider};
use crate::types::{DecodedScan, DeviceInfo, ScanPayload};
use crate::{HardwareError, Result};

/// State of the exclusive device claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClaimStatus {
    /// No device is claimed.
    #[default]
    Unclaimed,

    /// The device is claimed but not yet delivering events.
    Claimed,

    /// The device is claimed and delivering events.
    Enabled,
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unclaimed => write!(f, "Unclaimed"),
            Self::Claimed => write!(f, "Claimed"),
            Self::Enabled => write!(f, "Enabled"),
        }
    }
}

/// Running listener for an enabled device.
struct Listener {
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<AnyScannerDevice>,
}

/// Owns the exclusive scanner claim for the lifetime of the station.
pub struct DeviceSessionManager {
    provider: AnyScannerProvider,
    status: watch::Sender<ClaimStatus>,
    info: Option<DeviceInfo>,
    listener: Option<Listener>,
}

impl DeviceSessionManager {
    /// Create a session manager. No device is touched until
    /// [`initialize`](Self::initialize).
    pub fn new(provider: AnyScannerProvider) -> Self {
        let (status, _) = watch::channel(ClaimStatus::Unclaimed);

        Self {
            provider,
            status,
            info: None,
            listener: None,
        }
    }

    /// Acquire the default scanner and start forwarding its scans.
    ///
    /// Decoded plain-digit scans are sent to `sink` as [`DecodedScan`]
    /// values converted into the sink's item type. Calling this while a
    /// session is active returns the current status. A session whose
    /// device stopped delivering events is torn down and acquired again.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No default scanner exists ([`HardwareError::DeviceNotFound`])
    /// - The claim is refused
    /// - The claimed device cannot be enabled
    ///
    /// In every case the session stays unclaimed and the caller is expected
    /// to continue with keystroke input only.
    pub async fn initialize<T>(&mut self, sink: mpsc::Sender<T>) -> Result<ClaimStatus>
    where
        T: From<DecodedScan> + Send + 'static,
    {
        if self.listener.is_some() {
            let stopped = self
                .listener
                .as_ref()
                .is_some_and(|listener| listener.task.is_finished())
                || self.status() == ClaimStatus::Unclaimed;
            if !stopped {
                debug!("device session already active");
                return Ok(self.status());
            }
            debug!("previous scanner listener stopped, releasing it first");
            self.teardown().await;
        }

        let mut device = match self.provider.get_default().await {
            Ok(Some(device)) => device,
            Ok(None) => {
                warn!("no scanner found, continuing with keystroke input only");
                return Err(HardwareError::DeviceNotFound);
            }
            Err(e) => {
                warn!(error = %e, "scanner lookup failed, continuing with keystroke input only");
                return Err(e);
            }
        };

        let info = device.get_info().await?;

        if let Err(e) = device.claim().await {
            warn!(device = %info.name, error = %e, "scanner claim failed, continuing with keystroke input only");
            return Err(e);
        }
        self.status.send_replace(ClaimStatus::Claimed);
        debug!(device = %info.name, "scanner claimed");

        if let Err(e) = device.enable().await {
            warn!(device = %info.name, error = %e, "scanner enable failed, releasing claim");
            if let Err(release_error) = device.release().await {
                warn!(device = %info.name, error = %release_error, "scanner release failed");
            }
            self.status.send_replace(ClaimStatus::Unclaimed);
            return Err(e);
        }

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(Self::listen(
            device,
            sink,
            shutdown_rx,
            self.status.clone(),
        ));

        self.status.send_replace(ClaimStatus::Enabled);
        info!(device = %info.name, model = %info.model, "scanner session started");

        self.info = Some(info);
        self.listener = Some(Listener { shutdown_tx, task });

        Ok(ClaimStatus::Enabled)
    }

    /// Stop listening, release the claim and forget the device.
    ///
    /// Idempotent: tearing down an inactive session does nothing.
    pub async fn teardown(&mut self) {
        let Some(listener) = self.listener.take() else {
            debug!("device session not active, nothing to tear down");
            return;
        };

        // The task may already have stopped on its own
        let _ = listener.shutdown_tx.send(());

        match listener.task.await {
            Ok(mut device) => {
                if let Err(e) = device.release().await {
                    warn!(error = %e, "scanner release failed");
                }
            }
            Err(e) => warn!(error = %e, "scanner listener task failed"),
        }

        let name = self.info.take().map(|info| info.name).unwrap_or_default();
        self.status.send_replace(ClaimStatus::Unclaimed);
        info!(device = %name, "scanner session torn down");
    }

    /// Current claim status.
    pub fn status(&self) -> ClaimStatus {
        *self.status.borrow()
    }

    /// Watch claim status changes.
    pub fn watch_status(&self) -> watch::Receiver<ClaimStatus> {
        self.status.subscribe()
    }

    /// Information about the claimed device, if any.
    pub fn device_info(&self) -> Option<&DeviceInfo> {
        self.info.as_ref()
    }

    /// Returns `true` while the device is claimed and delivering events.
    pub fn is_active(&self) -> bool {
        self.listener.is_some() && self.status() == ClaimStatus::Enabled
    }

    async fn listen<T>(
        mut device: AnyScannerDevice,
        sink: mpsc::Sender<T>,
        mut shutdown_rx: oneshot::Receiver<()>,
        status: watch::Sender<ClaimStatus>,
    ) -> AnyScannerDevice
    where
        T: From<DecodedScan> + Send + 'static,
    {
        loop {
            let event = tokio::select! {
                _ = &mut shutdown_rx => break,
                event = device.next_event() => event,
            };

            match event {
                Ok(ScannerEvent::ReleaseRequested) => {
                    // Never release voluntarily while the station is running
                    match device.retain_device().await {
                        Ok(()) => info!("release requested by another claimant, device retained"),
                        Err(e) => warn!(error = %e, "failed to retain scanner"),
                    }
                }
                Ok(ScannerEvent::DataReceived(report)) => {
                    match ScanPayload::classify(&report) {
                        ScanPayload::Text(text) => {
                            debug!(symbology = %report.symbology, len = text.len(), "scan decoded");
                            let scan = DecodedScan {
                                text,
                                symbology: report.symbology,
                                received_at: report.received_at,
                            };
                            tokio::select! {
                                _ = &mut shutdown_rx => break,
                                sent = sink.send(T::from(scan)) => {
                                    if sent.is_err() {
                                        debug!("scan consumer closed, stopping scanner listener");
                                        break;
                                    }
                                }
                            }
                        }
                        ScanPayload::Opaque {
                            symbology,
                            hex_dump,
                        } => {
                            info!(%symbology, raw = %hex_dump, "decoded data unavailable, scan not used");
                        }
                        ScanPayload::Empty => {
                            debug!(symbology = %report.symbology, "scan report without label data");
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "scanner stopped delivering events");
                    status.send_replace(ClaimStatus::Unclaimed);
                    break;
                }
            }
        }

        device
    }
}

impl fmt::Debug for DeviceSessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceSessionManager")
            .field("status", &self.status())
            .field("info", &self.info)
            .field("listening", &self.listener.is_some())
            .finish()
    }
}

impl Drop for DeviceSessionManager {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.task.abort();
        }
    }
}
