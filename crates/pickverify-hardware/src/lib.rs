//! Scanner device abstraction layer for the pick-and-verify station.
//!
//! This crate provides trait-based abstractions for the barcode scanner that
//! feeds the station, the report types it delivers, and the
//! [`DeviceSessionManager`] that owns the scanner's exclusive claim.
//!
//! # Design Philosophy
//!
//! - **Async-first**: All I/O operations are asynchronous using native `async fn`
//!   in traits (Edition 2024).
//! - **Enum dispatch**: Concrete backends are selected through
//!   [`devices::AnyScannerDevice`] rather than trait objects.
//! - **Non-fatal failures**: A missing or busy scanner is reported as a
//!   [`HardwareError`] and logged; it never stops the station.
//!
//! # Scanner Reports
//!
//! Only symbologies that encode plain digits are read as text:
//!
//! ```
//! use pickverify_hardware::{ScanPayload, ScanReport, Symbology};
//!
//! let report = ScanReport::new(Symbology::Upca, "123456");
//! assert_eq!(ScanPayload::classify(&report), ScanPayload::Text("123456".into()));
//!
//! let report = ScanReport::new(Symbology::DataMatrix, vec![0x00, 0xFF]);
//! assert_eq!(
//!     ScanPayload::classify(&report).describe(),
//!     "Decoded data unavailable. Raw label data: 00 FF "
//! );
//! ```
//!
//! # Mock Implementations
//!
//! [`mock::MockScanner`] simulates a scanner for development and testing
//! without physical hardware.

pub mod devices;
pub mod error;
pub mod mock;
pub mod session;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{HardwareError, Result};
pub use session::{ClaimStatus, DeviceSessionManager};
pub use traits::{ScannerDevice, ScannerEvent, ScannerProvider};
pub use types::{DecodedScan, DeviceInfo, ScanPayload, ScanReport, Symbology};
