//! Mock device implementations for testing and development.
//!
//! These implementations simulate hardware behavior without requiring
//! physical devices, making them suitable for testing and development.

pub mod scanner;

pub use scanner::{MockScanner, MockScannerHandle, MockScannerProvider, MockScannerStatus};
