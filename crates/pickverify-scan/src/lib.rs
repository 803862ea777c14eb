//! Scan input pipeline for the pick-and-verify station.
//!
//! Raw scan data reaches the station as a burst of keystroke-like characters.
//! This crate turns that burst into a clean code:
//!
//! ```text
//! KeyEvent ──keymap──► char ──ScanBuffer──► raw String ──extract──► Option<ScanCode>
//!                                │
//!                                └── idle timeout: partial scan discarded
//! ```
//!
//! - [`keymap`]: virtual-key to character translation and Escape detection
//! - [`buffer`]: accumulation, terminator detection, idle deadline
//! - [`extractor`]: raw buffer to code rules

pub mod buffer;
pub mod extractor;
pub mod keymap;

pub use buffer::{BufferState, PushOutcome, ScanBuffer};
pub use extractor::{extract, strip_terminator};
pub use keymap::{KeyEvent, translate_virtual_key};
