//! Core constants for the pick-and-verify station.
//!
//! This module defines the fixed values every crate in the workspace agrees on:
//! the two expected codes of the verification workflow, the raw-scan control
//! characters the extractor rewrites, and the timing of the scan buffer.
//!
//! # Scan Input Structure
//!
//! A keystroke-style scanner "types" its label followed by a carriage return:
//!
//! ```text
//! 5QCPCM0QW<CR>
//! ^^^^^^^^^ ^^^^
//! payload   terminator
//! ```
//!
//! Unmapped keys (such as Shift) arrive as NUL, so punctuation that needs a
//! modifier shows up as a two-character sequence in the raw buffer:
//!
//! | Raw sequence | Meaning | Rewritten to |
//! |--------------|---------|--------------|
//! | NUL `;` | shifted semicolon | `:` |
//! | `0x03` | label prefix marker | `#` |
//! | NUL | unmapped key | removed |
//!
//! # Usage
//!
//! ```
//! use pickverify_core::constants::*;
//! use std::time::Duration;
//!
//! assert_eq!(IDENTITY_CODE, "5QCPCM0QW");
//! assert_eq!(BOX_LABEL_CODE, "123456");
//!
//! let idle = Duration::from_millis(DEFAULT_IDLE_TIMEOUT_MS);
//! assert_eq!(idle, Duration::from_secs(1));
//! ```

// ============================================================================
// Workflow Codes
// ============================================================================

/// Expected stage-1 code (the operator's teach/identity code).
///
/// Scanning this code from `New` or `Invalid` confirms stage 1.
pub const IDENTITY_CODE: &str = "5QCPCM0QW";

/// Expected stage-2 code (the box label).
///
/// Scanning this code from `Success` or `SuccessInvalid` completes the pick.
pub const BOX_LABEL_CODE: &str = "123456";

// ============================================================================
// Raw Scan Characters
// ============================================================================

/// End-of-scan marker (carriage return, 0x0D).
pub const TERMINATOR: char = '\r';

/// NUL character produced by keys without a character mapping.
pub const NUL: char = '\0';

/// Control character (0x03) that the extractor rewrites to [`CODE_SEPARATOR`].
pub const SEPARATOR_CONTROL: char = '\u{3}';

/// Separator between a label prefix and the code itself.
///
/// # Examples
///
/// ```
/// use pickverify_core::constants::CODE_SEPARATOR;
///
/// let parts: Vec<&str> = "AB#CD".split(CODE_SEPARATOR).collect();
/// assert_eq!(parts, vec!["AB", "CD"]);
/// ```
pub const CODE_SEPARATOR: char = '#';

/// Replacement for a NUL followed by `;`.
pub const COLON: char = ':';

// ============================================================================
// Timing
// ============================================================================

/// Idle interval after which a partial scan is discarded (milliseconds).
///
/// # Value: 1000ms (1 second)
///
/// A scanner emits all characters of one label in a quick burst, so a gap
/// this long means the operator stopped typing or the scan was cut off.
pub const DEFAULT_IDLE_TIMEOUT_MS: u64 = 1000;

// ============================================================================
// Diagnostics
// ============================================================================

/// Number of payload bytes printed in a diagnostic hex dump.
pub const HEX_DUMP_MAX_BYTES: usize = 20;

/// Marker appended to a hex dump that was cut at [`HEX_DUMP_MAX_BYTES`].
pub const HEX_DUMP_TRUNCATION_MARKER: &str = "...";

/// Text shown for a report without any payload.
pub const NO_DATA: &str = "No data";

// ============================================================================
// Channels
// ============================================================================

/// Capacity of the station's serialized event channel.
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 64;

/// Capacity of the feedback broadcast channel.
///
/// Slow subscribers that fall further behind than this miss signals
/// (they observe a `Lagged` error) instead of stalling the station.
pub const DEFAULT_FEEDBACK_CHANNEL_CAPACITY: usize = 16;
