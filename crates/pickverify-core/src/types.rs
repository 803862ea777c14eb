use serde::{Deserialize, Serialize};
use std::fmt;

/// A code produced by the extractor from one raw scan.
///
/// Blank raw input never becomes a `ScanCode` (it is represented by `None`),
/// but a code may still be empty when the raw input was a bare prefix such as
/// `"AB#"`. Such a code is a present, non-matching code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanCode(String);

impl ScanCode {
    /// Wrap an already-extracted code.
    pub fn new(code: impl Into<String>) -> Self {
        ScanCode(code.into())
    }

    /// Get the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if this code equals `expected` exactly.
    #[must_use]
    pub fn matches(&self, expected: &str) -> bool {
        self.0 == expected
    }

    /// Returns `true` if the code has no characters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume the code and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ScanCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ScanCode {
    fn from(value: &str) -> Self {
        ScanCode(value.to_string())
    }
}

impl From<String> for ScanCode {
    fn from(value: String) -> Self {
        ScanCode(value)
    }
}

impl From<ScanCode> for String {
    fn from(code: ScanCode) -> Self {
        code.0
    }
}

impl AsRef<str> for ScanCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Where a scan entered the station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanSource {
    /// Keystroke-style input (keyboard wedge scanner or manual typing).
    Keyboard,
    /// Decoded report from the claimed scanning device.
    Device,
}

impl fmt::Display for ScanSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScanSource::Keyboard => write!(f, "Keyboard"),
            ScanSource::Device => write!(f, "Device"),
        }
    }
}
