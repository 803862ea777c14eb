//! Common types shared across scanner implementations.
//!
//! A decoded scan arrives as a [`ScanReport`]. Whether its label can be read
//! as text depends only on the [`Symbology`], so the report is classified
//! once, at ingestion, into a [`ScanPayload`].

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use pickverify_core::constants::{HEX_DUMP_MAX_BYTES, HEX_DUMP_TRUNCATION_MARKER, NO_DATA};
use serde::{Deserialize, Serialize};

use crate::error::HardwareError;

/// Generic device information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name (e.g., "Mock Scanner").
    pub name: String,

    /// Device model identifier.
    pub model: String,

    /// Optional device serial number.
    pub serial_number: Option<String>,
}

impl DeviceInfo {
    /// Create a new DeviceInfo with required fields.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            serial_number: None,
        }
    }

    /// Set the serial number.
    pub fn with_serial_number(mut self, serial_number: impl Into<String>) -> Self {
        self.serial_number = Some(serial_number.into());
        self
    }
}

/// Barcode symbology reported with a decoded scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Symbology {
    /// EAN-8.
    Ean8,
    /// EAN-13.
    Ean13,
    /// UPC-A.
    Upca,
    /// UPC-A with 2-digit supplement.
    UpcaAdd2,
    /// UPC-A with 5-digit supplement.
    UpcaAdd5,
    /// UPC-E.
    Upce,
    /// UPC-E with 2-digit supplement.
    UpceAdd2,
    /// UPC-E with 5-digit supplement.
    UpceAdd5,
    /// Standard 2 of 5.
    TfStd,
    /// Code 39.
    Code39,
    /// Code 128.
    Code128,
    /// QR Code.
    Qr,
    /// Data Matrix.
    DataMatrix,
    /// PDF417.
    Pdf417,
    /// Symbology the scanner could not identify.
    Unknown,
}

impl Symbology {
    /// All known symbologies, in declaration order.
    pub const ALL: [Symbology; 15] = [
        Self::Ean8,
        Self::Ean13,
        Self::Upca,
        Self::UpcaAdd2,
        Self::UpcaAdd5,
        Self::Upce,
        Self::UpceAdd2,
        Self::UpceAdd5,
        Self::TfStd,
        Self::Code39,
        Self::Code128,
        Self::Qr,
        Self::DataMatrix,
        Self::Pdf417,
        Self::Unknown,
    ];

    /// Short name of the symbology.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ean8 => "Ean8",
            Self::Ean13 => "Ean13",
            Self::Upca => "Upca",
            Self::UpcaAdd2 => "UpcaAdd2",
            Self::UpcaAdd5 => "UpcaAdd5",
            Self::Upce => "Upce",
            Self::UpceAdd2 => "UpceAdd2",
            Self::UpceAdd5 => "UpceAdd5",
            Self::TfStd => "TfStd",
            Self::Code39 => "Code39",
            Self::Code128 => "Code128",
            Self::Qr => "Qr",
            Self::DataMatrix => "DataMatrix",
            Self::Pdf417 => "Pdf417",
            Self::Unknown => "Unknown",
        }
    }

    /// Returns `true` if the label of this symbology is plain UTF-8 digits.
    ///
    /// The UPC, EAN-8 and 2-of-5 families encode only the digits 0-9. Other
    /// symbologies (typically 2-D ones) may carry binary data.
    pub fn is_plain_digit(&self) -> bool {
        matches!(
            self,
            Self::Upca
                | Self::UpcaAdd2
                | Self::UpcaAdd5
                | Self::Upce
                | Self::UpceAdd2
                | Self::UpceAdd5
                | Self::Ean8
                | Self::TfStd
        )
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Symbology {
    type Err = HardwareError;

    /// Parse a symbology name, ignoring ASCII case.
    ///
    /// # Examples
    ///
    /// ```
    /// use pickverify_hardware::Symbology;
    ///
    /// assert_eq!("upca".parse::<Symbology>().unwrap(), Symbology::Upca);
    /// assert_eq!("DataMatrix".parse::<Symbology>().unwrap(), Symbology::DataMatrix);
    /// assert!("morse".parse::<Symbology>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|symbology| symbology.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| HardwareError::invalid_data(format!("unknown symbology '{s}'")))
    }
}

/// Structured report of one decoded scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    /// Raw bytes as delivered by the scanner.
    pub scan_data: Bytes,

    /// Decoded label bytes, if the scanner decoded the label.
    pub scan_data_label: Option<Bytes>,

    /// Symbology of the label.
    pub symbology: Symbology,

    /// When the report was received.
    pub received_at: DateTime<Utc>,
}

impl ScanReport {
    /// Create a report whose raw data and decoded label are the same bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use pickverify_hardware::{ScanReport, Symbology};
    ///
    /// let report = ScanReport::new(Symbology::Ean8, "12345670");
    /// assert_eq!(report.scan_data_label.as_deref(), Some(&b"12345670"[..]));
    /// ```
    pub fn new(symbology: Symbology, label: impl Into<Bytes>) -> Self {
        let label = label.into();
        Self {
            scan_data: label.clone(),
            scan_data_label: Some(label),
            symbology,
            received_at: Utc::now(),
        }
    }

    /// Create a report that carries raw data but no decoded label.
    pub fn undecoded(symbology: Symbology, scan_data: impl Into<Bytes>) -> Self {
        Self {
            scan_data: scan_data.into(),
            scan_data_label: None,
            symbology,
            received_at: Utc::now(),
        }
    }
}

/// Classification of a report's label, decided once at ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanPayload {
    /// Plain-digit label, usable as scan text.
    Text(String),

    /// Label of a symbology that may carry binary data.
    ///
    /// Surfaced only as a diagnostic; it never drives the workflow.
    Opaque {
        /// Symbology of the label.
        symbology: Symbology,
        /// Hex dump of the first label bytes.
        hex_dump: String,
    },

    /// The report carried no decoded label.
    Empty,
}

impl ScanPayload {
    /// Classify a report by its symbology.
    ///
    /// # Examples
    ///
    /// ```
    /// use pickverify_hardware::{ScanPayload, ScanReport, Symbology};
    ///
    /// let text = ScanPayload::classify(&ScanReport::new(Symbology::Upca, "123456"));
    /// assert_eq!(text, ScanPayload::Text("123456".to_string()));
    ///
    /// let opaque = ScanPayload::classify(&ScanReport::new(Symbology::Qr, vec![0xDE, 0xAD]));
    /// assert!(matches!(opaque, ScanPayload::Opaque { .. }));
    /// ```
    pub fn classify(report: &ScanReport) -> Self {
        let Some(label) = report.scan_data_label.as_deref() else {
            return Self::Empty;
        };

        if report.symbology.is_plain_digit() {
            Self::Text(String::from_utf8_lossy(label).into_owned())
        } else {
            Self::Opaque {
                symbology: report.symbology,
                hex_dump: hex_dump(Some(label)),
            }
        }
    }

    /// Operator-facing description of the label.
    pub fn describe(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Opaque { hex_dump, .. } => {
                format!("Decoded data unavailable. Raw label data: {hex_dump}")
            }
            Self::Empty => NO_DATA.to_string(),
        }
    }
}

/// Format the first bytes of a buffer as hex for diagnostics.
///
/// Each byte is printed as two uppercase hex digits followed by a space. When
/// the buffer is longer than the dump limit, `"..."` is appended. An absent
/// buffer yields `"No data"`.
///
/// # Examples
///
/// ```
/// use pickverify_hardware::types::hex_dump;
///
/// assert_eq!(hex_dump(Some(&[0x01, 0xAB])), "01 AB ");
/// assert_eq!(hex_dump(None), "No data");
/// assert!(hex_dump(Some(&[0u8; 32])).ends_with("00 ..."));
/// ```
pub fn hex_dump(data: Option<&[u8]>) -> String {
    let Some(data) = data else {
        return NO_DATA.to_string();
    };

    let shown = &data[..data.len().min(HEX_DUMP_MAX_BYTES)];
    let mut dump: String = shown.iter().map(|b| format!("{b:02X} ")).collect();

    if shown.len() < data.len() {
        dump.push_str(HEX_DUMP_TRUNCATION_MARKER);
    }

    dump
}

/// Plain-digit text decoded by the device, ready for the extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedScan {
    /// Label text.
    pub text: String,

    /// Symbology the text was decoded from.
    pub symbology: Symbology,

    /// When the originating report was received.
    pub received_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Symbology::Upca)]
    #[case(Symbology::UpcaAdd2)]
    #[case(Symbology::UpcaAdd5)]
    #[case(Symbology::Upce)]
    #[case(Symbology::UpceAdd2)]
    #[case(Symbology::UpceAdd5)]
    #[case(Symbology::Ean8)]
    #[case(Symbology::TfStd)]
    fn test_plain_digit_symbologies(#[case] symbology: Symbology) {
        assert!(symbology.is_plain_digit());
    }

    #[rstest]
    #[case(Symbology::Ean13)]
    #[case(Symbology::Code39)]
    #[case(Symbology::Code128)]
    #[case(Symbology::Qr)]
    #[case(Symbology::DataMatrix)]
    #[case(Symbology::Pdf417)]
    #[case(Symbology::Unknown)]
    fn test_opaque_symbologies(#[case] symbology: Symbology) {
        assert!(!symbology.is_plain_digit());
    }

    #[test]
    fn test_symbology_name_parses_back() {
        for symbology in Symbology::ALL {
            assert_eq!(symbology.name().parse::<Symbology>().unwrap(), symbology);
            assert_eq!(symbology.to_string(), symbology.name());
        }
    }

    #[test]
    fn test_hex_dump_short_buffer() {
        assert_eq!(hex_dump(Some(&[0x00, 0x0F, 0xFF])), "00 0F FF ");
        assert_eq!(hex_dump(Some(&[])), "");
    }

    #[test]
    fn test_hex_dump_truncates_after_limit() {
        let data: Vec<u8> = (0..25).collect();
        let dump = hex_dump(Some(&data));

        assert!(dump.starts_with("00 01 02 "));
        assert!(dump.ends_with("12 13 ..."));
        assert_eq!(dump.matches(' ').count(), HEX_DUMP_MAX_BYTES);
    }

    #[test]
    fn test_hex_dump_exact_limit_is_not_truncated() {
        let data = [0xAA; HEX_DUMP_MAX_BYTES];
        assert!(!hex_dump(Some(&data)).ends_with("..."));
    }

    #[test]
    fn test_hex_dump_absent() {
        assert_eq!(hex_dump(None), "No data");
    }

    #[test]
    fn test_classify_plain_digit_is_text() {
        let report = ScanReport::new(Symbology::Ean8, "12345670");
        assert_eq!(
            ScanPayload::classify(&report),
            ScanPayload::Text("12345670".to_string())
        );
    }

    #[test]
    fn test_classify_other_symbology_is_opaque() {
        let report = ScanReport::new(Symbology::Qr, "5QCPCM0QW");
        let payload = ScanPayload::classify(&report);

        assert_eq!(
            payload,
            ScanPayload::Opaque {
                symbology: Symbology::Qr,
                hex_dump: "35 51 43 50 43 4D 30 51 57 ".to_string(),
            }
        );
        assert_eq!(
            payload.describe(),
            "Decoded data unavailable. Raw label data: 35 51 43 50 43 4D 30 51 57 "
        );
    }

    #[test]
    fn test_classify_missing_label_is_empty() {
        let report = ScanReport::undecoded(Symbology::Upca, vec![0x01, 0x02]);
        let payload = ScanPayload::classify(&report);

        assert_eq!(payload, ScanPayload::Empty);
        assert_eq!(payload.describe(), "No data");
    }

    #[test]
    fn test_device_info_serialization() {
        let info = DeviceInfo::new("Mock Scanner", "MOCK-1").with_serial_number("SN-001");
        let json = serde_json::to_string(&info).unwrap();
        let back: DeviceInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, info);
    }
}
