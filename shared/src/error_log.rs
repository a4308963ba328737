//! Error vocabulary of the downstream collection server
//!
//! The collector records rejected readings with one of these codes. The
//! relay reuses the same shape for its own failure responses so a caller
//! sees one error format on both hops.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of [`ErrorReport::description`], in characters
pub const MAX_DESCRIPTION_LEN: usize = 100;

/// Maximum length of [`ErrorReport::raw_data`], in characters
pub const MAX_RAW_DATA_LEN: usize = 256;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    UnknownFormat,
    MissingColumn,
    MissingFieldInRawReading,
    InvalidColumnName,
    InvalidColumnValue,
    InvalidFieldInRawReading,
    FormulaProcessMeasurementError,
    ExtraneousKeyValuePairInMeasurement,
    #[default]
    OtherError,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 9] = [
        ErrorCode::UnknownFormat,
        ErrorCode::MissingColumn,
        ErrorCode::MissingFieldInRawReading,
        ErrorCode::InvalidColumnName,
        ErrorCode::InvalidColumnValue,
        ErrorCode::InvalidFieldInRawReading,
        ErrorCode::FormulaProcessMeasurementError,
        ErrorCode::ExtraneousKeyValuePairInMeasurement,
        ErrorCode::OtherError,
    ];

    /// Wire name, e.g. `MISSING_COLUMN`
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::UnknownFormat => "UNKNOWN_FORMAT",
            ErrorCode::MissingColumn => "MISSING_COLUMN",
            ErrorCode::MissingFieldInRawReading => "MISSING_FIELD_IN_RAW_READING",
            ErrorCode::InvalidColumnName => "INVALID_COLUMN_NAME",
            ErrorCode::InvalidColumnValue => "INVALID_COLUMN_VALUE",
            ErrorCode::InvalidFieldInRawReading => "INVALID_FIELD_IN_RAW_READING",
            ErrorCode::FormulaProcessMeasurementError => "FORMULA_PROCESS_MEASUREMENT_ERROR",
            ErrorCode::ExtraneousKeyValuePairInMeasurement => {
                "EXTRANEOUS_KEY_VALUE_PAIR_IN_MEASUREMENT"
            }
            ErrorCode::OtherError => "OTHER_ERROR",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            ErrorCode::UnknownFormat => "Unknown Format",
            ErrorCode::MissingColumn => "Missing Column",
            ErrorCode::MissingFieldInRawReading => "Missing Field In Raw Reading",
            ErrorCode::InvalidColumnName => "Invalid Column Name",
            ErrorCode::InvalidColumnValue => "Invalid Column Value",
            ErrorCode::InvalidFieldInRawReading => "Invalid Field In Raw Reading",
            ErrorCode::FormulaProcessMeasurementError => {
                "Error When Formula Processing Measurement"
            }
            ErrorCode::ExtraneousKeyValuePairInMeasurement => {
                "Extraneous Key-Value Pair In Measurement"
            }
            ErrorCode::OtherError => "Other Error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One error-log record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub error_code: ErrorCode,
    pub description: String,
    pub raw_data: String,
}

impl ErrorReport {
    /// Build a report, truncating `description` and `raw_data` to the
    /// collector's column limits
    pub fn new(
        error_code: ErrorCode,
        description: impl AsRef<str>,
        raw_data: impl AsRef<str>,
    ) -> Self {
        Self {
            error_code,
            description: truncate_chars(description.as_ref(), MAX_DESCRIPTION_LEN),
            raw_data: truncate_chars(raw_data.as_ref(), MAX_RAW_DATA_LEN),
        }
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
