//! Crosscheck service wire types — frozen request/response format.
//!
//! This crate defines the canonical types exchanged with the spreadsheet
//! service. Inbound responses use the service's camelCase field names;
//! the outbound reconciliation request uses snake_case. Both are part of
//! the wire contract and must not be renamed.
//!
//! # Compatibility
//!
//! The reconciliation request carries the key list twice: `matching_keys`
//! (booleans) and `keys` (legacy `"yes"`/`"no"` strings). Two revisions of
//! the engine are live and each reads one of the two encodings, so a client
//! must emit both. Do not collapse them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// =============================================================================
// Shared enums
// =============================================================================

/// Reconciliation method, named by the cardinality pairing it implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReconMethod {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl std::fmt::Display for ReconMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OneToOne => write!(f, "one-to-one"),
            Self::OneToMany => write!(f, "one-to-many"),
            Self::ManyToOne => write!(f, "many-to-one"),
            Self::ManyToMany => write!(f, "many-to-many"),
        }
    }
}

/// How a key pair is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMethod {
    Exact,
    Fuzzy,
}

/// Threshold interpretation for a compared-value pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdType {
    Percent,
    Amount,
}

/// Policy for rows with more than one match on the `many` side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateHandling {
    First,
    Last,
    Sum,
    Concatenate,
}

/// Legacy boolean encoding used inside `keys` entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YesNo {
    Yes,
    No,
}

impl From<bool> for YesNo {
    fn from(value: bool) -> Self {
        if value {
            Self::Yes
        } else {
            Self::No
        }
    }
}

impl YesNo {
    pub fn as_bool(self) -> bool {
        matches!(self, Self::Yes)
    }
}

// =============================================================================
// Inbound: file listing + per-sheet column metadata
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileListResponse {
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub file_name: String,
    #[serde(default)]
    pub upload_time: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileType {
    #[serde(rename = "Excel")]
    Excel,
    #[serde(rename = "CSV")]
    Csv,
}

/// Per-file metadata. Excel responses populate `sheets`; CSV responses put
/// the single column set at the top level and are normalized downstream
/// into one synthetic sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDetailsResponse {
    pub file_type: FileType,
    #[serde(default)]
    pub sheets: Option<BTreeMap<String, SheetColumns>>,
    #[serde(default)]
    pub columns: Option<Vec<String>>,
    #[serde(default)]
    pub column_types: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetColumns {
    pub columns: Vec<String>,
    #[serde(default)]
    pub column_types: BTreeMap<String, String>,
}

// =============================================================================
// Outbound: reconciliation request
// =============================================================================

/// The single job description posted to the reconciliation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcileRequest {
    pub files: Vec<FilePayload>,
    pub matching_keys: Vec<MatchingKeyPayload>,
    /// Legacy duplicate of `matching_keys` — see crate docs.
    pub keys: Vec<LegacyKeyPayload>,
    pub values: Vec<ValuePayload>,
    pub reconciliation_settings: SettingsPayload,
    pub cross_reference: CrossReferencePayload,
    pub output_file: String,
    pub replace_existing: bool,
    /// Duplicate of `reconciliation_settings` — see crate docs.
    pub settings: SettingsPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePayload {
    pub file_name: String,
    pub sheet_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingKeyPayload {
    pub file1_column: String,
    pub file2_column: String,
    pub method: MatchMethod,
    pub case_sensitive: bool,
    pub ignore_special_characters: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyKeyPayload {
    pub file1: String,
    pub file2: String,
    pub criteria: MatchMethod,
    pub case_sensitive: YesNo,
    pub ignore_special: YesNo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuePayload {
    pub file1_column: String,
    pub file2_column: String,
    pub set_threshold: bool,
    pub threshold_type: Option<ThresholdType>,
    pub threshold_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsPayload {
    pub method: ReconMethod,
    /// Null when `method` is many-to-many.
    pub handling_duplicate_matches: Option<DuplicateHandling>,
    /// Null when `method` is many-to-many.
    pub based_on_columns: Option<BasedOnColumns>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasedOnColumns {
    pub file1: String,
    pub file2: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossReferencePayload {
    pub file1_column: String,
    /// Null when the custom-reference flag is set together with a `many` side.
    pub file2_column: Option<String>,
}

// =============================================================================
// Inbound: submission response
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recon_method_wire_strings() {
        for (method, wire) in [
            (ReconMethod::OneToOne, "\"one-to-one\""),
            (ReconMethod::OneToMany, "\"one-to-many\""),
            (ReconMethod::ManyToOne, "\"many-to-one\""),
            (ReconMethod::ManyToMany, "\"many-to-many\""),
        ] {
            assert_eq!(serde_json::to_string(&method).unwrap(), wire);
            let back: ReconMethod = serde_json::from_str(wire).unwrap();
            assert_eq!(back, method);
        }
    }

    #[test]
    fn yes_no_wire_strings() {
        assert_eq!(serde_json::to_string(&YesNo::from(true)).unwrap(), "\"yes\"");
        assert_eq!(serde_json::to_string(&YesNo::from(false)).unwrap(), "\"no\"");
        assert!(YesNo::Yes.as_bool());
        assert!(!YesNo::No.as_bool());
    }

    #[test]
    fn file_type_wire_strings() {
        assert_eq!(serde_json::to_string(&FileType::Excel).unwrap(), "\"Excel\"");
        assert_eq!(serde_json::to_string(&FileType::Csv).unwrap(), "\"CSV\"");
    }

    #[test]
    fn file_entry_uses_camel_case() {
        let json = r#"{"fileName":"ledger.xlsx","uploadTime":"2026-07-01T09:00:00Z","downloadUrl":"https://files/ledger.xlsx"}"#;
        let entry: FileEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.file_name, "ledger.xlsx");
        assert_eq!(entry.upload_time.as_deref(), Some("2026-07-01T09:00:00Z"));
        assert_eq!(entry.download_url.as_deref(), Some("https://files/ledger.xlsx"));
    }

    #[test]
    fn csv_details_parse_without_sheets() {
        let json = r#"{"fileType":"CSV","columns":["id","amount"],"columnTypes":{"id":"text","amount":"float"}}"#;
        let details: FileDetailsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(details.file_type, FileType::Csv);
        assert!(details.sheets.is_none());
        assert_eq!(details.columns.as_ref().unwrap().len(), 2);
        assert_eq!(details.column_types.as_ref().unwrap()["amount"], "float");
    }
}
