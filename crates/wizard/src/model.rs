use std::collections::BTreeMap;

use crosscheck_protocol::{FileDetailsResponse, FileType};

use crate::error::WizardError;

/// Canonical sheet name assigned to formats without real sheets (CSV).
pub const SYNTHETIC_SHEET: &str = "Sheet1";

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// Which of the two compared files a column belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileSide {
    File1,
    File2,
}

impl FileSide {
    pub fn index(self) -> usize {
        match self {
            Self::File1 => 0,
            Self::File2 => 1,
        }
    }
}

impl std::fmt::Display for FileSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File1 => write!(f, "file1"),
            Self::File2 => write!(f, "file2"),
        }
    }
}

/// A selected file, optionally bound to one of its sheets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub file_name: String,
    pub sheet_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Column metadata
// ---------------------------------------------------------------------------

/// Column datatype as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dtype {
    Text,
    Integer,
    Float,
    Datetime,
    Boolean,
    Other,
}

impl Dtype {
    /// Parse the service's type string. Unknown strings map to `Other`
    /// rather than failing the whole metadata fetch.
    pub fn from_wire(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" | "string" => Self::Text,
            "integer" | "int" => Self::Integer,
            "float" | "double" | "decimal" => Self::Float,
            "datetime" | "date" | "timestamp" => Self::Datetime,
            "boolean" | "bool" => Self::Boolean,
            _ => Self::Other,
        }
    }

    pub fn is_textual(self) -> bool {
        matches!(self, Self::Text)
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub dtype: Dtype,
}

/// Columns of a single sheet, in the service's column order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SheetMeta {
    pub columns: Vec<ColumnDescriptor>,
}

impl SheetMeta {
    pub fn dtype_of(&self, column: &str) -> Option<Dtype> {
        self.columns.iter().find(|c| c.name == column).map(|c| c.dtype)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

/// Normalized per-file metadata: every file exposes sheets, CSV included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    pub file_type: FileType,
    pub sheets: BTreeMap<String, SheetMeta>,
}

impl FileMeta {
    /// Normalize a service response. Excel responses must carry `sheets`;
    /// CSV responses carry a top-level column set that becomes one
    /// synthetic sheet named [`SYNTHETIC_SHEET`].
    pub fn from_details(details: &FileDetailsResponse) -> Result<Self, WizardError> {
        match details.file_type {
            FileType::Excel => {
                let sheets = details.sheets.as_ref().ok_or_else(|| {
                    WizardError::MalformedMetadata("Excel response missing sheets".into())
                })?;
                let sheets = sheets
                    .iter()
                    .map(|(name, cols)| (name.clone(), sheet_meta(&cols.columns, &cols.column_types)))
                    .collect();
                Ok(Self { file_type: FileType::Excel, sheets })
            }
            FileType::Csv => {
                let columns = details.columns.as_ref().ok_or_else(|| {
                    WizardError::MalformedMetadata("CSV response missing columns".into())
                })?;
                let empty = BTreeMap::new();
                let types = details.column_types.as_ref().unwrap_or(&empty);
                let mut sheets = BTreeMap::new();
                sheets.insert(SYNTHETIC_SHEET.to_string(), sheet_meta(columns, types));
                Ok(Self { file_type: FileType::Csv, sheets })
            }
        }
    }

    /// The only sheet of a single-sheet file, if there is exactly one.
    pub fn sole_sheet(&self) -> Option<&str> {
        if self.sheets.len() == 1 {
            self.sheets.keys().next().map(String::as_str)
        } else {
            None
        }
    }
}

fn sheet_meta(columns: &[String], types: &BTreeMap<String, String>) -> SheetMeta {
    SheetMeta {
        columns: columns
            .iter()
            .map(|name| ColumnDescriptor {
                name: name.clone(),
                dtype: types.get(name).map(|t| Dtype::from_wire(t)).unwrap_or(Dtype::Other),
            })
            .collect(),
    }
}

/// Read-only view of the two selected sheets' metadata, used to derive
/// column dtypes during key/value updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct SheetPair<'a> {
    pub file1: Option<&'a SheetMeta>,
    pub file2: Option<&'a SheetMeta>,
}

impl<'a> SheetPair<'a> {
    pub fn sheet(&self, side: FileSide) -> Option<&'a SheetMeta> {
        match side {
            FileSide::File1 => self.file1,
            FileSide::File2 => self.file2,
        }
    }

    pub fn dtype_of(&self, side: FileSide, column: &str) -> Option<Dtype> {
        self.sheet(side).and_then(|s| s.dtype_of(column))
    }
}
