use std::fmt;

use crate::steps::WizardStep;

#[derive(Debug, Clone, PartialEq)]
pub enum WizardError {
    /// Exactly two files must be selected before this operation.
    TwoFilesRequired { selected: usize },
    /// File index outside the current selection.
    NoSuchFile { index: usize },
    /// Key/value row index outside the collection.
    NoSuchRow { what: &'static str, index: usize },
    /// Named sheet does not exist in the file's metadata.
    UnknownSheet { file: String, sheet: String },
    /// Named column does not exist in the bound sheet.
    UnknownColumn { side: &'static str, column: String },
    /// Metadata response shape the wizard cannot normalize.
    MalformedMetadata(String),
    /// A metadata fetch landed after the file selection changed.
    StaleMetadata { ticket: u64, current: u64 },
    /// A file has no sheet bound where one is required.
    SheetNotSelected { file: String },
    /// A forward step guard failed.
    Blocked { step: WizardStep, reasons: Vec<String> },
    /// Back pressed on the initial step.
    AtFirstStep,
    /// Next pressed on the terminal step — the caller should submit instead.
    AtFinalStep,
}

impl fmt::Display for WizardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TwoFilesRequired { selected } => {
                write!(f, "exactly 2 files must be selected, have {selected}")
            }
            Self::NoSuchFile { index } => write!(f, "no selected file at index {index}"),
            Self::NoSuchRow { what, index } => write!(f, "no {what} at index {index}"),
            Self::UnknownSheet { file, sheet } => {
                write!(f, "file '{file}' has no sheet '{sheet}'")
            }
            Self::UnknownColumn { side, column } => {
                write!(f, "{side}: no column '{column}' in the selected sheet")
            }
            Self::MalformedMetadata(msg) => write!(f, "malformed metadata: {msg}"),
            Self::StaleMetadata { ticket, current } => {
                write!(f, "stale metadata (fetched for selection {ticket}, now {current})")
            }
            Self::SheetNotSelected { file } => {
                write!(f, "file '{file}': no sheet selected")
            }
            Self::Blocked { step, reasons } => {
                write!(f, "step '{step}' incomplete: {}", reasons.join("; "))
            }
            Self::AtFirstStep => write!(f, "already at the first step"),
            Self::AtFinalStep => write!(f, "final step reached — submit instead of advancing"),
        }
    }
}

impl std::error::Error for WizardError {}
