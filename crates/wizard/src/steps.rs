use crosscheck_protocol::{MatchMethod, ReconMethod};

use crate::cardinality::Multiplicity;
use crate::crossref::CrossReference;
use crate::files::FileSelection;
use crate::keys::MatchingKeySet;
use crate::settings::ReconciliationSettings;
use crate::values::ValuePairSet;

/// The six wizard steps, linear with Back/Next only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    SelectFiles,
    SelectKeys,
    SelectValues,
    ReconciliationSettings,
    CrossReference,
    ReviewSubmit,
}

impl WizardStep {
    pub const ALL: [WizardStep; 6] = [
        Self::SelectFiles,
        Self::SelectKeys,
        Self::SelectValues,
        Self::ReconciliationSettings,
        Self::CrossReference,
        Self::ReviewSubmit,
    ];

    pub fn next(self) -> Option<Self> {
        match self {
            Self::SelectFiles => Some(Self::SelectKeys),
            Self::SelectKeys => Some(Self::SelectValues),
            Self::SelectValues => Some(Self::ReconciliationSettings),
            Self::ReconciliationSettings => Some(Self::CrossReference),
            Self::CrossReference => Some(Self::ReviewSubmit),
            Self::ReviewSubmit => None,
        }
    }

    pub fn prev(self) -> Option<Self> {
        match self {
            Self::SelectFiles => None,
            Self::SelectKeys => Some(Self::SelectFiles),
            Self::SelectValues => Some(Self::SelectKeys),
            Self::ReconciliationSettings => Some(Self::SelectValues),
            Self::CrossReference => Some(Self::ReconciliationSettings),
            Self::ReviewSubmit => Some(Self::CrossReference),
        }
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SelectFiles => write!(f, "select files"),
            Self::SelectKeys => write!(f, "select keys"),
            Self::SelectValues => write!(f, "select values"),
            Self::ReconciliationSettings => write!(f, "reconciliation settings"),
            Self::CrossReference => write!(f, "cross reference"),
            Self::ReviewSubmit => write!(f, "review and submit"),
        }
    }
}

/// Forward-transition guard for one step. Empty result means the step may
/// advance; otherwise every blocking reason is listed.
pub fn forward_guard(
    step: WizardStep,
    files: &FileSelection,
    keys: &MatchingKeySet,
    values: &ValuePairSet,
    settings: &ReconciliationSettings,
    crossref: &CrossReference,
) -> Vec<String> {
    let mut reasons = Vec::new();

    match step {
        WizardStep::SelectFiles => {
            if !files.is_pair() {
                reasons.push(format!("exactly 2 files must be selected, have {}", files.len()));
            }
        }
        WizardStep::SelectKeys => {
            for (i, key) in keys.iter().enumerate() {
                let row = i + 1;
                if !key.is_complete() {
                    reasons.push(format!("key pair {row}: both columns are required"));
                    continue;
                }
                let textual = key.dtype1.is_some_and(|d| d.is_textual());
                if textual && key.method.is_none() {
                    reasons.push(format!("key pair {row}: choose exact or fuzzy matching"));
                }
                if key.method == Some(MatchMethod::Fuzzy)
                    && !key.case_sensitive
                    && !key.ignore_special_chars
                {
                    reasons.push(format!(
                        "key pair {row}: fuzzy matching needs case sensitivity or special-character handling"
                    ));
                }
            }
        }
        WizardStep::SelectValues => {
            for (i, value) in values.iter().enumerate() {
                let row = i + 1;
                if !value.is_complete() {
                    reasons.push(format!("value pair {row}: both columns are required"));
                    continue;
                }
                if value.threshold_enabled
                    && (value.threshold_type.is_none() || value.threshold_value.is_none())
                {
                    reasons.push(format!(
                        "value pair {row}: threshold type and value are required"
                    ));
                }
            }
        }
        WizardStep::ReconciliationSettings => {
            if settings.method != ReconMethod::ManyToMany {
                if settings.duplicate_handling.is_none() {
                    reasons.push("duplicate handling is required".into());
                }
                if settings.base_column1.is_none() {
                    reasons.push("file1 base column is required".into());
                }
                if settings.base_column2.is_none() {
                    reasons.push("file2 base column is required".into());
                }
            }
        }
        WizardStep::CrossReference => {
            if crossref.column1.is_none() {
                reasons.push("file1 cross-reference column is required".into());
            }
            let file2_many = settings.cardinality().file2 == Multiplicity::Many;
            let custom_ok = file2_many && crossref.custom_reference;
            if crossref.column2.is_none() && !custom_ok {
                reasons.push("file2 cross-reference column is required".into());
            }
        }
        WizardStep::ReviewSubmit => {}
    }

    reasons
}
