//! Builds the engine request from wizard state, and rebuilds an equivalent
//! wizard from a request plus fetched metadata (the review screen's
//! "edit this job again" path).

use crosscheck_protocol::{
    BasedOnColumns, CrossReferencePayload, FilePayload, LegacyKeyPayload, MatchMethod,
    MatchingKeyPayload, ReconMethod, ReconcileRequest, SettingsPayload, ValuePayload, YesNo,
};

use crate::error::WizardError;
use crate::keys::KeyUpdate;
use crate::model::{FileMeta, FileSide};
use crate::steps::WizardStep;
use crate::values::ValueUpdate;
use crate::wizard::Wizard;

/// Build the engine request. Every pre-submit step guard is re-checked, so
/// the request can only describe a configuration the wizard would accept.
pub fn assemble(wizard: &Wizard) -> Result<ReconcileRequest, WizardError> {
    for step in [
        WizardStep::SelectFiles,
        WizardStep::SelectKeys,
        WizardStep::SelectValues,
        WizardStep::ReconciliationSettings,
        WizardStep::CrossReference,
    ] {
        let reasons = wizard.guard(step);
        if !reasons.is_empty() {
            return Err(WizardError::Blocked { step, reasons });
        }
    }

    let mut files = Vec::with_capacity(2);
    for slot in wizard.files().iter() {
        let sheet_name = slot.sheet_name.clone().ok_or_else(|| {
            WizardError::SheetNotSelected { file: slot.file_name.clone() }
        })?;
        files.push(FilePayload { file_name: slot.file_name.clone(), sheet_name });
    }

    let mut matching_keys = Vec::with_capacity(wizard.keys().len());
    let mut keys = Vec::with_capacity(wizard.keys().len());
    for key in wizard.keys().iter() {
        // Non-textual pairs are force-set to exact; a textual pair's method
        // is guaranteed by the key-step guard.
        let method = key.method.unwrap_or(MatchMethod::Exact);
        matching_keys.push(MatchingKeyPayload {
            file1_column: key.column1.clone(),
            file2_column: key.column2.clone(),
            method,
            case_sensitive: key.case_sensitive,
            ignore_special_characters: key.ignore_special_chars,
        });
        keys.push(LegacyKeyPayload {
            file1: key.column1.clone(),
            file2: key.column2.clone(),
            criteria: method,
            case_sensitive: YesNo::from(key.case_sensitive),
            ignore_special: YesNo::from(key.ignore_special_chars),
        });
    }

    let values = wizard
        .values()
        .iter()
        .map(|v| ValuePayload {
            file1_column: v.column1.clone(),
            file2_column: v.column2.clone(),
            set_threshold: v.threshold_enabled,
            threshold_type: v.threshold_type,
            threshold_value: v.threshold_value,
        })
        .collect();

    let settings = wizard.settings();
    let settings_payload = if settings.method == ReconMethod::ManyToMany {
        SettingsPayload {
            method: settings.method,
            handling_duplicate_matches: None,
            based_on_columns: None,
        }
    } else {
        SettingsPayload {
            method: settings.method,
            handling_duplicate_matches: settings.duplicate_handling,
            based_on_columns: Some(BasedOnColumns {
                file1: settings.base_column1.clone().unwrap_or_default(),
                file2: settings.base_column2.clone().unwrap_or_default(),
            }),
        }
    };

    let crossref = wizard.crossref();
    let file2_column = if crossref.custom_reference && wizard.cardinality().has_many_side() {
        None
    } else {
        crossref.column2.clone()
    };
    let cross_reference = CrossReferencePayload {
        file1_column: crossref.column1.clone().unwrap_or_default(),
        file2_column,
    };

    let output_file = match wizard.output_file() {
        Some(name) => name.to_string(),
        None => default_output_name(&files),
    };

    Ok(ReconcileRequest {
        files,
        matching_keys,
        keys,
        values,
        reconciliation_settings: settings_payload.clone(),
        cross_reference,
        output_file,
        replace_existing: wizard.replace_existing(),
        settings: settings_payload,
    })
}

/// Rebuild a wizard from a request plus both files' metadata, replaying the
/// configuration through the ordinary mutation path so every invariant is
/// re-enforced. The result sits on the review step, ready to re-assemble.
pub fn hydrate(
    request: &ReconcileRequest,
    meta1: FileMeta,
    meta2: FileMeta,
) -> Result<Wizard, WizardError> {
    if request.files.len() != 2 {
        return Err(WizardError::TwoFilesRequired { selected: request.files.len() });
    }

    let mut wizard = Wizard::new();
    for file in &request.files {
        wizard.toggle_file(&file.file_name);
    }
    let ticket = wizard.metadata_ticket()?;
    wizard.apply_metadata(ticket, meta1, meta2)?;
    for (index, file) in request.files.iter().enumerate() {
        wizard.set_sheet(index, &file.sheet_name)?;
    }

    for (i, key) in request.matching_keys.iter().enumerate() {
        if i > 0 {
            wizard.add_key();
        }
        wizard.update_key(i, KeyUpdate::Column1(key.file1_column.clone()))?;
        wizard.update_key(i, KeyUpdate::Column2(key.file2_column.clone()))?;
        wizard.update_key(i, KeyUpdate::Method(key.method))?;
        wizard.update_key(i, KeyUpdate::CaseSensitive(key.case_sensitive))?;
        wizard.update_key(i, KeyUpdate::IgnoreSpecialChars(key.ignore_special_characters))?;
    }

    for (i, value) in request.values.iter().enumerate() {
        if i > 0 {
            wizard.add_value();
        }
        wizard.update_value(i, ValueUpdate::Column1(value.file1_column.clone()))?;
        wizard.update_value(i, ValueUpdate::Column2(value.file2_column.clone()))?;
        if value.set_threshold {
            wizard.update_value(i, ValueUpdate::ThresholdEnabled(true))?;
            if let Some(t) = value.threshold_type {
                wizard.update_value(i, ValueUpdate::ThresholdType(t))?;
            }
            if let Some(v) = value.threshold_value {
                wizard.update_value(i, ValueUpdate::ThresholdValue(v))?;
            }
        }
    }

    let settings = &request.reconciliation_settings;
    wizard.set_method(settings.method);
    if let Some(handling) = settings.handling_duplicate_matches {
        wizard.set_duplicate_handling(handling);
    }
    if let Some(based_on) = &settings.based_on_columns {
        wizard.set_base_column(FileSide::File1, &based_on.file1);
        wizard.set_base_column(FileSide::File2, &based_on.file2);
    }

    wizard.set_cross_column1(Some(request.cross_reference.file1_column.clone()));
    match &request.cross_reference.file2_column {
        Some(column) => wizard.set_cross_column2(Some(column.clone())),
        None => wizard.set_custom_reference(true),
    }

    wizard.set_output_file(Some(request.output_file.clone()));
    wizard.set_replace_existing(request.replace_existing);

    // Walk to the review step, proving every guard accepts the rebuilt state.
    while wizard.step() != WizardStep::ReviewSubmit {
        wizard.advance()?;
    }
    Ok(wizard)
}

/// Default output name when the user leaves the field blank.
fn default_output_name(files: &[FilePayload]) -> String {
    let stamp = chrono::Utc::now().format("%Y%m%d%H%M%S");
    format!("recon_{}_{}_{stamp}.xlsx", stem(&files[0].file_name), stem(&files[1].file_name))
}

fn stem(file_name: &str) -> &str {
    file_name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_strips_last_extension_only() {
        assert_eq!(stem("ledger.xlsx"), "ledger");
        assert_eq!(stem("q3.final.csv"), "q3.final");
        assert_eq!(stem("noext"), "noext");
    }
}
