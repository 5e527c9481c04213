//! Reconciliation plan files.
//!
//! A plan is the declarative equivalent of the browser wizard's form: two
//! files, key pairs, value pairs, settings, cross-reference and output
//! options. Replaying it drives the same state machine a user would — every
//! update and step gate — so a plan that violates a rule fails exactly
//! where the wizard would have blocked.

use serde::Deserialize;

use crosscheck_protocol::{DuplicateHandling, MatchMethod, ReconMethod, ThresholdType};
use crosscheck_wizard::keys::KeyUpdate;
use crosscheck_wizard::values::ValueUpdate;
use crosscheck_wizard::{FileMeta, FileSide, Wizard, WizardError, WizardStep};

use crate::exit_codes::{EXIT_PLAN_BLOCKED, EXIT_PLAN_INVALID, EXIT_PLAN_PARSE};
use crate::CliError;

// ---------------------------------------------------------------------------
// Plan schema
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ReconPlan {
    pub name: String,
    pub files: Vec<PlanFile>,
    pub keys: Vec<PlanKey>,
    pub values: Vec<PlanValue>,
    pub settings: PlanSettings,
    pub cross_reference: PlanCrossReference,
    #[serde(default)]
    pub output: PlanOutput,
}

#[derive(Debug, Deserialize)]
pub struct PlanFile {
    pub name: String,
    #[serde(default)]
    pub sheet: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlanKey {
    pub file1: String,
    pub file2: String,
    #[serde(default)]
    pub method: Option<MatchMethod>,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub ignore_special: bool,
}

#[derive(Debug, Deserialize)]
pub struct PlanValue {
    pub file1: String,
    pub file2: String,
    #[serde(default)]
    pub threshold_type: Option<ThresholdType>,
    #[serde(default)]
    pub threshold_value: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct PlanSettings {
    pub method: ReconMethod,
    #[serde(default)]
    pub duplicate_handling: Option<DuplicateHandling>,
    #[serde(default)]
    pub base_column1: Option<String>,
    #[serde(default)]
    pub base_column2: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlanCrossReference {
    #[serde(default)]
    pub file1: Option<String>,
    #[serde(default)]
    pub file2: Option<String>,
    #[serde(default)]
    pub custom: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlanOutput {
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub replace_existing: bool,
}

impl ReconPlan {
    pub fn from_toml(input: &str) -> Result<Self, CliError> {
        let plan: ReconPlan = toml::from_str(input).map_err(|e| CliError {
            code: EXIT_PLAN_PARSE,
            message: format!("plan parse error: {e}"),
            hint: None,
        })?;
        plan.validate()?;
        Ok(plan)
    }

    fn validate(&self) -> Result<(), CliError> {
        let parse_err = |msg: String| CliError {
            code: EXIT_PLAN_PARSE,
            message: msg,
            hint: None,
        };
        if self.files.len() != 2 {
            return Err(parse_err(format!(
                "exactly 2 [[files]] entries are required, found {}",
                self.files.len()
            )));
        }
        if self.keys.is_empty() {
            return Err(parse_err("at least one [[keys]] entry is required".into()));
        }
        if self.values.is_empty() {
            return Err(parse_err("at least one [[values]] entry is required".into()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

/// Replay a plan through the wizard with the two files' fetched metadata.
/// Returns the wizard parked on the review step; warnings stay queued for
/// the caller to surface.
pub fn build_wizard(
    plan: &ReconPlan,
    meta1: FileMeta,
    meta2: FileMeta,
) -> Result<Wizard, CliError> {
    let mut wizard = Wizard::new();

    for file in &plan.files {
        wizard.toggle_file(&file.name);
    }
    let ticket = wizard.metadata_ticket().map_err(wizard_err)?;
    wizard.apply_metadata(ticket, meta1, meta2).map_err(wizard_err)?;
    for (index, file) in plan.files.iter().enumerate() {
        if let Some(sheet) = &file.sheet {
            wizard.set_sheet(index, sheet).map_err(wizard_err)?;
        }
    }
    advance(&mut wizard)?; // select files → select keys

    for (i, key) in plan.keys.iter().enumerate() {
        if i > 0 {
            wizard.add_key();
        }
        wizard.update_key(i, KeyUpdate::Column1(key.file1.clone())).map_err(wizard_err)?;
        wizard.update_key(i, KeyUpdate::Column2(key.file2.clone())).map_err(wizard_err)?;
        if let Some(method) = key.method {
            wizard.update_key(i, KeyUpdate::Method(method)).map_err(wizard_err)?;
        }
        wizard
            .update_key(i, KeyUpdate::CaseSensitive(key.case_sensitive))
            .map_err(wizard_err)?;
        wizard
            .update_key(i, KeyUpdate::IgnoreSpecialChars(key.ignore_special))
            .map_err(wizard_err)?;
    }
    advance(&mut wizard)?; // select keys → select values

    for (i, value) in plan.values.iter().enumerate() {
        if i > 0 {
            wizard.add_value();
        }
        wizard.update_value(i, ValueUpdate::Column1(value.file1.clone())).map_err(wizard_err)?;
        wizard.update_value(i, ValueUpdate::Column2(value.file2.clone())).map_err(wizard_err)?;
        if value.threshold_type.is_some() || value.threshold_value.is_some() {
            wizard.update_value(i, ValueUpdate::ThresholdEnabled(true)).map_err(wizard_err)?;
            if let Some(t) = value.threshold_type {
                wizard.update_value(i, ValueUpdate::ThresholdType(t)).map_err(wizard_err)?;
            }
            if let Some(v) = value.threshold_value {
                wizard.update_value(i, ValueUpdate::ThresholdValue(v)).map_err(wizard_err)?;
            }
        }
    }
    advance(&mut wizard)?; // select values → settings

    wizard.set_method(plan.settings.method);
    if let Some(handling) = plan.settings.duplicate_handling {
        wizard.set_duplicate_handling(handling);
    }
    if let Some(base) = &plan.settings.base_column1 {
        wizard.set_base_column(FileSide::File1, base);
    }
    if let Some(base) = &plan.settings.base_column2 {
        wizard.set_base_column(FileSide::File2, base);
    }
    advance(&mut wizard)?; // settings → cross reference

    wizard.set_cross_column1(plan.cross_reference.file1.clone());
    wizard.set_cross_column2(plan.cross_reference.file2.clone());
    if plan.cross_reference.custom {
        wizard.set_custom_reference(true);
    }
    advance(&mut wizard)?; // cross reference → review

    debug_assert_eq!(wizard.step(), WizardStep::ReviewSubmit);

    wizard.set_output_file(plan.output.file.clone());
    wizard.set_replace_existing(plan.output.replace_existing);
    Ok(wizard)
}

fn advance(wizard: &mut Wizard) -> Result<(), CliError> {
    wizard.advance().map(|_| ()).map_err(wizard_err)
}

/// Map wizard errors onto the exit-code registry.
pub fn wizard_err(err: WizardError) -> CliError {
    let code = match &err {
        WizardError::Blocked { .. } => EXIT_PLAN_BLOCKED,
        _ => EXIT_PLAN_INVALID,
    };
    CliError { code, message: err.to_string(), hint: None }
}
