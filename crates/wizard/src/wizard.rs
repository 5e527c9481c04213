use crosscheck_protocol::{DuplicateHandling, ReconMethod};

use crate::cardinality::Cardinality;
use crate::crossref::CrossReference;
use crate::eligibility::{eligible_columns, Eligible, RoleSlot};
use crate::error::WizardError;
use crate::files::{FileSelection, MetadataTicket};
use crate::keys::{KeyUpdate, MatchingKeySet};
use crate::model::{FileMeta, FileSide};
use crate::settings::ReconciliationSettings;
use crate::steps::{forward_guard, WizardStep};
use crate::values::{ValuePairSet, ValueUpdate};
use crate::warning::Warning;

/// The whole wizard: one instance per configuration session, discarded on
/// submission or navigation away. All mutations are synchronous; the only
/// asynchronous seam is the metadata fetch, fenced by a ticket.
///
/// Warnings accumulate in a queue the caller drains with
/// [`take_warnings`](Self::take_warnings).
#[derive(Debug, Clone, Default)]
pub struct Wizard {
    step_index: usize,
    files: FileSelection,
    keys: MatchingKeySet,
    values: ValuePairSet,
    settings: ReconciliationSettings,
    crossref: CrossReference,
    output_file: Option<String>,
    replace_existing: bool,
    warnings: Vec<Warning>,
}

impl Wizard {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Read access ─────────────────────────────────────────────────

    pub fn step(&self) -> WizardStep {
        WizardStep::ALL[self.step_index]
    }

    pub fn files(&self) -> &FileSelection {
        &self.files
    }

    pub fn keys(&self) -> &MatchingKeySet {
        &self.keys
    }

    pub fn values(&self) -> &ValuePairSet {
        &self.values
    }

    pub fn settings(&self) -> &ReconciliationSettings {
        &self.settings
    }

    pub fn crossref(&self) -> &CrossReference {
        &self.crossref
    }

    pub fn output_file(&self) -> Option<&str> {
        self.output_file.as_deref()
    }

    pub fn replace_existing(&self) -> bool {
        self.replace_existing
    }

    pub fn cardinality(&self) -> Cardinality {
        self.settings.cardinality()
    }

    /// Drain accumulated warnings, oldest first.
    pub fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }

    // ── File selection ──────────────────────────────────────────────

    pub fn toggle_file(&mut self, file_name: &str) {
        let warn = self.files.toggle(file_name);
        self.push(warn);
        self.reset_roles_if_unpaired();
    }

    pub fn deselect_file(&mut self, index: usize) -> Result<(), WizardError> {
        self.files.deselect(index)?;
        self.reset_roles_if_unpaired();
        Ok(())
    }

    pub fn set_sheet(&mut self, index: usize, sheet: &str) -> Result<(), WizardError> {
        self.files.set_sheet(index, sheet)?;
        // Dtypes derive from the bound sheet; a rebind invalidates them.
        let pair = self.files.sheet_pair();
        self.keys.refresh_dtypes(&pair);
        self.values.refresh_dtypes(&pair);
        Ok(())
    }

    pub fn metadata_ticket(&self) -> Result<MetadataTicket, WizardError> {
        self.files.metadata_ticket()
    }

    pub fn apply_metadata(
        &mut self,
        ticket: MetadataTicket,
        meta1: FileMeta,
        meta2: FileMeta,
    ) -> Result<(), WizardError> {
        self.files.apply_metadata(ticket, meta1, meta2)?;
        let pair = self.files.sheet_pair();
        self.keys.refresh_dtypes(&pair);
        self.values.refresh_dtypes(&pair);
        Ok(())
    }

    // ── Matching keys ───────────────────────────────────────────────

    pub fn add_key(&mut self) {
        self.keys.add();
    }

    pub fn remove_key(&mut self, index: usize) -> Result<(), WizardError> {
        let warn = self.keys.remove(index)?;
        self.push(warn);
        Ok(())
    }

    pub fn update_key(&mut self, index: usize, update: KeyUpdate) -> Result<(), WizardError> {
        let pair = self.files.sheet_pair();
        self.keys.update(index, update, &pair)
    }

    // ── Value pairs ─────────────────────────────────────────────────

    pub fn add_value(&mut self) {
        self.values.add();
    }

    pub fn remove_value(&mut self, index: usize) -> Result<(), WizardError> {
        let warn = self.values.remove(index)?;
        self.push(warn);
        Ok(())
    }

    pub fn update_value(&mut self, index: usize, update: ValueUpdate) -> Result<(), WizardError> {
        let pair = self.files.sheet_pair();
        let warn = self.values.update(index, update, &pair, &self.keys)?;
        self.push(warn);
        Ok(())
    }

    // ── Settings + cross-reference ──────────────────────────────────

    pub fn set_method(&mut self, method: ReconMethod) {
        self.settings = self.settings.with_method(method);
        // Cross-reference eligibility is cardinality-driven; a custom
        // reference cannot survive losing its many side.
        if self.crossref.custom_reference && !self.cardinality().has_many_side() {
            self.crossref.custom_reference = false;
        }
    }

    pub fn set_duplicate_handling(&mut self, handling: DuplicateHandling) {
        let warn = self.settings.set_duplicate_handling(handling);
        self.push(warn);
    }

    pub fn set_base_column(&mut self, side: FileSide, column: &str) {
        let warn = self.settings.set_base_column(side, column);
        self.push(warn);
    }

    pub fn set_cross_column1(&mut self, column: Option<String>) {
        self.crossref.set_column1(column);
    }

    pub fn set_cross_column2(&mut self, column: Option<String>) {
        self.crossref.set_column2(column);
    }

    pub fn set_custom_reference(&mut self, on: bool) {
        let warn = self.crossref.set_custom_reference(on, self.cardinality());
        self.push(warn);
    }

    // ── Output options ──────────────────────────────────────────────

    pub fn set_output_file(&mut self, name: Option<String>) {
        self.output_file = name.filter(|n| !n.is_empty());
    }

    pub fn set_replace_existing(&mut self, replace: bool) {
        self.replace_existing = replace;
    }

    // ── Eligibility ─────────────────────────────────────────────────

    /// Eligible columns for one dropdown. Empty until the side has a bound
    /// sheet with fetched metadata (dropdowns render only after the fetch).
    pub fn eligible(&self, slot: RoleSlot, side: FileSide) -> Eligible {
        match self.files.sheet_meta(side) {
            Some(sheet) => eligible_columns(
                slot,
                side,
                self.cardinality(),
                sheet,
                &self.keys,
                &self.values,
            ),
            None => Eligible::default(),
        }
    }

    // ── Navigation ──────────────────────────────────────────────────

    /// Blocking reasons for leaving one step forward. Empty means clear.
    pub fn guard(&self, step: WizardStep) -> Vec<String> {
        forward_guard(step, &self.files, &self.keys, &self.values, &self.settings, &self.crossref)
    }

    /// Advance one step, running the current step's guard.
    pub fn advance(&mut self) -> Result<WizardStep, WizardError> {
        let step = self.step();
        let reasons = self.guard(step);
        if !reasons.is_empty() {
            return Err(WizardError::Blocked { step, reasons });
        }
        match step.next() {
            Some(_) => {
                self.step_index += 1;
                Ok(self.step())
            }
            None => Err(WizardError::AtFinalStep),
        }
    }

    /// Go back one step. Always allowed except on the first step; never
    /// re-validates.
    pub fn back(&mut self) -> Result<WizardStep, WizardError> {
        match self.step().prev() {
            Some(_) => {
                self.step_index -= 1;
                Ok(self.step())
            }
            None => Err(WizardError::AtFirstStep),
        }
    }

    // ── Internal ────────────────────────────────────────────────────

    fn push(&mut self, warning: Option<Warning>) {
        if let Some(w) = warning {
            self.warnings.push(w);
        }
    }

    /// Dropping below two files clears every downstream role assignment.
    fn reset_roles_if_unpaired(&mut self) {
        if self.files.is_pair() {
            return;
        }
        self.files.clear_bindings();
        self.keys.reset();
        self.values.reset();
        self.settings = ReconciliationSettings::default();
        self.crossref.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Dtype, SYNTHETIC_SHEET};
    use crosscheck_protocol::{FileDetailsResponse, MatchMethod};

    fn csv_details(columns: &[(&str, &str)]) -> FileMeta {
        let json = format!(
            r#"{{"fileType":"CSV","columns":[{}],"columnTypes":{{{}}}}}"#,
            columns.iter().map(|(n, _)| format!("\"{n}\"")).collect::<Vec<_>>().join(","),
            columns
                .iter()
                .map(|(n, t)| format!("\"{n}\":\"{t}\""))
                .collect::<Vec<_>>()
                .join(","),
        );
        let details: FileDetailsResponse = serde_json::from_str(&json).unwrap();
        FileMeta::from_details(&details).unwrap()
    }

    fn paired_wizard() -> Wizard {
        let mut w = Wizard::new();
        w.toggle_file("ledger.csv");
        w.toggle_file("bank.csv");
        let ticket = w.metadata_ticket().unwrap();
        w.apply_metadata(
            ticket,
            csv_details(&[("Invoice", "text"), ("Amount", "float"), ("Note", "text")]),
            csv_details(&[("invoice_no", "text"), ("amount", "float"), ("memo", "text")]),
        )
        .unwrap();
        w
    }

    #[test]
    fn deselect_resets_downstream_state() {
        let mut w = paired_wizard();
        w.update_key(0, KeyUpdate::Column1("Invoice".into())).unwrap();
        w.update_key(0, KeyUpdate::Column2("invoice_no".into())).unwrap();
        w.add_key();
        w.update_value(0, ValueUpdate::Column1("Amount".into())).unwrap();
        w.set_method(ReconMethod::ManyToOne);
        w.set_duplicate_handling(crosscheck_protocol::DuplicateHandling::First);

        w.deselect_file(1).unwrap();

        assert_eq!(w.keys().len(), 1);
        assert!(!w.keys().get(0).unwrap().is_complete());
        assert!(!w.values().get(0).unwrap().is_complete());
        assert_eq!(w.settings().method, ReconMethod::OneToOne);
        assert!(w.settings().duplicate_handling.is_none());
        assert!(w.files().get(0).unwrap().sheet_name.is_none());
        assert!(w.files().get(0).unwrap().meta().is_none());
    }

    #[test]
    fn toggle_off_also_cascades() {
        let mut w = paired_wizard();
        w.update_key(0, KeyUpdate::Column1("Invoice".into())).unwrap();
        w.toggle_file("bank.csv");
        assert!(!w.keys().get(0).unwrap().is_complete());
    }

    #[test]
    fn advance_requires_two_files() {
        let mut w = Wizard::new();
        w.toggle_file("only.csv");
        let err = w.advance().unwrap_err();
        assert!(matches!(err, WizardError::Blocked { step: WizardStep::SelectFiles, .. }));

        w.toggle_file("second.csv");
        assert_eq!(w.advance().unwrap(), WizardStep::SelectKeys);
    }

    #[test]
    fn back_is_always_allowed_except_first() {
        let mut w = paired_wizard();
        assert!(matches!(w.back(), Err(WizardError::AtFirstStep)));
        w.advance().unwrap();
        assert_eq!(w.back().unwrap(), WizardStep::SelectFiles);
    }

    #[test]
    fn fuzzy_key_needs_a_flag_to_advance() {
        // Scenario: textual key pair, fuzzy method.
        let mut w = paired_wizard();
        w.advance().unwrap();
        w.update_key(0, KeyUpdate::Column1("Invoice".into())).unwrap();
        w.update_key(0, KeyUpdate::Column2("invoice_no".into())).unwrap();
        w.update_key(0, KeyUpdate::Method(MatchMethod::Fuzzy)).unwrap();

        let err = w.advance().unwrap_err();
        assert!(matches!(err, WizardError::Blocked { step: WizardStep::SelectKeys, .. }));

        w.update_key(0, KeyUpdate::CaseSensitive(true)).unwrap();
        assert_eq!(w.advance().unwrap(), WizardStep::SelectValues);
    }

    #[test]
    fn method_change_clears_stranded_custom_reference() {
        let mut w = paired_wizard();
        w.set_method(ReconMethod::OneToMany);
        w.set_custom_reference(true);
        assert!(w.crossref().custom_reference);

        w.set_method(ReconMethod::OneToOne);
        assert!(!w.crossref().custom_reference);
    }

    #[test]
    fn eligible_is_empty_without_metadata() {
        let mut w = Wizard::new();
        w.toggle_file("a.csv");
        w.toggle_file("b.csv");
        let eligible = w.eligible(RoleSlot::Value { row: Some(0) }, FileSide::File1);
        assert!(eligible.columns.is_empty());
    }

    #[test]
    fn metadata_applies_dtypes_to_existing_keys() {
        let mut w = Wizard::new();
        w.toggle_file("a.csv");
        w.toggle_file("b.csv");
        // Columns chosen before metadata arrives (no dropdown data yet,
        // but the state machine tolerates it).
        w.update_key(0, KeyUpdate::Column1("Amount".into())).unwrap();
        w.update_key(0, KeyUpdate::Column2("amount".into())).unwrap();
        assert!(w.keys().get(0).unwrap().dtype1.is_none());

        let ticket = w.metadata_ticket().unwrap();
        w.apply_metadata(
            ticket,
            csv_details(&[("Amount", "float")]),
            csv_details(&[("amount", "integer")]),
        )
        .unwrap();

        let key = w.keys().get(0).unwrap();
        assert_eq!(key.dtype1, Some(Dtype::Float));
        // Both sides non-textual: method forced to exact on refresh.
        assert_eq!(key.method, Some(MatchMethod::Exact));
        assert_eq!(
            w.files().get(0).unwrap().sheet_name.as_deref(),
            Some(SYNTHETIC_SHEET)
        );
    }

    #[test]
    fn warnings_accumulate_and_drain() {
        let mut w = paired_wizard();
        w.toggle_file("third.csv");
        w.set_method(ReconMethod::ManyToMany);
        w.set_duplicate_handling(crosscheck_protocol::DuplicateHandling::Sum);

        let warnings = w.take_warnings();
        assert_eq!(
            warnings,
            vec![Warning::SelectionLimit, Warning::NotApplicableForManyToMany]
        );
        assert!(w.take_warnings().is_empty());
    }
}
