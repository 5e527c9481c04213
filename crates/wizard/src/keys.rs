use std::collections::BTreeSet;

use crosscheck_protocol::MatchMethod;

use crate::error::WizardError;
use crate::model::{Dtype, FileSide, SheetPair};
use crate::warning::Warning;

/// One matching-key definition. Empty column strings mean "not chosen yet".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchingKey {
    pub column1: String,
    pub column2: String,
    pub method: Option<MatchMethod>,
    pub case_sensitive: bool,
    pub ignore_special_chars: bool,
    pub dtype1: Option<Dtype>,
    pub dtype2: Option<Dtype>,
}

impl MatchingKey {
    pub fn is_complete(&self) -> bool {
        !self.column1.is_empty() && !self.column2.is_empty()
    }

    fn both_non_textual(&self) -> bool {
        matches!(
            (self.dtype1, self.dtype2),
            (Some(d1), Some(d2)) if !d1.is_textual() && !d2.is_textual()
        )
    }
}

/// A single field mutation on a key pair.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyUpdate {
    Column1(String),
    Column2(String),
    Method(MatchMethod),
    CaseSensitive(bool),
    IgnoreSpecialChars(bool),
}

/// Ordered collection of key pairs. Always holds at least one pair.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchingKeySet {
    pairs: Vec<MatchingKey>,
}

impl Default for MatchingKeySet {
    fn default() -> Self {
        Self { pairs: vec![MatchingKey::default()] }
    }
}

impl MatchingKeySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn get(&self, index: usize) -> Option<&MatchingKey> {
        self.pairs.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MatchingKey> {
        self.pairs.iter()
    }

    pub fn add(&mut self) {
        self.pairs.push(MatchingKey::default());
    }

    /// Remove a pair; the last remaining pair stays put with a warning.
    pub fn remove(&mut self, index: usize) -> Result<Option<Warning>, WizardError> {
        if index >= self.pairs.len() {
            return Err(WizardError::NoSuchRow { what: "key pair", index });
        }
        if self.pairs.len() == 1 {
            return Ok(Some(Warning::LastKeyPair));
        }
        self.pairs.remove(index);
        Ok(None)
    }

    /// Back to the initial single empty pair (downstream reset).
    pub fn reset(&mut self) {
        self.pairs = vec![MatchingKey::default()];
    }

    /// Apply one field update. Column changes re-derive the side's dtype
    /// from the bound sheet; afterwards the exact-method rule is enforced:
    /// once both dtypes are known and neither is textual, `method` is
    /// `Exact` no matter what was (or is being) set.
    pub fn update(
        &mut self,
        index: usize,
        update: KeyUpdate,
        sheets: &SheetPair<'_>,
    ) -> Result<(), WizardError> {
        let pair = self
            .pairs
            .get_mut(index)
            .ok_or(WizardError::NoSuchRow { what: "key pair", index })?;

        match update {
            KeyUpdate::Column1(column) => {
                let dtype = resolve_dtype(sheets, FileSide::File1, &column)?;
                pair.column1 = column;
                pair.dtype1 = dtype;
            }
            KeyUpdate::Column2(column) => {
                let dtype = resolve_dtype(sheets, FileSide::File2, &column)?;
                pair.column2 = column;
                pair.dtype2 = dtype;
            }
            KeyUpdate::Method(method) => pair.method = Some(method),
            KeyUpdate::CaseSensitive(on) => pair.case_sensitive = on,
            KeyUpdate::IgnoreSpecialChars(on) => pair.ignore_special_chars = on,
        }

        if pair.both_non_textual() {
            pair.method = Some(MatchMethod::Exact);
        }
        Ok(())
    }

    /// Re-derive every pair's dtypes after a sheet change, then re-apply
    /// the exact-method rule.
    pub fn refresh_dtypes(&mut self, sheets: &SheetPair<'_>) {
        for pair in &mut self.pairs {
            pair.dtype1 = lookup(sheets, FileSide::File1, &pair.column1);
            pair.dtype2 = lookup(sheets, FileSide::File2, &pair.column2);
            if pair.both_non_textual() {
                pair.method = Some(MatchMethod::Exact);
            }
        }
    }

    /// Columns currently serving as a key on one side.
    pub fn columns_for(&self, side: FileSide) -> BTreeSet<&str> {
        self.pairs
            .iter()
            .map(|p| match side {
                FileSide::File1 => p.column1.as_str(),
                FileSide::File2 => p.column2.as_str(),
            })
            .filter(|c| !c.is_empty())
            .collect()
    }

    pub fn uses_column(&self, side: FileSide, column: &str) -> bool {
        !column.is_empty() && self.columns_for(side).contains(column)
    }
}

fn resolve_dtype(
    sheets: &SheetPair<'_>,
    side: FileSide,
    column: &str,
) -> Result<Option<Dtype>, WizardError> {
    if column.is_empty() {
        return Ok(None);
    }
    match sheets.sheet(side) {
        Some(sheet) => sheet.dtype_of(column).map(Some).ok_or(WizardError::UnknownColumn {
            side: side_name(side),
            column: column.to_string(),
        }),
        // No metadata bound yet: accept the column, leave the dtype open.
        None => Ok(None),
    }
}

fn lookup(sheets: &SheetPair<'_>, side: FileSide, column: &str) -> Option<Dtype> {
    if column.is_empty() {
        None
    } else {
        sheets.dtype_of(side, column)
    }
}

fn side_name(side: FileSide) -> &'static str {
    match side {
        FileSide::File1 => "file1",
        FileSide::File2 => "file2",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColumnDescriptor, SheetMeta};

    fn sheet(cols: &[(&str, Dtype)]) -> SheetMeta {
        SheetMeta {
            columns: cols
                .iter()
                .map(|(n, d)| ColumnDescriptor { name: n.to_string(), dtype: *d })
                .collect(),
        }
    }

    fn pair<'a>(s1: &'a SheetMeta, s2: &'a SheetMeta) -> SheetPair<'a> {
        SheetPair { file1: Some(s1), file2: Some(s2) }
    }

    #[test]
    fn starts_with_one_empty_pair() {
        let keys = MatchingKeySet::new();
        assert_eq!(keys.len(), 1);
        assert!(!keys.get(0).unwrap().is_complete());
    }

    #[test]
    fn last_pair_cannot_be_removed() {
        let mut keys = MatchingKeySet::new();
        assert_eq!(keys.remove(0).unwrap(), Some(Warning::LastKeyPair));
        assert_eq!(keys.len(), 1);

        keys.add();
        assert_eq!(keys.remove(0).unwrap(), None);
        assert_eq!(keys.len(), 1);
    }

    #[test]
    fn column_update_derives_dtypes() {
        let s1 = sheet(&[("Invoice", Dtype::Text), ("Amount", Dtype::Float)]);
        let s2 = sheet(&[("invoice_no", Dtype::Text)]);
        let sheets = pair(&s1, &s2);

        let mut keys = MatchingKeySet::new();
        keys.update(0, KeyUpdate::Column1("Invoice".into()), &sheets).unwrap();
        keys.update(0, KeyUpdate::Column2("invoice_no".into()), &sheets).unwrap();

        let k = keys.get(0).unwrap();
        assert_eq!(k.dtype1, Some(Dtype::Text));
        assert_eq!(k.dtype2, Some(Dtype::Text));
        assert_eq!(k.method, None); // textual pair: user still has to choose
    }

    #[test]
    fn non_textual_pair_forces_exact() {
        let s1 = sheet(&[("Amount", Dtype::Float)]);
        let s2 = sheet(&[("amount", Dtype::Integer)]);
        let sheets = pair(&s1, &s2);

        let mut keys = MatchingKeySet::new();
        keys.update(0, KeyUpdate::Method(MatchMethod::Fuzzy), &sheets).unwrap();
        keys.update(0, KeyUpdate::Column1("Amount".into()), &sheets).unwrap();
        keys.update(0, KeyUpdate::Column2("amount".into()), &sheets).unwrap();
        assert_eq!(keys.get(0).unwrap().method, Some(MatchMethod::Exact));

        // A later fuzzy request is overridden as well.
        keys.update(0, KeyUpdate::Method(MatchMethod::Fuzzy), &sheets).unwrap();
        assert_eq!(keys.get(0).unwrap().method, Some(MatchMethod::Exact));
    }

    #[test]
    fn changing_column_reopens_method() {
        let s1 = sheet(&[("Amount", Dtype::Float), ("Invoice", Dtype::Text)]);
        let s2 = sheet(&[("amount", Dtype::Integer), ("invoice_no", Dtype::Text)]);
        let sheets = pair(&s1, &s2);

        let mut keys = MatchingKeySet::new();
        keys.update(0, KeyUpdate::Column1("Amount".into()), &sheets).unwrap();
        keys.update(0, KeyUpdate::Column2("amount".into()), &sheets).unwrap();
        assert_eq!(keys.get(0).unwrap().method, Some(MatchMethod::Exact));

        // Switching to a textual pair lifts the force; the stored method
        // stays Exact until the user changes it.
        keys.update(0, KeyUpdate::Column1("Invoice".into()), &sheets).unwrap();
        keys.update(0, KeyUpdate::Column2("invoice_no".into()), &sheets).unwrap();
        keys.update(0, KeyUpdate::Method(MatchMethod::Fuzzy), &sheets).unwrap();
        assert_eq!(keys.get(0).unwrap().method, Some(MatchMethod::Fuzzy));
    }

    #[test]
    fn unknown_column_rejected_when_metadata_present() {
        let s1 = sheet(&[("Invoice", Dtype::Text)]);
        let s2 = sheet(&[("invoice_no", Dtype::Text)]);
        let sheets = pair(&s1, &s2);

        let mut keys = MatchingKeySet::new();
        let err = keys.update(0, KeyUpdate::Column1("Typo".into()), &sheets).unwrap_err();
        assert!(matches!(err, WizardError::UnknownColumn { .. }));
    }

    #[test]
    fn columns_for_skips_empty() {
        let s1 = sheet(&[("Invoice", Dtype::Text)]);
        let s2 = sheet(&[("invoice_no", Dtype::Text)]);
        let sheets = pair(&s1, &s2);

        let mut keys = MatchingKeySet::new();
        keys.update(0, KeyUpdate::Column1("Invoice".into()), &sheets).unwrap();
        keys.add();

        assert_eq!(keys.columns_for(FileSide::File1).len(), 1);
        assert!(keys.uses_column(FileSide::File1, "Invoice"));
        assert!(!keys.uses_column(FileSide::File1, ""));
        assert!(keys.columns_for(FileSide::File2).is_empty());
    }
}
