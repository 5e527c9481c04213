use std::collections::BTreeSet;

use crosscheck_protocol::ThresholdType;

use crate::error::WizardError;
use crate::keys::MatchingKeySet;
use crate::model::{Dtype, FileSide, SheetPair};
use crate::warning::Warning;

/// One compared-value pair with an optional numeric threshold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValuePair {
    pub column1: String,
    pub column2: String,
    pub threshold_enabled: bool,
    pub threshold_type: Option<ThresholdType>,
    pub threshold_value: Option<f64>,
    pub dtype1: Option<Dtype>,
    pub dtype2: Option<Dtype>,
}

impl ValuePair {
    pub fn is_complete(&self) -> bool {
        !self.column1.is_empty() && !self.column2.is_empty()
    }

    pub fn has_numeric_side(&self) -> bool {
        self.dtype1.is_some_and(Dtype::is_numeric) || self.dtype2.is_some_and(Dtype::is_numeric)
    }

    fn clear_threshold(&mut self) {
        self.threshold_enabled = false;
        self.threshold_type = None;
        self.threshold_value = None;
    }
}

/// A single field mutation on a value pair.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueUpdate {
    Column1(String),
    Column2(String),
    ThresholdEnabled(bool),
    ThresholdType(ThresholdType),
    ThresholdValue(f64),
}

/// Ordered collection of value pairs. Same shape as the key set: always at
/// least one pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuePairSet {
    pairs: Vec<ValuePair>,
}

impl Default for ValuePairSet {
    fn default() -> Self {
        Self { pairs: vec![ValuePair::default()] }
    }
}

impl ValuePairSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn get(&self, index: usize) -> Option<&ValuePair> {
        self.pairs.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValuePair> {
        self.pairs.iter()
    }

    pub fn add(&mut self) {
        self.pairs.push(ValuePair::default());
    }

    pub fn remove(&mut self, index: usize) -> Result<Option<Warning>, WizardError> {
        if index >= self.pairs.len() {
            return Err(WizardError::NoSuchRow { what: "value pair", index });
        }
        if self.pairs.len() == 1 {
            return Ok(Some(Warning::LastValuePair));
        }
        self.pairs.remove(index);
        Ok(None)
    }

    pub fn reset(&mut self) {
        self.pairs = vec![ValuePair::default()];
    }

    /// Apply one field update.
    ///
    /// A column choice that collides with a matching key on the same side is
    /// auto-corrected: the field resets to empty, the row's threshold
    /// configuration is cleared, and a warning is returned. Threshold
    /// enablement requires a numeric column on at least one side.
    pub fn update(
        &mut self,
        index: usize,
        update: ValueUpdate,
        sheets: &SheetPair<'_>,
        keys: &MatchingKeySet,
    ) -> Result<Option<Warning>, WizardError> {
        let pair = self
            .pairs
            .get_mut(index)
            .ok_or(WizardError::NoSuchRow { what: "value pair", index })?;

        match update {
            ValueUpdate::Column1(column) => {
                if keys.uses_column(FileSide::File1, &column) {
                    pair.column1.clear();
                    pair.dtype1 = None;
                    pair.clear_threshold();
                    return Ok(Some(Warning::ColumnIsKey {
                        side: FileSide::File1,
                        column,
                    }));
                }
                let dtype = resolve_dtype(sheets, FileSide::File1, &column)?;
                pair.column1 = column;
                pair.dtype1 = dtype;
            }
            ValueUpdate::Column2(column) => {
                if keys.uses_column(FileSide::File2, &column) {
                    pair.column2.clear();
                    pair.dtype2 = None;
                    pair.clear_threshold();
                    return Ok(Some(Warning::ColumnIsKey {
                        side: FileSide::File2,
                        column,
                    }));
                }
                let dtype = resolve_dtype(sheets, FileSide::File2, &column)?;
                pair.column2 = column;
                pair.dtype2 = dtype;
            }
            ValueUpdate::ThresholdEnabled(true) => {
                if !pair.has_numeric_side() {
                    return Ok(Some(Warning::ThresholdNeedsNumeric { row: index }));
                }
                pair.threshold_enabled = true;
                return Ok(None);
            }
            ValueUpdate::ThresholdEnabled(false) => {
                pair.clear_threshold();
                return Ok(None);
            }
            ValueUpdate::ThresholdType(t) => {
                if !pair.threshold_enabled {
                    return Ok(Some(Warning::ThresholdNotEnabled { row: index }));
                }
                pair.threshold_type = Some(t);
                return Ok(None);
            }
            ValueUpdate::ThresholdValue(v) => {
                if !pair.threshold_enabled {
                    return Ok(Some(Warning::ThresholdNotEnabled { row: index }));
                }
                pair.threshold_value = Some(v);
                return Ok(None);
            }
        }

        // Column changed: a threshold that lost its numeric side is invalid.
        if pair.threshold_enabled && !pair.has_numeric_side() {
            pair.clear_threshold();
            return Ok(Some(Warning::ThresholdNeedsNumeric { row: index }));
        }
        Ok(None)
    }

    /// Re-derive dtypes after a sheet change, dropping thresholds that lost
    /// their numeric side.
    pub fn refresh_dtypes(&mut self, sheets: &SheetPair<'_>) {
        for pair in &mut self.pairs {
            pair.dtype1 = lookup(sheets, FileSide::File1, &pair.column1);
            pair.dtype2 = lookup(sheets, FileSide::File2, &pair.column2);
            if pair.threshold_enabled && !pair.has_numeric_side() {
                pair.clear_threshold();
            }
        }
    }

    /// Columns used as a value on one side, optionally ignoring one row
    /// (the row whose dropdown is being populated).
    pub fn columns_for(&self, side: FileSide, skip_row: Option<usize>) -> BTreeSet<&str> {
        self.pairs
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != skip_row)
            .map(|(_, p)| match side {
                FileSide::File1 => p.column1.as_str(),
                FileSide::File2 => p.column2.as_str(),
            })
            .filter(|c| !c.is_empty())
            .collect()
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
            side: match side {
                FileSide::File1 => "file1",
                FileSide::File2 => "file2",
            },
            column: column.to_string(),
        }),
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
