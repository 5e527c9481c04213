use crosscheck_protocol::{DuplicateHandling, ReconMethod};

use crate::cardinality::{cardinality_for, Cardinality};
use crate::model::FileSide;
use crate::warning::Warning;

/// Method, duplicate-handling policy and base columns. The three dependent
/// fields are meaningless under a new cardinality pairing, so a method
/// change goes through [`with_method`](Self::with_method), which returns a
/// fresh record instead of mutating field by field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationSettings {
    pub method: ReconMethod,
    pub duplicate_handling: Option<DuplicateHandling>,
    pub base_column1: Option<String>,
    pub base_column2: Option<String>,
}

impl Default for ReconciliationSettings {
    fn default() -> Self {
        Self {
            method: ReconMethod::OneToOne,
            duplicate_handling: None,
            base_column1: None,
            base_column2: None,
        }
    }
}

impl ReconciliationSettings {
    /// Transition to a new method. Everything else resets.
    pub fn with_method(&self, method: ReconMethod) -> Self {
        Self {
            method,
            duplicate_handling: None,
            base_column1: None,
            base_column2: None,
        }
    }

    pub fn cardinality(&self) -> Cardinality {
        cardinality_for(self.method)
    }

    pub fn set_duplicate_handling(&mut self, handling: DuplicateHandling) -> Option<Warning> {
        if self.method == ReconMethod::ManyToMany {
            return Some(Warning::NotApplicableForManyToMany);
        }
        self.duplicate_handling = Some(handling);
        None
    }

    /// Set or clear a base column. Empty input clears.
    pub fn set_base_column(&mut self, side: FileSide, column: &str) -> Option<Warning> {
        if self.method == ReconMethod::ManyToMany {
            return Some(Warning::NotApplicableForManyToMany);
        }
        let slot = match side {
            FileSide::File1 => &mut self.base_column1,
            FileSide::File2 => &mut self.base_column2,
        };
        *slot = if column.is_empty() { None } else { Some(column.to_string()) };
        None
    }

    pub fn base_column(&self, side: FileSide) -> Option<&str> {
        match side {
            FileSide::File1 => self.base_column1.as_deref(),
            FileSide::File2 => self.base_column2.as_deref(),
        }
    }
}
