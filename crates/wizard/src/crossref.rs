use crate::cardinality::Cardinality;
use crate::warning::Warning;

/// Cross-reference resolution: one column per file, or a custom reference
/// in place of the second column when a side is `many`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrossReference {
    pub column1: Option<String>,
    pub column2: Option<String>,
    pub custom_reference: bool,
}

impl CrossReference {
    pub fn set_column1(&mut self, column: Option<String>) {
        self.column1 = column.filter(|c| !c.is_empty());
    }

    /// Choosing a concrete second column supersedes a custom reference.
    pub fn set_column2(&mut self, column: Option<String>) {
        self.column2 = column.filter(|c| !c.is_empty());
        if self.column2.is_some() {
            self.custom_reference = false;
        }
    }

    /// Turn the custom reference on or off. Only settable while a side's
    /// cardinality is `many`; turning it on nulls the partner column.
    pub fn set_custom_reference(&mut self, on: bool, cardinality: Cardinality) -> Option<Warning> {
        if on && !cardinality.has_many_side() {
            return Some(Warning::CustomReferenceNeedsMany);
        }
        self.custom_reference = on;
        if on {
            self.column2 = None;
        }
        None
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
