use crosscheck_protocol::ReconMethod;

use crate::model::FileSide;

/// One side of the derived cardinality relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiplicity {
    One,
    Many,
}

/// Cardinality of the two files under the current reconciliation method.
/// Derived, never stored — always recompute from the settings method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cardinality {
    pub file1: Multiplicity,
    pub file2: Multiplicity,
}

impl Cardinality {
    pub fn side(&self, side: FileSide) -> Multiplicity {
        match side {
            FileSide::File1 => self.file1,
            FileSide::File2 => self.file2,
        }
    }

    pub fn has_many_side(&self) -> bool {
        self.file1 == Multiplicity::Many || self.file2 == Multiplicity::Many
    }
}

/// Pure mapping from method to per-file cardinality.
pub fn cardinality_for(method: ReconMethod) -> Cardinality {
    use Multiplicity::{Many, One};
    match method {
        ReconMethod::OneToOne => Cardinality { file1: One, file2: One },
        ReconMethod::OneToMany => Cardinality { file1: One, file2: Many },
        ReconMethod::ManyToOne => Cardinality { file1: Many, file2: One },
        ReconMethod::ManyToMany => Cardinality { file1: Many, file2: Many },
    }
}
