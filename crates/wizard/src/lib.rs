//! `crosscheck-wizard` — Reconciliation configuration wizard state machine.
//!
//! Pure state crate: receives fetched column metadata, enforces the wizard's
//! role-exclusivity and step-gating rules, and produces the engine request.
//! No CLI or IO dependencies.

pub mod cardinality;
pub mod crossref;
pub mod eligibility;
pub mod error;
pub mod files;
pub mod keys;
pub mod model;
pub mod payload;
pub mod settings;
pub mod steps;
pub mod values;
pub mod warning;
pub mod wizard;

pub use cardinality::{cardinality_for, Cardinality, Multiplicity};
pub use eligibility::{eligible_columns, Eligible, RoleSlot};
pub use error::WizardError;
pub use model::{ColumnDescriptor, Dtype, FileMeta, FileRef, FileSide, SheetMeta};
pub use payload::{assemble, hydrate};
pub use steps::WizardStep;
pub use warning::Warning;
pub use wizard::Wizard;

pub use crosscheck_protocol::{DuplicateHandling, MatchMethod, ReconMethod, ThresholdType};
