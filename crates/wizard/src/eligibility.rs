//! Column eligibility for the wizard's dropdowns.
//!
//! One pure function answers "which columns may this dropdown offer" for
//! every role slot, instead of per-dropdown filtering scattered through
//! render logic. Re-evaluated on demand from current key/value state.

use std::collections::BTreeSet;

use crate::cardinality::{Cardinality, Multiplicity};
use crate::keys::MatchingKeySet;
use crate::model::{FileSide, SheetMeta};
use crate::values::ValuePairSet;

/// The dropdown being populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleSlot {
    /// A compared-value column; `row` is the value row whose own selection
    /// must stay offered while other rows' selections are excluded.
    Value { row: Option<usize> },
    /// The base column of the duplicate-handling settings.
    Base,
    /// The cross-reference column.
    CrossRef,
}

/// Result of an eligibility query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Eligible {
    pub columns: Vec<String>,
    /// A synthetic "custom reference" entry is offered in place of a
    /// concrete column (cross-reference slot on a `many` side only).
    pub offers_custom_reference: bool,
}

/// Compute the eligible columns for one dropdown.
pub fn eligible_columns(
    slot: RoleSlot,
    side: FileSide,
    cardinality: Cardinality,
    sheet: &SheetMeta,
    keys: &MatchingKeySet,
    values: &ValuePairSet,
) -> Eligible {
    let key_columns = keys.columns_for(side);
    let multiplicity = cardinality.side(side);

    match slot {
        RoleSlot::Value { row } => {
            let taken = values.columns_for(side, row);
            Eligible {
                columns: sheet
                    .column_names()
                    .filter(|c| !key_columns.contains(c) && !taken.contains(c))
                    .map(str::to_string)
                    .collect(),
                offers_custom_reference: false,
            }
        }
        RoleSlot::Base => {
            let role_columns = role_union(&key_columns, values, side);
            let columns = match multiplicity {
                // The many side's base must anchor to an already-defined
                // role column; the one side takes the complement.
                Multiplicity::Many => sheet
                    .column_names()
                    .filter(|c| role_columns.contains(c))
                    .map(str::to_string)
                    .collect(),
                Multiplicity::One => sheet
                    .column_names()
                    .filter(|c| !role_columns.contains(c))
                    .map(str::to_string)
                    .collect(),
            };
            Eligible { columns, offers_custom_reference: false }
        }
        RoleSlot::CrossRef => match multiplicity {
            Multiplicity::Many => {
                let role_columns = role_union(&key_columns, values, side);
                Eligible {
                    columns: sheet
                        .column_names()
                        .filter(|c| role_columns.contains(c))
                        .map(str::to_string)
                        .collect(),
                    offers_custom_reference: true,
                }
            }
            Multiplicity::One => Eligible {
                columns: sheet.column_names().map(str::to_string).collect(),
                offers_custom_reference: false,
            },
        },
    }
}

fn role_union<'a>(
    key_columns: &BTreeSet<&'a str>,
    values: &'a ValuePairSet,
    side: FileSide,
) -> BTreeSet<&'a str> {
    let mut union = key_columns.clone();
    union.extend(values.columns_for(side, None));
    union
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cardinality::cardinality_for;
    use crate::keys::KeyUpdate;
    use crate::model::{ColumnDescriptor, Dtype, SheetPair};
    use crate::values::ValueUpdate;
    use crosscheck_protocol::ReconMethod;

    fn sheet(names: &[&str]) -> SheetMeta {
        SheetMeta {
            columns: names
                .iter()
                .map(|n| ColumnDescriptor { name: n.to_string(), dtype: Dtype::Text })
                .collect(),
        }
    }

    /// file1 sheet with key "Invoice" and value "Amount" assigned.
    fn fixture() -> (SheetMeta, SheetMeta, MatchingKeySet, ValuePairSet) {
        let s1 = sheet(&["Invoice", "Amount", "Date", "Note"]);
        let s2 = sheet(&["invoice_no", "amount", "posted", "memo"]);
        let mut keys = MatchingKeySet::new();
        let mut values = ValuePairSet::new();
        {
            let sheets = SheetPair { file1: Some(&s1), file2: Some(&s2) };
            keys.update(0, KeyUpdate::Column1("Invoice".into()), &sheets).unwrap();
            keys.update(0, KeyUpdate::Column2("invoice_no".into()), &sheets).unwrap();
            values.update(0, ValueUpdate::Column1("Amount".into()), &sheets, &keys).unwrap();
            values.update(0, ValueUpdate::Column2("amount".into()), &sheets, &keys).unwrap();
        }
        (s1, s2, keys, values)
    }

    #[test]
    fn value_slot_excludes_keys_and_other_rows() {
        let (s1, _, keys, mut values) = fixture();
        values.add();
        let card = cardinality_for(ReconMethod::OneToOne);

        let eligible = eligible_columns(
            RoleSlot::Value { row: Some(1) },
            FileSide::File1,
            card,
            &s1,
            &keys,
            &values,
        );
        // "Invoice" is a key, "Amount" is row 0's value.
        assert_eq!(eligible.columns, vec!["Date".to_string(), "Note".to_string()]);

        // Row 0's own dropdown keeps offering its current selection.
        let own = eligible_columns(
            RoleSlot::Value { row: Some(0) },
            FileSide::File1,
            card,
            &s1,
            &keys,
            &values,
        );
        assert!(own.columns.contains(&"Amount".to_string()));
    }

    #[test]
    fn base_slot_on_many_side_is_role_columns_only() {
        let (s1, _, keys, values) = fixture();
        let card = cardinality_for(ReconMethod::ManyToOne); // file1 = many

        let eligible =
            eligible_columns(RoleSlot::Base, FileSide::File1, card, &s1, &keys, &values);
        assert_eq!(eligible.columns, vec!["Invoice".to_string(), "Amount".to_string()]);
    }

    #[test]
    fn base_slot_on_one_side_is_the_complement() {
        let (_, s2, keys, values) = fixture();
        let card = cardinality_for(ReconMethod::ManyToOne); // file2 = one

        let eligible =
            eligible_columns(RoleSlot::Base, FileSide::File2, card, &s2, &keys, &values);
        assert_eq!(eligible.columns, vec!["posted".to_string(), "memo".to_string()]);
    }

    #[test]
    fn cross_ref_on_many_side_offers_custom_reference() {
        let (_, s2, keys, values) = fixture();
        let card = cardinality_for(ReconMethod::OneToMany); // file2 = many

        let eligible =
            eligible_columns(RoleSlot::CrossRef, FileSide::File2, card, &s2, &keys, &values);
        assert!(eligible.offers_custom_reference);
        assert_eq!(eligible.columns, vec!["invoice_no".to_string(), "amount".to_string()]);
    }

    #[test]
    fn cross_ref_on_one_side_offers_everything() {
        let (s1, _, keys, values) = fixture();
        let card = cardinality_for(ReconMethod::OneToMany); // file1 = one

        let eligible =
            eligible_columns(RoleSlot::CrossRef, FileSide::File1, card, &s1, &keys, &values);
        assert!(!eligible.offers_custom_reference);
        assert_eq!(eligible.columns.len(), 4);
    }
}
