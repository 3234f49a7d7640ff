//! Ordering Module
//!
//! Multi-key sort directions, null placement rules, and the compound
//! comparator used to order query results.

use std::cmp::Ordering as CmpOrdering;

use crate::error::Result;
use crate::query::attribute::AttributeValue;

// == Direction ==
/// Sort direction for one ordering column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Smallest first; null sorts before any non-null value
    Ascending,
    /// Largest first; null sorts after any non-null value
    Descending,
}

// == Ordering ==
/// One (attribute, direction) ordering column.
///
/// A query's orderings are evaluated left-to-right as a tie-break chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Ordering {
    /// Attribute supplying the sort key
    pub attribute: String,
    /// Sort direction for this column
    pub direction: Direction,
}

impl Ordering {
    /// Creates an ordering column.
    pub fn new(attribute: impl Into<String>, direction: Direction) -> Self {
        Self {
            attribute: attribute.into(),
            direction,
        }
    }
}

// == Sort Key Comparison ==
/// Compares two captured sort keys under one column's direction.
///
/// Null placement is direction-dependent: ascending puts nulls first,
/// descending puts nulls last, and two nulls always tie. Non-null keys use
/// their natural ordering; the caller must have validated that the column is
/// type-uniform, so a cross-type pair degrades to a tie rather than panicking.
pub(crate) fn compare_sort_keys(
    a: Option<&AttributeValue>,
    b: Option<&AttributeValue>,
    direction: Direction,
) -> CmpOrdering {
    match (a, b) {
        (None, None) => CmpOrdering::Equal,
        (None, Some(_)) => match direction {
            Direction::Ascending => CmpOrdering::Less,
            Direction::Descending => CmpOrdering::Greater,
        },
        (Some(_), None) => match direction {
            Direction::Ascending => CmpOrdering::Greater,
            Direction::Descending => CmpOrdering::Less,
        },
        (Some(a), Some(b)) => {
            let natural = a.compare(b).unwrap_or(CmpOrdering::Equal);
            match direction {
                Direction::Ascending => natural,
                Direction::Descending => natural.reverse(),
            }
        }
    }
}

/// Compares two results' captured sort-key rows as a tie-break chain.
pub(crate) fn compare_sort_rows(
    a: &[Option<AttributeValue>],
    b: &[Option<AttributeValue>],
    orderings: &[Ordering],
) -> CmpOrdering {
    for (pos, ordering) in orderings.iter().enumerate() {
        let cmp = compare_sort_keys(
            a.get(pos).and_then(Option::as_ref),
            b.get(pos).and_then(Option::as_ref),
            ordering.direction,
        );
        if cmp != CmpOrdering::Equal {
            return cmp;
        }
    }
    CmpOrdering::Equal
}

/// Checks that every non-null sort key in one column shares a single type.
///
/// Mixing types in one sort column is a caller error reported before any
/// sorting happens, not a silent wraparound during the sort.
pub(crate) fn validate_column<'a>(
    keys: impl Iterator<Item = Option<&'a AttributeValue>>,
) -> Result<()> {
    let mut column_type = None;
    for key in keys.flatten() {
        match column_type {
            None => column_type = Some(key.attribute_type()),
            Some(expected) if expected != key.attribute_type() => {
                return Err(crate::error::StoreError::NotComparable(
                    expected,
                    key.attribute_type(),
                ));
            }
            Some(_) => {}
        }
    }
    Ok(())
}
