//! Criteria Module
//!
//! Immutable boolean predicate trees evaluated against one entry's
//! attribute values.

use std::cmp::Ordering;

use crate::error::Result;
use crate::query::attribute::{AttributeValue, AttributeValues};

// == Criteria Tree ==
/// A boolean predicate tree over attribute values.
///
/// Evaluation is pure apart from triggering attribute resolution in the
/// per-entry value cache. Comparison nodes carry a literal whose type drives
/// the typed attribute fetch; a null resolved attribute never matches a
/// comparison node.
#[derive(Debug, Clone, PartialEq)]
pub enum Criteria {
    /// Matches every entry
    Always,
    /// attribute == literal
    Eq { attribute: String, value: AttributeValue },
    /// attribute != literal (null attributes do not match)
    Ne { attribute: String, value: AttributeValue },
    /// attribute > literal
    Gt { attribute: String, value: AttributeValue },
    /// attribute >= literal
    Ge { attribute: String, value: AttributeValue },
    /// attribute < literal
    Lt { attribute: String, value: AttributeValue },
    /// attribute <= literal
    Le { attribute: String, value: AttributeValue },
    /// min <= attribute <= max (inclusive on both ends)
    Between {
        attribute: String,
        min: AttributeValue,
        max: AttributeValue,
    },
    /// attribute resolves to null
    IsNull(String),
    /// attribute resolves to a non-null value
    NotNull(String),
    /// Logical negation
    Not(Box<Criteria>),
    /// Logical conjunction
    And(Vec<Criteria>),
    /// Logical disjunction
    Or(Vec<Criteria>),
}

impl Criteria {
    // == Constructors ==
    /// Matches every entry.
    pub fn always() -> Self {
        Self::Always
    }

    /// attribute == value
    pub fn eq(attribute: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self::Eq {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// attribute != value
    pub fn ne(attribute: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self::Ne {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// attribute > value
    pub fn gt(attribute: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self::Gt {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// attribute >= value
    pub fn ge(attribute: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self::Ge {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// attribute < value
    pub fn lt(attribute: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self::Lt {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// attribute <= value
    pub fn le(attribute: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self::Le {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// min <= attribute <= max
    pub fn between(
        attribute: impl Into<String>,
        min: impl Into<AttributeValue>,
        max: impl Into<AttributeValue>,
    ) -> Self {
        Self::Between {
            attribute: attribute.into(),
            min: min.into(),
            max: max.into(),
        }
    }

    /// attribute is null
    pub fn is_null(attribute: impl Into<String>) -> Self {
        Self::IsNull(attribute.into())
    }

    /// attribute is non-null
    pub fn not_null(attribute: impl Into<String>) -> Self {
        Self::NotNull(attribute.into())
    }

    // == Combinators ==
    /// Logical conjunction with another criteria.
    pub fn and(self, other: Criteria) -> Self {
        match self {
            Self::And(mut children) => {
                children.push(other);
                Self::And(children)
            }
            first => Self::And(vec![first, other]),
        }
    }

    /// Logical disjunction with another criteria.
    pub fn or(self, other: Criteria) -> Self {
        match self {
            Self::Or(mut children) => {
                children.push(other);
                Self::Or(children)
            }
            first => Self::Or(vec![first, other]),
        }
    }

    /// Logical negation.
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    // == Evaluation ==
    /// Evaluates this criteria against one entry's attribute values.
    ///
    /// Unknown-attribute and type-mismatch failures propagate to the caller;
    /// an entry is never silently skipped.
    pub fn execute(&self, values: &mut AttributeValues<'_>) -> Result<bool> {
        match self {
            Self::Always => Ok(true),
            Self::Eq { attribute, value } => {
                Ok(compare(values, attribute, value)? == Some(Ordering::Equal))
            }
            Self::Ne { attribute, value } => Ok(matches!(
                compare(values, attribute, value)?,
                Some(Ordering::Less) | Some(Ordering::Greater)
            )),
            Self::Gt { attribute, value } => {
                Ok(compare(values, attribute, value)? == Some(Ordering::Greater))
            }
            Self::Ge { attribute, value } => Ok(matches!(
                compare(values, attribute, value)?,
                Some(Ordering::Greater) | Some(Ordering::Equal)
            )),
            Self::Lt { attribute, value } => {
                Ok(compare(values, attribute, value)? == Some(Ordering::Less))
            }
            Self::Le { attribute, value } => Ok(matches!(
                compare(values, attribute, value)?,
                Some(Ordering::Less) | Some(Ordering::Equal)
            )),
            Self::Between {
                attribute,
                min,
                max,
            } => {
                let lower = matches!(
                    compare(values, attribute, min)?,
                    Some(Ordering::Greater) | Some(Ordering::Equal)
                );
                if !lower {
                    return Ok(false);
                }
                Ok(matches!(
                    compare(values, attribute, max)?,
                    Some(Ordering::Less) | Some(Ordering::Equal)
                ))
            }
            Self::IsNull(attribute) => Ok(values.value(attribute)?.is_none()),
            Self::NotNull(attribute) => Ok(values.value(attribute)?.is_some()),
            Self::Not(inner) => Ok(!inner.execute(values)?),
            Self::And(children) => {
                for child in children {
                    if !child.execute(values)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Self::Or(children) => {
                for child in children {
                    if child.execute(values)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }
}

/// Typed comparison of an attribute against a literal.
///
/// Returns `None` when the attribute resolves to null.
fn compare(
    values: &mut AttributeValues<'_>,
    attribute: &str,
    literal: &AttributeValue,
) -> Result<Option<Ordering>> {
    match values.typed_value(attribute, literal.attribute_type())? {
        Some(actual) => Ok(Some(actual.compare(literal)?)),
        None => Ok(None),
    }
}
