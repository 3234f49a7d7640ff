//! Aggregation Module
//!
//! Single-pass aggregation functions fed one attribute value per matching
//! entry during query execution.

use crate::error::{Result, StoreError};
use crate::query::attribute::AttributeValue;

// == Aggregation Kind ==
/// The closed set of aggregation functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// Sum of non-null numeric values
    Sum,
    /// Minimum non-null value by natural ordering
    Min,
    /// Maximum non-null value by natural ordering
    Max,
    /// Arithmetic mean of non-null numeric values
    Average,
    /// Number of matched entries (null attributes included)
    Count,
}

// == Attribute Aggregator ==
/// One (attribute, aggregation function) pair declared on a query.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeAggregator {
    /// Attribute whose values feed the accumulator
    pub attribute: String,
    /// Aggregation function applied
    pub aggregation: Aggregation,
}

impl AttributeAggregator {
    /// Creates an aggregator declaration.
    pub fn new(attribute: impl Into<String>, aggregation: Aggregation) -> Self {
        Self {
            attribute: attribute.into(),
            aggregation,
        }
    }
}

// == Accumulator State ==
/// Runtime accumulator for one aggregator during a single query execution.
#[derive(Debug)]
pub(crate) struct AggregatorState {
    attribute: String,
    accumulator: Accumulator,
}

#[derive(Debug)]
enum Accumulator {
    Sum(Option<AttributeValue>),
    Min(Option<AttributeValue>),
    Max(Option<AttributeValue>),
    Average { sum: f64, count: u64 },
    Count(u64),
}

impl AggregatorState {
    /// Creates an empty accumulator for a declared aggregator.
    pub(crate) fn new(declaration: &AttributeAggregator) -> Self {
        let accumulator = match declaration.aggregation {
            Aggregation::Sum => Accumulator::Sum(None),
            Aggregation::Min => Accumulator::Min(None),
            Aggregation::Max => Accumulator::Max(None),
            Aggregation::Average => Accumulator::Average { sum: 0.0, count: 0 },
            Aggregation::Count => Accumulator::Count(0),
        };
        Self {
            attribute: declaration.attribute.clone(),
            accumulator,
        }
    }

    /// The attribute this accumulator reads per matching entry.
    pub(crate) fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Feeds one matched entry's attribute value into the accumulator.
    ///
    /// Null inputs are skipped by Sum/Min/Max/Average and counted only by
    /// Count, which counts matched entries rather than values.
    pub(crate) fn accept(&mut self, value: Option<&AttributeValue>) -> Result<()> {
        match &mut self.accumulator {
            Accumulator::Count(n) => {
                *n += 1;
                Ok(())
            }
            Accumulator::Sum(acc) => {
                if let Some(value) = value {
                    *acc = Some(add_numeric(acc.take(), value, &self.attribute)?);
                }
                Ok(())
            }
            Accumulator::Average { sum, count } => {
                if let Some(value) = value {
                    *sum += as_f64(value, &self.attribute)?;
                    *count += 1;
                }
                Ok(())
            }
            Accumulator::Min(acc) => {
                if let Some(value) = value {
                    let replace = match acc {
                        Some(current) => value.compare(current)? == std::cmp::Ordering::Less,
                        None => true,
                    };
                    if replace {
                        *acc = Some(value.clone());
                    }
                }
                Ok(())
            }
            Accumulator::Max(acc) => {
                if let Some(value) = value {
                    let replace = match acc {
                        Some(current) => value.compare(current)? == std::cmp::Ordering::Greater,
                        None => true,
                    };
                    if replace {
                        *acc = Some(value.clone());
                    }
                }
                Ok(())
            }
        }
    }

    /// Produces the aggregate value.
    ///
    /// An accumulator that never saw a non-null input yields null, except
    /// Count which yields 0.
    pub(crate) fn result(&self) -> Option<AttributeValue> {
        match &self.accumulator {
            Accumulator::Sum(acc) | Accumulator::Min(acc) | Accumulator::Max(acc) => acc.clone(),
            Accumulator::Average { sum, count } => {
                if *count == 0 {
                    None
                } else {
                    Some(AttributeValue::Float(sum / *count as f64))
                }
            }
            Accumulator::Count(n) => Some(AttributeValue::Int(*n as i64)),
        }
    }
}

/// Adds a numeric value onto a running sum, promoting to float when either
/// side is a float.
fn add_numeric(
    acc: Option<AttributeValue>,
    value: &AttributeValue,
    attribute: &str,
) -> Result<AttributeValue> {
    use AttributeValue::{Float, Int};
    match (acc, value) {
        (None, Int(b)) => Ok(Int(*b)),
        (None, Float(b)) => Ok(Float(*b)),
        (Some(Int(a)), Int(b)) => Ok(Int(a + b)),
        (Some(Int(a)), Float(b)) => Ok(Float(a as f64 + b)),
        (Some(Float(a)), Int(b)) => Ok(Float(a + *b as f64)),
        (Some(Float(a)), Float(b)) => Ok(Float(a + b)),
        (_, other) => Err(StoreError::NonNumericAggregate {
            attribute: attribute.to_string(),
            actual: other.attribute_type(),
        }),
    }
}

/// Converts a numeric attribute value to f64, rejecting non-numeric input.
fn as_f64(value: &AttributeValue, attribute: &str) -> Result<f64> {
    match value {
        AttributeValue::Int(i) => Ok(*i as f64),
        AttributeValue::Float(f) => Ok(*f),
        other => Err(StoreError::NonNumericAggregate {
            attribute: attribute.to_string(),
            actual: other.attribute_type(),
        }),
    }
}
