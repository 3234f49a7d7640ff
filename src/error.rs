//! Error types for the cache store and query engine
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

use crate::query::AttributeType;

// == Store Error Enum ==
/// Unified error type for the store and its embedded query engine.
///
/// Every variant indicates caller misuse or schema drift; none are transient
/// and none are retried internally. The surrounding cache facade decides how
/// to present them.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Unrecognized eviction-policy selector or otherwise invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// A query referenced an attribute with no registered extractor
    #[error("No such search attribute named [{0}]")]
    UnknownAttribute(String),

    /// A typed attribute fetch disagreed with the resolved attribute type
    #[error("Expecting value of type ({expected}) for attribute [{attribute}] but was ({actual})")]
    TypeMismatch {
        /// Attribute whose fetch failed
        attribute: String,
        /// Type the caller asked for
        expected: AttributeType,
        /// Type the extractor actually produced
        actual: AttributeType,
    },

    /// Two values of different types were compared in an ordering
    #[error("Values of type ({0}) and ({1}) are not comparable")]
    NotComparable(AttributeType, AttributeType),

    /// A numeric aggregation was fed a non-numeric attribute value
    #[error("Cannot aggregate non-numeric attribute [{attribute}] of type ({actual})")]
    NonNumericAggregate {
        /// Attribute being aggregated
        attribute: String,
        /// Type the extractor produced
        actual: AttributeType,
    },

    /// An attribute was read from a result that did not request it
    #[error("Attribute [{0}] not included in query")]
    AttributeNotRequested(String),

    /// A key was read from a result whose query did not request keys
    #[error("Keys not included in query")]
    KeysNotRequested,

    /// The aggregate accessor was called on a non-aggregate result set
    #[error("No aggregate present")]
    NoAggregate,

    /// A range request exceeded the available result count
    #[error("Range [{start}, {start}+{length}) out of bounds for {size} results")]
    RangeOutOfBounds {
        /// Requested start offset
        start: usize,
        /// Requested range length
        length: usize,
        /// Number of results actually available
        size: usize,
    },
}

// == Result Type Alias ==
/// Convenience Result type for the store.
pub type Result<T> = std::result::Result<T, StoreError>;
