//! Query Module
//!
//! The embedded query engine: attribute extraction, criteria evaluation,
//! multi-key ordering, aggregation and result construction.

mod aggregator;
mod attribute;
mod criteria;
pub(crate) mod executor;
mod ordering;
mod results;
mod store_query;

// Re-export public types
pub use aggregator::{Aggregation, AttributeAggregator};
pub use attribute::{
    json_field_extractor, AttributeExtractor, AttributeType, AttributeValue, AttributeValues,
};
pub use criteria::Criteria;
pub use ordering::{Direction, Ordering};
pub use results::{AggregateValue, QueryResult, Results};
pub use store_query::StoreQuery;
