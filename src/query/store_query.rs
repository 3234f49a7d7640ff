//! Store Query Module
//!
//! The query description handed to the store's query executor.

use crate::query::aggregator::{Aggregation, AttributeAggregator};
use crate::query::criteria::Criteria;
use crate::query::ordering::{Direction, Ordering};

// == Store Query ==
/// A query over the live entry set: criteria, orderings, aggregators,
/// projection and windowing.
///
/// Built with chainable methods:
///
/// ```
/// use querycache::query::{Criteria, Direction, StoreQuery};
///
/// let query = StoreQuery::new(Criteria::gt("age", 21))
///     .include_keys()
///     .include_attribute("age")
///     .add_ordering("age", Direction::Descending)
///     .max_results(10);
/// ```
#[derive(Debug, Clone)]
pub struct StoreQuery {
    pub(crate) criteria: Criteria,
    pub(crate) orderings: Vec<Ordering>,
    pub(crate) aggregators: Vec<AttributeAggregator>,
    /// None = unbounded window
    pub(crate) max_results: Option<usize>,
    pub(crate) requested_attributes: Vec<String>,
    pub(crate) include_keys: bool,
}

impl StoreQuery {
    /// Creates a query with the given criteria and no ordering, projection,
    /// aggregation or window.
    pub fn new(criteria: Criteria) -> Self {
        Self {
            criteria,
            orderings: Vec::new(),
            aggregators: Vec::new(),
            max_results: None,
            requested_attributes: Vec::new(),
            include_keys: false,
        }
    }

    /// Requests entry keys on the results.
    pub fn include_keys(mut self) -> Self {
        self.include_keys = true;
        self
    }

    /// Projects an attribute onto each result, frozen at match time.
    pub fn include_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.requested_attributes.push(attribute.into());
        self
    }

    /// Appends an ordering column to the tie-break chain.
    pub fn add_ordering(mut self, attribute: impl Into<String>, direction: Direction) -> Self {
        self.orderings.push(Ordering::new(attribute, direction));
        self
    }

    /// Declares an aggregation over an attribute.
    ///
    /// Declaring one or more aggregators switches the result set to
    /// aggregate mode: individual matches are discarded.
    pub fn include_aggregator(
        mut self,
        attribute: impl Into<String>,
        aggregation: Aggregation,
    ) -> Self {
        self.aggregators
            .push(AttributeAggregator::new(attribute, aggregation));
        self
    }

    /// Bounds the result window to at most `max` results.
    ///
    /// With an ordering this returns the first `max` of the fully sorted
    /// match set. Without one, the scan stops after `max` arbitrary matches;
    /// which matches are returned is deliberately unspecified.
    pub fn max_results(mut self, max: usize) -> Self {
        self.max_results = Some(max);
        self
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_accumulates() {
        let query = StoreQuery::new(Criteria::always())
            .include_keys()
            .include_attribute("a")
            .include_attribute("b")
            .add_ordering("a", Direction::Ascending)
            .include_aggregator("a", Aggregation::Sum)
            .max_results(5);

        assert!(query.include_keys);
        assert_eq!(query.requested_attributes, vec!["a", "b"]);
        assert_eq!(query.orderings.len(), 1);
        assert_eq!(query.aggregators.len(), 1);
        assert_eq!(query.max_results, Some(5));
    }

    #[test]
    fn test_defaults_are_unbounded() {
        let query = StoreQuery::new(Criteria::always());
        assert!(!query.include_keys);
        assert_eq!(query.max_results, None);
        assert!(query.orderings.is_empty());
    }
}
