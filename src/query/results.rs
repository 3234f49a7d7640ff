//! Results Module
//!
//! The immutable outcome of a query: either an ordered sequence of matches
//! or an aggregate value, never both.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::{Result, StoreError};
use crate::query::aggregator::AggregatorState;
use crate::query::attribute::AttributeValue;
use crate::store::MemoryStore;

// == Query Result ==
/// One matching entry in a query's result list.
///
/// Keys, projected attributes and sort keys are frozen at match time. The
/// value is deliberately not: [`QueryResult::value`] re-reads the live store,
/// so a caller observes removals and replacements that happened after the
/// match. Results are a view, not a snapshot of values.
pub struct QueryResult {
    key: String,
    store: MemoryStore,
    requests_keys: bool,
    attributes: HashMap<String, Option<AttributeValue>>,
    sort_attributes: Vec<Option<AttributeValue>>,
}

impl QueryResult {
    pub(crate) fn new(
        key: String,
        store: MemoryStore,
        requests_keys: bool,
        attributes: HashMap<String, Option<AttributeValue>>,
        sort_attributes: Vec<Option<AttributeValue>>,
    ) -> Self {
        Self {
            key,
            store,
            requests_keys,
            attributes,
            sort_attributes,
        }
    }

    /// Returns the entry key.
    ///
    /// Fails when the originating query did not request keys; this is a
    /// contract violation, not a silent null.
    pub fn key(&self) -> Result<&str> {
        if self.requests_keys {
            Ok(&self.key)
        } else {
            Err(StoreError::KeysNotRequested)
        }
    }

    /// Re-reads the current live value for this result's key.
    ///
    /// Returns None when the entry has since been removed or expired.
    /// Requires keys to have been requested, like [`QueryResult::key`].
    pub fn value(&self) -> Result<Option<Value>> {
        let key = self.key()?;
        Ok(self.store.get(key))
    }

    /// Returns a projected attribute value frozen at match time.
    ///
    /// Fails when the originating query did not request the attribute.
    pub fn attribute(&self, name: &str) -> Result<Option<&AttributeValue>> {
        self.attributes
            .get(name)
            .map(Option::as_ref)
            .ok_or_else(|| StoreError::AttributeNotRequested(name.to_string()))
    }

    /// The per-ordering-column sort keys captured at match time.
    pub(crate) fn sort_attributes(&self) -> &[Option<AttributeValue>] {
        &self.sort_attributes
    }
}

// == Aggregate Value ==
/// The aggregate outcome of a query with one or more aggregators.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateValue {
    /// Exactly one aggregator was declared
    Single(Option<AttributeValue>),
    /// Several aggregators, in declaration order
    Many(Vec<Option<AttributeValue>>),
}

// == Results ==
/// The outcome of one query execution.
///
/// Built either in list mode (no aggregators) or aggregate mode (one or
/// more); the two are mutually exclusive and fixed at construction. In
/// aggregate mode the individual match list is discarded, `size()` is 0 and
/// keys are never available.
pub struct Results {
    results: Vec<QueryResult>,
    has_keys: bool,
    aggregate: Option<AggregateValue>,
}

impl Results {
    pub(crate) fn new(
        results: Vec<QueryResult>,
        has_keys: bool,
        aggregators: Vec<AggregatorState>,
    ) -> Self {
        if aggregators.is_empty() {
            Self {
                results,
                has_keys,
                aggregate: None,
            }
        } else {
            let mut values: Vec<Option<AttributeValue>> =
                aggregators.iter().map(AggregatorState::result).collect();
            let aggregate = if values.len() == 1 {
                AggregateValue::Single(values.remove(0))
            } else {
                AggregateValue::Many(values)
            };
            Self {
                results: Vec::new(),
                has_keys: false,
                aggregate: Some(aggregate),
            }
        }
    }

    /// Returns the full match list (empty in aggregate mode).
    pub fn all(&self) -> &[QueryResult] {
        &self.results
    }

    /// Returns a sub-range of the match list.
    ///
    /// Fails with a bounds error when the range exceeds the available
    /// result count.
    pub fn range(&self, start: usize, length: usize) -> Result<&[QueryResult]> {
        let end = start.checked_add(length).filter(|end| *end <= self.results.len());
        match end {
            Some(end) => Ok(&self.results[start..end]),
            None => Err(StoreError::RangeOutOfBounds {
                start,
                length,
                size: self.results.len(),
            }),
        }
    }

    /// Returns the number of individual results (0 in aggregate mode).
    pub fn size(&self) -> usize {
        self.results.len()
    }

    /// Whether the individual results carry keys.
    pub fn has_keys(&self) -> bool {
        self.has_keys
    }

    /// Whether this result set holds an aggregate value.
    pub fn is_aggregate(&self) -> bool {
        self.aggregate.is_some()
    }

    /// Returns the aggregate value.
    ///
    /// Fails when the originating query declared no aggregators.
    pub fn aggregate_result(&self) -> Result<&AggregateValue> {
        self.aggregate.as_ref().ok_or(StoreError::NoAggregate)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfiguration;
    use std::sync::Arc;

    fn empty_store() -> MemoryStore {
        let config = Arc::new(CacheConfiguration::default());
        MemoryStore::create(&config).unwrap()
    }

    fn result(key: &str, requests_keys: bool) -> QueryResult {
        QueryResult::new(
            key.to_string(),
            empty_store(),
            requests_keys,
            HashMap::new(),
            Vec::new(),
        )
    }

    #[test]
    fn test_key_requires_key_projection() {
        assert_eq!(result("k", true).key().unwrap(), "k");
        assert!(matches!(
            result("k", false).key(),
            Err(StoreError::KeysNotRequested)
        ));
    }

    #[test]
    fn test_attribute_not_requested() {
        let r = result("k", true);
        assert!(matches!(
            r.attribute("age"),
            Err(StoreError::AttributeNotRequested(_))
        ));
    }

    #[test]
    fn test_list_mode() {
        let results = Results::new(vec![result("a", true), result("b", true)], true, Vec::new());

        assert_eq!(results.size(), 2);
        assert!(results.has_keys());
        assert!(!results.is_aggregate());
        assert!(matches!(
            results.aggregate_result(),
            Err(StoreError::NoAggregate)
        ));
    }

    #[test]
    fn test_range_bounds() {
        let results = Results::new(
            vec![result("a", true), result("b", true), result("c", true)],
            true,
            Vec::new(),
        );

        assert_eq!(results.range(1, 2).unwrap().len(), 2);
        assert_eq!(results.range(3, 0).unwrap().len(), 0);
        assert!(matches!(
            results.range(2, 2),
            Err(StoreError::RangeOutOfBounds { .. })
        ));
        assert!(matches!(
            results.range(usize::MAX, 1),
            Err(StoreError::RangeOutOfBounds { .. })
        ));
    }
}
