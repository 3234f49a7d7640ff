//! Query Executor Module
//!
//! Single-pass execution of a store query: scan, criteria evaluation,
//! aggregation, ordering and windowing.

use std::collections::HashMap;

use tracing::trace;

use crate::error::Result;
use crate::query::aggregator::AggregatorState;
use crate::query::attribute::{AttributeValue, AttributeValues};
use crate::query::ordering::{compare_sort_rows, validate_column};
use crate::query::results::{QueryResult, Results};
use crate::query::store_query::StoreQuery;
use crate::store::MemoryStore;

/// Executes a query against the store's live entry set.
///
/// The scan iterates a weakly consistent key snapshot; entries removed
/// while the scan runs are skipped (a query never reports a key with no
/// value). Unknown-attribute and type errors propagate to the caller.
///
/// Without an ordering, the scan stops as soon as a bounded window is
/// filled. Which matches fill it is deliberately unspecified; absent an
/// ordering no return order was promised in the first place.
pub(crate) fn execute(store: &MemoryStore, query: &StoreQuery) -> Result<Results> {
    let extractors = store.extractor_snapshot();
    let has_order = !query.orderings.is_empty();

    let mut aggregators: Vec<AggregatorState> =
        query.aggregators.iter().map(AggregatorState::new).collect();
    let mut matches: Vec<QueryResult> = Vec::new();

    for key in store.key_snapshot() {
        if !has_order {
            if let Some(max) = query.max_results {
                if matches.len() >= max {
                    break;
                }
            }
        }

        // Entry may have been removed or expired since the snapshot
        let Some(element) = store.element_snapshot(&key) else {
            continue;
        };

        let mut values = AttributeValues::new(&element, &extractors);
        if !query.criteria.execute(&mut values)? {
            continue;
        }
        trace!(key = %key, "query match");

        // Projection and sort keys are frozen at match time
        let mut attributes = HashMap::new();
        for name in &query.requested_attributes {
            attributes.insert(name.clone(), values.value(name)?);
        }

        let mut sort_attributes: Vec<Option<AttributeValue>> =
            Vec::with_capacity(query.orderings.len());
        for ordering in &query.orderings {
            sort_attributes.push(values.value(&ordering.attribute)?);
        }

        for state in &mut aggregators {
            let attribute = state.attribute().to_string();
            let value = values.value(&attribute)?;
            state.accept(value.as_ref())?;
        }

        matches.push(QueryResult::new(
            key,
            store.clone(),
            query.include_keys,
            attributes,
            sort_attributes,
        ));
    }

    if has_order {
        // Mixed types within one sort column are rejected before sorting
        for pos in 0..query.orderings.len() {
            validate_column(
                matches
                    .iter()
                    .map(|result| result.sort_attributes().get(pos).and_then(Option::as_ref)),
            )?;
        }

        matches.sort_by(|a, b| {
            compare_sort_rows(a.sort_attributes(), b.sort_attributes(), &query.orderings)
        });

        // Trimming from the tail is only meaningful under an ordering;
        // without one the window was bounded by the early exit above
        if let Some(max) = query.max_results {
            matches.truncate(max);
        }
    }

    Ok(Results::new(matches, query.include_keys, aggregators))
}
