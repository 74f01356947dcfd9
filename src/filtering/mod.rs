//! # Query Parameter Compilation
//!
//! This module turns URL query parameters into an ORM-style query object,
//! `{ where, orderBy, skip, take }`, without writing any per-endpoint parsing code.
//!
//! ## Key Features
//!
//! - **Operator Suffixes**: `age_gte=18&age_lte=65` accumulates into one operator object
//! - **Relations**: dotted keys such as `customer.email_contains=@x` nest through relations
//! - **Membership Shortcuts**: `status=a,b` and repeated `status=a&status=b` both become `in`
//! - **Global Search**: `search=john` fans out into an `OR` over configured fields
//! - **Pagination**: `skip`/`take` or `page`/`pageSize`, offset style always winning
//! - **Contextual Merge**: trusted filters (tenant scoping, permissions) survive user input
//!
//! ## Main Components
//!
//! - [`parse_query`]: the full pipeline over any [`QueryInput`]
//! - [`build_filter_tree`]: the filter compiler on its own
//! - [`resolve_sort`] and [`resolve_pagination`]: sibling resolvers for reserved keys
//! - [`merge_filters`] and [`merge_queries`]: contextual merging
//! - [`to_query_string`]: reverse serialization
//!
//! ## Query Parameter Examples
//!
//! ```text
//! // Simple equality, values are coerced to bool/number when they look like one
//! GET /orders?paid=true&total=42
//!
//! // Operators on one field accumulate
//! GET /orders?total_gte=10&total_lt=100
//!
//! // Membership
//! GET /orders?status=open,pending
//! GET /orders?status_notIn=cancelled
//!
//! // Relations
//! GET /orders?customer.email_endsWith=@example.com
//!
//! // Sorting and pagination
//! GET /orders?order=created_desc&page=3&pageSize=25
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use filtercrate::{ParseOptions, parse_query};
//!
//! let options = ParseOptions::default().with_search_fields(["name", "email"]);
//! let query = parse_query("?age_gte=18&search=john&page=2", &options);
//!
//! assert_eq!(query.skip, Some(10));
//! assert_eq!(query.take, Some(10));
//! ```

pub mod coerce;
pub mod conditions;
pub mod json;
pub mod merge;
pub mod pagination;
pub mod query_string;
pub mod search;
pub mod sort;
pub mod tree;

pub use coerce::{coerce_list, coerce_value};
pub use conditions::build_filter_tree;
pub use merge::{merge_filters, merge_queries};
pub use pagination::{Pagination, parse_integer, resolve_pagination};
pub use query_string::{to_params, to_query_string};
pub use search::{apply_global_search, build_search_group};
pub use sort::{OrderBy, SortDirection, parse_sort_directive, resolve_sort};
pub use tree::{Connective, FilterNode, FilterTree, Operand, Operator, Operators, Scalar};

use crate::models::{ParseOptions, ParsedQuery};
use crate::params::{ParamMap, QueryInput};

/// Parse any supported input shape into a [`ParsedQuery`].
///
/// Never fails: malformed numbers, pages and sort directions degrade to
/// their documented defaults.
#[must_use]
pub fn parse_query(input: impl Into<QueryInput>, options: &ParseOptions) -> ParsedQuery {
    parse_params(&input.into().into_params(), options)
}

/// Parse an already-normalized parameter map.
#[must_use]
pub fn parse_params(params: &ParamMap, options: &ParseOptions) -> ParsedQuery {
    let filter = build_filter_tree(params, options);
    let order_by = resolve_sort(params, &options.order_key);
    let Pagination { skip, take } = resolve_pagination(params, options.page_size());

    tracing::trace!(
        params = params.len(),
        fields = filter.len(),
        sorted = order_by.is_some(),
        ?skip,
        ?take,
        "parsed query parameters"
    );

    ParsedQuery {
        filter,
        order_by,
        skip,
        take,
    }
}

/// Parse only the filter part, ignoring sort and pagination.
#[must_use]
pub fn parse_filters(input: impl Into<QueryInput>, options: &ParseOptions) -> FilterTree {
    build_filter_tree(&input.into().into_params(), options)
}

/// Parse user input and merge a trusted query into it.
///
/// See [`merge_queries`] for precedence.
#[must_use]
pub fn parse_query_with_context(
    input: impl Into<QueryInput>,
    options: &ParseOptions,
    trusted: ParsedQuery,
) -> ParsedQuery {
    merge_queries(trusted, parse_query(input, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RecordValue;

    #[test]
    fn test_parse_query_combines_all_parts() {
        let options = ParseOptions::default();
        let query = parse_query("?name=ann&order=name:desc&skip=5&take=2", &options);
        assert_eq!(query.filter, FilterTree::new().with("name", Scalar::from("ann")));
        assert_eq!(query.order_by, Some(OrderBy::by("name", SortDirection::Desc)));
        assert_eq!(query.skip, Some(5));
        assert_eq!(query.take, Some(2));
    }

    #[test]
    fn test_parse_query_empty_input() {
        assert_eq!(parse_query("", &ParseOptions::default()), ParsedQuery::default());
        assert_eq!(parse_query("?", &ParseOptions::default()), ParsedQuery::default());
    }

    #[test]
    fn test_parse_filters_ignores_reserved_keys() {
        let tree = parse_filters("order=name&page=2&active=true", &ParseOptions::default());
        assert_eq!(tree, FilterTree::new().with("active", Scalar::Bool(true)));
    }

    #[test]
    fn test_input_shapes_agree() {
        let options = ParseOptions::default();
        let raw = parse_query("status=a,b&age_gt=3", &options);
        let pairs = parse_query(vec![
            ("status".to_string(), "a".to_string()),
            ("status".to_string(), "b".to_string()),
            ("age_gt".to_string(), "3".to_string()),
        ], &options);
        let record: Vec<(String, Option<RecordValue>)> = vec![
            ("status".to_string(), Some(vec!["a", "b"].into())),
            ("age_gt".to_string(), Some("3".into())),
            ("ignored".to_string(), None),
        ];
        let record = parse_query(record, &options);
        assert_eq!(raw, pairs);
        assert_eq!(raw, record);
    }

    #[test]
    fn test_parse_with_context_keeps_trusted_scope() {
        let trusted = ParsedQuery::from_filter(FilterTree::new().with("tenant_id", Scalar::Int(7)));
        let query = parse_query_with_context(
            "tenant_id=8&take=3",
            &ParseOptions::default(),
            trusted,
        );
        assert_eq!(query.filter, FilterTree::new().with("tenant_id", Scalar::Int(7)));
        assert_eq!(query.take, Some(3));
    }
}
