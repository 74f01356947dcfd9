//! Merging trusted, server-side filters into user-derived ones.
//!
//! A typical trusted filter scopes a query to a tenant or to the records a
//! user may see. It must survive whatever the user sent, including their own
//! logical groups.

use super::tree::{Connective, FilterTree};
use crate::models::ParsedQuery;

/// Merge a trusted filter with a user-derived one.
///
/// - An empty side yields the other side unchanged.
/// - Without top-level logical keys on either side, fields are merged and the
///   trusted side wins on collisions.
/// - Otherwise both sides become entries of one `AND` group, derived first.
///   A side that is nothing but an `AND` group is spliced in instead of nested.
#[must_use]
pub fn merge_filters(trusted: FilterTree, derived: FilterTree) -> FilterTree {
    if trusted.is_empty() {
        return derived;
    }
    if derived.is_empty() {
        return trusted;
    }

    if !trusted.has_logical_key() && !derived.has_logical_key() {
        let mut merged = derived;
        merged.extend(trusted);
        return merged;
    }

    let mut entries = and_entries(derived);
    entries.extend(and_entries(trusted));
    FilterTree::group(Connective::And, entries)
}

fn and_entries(tree: FilterTree) -> Vec<FilterTree> {
    tree.into_sole_group(Connective::And)
        .unwrap_or_else(|tree| vec![tree])
}

/// Merge a trusted query with a user-derived one.
///
/// Filters merge as in [`merge_filters`]. The derived ordering wins when
/// present, and pagination always comes from the derived query.
#[must_use]
pub fn merge_queries(trusted: ParsedQuery, derived: ParsedQuery) -> ParsedQuery {
    ParsedQuery {
        filter: merge_filters(trusted.filter, derived.filter),
        order_by: derived.order_by.or(trusted.order_by),
        skip: derived.skip,
        take: derived.take,
    }
}

impl FilterTree {
    /// Method form of [`merge_filters`], with `self` as the derived side.
    #[must_use]
    pub fn with_context(self, trusted: FilterTree) -> FilterTree {
        merge_filters(trusted, self)
    }
}

impl ParsedQuery {
    /// Method form of [`merge_queries`], with `self` as the derived side.
    #[must_use]
    pub fn with_context(self, trusted: ParsedQuery) -> ParsedQuery {
        merge_queries(trusted, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filtering::sort::{OrderBy, SortDirection};
    use crate::filtering::tree::{FilterNode, Scalar};

    fn field(name: &str, value: impl Into<Scalar>) -> FilterTree {
        let value: Scalar = value.into();
        FilterTree::new().with(name, value)
    }

    #[test]
    fn test_empty_side_returns_other() {
        let tree = field("tenant", 1);
        assert_eq!(merge_filters(FilterTree::new(), tree.clone()), tree);
        assert_eq!(merge_filters(tree.clone(), FilterTree::new()), tree);
    }

    #[test]
    fn test_shallow_merge_trusted_wins() {
        let trusted = field("tenant", 1);
        let derived = field("status", "open").with("tenant", Scalar::Int(2));
        assert_eq!(
            merge_filters(trusted, derived),
            field("status", "open").with("tenant", Scalar::Int(1))
        );
    }

    #[test]
    fn test_logical_groups_are_wrapped_not_overwritten() {
        let trusted = FilterTree::group(Connective::Or, vec![field("owner", 1), field("public", true)]);
        let derived = FilterTree::group(Connective::Or, vec![field("name", "a"), field("email", "a")]);
        assert_eq!(
            merge_filters(trusted.clone(), derived.clone()),
            FilterTree::group(Connective::And, vec![derived, trusted])
        );
    }

    #[test]
    fn test_one_sided_group_wraps_both() {
        let trusted = field("tenant", 1);
        let derived = FilterTree::group(Connective::Or, vec![field("a", 1), field("b", 2)]);
        assert_eq!(
            merge_filters(trusted.clone(), derived.clone()),
            FilterTree::group(Connective::And, vec![derived, trusted])
        );
    }

    #[test]
    fn test_sole_and_groups_are_flattened() {
        let trusted = FilterTree::group(Connective::And, vec![field("tenant", 1), field("active", true)]);
        let derived = FilterTree::group(Connective::And, vec![field("name", "x")]);
        assert_eq!(
            merge_filters(trusted, derived),
            FilterTree::group(
                Connective::And,
                vec![field("name", "x"), field("tenant", 1), field("active", true)]
            )
        );
    }

    #[test]
    fn test_and_group_with_siblings_is_not_flattened() {
        let trusted = FilterTree::group(Connective::And, vec![field("tenant", 1)])
            .with("active", Scalar::Bool(true));
        let derived = field("name", "x");
        let merged = merge_filters(trusted.clone(), derived.clone());
        assert_eq!(merged, FilterTree::group(Connective::And, vec![derived, trusted]));
    }

    #[test]
    fn test_not_key_counts_as_logical() {
        let trusted = FilterTree::new().with("NOT", FilterNode::Group(vec![field("banned", true)]));
        let derived = field("banned", false);
        let merged = merge_filters(trusted.clone(), derived.clone());
        assert_eq!(merged, FilterTree::group(Connective::And, vec![derived, trusted]));
    }

    #[test]
    fn test_merge_queries_precedence() {
        let trusted = ParsedQuery {
            filter: field("tenant", 1),
            order_by: Some(OrderBy::by("created", SortDirection::Desc)),
            skip: Some(100),
            take: Some(100),
        };
        let derived = ParsedQuery {
            filter: field("status", "open"),
            order_by: None,
            skip: None,
            take: Some(5),
        };

        let merged = merge_queries(trusted, derived);
        assert_eq!(merged.filter, field("status", "open").with("tenant", Scalar::Int(1)));
        assert_eq!(merged.order_by, Some(OrderBy::by("created", SortDirection::Desc)));
        assert_eq!(merged.skip, None);
        assert_eq!(merged.take, Some(5));
    }

    #[test]
    fn test_method_form_treats_self_as_derived() {
        let derived = field("tenant", 2);
        assert_eq!(derived.with_context(field("tenant", 1)), field("tenant", 1));
    }

    #[test]
    fn test_merge_queries_derived_order_wins() {
        let trusted = ParsedQuery {
            order_by: Some(OrderBy::by("created", SortDirection::Desc)),
            ..ParsedQuery::default()
        };
        let derived = ParsedQuery {
            order_by: Some(OrderBy::by("name", SortDirection::Asc)),
            ..ParsedQuery::default()
        };
        assert_eq!(
            merge_queries(trusted, derived).order_by,
            Some(OrderBy::by("name", SortDirection::Asc))
        );
    }
}
