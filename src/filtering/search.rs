use super::tree::{Connective, FilterNode, FilterTree, Operator, Operators, Scalar};
use crate::models::{ParseOptions, SearchMode};

/// Build the `OR` group that matches `term` as a substring of any of `fields`.
///
/// Dotted fields nest through their relations:
/// `customer.email` becomes `{ customer: { email: { contains: term } } }`.
/// Returns `None` for an empty term or an empty field list.
#[must_use]
pub fn build_search_group(term: &str, fields: &[String], mode: SearchMode) -> Option<FilterTree> {
    if term.is_empty() || fields.is_empty() {
        return None;
    }

    let conditions = fields
        .iter()
        .map(|field| field_condition(field, term, mode))
        .collect();
    Some(FilterTree::group(Connective::Or, conditions))
}

fn field_condition(field: &str, term: &str, mode: SearchMode) -> FilterTree {
    let mut operators = Operators::new().with(Operator::Contains, Scalar::from(term));
    if mode.is_insensitive() {
        operators.set_case_insensitive(true);
    }

    let mut segments = field.rsplit('.');
    let leaf = segments.next().unwrap_or(field);
    segments.fold(
        FilterTree::new().with(leaf, FilterNode::Operators(operators)),
        |inner, relation| FilterTree::new().with(relation, FilterNode::Relation(inner)),
    )
}

/// Splice the global search group into an already compiled tree.
///
/// An empty tree is replaced by the search group outright; otherwise both are
/// wrapped as `{ <connective>: [tree, search group] }`.
#[must_use]
pub fn apply_global_search(
    tree: FilterTree,
    term: Option<&str>,
    options: &ParseOptions,
) -> FilterTree {
    let Some(search) = term.and_then(|term| {
        build_search_group(term, &options.search_fields, options.search_mode)
    }) else {
        return tree;
    };

    tracing::debug!(
        fields = options.search_fields.len(),
        connective = options.search_connective.key(),
        "applying global search"
    );

    if tree.is_empty() {
        search
    } else {
        FilterTree::group(options.search_connective, vec![tree, search])
    }
}
