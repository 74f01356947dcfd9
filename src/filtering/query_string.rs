use super::pagination::PAGE_KEY;
use super::tree::{FilterNode, FilterTree};
use crate::models::{ParseOptions, ParsedQuery};
use crate::params::ParamMap;

/// Serialize a parsed query back into query parameters.
///
/// - plain values become `field=value`, relations use dotted keys;
/// - each operator becomes `field_<op>=value`, lists rejoined with commas;
/// - each ordering entry becomes `<order_key>=field_direction`;
/// - pagination is written as a single `page` only when both `skip` and
///   `take` are set.
///
/// Logical groups have no query-string form and are skipped. The
/// case-insensitivity marker is not written either; it comes back from
/// [`ParseOptions::search_mode`] when the parameters are parsed again.
#[must_use]
pub fn to_params(query: &ParsedQuery, options: &ParseOptions) -> ParamMap {
    let mut params = ParamMap::new();
    push_tree(&mut params, None, &query.filter);

    if let Some(order_by) = &query.order_by {
        for (field, direction) in order_by.iter() {
            params.push(options.order_key.as_str(), format!("{field}_{direction}"));
        }
    }

    if let (Some(skip), Some(take)) = (query.skip, query.take)
        && let Ok(take) = i64::try_from(take)
        && take > 0
    {
        let page = skip.div_euclid(take).saturating_add(1);
        params.push(PAGE_KEY, page.to_string());
    }

    params
}

/// [`to_params`], encoded as a query string without the leading `?`.
#[must_use]
pub fn to_query_string(query: &ParsedQuery, options: &ParseOptions) -> String {
    to_params(query, options).to_query_string()
}

fn push_tree(params: &mut ParamMap, prefix: Option<&str>, tree: &FilterTree) {
    for (key, node) in tree {
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };
        match node {
            FilterNode::Value(value) => params.push(path, value.to_string()),
            FilterNode::Operators(operators) => {
                for (operator, operand) in operators.iter() {
                    params.push(format!("{path}_{}", operator.token()), operand.to_string());
                }
            }
            FilterNode::Relation(inner) => push_tree(params, Some(&path), inner),
            FilterNode::Group(_) => {
                tracing::warn!(key = %path, "logical group has no query-string form, skipping");
            }
        }
    }
}
