//! Query parameter to filter tree compilation.

use super::coerce::{coerce_list, coerce_value};
use super::search::apply_global_search;
use super::tree::{FilterNode, FilterTree, Operand, Operator, Operators, split_operator_suffix};
use crate::models::ParseOptions;
use crate::params::ParamMap;

/// Output of the compiler walk, before global search is applied.
#[derive(Debug, Default)]
struct CompiledFilter {
    tree: FilterTree,
    search_term: Option<String>,
}

/// Compile query parameters into a filter tree, global search included.
///
/// Pagination, sort and search keys are skipped. Every other key becomes a
/// condition:
///
/// | Parameter                       | Condition                                  |
/// |---------------------------------|--------------------------------------------|
/// | `status=active`                 | `{ status: "active" }`                     |
/// | `status=active,pending`         | `{ status: { in: ["active", "pending"] } }`|
/// | `status=a&status=b`             | `{ status: { in: ["a", "b"] } }`           |
/// | `age_gte=18&age_lte=65`         | `{ age: { gte: 18, lte: 65 } }`            |
/// | `customer.email_contains=@x.io` | `{ customer: { email: { contains: "@x.io" } } }` |
#[must_use]
pub fn build_filter_tree(params: &ParamMap, options: &ParseOptions) -> FilterTree {
    let CompiledFilter { tree, search_term } = compile_params(params, options);
    apply_global_search(tree, search_term.as_deref(), options)
}

fn compile_params(params: &ParamMap, options: &ParseOptions) -> CompiledFilter {
    let mut compiled = CompiledFilter::default();

    for (key, value) in params.iter() {
        if options.is_search_key(key) {
            compiled.search_term = Some(value.to_string());
            continue;
        }
        if options.is_reserved_key(key) {
            continue;
        }

        // Only the last path segment may carry an operator suffix, so a
        // relation named e.g. `items_in` is never read as an operator.
        match key.rsplit_once('.') {
            Some((path, field)) => {
                let level = path
                    .split('.')
                    .fold(&mut compiled.tree, |level, segment| level.relation_mut(segment));
                apply_condition(level, field, value, options);
            }
            None => apply_condition(&mut compiled.tree, key, value, options),
        }
    }

    compiled
}

fn apply_condition(level: &mut FilterTree, field: &str, value: &str, options: &ParseOptions) {
    match split_operator_suffix(field) {
        Some((name, operator)) => apply_operator(level, name, operator, value, options),
        None => apply_plain(level, field, value),
    }
}

/// `field_<op>=value`: merge one operator into the field's operator object.
fn apply_operator(
    level: &mut FilterTree,
    field: &str,
    operator: Operator,
    value: &str,
    options: &ParseOptions,
) {
    let operand = if operator.is_membership() {
        Operand::List(coerce_list(value))
    } else {
        Operand::Single(coerce_value(value.split(',').next().unwrap_or(value)))
    };

    let operators = operators_mut(level, field);
    operators.insert(operator, operand);
    if operator.is_string_match() && options.search_mode.is_insensitive() {
        operators.set_case_insensitive(true);
    }
}

/// `field=value`: a plain value, a CSV membership, or an accumulation into
/// the membership of a field seen before.
fn apply_plain(level: &mut FilterTree, field: &str, value: &str) {
    let Some(node) = level.get_mut(field) else {
        let node = if value.contains(',') {
            FilterNode::Operators(Operators::new().with(Operator::In, coerce_list(value)))
        } else {
            FilterNode::Value(coerce_value(value))
        };
        level.insert(field, node);
        return;
    };

    let members = coerce_list(value);
    let previous = std::mem::replace(node, FilterNode::Operators(Operators::new()));
    *node = match previous {
        FilterNode::Value(existing) => {
            let mut operators = Operators::new();
            operators.push_members(std::iter::once(existing).chain(members));
            FilterNode::Operators(operators)
        }
        FilterNode::Operators(mut operators) => {
            operators.push_members(members);
            FilterNode::Operators(operators)
        }
        FilterNode::Relation(_) | FilterNode::Group(_) => {
            tracing::debug!(field, "replacing nested condition with a plain value");
            if value.contains(',') {
                FilterNode::Operators(Operators::new().with(Operator::In, members))
            } else {
                FilterNode::Value(coerce_value(value))
            }
        }
    };
}

/// The operator object for `field`, created on demand.
///
/// A plain value already stored there becomes `in: [value]`, which keeps the
/// equality while letting further operators merge in.
fn operators_mut<'a>(level: &'a mut FilterTree, field: &str) -> &'a mut Operators {
    let node = level
        .entry(field)
        .or_insert_with(|| FilterNode::Operators(Operators::new()));
    let replacement = match &*node {
        FilterNode::Operators(_) => None,
        FilterNode::Value(existing) => {
            Some(Operators::new().with(Operator::In, vec![existing.clone()]))
        }
        FilterNode::Relation(_) | FilterNode::Group(_) => {
            tracing::debug!(field, "replacing nested condition with an operator object");
            Some(Operators::new())
        }
    };
    if let Some(operators) = replacement {
        *node = FilterNode::Operators(operators);
    }
    let FilterNode::Operators(operators) = node else {
        unreachable!("operator object was just ensured");
    };
    operators
}
