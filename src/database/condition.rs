use sea_orm::{
    Condition, Value,
    sea_query::{Alias, Expr, Func, LikeExpr, SimpleExpr},
};

use crate::filtering::tree::{Connective, FilterNode, FilterTree, Operand, Operator, Operators, Scalar};

/// Escape LIKE wildcards so user text only ever matches literally.
/// Patterns built from the result must use `ESCAPE '\'`.
#[must_use]
pub fn escape_like_wildcards(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

impl FilterTree {
    /// Lower this tree into a sea-orm [`Condition`].
    ///
    /// Sibling keys are combined with `AND`. Relation levels qualify their
    /// columns with the relation name, so `{ customer: { email: .. } }`
    /// targets `"customer"."email"`.
    ///
    /// Nodes that constrain nothing (empty relations, operator objects or
    /// `AND` entries) are left out. An empty tree gives an empty condition,
    /// which sea-query renders as `TRUE`; check [`Condition::is_empty`]
    /// before `cond_where` to omit the clause entirely.
    #[must_use]
    pub fn to_condition(&self) -> Condition {
        tree_condition(self, None)
    }
}

fn tree_condition(tree: &FilterTree, table: Option<&str>) -> Condition {
    tree.into_iter()
        .filter_map(|(key, node)| node_condition(key, node, table))
        .fold(Condition::all(), Condition::add)
}

/// `None` when the node matches every row.
fn node_condition(key: &str, node: &FilterNode, table: Option<&str>) -> Option<Condition> {
    let condition = match node {
        FilterNode::Value(value) => Condition::all().add(column(table, key).eq(scalar_value(value))),
        FilterNode::Operators(operators) => operators_condition(table, key, operators),
        FilterNode::Relation(inner) => tree_condition(inner, Some(key)),
        FilterNode::Group(entries) => {
            let connective = Connective::from_key(key).unwrap_or_default();
            return group_condition(connective, entries, table);
        }
    };
    (!condition.is_empty()).then_some(condition)
}

fn group_condition(connective: Connective, entries: &[FilterTree], table: Option<&str>) -> Option<Condition> {
    let children: Vec<Condition> = entries.iter().map(|entry| tree_condition(entry, table)).collect();
    let condition = match connective {
        // An unconstrained entry makes the whole `OR` true. `OR: []` stays and renders `FALSE`.
        Connective::Or if children.iter().any(Condition::is_empty) => return None,
        Connective::Or => return Some(children.into_iter().fold(Condition::any(), Condition::add)),
        Connective::And => children
            .into_iter()
            .filter(|child| !child.is_empty())
            .fold(Condition::all(), Condition::add),
        Connective::Not => children
            .into_iter()
            .filter(|child| !child.is_empty())
            .fold(Condition::all(), |condition, child| condition.add(child.not())),
    };
    (!condition.is_empty()).then_some(condition)
}

fn operators_condition(table: Option<&str>, field: &str, operators: &Operators) -> Condition {
    operators
        .iter()
        .fold(Condition::all(), |condition, (operator, operand)| {
            condition.add(operator_expr(
                table,
                field,
                operator,
                operand,
                operators.case_insensitive(),
            ))
        })
}

fn operator_expr(
    table: Option<&str>,
    field: &str,
    operator: Operator,
    operand: &Operand,
    case_insensitive: bool,
) -> SimpleExpr {
    match operator {
        Operator::In => column(table, field).is_in(operand.values().iter().map(scalar_value)),
        Operator::NotIn => column(table, field).is_not_in(operand.values().iter().map(scalar_value)),
        Operator::Not => column(table, field).ne(first_value(operand)),
        Operator::Gt => column(table, field).gt(first_value(operand)),
        Operator::Gte => column(table, field).gte(first_value(operand)),
        Operator::Lt => column(table, field).lt(first_value(operand)),
        Operator::Lte => column(table, field).lte(first_value(operand)),
        Operator::Contains | Operator::StartsWith | Operator::EndsWith => {
            let text = escape_like_wildcards(&operand.to_string());
            let pattern = match operator {
                Operator::StartsWith => format!("{text}%"),
                Operator::EndsWith => format!("%{text}"),
                _ => format!("%{text}%"),
            };
            if case_insensitive {
                SimpleExpr::FunctionCall(Func::upper(column(table, field)))
                    .like(LikeExpr::new(pattern.to_uppercase()).escape('\\'))
            } else {
                column(table, field).like(LikeExpr::new(pattern).escape('\\'))
            }
        }
    }
}

fn column(table: Option<&str>, field: &str) -> Expr {
    match table {
        Some(table) => Expr::col((Alias::new(table), Alias::new(field))),
        None => Expr::col(Alias::new(field)),
    }
}

fn first_value(operand: &Operand) -> Value {
    operand
        .values()
        .first()
        .map_or(Value::String(None), scalar_value)
}

fn scalar_value(scalar: &Scalar) -> Value {
    match scalar {
        Scalar::Bool(value) => Value::from(*value),
        Scalar::Int(value) => Value::from(*value),
        Scalar::Float(value) => Value::from(*value),
        Scalar::String(value) => Value::from(value.as_str()),
    }
}
