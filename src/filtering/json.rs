//! JSON form of filter trees.
//!
//! Trees serialize to the ORM's `where` shape:
//!
//! ```json
//! {
//!   "status": { "in": ["active", "pending"] },
//!   "customer": { "email": { "contains": "@example.com", "mode": "insensitive" } },
//!   "OR": [ { "name": "a" }, { "name": "b" } ]
//! }
//! ```
//!
//! The same shape decodes back into a [`FilterTree`], which is how trusted
//! contextual filters are usually loaded from configuration.

use serde::de::Error as _;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::str::FromStr;

use super::coerce::number_scalar;
use super::tree::{Connective, FilterNode, FilterTree, Operand, Operator, Operators, Scalar};
use crate::errors::FilterError;

const MODE_KEY: &str = "mode";
const MODE_INSENSITIVE: &str = "insensitive";
const MODE_DEFAULT: &str = "default";

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Bool(value) => serializer.serialize_bool(*value),
            Self::Int(value) => serializer.serialize_i64(*value),
            Self::Float(value) => serializer.serialize_f64(*value),
            Self::String(value) => serializer.serialize_str(value),
        }
    }
}

impl Serialize for Operand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Single(value) => value.serialize(serializer),
            Self::List(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
        }
    }
}

impl Serialize for Operators {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.len() + usize::from(self.case_insensitive());
        let mut map = serializer.serialize_map(Some(len))?;
        for (operator, operand) in self.iter() {
            map.serialize_entry(operator.token(), operand)?;
        }
        if self.case_insensitive() {
            map.serialize_entry(MODE_KEY, MODE_INSENSITIVE)?;
        }
        map.end()
    }
}

impl Serialize for FilterNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(value) => value.serialize(serializer),
            Self::Operators(operators) => operators.serialize(serializer),
            Self::Relation(tree) => tree.serialize(serializer),
            Self::Group(entries) => entries.serialize(serializer),
        }
    }
}

impl Serialize for FilterTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, node) in self {
            map.serialize_entry(key, node)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FilterTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::try_from(value).map_err(D::Error::custom)
    }
}

impl TryFrom<Value> for FilterTree {
    type Error = FilterError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(object) => decode_tree("", object),
            other => Err(FilterError::unsupported("", &other)),
        }
    }
}

impl FromStr for FilterTree {
    type Err = FilterError;

    fn from_str(json: &str) -> Result<Self, Self::Err> {
        let value: Value = serde_json::from_str(json)?;
        Self::try_from(value)
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn decode_tree(prefix: &str, object: Map<String, Value>) -> Result<FilterTree, FilterError> {
    object
        .into_iter()
        .map(|(key, value)| {
            let path = join_path(prefix, &key);
            let node = if Connective::from_key(&key).is_some() {
                decode_group(&path, value)?
            } else {
                decode_node(&path, value)?
            };
            Ok((key, node))
        })
        .collect()
}

fn decode_group(path: &str, value: Value) -> Result<FilterNode, FilterError> {
    let entries = match value {
        Value::Object(object) => vec![decode_tree(path, object)?],
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(object) => decode_tree(&format!("{path}.{index}"), object),
                _ => Err(FilterError::invalid_group(path)),
            })
            .collect::<Result<_, _>>()?,
        _ => return Err(FilterError::invalid_group(path)),
    };
    Ok(FilterNode::Group(entries))
}

fn decode_node(path: &str, value: Value) -> Result<FilterNode, FilterError> {
    match value {
        Value::Array(items) => {
            let members = decode_list(path, items)?;
            Ok(FilterNode::Operators(Operators::new().with(Operator::In, members)))
        }
        Value::Object(object) if is_operator_object(&object) => {
            decode_operators(path, object).map(FilterNode::Operators)
        }
        Value::Object(object) => decode_tree(path, object).map(FilterNode::Relation),
        other => decode_scalar(path, other).map(FilterNode::Value),
    }
}

fn is_operator_object(object: &Map<String, Value>) -> bool {
    !object.is_empty()
        && object
            .keys()
            .any(|key| Operator::from_token(key).is_some())
        && object
            .keys()
            .all(|key| key == MODE_KEY || Operator::from_token(key).is_some())
}

fn decode_operators(path: &str, object: Map<String, Value>) -> Result<Operators, FilterError> {
    let mut operators = Operators::new();
    for (key, value) in object {
        let operand_path = join_path(path, &key);
        if key == MODE_KEY {
            match value.as_str() {
                Some(MODE_INSENSITIVE) => operators.set_case_insensitive(true),
                Some(MODE_DEFAULT) => {}
                _ => return Err(FilterError::unsupported(&operand_path, &value)),
            }
            continue;
        }
        let Some(operator) = Operator::from_token(&key) else {
            continue;
        };
        // `in`/`notIn` always carry a list; every other operator takes one scalar.
        let operand = match value {
            Value::Array(items) if operator.is_membership() => {
                Operand::List(decode_list(&operand_path, items)?)
            }
            array @ Value::Array(_) => return Err(FilterError::unsupported(&operand_path, &array)),
            other if operator.is_membership() => {
                Operand::List(vec![decode_scalar(&operand_path, other)?])
            }
            other => Operand::Single(decode_scalar(&operand_path, other)?),
        };
        operators.insert(operator, operand);
    }
    Ok(operators)
}

fn decode_list(path: &str, items: Vec<Value>) -> Result<Vec<Scalar>, FilterError> {
    items
        .into_iter()
        .map(|item| decode_scalar(path, item))
        .collect()
}

fn decode_scalar(path: &str, value: Value) -> Result<Scalar, FilterError> {
    match value {
        Value::Bool(value) => Ok(Scalar::Bool(value)),
        Value::String(value) => Ok(Scalar::String(value)),
        Value::Number(number) => number
            .as_i64()
            .map(Scalar::Int)
            .or_else(|| number.as_f64().map(number_scalar))
            .ok_or_else(|| FilterError::unsupported(path, &Value::Number(number))),
        other => Err(FilterError::unsupported(path, &other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialize_where_shape() {
        let tree = FilterTree::new()
            .with("status", Operators::new().with(Operator::In, vec![Scalar::from("a"), Scalar::from("b")]))
            .with(
                "customer",
                FilterTree::new().with(
                    "email",
                    Operators::new()
                        .with(Operator::Contains, Scalar::from("@example.com"))
                        .insensitive(),
                ),
            )
            .with("age", Scalar::Int(30));

        assert_eq!(
            serde_json::to_value(&tree).unwrap(),
            json!({
                "status": {"in": ["a", "b"]},
                "customer": {"email": {"contains": "@example.com", "mode": "insensitive"}},
                "age": 30
            })
        );
    }

    #[test]
    fn test_serialize_groups() {
        let tree = FilterTree::group(
            Connective::Or,
            vec![
                FilterTree::new().with("name", Scalar::from("a")),
                FilterTree::new().with("name", Scalar::from("b")),
            ],
        );
        assert_eq!(
            serde_json::to_value(&tree).unwrap(),
            json!({"OR": [{"name": "a"}, {"name": "b"}]})
        );
    }

    #[test]
    fn test_serialize_keeps_insertion_order() {
        let tree = FilterTree::new()
            .with("zeta", Scalar::Int(1))
            .with("alpha", Scalar::Int(2));
        assert_eq!(serde_json::to_string(&tree).unwrap(), r#"{"zeta":1,"alpha":2}"#);
    }

    #[test]
    fn test_decode_round_trips_serialized_tree() {
        let tree = FilterTree::new()
            .with("tenant_id", Scalar::Int(7))
            .with(
                "name",
                Operators::new()
                    .with(Operator::StartsWith, Scalar::from("Jo"))
                    .insensitive(),
            )
            .with(
                "OR",
                FilterNode::Group(vec![
                    FilterTree::new().with("public", Scalar::Bool(true)),
                    FilterTree::new().with("owner", FilterTree::new().with("id", Scalar::Int(3))),
                ]),
            );
        let json = serde_json::to_string(&tree).unwrap();
        assert_eq!(json.parse::<FilterTree>().unwrap(), tree);
    }

    #[test]
    fn test_decode_shorthands() {
        let tree: FilterTree =
            serde_json::from_value(json!({"id": [1, 2], "NOT": {"banned": true}, "score": 2.5})).unwrap();
        assert_eq!(
            tree,
            FilterTree::new()
                .with("id", Operators::new().with(Operator::In, vec![Scalar::Int(1), Scalar::Int(2)]))
                .with(
                    "NOT",
                    FilterNode::Group(vec![FilterTree::new().with("banned", Scalar::Bool(true))])
                )
                .with("score", Scalar::Float(2.5))
        );
    }

    #[test]
    fn test_decode_relation_named_like_operator_field() {
        // `{"in": ...}` is an operator object, `{"name": ...}` is a relation
        let tree: FilterTree = serde_json::from_value(json!({"owner": {"name": "x"}})).unwrap();
        assert_eq!(
            tree,
            FilterTree::new().with("owner", FilterTree::new().with("name", Scalar::from("x")))
        );
    }

    #[test]
    fn test_decode_rejects_null() {
        let err = FilterTree::try_from(json!({"customer": {"email": null}})).unwrap_err();
        assert!(matches!(
            err,
            FilterError::UnsupportedValue { ref path, found: "null" } if path == "customer.email"
        ));
    }

    #[test]
    fn test_decode_rejects_bad_group() {
        let err = FilterTree::try_from(json!({"OR": [1, 2]})).unwrap_err();
        assert!(matches!(err, FilterError::InvalidGroup { ref key } if key == "OR"));
    }

    #[test]
    fn test_decode_rejects_non_object_root() {
        assert!(FilterTree::try_from(json!("status")).is_err());
        assert!("not json".parse::<FilterTree>().is_err());
    }

    #[test]
    fn test_decode_wraps_scalar_membership_operand() {
        let tree: FilterTree = serde_json::from_value(json!({"id": {"in": 5, "notIn": "x"}})).unwrap();
        assert_eq!(
            tree,
            FilterTree::new().with(
                "id",
                Operators::new()
                    .with(Operator::In, vec![Scalar::Int(5)])
                    .with(Operator::NotIn, vec![Scalar::from("x")])
            )
        );
    }

    #[test]
    fn test_decode_rejects_list_under_single_value_operator() {
        let err = FilterTree::try_from(json!({"age": {"gte": [1, 2]}})).unwrap_err();
        assert!(matches!(
            err,
            FilterError::UnsupportedValue { ref path, found: "array" } if path == "age.gte"
        ));
    }

    #[test]
    fn test_decode_integral_floats_become_integers() {
        let tree: FilterTree = serde_json::from_value(json!({"x": 2.0, "y": 2.5})).unwrap();
        assert_eq!(
            tree,
            FilterTree::new()
                .with("x", Scalar::Int(2))
                .with("y", Scalar::Float(2.5))
        );
    }

    #[test]
    fn test_decode_rejects_unknown_mode() {
        let err = FilterTree::try_from(json!({"name": {"contains": "a", "mode": "loud"}})).unwrap_err();
        assert!(matches!(err, FilterError::UnsupportedValue { ref path, .. } if path == "name.mode"));
    }
}
