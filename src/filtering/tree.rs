//! Filter tree types.
//!
//! A [`FilterTree`] is the `where` half of an ORM-style query object: an
//! insertion-ordered map from field name to a [`FilterNode`]. Nodes are either
//! plain values, operator objects, nested relation trees, or logical groups
//! stored under one of the [`Connective`] keys.

use indexmap::IndexMap;
use indexmap::map::{Entry, IntoIter, Iter};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single coerced query value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    /// Always finite.
    Float(f64),
    String(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::String(value) => f.write_str(value),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Comparison operators reachable through a `field_<token>` suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Not equal (`_not`)
    Not,
    /// One of a list (`_in`)
    In,
    /// None of a list (`_notIn`)
    NotIn,
    /// Greater than (`_gt`)
    Gt,
    /// Greater than or equal (`_gte`)
    Gte,
    /// Less than (`_lt`)
    Lt,
    /// Less than or equal (`_lte`)
    Lte,
    /// Substring match (`_contains`)
    Contains,
    /// Prefix match (`_startsWith`)
    StartsWith,
    /// Suffix match (`_endsWith`)
    EndsWith,
}

/// Suffix token table shared by top-level keys, dotted keys and JSON decoding.
const OPERATOR_TOKENS: [(&str, Operator); 10] = [
    ("in", Operator::In),
    ("notIn", Operator::NotIn),
    ("not", Operator::Not),
    ("gte", Operator::Gte),
    ("lte", Operator::Lte),
    ("gt", Operator::Gt),
    ("lt", Operator::Lt),
    ("contains", Operator::Contains),
    ("startsWith", Operator::StartsWith),
    ("endsWith", Operator::EndsWith),
];

impl Operator {
    /// Look up an operator by its bare token (e.g. `"gte"`).
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        OPERATOR_TOKENS
            .iter()
            .find(|(candidate, _)| *candidate == token)
            .map(|(_, operator)| *operator)
    }

    /// The token used both as key suffix and as JSON key.
    #[must_use]
    pub fn token(self) -> &'static str {
        OPERATOR_TOKENS
            .iter()
            .find(|(_, operator)| *operator == self)
            .map_or("", |(token, _)| token)
    }

    /// `in` and `notIn` always carry a list operand.
    #[must_use]
    pub const fn is_membership(self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }

    /// Operators that honour the case-insensitivity marker.
    #[must_use]
    pub const fn is_string_match(self) -> bool {
        matches!(self, Self::Contains | Self::StartsWith | Self::EndsWith)
    }
}

/// Split `field_<token>` into its field name and operator.
///
/// Only the text after the last underscore is considered, and the field part
/// must be non-empty, so `created_at_gte` yields `("created_at", Gte)` while
/// `_in` and `status` yield `None`.
#[must_use]
pub fn split_operator_suffix(key: &str) -> Option<(&str, Operator)> {
    let (field, token) = key.rsplit_once('_')?;
    if field.is_empty() {
        return None;
    }
    Operator::from_token(token).map(|operator| (field, operator))
}

/// The right-hand side of an operator.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Single(Scalar),
    List(Vec<Scalar>),
}

impl Default for Operand {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl Operand {
    /// View the operand as a slice, a single value being a one-element slice.
    #[must_use]
    pub fn values(&self) -> &[Scalar] {
        match self {
            Self::Single(value) => std::slice::from_ref(value),
            Self::List(values) => values,
        }
    }

    #[must_use]
    pub fn into_list(self) -> Vec<Scalar> {
        match self {
            Self::Single(value) => vec![value],
            Self::List(values) => values,
        }
    }
}

/// Lists are rejoined with commas, the inverse of CSV splitting.
impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, value) in self.values().iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "{value}")?;
        }
        Ok(())
    }
}

/// An operator object: every operator applied to one field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Operators {
    entries: IndexMap<Operator, Operand>,
    case_insensitive: bool,
}

impl Operators {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Operators::insert`].
    #[must_use]
    pub fn with(mut self, operator: Operator, operand: impl Into<Operand>) -> Self {
        self.insert(operator, operand.into());
        self
    }

    /// Builder form of [`Operators::set_case_insensitive`].
    #[must_use]
    pub fn insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    /// Insert an operator. A repeated operator overwrites the previous operand
    /// but keeps its original position.
    pub fn insert(&mut self, operator: Operator, operand: Operand) -> Option<Operand> {
        self.entries.insert(operator, operand)
    }

    /// Append values to the `in` list, creating it when absent.
    pub fn push_members(&mut self, values: impl IntoIterator<Item = Scalar>) {
        let slot = self.entries.entry(Operator::In).or_default();
        let mut members = std::mem::take(slot).into_list();
        members.extend(values);
        *slot = Operand::List(members);
    }

    #[must_use]
    pub fn get(&self, operator: Operator) -> Option<&Operand> {
        self.entries.get(&operator)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Operator, &Operand)> {
        self.entries.iter().map(|(operator, operand)| (*operator, operand))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub const fn case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    pub fn set_case_insensitive(&mut self, case_insensitive: bool) {
        self.case_insensitive = case_insensitive;
    }
}

impl From<Scalar> for Operand {
    fn from(value: Scalar) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<Scalar>> for Operand {
    fn from(values: Vec<Scalar>) -> Self {
        Self::List(values)
    }
}

/// Logical connective keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Connective {
    #[default]
    And,
    Or,
    Not,
}

impl Connective {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            "NOT" => Some(Self::Not),
            _ => None,
        }
    }
}

/// The value stored under one key of a [`FilterTree`].
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    /// Plain equality
    Value(Scalar),
    /// One or more comparison operators on the same field
    Operators(Operators),
    /// Conditions on a related record
    Relation(FilterTree),
    /// Entries of a logical group; only valid under a [`Connective`] key
    Group(Vec<FilterTree>),
}

impl From<Scalar> for FilterNode {
    fn from(value: Scalar) -> Self {
        Self::Value(value)
    }
}

impl From<Operators> for FilterNode {
    fn from(operators: Operators) -> Self {
        Self::Operators(operators)
    }
}

impl From<FilterTree> for FilterNode {
    fn from(tree: FilterTree) -> Self {
        Self::Relation(tree)
    }
}

/// An insertion-ordered filter mapping.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterTree(IndexMap<String, FilterNode>);

impl FilterTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A tree holding nothing but one logical group.
    #[must_use]
    pub fn group(connective: Connective, entries: Vec<FilterTree>) -> Self {
        Self::new().with(connective.key(), FilterNode::Group(entries))
    }

    /// Builder form of [`FilterTree::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, node: impl Into<FilterNode>) -> Self {
        self.insert(key, node);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, node: impl Into<FilterNode>) -> Option<FilterNode> {
        self.0.insert(key.into(), node.into())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FilterNode> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut FilterNode> {
        self.0.get_mut(key)
    }

    pub fn entry(&mut self, key: impl Into<String>) -> Entry<'_, String, FilterNode> {
        self.0.entry(key.into())
    }

    pub fn iter(&self) -> Iter<'_, String, FilterNode> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether any top-level key is a logical connective.
    #[must_use]
    pub fn has_logical_key(&self) -> bool {
        self.0.keys().any(|key| Connective::from_key(key).is_some())
    }

    /// The relation level stored under `key`, created on demand.
    ///
    /// Any non-relation node already stored there is replaced.
    pub fn relation_mut(&mut self, key: &str) -> &mut FilterTree {
        let node = self
            .0
            .entry(key.to_string())
            .or_insert_with(|| FilterNode::Relation(Self::new()));
        if !matches!(node, FilterNode::Relation(_)) {
            tracing::debug!(field = key, "replacing field condition with a relation level");
            *node = FilterNode::Relation(Self::new());
        }
        let FilterNode::Relation(tree) = node else {
            unreachable!("relation level was just ensured");
        };
        tree
    }

    /// Unwrap a tree that consists of exactly one `connective` group.
    ///
    /// # Errors
    ///
    /// Returns the tree unchanged when it has other keys or no such group.
    pub fn into_sole_group(self, connective: Connective) -> Result<Vec<FilterTree>, Self> {
        let is_sole = self.0.len() == 1
            && matches!(self.0.get(connective.key()), Some(FilterNode::Group(_)));
        if !is_sole {
            return Err(self);
        }
        let mut map = self.0;
        match map.shift_remove(connective.key()) {
            Some(FilterNode::Group(entries)) => Ok(entries),
            Some(other) => {
                map.insert(connective.key().to_string(), other);
                Err(Self(map))
            }
            None => Err(Self(map)),
        }
    }
}

impl IntoIterator for FilterTree {
    type Item = (String, FilterNode);
    type IntoIter = IntoIter<String, FilterNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a FilterTree {
    type Item = (&'a String, &'a FilterNode);
    type IntoIter = Iter<'a, String, FilterNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, FilterNode)> for FilterTree {
    fn from_iter<I: IntoIterator<Item = (String, FilterNode)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<(String, FilterNode)> for FilterTree {
    fn extend<I: IntoIterator<Item = (String, FilterNode)>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}
