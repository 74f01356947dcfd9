use indexmap::IndexMap;
use indexmap::map::Iter;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::params::ParamMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Only the exact, lowercase `desc` sorts descending.
    #[must_use]
    pub fn parse(direction: &str) -> Self {
        if direction == "desc" { Self::Desc } else { Self::Asc }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered `field → direction` mapping, serialized as `{ "name": "desc" }`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderBy(IndexMap<String, SortDirection>);

impl OrderBy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A single-field ordering.
    #[must_use]
    pub fn by(field: impl Into<String>, direction: SortDirection) -> Self {
        let mut order_by = Self::new();
        order_by.push(field, direction);
        order_by
    }

    pub fn push(&mut self, field: impl Into<String>, direction: SortDirection) {
        self.0.insert(field.into(), direction);
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<SortDirection> {
        self.0.get(field).copied()
    }

    pub fn iter(&self) -> Iter<'_, String, SortDirection> {
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
}

/// Parse one sort directive.
///
/// The value splits on its first `:` when it has one, otherwise on its first
/// `_`: `name:desc`, `name_desc` and `name` all name the field `name`. Note
/// that `created_at_desc` names the field `created` (direction `at_desc`,
/// hence ascending); use the colon form for fields containing underscores.
/// An empty field name yields no ordering.
#[must_use]
pub fn parse_sort_directive(directive: &str) -> Option<OrderBy> {
    let (field, direction) = directive
        .split_once(':')
        .or_else(|| directive.split_once('_'))
        .unwrap_or((directive, ""));
    if field.is_empty() {
        tracing::debug!(directive, "ignoring sort directive without a field");
        return None;
    }
    Some(OrderBy::by(field, SortDirection::parse(direction)))
}

/// The ordering named by the last `order_key` parameter, if any.
#[must_use]
pub fn resolve_sort(params: &ParamMap, order_key: &str) -> Option<OrderBy> {
    params.last(order_key).and_then(parse_sort_directive)
}
