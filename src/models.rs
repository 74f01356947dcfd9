use serde::{Deserialize, Serialize};

use crate::filtering::pagination::PAGINATION_KEYS;
use crate::filtering::sort::OrderBy;
use crate::filtering::tree::{Connective, FilterTree};

pub const DEFAULT_SEARCH_KEY: &str = "search";
/// Accepted alongside `search` only while the search key is left at its default.
pub const SEARCH_KEY_ALIAS: &str = "q";
pub const DEFAULT_ORDER_KEY: &str = "order";
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// How string-matching operators compare text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Case-sensitive, the database default
    Default,
    /// Marks `contains`/`startsWith`/`endsWith` as case-insensitive
    #[default]
    Insensitive,
}

impl SearchMode {
    #[must_use]
    pub const fn is_insensitive(self) -> bool {
        matches!(self, Self::Insensitive)
    }
}

/// Parser configuration.
///
/// Deserializes from partial JSON; missing fields keep their defaults:
///
/// ```json
/// { "search_fields": ["name", "customer.email"], "default_page_size": 25 }
/// ```
///
/// The pagination keys `skip`, `take`, `page` and `pageSize` are fixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Key carrying the global search term.
    pub search_key: String,
    /// Key carrying the sort directive (`field:direction` or `field_direction`).
    pub order_key: String,
    /// Fields searched by the global search term, dotted paths allowed.
    pub search_fields: Vec<String>,
    pub search_mode: SearchMode,
    /// Joins the search group with the other filters.
    pub search_connective: Connective,
    pub default_page_size: u64,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            search_key: DEFAULT_SEARCH_KEY.to_string(),
            order_key: DEFAULT_ORDER_KEY.to_string(),
            search_fields: Vec::new(),
            search_mode: SearchMode::default(),
            search_connective: Connective::And,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ParseOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_search_key(mut self, key: impl Into<String>) -> Self {
        self.search_key = key.into();
        self
    }

    #[must_use]
    pub fn with_order_key(mut self, key: impl Into<String>) -> Self {
        self.order_key = key.into();
        self
    }

    #[must_use]
    pub fn with_search_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_search_mode(mut self, mode: SearchMode) -> Self {
        self.search_mode = mode;
        self
    }

    #[must_use]
    pub fn with_search_connective(mut self, connective: Connective) -> Self {
        self.search_connective = connective;
        self
    }

    #[must_use]
    pub fn with_default_page_size(mut self, page_size: u64) -> Self {
        self.default_page_size = page_size;
        self
    }

    /// Whether `key` carries the global search term.
    #[must_use]
    pub fn is_search_key(&self, key: &str) -> bool {
        key == self.search_key
            || (self.search_key == DEFAULT_SEARCH_KEY && key == SEARCH_KEY_ALIAS)
    }

    /// Keys consumed by search, sort or pagination rather than filtering.
    #[must_use]
    pub fn is_reserved_key(&self, key: &str) -> bool {
        PAGINATION_KEYS.contains(&key) || key == self.order_key || self.is_search_key(key)
    }

    /// The configured page size; a zero page size falls back to the default.
    #[must_use]
    pub const fn page_size(&self) -> u64 {
        if self.default_page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.default_page_size
        }
    }
}

/// The parsed query object: `{ where, orderBy, skip, take }`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedQuery {
    #[serde(rename = "where")]
    pub filter: FilterTree,
    #[serde(rename = "orderBy", skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderBy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take: Option<u64>,
}

impl ParsedQuery {
    /// A query carrying only a filter, e.g. a trusted tenant scope.
    #[must_use]
    pub fn from_filter(filter: FilterTree) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }
}
