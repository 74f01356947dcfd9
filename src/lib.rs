//! Compile URL query parameters into ORM-style `{ where, orderBy, skip, take }` objects.
//!
//! ```rust
//! use filtercrate::{ParseOptions, parse_query};
//!
//! let query = parse_query("age_gte=18&age_lte=65&order=name:desc", &ParseOptions::default());
//! let json = serde_json::to_value(&query).unwrap();
//!
//! assert_eq!(
//!     json,
//!     serde_json::json!({
//!         "where": { "age": { "gte": 18, "lte": 65 } },
//!         "orderBy": { "name": "desc" }
//!     })
//! );
//! ```
//!
//! Features:
//! - `axum` (default): the [`FilterQuery`] extractor and `IntoResponse` for [`FilterError`]
//! - `sea-orm` (default): `FilterTree::to_condition` and `OrderBy::to_orders`

pub mod errors;
pub mod filtering;
pub mod models;
pub mod params;

#[cfg(feature = "sea-orm")]
pub mod database;
#[cfg(feature = "axum")]
pub mod extract;

pub use errors::FilterError;
pub use filtering::{
    Connective, FilterNode, FilterTree, Operand, Operator, Operators, OrderBy, Scalar,
    SortDirection, merge_filters, merge_queries, parse_filters, parse_params, parse_query,
    parse_query_with_context, to_params, to_query_string,
};
pub use models::{ParseOptions, ParsedQuery, SearchMode};
pub use params::{ParamMap, QueryInput, RecordValue};

#[cfg(feature = "axum")]
pub use extract::FilterQuery;
