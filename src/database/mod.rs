//! # sea-orm Integration
//!
//! Lowers parsed queries onto sea-orm so handlers can apply them directly:
//!
//! ```rust,ignore
//! let query = filtercrate::parse_query(raw, &options);
//! let mut select = Entity::find().filter(query.filter.to_condition());
//! for (column, order) in query.order_by.iter().flat_map(OrderBy::to_orders) {
//!     select = select.order_by(Expr::col(Alias::new(column)), order);
//! }
//! ```
//!
//! Field names are taken as column names verbatim. Validate them against
//! the entity before lowering user-controlled trees.

mod condition;
mod order;

pub use condition::escape_like_wildcards;
