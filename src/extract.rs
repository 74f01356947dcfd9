//! axum extractor for parsed queries.
//!
//! ```rust,ignore
//! async fn list_orders(FilterQuery(query): FilterQuery) -> impl IntoResponse {
//!     Json(query)
//! }
//!
//! let app = Router::new()
//!     .route("/orders", get(list_orders))
//!     .layer(Extension(ParseOptions::default().with_search_fields(["reference"])));
//! ```

use std::convert::Infallible;
use std::ops::{Deref, DerefMut};

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::filtering::parse_query;
use crate::models::{ParseOptions, ParsedQuery};

/// Parses the request's query string into a [`ParsedQuery`].
///
/// Options come from a `ParseOptions` request extension, usually installed
/// with `Extension(options)` as a router layer. Without one, the defaults
/// apply. Parsing never fails, so neither does extraction.
#[derive(Debug, Clone, Default)]
pub struct FilterQuery(pub ParsedQuery);

impl FilterQuery {
    #[must_use]
    pub fn into_inner(self) -> ParsedQuery {
        self.0
    }
}

impl Deref for FilterQuery {
    type Target = ParsedQuery;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for FilterQuery {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<S> FromRequestParts<S> for FilterQuery
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts.uri.query().unwrap_or_default();
        let query = match parts.extensions.get::<ParseOptions>() {
            Some(options) => parse_query(raw, options),
            None => parse_query(raw, &ParseOptions::default()),
        };
        tracing::debug!(uri = %parts.uri, "extracted filter query");
        Ok(Self(query))
    }
}
