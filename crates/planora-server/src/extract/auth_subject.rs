//! Authenticated subject extractor.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::handler::{Error, ErrorKind, Result};

/// The account id the identity gate verified for this request.
///
/// The gate middleware decodes the bearer token and stores the subject in
/// the request extensions; this extractor reads it back. Extraction fails
/// only on routes the gate does not cover, so a failure means the route
/// was wired without [`require_identity`].
///
/// [`require_identity`]: crate::middleware::require_identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuthSubject(pub i64);

impl AuthSubject {
    /// Returns the verified account id.
    #[inline]
    #[must_use]
    pub const fn account_id(self) -> i64 {
        self.0
    }
}

impl<S> FromRequestParts<S> for AuthSubject
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .copied()
            .ok_or_else(|| ErrorKind::InvalidAccessToken.into_error())
    }
}
