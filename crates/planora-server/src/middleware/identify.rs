//! Identity gate middleware for protected routes.

use axum::Router;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::{Next, from_fn_with_state};
use axum::response::Response;
use planora_auth::{TokenClaims, TokenCodec};

use crate::extract::AuthSubject;
use crate::handler::{ErrorKind, Result};
use crate::service::ServiceState;

/// Tracing target for identity gate decisions.
const TRACING_TARGET: &str = "planora_server::middleware::identify";

/// Extension trait for `axum::`[`Router`] to apply the identity gate.
pub trait RouterIdentityExt<S> {
    /// Requires a valid access token for all routes.
    ///
    /// The gate validates the `Authorization` header and publishes the
    /// verified [`AuthSubject`] into the request extensions before the
    /// request proceeds.
    fn with_identity(self, state: ServiceState) -> Self;
}

impl<S> RouterIdentityExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_identity(self, state: ServiceState) -> Self {
        self.layer(from_fn_with_state(state, require_identity))
    }
}

/// Verifies the bearer access token and publishes the subject id.
///
/// Every failure mode answers with the same `InvalidAccessToken` envelope:
/// a missing header, a header that does not split into exactly two
/// whitespace-separated parts, a token that fails to decode, and a token
/// of any kind other than access. Nothing about the account is loaded
/// here; handlers that need the principal resolve it themselves.
pub async fn require_identity(
    State(codec): State<TokenCodec>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ErrorKind::InvalidAccessToken.into_error())?;

    let parts: Vec<&str> = header.split_whitespace().collect();
    let [_scheme, token] = parts.as_slice() else {
        tracing::debug!(target: TRACING_TARGET, "malformed authorization header");
        return Err(ErrorKind::InvalidAccessToken.into_error());
    };

    let account_id = match codec.decode(token) {
        Ok(TokenClaims::Access { account_id, .. }) => account_id,
        Ok(claims) => {
            tracing::debug!(
                target: TRACING_TARGET,
                kind = %claims.kind(),
                "non-access token presented to the identity gate"
            );
            return Err(ErrorKind::InvalidAccessToken.into_error());
        }
        Err(error) => {
            tracing::debug!(target: TRACING_TARGET, error = %error, "token rejected");
            return Err(ErrorKind::InvalidAccessToken.into_error());
        }
    };

    request.extensions_mut().insert(AuthSubject(account_id));
    Ok(next.run(request).await)
}
