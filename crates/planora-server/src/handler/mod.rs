//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod authentication;
mod error;
mod response;
mod workspaces;

use axum::Router;
use axum::response::{IntoResponse, Response};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::response::{ErrorResponse, SuccessResponse};
use crate::middleware::RouterIdentityExt;
use crate::service::ServiceState;

#[inline]
async fn fallback() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns a [`Router`] with all routes that require a verified identity.
fn private_routes(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .merge(authentication::private_routes())
        .merge(workspaces::routes())
        .with_identity(state)
}

/// Returns a [`Router`] with all publicly reachable routes.
fn public_routes() -> Router<ServiceState> {
    authentication::routes()
}

/// Returns the complete application [`Router`].
pub fn routes(state: ServiceState) -> Router {
    Router::new()
        .merge(private_routes(state.clone()))
        .merge(public_routes())
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
