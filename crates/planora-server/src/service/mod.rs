//! Application state and dependency injection.

mod config;
mod error;
mod session;

use std::sync::Arc;

use planora_auth::{PasswordHasher, TokenCodec};

pub use crate::service::config::{ServiceConfig, ServiceConfigBuilder};
pub use crate::service::error::{Result, ServiceError};
pub use crate::service::session::SessionService;
use crate::mailer::Mailer;
use crate::repository::PrincipalRepository;

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Clone)]
pub struct ServiceState {
    // Collaborators:
    pub principals: Arc<dyn PrincipalRepository>,
    pub mailer: Arc<dyn Mailer>,

    // Internal services:
    pub session_service: SessionService,
    pub token_codec: TokenCodec,
    pub password_hasher: PasswordHasher,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// The collaborators are passed in so deployments and tests can pick
    /// their own persistence and delivery backends.
    pub fn from_config(
        config: &ServiceConfig,
        principals: Arc<dyn PrincipalRepository>,
        mailer: Arc<dyn Mailer>,
    ) -> Result<Self> {
        let password_hasher = config.create_password_hasher();
        let session_service = SessionService::new(
            config.create_token_issuer()?,
            password_hasher.clone(),
            principals.clone(),
            mailer.clone(),
            config.public_base_url.clone(),
        );

        let service_state = Self {
            principals,
            mailer,

            session_service,
            token_codec: config.create_token_codec()?,
            password_hasher,
        };

        Ok(service_state)
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

// Collaborators:
impl_di!(principals: Arc<dyn PrincipalRepository>);
impl_di!(mailer: Arc<dyn Mailer>);

// Internal services:
impl_di!(session_service: SessionService);
impl_di!(token_codec: TokenCodec);
impl_di!(password_hasher: PasswordHasher);
