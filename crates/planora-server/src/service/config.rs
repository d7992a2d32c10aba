use derive_builder::Builder;
use jiff::{Span, ToSpan};
use planora_auth::{PasswordHasher, SigningKey, TokenCodec, TokenIssuer};
use serde::{Deserialize, Serialize};

use crate::service::{Result, ServiceError};

/// Default values for configuration options.
mod defaults {
    /// Default access token lifetime in minutes.
    pub const ACCESS_TOKEN_TTL_MINUTES: i64 = 15;

    /// Default refresh token lifetime in minutes (seven days).
    pub const REFRESH_TOKEN_TTL_MINUTES: i64 = 7 * 24 * 60;

    /// Default public base URL used in outbound email links.
    pub const PUBLIC_BASE_URL: &str = "http://localhost:8080";

    /// Default signing secret for development.
    pub fn signing_key() -> String {
        "insecure-development-secret".to_owned()
    }
}

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[must_use = "config does nothing unless you use it"]
#[builder(
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(validate = "Self::validate")
)]
pub struct ServiceConfig {
    /// Shared secret every token is signed and verified with.
    #[builder(default = "defaults::signing_key()")]
    pub signing_key: String,

    /// Access token lifetime in minutes.
    #[builder(default = "defaults::ACCESS_TOKEN_TTL_MINUTES")]
    pub access_token_ttl_minutes: i64,

    /// Refresh token lifetime in minutes.
    #[builder(default = "defaults::REFRESH_TOKEN_TTL_MINUTES")]
    pub refresh_token_ttl_minutes: i64,

    /// Public base URL used to build links in outbound email.
    #[builder(default = "defaults::PUBLIC_BASE_URL.to_string()")]
    pub public_base_url: String,
}

impl ServiceConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Access token lifetime as a span.
    pub fn access_token_ttl(&self) -> Span {
        self.access_token_ttl_minutes.minutes()
    }

    /// Refresh token lifetime as a span.
    pub fn refresh_token_ttl(&self) -> Span {
        self.refresh_token_ttl_minutes.minutes()
    }

    /// Builds the token issuer from the signing secret and lifetimes.
    ///
    /// An empty secret is the one issuance failure that exists, and it is
    /// caught here at startup.
    pub fn create_token_issuer(&self) -> Result<TokenIssuer> {
        let key = SigningKey::from_secret(&self.signing_key)
            .map_err(|e| ServiceError::config_with_source("Invalid signing key", e))?;

        Ok(TokenIssuer::new(
            key,
            self.access_token_ttl(),
            self.refresh_token_ttl(),
        ))
    }

    /// Builds the token codec from the signing secret.
    pub fn create_token_codec(&self) -> Result<TokenCodec> {
        let key = SigningKey::from_secret(&self.signing_key)
            .map_err(|e| ServiceError::config_with_source("Invalid signing key", e))?;

        Ok(TokenCodec::new(key))
    }

    /// Creates a password hasher with secure defaults.
    pub fn create_password_hasher(&self) -> PasswordHasher {
        PasswordHasher::new()
    }
}

impl ServiceConfigBuilder {
    /// Wrapper for builder validation that returns String errors.
    fn validate(builder: &ServiceConfigBuilder) -> Result<(), String> {
        if let Some(signing_key) = &builder.signing_key
            && signing_key.is_empty()
        {
            return Err("Signing key cannot be empty".to_string());
        }

        if let Some(ttl) = &builder.access_token_ttl_minutes
            && *ttl < 1
        {
            return Err("Access token lifetime must be at least 1 minute".to_string());
        }

        if let Some(ttl) = &builder.refresh_token_ttl_minutes
            && *ttl < 1
        {
            return Err("Refresh token lifetime must be at least 1 minute".to_string());
        }

        if let Some(base_url) = &builder.public_base_url {
            if base_url.is_empty() {
                return Err("Public base URL cannot be empty".to_string());
            }
            if base_url.parse::<url::Url>().is_err() {
                return Err("Public base URL must be a valid URL".to_string());
            }
        }

        Ok(())
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            signing_key: defaults::signing_key(),
            access_token_ttl_minutes: defaults::ACCESS_TOKEN_TTL_MINUTES,
            refresh_token_ttl_minutes: defaults::REFRESH_TOKEN_TTL_MINUTES,
            public_base_url: defaults::PUBLIC_BASE_URL.to_string(),
        }
    }
}
