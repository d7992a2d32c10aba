//! Signed token encoding and verification.

use jsonwebtoken::{Algorithm, Header, Validation, decode, encode};

use crate::claims::{TokenClaims, WireClaims};
use crate::error::{AuthError, AuthResult};
use crate::keys::SigningKey;

/// Tracing target for token codec operations.
const TRACING_TARGET: &str = "planora_auth::codec";

/// Encodes and verifies signed tokens for every token kind.
///
/// One codec instance, bound to the one shared [`SigningKey`], serves all
/// four kinds; only the claims differ. Verification covers the signature and
/// the expiry timestamp. It deliberately does **not** cover the kind: a
/// valid token of the wrong kind decodes successfully, and the operation
/// consuming it must match the expected [`TokenClaims`] variant itself.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    signing_key: SigningKey,
}

impl TokenCodec {
    /// Signing algorithm for the shared-secret scheme.
    const ALGORITHM: Algorithm = Algorithm::HS256;

    /// Creates a codec bound to the given signing key.
    #[inline]
    pub fn new(signing_key: SigningKey) -> Self {
        Self { signing_key }
    }

    /// Serializes and signs the given claims into a URL-safe token string.
    ///
    /// Mutating any field of the result invalidates the signature.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Signing`] if serialization fails; this does not
    /// occur for the claims shapes this crate produces.
    pub fn encode(&self, claims: TokenClaims) -> AuthResult<String> {
        let header = Header::new(Self::ALGORITHM);
        let wire = WireClaims::from(claims);

        encode(&header, &wire, self.signing_key.encoding_key()).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                kind = %claims.kind(),
                "failed to sign token"
            );
            AuthError::Signing(e)
        })
    }

    /// Verifies a token string and returns its decoded claims.
    ///
    /// Checks the signature against the shared key and the expiry timestamp
    /// against the current time, exactly once. The token kind is parsed but
    /// not enforced here.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidSignature`] if the signature does not match.
    /// - [`AuthError::Expired`] if the expiry timestamp has passed.
    /// - [`AuthError::Malformed`] for anything else that is not a valid
    ///   signed envelope, including unknown kind tags.
    pub fn decode(&self, token: &str) -> AuthResult<TokenClaims> {
        let mut validation = Validation::new(Self::ALGORITHM);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["sub", "exp"]);

        let token_data = decode::<WireClaims>(token, self.signing_key.decoding_key(), &validation)
            .map_err(|e| {
                let error = AuthError::from_decode(e);
                tracing::debug!(
                    target: TRACING_TARGET,
                    error = %error,
                    "token verification failed"
                );
                error
            })?;

        Ok(TokenClaims::from(token_data.claims))
    }
}
