//! Error types for token encoding and verification.

use thiserror::Error;

/// A specialized [`Result`] type for token operations.
///
/// [`Result`]: std::result::Result
pub type AuthResult<T, E = AuthError> = std::result::Result<T, E>;

/// Errors produced by the token codec and issuer.
///
/// Decoding fails with exactly one of [`InvalidSignature`], [`Malformed`] or
/// [`Expired`]. These are internal to the authentication stack: the HTTP
/// layer always remaps them into its own flow-specific error before anything
/// reaches a client.
///
/// [`InvalidSignature`]: AuthError::InvalidSignature
/// [`Malformed`]: AuthError::Malformed
/// [`Expired`]: AuthError::Expired
#[derive(Debug, Error)]
pub enum AuthError {
    /// The signing key was empty at construction time.
    ///
    /// This is the only process-fatal condition in the subsystem and can
    /// only occur at startup.
    #[error("signing key must not be empty")]
    EmptySigningKey,

    /// The token signature does not match the signing key.
    #[error("token signature verification failed")]
    InvalidSignature,

    /// The token is not a structurally valid signed envelope.
    #[error("token is malformed")]
    Malformed,

    /// The token expiry timestamp has passed.
    #[error("token has expired")]
    Expired,

    /// Signing a token failed.
    ///
    /// Does not occur for well-formed claims and an HMAC key; kept so that
    /// issuance propagates instead of panicking.
    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// Remaps a `jsonwebtoken` decode failure into the codec error taxonomy.
    pub(crate) fn from_decode(error: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match error.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            _ => Self::Malformed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_taxonomy() {
        use jsonwebtoken::errors::ErrorKind;

        let expired = AuthError::from_decode(ErrorKind::ExpiredSignature.into());
        assert!(matches!(expired, AuthError::Expired));

        let forged = AuthError::from_decode(ErrorKind::InvalidSignature.into());
        assert!(matches!(forged, AuthError::InvalidSignature));

        let garbage = AuthError::from_decode(ErrorKind::InvalidToken.into());
        assert!(matches!(garbage, AuthError::Malformed));
    }
}
