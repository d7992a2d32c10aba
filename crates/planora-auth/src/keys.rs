//! Shared token signing key.

use jsonwebtoken::{DecodingKey, EncodingKey};

use crate::error::{AuthError, AuthResult};

/// The shared HMAC secret used to sign and verify every token kind.
///
/// Loaded once from configuration at startup and immutable afterwards, so it
/// can be cloned freely across request handlers without locking. Construction
/// is the only fallible step: an empty secret is rejected up front rather
/// than producing tokens nobody can verify.
#[derive(Clone)]
pub struct SigningKey {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SigningKey {
    /// Creates a signing key from a shared secret.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EmptySigningKey`] if the secret is empty.
    pub fn from_secret(secret: &str) -> AuthResult<Self> {
        if secret.is_empty() {
            return Err(AuthError::EmptySigningKey);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    /// Returns the key used for signing tokens.
    #[inline]
    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    /// Returns the key used for verifying token signatures.
    #[inline]
    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material is never printed.
        f.debug_struct("SigningKey").finish_non_exhaustive()
    }
}
