//! Token issuance for the four token kinds.

use jiff::{Span, Timestamp};
use serde::{Deserialize, Serialize};

use crate::claims::TokenClaims;
use crate::codec::TokenCodec;
use crate::error::AuthResult;
use crate::keys::SigningKey;

/// Produces signed tokens of every kind from one codec and one signing key.
///
/// Access and refresh TTLs come from configuration; verification and invite
/// TTLs are supplied per call by the flow that needs them. Issuance itself
/// cannot fail once the issuer is constructed: the only fallible step is
/// loading the [`SigningKey`] at startup.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    codec: TokenCodec,
    access_ttl: Span,
    refresh_ttl: Span,
}

/// An access/refresh token pair returned by sign-in and refresh flows.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived bearer token for the identity gate.
    pub access_token: String,
    /// Longer-lived token redeemable for a fresh pair.
    pub refresh_token: String,
}

impl TokenIssuer {
    /// Creates an issuer from the shared signing key and configured TTLs.
    pub fn new(signing_key: SigningKey, access_ttl: Span, refresh_ttl: Span) -> Self {
        Self {
            codec: TokenCodec::new(signing_key),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Returns the codec sharing this issuer's signing key.
    #[inline]
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Issues an access token for an account, using the configured TTL.
    pub fn issue_access(&self, account_id: i64) -> AuthResult<String> {
        let (issued_at, expires_at) = self.window(self.access_ttl);
        self.codec.encode(TokenClaims::Access {
            account_id,
            issued_at,
            expires_at,
        })
    }

    /// Issues a refresh token for an account, using the configured TTL.
    pub fn issue_refresh(&self, account_id: i64) -> AuthResult<String> {
        let (issued_at, expires_at) = self.window(self.refresh_ttl);
        self.codec.encode(TokenClaims::Refresh {
            account_id,
            issued_at,
            expires_at,
        })
    }

    /// Issues an email-verification token with a caller-supplied TTL.
    pub fn issue_verification(&self, account_id: i64, ttl: Span) -> AuthResult<String> {
        let (issued_at, expires_at) = self.window(ttl);
        self.codec.encode(TokenClaims::Verification {
            account_id,
            issued_at,
            expires_at,
        })
    }

    /// Issues a workspace-invite token with a caller-supplied TTL.
    ///
    /// The subject of an invite token is the workspace id, not an account id.
    pub fn issue_invite(&self, workspace_id: i64, ttl: Span) -> AuthResult<String> {
        let (issued_at, expires_at) = self.window(ttl);
        self.codec.encode(TokenClaims::Invite {
            workspace_id,
            issued_at,
            expires_at,
        })
    }

    /// Issues the access/refresh pair handed out by sign-in and refresh.
    pub fn issue_pair(&self, account_id: i64) -> AuthResult<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue_access(account_id)?,
            refresh_token: self.issue_refresh(account_id)?,
        })
    }

    /// Computes the issuance window for a TTL, at wire (second) precision.
    ///
    /// TTLs must use absolute units (hours and below); timestamp arithmetic
    /// rejects calendar units.
    fn window(&self, ttl: Span) -> (Timestamp, Timestamp) {
        // Truncated so issued claims round-trip the wire format exactly.
        let issued_at = Timestamp::from_second(Timestamp::now().as_second())
            .unwrap_or_else(|_| Timestamp::now());
        let expires_at = issued_at.checked_add(ttl).unwrap_or(Timestamp::MAX);
        (issued_at, expires_at)
    }
}
