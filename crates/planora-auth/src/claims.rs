//! Token claims and kind discrimination.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Discriminator fixing which single operation a token is valid for.
///
/// The kind travels inside the signed envelope, so a client cannot rewrite
/// a verification token into an access token without invalidating the
/// signature. The codec parses the kind but never enforces it; the operation
/// consuming a token owns that check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(strum::Display, strum::EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TokenKind {
    /// Authenticates a single API request through the identity gate.
    Access,
    /// Redeems a fresh access/refresh pair.
    Refresh,
    /// Confirms ownership of an email address.
    Verification,
    /// Grants membership in a workspace.
    Invite,
}

/// The decoded contents of a signed token, discriminated by kind.
///
/// All four kinds share one envelope shape on the wire, but the subject
/// means different things: for access, refresh and verification tokens it is
/// an account id, for invite tokens a workspace id. Each variant therefore
/// carries only the subject field that is valid for it, and call sites must
/// pattern-match the variant they expect:
///
/// ```
/// use planora_auth::TokenClaims;
///
/// fn account_for_refresh(claims: TokenClaims) -> Option<i64> {
///     match claims {
///         TokenClaims::Refresh { account_id, .. } => Some(account_id),
///         _ => None,
///     }
/// }
/// ```
///
/// A cryptographically valid token of the wrong kind decodes successfully;
/// accepting it anyway is the caller's bug, not the codec's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClaims {
    /// Per-request bearer credential. Subject is the account id.
    Access {
        account_id: i64,
        issued_at: Timestamp,
        expires_at: Timestamp,
    },
    /// Credential for minting a fresh token pair. Subject is the account id.
    Refresh {
        account_id: i64,
        issued_at: Timestamp,
        expires_at: Timestamp,
    },
    /// Email-ownership proof. Subject is the account id.
    Verification {
        account_id: i64,
        issued_at: Timestamp,
        expires_at: Timestamp,
    },
    /// Workspace membership grant. Subject is the workspace id.
    Invite {
        workspace_id: i64,
        issued_at: Timestamp,
        expires_at: Timestamp,
    },
}

impl TokenClaims {
    /// Returns the kind tag of these claims.
    pub fn kind(&self) -> TokenKind {
        match self {
            Self::Access { .. } => TokenKind::Access,
            Self::Refresh { .. } => TokenKind::Refresh,
            Self::Verification { .. } => TokenKind::Verification,
            Self::Invite { .. } => TokenKind::Invite,
        }
    }

    /// Returns the raw subject id, whatever it identifies for this kind.
    ///
    /// Prefer pattern-matching the variant; this is for logging only, where
    /// the kind tag is recorded alongside.
    pub fn subject(&self) -> i64 {
        match *self {
            Self::Access { account_id, .. }
            | Self::Refresh { account_id, .. }
            | Self::Verification { account_id, .. } => account_id,
            Self::Invite { workspace_id, .. } => workspace_id,
        }
    }

    /// Returns when the token was issued.
    pub fn issued_at(&self) -> Timestamp {
        match *self {
            Self::Access { issued_at, .. }
            | Self::Refresh { issued_at, .. }
            | Self::Verification { issued_at, .. }
            | Self::Invite { issued_at, .. } => issued_at,
        }
    }

    /// Returns when the token expires.
    pub fn expires_at(&self) -> Timestamp {
        match *self {
            Self::Access { expires_at, .. }
            | Self::Refresh { expires_at, .. }
            | Self::Verification { expires_at, .. }
            | Self::Invite { expires_at, .. } => expires_at,
        }
    }
}

/// The flat claims shape that actually travels on the wire.
///
/// RFC 7519 numeric dates, lowercase kind tag, numeric subject. Converted to
/// and from the [`TokenClaims`] union at the codec boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct WireClaims {
    /// Subject id: account id, or workspace id for invite tokens.
    pub sub: i64,
    /// Token kind tag.
    pub kind: TokenKind,
    /// Issued at, as whole UTC seconds.
    #[serde(with = "jiff::fmt::serde::timestamp::second::required")]
    pub iat: Timestamp,
    /// Expires at, as whole UTC seconds.
    #[serde(with = "jiff::fmt::serde::timestamp::second::required")]
    pub exp: Timestamp,
}

impl From<TokenClaims> for WireClaims {
    fn from(claims: TokenClaims) -> Self {
        Self {
            sub: claims.subject(),
            kind: claims.kind(),
            iat: claims.issued_at(),
            exp: claims.expires_at(),
        }
    }
}

impl From<WireClaims> for TokenClaims {
    fn from(wire: WireClaims) -> Self {
        let WireClaims { sub, kind, iat, exp } = wire;
        match kind {
            TokenKind::Access => Self::Access {
                account_id: sub,
                issued_at: iat,
                expires_at: exp,
            },
            TokenKind::Refresh => Self::Refresh {
                account_id: sub,
                issued_at: iat,
                expires_at: exp,
            },
            TokenKind::Verification => Self::Verification {
                account_id: sub,
                issued_at: iat,
                expires_at: exp,
            },
            TokenKind::Invite => Self::Invite {
                workspace_id: sub,
                issued_at: iat,
                expires_at: exp,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn kind_wire_tags_are_lowercase() -> anyhow::Result<()> {
        for kind in TokenKind::iter() {
            let tag = serde_json::to_string(&kind)?;
            assert_eq!(tag, format!("\"{kind}\""));
            assert_eq!(tag, tag.to_lowercase());
        }
        Ok(())
    }

    #[test]
    fn wire_round_trip_preserves_variant() {
        let issued_at = Timestamp::from_second(1_700_000_000).unwrap();
        let expires_at = Timestamp::from_second(1_700_086_400).unwrap();

        let claims = TokenClaims::Invite {
            workspace_id: 42,
            issued_at,
            expires_at,
        };

        let wire = WireClaims::from(claims);
        assert_eq!(wire.sub, 42);
        assert_eq!(wire.kind, TokenKind::Invite);

        let back = TokenClaims::from(wire);
        assert_eq!(back, claims);
    }

    #[test]
    fn wire_timestamps_serialize_as_seconds() -> anyhow::Result<()> {
        let wire = WireClaims {
            sub: 7,
            kind: TokenKind::Access,
            iat: Timestamp::from_second(1_700_000_000).unwrap(),
            exp: Timestamp::from_second(1_700_000_060).unwrap(),
        };

        let json: serde_json::Value = serde_json::to_value(&wire)?;
        assert_eq!(json["iat"], 1_700_000_000_i64);
        assert_eq!(json["exp"], 1_700_000_060_i64);
        assert_eq!(json["kind"], "access");
        Ok(())
    }
}
