//! Session flows: sign-in, sign-up, refresh and email verification.

use std::sync::Arc;

use jiff::{Span, ToSpan};
use planora_auth::{AuthError, PasswordHasher, TokenClaims, TokenIssuer, TokenPair};

use crate::handler::{Error, ErrorKind, Result};
use crate::mailer::{Email, Mailer};
use crate::repository::{NewPrincipal, Principal, PrincipalRepository};

/// Tracing target for session flow operations.
const TRACING_TARGET: &str = "planora_server::service::session";

/// Orchestrates the token issuer, credential hasher and the collaborator
/// contracts into the account session flows.
///
/// Every flow is request-local: one mutating repository call plus at most
/// one read-back, no retries, and any unexpected collaborator failure
/// surfaces immediately as `InternalError`. Authentication state lives
/// entirely in the tokens; there is no server-side session store.
#[derive(Clone)]
pub struct SessionService {
    issuer: TokenIssuer,
    hasher: PasswordHasher,
    principals: Arc<dyn PrincipalRepository>,
    mailer: Arc<dyn Mailer>,
    public_base_url: String,
}

impl SessionService {
    /// Creates the session service over its collaborators.
    pub fn new(
        issuer: TokenIssuer,
        hasher: PasswordHasher,
        principals: Arc<dyn PrincipalRepository>,
        mailer: Arc<dyn Mailer>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            issuer,
            hasher,
            principals,
            mailer,
            public_base_url: public_base_url.into(),
        }
    }

    /// Verification and invite links stay valid for one day.
    fn day_ttl() -> Span {
        24.hours()
    }

    /// Authenticates an account and issues an access/refresh pair.
    ///
    /// Fails with `InvalidCredentials` for an unknown email, a repository
    /// failure during lookup and a wrong password alike: the three cases are
    /// deliberately indistinguishable so responses do not leak which email
    /// addresses have accounts. Verification status does not gate sign-in.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(Principal, TokenPair)> {
        let normalized_email = email.to_lowercase();

        let principal = match self.principals.find_by_email(&normalized_email).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %e,
                    "principal lookup failed during sign-in"
                );
                None
            }
        };

        // Hash even when no account matched, so latency stays uniform.
        let password_valid = match &principal {
            Some(principal) => self.hasher.verify(password, &principal.password_hash),
            None => self.hasher.verify_dummy(password),
        };

        let Some(principal) = principal.filter(|_| password_valid) else {
            tracing::debug!(target: TRACING_TARGET, "sign-in rejected");
            return Err(ErrorKind::InvalidCredentials.into_error());
        };

        let tokens = self
            .issuer
            .issue_pair(principal.id)
            .map_err(issuance_failure)?;

        tracing::info!(
            target: TRACING_TARGET,
            account_id = principal.id,
            "sign-in completed"
        );
        Ok((principal, tokens))
    }

    /// Registers a new, unverified account and dispatches a verification
    /// email carrying a one-day token.
    ///
    /// The existence probe treats "found without error" as a collision;
    /// a lookup failure is reported as `InternalError`, not as a collision.
    pub async fn sign_up(&self, username: &str, email: &str, password: &str) -> Result<Principal> {
        let normalized_email = email.to_lowercase();

        match self.principals.find_by_email(&normalized_email).await {
            Ok(Some(_)) => return Err(ErrorKind::CredentialsExists.into_error()),
            Ok(None) => {}
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "existence probe failed during sign-up"
                );
                return Err(ErrorKind::InternalError.into_error());
            }
        }

        let principal = self
            .principals
            .create(NewPrincipal {
                username: username.to_owned(),
                email: normalized_email,
                password_hash: self.hasher.hash(password),
            })
            .await?;

        self.send_verification_email(&principal).await?;

        tracing::info!(
            target: TRACING_TARGET,
            account_id = principal.id,
            "account created, verification email dispatched"
        );
        Ok(principal)
    }

    /// Redeems a refresh token for a fresh access/refresh pair.
    ///
    /// Any decode failure, and any kind other than refresh, is
    /// `InvalidRefreshToken`. The old pair stays valid until expiry; tokens
    /// are not single-use and there is no revocation list.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let account_id = match self.issuer.codec().decode(refresh_token) {
            Ok(TokenClaims::Refresh { account_id, .. }) => account_id,
            Ok(_) | Err(_) => return Err(ErrorKind::InvalidRefreshToken.into_error()),
        };

        self.issuer.issue_pair(account_id).map_err(issuance_failure)
    }

    /// Resends the verification email for an unverified account.
    pub async fn confirm_email_again(&self, email: &str) -> Result<Principal> {
        let principal = match self.principals.find_by_email(&email.to_lowercase()).await {
            Ok(Some(principal)) => principal,
            Ok(None) | Err(_) => return Err(ErrorKind::InvalidCredentials.into_error()),
        };

        if principal.is_verified {
            return Err(ErrorKind::BadRequest.with_message("The account has already been verified"));
        }

        self.send_verification_email(&principal).await?;
        Ok(principal)
    }

    /// Marks an account verified from an email-verification token.
    ///
    /// Any decode failure, and any kind other than verification, is a
    /// `BadRequest` with the token-specific message.
    pub async fn verify_email(&self, token: &str) -> Result<()> {
        let account_id = match self.issuer.codec().decode(token) {
            Ok(TokenClaims::Verification { account_id, .. }) => account_id,
            Ok(_) | Err(_) => {
                return Err(ErrorKind::BadRequest.with_message("Invalid verification token"));
            }
        };

        self.principals.mark_verified(account_id).await?;

        tracing::info!(
            target: TRACING_TARGET,
            account_id,
            "email address verified"
        );
        Ok(())
    }

    /// Issues a one-day invite token for a workspace.
    ///
    /// The token's subject is the workspace id, not an account id.
    pub fn issue_invite(&self, workspace_id: i64) -> Result<String> {
        self.issuer
            .issue_invite(workspace_id, Self::day_ttl())
            .map_err(issuance_failure)
    }

    /// Redeems an invite token for the workspace id it grants access to.
    ///
    /// Any decode failure, and any kind other than invite, is a
    /// `BadRequest` with the token-specific message.
    pub fn workspace_from_invite(&self, token: &str) -> Result<i64> {
        match self.issuer.codec().decode(token) {
            Ok(TokenClaims::Invite { workspace_id, .. }) => Ok(workspace_id),
            Ok(_) | Err(_) => Err(ErrorKind::BadRequest.with_message("Invalid invite token")),
        }
    }

    /// Resolves the principal behind a subject id the identity gate
    /// published.
    pub async fn authorized_principal(&self, account_id: i64) -> Result<Principal> {
        match self.principals.find_by_id(account_id).await? {
            Some(principal) => Ok(principal),
            None => Err(ErrorKind::NotFound.into_error()),
        }
    }

    /// Issues a one-day verification token and mails the confirmation link.
    async fn send_verification_email(&self, principal: &Principal) -> Result<()> {
        let token = self
            .issuer
            .issue_verification(principal.id, Self::day_ttl())
            .map_err(issuance_failure)?;

        let link = format!(
            "{}/auth/verify-email?token={token}",
            self.public_base_url.trim_end_matches('/'),
        );
        let body = format!(
            "Hello {username},\n\n\
             Follow the link below to confirm your email address:\n\
             {link}\n\n\
             The link expires in 24 hours.\n",
            username = principal.username,
        );

        self.mailer
            .send(Email {
                to: vec![principal.email.clone()],
                subject: "Confirm email".to_owned(),
                body,
            })
            .await
            .map_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    account_id = principal.id,
                    "verification email dispatch failed"
                );
                ErrorKind::InternalError.into_error()
            })
    }
}

/// Token issuance does not fail after startup; if it somehow does, the
/// request answers with a plain internal error.
fn issuance_failure(error: AuthError) -> Error {
    tracing::error!(
        target: TRACING_TARGET,
        error = %error,
        "token issuance failed"
    );
    ErrorKind::InternalError.into_error()
}

#[cfg(test)]
mod tests {
    use planora_auth::SigningKey;

    use super::*;
    use crate::mailer::RecordingMailer;
    use crate::repository::InMemoryPrincipals;

    fn service_with(mailer: RecordingMailer) -> (SessionService, Arc<InMemoryPrincipals>) {
        let principals = Arc::new(InMemoryPrincipals::new());
        let key = SigningKey::from_secret("session-test-secret").unwrap();
        let issuer = TokenIssuer::new(key, 15.minutes(), 168.hours());
        let service = SessionService::new(
            issuer,
            PasswordHasher::new(),
            principals.clone(),
            Arc::new(mailer),
            "https://planora.test",
        );
        (service, principals)
    }

    fn service() -> (SessionService, Arc<InMemoryPrincipals>) {
        service_with(RecordingMailer::new())
    }

    #[tokio::test]
    async fn sign_up_then_sign_in() -> anyhow::Result<()> {
        let (service, _) = service();

        let created = service.sign_up("alice", "a@x.com", "password1").await?;
        assert!(!created.is_verified);

        // Verification status does not gate sign-in.
        let (principal, tokens) = service.sign_in("a@x.com", "password1").await?;
        assert_eq!(principal.id, created.id);
        assert!(!tokens.access_token.is_empty());
        assert!(!tokens.refresh_token.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn sign_in_is_opaque_about_the_failure_cause() -> anyhow::Result<()> {
        let (service, _) = service();
        service.sign_up("alice", "a@x.com", "password1").await?;

        let unknown_email = service.sign_in("nobody@x.com", "password1").await;
        let wrong_password = service.sign_in("a@x.com", "password2").await;

        for result in [unknown_email, wrong_password] {
            let error = result.err().expect("sign-in must fail");
            assert_eq!(error.kind(), ErrorKind::InvalidCredentials);
        }
        Ok(())
    }

    #[tokio::test]
    async fn sign_up_collision() -> anyhow::Result<()> {
        let (service, _) = service();
        service.sign_up("alice", "a@x.com", "password1").await?;

        let collision = service.sign_up("alice2", "A@X.com", "password2").await;
        let error = collision.err().expect("second sign-up must fail");
        assert_eq!(error.kind(), ErrorKind::CredentialsExists);
        Ok(())
    }

    #[tokio::test]
    async fn sign_up_sends_verification_link() -> anyhow::Result<()> {
        let mailer = RecordingMailer::new();
        let (service, _) = service_with(mailer.clone());

        service.sign_up("alice", "a@x.com", "password1").await?;

        let sent = mailer.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, vec!["a@x.com".to_owned()]);
        assert_eq!(sent[0].subject, "Confirm email");
        assert!(sent[0]
            .body
            .contains("https://planora.test/auth/verify-email?token="));
        Ok(())
    }

    #[tokio::test]
    async fn refresh_rotates_the_pair_for_the_same_account() -> anyhow::Result<()> {
        let (service, _) = service();
        let created = service.sign_up("alice", "a@x.com", "password1").await?;
        let (_, tokens) = service.sign_in("a@x.com", "password1").await?;

        let fresh = service.refresh(&tokens.refresh_token).await?;
        let decoded = service.issuer.codec().decode(&fresh.access_token)?;
        assert!(matches!(
            decoded,
            TokenClaims::Access { account_id, .. } if account_id == created.id
        ));
        Ok(())
    }

    #[tokio::test]
    async fn refresh_rejects_access_tokens() -> anyhow::Result<()> {
        let (service, _) = service();
        service.sign_up("alice", "a@x.com", "password1").await?;
        let (_, tokens) = service.sign_in("a@x.com", "password1").await?;

        let result = service.refresh(&tokens.access_token).await;
        let error = result.err().expect("wrong kind must fail");
        assert_eq!(error.kind(), ErrorKind::InvalidRefreshToken);
        Ok(())
    }

    #[tokio::test]
    async fn email_verification_round_trip() -> anyhow::Result<()> {
        let mailer = RecordingMailer::new();
        let (service, principals) = service_with(mailer.clone());
        let created = service.sign_up("alice", "a@x.com", "password1").await?;

        let sent = mailer.sent().await;
        let token = sent[0]
            .body
            .split("token=")
            .nth(1)
            .and_then(|rest| rest.split_whitespace().next())
            .expect("verification link carries a token");

        service.verify_email(token).await?;
        let verified = principals.find_by_id(created.id).await?;
        assert_eq!(verified.map(|p| p.is_verified), Some(true));

        // A second confirmation request is now rejected.
        let again = service.confirm_email_again("a@x.com").await;
        let error = again.err().expect("already verified must fail");
        assert_eq!(error.kind(), ErrorKind::BadRequest);
        assert_eq!(error.message(), Some("The account has already been verified"));
        Ok(())
    }

    #[tokio::test]
    async fn invite_round_trip() -> anyhow::Result<()> {
        let (service, _) = service();

        let token = service.issue_invite(42)?;
        assert_eq!(service.workspace_from_invite(&token)?, 42);
        Ok(())
    }

    #[tokio::test]
    async fn kind_matrix_only_the_diagonal_succeeds() -> anyhow::Result<()> {
        let (service, _) = service();
        let created = service.sign_up("alice", "a@x.com", "password1").await?;
        let (_, tokens) = service.sign_in("a@x.com", "password1").await?;

        let verification = service
            .issuer
            .issue_verification(created.id, 24.hours())?;
        let invite = service.issue_invite(7)?;

        // Kinds in flow order: refresh, verification, invite.
        let flows_and_wrong_tokens = [
            (&tokens.access_token, "access"),
            (&verification, "verification"),
            (&invite, "invite"),
        ];
        for (token, label) in flows_and_wrong_tokens {
            let error = service.refresh(token).await.err().expect(label);
            assert_eq!(error.kind(), ErrorKind::InvalidRefreshToken, "{label}");
        }

        for token in [&tokens.access_token, &tokens.refresh_token, &invite] {
            let error = service.verify_email(token).await.err().expect("wrong kind");
            assert_eq!(error.kind(), ErrorKind::BadRequest);
            assert_eq!(error.message(), Some("Invalid verification token"));
        }

        for token in [&tokens.access_token, &tokens.refresh_token, &verification] {
            let error = service.workspace_from_invite(token).err().expect("wrong kind");
            assert_eq!(error.kind(), ErrorKind::BadRequest);
            assert_eq!(error.message(), Some("Invalid invite token"));
        }

        // The access-token flow (identity gate) is covered by the HTTP tests.
        assert!(service.refresh(&tokens.refresh_token).await.is_ok());
        assert!(service.verify_email(&verification).await.is_ok());
        assert_eq!(service.workspace_from_invite(&invite)?, 7);
        Ok(())
    }

    #[tokio::test]
    async fn authorized_principal_resolves_or_404s() -> anyhow::Result<()> {
        let (service, _) = service();
        let created = service.sign_up("alice", "a@x.com", "password1").await?;

        let resolved = service.authorized_principal(created.id).await?;
        assert_eq!(resolved.email, "a@x.com");

        let missing = service.authorized_principal(9999).await;
        let error = missing.err().expect("unknown id must fail");
        assert_eq!(error.kind(), ErrorKind::NotFound);
        Ok(())
    }
}
