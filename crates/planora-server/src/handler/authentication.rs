//! Authentication handlers: registration, sign-in, token refresh and
//! email verification.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use planora_auth::TokenPair;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::extract::{AuthSubject, ValidateJson};
use crate::handler::{Result, SuccessResponse};
use crate::repository::Principal;
use crate::service::{ServiceState, SessionService};

/// Tracing target for authentication operations.
const TRACING_TARGET: &str = "planora_server::handler::authentication";

/// Request payload for registration.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct SignUpRequest {
    /// Display name of the new account.
    #[validate(length(min = 2, max = 64))]
    pub username: String,
    /// Email address of the new account.
    #[validate(email)]
    pub email: String,
    /// Password of the new account.
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Request payload for sign-in.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct SignInRequest {
    /// Email address of the account.
    #[validate(email)]
    pub email: String,
    /// Password of the account.
    #[validate(length(min = 1))]
    pub password: String,
}

/// Response returned after successful sign-in.
#[must_use]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    /// The authenticated account.
    pub user: Principal,
    /// Access and refresh token pair.
    pub tokens: TokenPair,
}

/// Request payload for the token refresh flow.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct RefreshTokenRequest {
    /// The refresh token to redeem.
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

/// Response returned by the token refresh flow.
#[must_use]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshTokenResponse {
    /// Fresh access and refresh token pair.
    pub tokens: TokenPair,
}

/// Query parameters for re-sending the verification email.
#[must_use]
#[derive(Debug, Deserialize, Validate)]
struct ConfirmEmailAgainQuery {
    /// Email address of the account to re-send the link to.
    #[validate(email)]
    pub email: String,
}

/// Query parameters carried by the emailed verification link.
#[must_use]
#[derive(Debug, Deserialize)]
struct VerifyEmailQuery {
    /// The verification token from the link.
    pub token: String,
}

/// Registers a new account and dispatches the verification email.
async fn sign_up(
    State(session): State<SessionService>,
    ValidateJson(request): ValidateJson<SignUpRequest>,
) -> Result<(StatusCode, Json<Principal>)> {
    let principal = session
        .sign_up(&request.username, &request.email, &request.password)
        .await?;

    Ok((StatusCode::CREATED, Json(principal)))
}

/// Authenticates an account and returns a token pair.
async fn sign_in(
    State(session): State<SessionService>,
    ValidateJson(request): ValidateJson<SignInRequest>,
) -> Result<Json<SignInResponse>> {
    let (user, tokens) = session.sign_in(&request.email, &request.password).await?;
    Ok(Json(SignInResponse { user, tokens }))
}

/// Redeems a refresh token for a fresh token pair.
async fn refresh_token(
    State(session): State<SessionService>,
    ValidateJson(request): ValidateJson<RefreshTokenRequest>,
) -> Result<Json<RefreshTokenResponse>> {
    let tokens = session.refresh(&request.refresh_token).await?;
    Ok(Json(RefreshTokenResponse { tokens }))
}

/// Re-sends the verification email for an unverified account.
async fn confirm_email_again(
    State(session): State<SessionService>,
    Query(query): Query<ConfirmEmailAgainQuery>,
) -> Result<Json<SuccessResponse>> {
    query.validate()?;
    session.confirm_email_again(&query.email).await?;
    Ok(Json(SuccessResponse::new("The verification email has been sent")))
}

/// Marks an account verified from the emailed link.
async fn verify_email(
    State(session): State<SessionService>,
    Query(query): Query<VerifyEmailQuery>,
) -> Result<Json<SuccessResponse>> {
    session.verify_email(&query.token).await?;

    tracing::debug!(target: TRACING_TARGET, "verification link redeemed");
    Ok(Json(SuccessResponse::new("The email has been verified")))
}

/// Returns the account behind the verified access token.
async fn status(
    subject: AuthSubject,
    State(session): State<SessionService>,
) -> Result<Json<Principal>> {
    let principal = session.authorized_principal(subject.account_id()).await?;
    Ok(Json(principal))
}

/// Returns a [`Router`] with the public authentication routes.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/auth/sign-up", post(sign_up))
        .route("/auth/sign-in", post(sign_in))
        .route("/auth/refresh-token", post(refresh_token))
        .route("/auth/confirm-email-again", post(confirm_email_again))
        .route("/auth/verify-email", get(verify_email))
}

/// Returns a [`Router`] with the identity-gated authentication routes.
pub fn private_routes() -> Router<ServiceState> {
    Router::new().route("/auth/status", get(status))
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;
    use jiff::{Timestamp, ToSpan};
    use planora_auth::{SigningKey, TokenClaims, TokenCodec};
    use serde_json::{Value, json};

    use crate::handler::test::create_test_server;
    use crate::service::ServiceConfig;

    async fn sign_up_alice(server: &TestServer) -> Value {
        let response = server
            .post("/auth/sign-up")
            .json(&json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": "Password123!",
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json()
    }

    async fn sign_in_alice(server: &TestServer) -> Value {
        let response = server
            .post("/auth/sign-in")
            .json(&json!({
                "email": "alice@example.com",
                "password": "Password123!",
            }))
            .await;
        response.assert_status_ok();
        response.json()
    }

    #[tokio::test]
    async fn test_signup_success() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;

        let body = sign_up_alice(&server).await;
        assert_eq!(body["username"], "alice");
        assert_eq!(body["email"], "alice@example.com");
        assert_eq!(body["isVerified"], false);
        assert_eq!(body["role"], "user");
        assert!(body.get("passwordHash").is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_signup_invalid_email() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;

        let response = server
            .post("/auth/sign-up")
            .json(&json!({
                "username": "alice",
                "email": "not-an-email",
                "password": "Password123!",
            }))
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "BadRequest");
        Ok(())
    }

    #[tokio::test]
    async fn test_signup_duplicate_email() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;
        sign_up_alice(&server).await;

        let response = server
            .post("/auth/sign-up")
            .json(&json!({
                "username": "alice-again",
                // Email matching is case-insensitive.
                "email": "ALICE@example.com",
                "password": "Password456!",
            }))
            .await;

        response.assert_status(axum::http::StatusCode::CONFLICT);
        let body: Value = response.json();
        assert_eq!(body["code"], "CredentialsExists");
        assert_eq!(body["error"], "A user with such credentials already exists");
        Ok(())
    }

    #[tokio::test]
    async fn test_signin_success() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;
        let created = sign_up_alice(&server).await;

        let body = sign_in_alice(&server).await;
        assert_eq!(body["user"]["id"], created["id"]);
        assert!(body["tokens"]["accessToken"].is_string());
        assert!(body["tokens"]["refreshToken"].is_string());
        Ok(())
    }

    #[tokio::test]
    async fn test_signin_wrong_password() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;
        sign_up_alice(&server).await;

        let response = server
            .post("/auth/sign-in")
            .json(&json!({
                "email": "alice@example.com",
                "password": "wrong-password",
            }))
            .await;

        response.assert_status_unauthorized();
        let body: Value = response.json();
        assert_eq!(body["code"], "InvalidCredentials");
        assert_eq!(body["error"], "There is no user with such credentials");
        Ok(())
    }

    #[tokio::test]
    async fn test_signin_nonexistent_user_is_indistinguishable() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;
        sign_up_alice(&server).await;

        let wrong_password = server
            .post("/auth/sign-in")
            .json(&json!({"email": "alice@example.com", "password": "wrong-password"}))
            .await;
        let unknown_email = server
            .post("/auth/sign-in")
            .json(&json!({"email": "nobody@example.com", "password": "Password123!"}))
            .await;

        wrong_password.assert_status_unauthorized();
        unknown_email.assert_status_unauthorized();
        assert_eq!(
            wrong_password.json::<Value>(),
            unknown_email.json::<Value>()
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_refresh_token_keeps_the_subject() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;
        sign_up_alice(&server).await;
        let session = sign_in_alice(&server).await;

        let response = server
            .post("/auth/refresh-token")
            .json(&json!({"refreshToken": session["tokens"]["refreshToken"]}))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();

        // The fresh access token still authenticates as the same account.
        let status = server
            .get("/auth/status")
            .authorization_bearer(body["tokens"]["accessToken"].as_str().unwrap_or_default())
            .await;
        status.assert_status_ok();
        assert_eq!(status.json::<Value>()["id"], session["user"]["id"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;
        sign_up_alice(&server).await;
        let session = sign_in_alice(&server).await;

        let response = server
            .post("/auth/refresh-token")
            .json(&json!({"refreshToken": session["tokens"]["accessToken"]}))
            .await;

        response.assert_status_unauthorized();
        assert_eq!(response.json::<Value>()["code"], "InvalidRefreshToken");
        Ok(())
    }

    #[tokio::test]
    async fn test_verify_email_link_round_trip() -> anyhow::Result<()> {
        let (server, mailer) = create_test_server()?;
        sign_up_alice(&server).await;

        let sent = mailer.sent().await;
        assert_eq!(sent.len(), 1);
        let token = sent[0]
            .body
            .split("token=")
            .nth(1)
            .and_then(|rest| rest.split_whitespace().next())
            .expect("verification link carries a token");

        let response = server.get(&format!("/auth/verify-email?token={token}")).await;
        response.assert_status_ok();

        let status = server
            .get("/auth/status")
            .authorization_bearer(
                sign_in_alice(&server).await["tokens"]["accessToken"]
                    .as_str()
                    .unwrap_or_default(),
            )
            .await;
        assert_eq!(status.json::<Value>()["isVerified"], true);
        Ok(())
    }

    #[tokio::test]
    async fn test_verify_email_rejects_other_kinds() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;
        sign_up_alice(&server).await;
        let session = sign_in_alice(&server).await;

        for token in ["garbage", session["tokens"]["accessToken"].as_str().unwrap_or_default()] {
            let response = server.get(&format!("/auth/verify-email?token={token}")).await;
            response.assert_status_bad_request();
            let body: Value = response.json();
            assert_eq!(body["code"], "BadRequest");
            assert_eq!(body["error"], "Invalid verification token");
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_confirm_email_again() -> anyhow::Result<()> {
        let (server, mailer) = create_test_server()?;
        sign_up_alice(&server).await;

        let response = server
            .post("/auth/confirm-email-again?email=alice@example.com")
            .await;
        response.assert_status_ok();
        assert_eq!(mailer.sent().await.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_status_requires_the_gate() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;
        sign_up_alice(&server).await;
        let session = sign_in_alice(&server).await;
        let access = session["tokens"]["accessToken"].as_str().unwrap_or_default();
        let refresh = session["tokens"]["refreshToken"].as_str().unwrap_or_default();

        // Missing header, malformed header shapes and wrong token kinds all
        // answer with the same envelope.
        let missing = server.get("/auth/status").await;
        let bare = server
            .get("/auth/status")
            .add_header("authorization", access)
            .await;
        let three_parts = server
            .get("/auth/status")
            .add_header("authorization", format!("Bearer {access} extra"))
            .await;
        let wrong_kind = server.get("/auth/status").authorization_bearer(refresh).await;

        for response in [missing, bare, three_parts, wrong_kind] {
            response.assert_status_unauthorized();
            let body: Value = response.json();
            assert_eq!(body["code"], "InvalidAccessToken");
            assert_eq!(body["error"], "The access token is invalid");
        }

        let ok = server.get("/auth/status").authorization_bearer(access).await;
        ok.assert_status_ok();
        Ok(())
    }

    #[tokio::test]
    async fn test_status_rejects_expired_and_unparseable_tokens() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;
        sign_up_alice(&server).await;
        let session = sign_in_alice(&server).await;
        let account_id = session["user"]["id"].as_i64().unwrap_or_default();

        // Signed with the real key but already past its expiry.
        let codec =
            TokenCodec::new(SigningKey::from_secret(&ServiceConfig::default().signing_key)?);
        let past = Timestamp::now().checked_sub(2.minutes())?;
        let expired = codec.encode(TokenClaims::Access {
            account_id,
            issued_at: Timestamp::from_second(past.as_second() - 60)?,
            expires_at: Timestamp::from_second(past.as_second())?,
        })?;

        for token in [expired.as_str(), "not-a-token"] {
            let response = server.get("/auth/status").authorization_bearer(token).await;
            response.assert_status_unauthorized();
            let body: Value = response.json();
            assert_eq!(body["code"], "InvalidAccessToken");
            assert_eq!(body["error"], "The access token is invalid");
        }
        Ok(())
    }
}
