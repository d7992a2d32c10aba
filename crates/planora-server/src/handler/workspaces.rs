//! Workspace invite handlers.
//!
//! Invites are stateless: the token itself carries the workspace id, so
//! issuing one writes nothing and redeeming one only proves the bearer
//! holds a valid invite.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::extract::{AuthSubject, ValidateJson};
use crate::handler::Result;
use crate::service::{ServiceState, SessionService};

/// Response carrying a freshly issued invite token.
#[must_use]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InviteResponse {
    /// The invite token to share.
    pub invite_token: String,
}

/// Request payload for joining a workspace by invite.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct JoinWorkspaceRequest {
    /// The invite token received from a workspace member.
    #[validate(length(min = 1))]
    pub invite_token: String,
}

/// Response returned after redeeming an invite.
#[must_use]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JoinWorkspaceResponse {
    /// The workspace the invite grants access to.
    pub workspace_id: i64,
}

/// Issues an invite token for the workspace.
async fn create_invite(
    _subject: AuthSubject,
    State(session): State<SessionService>,
    Path(workspace_id): Path<i64>,
) -> Result<Json<InviteResponse>> {
    let invite_token = session.issue_invite(workspace_id)?;
    Ok(Json(InviteResponse { invite_token }))
}

/// Redeems an invite token for its workspace id.
async fn join_workspace(
    _subject: AuthSubject,
    State(session): State<SessionService>,
    ValidateJson(request): ValidateJson<JoinWorkspaceRequest>,
) -> Result<Json<JoinWorkspaceResponse>> {
    let workspace_id = session.workspace_from_invite(&request.invite_token)?;
    Ok(Json(JoinWorkspaceResponse { workspace_id }))
}

/// Returns a [`Router`] with the identity-gated workspace routes.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/workspace/{workspace_id}/invite", get(create_invite))
        .route("/workspace/join", post(join_workspace))
}
