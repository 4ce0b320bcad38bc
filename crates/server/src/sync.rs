//! Service-to-service user sync, called by the identity provider's auth hook.

use api_types::sync::{SyncUserRequest, SyncUserResponse};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use engine::{SyncUserCmd, UserMetadata};

use crate::{ServerError, server::ServerState};

pub async fn sync_user(
    State(state): State<ServerState>,
    headers: HeaderMap,
    payload: Result<Json<SyncUserRequest>, JsonRejection>,
) -> Result<Json<SyncUserResponse>, ServerError> {
    let Some(Authorization(bearer)) = headers.typed_get::<Authorization<Bearer>>() else {
        return Err(ServerError::Unauthorized);
    };
    if let Err(err) = state.tokens.verify(bearer.token()) {
        tracing::warn!("rejected sync token: {err}");
        return Err(ServerError::Unauthorized);
    }

    let Json(payload) = payload.map_err(|err| ServerError::InvalidInput(err.body_text()))?;
    let metadata = payload.metadata.unwrap_or_default();
    let cmd = SyncUserCmd {
        id: payload.id,
        email: payload.email,
        metadata: UserMetadata {
            full_name: metadata.full_name,
            name: metadata.name,
            avatar_url: metadata.avatar_url,
            provider: metadata.provider,
        },
    };

    let user = state.engine.sync_user(cmd).await?;
    Ok(Json(SyncUserResponse {
        success: true,
        user_id: user.id,
    }))
}
