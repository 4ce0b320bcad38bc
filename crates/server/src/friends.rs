//! Friends API endpoint

use api_types::friend::{FriendView, FriendsResponse};
use axum::{Extension, Json, extract::State};
use engine::User;

use crate::{
    ServerError,
    server::ServerState,
    views::{friend_view, mirror_friend_view},
};

/// Local friends ordered by name, followed by the mirror's friends when the
/// server is configured to include them.
pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<FriendsResponse>, ServerError> {
    let mut friends: Vec<FriendView> = state
        .engine
        .friends(&user.id)
        .await?
        .into_iter()
        .map(friend_view)
        .collect();

    if state.friends_from_mirror
        && let Some(mirror) = &state.mirror
    {
        match mirror.friends().await {
            Ok(remote) => friends.extend(remote.into_iter().map(mirror_friend_view)),
            Err(err) => tracing::warn!("failed to fetch mirror friends: {err}"),
        }
    }

    Ok(Json(FriendsResponse { friends }))
}
