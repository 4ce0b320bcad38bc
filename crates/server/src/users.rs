use api_types::user::MeResponse;
use axum::{Extension, Json};
use engine::User;

use crate::{ServerError, views::user_view};

pub async fn me(Extension(user): Extension<User>) -> Result<Json<MeResponse>, ServerError> {
    Ok(Json(MeResponse {
        user: user_view(&user),
    }))
}
