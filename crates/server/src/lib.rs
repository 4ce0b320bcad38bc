use api_types::ErrorBody;
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;
use upstream::UpstreamError;

pub use server::{ServerState, router, run_with_listener, spawn_with_listener};
pub use service_auth::{ServiceClaims, ServiceTokens};

mod friends;
mod server;
mod service_auth;
mod sync;
mod transactions;
mod users;
mod views;

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Upstream(UpstreamError),
    Unauthorized,
    InvalidInput(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) | EngineError::AlreadySplit(_) => StatusCode::CONFLICT,
        EngineError::InvalidInput(_) | EngineError::InvalidAmount(_) | EngineError::InvalidId(_) => {
            StatusCode::BAD_REQUEST
        }
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Upstream(err) => {
                tracing::error!("upstream failure: {err}");
                (StatusCode::BAD_GATEWAY, format!("upstream failure: {err}"))
            }
            ServerError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ServerError::InvalidInput(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<UpstreamError> for ServerError {
    fn from(value: UpstreamError) -> Self {
        Self::Upstream(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflicts_map_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let res = ServerError::from(EngineError::AlreadySplit("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_400() {
        let res = ServerError::from(EngineError::InvalidAmount("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let res = ServerError::from(EngineError::InvalidInput("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn database_error_is_500_and_hidden() {
        let db_err = || sea_orm::DbErr::Custom("connection refused".to_string());
        assert_eq!(
            message_for_engine_error(EngineError::Database(db_err())),
            "internal server error"
        );
        let res = ServerError::from(EngineError::Database(db_err())).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn upstream_maps_to_502() {
        let res = ServerError::from(UpstreamError::Rejected).into_response();
        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn unauthorized_and_invalid_input() {
        assert_eq!(
            ServerError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ServerError::InvalidInput("bad".to_string())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
    }
}
