use axum::{
    Router,
    extract::{Request, State},
    http::{Method, header},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use std::sync::Arc;

use crate::{ServerError, ServiceTokens, friends, sync, transactions, users};
use engine::Engine;
use upstream::{ExpenseMirror, IdentityProvider, UpstreamError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub identity: Arc<dyn IdentityProvider>,
    /// Expense mirror, when one is configured.
    pub mirror: Option<Arc<dyn ExpenseMirror>>,
    pub tokens: Arc<ServiceTokens>,
    /// Append the mirror's friends to `GET /api/friends`.
    pub friends_from_mirror: bool,
}

/// Resolves the bearer credential to a local user and stores it as a
/// request extension.
async fn auth(
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(Authorization(bearer)) = request.headers().typed_get::<Authorization<Bearer>>()
    else {
        return Err(ServerError::Unauthorized);
    };

    let identity = match state.identity.resolve(bearer.token()).await {
        Ok(identity) => identity,
        Err(UpstreamError::Rejected) => return Err(ServerError::Unauthorized),
        Err(err) => return Err(ServerError::Upstream(err)),
    };
    let Some(email) = identity.email else {
        tracing::warn!("identity {} has no email", identity.subject);
        return Err(ServerError::Unauthorized);
    };

    let user = state.engine.user_by_email(&email).await?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

async fn health() -> &'static str {
    "ok"
}

pub fn router(state: ServerState) -> Router {
    let authenticated = Router::new()
        .route("/api/friends", get(friends::list))
        .route("/api/transactions", get(transactions::list))
        .route("/api/transactions/split", post(transactions::split))
        .route("/api/users/me", get(users::me))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .merge(authenticated)
        .route("/api/auth/sync-user", post(sync::sync_user))
        .route("/health", get(health))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(state, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
