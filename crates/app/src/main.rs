use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use server::{ServerState, ServiceTokens};
use settings::Database;
use upstream::{ExpenseMirror, SplitwiseClient, SupabaseAuth};

mod settings;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "splitease={level},server={level},engine={level},upstream={level},tower_http={level}",
            level = settings.app.level
        ))
        .init();

    let server = settings.server;
    let db = parse_database(&server.database).await.inspect_err(|err| {
        tracing::error!("failed to initialize database: {err}");
    })?;
    let engine = engine::Engine::builder()
        .database(db)
        .build()
        .await
        .inspect_err(|err| tracing::error!("failed to build engine from database: {err}"))?;

    let identity = SupabaseAuth::new(&settings.identity.url, settings.identity.anon_key)?;
    let mirror: Option<Arc<dyn ExpenseMirror>> = match settings.mirror {
        Some(mirror) => {
            tracing::info!("Found mirror settings...");
            Some(Arc::new(SplitwiseClient::new(
                &mirror.base_url,
                mirror.api_key,
                mirror.group_id,
                mirror.currency_code,
            )?))
        }
        None => None,
    };
    if server.friends_from_mirror && mirror.is_none() {
        tracing::warn!("friends_from_mirror is set but no mirror is configured");
    }

    let state = ServerState {
        engine: Arc::new(engine),
        identity: Arc::new(identity),
        mirror,
        tokens: Arc::new(ServiceTokens::new(&settings.sync.secret)),
        friends_from_mirror: server.friends_from_mirror,
    };

    let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, server.port);
    let listener = tokio::net::TcpListener::bind(addr).await.inspect_err(|err| {
        tracing::error!("failed to bind server listener: {err}");
    })?;
    server::run_with_listener(state, listener).await?;

    Ok(())
}

async fn parse_database(config: &Database) -> Result<sea_orm::DatabaseConnection, BoxError> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
