use std::sync::Arc;

use actix_web::{web, HttpServer};
use tracing::{info, warn};

use blog_api::app::create_app;
use blog_api::routes::auth::AppState;
use blog_core::repositories::{
    CredentialStore, InMemoryCredentialStore, InMemoryUserDirectory, UserIdSequence,
};
use blog_core::services::{SessionConfig, SessionManager};
use blog_infra::cache::RedisCredentialStore;
use blog_shared::{AppConfig, CacheType};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = blog_api::config::load()?;
    blog_api::config::init_tracing(&config.logging)?;

    info!("Starting blog API server in {} mode", config.environment);

    let session_config = SessionConfig::from_app_config(&config)?;

    match config.cache.backend {
        CacheType::Redis => {
            let store = RedisCredentialStore::connect(config.cache.clone()).await?;
            let ids = Arc::new(store.clone());
            serve(config, store, ids, session_config).await
        }
        CacheType::Memory => {
            warn!(
                "Using the in-memory credential store: sessions are lost on restart \
                 and not shared between instances"
            );
            let store = Arc::new(InMemoryCredentialStore::new());
            serve(config, store.clone(), store, session_config).await
        }
    }
}

async fn serve<S>(
    config: AppConfig,
    store: S,
    ids: Arc<dyn UserIdSequence>,
    session_config: SessionConfig,
) -> anyhow::Result<()>
where
    S: CredentialStore + 'static,
{
    let sessions = Arc::new(SessionManager::new(store, session_config)?);
    // Accounts live in memory; the relational user store is a separate component.
    // Ids come from the credential store so tokens never outlive their account's id.
    let users = Arc::new(InMemoryUserDirectory::new(ids));
    let state = web::Data::new(AppState::new(sessions, users, config.auth.cookie.clone()));

    let bind_address = config.server.bind_address();
    info!("Server will bind to: {}", bind_address);

    let mut server = HttpServer::new(move || create_app(state.clone()));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(&bind_address)?.run().await?;
    Ok(())
}
