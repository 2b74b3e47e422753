use std::sync::Arc;

use anyhow::Context;
use pantry_api::{
    api::{create_router, AppState, WebSettings},
    auth::{google::GoogleSettings, GoogleIdentity, IdentityProvider, SessionSettings},
    config::Config,
    db::{self, Cache, PgUserStore},
    matching::{IngredientCorpus, SimilarityIndex},
    services::{
        providers::{RealFoodProvider, YouTubeProvider},
        RecipeService,
    },
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pantry_api=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // Static corpus, vectorized once and shared read-only
    let corpus = IngredientCorpus::from_csv_path(&config.corpus_path)?;
    let index = Arc::new(SimilarityIndex::build(corpus));

    let pool = db::create_pool(&config.database_url)
        .await
        .context("Failed to connect to Postgres")?;
    db::run_migrations(&pool).await?;

    let redis_client = db::create_redis_client(&config.redis_url)?;
    let (cache, cache_writer) = Cache::new(redis_client).await;

    let http_client = reqwest::Client::builder()
        .timeout(config.outbound_timeout())
        .build()?;

    let recipes = RecipeService::new(
        Arc::new(RealFoodProvider::new(
            http_client.clone(),
            config.recipe_api_url.clone(),
            config.recipe_site_url.clone(),
        )),
        Arc::new(YouTubeProvider::new(
            http_client.clone(),
            config.video_api_url.clone(),
            config.youtube_api_key.clone(),
        )),
        index,
        cache,
    );

    if config.youtube_api_key.is_none() {
        tracing::warn!("YOUTUBE_API_KEY not set, recipe videos will be unavailable");
    }

    let identity: Option<Arc<dyn IdentityProvider>> = match config.google_credentials() {
        Some((client_id, client_secret)) => Some(Arc::new(GoogleIdentity::new(
            http_client.clone(),
            GoogleSettings {
                client_id,
                client_secret,
                redirect_uri: config.oauth_redirect_uri.clone(),
                auth_url: config.google_auth_url.clone(),
                token_url: config.google_token_url.clone(),
                tokeninfo_url: config.google_tokeninfo_url.clone(),
            },
        ))),
        None => {
            tracing::warn!("Google OAuth credentials not set, sign-in is disabled");
            None
        }
    };

    let state = AppState::new(
        recipes,
        Arc::new(PgUserStore::new(pool)),
        identity,
        SessionSettings {
            key: config.session_key()?,
            secure: config.cookie_secure,
        },
        WebSettings {
            home_url: config.home_url.clone(),
            cors_origin: config
                .cors_origin
                .parse()
                .context("CORS_ORIGIN is not a valid header value")?,
        },
    );

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cache_writer.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
