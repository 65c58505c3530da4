use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use qrpass_backend::{
    app::build_app,
    config::Config,
    db::connection::create_pool,
    repositories::admin as admin_repo,
    state::AppState,
    utils::password::hash_password,
};

fn mask_secret(s: &str) -> String {
    if s.is_empty() {
        return "<empty>".into();
    }
    let prefix = s.chars().take(4).collect::<String>();
    format!("{}*** (len={})", prefix, s.len())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qrpass_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load()?;
    tracing::info!(
        database_url = %config.database_url,
        port = config.port,
        session_secret = %mask_secret(&config.session_secret),
        qr_token_secret = %mask_secret(&config.qr_token_secret),
        session_expiration_hours = config.session_expiration_hours,
        qr_token_expiration_days = config.qr_token_expiration_days,
        public_base_url = %config.public_base_url,
        "Loaded configuration from environment/.env"
    );

    // Initialize database
    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    // Seed the default admin account on first run
    let admin_hash = hash_password(&config.default_admin_password)?;
    let seeded =
        admin_repo::ensure_admin(&pool, &config.default_admin_username, &admin_hash).await?;
    if seeded {
        tracing::info!(
            username = %config.default_admin_username,
            "Created default admin account"
        );
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::new(pool, config);
    let app = build_app(state);

    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    // Connect info feeds the per-IP login rate limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
