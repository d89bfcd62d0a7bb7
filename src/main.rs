use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use minicab_backend::auth::jwt::JwtService;
use minicab_backend::config::AppConfig;
use minicab_backend::db;
use minicab_backend::mailer::SmtpMailer;
use minicab_backend::routes;
use minicab_backend::s3::build_client;
use minicab_backend::state::AppState;
use minicab_backend::storage::{DocumentStorage, S3Storage, UrlMode};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    tracing::info!(
        database_url = %config.redacted_database_url(),
        pool_size = config.database_max_pool_size,
        server_host = %config.server_host,
        server_port = config.server_port,
        s3_bucket = %config.s3_bucket,
        public_bucket = config.s3_public_base_url.is_some(),
        smtp_host = %config.smtp_host,
        "loaded backend configuration"
    );

    let pool = db::init_pool_with_size(&config.database_url, config.database_max_pool_size)?;
    let s3_client = build_client(&config).await?;
    let url_mode = match &config.s3_public_base_url {
        Some(base) => UrlMode::PublicBase(base.clone()),
        None => UrlMode::Presigned,
    };
    let storage = DocumentStorage::new(
        Arc::new(S3Storage::new(s3_client, config.s3_bucket.clone())),
        url_mode,
    );
    let mailer = Arc::new(SmtpMailer::from_config(&config)?);
    let jwt = JwtService::from_config(&config)?;

    let listen_addr: SocketAddr =
        format!("{}:{}", config.server_host, config.server_port).parse()?;
    let state = AppState::new(pool, config, storage, mailer, jwt);
    let router = routes::create_router(state);

    let listener = TcpListener::bind(listen_addr).await?;
    tracing::info!("listening on {}", listen_addr);

    axum::serve(listener, router).await?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
