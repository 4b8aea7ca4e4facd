use dotenvy::dotenv;
use lapak_cms_backend::config::{CloudinaryConfig, QuotaConfig};
use lapak_cms_backend::infrastructure::database;
use lapak_cms_backend::services::signer::UploadSigner;
use lapak_cms_backend::services::usage::CloudinaryUsageClient;
use lapak_cms_backend::services::worker::QuotaWorker;
use lapak_cms_backend::{AppState, create_app};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Initialize tracing with EnvFilter
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lapak_cms_backend=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🚀 Starting Lapak CMS Backend...");

    let db = database::setup_database().await?;

    // Missing Cloudinary credentials are fatal, not defaulted
    let cloudinary_config = CloudinaryConfig::from_env()?;
    let quota_config = QuotaConfig::from_env();
    info!(
        "☁️  Cloudinary: cloud={}, preset={}, capacity={} bytes",
        cloudinary_config.cloud_name,
        cloudinary_config.upload_preset.as_deref().unwrap_or("-"),
        quota_config.capacity_bytes
    );

    let usage_client = Arc::new(CloudinaryUsageClient::new(&cloudinary_config));
    let signer = Arc::new(UploadSigner::new(cloudinary_config));

    let state = AppState {
        db: db.clone(),
        signer,
        usage: usage_client.clone(),
        quota: quota_config,
    };

    // Setup Shutdown Channel
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    // Start periodic quota checks
    let worker = QuotaWorker::new(db.clone(), usage_client, quota_config, shutdown_rx);
    tokio::spawn(async move {
        worker.run().await;
    });

    let app = create_app(state)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(CorsLayer::permissive());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("✅ Server ready at http://{}", addr);
    info!("📖 Swagger UI: http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
        })
        .await?;

    info!("🛑 Server shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("⌨️  Ctrl+C received, starting graceful shutdown...");
        },
        _ = terminate => {
            info!("💤 SIGTERM received, starting graceful shutdown...");
        },
    }
}
