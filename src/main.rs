use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use voxrelay::application::ports::StagingStore;
use voxrelay::application::services::{
    RetentionSweeper, TranscriptionRelay, TranscriptionService, UploadReceiver,
};
use voxrelay::infrastructure::audio::OpenAiWhisperEngine;
use voxrelay::infrastructure::observability::init_tracing;
use voxrelay::infrastructure::storage::ObjectStagingStore;
use voxrelay::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment)?;

    init_tracing(&settings.logging, environment);

    let staging_store: Arc<dyn StagingStore> = Arc::new(ObjectStagingStore::local(
        PathBuf::from(&settings.upload.local_path),
    )?);

    let engine = Arc::new(OpenAiWhisperEngine::new(
        settings.transcription.api_key.clone(),
        Some(settings.transcription.base_url.clone()),
        Some(settings.transcription.model.clone()),
    ));

    let relay = TranscriptionRelay::new(
        engine,
        Arc::clone(&staging_store),
        settings.transcription.max_concurrent_requests,
    );

    let transcription_service = Arc::new(TranscriptionService::new(
        UploadReceiver::new(Arc::clone(&staging_store)),
        relay,
        Arc::clone(&staging_store),
        settings.upload.include_artifact_url,
    ));

    let sweeper = RetentionSweeper::new(
        Arc::clone(&staging_store),
        Duration::from_secs(settings.retention.max_age_secs),
    );
    tokio::spawn(sweeper.run(Duration::from_secs(
        settings.retention.sweep_interval_secs,
    )));

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    let state = AppState::new(transcription_service, settings);
    let router = create_router(state)?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
