use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use callshield_api::config::ServerConfig;
use callshield_api::router::build_app_router;
use callshield_api::state::AppState;
use callshield_cloud::{StorageConfig, StorageProvider};
use callshield_core::lexicon::FraudLexicon;
use callshield_pipeline::{RecordingIntake, ScoringConfig};
use callshield_speech::{
    DetectorConfig, RawNetDetector, SpeechConfig, TranscriptionClient, VoiceScreener,
};
use callshield_telephony::{TelephonyClient, TelephonyConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "callshield_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = callshield_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    assert!(
        callshield_db::health_check(&pool).await,
        "Database health check failed"
    );
    tracing::info!("Database health check passed");

    callshield_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Telephony provider ---
    let telephony_config = TelephonyConfig::from_env().expect("Telephony configuration invalid");
    let provider =
        Arc::new(TelephonyClient::new(telephony_config).expect("Telephony client build failed"));

    // --- Recording storage ---
    let storage_config = StorageConfig::from_env().expect("Storage configuration invalid");
    let storage: Arc<dyn StorageProvider> = Arc::from(
        storage_config
            .build()
            .await
            .expect("Storage backend initialization failed"),
    );

    // --- Speech-to-text ---
    let speech_config = SpeechConfig::from_env().expect("Speech configuration invalid");
    let speech =
        Arc::new(TranscriptionClient::new(speech_config).expect("Speech client build failed"));

    // --- Synthetic-voice detector (optional) ---
    // Availability is decided once here; the pipeline takes the result
    // explicitly instead of re-probing per call.
    let detector: Option<Arc<dyn VoiceScreener>> = match DetectorConfig::from_env() {
        Ok(detector_config) => RawNetDetector::initialize(detector_config)
            .map(|d| Arc::new(d) as Arc<dyn VoiceScreener>),
        Err(e) => {
            tracing::info!(reason = %e, "Synthetic-voice screening disabled");
            None
        }
    };

    // --- Intake pipeline ---
    let intake = Arc::new(RecordingIntake::new(
        pool.clone(),
        provider,
        Arc::clone(&storage),
        speech,
        detector,
        FraudLexicon::builtin(),
        ScoringConfig::default(),
    ));

    // --- App state and router ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        intake,
        storage,
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
