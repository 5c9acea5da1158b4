use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use affect_monitor::affect::SignalWindows;
use affect_monitor::config::{CameraMode, Config};
use affect_monitor::logging::{init_tracing, LogConfig};
use affect_monitor::routes::build_router;
use affect_monitor::services::camera::{FrameSource, SyntheticFrameSource};
use affect_monitor::services::classifier::{self, RemoteEmotionClassifier};
use affect_monitor::services::detector;
use affect_monitor::services::notifier;
use affect_monitor::services::report::{LogReportSink, ReportChannel};
use affect_monitor::state::AppState;
use affect_monitor::workers::MonitorManager;
use axum::http::{header, HeaderName, HeaderValue};
use tokio::sync::broadcast;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

const CSP_HEADER: &str = "default-src 'none'; frame-ancestors 'none'; base-uri 'none'";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = Config::from_env();

    init_tracing(&LogConfig::from(&config));
    tracing::info!("Starting affect-monitor");

    // Validate classifier config at startup (panics if enabled=true, mock=false
    // and no endpoint is configured)
    RemoteEmotionClassifier::validate_config(&config.classifier);

    let windows = Arc::new(SignalWindows::new());
    let reports = Arc::new(ReportChannel::default());
    let classifier = classifier::from_config(&config.classifier);
    let detector = detector::from_camera_mode(config.monitor.camera);
    let notifier = notifier::from_config(&config.notifier);

    let (shutdown_tx, _) = broadcast::channel::<()>(8);

    let state = AppState::new(
        Arc::clone(&windows),
        Arc::clone(&reports),
        Arc::clone(&classifier),
        Arc::clone(&detector),
        &config,
        shutdown_tx.clone(),
    );

    let manager = MonitorManager::new(
        windows,
        reports,
        detector,
        classifier,
        notifier,
        Arc::new(LogReportSink),
        shutdown_tx.subscribe(),
        &config.monitor,
    );
    let frame_source: Option<Box<dyn FrameSource>> = match config.monitor.camera {
        CameraMode::Synthetic => Some(Box::new(SyntheticFrameSource::new())),
        CameraMode::Off => None,
    };
    let monitor_handle = tokio::spawn(async move {
        if let Err(e) = manager.start(frame_source).await {
            tracing::error!(error = %e, "Monitor manager failed");
        }
    });

    let cors_layer = build_cors_layer(&config);

    let app = build_router(state)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("content-security-policy"),
            HeaderValue::from_static(CSP_HEADER),
        ));

    let addr = SocketAddr::new(config.host, config.port);
    tracing::info!(%addr, "Listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");

    let server_future =
        axum::serve(listener, app).with_graceful_shutdown(shutdown_signal(shutdown_tx.clone()));

    if let Err(e) = server_future.await {
        tracing::error!(error = %e, "HTTP server crashed");
    }

    // 给监视器的排水阶段留出时间
    match tokio::time::timeout(Duration::from_secs(10), monitor_handle).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!(error = %e, "Monitor task panicked"),
        Err(_) => tracing::warn!("Monitor still draining at exit"),
    }
    tracing::info!("Shutdown complete");
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.cors_origin.trim() == "*" {
        // 通配符模式仅用于开发环境，通配符与 credentials 互斥
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_credentials(false)
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
            .allow_methods(Any);
    }

    match config.cors_origin.parse::<axum::http::HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
            .allow_methods(Any),
        Err(e) => {
            panic!(
                "FATAL: Invalid CORS_ORIGIN '{}': {}. \
                 Fix the CORS_ORIGIN environment variable.",
                config.cors_origin, e
            );
        }
    }
}

async fn shutdown_signal(shutdown_tx: broadcast::Sender<()>) {
    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = sigterm.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("Shutdown signal received");
    let _ = shutdown_tx.send(());
}
