use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use axum::Router;
use tokio::sync::broadcast;

use affect_monitor::affect::SignalWindows;
use affect_monitor::config::{CameraMode, ClassifierConfig, Config, MonitorConfig, NotifierConfig};
use affect_monitor::routes::build_router;
use affect_monitor::services::classifier::{EmotionClassifier, MockEmotionClassifier};
use affect_monitor::services::detector::{DisabledLandmarkDetector, FaceLandmarkDetector};
use affect_monitor::services::report::ReportChannel;
use affect_monitor::state::AppState;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub config: Config,
}

/// 直接构造 Config，避免使用 set_var 造成多线程测试环境变量竞态
pub fn test_config() -> Config {
    Config {
        host: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
        port: 3000,
        log_level: "info".to_string(),
        enable_file_logs: false,
        log_dir: "./logs".to_string(),
        cors_origin: "http://localhost:5173".to_string(),
        monitor: MonitorConfig {
            camera: CameraMode::Off,
            sample_interval_secs: 1,
            report_interval_secs: 30,
            alert_threshold: 5,
        },
        classifier: ClassifierConfig {
            enabled: false,
            mock: true,
            api_url: String::new(),
            api_key: String::new(),
            timeout_secs: 10,
        },
        notifier: NotifierConfig { command: None },
    }
}

pub async fn spawn_with_services(
    classifier: Arc<dyn EmotionClassifier>,
    detector: Arc<dyn FaceLandmarkDetector>,
) -> TestApp {
    let config = test_config();
    let (shutdown_tx, _) = broadcast::channel::<()>(8);

    let state = AppState::new(
        Arc::new(SignalWindows::new()),
        Arc::new(ReportChannel::default()),
        classifier,
        detector,
        &config,
        shutdown_tx,
    );

    let app = build_router(state.clone());

    TestApp { app, state, config }
}

pub async fn spawn_test_server() -> TestApp {
    spawn_with_services(
        Arc::new(MockEmotionClassifier::default()),
        Arc::new(DisabledLandmarkDetector),
    )
    .await
}
