pub mod frame_loop;
pub mod fusion_cycle;
pub mod input_listener;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::affect::alert::AlertDispatcher;
use crate::affect::windows::SignalWindows;
use crate::config::MonitorConfig;
use crate::services::camera::FrameSource;
use crate::services::classifier::EmotionClassifier;
use crate::services::detector::FaceLandmarkDetector;
use crate::services::input::InputEvent;
use crate::services::notifier::NotificationSink;
use crate::services::report::{ReportChannel, ReportSink};

/// Timeout for one fusion cycle invocation.
const CYCLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Drain period before scheduler shutdown to let in-flight tasks complete.
#[cfg(test)]
const DRAIN_TIMEOUT: Duration = Duration::from_millis(10);
#[cfg(not(test))]
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Wait for the frame thread to notice the stop flag before giving up.
const FRAME_JOIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Owns the monitor's background contexts: the blocking frame loop, the
/// input listener task and the scheduled fusion cycle.
pub struct MonitorManager {
    windows: Arc<SignalWindows>,
    reports: Arc<ReportChannel>,
    detector: Arc<dyn FaceLandmarkDetector>,
    classifier: Arc<dyn EmotionClassifier>,
    notifier: Arc<dyn NotificationSink>,
    report_sink: Arc<dyn ReportSink>,
    config: MonitorConfig,
    shutdown_rx: broadcast::Receiver<()>,
    input_tx: mpsc::UnboundedSender<InputEvent>,
    input_rx: mpsc::UnboundedReceiver<InputEvent>,
}

impl MonitorManager {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        windows: Arc<SignalWindows>,
        reports: Arc<ReportChannel>,
        detector: Arc<dyn FaceLandmarkDetector>,
        classifier: Arc<dyn EmotionClassifier>,
        notifier: Arc<dyn NotificationSink>,
        report_sink: Arc<dyn ReportSink>,
        shutdown_rx: broadcast::Receiver<()>,
        config: &MonitorConfig,
    ) -> Self {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        Self {
            windows,
            reports,
            detector,
            classifier,
            notifier,
            report_sink,
            config: config.clone(),
            shutdown_rx,
            input_tx,
            input_rx,
        }
    }

    /// Sender for OS hook adapters. Dropping every clone ends the input
    /// listener once its queue drains.
    pub fn input_sender(&self) -> mpsc::UnboundedSender<InputEvent> {
        self.input_tx.clone()
    }

    /// Start every context and block until shutdown is signalled. Returns
    /// an error only if the cycle scheduler cannot be created or started.
    pub async fn start(
        self,
        frame_source: Option<Box<dyn FrameSource>>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let Self {
            windows,
            reports,
            detector,
            classifier,
            notifier,
            report_sink,
            config,
            mut shutdown_rx,
            input_tx,
            input_rx,
        } = self;

        tokio::spawn(input_listener::run(
            input_rx,
            Arc::clone(&windows),
            shutdown_rx.resubscribe(),
        ));

        let stop = Arc::new(AtomicBool::new(false));
        let frame_handle = frame_source.map(|source| {
            let deps = frame_loop::FrameLoopDeps {
                windows: Arc::clone(&windows),
                detector: Arc::clone(&detector),
                classifier: Arc::clone(&classifier),
                sample_interval: Duration::from_secs(config.sample_interval_secs),
                stop: Arc::clone(&stop),
            };
            tokio::task::spawn_blocking(move || frame_loop::run(source, deps))
        });
        if frame_handle.is_none() {
            tracing::info!("No frame source configured; camera pipeline disabled");
        }

        let mut scheduler = JobScheduler::new().await?;
        let cycle_deps = Arc::new(fusion_cycle::CycleDeps {
            windows: Arc::clone(&windows),
            reports: Arc::clone(&reports),
            sink: report_sink,
            dispatcher: AlertDispatcher::new(notifier),
            alert_threshold: config.alert_threshold,
        });
        register_cycle(
            &scheduler,
            cycle_deps,
            Duration::from_secs(config.report_interval_secs),
        )
        .await;
        scheduler.start().await?;

        tracing::info!(
            camera = config.camera.as_str(),
            report_interval_secs = config.report_interval_secs,
            "Monitor manager started"
        );
        let _ = shutdown_rx.recv().await;

        tracing::info!(
            "Monitor manager shutting down, draining for {}ms",
            DRAIN_TIMEOUT.as_millis()
        );
        stop.store(true, Ordering::Relaxed);
        tokio::time::sleep(DRAIN_TIMEOUT).await;
        let _ = scheduler.shutdown().await;
        if let Some(handle) = frame_handle {
            let _ = tokio::time::timeout(FRAME_JOIN_TIMEOUT, handle).await;
        }
        // 关闭输入通道,未被 OS 钩子持有的 sender 到此全部释放
        drop(input_tx);
        Ok(())
    }
}

async fn register_cycle(
    scheduler: &JobScheduler,
    deps: Arc<fusion_cycle::CycleDeps>,
    interval: Duration,
) {
    add_repeated_job(scheduler, interval, "fusion_cycle", move || {
        let deps = Arc::clone(&deps);
        async move {
            fusion_cycle::run(&deps).await;
        }
    })
    .await;
    tracing::info!(
        interval_secs = interval.as_secs(),
        "Registered fusion cycle"
    );
}

/// Add a repeated job to the scheduler with an overlap guard and timeout
/// wrapper.
async fn add_repeated_job<Fut, F>(
    scheduler: &JobScheduler,
    interval: Duration,
    name: &'static str,
    mut run: F,
) where
    F: FnMut() -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let running = Arc::new(AtomicBool::new(false));

    let job = Job::new_repeated_async(interval, move |_uuid, _lock| {
        let guard = running.clone();

        if guard
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::warn!(
                worker = name,
                "Skipping invocation: previous run still in progress"
            );
            return Box::pin(async {});
        }

        let fut = run();
        Box::pin(async move {
            match tokio::time::timeout(CYCLE_TIMEOUT, fut).await {
                Ok(()) => {}
                Err(_) => {
                    tracing::error!(
                        worker = name,
                        timeout_secs = CYCLE_TIMEOUT.as_secs(),
                        "Worker timed out"
                    );
                }
            }
            guard.store(false, Ordering::SeqCst);
        })
    });

    match job {
        Ok(job) => {
            if let Err(err) = scheduler.add(job).await {
                tracing::error!(error = %err, worker = name, "Failed to add worker job");
            }
        }
        Err(err) => tracing::error!(error = %err, worker = name, "Failed to create worker job"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::Config;
    use crate::services::classifier::MockEmotionClassifier;
    use crate::services::detector::DisabledLandmarkDetector;
    use crate::services::notifier::ConsoleNotifier;
    use crate::services::report::LogReportSink;

    fn manager(shutdown_rx: broadcast::Receiver<()>) -> MonitorManager {
        let cfg = Config::from_env();
        MonitorManager::new(
            Arc::new(SignalWindows::new()),
            Arc::new(ReportChannel::default()),
            Arc::new(DisabledLandmarkDetector),
            Arc::new(MockEmotionClassifier::default()),
            Arc::new(ConsoleNotifier),
            Arc::new(LogReportSink),
            shutdown_rx,
            &cfg.monitor,
        )
    }

    #[tokio::test]
    async fn shutdown_path_is_non_panicking() {
        let (tx, _) = broadcast::channel(2);
        let handle = tokio::spawn(manager(tx.subscribe()).start(None));

        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(()).unwrap();
        handle.await.unwrap().expect("manager start should succeed");
    }

    #[tokio::test]
    async fn input_events_reach_the_windows_while_running() {
        let (tx, _) = broadcast::channel(2);
        let m = manager(tx.subscribe());
        let windows = Arc::clone(&m.windows);
        let sender = m.input_sender();
        let handle = tokio::spawn(m.start(None));

        sender.send(InputEvent::scroll()).unwrap();
        for _ in 0..200 {
            if windows.scroll.peek() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(windows.scroll.peek(), 1);

        tx.send(()).unwrap();
        handle.await.unwrap().expect("manager start should succeed");
    }

    #[tokio::test]
    async fn frame_thread_joins_on_shutdown() {
        use crate::services::camera::SyntheticFrameSource;

        let (tx, _) = broadcast::channel(2);
        let handle = tokio::spawn(
            manager(tx.subscribe()).start(Some(Box::new(SyntheticFrameSource::new()))),
        );

        tokio::time::sleep(Duration::from_millis(100)).await;
        tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("shutdown should not hang")
            .unwrap()
            .expect("manager start should succeed");
    }
}
