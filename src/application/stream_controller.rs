// Stream controller - Idle/Running state machine driving periodic generation
//
// At most one ticker task exists per controller. Every transition that tears a
// ticker down cancels it and waits for the task to finish before new state is
// installed, so no tick from an old cadence can land after the transition.
use crate::application::generator::GeneratorError;
use crate::application::point_source::PointSource;
use crate::application::stream_buffer::StreamBuffer;
use crate::domain::metric::DataPoint;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error, PartialEq)]
pub enum ControllerError {
    #[error("update interval must be greater than zero")]
    InvalidInterval,
    #[error("generation failed: {0}")]
    Generation(#[from] GeneratorError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSettings {
    pub update_interval: Duration,
    pub points_per_update: usize,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            update_interval: Duration::from_millis(100),
            points_per_update: 100,
        }
    }
}

impl StreamSettings {
    fn validate(&self) -> Result<(), ControllerError> {
        if self.update_interval.is_zero() {
            return Err(ControllerError::InvalidInterval);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StreamStatus {
    pub running: bool,
    pub update_interval_ms: u64,
    pub points_per_update: usize,
    pub buffered: usize,
    pub capacity: usize,
    pub total_appended: u64,
    pub total_evicted: u64,
}

struct Ticker {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Ticker {
    async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            tracing::error!("Stream ticker terminated abnormally: {}", e);
        }
    }
}

enum State {
    Idle,
    Running(Ticker),
}

pub struct StreamController {
    source: Arc<dyn PointSource>,
    buffer: Arc<Mutex<StreamBuffer>>,
    settings: StreamSettings,
    state: State,
}

impl StreamController {
    pub fn new(
        source: Arc<dyn PointSource>,
        buffer: StreamBuffer,
        settings: StreamSettings,
    ) -> Result<Self, ControllerError> {
        settings.validate()?;
        Ok(Self {
            source,
            buffer: Arc::new(Mutex::new(buffer)),
            settings,
            state: State::Idle,
        })
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, State::Running(_))
    }

    pub fn settings(&self) -> StreamSettings {
        self.settings
    }

    /// Idle -> Running. Returns false (and does nothing) if already running.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }

        tracing::info!(
            "Starting stream: {} points every {:?}",
            self.settings.points_per_update,
            self.settings.update_interval
        );
        self.state = State::Running(self.spawn_ticker());
        true
    }

    /// Running -> Idle. Returns false if already idle.
    pub async fn pause(&mut self) -> bool {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Running(ticker) => {
                ticker.stop().await;
                tracing::info!("Stream paused");
                true
            }
            State::Idle => false,
        }
    }

    /// Empty the buffer. The running state is left alone.
    pub fn clear(&self) {
        self.buffer.lock().clear();
        tracing::info!("Stream buffer cleared");
    }

    pub fn append(&self, points: Vec<DataPoint>) {
        self.buffer.lock().append(points);
    }

    /// One-shot generation of `count` points outside the regular cadence.
    pub fn burst(&self, count: usize) -> Result<usize, ControllerError> {
        let points = self.source.generate(count)?;
        let generated = points.len();
        self.append(points);
        tracing::info!("Burst appended {} points", generated);
        Ok(generated)
    }

    pub async fn set_update_interval(&mut self, interval: Duration) -> Result<(), ControllerError> {
        self.reconfigure(StreamSettings {
            update_interval: interval,
            ..self.settings
        })
        .await
    }

    pub async fn set_points_per_update(&mut self, points: usize) -> Result<(), ControllerError> {
        self.reconfigure(StreamSettings {
            points_per_update: points,
            ..self.settings
        })
        .await
    }

    /// Apply new settings; a running stream is restarted at the new cadence.
    pub async fn reconfigure(&mut self, settings: StreamSettings) -> Result<(), ControllerError> {
        settings.validate()?;
        if settings == self.settings {
            return Ok(());
        }

        self.settings = settings;
        self.restart().await;
        Ok(())
    }

    async fn restart(&mut self) {
        if let State::Running(ticker) = std::mem::replace(&mut self.state, State::Idle) {
            ticker.stop().await;
            tracing::info!(
                "Restarting stream: {} points every {:?}",
                self.settings.points_per_update,
                self.settings.update_interval
            );
            self.state = State::Running(self.spawn_ticker());
        }
    }

    pub fn snapshot(&self) -> Vec<DataPoint> {
        self.buffer.lock().snapshot()
    }

    pub fn latest(&self, n: usize) -> Vec<DataPoint> {
        self.buffer.lock().latest(n)
    }

    pub fn status(&self) -> StreamStatus {
        let buffer = self.buffer.lock();
        StreamStatus {
            running: self.is_running(),
            update_interval_ms: self.settings.update_interval.as_millis() as u64,
            points_per_update: self.settings.points_per_update,
            buffered: buffer.len(),
            capacity: buffer.capacity(),
            total_appended: buffer.total_appended(),
            total_evicted: buffer.total_evicted(),
        }
    }

    fn spawn_ticker(&self) -> Ticker {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let source = self.source.clone();
        let buffer = self.buffer.clone();
        let StreamSettings {
            update_interval,
            points_per_update,
        } = self.settings;

        let handle = tokio::spawn(async move {
            // First tick one full interval after start
            let mut ticks = interval_at(Instant::now() + update_interval, update_interval);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticks.tick() => match source.generate(points_per_update) {
                        Ok(points) => {
                            let mut buffer = buffer.lock();
                            buffer.append(points);
                            tracing::debug!(
                                "Tick appended {} points ({} buffered)",
                                points_per_update,
                                buffer.len()
                            );
                        }
                        Err(e) => tracing::warn!("Skipping tick: {}", e),
                    },
                }
            }
        });

        Ticker { cancel, handle }
    }
}

impl Drop for StreamController {
    fn drop(&mut self) {
        if let State::Running(ticker) = &self.state {
            ticker.cancel.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::generator::PointGenerator;
    use crate::application::generator::testing::ManualClock;
    use crate::application::point_source::SharedGenerator;
    use crate::application::stream_buffer::MAX_POINTS;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tokio::time::sleep;

    fn source() -> Arc<dyn PointSource> {
        Arc::new(SharedGenerator::new(PointGenerator::new(
            StdRng::seed_from_u64(1),
            Arc::new(ManualClock::at(1_700_000_000_000)),
        )))
    }

    fn controller(interval_ms: u64, points: usize) -> StreamController {
        StreamController::new(
            source(),
            StreamBuffer::default(),
            StreamSettings {
                update_interval: Duration::from_millis(interval_ms),
                points_per_update: points,
            },
        )
        .unwrap()
    }

    struct FailingSource;

    impl PointSource for FailingSource {
        fn generate(&self, _count: usize) -> Result<Vec<DataPoint>, GeneratorError> {
            Err(GeneratorError::IdOverflow { next_id: u64::MAX })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_runs_one_timer() {
        let mut controller = controller(100, 10);
        assert!(controller.start());
        assert!(!controller.start());

        sleep(Duration::from_millis(1050)).await;
        assert_eq!(controller.status().buffered, 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_then_start_resumes_cadence() {
        let mut controller = controller(100, 10);
        controller.start();
        sleep(Duration::from_millis(350)).await;
        assert_eq!(controller.status().buffered, 30);

        assert!(controller.pause().await);
        assert!(!controller.pause().await);
        sleep(Duration::from_millis(1000)).await;
        assert_eq!(controller.status().buffered, 30);

        controller.start();
        sleep(Duration::from_millis(50)).await;
        assert_eq!(controller.status().buffered, 30);
        sleep(Duration::from_millis(200)).await;
        assert_eq!(controller.status().buffered, 50);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cadence_change_restarts_running_stream() {
        let mut controller = controller(100, 10);
        controller.start();
        sleep(Duration::from_millis(250)).await;
        assert_eq!(controller.status().buffered, 20);

        controller
            .set_update_interval(Duration::from_millis(50))
            .await
            .unwrap();
        assert!(controller.is_running());

        sleep(Duration::from_millis(120)).await;
        assert_eq!(controller.status().buffered, 40);

        controller.set_points_per_update(1).await.unwrap();
        assert!(controller.is_running());
        sleep(Duration::from_millis(110)).await;
        assert_eq!(controller.status().buffered, 42);
        assert_eq!(controller.status().update_interval_ms, 50);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconfigure_while_idle_stays_idle() {
        let mut controller = controller(100, 10);
        controller.set_points_per_update(25).await.unwrap();
        assert!(!controller.is_running());

        sleep(Duration::from_millis(500)).await;
        assert_eq!(controller.status().buffered, 0);

        controller.start();
        sleep(Duration::from_millis(150)).await;
        assert_eq!(controller.status().buffered, 25);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_rejected() {
        let mut controller = controller(100, 10);
        controller.start();

        let err = controller
            .set_update_interval(Duration::ZERO)
            .await
            .unwrap_err();
        assert_eq!(err, ControllerError::InvalidInterval);
        assert!(controller.is_running());
        assert_eq!(controller.settings().update_interval, Duration::from_millis(100));

        assert!(
            StreamController::new(
                source(),
                StreamBuffer::default(),
                StreamSettings {
                    update_interval: Duration::ZERO,
                    points_per_update: 1,
                },
            )
            .is_err()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_keeps_running() {
        let mut controller = controller(100, 10);
        controller.start();
        sleep(Duration::from_millis(150)).await;
        assert_eq!(controller.status().buffered, 10);

        controller.clear();
        assert_eq!(controller.status().buffered, 0);
        assert!(controller.is_running());

        sleep(Duration::from_millis(100)).await;
        assert_eq!(controller.status().buffered, 10);
    }

    #[tokio::test]
    async fn test_burst_trims_to_bound() {
        let controller = controller(100, 10);
        assert_eq!(controller.burst(10_005).unwrap(), 10_005);
        assert!(!controller.is_running());

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.len(), MAX_POINTS);
        // Generator ids start at zero
        assert_eq!(snapshot[0].id, 5);

        let status = controller.status();
        assert_eq!(status.total_evicted, 5);
        assert_eq!(status.capacity, MAX_POINTS);
    }

    #[tokio::test]
    async fn test_burst_failure_leaves_buffer_untouched() {
        let controller = StreamController::new(
            Arc::new(FailingSource),
            StreamBuffer::default(),
            StreamSettings::default(),
        )
        .unwrap();

        assert!(matches!(
            controller.burst(10),
            Err(ControllerError::Generation(_))
        ));
        assert_eq!(controller.status().buffered, 0);
    }
}
