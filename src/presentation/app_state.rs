// Application state for HTTP handlers
use crate::application::bulk_service::{BulkDataService, CountLimits};
use crate::application::generator::Clock;
use crate::application::live_feed::LiveFeedService;
use crate::application::point_source::PointSource;
use crate::application::stream_buffer::StreamBuffer;
use crate::application::stream_controller::{ControllerError, StreamController};
use crate::infrastructure::config::DashboardConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub struct AppState {
    pub bulk_service: BulkDataService,
    pub live_feed: LiveFeedService,
    pub controller: Mutex<StreamController>,
    pub clock: Arc<dyn Clock>,
    pub burst_limits: CountLimits,
    pub display_window: usize,
}

impl AppState {
    /// Wire services around one shared point source. The controller buffer is
    /// preloaded and, if configured, the stream is started right away.
    pub fn new(
        config: &DashboardConfig,
        source: Arc<dyn PointSource>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ControllerError> {
        let bulk_limits = config.bulk.limits();
        let preload = match config.stream.preload_points {
            0 => Vec::new(),
            n => source.generate(n)?,
        };
        tracing::info!("Preloaded {} points", preload.len());

        let mut controller = StreamController::new(
            source.clone(),
            StreamBuffer::with_snapshot(config.stream.max_points, preload),
            config.stream.settings(),
        )?;
        if config.stream.autostart {
            controller.start();
        }

        Ok(Self {
            bulk_service: BulkDataService::new(source.clone(), clock.clone(), bulk_limits),
            live_feed: LiveFeedService::new(
                source,
                Duration::from_millis(config.feed.interval_ms),
                config.feed.batch_size,
            ),
            controller: Mutex::new(controller),
            clock,
            burst_limits: CountLimits {
                default_count: config.stream.burst_points.clamp(1, bulk_limits.max_count),
                max_count: bulk_limits.max_count,
            },
            display_window: config.stream.display_window,
        })
    }
}
