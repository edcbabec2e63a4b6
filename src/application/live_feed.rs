// Live feed service - per-subscriber periodic batches for the streaming endpoint
use crate::application::point_source::PointSource;
use crate::domain::metric::DataPoint;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

const CHANNEL_CAPACITY: usize = 16;

#[derive(Clone)]
pub struct LiveFeedService {
    source: Arc<dyn PointSource>,
    interval: Duration,
    batch_size: usize,
}

impl LiveFeedService {
    pub fn new(source: Arc<dyn PointSource>, interval: Duration, batch_size: usize) -> Self {
        Self {
            source,
            interval: interval.max(Duration::from_millis(1)),
            batch_size,
        }
    }

    /// Spawn a feed task for one subscriber. The first batch is sent immediately,
    /// then one per interval. The task and its timer end once the receiver is dropped.
    pub fn subscribe(&self) -> mpsc::Receiver<Vec<DataPoint>> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let source = self.source.clone();
        let interval = self.interval;
        let batch_size = self.batch_size;

        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(interval);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            tracing::debug!("Live feed subscriber connected");

            loop {
                tokio::select! {
                    _ = tx.closed() => break,
                    _ = ticks.tick() => match source.generate(batch_size) {
                        Ok(points) => {
                            if tx.send(points).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => tracing::warn!("Live feed generation failed: {}", e),
                    },
                }
            }

            tracing::debug!("Live feed subscriber disconnected");
        });

        rx
    }
}
