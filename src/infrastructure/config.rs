use crate::application::bulk_service::CountLimits;
use crate::application::stream_controller::StreamSettings;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub bulk: BulkConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StreamConfig {
    pub update_interval_ms: u64,
    pub points_per_update: usize,
    pub max_points: usize,
    pub preload_points: usize,
    pub burst_points: usize,
    pub display_window: usize,
    pub autostart: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: 100,
            points_per_update: 100,
            max_points: 10_000,
            preload_points: 1000,
            burst_points: 5000,
            display_window: 1000,
            autostart: false,
        }
    }
}

impl StreamConfig {
    pub fn settings(&self) -> StreamSettings {
        StreamSettings {
            update_interval: Duration::from_millis(self.update_interval_ms),
            points_per_update: self.points_per_update,
        }
    }
}

/// Cadence of the server-sent event stream, independent of the controller
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FeedConfig {
    pub interval_ms: u64,
    pub batch_size: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            interval_ms: 100,
            batch_size: 100,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BulkConfig {
    pub default_count: usize,
    pub max_count: usize,
}

impl Default for BulkConfig {
    fn default() -> Self {
        let limits = CountLimits::default();
        Self {
            default_count: limits.default_count,
            max_count: limits.max_count,
        }
    }
}

impl BulkConfig {
    pub fn limits(&self) -> CountLimits {
        let max_count = self.max_count.max(1);
        CountLimits {
            default_count: self.default_count.clamp(1, max_count),
            max_count,
        }
    }
}

/// Load `config/dashboard.*` (optional) overlaid with `DASHBOARD__SECTION__KEY` variables.
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
