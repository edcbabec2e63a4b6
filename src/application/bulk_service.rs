// Bulk data service - one-shot generation for the bulk fetch endpoint
use crate::application::generator::{Clock, GeneratorError};
use crate::application::point_source::PointSource;
use crate::domain::metric::DataPoint;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountLimits {
    pub default_count: usize,
    pub max_count: usize,
}

impl Default for CountLimits {
    fn default() -> Self {
        Self {
            default_count: 1000,
            max_count: 100_000,
        }
    }
}

impl CountLimits {
    /// Resolve a raw `count` parameter. Missing, unparseable, non-finite or
    /// non-positive input falls back to the default; anything else is floored
    /// and clamped to `[1, max_count]`.
    pub fn normalize(&self, raw: Option<&str>) -> usize {
        let parsed = raw
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| s.parse::<f64>().ok());

        match parsed {
            Some(n) if n.is_finite() && n > 0.0 => (n.floor() as usize).clamp(1, self.max_count),
            _ => self.default_count,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkPayload {
    pub success: bool,
    pub data: Vec<DataPoint>,
    pub timestamp: i64,
    pub count: usize,
}

#[derive(Clone)]
pub struct BulkDataService {
    source: Arc<dyn PointSource>,
    clock: Arc<dyn Clock>,
    limits: CountLimits,
}

impl BulkDataService {
    pub fn new(source: Arc<dyn PointSource>, clock: Arc<dyn Clock>, limits: CountLimits) -> Self {
        Self {
            source,
            clock,
            limits,
        }
    }

    pub fn fetch(&self, raw_count: Option<&str>) -> Result<BulkPayload, GeneratorError> {
        let count = self.limits.normalize(raw_count);
        let data = self.source.generate(count)?;

        tracing::debug!("Bulk fetch generated {} points", data.len());
        Ok(BulkPayload {
            success: true,
            count: data.len(),
            data,
            timestamp: self.clock.now_ms(),
        })
    }
}
