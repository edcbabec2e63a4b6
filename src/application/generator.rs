// Synthetic point generator - owns the timestamp cursor and id counter
use crate::domain::metric::{Category, DataPoint};
use rand::{Rng, RngCore};
use std::sync::Arc;
use thiserror::Error;

/// Spacing between consecutive points within one batch.
pub const TIMESTAMP_STEP_MS: i64 = 10;

const OSCILLATION_AMPLITUDE: f64 = 20.0;
const OSCILLATION_PERIOD_MS: f64 = 1000.0;
const NOISE_SPAN: f64 = 10.0;
const PLANE_EXTENT: f64 = 100.0;

/// Source of wall-clock time in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GeneratorError {
    #[error("timestamp overflow generating {count} points from cursor {cursor}")]
    TimestampOverflow { cursor: i64, count: usize },
    #[error("point id counter exhausted at {next_id}")]
    IdOverflow { next_id: u64 },
}

pub struct PointGenerator<R> {
    rng: R,
    clock: Arc<dyn Clock>,
    cursor: i64,
    next_id: u64,
}

impl<R: RngCore> PointGenerator<R> {
    pub fn new(rng: R, clock: Arc<dyn Clock>) -> Self {
        let cursor = clock.now_ms();
        Self {
            rng,
            clock,
            cursor,
            next_id: 0,
        }
    }

    /// Timestamp the next batch will start at.
    #[cfg(test)]
    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    #[cfg(test)]
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Generate `count` points spaced `TIMESTAMP_STEP_MS` apart starting at the cursor.
    ///
    /// Afterwards the cursor is re-anchored to `now + count * step`, not to the end of the
    /// synthetic sequence, so batch-to-batch spacing follows real elapsed time.
    /// A zero count leaves the cursor and id counter untouched.
    pub fn generate(&mut self, count: usize) -> Result<Vec<DataPoint>, GeneratorError> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let overflow = GeneratorError::TimestampOverflow {
            cursor: self.cursor,
            count,
        };
        let span = i64::try_from(count)
            .ok()
            .and_then(|n| n.checked_mul(TIMESTAMP_STEP_MS))
            .ok_or_else(|| overflow.clone())?;
        self.cursor
            .checked_add(span)
            .ok_or_else(|| overflow.clone())?;
        let next_id = self
            .next_id
            .checked_add(count as u64)
            .ok_or(GeneratorError::IdOverflow {
                next_id: self.next_id,
            })?;

        let base = self.cursor;
        let first_id = self.next_id;
        let mut points = Vec::with_capacity(count);
        for i in 0..count {
            let timestamp = base + i as i64 * TIMESTAMP_STEP_MS;
            points.push(self.point(timestamp, first_id + i as u64));
        }

        self.cursor = self
            .clock
            .now_ms()
            .checked_add(span)
            .ok_or(overflow)?;
        self.next_id = next_id;

        Ok(points)
    }

    fn point(&mut self, timestamp: i64, id: u64) -> DataPoint {
        let category = Category::from_unit(self.rng.random::<f64>());
        let range = category.base_range();
        let base_value = range.floor + self.rng.random::<f64>() * range.span;

        let oscillation = OSCILLATION_AMPLITUDE * (timestamp as f64 / OSCILLATION_PERIOD_MS).sin();
        let noise = (self.rng.random::<f64>() - 0.5) * NOISE_SPAN;
        let value = (base_value + oscillation + noise).max(0.0);

        let x = self.rng.random::<f64>() * PLANE_EXTENT;
        let y = self.rng.random::<f64>() * PLANE_EXTENT;

        DataPoint::new(timestamp, value, x, y, category, id)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Clock;
    use rand::RngCore;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Clock that only moves when told to.
    #[derive(Default)]
    pub struct ManualClock(AtomicI64);

    impl ManualClock {
        pub fn at(ms: i64) -> Self {
            Self(AtomicI64::new(ms))
        }

        pub fn set(&self, ms: i64) {
            self.0.store(ms, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_ms(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    /// Rng returning the same word forever. `0` samples as 0.0, `1 << 63` as 0.5.
    pub struct ConstRng(pub u64);

    impl RngCore for ConstRng {
        fn next_u32(&mut self) -> u32 {
            (self.0 >> 32) as u32
        }

        fn next_u64(&mut self) -> u64 {
            self.0
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            dst.fill(0);
        }
    }
}
