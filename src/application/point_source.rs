// Point source trait - the seam services generate data through
use crate::application::generator::{Clock, GeneratorError, PointGenerator};
use crate::domain::metric::DataPoint;
use parking_lot::Mutex;
use rand::RngCore;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;

pub trait PointSource: Send + Sync {
    /// Produce `count` fresh points, advancing the shared cursor and id counter
    fn generate(&self, count: usize) -> Result<Vec<DataPoint>, GeneratorError>;
}

/// One generator context shared by every consumer in the process, so ids never repeat
/// between the bulk endpoint, the live feed and the stream controller.
pub struct SharedGenerator<R> {
    inner: Mutex<PointGenerator<R>>,
}

impl<R: RngCore> SharedGenerator<R> {
    pub fn new(generator: PointGenerator<R>) -> Self {
        Self {
            inner: Mutex::new(generator),
        }
    }
}

impl SharedGenerator<StdRng> {
    pub fn from_os_rng(clock: Arc<dyn Clock>) -> Self {
        Self::new(PointGenerator::new(StdRng::from_os_rng(), clock))
    }
}

impl<R: RngCore + Send> PointSource for SharedGenerator<R> {
    fn generate(&self, count: usize) -> Result<Vec<DataPoint>, GeneratorError> {
        self.inner.lock().generate(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::generator::testing::ManualClock;
    use std::collections::HashSet;

    #[test]
    fn test_ids_unique_across_sharing_threads() {
        let source: Arc<dyn PointSource> = Arc::new(SharedGenerator::new(PointGenerator::new(
            StdRng::seed_from_u64(7),
            Arc::new(ManualClock::at(0)),
        )));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let source = source.clone();
                std::thread::spawn(move || {
                    (0..25)
                        .flat_map(|_| source.generate(10).unwrap())
                        .map(|p| p.id)
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(ids.insert(id));
            }
        }
        assert_eq!(ids.len(), 1000);
    }
}
