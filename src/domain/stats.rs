// Summary statistics over a buffer snapshot
use super::metric::{Category, DataPoint, ERROR_THRESHOLD, WARN_THRESHOLD};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Health {
    Healthy,
    Warning,
    Critical,
}

impl Health {
    /// Overall health is driven by the worst (largest) value seen.
    pub fn from_max(max: f64) -> Self {
        if max > ERROR_THRESHOLD {
            Health::Critical
        } else if max > WARN_THRESHOLD {
            Health::Warning
        } else {
            Health::Healthy
        }
    }
}

/// Mean value of one category's points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryMean {
    pub category: Category,
    pub avg: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BufferStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub median: f64,
    pub health: Health,
    /// Only categories present in the snapshot, in `Category::ALL` order
    pub by_category: Vec<CategoryMean>,
}

impl BufferStats {
    pub fn from_points(points: &[DataPoint]) -> Self {
        if points.is_empty() {
            return Self {
                count: 0,
                min: 0.0,
                max: 0.0,
                avg: 0.0,
                median: 0.0,
                health: Health::Healthy,
                by_category: Vec::new(),
            };
        }

        let mut values: Vec<f64> = points.iter().map(|p| p.value).collect();
        values.sort_by(f64::total_cmp);

        let count = values.len();
        let min = values[0];
        let max = values[count - 1];
        let avg = values.iter().sum::<f64>() / count as f64;
        // Upper median for even counts
        let median = values[count / 2];

        Self {
            count,
            min,
            max,
            avg,
            median,
            health: Health::from_max(max),
            by_category: category_means(points),
        }
    }
}

fn category_means(points: &[DataPoint]) -> Vec<CategoryMean> {
    let mut sums = [(0.0_f64, 0_usize); Category::ALL.len()];
    for point in points {
        let slot = &mut sums[point.category as usize];
        slot.0 += point.value;
        slot.1 += 1;
    }

    Category::ALL
        .iter()
        .zip(sums)
        .filter(|(_, (_, count))| *count > 0)
        .map(|(&category, (sum, count))| CategoryMean {
            category,
            avg: sum / count as f64,
            count,
        })
        .collect()
}
