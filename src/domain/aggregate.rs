// Time-bucketed aggregation of data points
use super::metric::{Category, DataPoint, Status};
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Period {
    #[default]
    #[serde(rename = "raw")]
    Raw,
    #[serde(rename = "1min")]
    OneMinute,
    #[serde(rename = "5min")]
    FiveMinutes,
    #[serde(rename = "1hr")]
    OneHour,
}

impl Period {
    /// Bucket width in milliseconds, `None` for raw.
    pub fn width_ms(self) -> Option<i64> {
        match self {
            Period::Raw => None,
            Period::OneMinute => Some(60_000),
            Period::FiveMinutes => Some(300_000),
            Period::OneHour => Some(3_600_000),
        }
    }

    /// Lenient parse; anything unrecognised falls back to raw.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "raw" => Ok(Period::Raw),
            "1min" | "1m" => Ok(Period::OneMinute),
            "5min" | "5m" => Ok(Period::FiveMinutes),
            "1hr" | "1h" => Ok(Period::OneHour),
            other => Err(format!("unknown aggregation period: {}", other)),
        }
    }
}

/// Summary of one bucket. `x`/`y` are copied from the first member.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedPoint {
    pub timestamp: i64,
    pub value: f64,
    pub x: f64,
    pub y: f64,
    pub category: Category,
    pub status: Status,
    pub count: usize,
    pub min: f64,
    pub max: f64,
}

/// Result of `aggregate`: either the input untouched or bucket summaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AggregatedView {
    Raw(Vec<DataPoint>),
    Buckets(Vec<AggregatedPoint>),
}

impl AggregatedView {
    pub fn len(&self) -> usize {
        match self {
            AggregatedView::Raw(points) => points.len(),
            AggregatedView::Buckets(points) => points.len(),
        }
    }

    /// Keep only the most recent `n` entries.
    pub fn tail(self, n: usize) -> Self {
        match self {
            AggregatedView::Raw(mut points) => {
                let skip = points.len().saturating_sub(n);
                points.drain(..skip);
                AggregatedView::Raw(points)
            }
            AggregatedView::Buckets(mut points) => {
                let skip = points.len().saturating_sub(n);
                points.drain(..skip);
                AggregatedView::Buckets(points)
            }
        }
    }
}

struct Bucket {
    sum: f64,
    count: usize,
    min: f64,
    max: f64,
    x: f64,
    y: f64,
    // Category tallies in first-seen order
    tallies: Vec<(Category, usize)>,
}

impl Bucket {
    fn new(first: &DataPoint) -> Self {
        Self {
            sum: 0.0,
            count: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            x: first.x,
            y: first.y,
            tallies: Vec::with_capacity(Category::ALL.len()),
        }
    }

    fn push(&mut self, point: &DataPoint) {
        self.sum += point.value;
        self.count += 1;
        self.min = self.min.min(point.value);
        self.max = self.max.max(point.value);

        match self.tallies.iter_mut().find(|(c, _)| *c == point.category) {
            Some((_, n)) => *n += 1,
            None => self.tallies.push((point.category, 1)),
        }
    }

    /// First category (in insertion order) holding the maximum count.
    fn plurality(&self) -> Category {
        let mut best = self.tallies[0];
        for &(category, n) in &self.tallies[1..] {
            if n > best.1 {
                best = (category, n);
            }
        }
        best.0
    }

    fn finish(self, timestamp: i64) -> AggregatedPoint {
        let value = self.sum / self.count as f64;
        AggregatedPoint {
            timestamp,
            value,
            x: self.x,
            y: self.y,
            category: self.plurality(),
            status: Status::from_value(value),
            count: self.count,
            min: self.min,
            max: self.max,
        }
    }
}

/// Epoch-aligned bucket start for `timestamp`.
pub fn bucket_key(timestamp: i64, width_ms: i64) -> i64 {
    timestamp.div_euclid(width_ms) * width_ms
}

/// Bucket `points` into fixed-width windows. Output is ascending by bucket start.
pub fn aggregate(points: Vec<DataPoint>, period: Period) -> AggregatedView {
    let width = match period.width_ms() {
        Some(width) if !points.is_empty() => width,
        _ => return AggregatedView::Raw(points),
    };

    let mut buckets: BTreeMap<i64, Bucket> = BTreeMap::new();
    for point in &points {
        buckets
            .entry(bucket_key(point.timestamp, width))
            .or_insert_with(|| Bucket::new(point))
            .push(point);
    }

    AggregatedView::Buckets(
        buckets
            .into_iter()
            .map(|(timestamp, bucket)| bucket.finish(timestamp))
            .collect(),
    )
}
