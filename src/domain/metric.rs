// Metric domain model - categories, status thresholds and data points
use serde::Serialize;
use std::fmt;

/// Values strictly above this are `Status::Warn`.
pub const WARN_THRESHOLD: f64 = 110.0;
/// Values strictly above this are `Status::Error`.
pub const ERROR_THRESHOLD: f64 = 130.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    #[serde(rename = "CPU")]
    Cpu = 0,
    Memory = 1,
    Network = 2,
    Disk = 3,
    Database = 4,
}

/// Additive base value range for a category: `floor + U[0, span)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub floor: f64,
    pub span: f64,
}

// Indexed by `Category as usize`.
const BASE_RANGES: [ValueRange; 5] = [
    ValueRange { floor: 80.0, span: 40.0 },
    ValueRange { floor: 60.0, span: 60.0 },
    ValueRange { floor: 40.0, span: 80.0 },
    ValueRange { floor: 90.0, span: 30.0 },
    ValueRange { floor: 70.0, span: 50.0 },
];

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Cpu,
        Category::Memory,
        Category::Network,
        Category::Disk,
        Category::Database,
    ];

    pub fn base_range(self) -> ValueRange {
        BASE_RANGES[self as usize]
    }

    /// Pick a category from a unit sample in `[0, 1)`.
    pub fn from_unit(sample: f64) -> Self {
        let idx = (sample * Self::ALL.len() as f64).floor() as usize;
        Self::ALL[idx.min(Self::ALL.len() - 1)]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Cpu => "CPU",
            Category::Memory => "Memory",
            Category::Network => "Network",
            Category::Disk => "Disk",
            Category::Database => "Database",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Warn,
    Error,
}

impl Status {
    pub fn from_value(value: f64) -> Self {
        if value > ERROR_THRESHOLD {
            Status::Error
        } else if value > WARN_THRESHOLD {
            Status::Warn
        } else {
            Status::Ok
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Ok => "ok",
            Status::Warn => "warn",
            Status::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataPoint {
    pub timestamp: i64,
    pub value: f64,
    pub x: f64,
    pub y: f64,
    pub category: Category,
    pub status: Status,
    pub id: u64,
}

impl DataPoint {
    /// Build a point, deriving `status` from `value`.
    pub fn new(timestamp: i64, value: f64, x: f64, y: f64, category: Category, id: u64) -> Self {
        Self {
            timestamp,
            value,
            x,
            y,
            category,
            status: Status::from_value(value),
            id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_thresholds() {
        assert_eq!(Status::from_value(0.0), Status::Ok);
        assert_eq!(Status::from_value(110.0), Status::Ok);
        assert_eq!(Status::from_value(110.01), Status::Warn);
        assert_eq!(Status::from_value(130.0), Status::Warn);
        assert_eq!(Status::from_value(130.5), Status::Error);
    }

    #[test]
    fn test_base_ranges() {
        assert_eq!(Category::Cpu.base_range(), ValueRange { floor: 80.0, span: 40.0 });
        assert_eq!(Category::Memory.base_range(), ValueRange { floor: 60.0, span: 60.0 });
        assert_eq!(Category::Network.base_range(), ValueRange { floor: 40.0, span: 80.0 });
        assert_eq!(Category::Disk.base_range(), ValueRange { floor: 90.0, span: 30.0 });
        assert_eq!(Category::Database.base_range(), ValueRange { floor: 70.0, span: 50.0 });

        // Every range tops out at 120
        for category in Category::ALL {
            let range = category.base_range();
            assert_eq!(range.floor + range.span, 120.0);
        }
    }

    #[test]
    fn test_category_from_unit() {
        assert_eq!(Category::from_unit(0.0), Category::Cpu);
        assert_eq!(Category::from_unit(0.5), Category::Network);
        assert_eq!(Category::from_unit(0.99), Category::Database);
        assert_eq!(Category::from_unit(1.0), Category::Database);
    }

    #[test]
    fn test_point_json_shape() {
        let point = DataPoint::new(1_000, 120.0, 1.5, 2.5, Category::Cpu, 7);
        let json = serde_json::to_value(&point).unwrap();

        assert_eq!(json["timestamp"], 1_000);
        assert_eq!(json["category"], "CPU");
        assert_eq!(json["status"], "warn");
        assert_eq!(json["id"], 7);
        assert_eq!(json["value"], 120.0);
        assert_eq!((json["x"].as_f64(), json["y"].as_f64()), (Some(1.5), Some(2.5)));
    }
}
