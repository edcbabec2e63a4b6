// CSV serialisation of a buffer snapshot
use crate::domain::metric::DataPoint;
use chrono::{DateTime, SecondsFormat};
use std::fmt::Write;

pub const CSV_HEADER: &str = "Timestamp,Value,Category,Status,X,Y";

pub fn to_csv(points: &[DataPoint]) -> String {
    let mut out = String::with_capacity(CSV_HEADER.len() + points.len() * 64);
    out.push_str(CSV_HEADER);

    for point in points {
        // Writing to a String cannot fail
        let _ = write!(
            out,
            "\n{},{:.2},{},{},{:.2},{:.2}",
            format_timestamp(point.timestamp),
            point.value,
            point.category,
            point.status.as_str(),
            point.x,
            point.y
        );
    }

    out
}

/// RFC 3339 UTC with millisecond precision, e.g. `2024-01-01T00:00:00.000Z`
fn format_timestamp(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metric::Category;

    #[test]
    fn test_empty_is_header_only() {
        assert_eq!(to_csv(&[]), CSV_HEADER);
    }

    #[test]
    fn test_rows() {
        let points = vec![
            DataPoint::new(1_704_067_200_000, 112.346, 1.0, 99.999, Category::Cpu, 0),
            DataPoint::new(1_704_067_200_010, 50.0, 0.126, 3.0, Category::Database, 1),
        ];
        let csv = to_csv(&points);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "2024-01-01T00:00:00.000Z,112.35,CPU,warn,1.00,100.00");
        assert_eq!(lines[2], "2024-01-01T00:00:00.010Z,50.00,Database,ok,0.13,3.00");
    }
}
