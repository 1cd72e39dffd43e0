//! Completion summary for finished queries.

use crate::athena::QueryExecution;

const BINARY_UNITS: [&str; 8] = ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei", "Zi"];

/// Formats a byte count with binary (1024-based) unit prefixes.
///
/// `1024` becomes `1.0KiB`, `1048576` becomes `1.0MiB`.
pub fn format_bytes(bytes: u64) -> String {
    let mut num = bytes as f64;
    for unit in BINARY_UNITS {
        if num.abs() < 1024.0 {
            return format!("{num:3.1}{unit}B");
        }
        num /= 1024.0;
    }
    format!("{num:.1}YiB")
}

/// One-line summary of a successful execution.
///
/// `None` if the service reported no statistics.
pub fn summary_line(execution: &QueryExecution) -> Option<String> {
    let stats = execution.statistics?;
    let total_secs = stats.total_execution_time.as_secs_f64();
    let queue_secs = stats.queue_time.as_secs_f64().round_ties_even();

    Some(format!(
        "Query {} completed in {:.1}s ({:.1}s queued). Scanned {}",
        execution.handle,
        total_secs,
        queue_secs,
        format_bytes(stats.data_scanned_bytes)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::athena::{QueryHandle, QueryState, QueryStatistics, QueryStatus};
    use std::time::Duration;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0.0B");
        assert_eq!(format_bytes(1023), "1023.0B");
        assert_eq!(format_bytes(1024), "1.0KiB");
        assert_eq!(format_bytes(1536), "1.5KiB");
        assert_eq!(format_bytes(1_048_576), "1.0MiB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5.0GiB");
    }

    #[test]
    fn test_format_bytes_largest_unit() {
        assert_eq!(format_bytes(u64::MAX), "16.0EiB");
    }

    #[test]
    fn test_summary_line() {
        let execution = QueryExecution::new(
            QueryHandle::new("q-42"),
            QueryStatus::new(QueryState::Succeeded),
        )
        .with_statistics(QueryStatistics {
            total_execution_time: Duration::from_millis(2350),
            queue_time: Duration::from_millis(1600),
            data_scanned_bytes: 3 * 1024 * 1024,
        });

        assert_eq!(
            summary_line(&execution).unwrap(),
            "Query q-42 completed in 2.4s (2.0s queued). Scanned 3.0MiB"
        );
    }

    #[test]
    fn test_summary_line_queue_time_rounds_half_to_even() {
        let summary = |queue_millis| {
            let execution = QueryExecution::new(
                QueryHandle::new("q-44"),
                QueryStatus::new(QueryState::Succeeded),
            )
            .with_statistics(QueryStatistics {
                total_execution_time: Duration::from_secs(10),
                queue_time: Duration::from_millis(queue_millis),
                data_scanned_bytes: 0,
            });
            summary_line(&execution).unwrap()
        };

        assert!(summary(2500).contains("(2.0s queued)"));
        assert!(summary(3500).contains("(4.0s queued)"));
        assert!(summary(2600).contains("(3.0s queued)"));
    }

    #[test]
    fn test_summary_line_without_statistics() {
        let execution = QueryExecution::new(
            QueryHandle::new("q-43"),
            QueryStatus::new(QueryState::Succeeded),
        );
        assert_eq!(summary_line(&execution), None);
    }
}
