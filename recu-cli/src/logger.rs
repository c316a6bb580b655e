//! Logging Infrastructure
//!
//! Logs go to stderr (stdout may carry printer bytes), or to a daily
//! rolling file when a log directory is configured.

use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Initialize the logger
///
/// `RUST_LOG` wins over `log_level`. A bare level such as "debug" applies to
/// this binary and the printing library; anything else is used as a filter
/// directive.
pub fn init_logger(log_level: &str, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(log_level)));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.is_dir() {
            let file_appender = tracing_appender::rolling::daily(log_path, "recu.log");
            subscriber.with_ansi(false).with_writer(file_appender).init();
            return;
        }
    }

    subscriber.with_writer(std::io::stderr).init();
}

fn filter_directive(log_level: &str) -> String {
    let level = log_level.trim();
    match level.to_ascii_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" | "off" => {
            format!("recu={0},recu_printer={0}", level.to_ascii_lowercase())
        }
        "" => "recu=info,recu_printer=info".to_string(),
        _ => level.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_directive("DEBUG"), "recu=debug,recu_printer=debug");
        assert_eq!(filter_directive(""), "recu=info,recu_printer=info");
        assert_eq!(filter_directive("recu_printer=trace"), "recu_printer=trace");
    }
}
