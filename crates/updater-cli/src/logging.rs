use std::fmt;

use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(ClockTime)
        .with_writer(std::io::stderr)
        .init();
}

/// Wall-clock `HH:MM:SS` prefix for log lines.
struct ClockTime;

impl FormatTime for ClockTime {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", format_timestamp(OffsetDateTime::now_utc()))
    }
}

fn format_timestamp(timestamp: OffsetDateTime) -> String {
    match time::format_description::parse("[hour repr:24]:[minute]:[second]") {
        Ok(format) => timestamp
            .format(&format)
            .unwrap_or_else(|_| timestamp.unix_timestamp().to_string()),
        Err(_) => timestamp.unix_timestamp().to_string(),
    }
}
