use std::str::FromStr;

use tracing::metadata::LevelFilter;
use tracing_subscriber::{prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt, Layer};

/// Reads the `LOG_LEVEL` environment variable. Unset or blank means `info`;
/// an unrecognized value is reported on stderr and also means `info`.
pub fn level_from_env(value: Option<&str>) -> LevelFilter {
    match value.map(str::trim).filter(|level| !level.is_empty()) {
        None => LevelFilter::INFO,
        Some(level) => LevelFilter::from_str(level).unwrap_or_else(|e| {
            eprintln!("invalid LOG_LEVEL {:?} ({}), using info", level, e);
            LevelFilter::INFO
        }),
    }
}

pub fn init() {
    let level = level_from_env(std::env::var("LOG_LEVEL").ok().as_deref());

    tracing_subscriber::Registry::default()
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(false)
                .with_line_number(false)
                .compact()
                .with_ansi(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoUtc::rfc_3339())
                .with_filter(level),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_env() {
        assert_eq!(level_from_env(None), LevelFilter::INFO);
        assert_eq!(level_from_env(Some("")), LevelFilter::INFO);
        assert_eq!(level_from_env(Some("DEBUG")), LevelFilter::DEBUG);
        assert_eq!(level_from_env(Some(" warn ")), LevelFilter::WARN);
        assert_eq!(level_from_env(Some("trace")), LevelFilter::TRACE);
        assert_eq!(level_from_env(Some("error")), LevelFilter::ERROR);
        assert_eq!(level_from_env(Some("off")), LevelFilter::OFF);
    }

    #[test]
    fn test_unknown_level_falls_back_to_info() {
        assert_eq!(level_from_env(Some("verbose")), LevelFilter::INFO);
    }
}
