//! Event formatters for smcli logs.
//!
//! JSON output uses the stock `tracing-subscriber` JSON layer; only the
//! human-readable formats are implemented here.

use std::fmt;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;

/// Crate prefix removed from event targets.
const TARGET_PREFIX: &str = "smcli::";

/// Default text formatter.
///
/// Output format: `YYYY-MM-DDTHH:MM:SS.mmmZ LEVEL module: message fields`
///
/// # Example Output
/// ```text
/// 2024-01-15T10:30:45.123Z INFO  wallet::wallet: created wallet from mnemonic accounts=1
/// 2024-01-15T10:30:46.004Z DEBUG wallet::hd: derived accounts count=1
/// ```
pub struct SmcliFormatter;

impl<S, N> FormatEvent<S, N> for SmcliFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let now = chrono::Utc::now();
        let meta = event.metadata();

        write!(
            writer,
            "{} {} {}: ",
            now.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            format_level(*meta.level()),
            short_target(meta.target())
        )?;

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Compact formatter for interactive use.
///
/// Output format: `level: message fields`, without timestamp or target.
///
/// # Example Output
/// ```text
/// info: wrote wallet file path=/home/user/.spacemesh/wallet_2024-01-15T10-30-45.123Z.json
/// ```
pub struct CompactFormatter;

impl<S, N> FormatEvent<S, N> for CompactFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let level = format_level(*event.metadata().level()).trim_end();
        write!(writer, "{}: ", level.to_ascii_lowercase())?;

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Format log level with fixed width for alignment
fn format_level(level: Level) -> &'static str {
    match level {
        Level::TRACE => "TRACE",
        Level::DEBUG => "DEBUG",
        Level::INFO => "INFO ",
        Level::WARN => "WARN ",
        Level::ERROR => "ERROR",
    }
}

fn short_target(target: &str) -> &str {
    target.strip_prefix(TARGET_PREFIX).unwrap_or(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_level() {
        assert_eq!(format_level(Level::TRACE), "TRACE");
        assert_eq!(format_level(Level::INFO), "INFO ");
        assert_eq!(format_level(Level::WARN), "WARN ");
        assert_eq!(format_level(Level::ERROR), "ERROR");
    }

    #[test]
    fn test_short_target() {
        assert_eq!(short_target("smcli::wallet::hd"), "wallet::hd");
        assert_eq!(short_target("smcli"), "smcli");
        assert_eq!(short_target("other::module"), "other::module");
    }
}
