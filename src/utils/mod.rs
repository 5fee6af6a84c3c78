//! Small helpers shared by the wallet and CLI modules.

use chrono::{DateTime, Utc};

/// Timestamp format used for wallet metadata and wallet file names.
///
/// Colons are replaced by dashes so the value can be embedded in a file name
/// on every platform.
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3fZ";

/// The current UTC time in [`TIME_FORMAT`].
pub fn now_time_string() -> String {
    format_time(&Utc::now())
}

pub fn format_time(time: &DateTime<Utc>) -> String {
    time.format(TIME_FORMAT).to_string()
}
