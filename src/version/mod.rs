//! Version identifiers for migrations.
//!
//! Identifiers are conventionally timestamps (`YYYYMMDDhhmmss`) taken from
//! the migration file name, but any alphanumeric identifier is accepted.

mod types;

pub use types::{Version, VersionError, VersionTarget};

use chrono::NaiveDateTime;

/// Render a version for humans.
///
/// Timestamp identifiers become `YYYY-MM-DD hh:mm:ss`; anything else is
/// returned verbatim.
pub fn format_version(version: &Version) -> String {
    match NaiveDateTime::parse_from_str(version.as_str(), "%Y%m%d%H%M%S") {
        Ok(datetime) => datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) => version.to_string(),
    }
}
