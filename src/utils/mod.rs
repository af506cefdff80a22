/// Prefix reserved for the main application unit
pub const MAIN_PREFIX: &str = "app";

/// Default settings file name, looked up in the working directory
pub const SETTINGS_FILE: &str = "migrations.json";

/// Extension of version journal files inside the store
pub const JOURNAL_EXTENSION: &str = "json";

/// Current journal schema version
pub const JOURNAL_SCHEMA_VERSION: u32 = 1;

/// Get current timestamp in ISO 8601 format
pub fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Build the key a version is stored under for a given unit prefix
pub fn prefixed_version(prefix: &str, version: &str) -> String {
    format!("{prefix}_{version}")
}
