use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "OsteoRecords";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// File name of the record store inside the data directory.
pub const DB_FILE_NAME: &str = "osteo_records.db";

/// Declared schema version. Bumping it wipes stores written with another
/// version (no record-level migration).
pub const SCHEMA_VERSION: i64 = 3;

/// Practitioner recorded on new visits unless changed.
pub const DEFAULT_OSTEOPATH: &str = "Dott. Marco Ferrari";

/// Pending change events kept per subscriber before they are coalesced.
pub const SUBSCRIPTION_BUFFER: usize = 64;

/// Default `tracing` filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "osteo_records=info,warn"
}

/// Get the application data directory.
/// ~/OsteoRecords/ on all platforms; the working directory when no home
/// directory can be determined.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default location of the record store.
pub fn default_db_path() -> PathBuf {
    app_data_dir().join(DB_FILE_NAME)
}

/// Where a [`crate::db::Store`] keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    File(PathBuf),
    /// Private in-memory database, lost on close.
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub location: StoreLocation,
    pub schema_version: i64,
}

impl StoreConfig {
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            location: StoreLocation::File(path.into()),
            schema_version: SCHEMA_VERSION,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            location: StoreLocation::Memory,
            schema_version: SCHEMA_VERSION,
        }
    }

    pub fn with_schema_version(mut self, version: i64) -> Self {
        self.schema_version = version;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::at_path(default_db_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_path_under_app_data() {
        let db = default_db_path();
        assert!(db.starts_with(app_data_dir()));
        assert!(db.ends_with(DB_FILE_NAME));
    }

    #[test]
    fn app_data_dir_named_after_app() {
        assert!(app_data_dir().ends_with(APP_NAME));
    }

    #[test]
    fn default_config_uses_current_schema() {
        let cfg = StoreConfig::default();
        assert_eq!(cfg.schema_version, SCHEMA_VERSION);
        assert_eq!(cfg.location, StoreLocation::File(default_db_path()));
    }

    #[test]
    fn schema_version_override() {
        let cfg = StoreConfig::in_memory().with_schema_version(99);
        assert_eq!(cfg.location, StoreLocation::Memory);
        assert_eq!(cfg.schema_version, 99);
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
