use std::path::PathBuf;

/// Directory database files are resolved against (spec.md §6): the
/// `DATABASE_DIR` environment variable, or `.` if unset.
pub fn database_dir() -> PathBuf {
    std::env::var_os("DATABASE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Resolve a bare database name (e.g. `"shards"`) to its on-disk file path
/// under [`database_dir`].
pub fn database_path(db_name: &str) -> PathBuf {
    database_dir().join(format!("{db_name}.couch"))
}

/// Resolve the lost-and-found target path for `db_name`: a sibling
/// `lost+found` directory holding one recovered file per source database
/// (spec.md §4.6, §6).
pub fn lost_and_found_path(db_name: &str) -> PathBuf {
    database_dir()
        .join("lost+found")
        .join(format!("{db_name}.couch"))
}
