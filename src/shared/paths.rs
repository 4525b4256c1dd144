use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "todo";

/// Get the base storage directory.
/// Returns `$TODO_DATA_DIR`, `$XDG_DATA_HOME/todo` or `~/.local/share/todo`, in that order.
pub fn get_storage_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TODO_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Ok(xdg_data) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg_data).join(APP_DIR_NAME);
    }

    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".local")
        .join("share")
        .join(APP_DIR_NAME)
}

/// Get the logs directory path.
/// Returns `{storage_dir}/logs`.
pub fn get_log_dir() -> PathBuf {
    get_storage_dir().join("logs")
}

/// Get the path of a named preferences file.
/// Returns `{storage_dir}/{name}.json`.
pub fn get_preferences_path(name: &str) -> PathBuf {
    get_storage_dir().join(format!("{}.json", name))
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_dir_structure() {
        let logs = get_log_dir();
        assert!(logs.ends_with("logs"));
        assert_eq!(logs.parent(), Some(get_storage_dir().as_path()));

        let prefs = get_preferences_path("tasks_prefs");
        assert!(prefs.ends_with("tasks_prefs.json"));
    }

    #[test]
    fn test_ensure_dir_creates_nested() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        // Second call is a no-op
        ensure_dir(&nested).unwrap();
    }
}
