// Markwise platform paths
// Resolves where settings and the bookmark database live on each OS.
//
// Linux:   config ~/.config/markwise, data ~/.local/share/markwise (XDG aware)
// macOS:   ~/Library/Application Support/Markwise for both
// Windows: %APPDATA%/Markwise for both

use std::env;
use std::path::PathBuf;

/// Overrides the data directory (database location) when set.
pub const DATA_DIR_ENV: &str = "MARKWISE_DATA_DIR";

/// File name of the bookmark database inside the data directory.
pub const DATABASE_FILE: &str = "markwise.db";

#[cfg(not(target_os = "windows"))]
fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

#[cfg(target_os = "windows")]
fn app_data() -> PathBuf {
    PathBuf::from(
        env::var("APPDATA").unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Roaming")),
    )
    .join("Markwise")
}

/// Returns the platform-specific configuration directory for Markwise.
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        home_dir().join("Library").join("Application Support").join("Markwise")
    }
    #[cfg(target_os = "windows")]
    {
        app_data()
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        match env::var("XDG_CONFIG_HOME") {
            Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("markwise"),
            _ => home_dir().join(".config").join("markwise"),
        }
    }
}

/// Returns the platform-specific data directory for Markwise.
pub fn get_data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        home_dir().join("Library").join("Application Support").join("Markwise")
    }
    #[cfg(target_os = "windows")]
    {
        app_data()
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        match env::var("XDG_DATA_HOME") {
            Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("markwise"),
            _ => home_dir().join(".local").join("share").join("markwise"),
        }
    }
}

/// Path of the bookmark database, honoring [`DATA_DIR_ENV`].
pub fn get_database_path() -> PathBuf {
    match env::var(DATA_DIR_ENV) {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir).join(DATABASE_FILE),
        _ => get_data_dir().join(DATABASE_FILE),
    }
}
