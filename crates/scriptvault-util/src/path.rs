//! Platform paths.

use std::path::PathBuf;

const APP_DIR: &str = "scriptvault";

/// Get the scriptvault configuration directory.
///
/// On Unix an existing `~/.config/scriptvault` wins over the platform
/// directory, so macOS users get the same layout as Linux users.
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(unix)]
    {
        if let Some(home) = dirs::home_dir() {
            let xdg = home.join(".config").join(APP_DIR);
            if xdg.exists() {
                return Some(xdg);
            }
        }
    }

    dirs::config_dir().map(|p| p.join(APP_DIR))
}

/// Get the scriptvault data directory.
///
/// This follows XDG conventions:
/// - `$XDG_DATA_HOME/scriptvault` if set
/// - `~/.local/share/scriptvault` otherwise
pub fn data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|p| p.join(APP_DIR))
}

/// Default base directory for persisted snapshot logs.
pub fn default_store_dir() -> Option<PathBuf> {
    data_dir().map(|p| p.join("data"))
}
