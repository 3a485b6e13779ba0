use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// State directory holding the persisted library and session log,
    /// `$HOME/.local/state/quire` when HOME is set.
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("quire"),
            )
        } else {
            ProjectDirs::from("", "", "quire").map(|pd| pd.data_local_dir().to_path_buf())
        }
    }

    /// Config directory holding the reading preferences file.
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "quire").map(|pd| pd.config_dir().to_path_buf())
    }
}
