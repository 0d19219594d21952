use std::{env, path::PathBuf};

use tauri::{path::BaseDirectory, AppHandle, Manager};

pub fn default_root_dir() -> Option<PathBuf> {
    if let Ok(root) = env::var("BRANDBAY_ROOT") {
        let path = PathBuf::from(root.trim());
        if !path.as_os_str().is_empty() {
            return Some(path);
        }
    }

    home::home_dir().map(|home| home.join(".brandbay"))
}

/// Resolves a bundled resource and returns it only if it exists on disk.
pub fn resolve_resource_path(app: &AppHandle, relative_path: &str) -> Option<PathBuf> {
    app.path()
        .resolve(relative_path, BaseDirectory::Resource)
        .ok()
        .filter(|path| path.is_file())
}
