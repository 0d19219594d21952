use std::{
    env, fs,
    fs::OpenOptions,
    io::{self, Write},
    path::{Path, PathBuf},
};

use crate::{runtime_paths, DESKTOP_LOG_FILE};

const MAX_LOG_BYTES: u64 = 5 * 1024 * 1024;

pub fn resolve_desktop_log_path(root_dir: Option<PathBuf>, file_name: &str) -> PathBuf {
    match root_dir {
        Some(root) => root.join("logs").join(file_name),
        None => env::temp_dir().join("brandbay").join(file_name),
    }
}

fn rotated_path(path: &Path) -> PathBuf {
    let mut rotated = path.as_os_str().to_owned();
    rotated.push(".1");
    PathBuf::from(rotated)
}

fn rotate_if_needed(path: &Path, max_bytes: u64) -> io::Result<()> {
    match fs::metadata(path) {
        Ok(metadata) if metadata.len() >= max_bytes => fs::rename(path, rotated_path(path)),
        Ok(_) => Ok(()),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(error),
    }
}

fn format_log_line(scope: &str, message: &str) -> String {
    format!(
        "[{}] [{}] {}\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
        scope,
        message
    )
}

fn append_log_line_with_limit(
    path: &Path,
    scope: &str,
    message: &str,
    max_bytes: u64,
) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    rotate_if_needed(path, max_bytes)?;

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(format_log_line(scope, message).as_bytes())
}

pub fn append_log_line(path: &Path, scope: &str, message: &str) -> io::Result<()> {
    append_log_line_with_limit(path, scope, message, MAX_LOG_BYTES)
}

fn append_scoped_log(scope: &str, message: &str) {
    if cfg!(debug_assertions) {
        eprintln!("[{scope}] {message}");
    }

    let path = resolve_desktop_log_path(runtime_paths::default_root_dir(), DESKTOP_LOG_FILE);
    if let Err(error) = append_log_line(&path, scope, message) {
        eprintln!(
            "failed to write desktop log {}: {}",
            path.display(),
            error
        );
    }
}

pub fn append_desktop_log(message: &str) {
    append_scoped_log("desktop", message);
}

pub fn append_startup_log(message: &str) {
    append_scoped_log("startup", message);
}

pub fn append_update_log(message: &str) {
    append_scoped_log("update", message);
}
