use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::config::LoggingConfig;
use crate::utils::error::Result;

/// Deletes stale `*.log` files, leaving the active log alone.
#[derive(Debug, Clone)]
pub struct LogJanitor {
    directory: PathBuf,
    current_file: PathBuf,
    max_age: Duration,
}

impl LogJanitor {
    pub fn new(directory: impl Into<PathBuf>, current_file: impl Into<PathBuf>, max_age: Duration) -> Self {
        Self {
            directory: directory.into(),
            current_file: current_file.into(),
            max_age,
        }
    }

    pub fn from_config(config: &LoggingConfig) -> Self {
        Self::new(&config.directory, config.current_file(), config.retention())
    }

    /// Remove every stale log file and return the paths that were deleted.
    pub fn prune(&self) -> Result<Vec<PathBuf>> {
        let now = SystemTime::now();
        let mut removed = Vec::new();

        for entry in fs::read_dir(&self.directory)? {
            let path = entry?.path();
            if !self.is_candidate(&path) {
                continue;
            }

            let modified = fs::metadata(&path)?.modified()?;
            let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
            if age > self.max_age {
                fs::remove_file(&path)?;
                tracing::info!("Deleted old log file: {}", path.display());
                removed.push(path);
            }
        }

        Ok(removed)
    }

    /// Run [`prune`](Self::prune) on the blocking pool, logging instead of
    /// returning failures.
    pub async fn run(&self) -> usize {
        let janitor = self.clone();
        match tokio::task::spawn_blocking(move || janitor.prune()).await {
            Ok(Ok(removed)) => removed.len(),
            Ok(Err(e)) => {
                tracing::error!("Error cleaning logs: {}", e);
                0
            }
            Err(e) => {
                tracing::error!("Log cleanup task failed: {}", e);
                0
            }
        }
    }

    fn is_candidate(&self, path: &Path) -> bool {
        path.is_file()
            && path.extension().is_some_and(|ext| ext == "log")
            && !self.is_current(path)
    }

    fn is_current(&self, path: &Path) -> bool {
        if path == self.current_file {
            return true;
        }
        match (path.canonicalize(), self.current_file.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}
