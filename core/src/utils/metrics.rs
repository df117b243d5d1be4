// core/src/utils/metrics.rs
use crate::utils::config::MetricsSettings;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

/// Counter sink. Fire-and-forget: failures never reach the caller.
pub trait Metrics {
    fn inc(&self, name: &str, amount: usize);
}

/// Drops every count.
pub struct NoopMetrics;

impl Metrics for NoopMetrics {
    fn inc(&self, _name: &str, _amount: usize) {}
}

/// Appends one JSON object per count to a file.
pub struct FileMetrics {
    path: PathBuf,
    user: String,
    lock: Mutex<()>,
}

impl FileMetrics {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileMetrics { path: path.into(), user: whoami::username(), lock: Mutex::new(()) }
    }

    fn append(&self, name: &str, amount: usize) -> std::io::Result<()> {
        let line = serde_json::json!({
            "timestamp": chrono::Local::now().to_rfc3339(),
            "namespace": "cook-users",
            "name": name,
            "value": amount,
            "user": self.user,
        });
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{}", line)
    }
}

impl Metrics for FileMetrics {
    fn inc(&self, name: &str, amount: usize) {
        if let Err(e) = self.append(name, amount) {
            log::warn!("Failed to write metric {} to {}: {}", name, self.path.display(), e);
        }
    }
}

/// Builds the sink described by the settings file.
pub fn from_settings(settings: &MetricsSettings) -> Box<dyn Metrics> {
    match (&settings.file, settings.disabled) {
        (Some(path), false) => Box::new(FileMetrics::new(path.clone())),
        _ => Box::new(NoopMetrics),
    }
}
