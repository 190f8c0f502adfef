use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_COORDINATOR_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// URL base del coordinator, ej: `http://127.0.0.1:8080`.
    pub coordinator_url: String,
    /// Directorio compartido donde van intermedios y salidas.
    pub work_dir: PathBuf,
    /// Espera entre consultas cuando no hay trabajo.
    pub poll_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            coordinator_url: DEFAULT_COORDINATOR_URL.to_string(),
            work_dir: PathBuf::from("."),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// `<hostname>-<uuid>`, generado una vez por proceso.
pub fn new_worker_id() -> String {
    let host = hostname::get()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let host = if host.is_empty() { "worker".to_string() } else { host };
    format!("{}-{}", host, uuid::Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_ids_son_unicos() {
        let a = new_worker_id();
        let b = new_worker_id();
        assert_ne!(a, b);
        assert!(!a.starts_with('-'));
    }
}
