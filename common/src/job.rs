use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Quedan tareas map sin completar.
    Mapping,
    /// Todas las map completas, quedan reduce.
    Reducing,
    Succeeded,
}

/// Vista de sólo lectura del libro de tareas del coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobInfo {
    pub status: JobStatus,

    pub n_map: usize,
    pub n_reduce: usize,
    pub map_remaining: usize,
    pub reduce_remaining: usize,
    pub done: bool,

    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl JobInfo {
    /// Porcentaje de tareas (map + reduce) completadas.
    pub fn progress_pct(&self) -> f64 {
        let total = self.n_map + self.n_reduce;
        if total == 0 {
            return 100.0;
        }
        let completed = self.n_map.saturating_sub(self.map_remaining)
            + self.n_reduce.saturating_sub(self.reduce_remaining);
        (completed as f64 / total as f64) * 100.0
    }
}
