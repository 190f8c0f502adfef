use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use common::{Assignment, JobInfo, JobStatus, TaskKind};

use crate::monitor;
use crate::state::{lock, TaskRecord, TaskState};

/// Tiempo que tiene un worker para reportar una tarea antes de que se reasigne.
pub const TASK_TIMEOUT: Duration = Duration::from_secs(10);

/// Resultado de procesar un reporte de tarea terminada.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    /// Contabilizado: la tarea pasa a Completed.
    Accepted,
    /// La tarea ya estaba Completed; no se cuenta de nuevo.
    Duplicate,
    /// Llegó fuera de plazo; la tarea queda Idle para reasignarse.
    Late,
    /// Pertenece a un intento anterior; se ignora.
    Stale,
    /// Índice de tarea inexistente.
    Unknown,
}

impl ReportOutcome {
    pub fn is_accepted(self) -> bool {
        matches!(self, ReportOutcome::Accepted)
    }
}

#[derive(Debug)]
struct JobCounters {
    map_remaining: usize,
    reduce_remaining: usize,
    finished_at: Option<DateTime<Utc>>,
}

/// Dueño de todas las tareas de un job.
///
/// Dos niveles de lock: `job` (contadores y recorridos) y uno por tarea.
/// Siempre `job` antes que el de la tarea, y el de la tarea sólo durante el
/// chequeo y la transición de esa tarea.
#[derive(Debug)]
pub struct Coordinator {
    splits: Vec<String>,
    map_tasks: Vec<Mutex<TaskRecord>>,
    reduce_tasks: Vec<Mutex<TaskRecord>>,
    job: Mutex<JobCounters>,
    timeout: Duration,
    started_at: DateTime<Utc>,
}

impl Coordinator {
    /// Una tarea map por split y `n_reduce` tareas reduce, todas Idle.
    ///
    /// Con `timeout` cero ningún reporte llegaría a tiempo, así que se usa
    /// `TASK_TIMEOUT`.
    pub fn new(splits: Vec<String>, n_reduce: usize, timeout: Duration) -> Arc<Self> {
        let n_reduce = n_reduce.max(1);
        let timeout = if timeout.is_zero() {
            warn!("timeout cero, usando {:?}", TASK_TIMEOUT);
            TASK_TIMEOUT
        } else {
            timeout
        };
        let map_tasks = splits.iter().map(|_| Mutex::new(TaskRecord::idle())).collect();
        let reduce_tasks = (0..n_reduce).map(|_| Mutex::new(TaskRecord::idle())).collect();

        info!(
            "coordinator inicializado: {} tareas map, {} tareas reduce, timeout={:?}",
            splits.len(),
            n_reduce,
            timeout
        );

        Arc::new(Self {
            job: Mutex::new(JobCounters {
                map_remaining: splits.len(),
                reduce_remaining: n_reduce,
                finished_at: None,
            }),
            splits,
            map_tasks,
            reduce_tasks,
            timeout,
            started_at: Utc::now(),
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn n_map(&self) -> usize {
        self.map_tasks.len()
    }

    pub fn n_reduce(&self) -> usize {
        self.reduce_tasks.len()
    }

    fn tasks(&self, kind: TaskKind) -> &[Mutex<TaskRecord>] {
        match kind {
            TaskKind::Map => &self.map_tasks,
            TaskKind::Reduce => &self.reduce_tasks,
        }
    }

    /// Asigna la primera tarea Idle de la fase actual.
    ///
    /// Mientras quede alguna map sin completar sólo se miran las map; si
    /// todas están en vuelo devuelve `None`. Las reduce se reparten recién
    /// cuando `map_remaining == 0`.
    pub fn assign_task(self: &Arc<Self>, worker_id: &str) -> Assignment {
        let job = lock(&self.job);

        let kind = if job.map_remaining > 0 {
            TaskKind::Map
        } else if job.reduce_remaining > 0 {
            TaskKind::Reduce
        } else {
            debug!("worker {} pidió tarea pero el job ya terminó", worker_id);
            return Assignment::None;
        };

        for (index, slot) in self.tasks(kind).iter().enumerate() {
            let epoch = {
                let mut task = lock(slot);
                if task.state != TaskState::Idle {
                    continue;
                }
                task.state = TaskState::InProgress;
                task.assigned_at = Some(Instant::now());
                task.epoch += 1;
                task.epoch
            };

            monitor::spawn_fault_detector(self, kind, index, epoch);

            info!(
                "asignando tarea {} {} (epoch={}) al worker {}",
                kind, index, epoch, worker_id
            );

            return match kind {
                TaskKind::Map => Assignment::Map {
                    split: self.splits[index].clone(),
                    index,
                    n_reduce: self.reduce_tasks.len(),
                    epoch,
                },
                TaskKind::Reduce => Assignment::Reduce {
                    index,
                    n_map: self.map_tasks.len(),
                    epoch,
                },
            };
        }

        debug!(
            "worker {} pidió tarea pero no hay {} libres (map_remaining={}, reduce_remaining={})",
            worker_id, kind, job.map_remaining, job.reduce_remaining
        );
        Assignment::None
    }

    /// Procesa el reporte de una tarea terminada.
    ///
    /// Sólo cuenta si corresponde al intento vigente y llega antes de
    /// `assigned_at + timeout`. Justo en el límite ya es tarde.
    pub fn report_task(
        &self,
        worker_id: &str,
        kind: TaskKind,
        index: usize,
        epoch: u64,
    ) -> ReportOutcome {
        let Some(slot) = self.tasks(kind).get(index) else {
            warn!("worker {} reportó tarea {} {} inexistente", worker_id, kind, index);
            return ReportOutcome::Unknown;
        };

        let mut job = lock(&self.job);
        {
            let mut task = lock(slot);

            if task.state == TaskState::Completed {
                debug!(
                    "tarea {} {} ya completada, ignorando reporte duplicado de {}",
                    kind, index, worker_id
                );
                return ReportOutcome::Duplicate;
            }

            if task.epoch != epoch {
                info!(
                    "reporte viejo de tarea {} {} (epoch={}, vigente={}) del worker {}, ignorando",
                    kind, index, epoch, task.epoch, worker_id
                );
                return ReportOutcome::Stale;
            }

            let on_time = match (task.state, task.assigned_at) {
                (TaskState::InProgress, Some(at)) => Instant::now() < at + self.timeout,
                _ => false,
            };

            if !on_time {
                task.state = TaskState::Idle;
                warn!(
                    "reporte tardío de tarea {} {} (epoch={}) del worker {}, se reasignará",
                    kind, index, epoch, worker_id
                );
                return ReportOutcome::Late;
            }

            task.state = TaskState::Completed;
        }

        match kind {
            TaskKind::Map => {
                job.map_remaining -= 1;
                if job.map_remaining == 0 {
                    info!("todas las tareas map completas, pasando a fase reduce");
                }
            }
            TaskKind::Reduce => {
                job.reduce_remaining -= 1;
                if job.reduce_remaining == 0 {
                    job.finished_at = Some(Utc::now());
                    info!("todas las tareas reduce completas, job terminado");
                }
            }
        }

        info!(
            "tarea {} {} (epoch={}) completada por {} (map_remaining={}, reduce_remaining={})",
            kind, index, epoch, worker_id, job.map_remaining, job.reduce_remaining
        );
        ReportOutcome::Accepted
    }

    /// Llamado por el detector de fallos de la asignación `epoch`.
    /// Devuelve `true` si la tarea volvió a Idle.
    pub fn reclaim(&self, kind: TaskKind, index: usize, epoch: u64) -> bool {
        let Some(slot) = self.tasks(kind).get(index) else {
            return false;
        };

        let mut task = lock(slot);
        match task.state {
            TaskState::Completed => {
                debug!("tarea {} {} completada a tiempo", kind, index);
                false
            }
            TaskState::InProgress if task.epoch == epoch => {
                task.state = TaskState::Idle;
                warn!(
                    "tarea {} {} (epoch={}) sin respuesta tras {:?}, se reasignará",
                    kind, index, epoch, self.timeout
                );
                true
            }
            _ => {
                debug!(
                    "detector de tarea {} {} (epoch={}) obsoleto, epoch vigente={}",
                    kind, index, epoch, task.epoch
                );
                false
            }
        }
    }

    /// `true` cuando ya no quedan tareas reduce.
    pub fn done(&self) -> bool {
        lock(&self.job).reduce_remaining == 0
    }

    pub fn task_state(&self, kind: TaskKind, index: usize) -> Option<TaskState> {
        self.tasks(kind).get(index).map(|slot| lock(slot).state)
    }

    pub fn job_info(&self) -> JobInfo {
        let job = lock(&self.job);

        let status = if job.reduce_remaining == 0 {
            JobStatus::Succeeded
        } else if job.map_remaining == 0 {
            JobStatus::Reducing
        } else {
            JobStatus::Mapping
        };

        JobInfo {
            status,
            n_map: self.map_tasks.len(),
            n_reduce: self.reduce_tasks.len(),
            map_remaining: job.map_remaining,
            reduce_remaining: job.reduce_remaining,
            done: job.reduce_remaining == 0,
            started_at: self.started_at,
            finished_at: job.finished_at,
        }
    }
}
