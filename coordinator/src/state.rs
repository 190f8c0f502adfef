// coordinator/src/state.rs

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::time::Instant;

use crate::scheduler::Coordinator;

/// Estado compartido por los handlers HTTP.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<Coordinator>,
}

/// Ciclo de vida de una tarea: Idle -> InProgress -> {Completed, Idle}.
/// Completed es terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Idle,
    InProgress,
    Completed,
}

/// Registro mutable de una tarea (map o reduce), protegido por su propio lock.
#[derive(Debug)]
pub(crate) struct TaskRecord {
    pub state: TaskState,
    /// Momento de la última asignación.
    pub assigned_at: Option<Instant>,
    /// Número de intento; sube en cada Idle -> InProgress.
    pub epoch: u64,
}

impl TaskRecord {
    pub fn idle() -> Self {
        Self {
            state: TaskState::Idle,
            assigned_at: None,
            epoch: 0,
        }
    }
}

/// Toma el lock aunque esté envenenado: cada sección crítica deja el
/// registro consistente en todo momento.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
