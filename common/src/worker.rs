use serde::{Deserialize, Serialize};

use crate::task::{Assignment, TaskKind};

/// Identificador del proceso worker: `<hostname>-<uuid>`.
/// Sólo se usa para logs, nunca para decidir asignaciones.
pub type WorkerId = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskAssignmentRequest {
    pub worker_id: WorkerId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskAssignmentResponse {
    pub assignment: Assignment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskCompleteRequest {
    pub worker_id: WorkerId,
    pub kind: TaskKind,
    pub index: usize,
    pub epoch: u64,
}

/// `accepted` indica si el reporte se contabilizó. Si es `false` (tarde,
/// duplicado o de un intento viejo) el worker lo cuenta como rechazado y
/// sigue pidiendo tareas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskCompleteResponse {
    pub accepted: bool,
}
