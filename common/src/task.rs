use serde::{Deserialize, Serialize};
use std::fmt;

/// Tipo de tarea dentro de un job MapReduce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Map,
    Reduce,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Map => write!(f, "map"),
            TaskKind::Reduce => write!(f, "reduce"),
        }
    }
}

/// Respuesta del coordinator a una consulta de trabajo.
///
/// - `Map`: `split` y `n_reduce` sólo viajan en tareas map.
/// - `Reduce`: `n_map` sólo viaja en tareas reduce.
/// - `None`: no hay trabajo disponible ahora mismo, reintentar más tarde.
///
/// `epoch` identifica el intento concreto; se devuelve tal cual al reportar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Assignment {
    Map {
        split: String,
        index: usize,
        n_reduce: usize,
        epoch: u64,
    },
    Reduce {
        index: usize,
        n_map: usize,
        epoch: u64,
    },
    None,
}

impl Assignment {
    pub fn kind(&self) -> Option<TaskKind> {
        match self {
            Assignment::Map { .. } => Some(TaskKind::Map),
            Assignment::Reduce { .. } => Some(TaskKind::Reduce),
            Assignment::None => None,
        }
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            Assignment::Map { index, .. } | Assignment::Reduce { index, .. } => Some(*index),
            Assignment::None => None,
        }
    }

    pub fn epoch(&self) -> Option<u64> {
        match self {
            Assignment::Map { epoch, .. } | Assignment::Reduce { epoch, .. } => Some(*epoch),
            Assignment::None => None,
        }
    }
}
