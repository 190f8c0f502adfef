use std::sync::{Arc, Weak};

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::debug;

use common::TaskKind;

use crate::scheduler::Coordinator;

/// Detector de fallos para UNA asignación concreta `(kind, index, epoch)`.
///
/// Duerme el timeout sin tomar ningún lock y al despertar le pide al
/// coordinator que recupere la tarea. Si mientras tanto la tarea se completó
/// o fue reasignada (otro epoch), no hace nada.
pub fn spawn_fault_detector(
    coordinator: &Arc<Coordinator>,
    kind: TaskKind,
    index: usize,
    epoch: u64,
) -> JoinHandle<()> {
    let timeout = coordinator.timeout();
    let coordinator: Weak<Coordinator> = Arc::downgrade(coordinator);

    tokio::spawn(async move {
        sleep(timeout).await;

        match coordinator.upgrade() {
            Some(c) => {
                c.reclaim(kind, index, epoch);
            }
            None => debug!("coordinator ya no existe, detector de {} {} sin efecto", kind, index),
        }
    })
}
