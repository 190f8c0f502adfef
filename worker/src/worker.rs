use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use common::{engine, Assignment, MapReduceApp, TaskKind};

use crate::client::CoordinatorClient;
use crate::config::{new_worker_id, WorkerConfig};

/// Contadores de lo que hizo un worker hasta terminar.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WorkerStats {
    pub maps_done: usize,
    pub reduces_done: usize,
    /// Intentos abortados por error de I/O o panic; no se reportan.
    pub failed: usize,
    /// Reportes que el coordinator no contabilizó (tarde o de un intento viejo).
    pub rejected: usize,
}

/// Loop principal del worker.
/// - Pide tareas al coordinator.
/// - Si no hay, espera `poll_interval` y vuelve a pedir.
/// - Ejecuta la tarea y, si salió bien, la reporta.
/// - Si falla la ejecución no reporta nada: el timeout del coordinator la reasigna.
/// - Si el coordinator no responde, termina (el job terminó o el coordinator murió).
pub async fn run_worker(app: Arc<dyn MapReduceApp>, config: WorkerConfig) -> Result<WorkerStats> {
    let client = CoordinatorClient::new(config.coordinator_url.clone(), new_worker_id())?;
    run_with_client(app, &client, &config).await
}

pub async fn run_with_client(
    app: Arc<dyn MapReduceApp>,
    client: &CoordinatorClient,
    config: &WorkerConfig,
) -> Result<WorkerStats> {
    let mut stats = WorkerStats::default();

    info!(
        "worker {} arrancando contra {} (work_dir={})",
        client.worker_id(),
        config.coordinator_url,
        config.work_dir.display()
    );

    loop {
        let assignment = match client.next_task().await {
            Ok(a) => a,
            Err(e) => {
                info!("coordinator inalcanzable ({:#}), worker termina", e);
                return Ok(stats);
            }
        };

        let (Some(kind), Some(index), Some(epoch)) =
            (assignment.kind(), assignment.index(), assignment.epoch())
        else {
            debug!("no hay tareas, esperando {:?}...", config.poll_interval);
            sleep(config.poll_interval).await;
            continue;
        };

        info!("tengo tarea {} {} (epoch={})", kind, index, epoch);

        if !execute(Arc::clone(&app), assignment, config.work_dir.clone()).await {
            stats.failed += 1;
            continue;
        }

        match client.report(kind, index, epoch).await {
            Ok(true) => {
                info!("tarea {} {} reportada", kind, index);
                match kind {
                    TaskKind::Map => stats.maps_done += 1,
                    TaskKind::Reduce => stats.reduces_done += 1,
                }
            }
            Ok(false) => {
                warn!(
                    "el coordinator no contabilizó la tarea {} {} (epoch={})",
                    kind, index, epoch
                );
                stats.rejected += 1;
            }
            Err(e) => {
                info!("coordinator inalcanzable al reportar ({:#}), worker termina", e);
                return Ok(stats);
            }
        }
    }
}

/// Ejecuta la tarea en un hilo de bloqueo. `true` si quedó commiteada.
async fn execute(app: Arc<dyn MapReduceApp>, assignment: Assignment, work_dir: PathBuf) -> bool {
    let label = match (assignment.kind(), assignment.index()) {
        (Some(kind), Some(index)) => format!("{} {}", kind, index),
        _ => "none".to_string(),
    };

    let handle = tokio::task::spawn_blocking(move || match assignment {
        Assignment::Map {
            split,
            index,
            n_reduce,
            epoch,
        } => {
            engine::execute_map(app.as_ref(), &split, index, n_reduce, epoch, &work_dir)
                .map(|_| ())
        }
        Assignment::Reduce { index, n_map, epoch } => {
            engine::execute_reduce(app.as_ref(), index, n_map, epoch, &work_dir).map(|_| ())
        }
        Assignment::None => Ok(()),
    });

    match handle.await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            warn!("error procesando tarea {}: {:?}", label, e);
            false
        }
        Err(e) => {
            warn!("panic o join error en tarea {}: {:?}", label, e);
            false
        }
    }
}
