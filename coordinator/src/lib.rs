pub mod config;
pub mod handlers;
pub mod monitor;
pub mod scheduler;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::info;

pub use config::CoordinatorConfig;
pub use scheduler::{Coordinator, ReportOutcome, TASK_TIMEOUT};
pub use state::{AppState, TaskState};

/// Coordinator en marcha: el scheduler más el servidor HTTP que lo expone.
pub struct CoordinatorHandle {
    coordinator: Arc<Coordinator>,
    local_addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    server: JoinHandle<std::io::Result<()>>,
}

/// Crea el coordinator para `splits` y `n_reduce` particiones y empieza a
/// servir. Al volver ya se puede consultar `done()`.
///
/// Falla si `config.task_timeout` es cero o si no se puede escuchar en
/// `config.addr`.
pub async fn make_coordinator(
    splits: Vec<String>,
    n_reduce: usize,
    config: CoordinatorConfig,
) -> Result<CoordinatorHandle> {
    if config.task_timeout.is_zero() {
        bail!("task_timeout debe ser mayor que cero");
    }

    let coordinator = Coordinator::new(splits, n_reduce, config.task_timeout);

    let app = handlers::build_router(AppState {
        coordinator: Arc::clone(&coordinator),
    });

    let listener = TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("no se pudo escuchar en {}", config.addr))?;
    let local_addr = listener.local_addr()?;

    let (tx, rx) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await
    });

    info!("coordinator escuchando en {}", local_addr);

    Ok(CoordinatorHandle {
        coordinator,
        local_addr,
        shutdown: Some(tx),
        server,
    })
}

impl CoordinatorHandle {
    pub fn coordinator(&self) -> &Arc<Coordinator> {
        &self.coordinator
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.local_addr)
    }

    pub fn done(&self) -> bool {
        self.coordinator.done()
    }

    /// Deja de aceptar conexiones y espera a que el servidor termine.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.server.await??;
        info!("coordinator detenido");
        Ok(())
    }
}
