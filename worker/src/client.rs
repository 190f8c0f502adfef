use anyhow::{Context, Result};
use reqwest::Client;

use common::{
    Assignment, TaskAssignmentRequest, TaskAssignmentResponse, TaskCompleteRequest,
    TaskCompleteResponse, TaskKind, WorkerId,
};

/// Cliente RPC hacia el coordinator.
///
/// Cualquier error de transporte se devuelve tal cual: para el worker
/// significa que el coordinator ya no está.
#[derive(Debug, Clone)]
pub struct CoordinatorClient {
    http: Client,
    base_url: String,
    worker_id: WorkerId,
}

impl CoordinatorClient {
    pub fn new(base_url: impl Into<String>, worker_id: WorkerId) -> Result<Self> {
        // una conexión por llamada, sin pool de conexiones ociosas
        let http = Client::builder()
            .pool_max_idle_per_host(0)
            .build()
            .context("no se pudo crear el cliente HTTP")?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            worker_id,
        })
    }

    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    /// Query: pide una tarea.
    pub async fn next_task(&self) -> Result<Assignment> {
        let url = format!("{}/api/v1/tasks/next", self.base_url);
        let resp = self
            .http
            .post(&url)
            .json(&TaskAssignmentRequest {
                worker_id: self.worker_id.clone(),
            })
            .send()
            .await?
            .error_for_status()?;

        let TaskAssignmentResponse { assignment } = resp.json().await?;
        Ok(assignment)
    }

    /// Report: avisa que la tarea `(kind, index)` del intento `epoch` terminó.
    pub async fn report(&self, kind: TaskKind, index: usize, epoch: u64) -> Result<bool> {
        let url = format!("{}/api/v1/tasks/complete", self.base_url);
        let resp = self
            .http
            .post(&url)
            .json(&TaskCompleteRequest {
                worker_id: self.worker_id.clone(),
                kind,
                index,
                epoch,
            })
            .send()
            .await?
            .error_for_status()?;

        let TaskCompleteResponse { accepted } = resp.json().await?;
        Ok(accepted)
    }
}
