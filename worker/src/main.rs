use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use common::{app_by_name, APP_NAMES};
use worker::config::DEFAULT_COORDINATOR_URL;
use worker::{run_worker, WorkerConfig};

#[derive(Debug, Parser)]
#[command(name = "worker")]
#[command(about = "Worker MapReduce: pide tareas al coordinator y las ejecuta")]
struct Args {
    /// URL base del coordinator.
    #[arg(long, env = "COORDINATOR_URL", default_value = DEFAULT_COORDINATOR_URL)]
    coordinator_url: String,

    /// Aplicación a ejecutar (wordcount, indexer).
    #[arg(long, env = "MR_APP", default_value = "wordcount")]
    app: String,

    /// Directorio compartido para intermedios y salidas.
    #[arg(long, env = "MR_WORK_DIR", default_value = ".")]
    work_dir: PathBuf,

    /// Espera entre consultas cuando no hay tareas.
    #[arg(long, env = "POLL_INTERVAL_MS", default_value_t = 1000)]
    poll_interval_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("worker=debug,reqwest=info")),
        )
        .init();

    let args = Args::parse();

    let app = app_by_name(&args.app).ok_or_else(|| {
        anyhow!(
            "aplicación desconocida: {} (disponibles: {})",
            args.app,
            APP_NAMES.join(", ")
        )
    })?;

    let config = WorkerConfig {
        coordinator_url: args.coordinator_url,
        work_dir: args.work_dir,
        poll_interval: Duration::from_millis(args.poll_interval_ms),
    };

    let stats = run_worker(app, config).await?;
    info!(
        "worker terminado: maps={}, reduces={}, fallidas={}, rechazadas={}",
        stats.maps_done, stats.reduces_done, stats.failed, stats.rejected
    );

    Ok(())
}
