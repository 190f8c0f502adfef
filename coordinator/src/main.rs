use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::time::sleep;
use tracing::info;
use tracing_subscriber::EnvFilter;

use coordinator::config::{expand_inputs, DEFAULT_N_REDUCE};
use coordinator::{make_coordinator, CoordinatorConfig};

#[derive(Debug, Parser)]
#[command(name = "coordinator")]
#[command(about = "Coordinator MapReduce: reparte tareas map/reduce a los workers")]
struct Args {
    /// Dirección donde escuchar las RPC de los workers.
    #[arg(long, env = "COORDINATOR_ADDR", default_value = "127.0.0.1:8080")]
    addr: SocketAddr,

    /// Cantidad de particiones de salida (tareas reduce).
    #[arg(long, env = "N_REDUCE", default_value_t = DEFAULT_N_REDUCE as u64,
          value_parser = clap::value_parser!(u64).range(1..))]
    n_reduce: u64,

    /// Segundos sin reporte antes de reasignar una tarea.
    #[arg(long, env = "TASK_TIMEOUT_SECS", default_value_t = 10,
          value_parser = clap::value_parser!(u64).range(1..))]
    task_timeout_secs: u64,

    /// Archivos de entrada (uno por tarea map). Acepta patrones glob.
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("coordinator=debug,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let splits = expand_inputs(&args.inputs)?;

    let config = CoordinatorConfig {
        addr: args.addr,
        task_timeout: Duration::from_secs(args.task_timeout_secs),
    };

    let handle = make_coordinator(splits, args.n_reduce as usize, config).await?;

    // mismo esquema que el lab: consultar done() una vez por segundo
    while !handle.done() {
        sleep(Duration::from_secs(1)).await;
    }

    info!("job terminado, apagando coordinator");
    // margen para que los últimos workers reciban su respuesta
    sleep(Duration::from_secs(1)).await;
    handle.shutdown().await?;

    Ok(())
}
