use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use common::JobInfo;
use reqwest::Client;
use std::{env, time::Duration};

/// Igual que en el worker:
/// - COORDINATOR_URL si está definida
/// - si no, http://127.0.0.1:8080
fn coordinator_base_url() -> String {
    env::var("COORDINATOR_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string())
}

#[derive(Parser)]
#[command(name = "client")]
#[command(about = "CLI simple para consultar al coordinator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Consulta el estado del job
    Status,
    /// Espera hasta que el job termine
    Wait {
        /// Segundos entre consultas
        #[arg(long, default_value_t = 1)]
        interval: u64,
    },
    /// Verifica que el coordinator responda
    Health,
}

async fn fetch_job(client: &Client, base_url: &str) -> Result<JobInfo> {
    let url = format!("{}/api/v1/job", base_url);
    let resp = client.get(&url).send().await?;
    if !resp.status().is_success() {
        bail!("error consultando {} (status {})", url, resp.status());
    }
    Ok(resp.json().await?)
}

fn print_job(job: &JobInfo) {
    println!("Job:");
    println!("  estado: {:?}", job.status);
    println!(
        "  map   : {}/{} completadas",
        job.n_map.saturating_sub(job.map_remaining),
        job.n_map
    );
    println!(
        "  reduce: {}/{} completadas",
        job.n_reduce.saturating_sub(job.reduce_remaining),
        job.n_reduce
    );
    println!("  progreso: {:.1}%", job.progress_pct());
    println!("  iniciado: {}", job.started_at);
    if let Some(ref done) = job.finished_at {
        println!("  finalizado: {}", done);
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new();
    let base_url = coordinator_base_url();

    match cli.command {
        Commands::Status => {
            let job = fetch_job(&client, &base_url).await?;
            print_job(&job);
        }

        Commands::Wait { interval } => loop {
            let job = fetch_job(&client, &base_url).await?;
            if job.done {
                print_job(&job);
                break;
            }
            println!("progreso: {:.1}% ({:?})", job.progress_pct(), job.status);
            tokio::time::sleep(Duration::from_secs(interval.max(1))).await;
        },

        Commands::Health => {
            let url = format!("{}/health", base_url);
            let resp = client.get(&url).send().await?;
            if resp.status().is_success() {
                println!("coordinator OK en {}", base_url);
            } else {
                bail!("coordinator respondió status {}", resp.status());
            }
        }
    }

    Ok(())
}
