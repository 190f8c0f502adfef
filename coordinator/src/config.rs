use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use anyhow::{Context, Result};
use glob::glob;
use tracing::warn;

use crate::scheduler::TASK_TIMEOUT;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_N_REDUCE: usize = 10;

#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Dirección donde escucha el servidor RPC. Puerto 0 = efímero.
    pub addr: SocketAddr,
    pub task_timeout: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            task_timeout: TASK_TIMEOUT,
        }
    }
}

/// Expande rutas/patrones glob a la lista ordenada de splits.
///
/// Un patrón que no matchea nada se usa tal cual (el worker fallará al
/// leerlo y la tarea quedará reintentándose).
pub fn expand_inputs(patterns: &[String]) -> Result<Vec<String>> {
    let mut splits = Vec::new();

    for pattern in patterns {
        let mut matched: Vec<String> = Vec::new();
        let entries =
            glob(pattern).with_context(|| format!("patrón de entrada inválido: {pattern}"))?;
        for entry in entries {
            let path =
                entry.with_context(|| format!("no se pudo leer una entrada de {pattern}"))?;
            if path.is_file() {
                matched.push(path.to_string_lossy().to_string());
            }
        }

        if matched.is_empty() {
            warn!("el patrón {} no matcheó ningún archivo, se usa tal cual", pattern);
            splits.push(pattern.clone());
        } else {
            splits.extend(matched);
        }
    }

    Ok(splits)
}
