use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::indexer::Indexer;
use crate::wordcount::WordCount;

/// Par clave/valor emitido por `map`.
///
/// Se serializa con los nombres `Key`/`Value` para que los archivos
/// intermedios sean compatibles con los generados por otras implementaciones
/// del laboratorio.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Lógica de negocio de un job: el engine la trata como caja negra.
pub trait MapReduceApp: Send + Sync {
    /// `split_id` es el identificador del split (la ruta), `content` su contenido completo.
    fn map(&self, split_id: &str, content: &str) -> Vec<KeyValue>;

    /// Recibe todos los valores de una clave, en orden, y devuelve el valor reducido.
    fn reduce(&self, key: &str, values: &[String]) -> String;
}

/// Nombres aceptados por `app_by_name`.
pub const APP_NAMES: &[&str] = &["wordcount", "indexer"];

/// Resuelve una aplicación empaquetada por nombre.
pub fn app_by_name(name: &str) -> Option<Arc<dyn MapReduceApp>> {
    match name {
        "wordcount" | "wc" => Some(Arc::new(WordCount)),
        "indexer" => Some(Arc::new(Indexer)),
        _ => None,
    }
}
