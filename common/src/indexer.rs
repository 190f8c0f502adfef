use std::collections::BTreeSet;

use crate::app::{KeyValue, MapReduceApp};
use crate::wordcount::tokenize;

/// Índice invertido: para cada palabra, en qué splits aparece.
#[derive(Debug, Clone, Copy, Default)]
pub struct Indexer;

impl MapReduceApp for Indexer {
    fn map(&self, split_id: &str, content: &str) -> Vec<KeyValue> {
        // una sola entrada por palabra distinta del split
        let words: BTreeSet<String> = tokenize(content).collect();
        words
            .into_iter()
            .map(|word| KeyValue::new(word, split_id))
            .collect()
    }

    /// Devuelve `<cantidad> <split1,split2,...>` con los splits ordenados.
    fn reduce(&self, _key: &str, values: &[String]) -> String {
        let docs: BTreeSet<&str> = values.iter().map(String::as_str).collect();
        let joined = docs.iter().copied().collect::<Vec<_>>().join(",");
        format!("{} {}", docs.len(), joined)
    }
}
