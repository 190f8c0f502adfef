use crate::app::{KeyValue, MapReduceApp};

/// WordCount: cuenta apariciones de cada palabra.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordCount;

/// Limpia un token: solo alfanumérico y '_', en minúscula.
pub(crate) fn clean_token(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect::<String>()
        .to_lowercase()
}

/// Tokeniza por espacios y descarta los tokens que quedan vacíos tras limpiar.
pub(crate) fn tokenize(content: &str) -> impl Iterator<Item = String> + '_ {
    content
        .split_whitespace()
        .map(clean_token)
        .filter(|t| !t.is_empty())
}

impl MapReduceApp for WordCount {
    fn map(&self, _split_id: &str, content: &str) -> Vec<KeyValue> {
        tokenize(content).map(|word| KeyValue::new(word, "1")).collect()
    }

    fn reduce(&self, _key: &str, values: &[String]) -> String {
        values.len().to_string()
    }
}
