//! Configuração do [`MediaEngine`](crate::engine::MediaEngine), carregável de
//! um arquivo JSON. Campos ausentes assumem os valores padrão.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::langdetect::DEFAULT_THRESHOLD;
use crate::topic::LdaConfig;

/// Modelo estatístico de entidades a carregar do armazenamento.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizerConfig {
    pub tag: String,
    pub version: u32,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self { tag: "perceptron-ner".to_string(), version: 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Diretório do `FileStore` de modelos.
    pub model_dir: PathBuf,
    pub lda: LdaConfig,
    /// Versão sob a qual os modelos de tópicos são gravados e lidos.
    pub topic_model_version: u32,
    pub detector_threshold: f64,
    /// Reconhecedor estatístico adicionado ao pipeline de entidades.
    pub recognizer: Option<RecognizerConfig>,
    /// Liga o padrão "is-a" (`is` + substantivos) no pipeline de entidades.
    pub is_a_pattern: bool,
    pub fetch_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("media-models"),
            lda: LdaConfig::default(),
            topic_model_version: 0,
            detector_threshold: DEFAULT_THRESHOLD,
            recognizer: None,
            is_a_pattern: true,
            fetch_timeout_secs: 30,
        }
    }
}

impl EngineConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let config: EngineConfig = serde_json::from_reader(reader)?;
        info!(path = %path.as_ref().display(), "engine configuration loaded");
        Ok(config)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"model_dir": "/tmp/models", "lda": {{"number_of_topics": 5}}, "recognizer": {{"tag": "WikiNER", "version": 2}}}}"#)
            .unwrap();

        let config = EngineConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.model_dir, PathBuf::from("/tmp/models"));
        assert_eq!(config.lda.number_of_topics, 5);
        assert_eq!(config.lda.alpha, LdaConfig::default().alpha);
        assert_eq!(config.recognizer, Some(RecognizerConfig { tag: "WikiNER".into(), version: 2 }));
        assert!(config.is_a_pattern);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = EngineConfig::from_json_file("/definitely/not/here.json");
        assert!(matches!(result, Err(crate::error::AnalysisError::Io(_))));
    }
}
