//! # Erros do Pipeline de Análise
//!
//! Todas as falhas do crate são representadas por [`AnalysisError`]. Cada
//! variante corresponde a um tipo de falha distinguível pelo chamador
//! (via [`AnalysisError::kind`]), de modo que nenhuma condição de erro
//! derruba o processo hospedeiro.
//!
//! | Variante                | Quando ocorre                                          |
//! |-------------------------|--------------------------------------------------------|
//! | `PipelineStageFailure`  | Um analisador falhou ao processar um documento         |
//! | `InvalidPipeline`       | Ordem de estágios inválida detectada em `add`          |
//! | `ModelNotFound`         | Chave ausente no armazenamento de modelos              |
//! | `EmptyDocument`         | Documento sem tokens no momento da predição            |
//! | `UnknownTopicId`        | Tópico fora do intervalo `[0, number_of_topics)`       |
//! | `UntokenizedCorpus`     | Corpus de treino com texto bruto não tokenizado        |
//! | `NoContent`             | O download de um URL não produziu texto                |

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Resultado padrão das operações do crate.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Erro estruturado do pipeline de análise.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Um estágio do pipeline falhou; o documento permanece parcialmente processado.
    #[error("stage '{stage_name}' failed: {cause}")]
    PipelineStageFailure {
        stage_name: String,
        #[source]
        cause: Box<AnalysisError>,
    },

    /// Composição de pipeline inválida (detectada na construção, não em execução).
    #[error("invalid pipeline: {0}")]
    InvalidPipeline(String),

    /// Nenhum modelo persistido sob a chave pedida.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// O documento não tem tokens para pontuar.
    #[error("document has no tokens")]
    EmptyDocument,

    /// Identificador de tópico fora do intervalo do modelo.
    #[error("unknown topic id {topic_id} (model has {number_of_topics} topics)")]
    UnknownTopicId {
        topic_id: usize,
        number_of_topics: usize,
    },

    /// O corpus de treino contém documentos que não passaram pelo tokenizador.
    #[error("training corpus is not tokenized: document {0} has raw text but no tokens")]
    UntokenizedCorpus(usize),

    /// O colaborador de conteúdo devolveu texto vazio para o URL.
    #[error("no content could be fetched from {0}")]
    NoContent(String),

    /// Argumento inválido (ex: zero tópicos, corpus vazio).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// O blob armazenado pertence a outro tipo de modelo.
    #[error("model kind mismatch: expected '{expected}', found '{found}'")]
    ModelKindMismatch { expected: String, found: String },

    /// Erro de E/S do armazenamento de modelos.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Erro ao (de)serializar um modelo.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Classe estável de um [`AnalysisError`], usada por front-ends para mapear
/// erros para respostas (ex: HTTP 404 para `ModelNotFound`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    PipelineStageFailure,
    InvalidPipeline,
    ModelNotFound,
    EmptyDocument,
    UnknownTopicId,
    UntokenizedCorpus,
    NoContent,
    InvalidArgument,
    ModelKindMismatch,
    Io,
    Serialization,
}

impl AnalysisError {
    pub fn stage_failure(stage_name: impl Into<String>, cause: AnalysisError) -> Self {
        AnalysisError::PipelineStageFailure {
            stage_name: stage_name.into(),
            cause: Box::new(cause),
        }
    }

    pub fn invalid_pipeline(msg: impl Into<String>) -> Self {
        AnalysisError::InvalidPipeline(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        AnalysisError::InvalidArgument(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::PipelineStageFailure { .. } => ErrorKind::PipelineStageFailure,
            AnalysisError::InvalidPipeline(_) => ErrorKind::InvalidPipeline,
            AnalysisError::ModelNotFound(_) => ErrorKind::ModelNotFound,
            AnalysisError::EmptyDocument => ErrorKind::EmptyDocument,
            AnalysisError::UnknownTopicId { .. } => ErrorKind::UnknownTopicId,
            AnalysisError::UntokenizedCorpus(_) => ErrorKind::UntokenizedCorpus,
            AnalysisError::NoContent(_) => ErrorKind::NoContent,
            AnalysisError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            AnalysisError::ModelKindMismatch { .. } => ErrorKind::ModelKindMismatch,
            AnalysisError::Io(_) => ErrorKind::Io,
            AnalysisError::Serialization(_) => ErrorKind::Serialization,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_failure_wraps_cause() {
        let err = AnalysisError::stage_failure("spotter", AnalysisError::EmptyDocument);
        assert_eq!(err.kind(), ErrorKind::PipelineStageFailure);
        assert_eq!(err.to_string(), "stage 'spotter' failed: document has no tokens");
    }

    #[test]
    fn test_io_error_converts() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err: AnalysisError = io_err.into();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
