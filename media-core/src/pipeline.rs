//! # Pipeline de Análise: Composição Ordenada de Analisadores
//!
//! O pipeline é uma lista ordenada de estágios ([`Analyzer`]) aplicados em
//! sequência sobre um [`Document`] compartilhado. Cada estágio roda até o fim
//! antes do próximo começar e enxerga todas as mutações dos anteriores.
//!
//! ## Validação na Construção
//!
//! A ordem é verificada em [`Pipeline::add`], não durante o processamento:
//! - no máximo **um** estágio produtor de tokens (tokenizador);
//! - um tokenizador não pode vir **depois** de um estágio que lê tokens.
//!
//! ## Falhas
//!
//! Se um estágio falha, o processamento para, o documento mantém as mutações
//! parciais já feitas e o erro volta como
//! [`AnalysisError::PipelineStageFailure`] com o nome do estágio.
//!
//! ## Lote
//!
//! [`Pipeline::process_many`] distribui documentos entre threads (`rayon`),
//! preservando a ordem de entrada e isolando falhas por documento.

use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::analyzer::Analyzer;
use crate::document::Document;
use crate::error::{AnalysisError, Result};
use crate::language::Language;
use crate::tokenizer::Tokenizer;

/// Pipeline ordenado de analisadores.
pub struct Pipeline {
    language: Language,
    stages: Vec<Box<dyn Analyzer>>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("language", &self.language)
            .field("stages", &self.stage_names())
            .finish()
    }
}

impl Pipeline {
    /// Pipeline com o tokenizador do idioma como primeiro estágio.
    pub fn build(language: Language) -> Self {
        Self {
            language,
            stages: vec![Box::new(Tokenizer::new(language))],
        }
    }

    /// Pipeline sem estágios (nem mesmo o tokenizador).
    ///
    /// Útil para reprocessar documentos já tokenizados.
    pub fn empty(language: Language) -> Self {
        Self { language, stages: Vec::new() }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Acrescenta um estágio ao final, validando a ordem.
    pub fn add(&mut self, analyzer: Box<dyn Analyzer>) -> Result<()> {
        let caps = analyzer.capabilities();

        if caps.produces_tokens {
            if let Some(existing) = self.stages.iter().find(|s| s.capabilities().produces_tokens) {
                return Err(AnalysisError::invalid_pipeline(format!(
                    "'{}' produces tokens but '{}' already does",
                    analyzer.name(),
                    existing.name()
                )));
            }
            if let Some(reader) = self.stages.iter().find(|s| s.capabilities().requires_tokens) {
                return Err(AnalysisError::invalid_pipeline(format!(
                    "'{}' produces tokens but comes after '{}', which requires them",
                    analyzer.name(),
                    reader.name()
                )));
            }
        }

        debug!(stage = analyzer.name(), position = self.stages.len(), "stage added");
        self.stages.push(analyzer);
        Ok(())
    }

    /// Builder: versão encadeável de [`Pipeline::add`].
    pub fn with(mut self, analyzer: Box<dyn Analyzer>) -> Result<Self> {
        self.add(analyzer)?;
        Ok(self)
    }

    /// Aplica todos os estágios, em ordem, sobre o documento.
    pub fn process(&self, document: &mut Document) -> Result<()> {
        let start = Instant::now();

        for stage in &self.stages {
            let _span = tracing::info_span!("pipeline_stage", stage = stage.name()).entered();
            let stage_start = Instant::now();

            if let Err(cause) = stage.apply(document) {
                warn!(stage = stage.name(), error = %cause, "stage failed");
                return Err(AnalysisError::stage_failure(stage.name(), cause));
            }

            debug!(
                entities = document.entities.len(),
                processing_ms = stage_start.elapsed().as_millis() as u64,
                "stage done"
            );
        }

        debug!(
            tokens = document.token_count(),
            entities = document.entities.len(),
            processing_ms = start.elapsed().as_millis() as u64,
            "document processed"
        );
        Ok(())
    }

    /// Atalho: cria o documento no idioma do pipeline e o processa.
    pub fn process_text(&self, text: &str) -> Result<Document> {
        let mut document = Document::new(text, self.language);
        self.process(&mut document)?;
        Ok(document)
    }

    /// Processa vários documentos em paralelo.
    ///
    /// A ordem do relatório é a ordem de entrada; uma falha em um documento
    /// não interrompe os demais.
    pub fn process_many(&self, documents: Vec<Document>) -> BatchReport {
        let outcomes: Vec<DocumentOutcome> = documents
            .into_par_iter()
            .enumerate()
            .map(|(index, mut document)| {
                let error = self.process(&mut document).err();
                DocumentOutcome { index, document, error }
            })
            .collect();

        let report = BatchReport { outcomes };
        if report.failure_count() > 0 {
            warn!(
                failures = report.failure_count(),
                total = report.outcomes.len(),
                "batch finished with failures"
            );
        }
        report
    }
}

/// Resultado de um documento dentro de um lote.
#[derive(Debug, Serialize)]
pub struct DocumentOutcome {
    /// Posição do documento na entrada.
    pub index: usize,
    /// O documento, com as mutações feitas até o fim (ou até a falha).
    pub document: Document,
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<AnalysisError>,
}

impl DocumentOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

fn serialize_error<S: serde::Serializer>(
    error: &Option<AnalysisError>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match error {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}

/// Relatório de `process_many`: sucessos e falhas, na ordem de entrada.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<DocumentOutcome>,
}

impl BatchReport {
    pub fn successes(&self) -> impl Iterator<Item = &DocumentOutcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = &DocumentOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    pub fn into_documents(self) -> Vec<Document> {
        self.outcomes.into_iter().map(|o| o.document).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::Capabilities;
    use crate::error::ErrorKind;

    /// Estágio de teste que lê tokens e falha em textos contendo "boom".
    struct Exploder;

    impl Analyzer for Exploder {
        fn name(&self) -> &str {
            "exploder"
        }

        fn capabilities(&self) -> Capabilities {
            Capabilities::token_reader()
        }

        fn apply(&self, document: &mut Document) -> Result<()> {
            if document.tokens.iter().any(|t| t.text == "boom") {
                return Err(AnalysisError::invalid_argument("boom"));
            }
            Ok(())
        }
    }

    #[test]
    fn test_tokenizer_after_reader_is_rejected() {
        let mut pipeline = Pipeline::empty(Language::English);
        pipeline.add(Box::new(Exploder)).unwrap();

        let err = pipeline.add(Box::new(Tokenizer::new(Language::English))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPipeline);
        assert_eq!(pipeline.len(), 1);
    }

    #[test]
    fn test_second_tokenizer_is_rejected() {
        let mut pipeline = Pipeline::build(Language::English);
        let err = pipeline.add(Box::new(Tokenizer::new(Language::Portuguese))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPipeline);
    }

    #[test]
    fn test_reprocessing_without_tokenizer_keeps_tokens() {
        let mut doc = Pipeline::build(Language::English)
            .process_text("Dogs are mammals. Cats too.")
            .unwrap();
        let tokens = doc.tokens.clone();

        let reprocess = Pipeline::empty(Language::English).with(Box::new(Exploder)).unwrap();
        reprocess.process(&mut doc).unwrap();
        assert_eq!(doc.tokens, tokens);
    }

    #[test]
    fn test_stage_failure_keeps_partial_document() {
        let pipeline = Pipeline::build(Language::English).with(Box::new(Exploder)).unwrap();
        let mut doc = Document::new("it goes boom", Language::English);

        let err = pipeline.process(&mut doc).unwrap_err();
        match err {
            AnalysisError::PipelineStageFailure { stage_name, .. } => assert_eq!(stage_name, "exploder"),
            other => panic!("unexpected error: {other}"),
        }
        // O tokenizador já havia rodado
        assert_eq!(doc.token_count(), 3);
    }

    #[test]
    fn test_batch_isolates_failures_and_keeps_order() {
        let pipeline = Pipeline::build(Language::English).with(Box::new(Exploder)).unwrap();
        let docs = vec![
            Document::new("first text", Language::English),
            Document::new("second goes boom", Language::English),
            Document::new("third text", Language::English),
        ];

        let report = pipeline.process_many(docs);
        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.failure_count(), 1);
        assert!(!report.outcomes[1].is_success());
        let texts: Vec<_> = report.outcomes.iter().map(|o| o.document.raw_text.as_str()).collect();
        assert_eq!(texts, vec!["first text", "second goes boom", "third text"]);
    }
}
