//! # Motor de Análise de Mídia
//!
//! Pontos de entrada usados pelos front-ends. Cada operação monta o pipeline
//! de que precisa a partir da [`EngineConfig`] e do armazenamento de modelos
//! recebido explicitamente (não há armazenamento global).
//!
//! | Operação                          | Saída                                 |
//! |-----------------------------------|---------------------------------------|
//! | `recognize_entities`              | relatório de entidades (texto)        |
//! | `recognize_entities_with_spotter` | relatório com um gazetteer ad hoc     |
//! | `recognize_entities_from_url`     | relatório do texto de uma página      |
//! | `detect_language`                 | idioma (ou `Unknown`)                 |
//! | `train_topic_model`               | [`TrainingOutcome`]                   |
//! | `predict_topics`                  | pares (descrição do tópico, score)    |

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{EngineConfig, RecognizerConfig};
use crate::content::{ContentSource, HttpContentSource};
use crate::corpus::english_corpus;
use crate::document::{Document, PartOfSpeech};
use crate::error::{AnalysisError, ErrorKind, Result};
use crate::langdetect::{detector_for, DetectorMode, LanguageDetector, NgramClassifier};
use crate::language::Language;
use crate::pattern::{PatternSpotter, PatternUnit};
use crate::perceptron::AveragedPerceptronRecognizer;
use crate::pipeline::Pipeline;
use crate::report::format_entities;
use crate::spotter::Spotter;
use crate::store::{FileStore, ModelStore, ModelStoreKey};
use crate::topic::{LdaConfig, TopicModel};

/// Tag do classificador de idioma persistido (chave `Any/language-classifier/v0`).
pub const LANGUAGE_CLASSIFIER_TAG: &str = "language-classifier";

/// Épocas usadas para treinar o reconhecedor de exemplo.
const SAMPLE_RECOGNIZER_ITERATIONS: usize = 10;

/// Gazetteer ad hoc para `recognize_entities_with_spotter`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotterInfo {
    pub tag: String,
    pub capture_tag: String,
    pub entries: Vec<String>,
}

/// Tópicos previstos para um texto de teste após o treino.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestPrediction {
    pub text: String,
    pub topics: Vec<(String, f64)>,
}

/// Resultado de `train_topic_model`. Falhas não propagam: viram `success = false`
/// com a causa anexada.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingOutcome {
    pub success: bool,
    pub cause: Option<String>,
    pub cause_kind: Option<ErrorKind>,
    pub predictions: Vec<TestPrediction>,
}

impl TrainingOutcome {
    fn failed(error: &AnalysisError) -> Self {
        Self {
            success: false,
            cause: Some(error.to_string()),
            cause_kind: Some(error.kind()),
            predictions: Vec::new(),
        }
    }
}

pub struct MediaEngine {
    config: EngineConfig,
    store: Arc<dyn ModelStore>,
    content: Box<dyn ContentSource>,
}

impl MediaEngine {
    /// Motor com `FileStore` em `config.model_dir` e download HTTP.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let store = FileStore::new(&config.model_dir)?;
        let content = HttpContentSource::new(config.fetch_timeout())?;
        Ok(Self::with_parts(config, Arc::new(store), Box::new(content)))
    }

    pub fn with_parts(config: EngineConfig, store: Arc<dyn ModelStore>, content: Box<dyn ContentSource>) -> Self {
        Self { config, store, content }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &dyn ModelStore {
        self.store.as_ref()
    }

    /// Padrão "is-a": `is` (verbo, como contexto) seguido de substantivos,
    /// nomes próprios, auxiliares, determinantes e adjetivos.
    pub fn is_a_spotter(language: Language) -> Result<PatternSpotter> {
        let mut spotter = PatternSpotter::new(language, "is-a-pattern", "IsA");
        spotter.new_pattern(
            "Is+Noun",
            vec![
                PatternUnit::single().with_token("is").with_pos(&[PartOfSpeech::Verb]).as_context(),
                PatternUnit::multiple().with_pos(&[
                    PartOfSpeech::Noun,
                    PartOfSpeech::Propn,
                    PartOfSpeech::Aux,
                    PartOfSpeech::Det,
                    PartOfSpeech::Adj,
                ]),
            ],
        )?;
        Ok(spotter)
    }

    /// Pipeline de entidades: tokenizador, reconhecedor estatístico (se
    /// configurado) e padrão "is-a" (se ligado).
    pub fn entity_pipeline(&self, language: Language) -> Result<Pipeline> {
        let mut pipeline = Pipeline::build(language);
        if let Some(recognizer) = &self.config.recognizer {
            let model = AveragedPerceptronRecognizer::from_store(
                self.store(),
                language,
                recognizer.version,
                &recognizer.tag,
            )?;
            pipeline.add(Box::new(model))?;
        }
        if self.config.is_a_pattern {
            pipeline.add(Box::new(Self::is_a_spotter(language)?))?;
        }
        Ok(pipeline)
    }

    /// Documento processado pelo pipeline de entidades.
    pub fn analyze_entities(&self, text: &str, language: Language) -> Result<Document> {
        self.entity_pipeline(language)?.process_text(text)
    }

    pub fn recognize_entities(&self, text: &str, language: Language) -> Result<String> {
        Ok(format_entities(&self.analyze_entities(text, language)?))
    }

    /// Documento processado por um gazetteer montado com as entradas de `info`
    /// (sem distinção de caixa).
    pub fn analyze_with_spotter(&self, text: &str, info: &SpotterInfo, language: Language) -> Result<Document> {
        let mut spotter = Spotter::new(language, info.tag.clone(), info.capture_tag.clone());
        spotter.set_ignore_case(true);
        for entry in &info.entries {
            spotter.add_entry(entry)?;
        }
        debug!(tag = %info.tag, entries = spotter.entry_count(), "gazetteer built");
        Pipeline::build(language).with(Box::new(spotter))?.process_text(text)
    }

    pub fn recognize_entities_with_spotter(&self, text: &str, info: &SpotterInfo, language: Language) -> Result<String> {
        Ok(format_entities(&self.analyze_with_spotter(text, info, language)?))
    }

    /// Baixa o texto da página e o processa pelo pipeline de entidades.
    ///
    /// Conteúdo vazio (falha de download) é `NoContent`, nunca um documento vazio.
    pub fn analyze_url(&self, url: &str, language: Language) -> Result<Document> {
        let text = self.content.fetch_text(url);
        if text.trim().is_empty() {
            return Err(AnalysisError::NoContent(url.to_string()));
        }
        self.analyze_entities(&text, language)
    }

    pub fn recognize_entities_from_url(&self, url: &str, language: Language) -> Result<String> {
        Ok(format_entities(&self.analyze_url(url, language)?))
    }

    fn language_detector(&self, mode: DetectorMode) -> Box<dyn LanguageDetector> {
        if mode == DetectorMode::Classifier {
            let key = ModelStoreKey::new(Language::Any, LANGUAGE_CLASSIFIER_TAG, 0);
            match NgramClassifier::load(self.store(), &key) {
                Ok(classifier) => return Box::new(classifier.with_threshold(self.config.detector_threshold)),
                Err(AnalysisError::ModelNotFound(_)) => {}
                Err(error) => warn!(%error, "stored language classifier unusable, using built-in model"),
            }
        }
        detector_for(mode, self.config.detector_threshold)
    }

    /// Idioma do texto; `Unknown` abaixo do limiar de confiança.
    pub fn detect_language(&self, text: &str, mode: DetectorMode) -> Language {
        let language = self.language_detector(mode).detect(text);
        debug!(?mode, %language, "language detection");
        language
    }

    /// Ranking completo de idiomas candidatos.
    pub fn detect_language_scores(&self, text: &str, mode: DetectorMode) -> Vec<(Language, f64)> {
        self.language_detector(mode).detect_all(text)
    }

    fn topic_key(&self, tag: &str, language: Language) -> ModelStoreKey {
        ModelStoreKey::new(language, tag, self.config.topic_model_version)
    }

    fn tokenize_all(&self, texts: &[String], language: Language) -> Result<Vec<Document>> {
        let documents = texts.iter().map(|t| Document::new(t.as_str(), language)).collect();
        let report = Pipeline::build(language).process_many(documents);
        let mut tokenized = Vec::with_capacity(report.outcomes.len());
        for outcome in report.outcomes {
            if let Some(error) = outcome.error {
                return Err(error);
            }
            tokenized.push(outcome.document);
        }
        Ok(tokenized)
    }

    fn describe_scores(model: &TopicModel, document: &Document) -> Result<Vec<(String, f64)>> {
        model
            .predict(document)?
            .into_iter()
            .map(|s| Ok((model.describe_topic(s.topic_id)?.to_string(), s.score)))
            .collect()
    }

    fn train_and_evaluate(
        &self,
        training: &[String],
        test: &[String],
        tag: &str,
        language: Language,
        topic_count: usize,
    ) -> Result<Vec<TestPrediction>> {
        let key = self.topic_key(tag, language);
        let config = LdaConfig { number_of_topics: topic_count, ..self.config.lda.clone() };

        let corpus = self.tokenize_all(training, language)?;
        TopicModel::train(&key, &corpus, &config)?.persist(self.store(), &key)?;

        // Avalia com o modelo relido do armazenamento
        let model = TopicModel::load(self.store(), &key)?;
        let mut predictions = Vec::new();
        for document in self.tokenize_all(test, language)? {
            match Self::describe_scores(&model, &document) {
                Ok(topics) => {
                    for (description, score) in &topics {
                        debug!(text = %document.raw_text, "[{score:.3}] => {description}");
                    }
                    predictions.push(TestPrediction { text: document.raw_text, topics });
                }
                Err(AnalysisError::EmptyDocument) => debug!("skipping empty test document"),
                Err(error) => return Err(error),
            }
        }
        Ok(predictions)
    }

    /// Treina, persiste e avalia um modelo de tópicos.
    pub fn train_topic_model(
        &self,
        training: &[String],
        test: &[String],
        tag: &str,
        language: Language,
        topic_count: usize,
    ) -> TrainingOutcome {
        match self.train_and_evaluate(training, test, tag, language, topic_count) {
            Ok(predictions) => {
                info!(tag, %language, topic_count, tests = predictions.len(), "topic model trained");
                TrainingOutcome { success: true, cause: None, cause_kind: None, predictions }
            }
            Err(error) => {
                warn!(tag, %language, %error, "topic model training failed");
                TrainingOutcome::failed(&error)
            }
        }
    }

    /// Tópicos do texto (descrição, score), do mais provável ao menos provável.
    pub fn predict_topics(&self, text: &str, tag: &str, language: Language) -> Result<Vec<(String, f64)>> {
        let model = TopicModel::load(self.store(), &self.topic_key(tag, language))?;
        let document = Pipeline::build(language).process_text(text)?;
        Self::describe_scores(&model, &document)
    }

    /// Treina o reconhecedor de exemplo com o corpus embutido e o grava sob a
    /// chave configurada (ou a padrão).
    pub fn install_sample_recognizer(&self) -> Result<RecognizerConfig> {
        let target = self.config.recognizer.clone().unwrap_or_default();
        let recognizer = AveragedPerceptronRecognizer::train(
            Language::English,
            target.tag.clone(),
            &english_corpus(),
            SAMPLE_RECOGNIZER_ITERATIONS,
        )?;
        recognizer.persist(self.store(), target.version)?;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    struct StaticContent(&'static str);

    impl ContentSource for StaticContent {
        fn fetch_text(&self, _url: &str) -> String {
            self.0.to_string()
        }
    }

    fn engine(content: &'static str) -> MediaEngine {
        let config = EngineConfig {
            lda: LdaConfig { iterations: 100, parallelism: 1, ..LdaConfig::default() },
            ..EngineConfig::default()
        };
        MediaEngine::with_parts(config, Arc::new(MemoryStore::new()), Box::new(StaticContent(content)))
    }

    #[test]
    fn test_is_a_report() {
        let report = engine("").recognize_entities("Amazon is a company", Language::English).unwrap();
        assert!(report.contains("'Amazon is a_company'"));
        assert!(report.ends_with("\ta company [IsA]"));
    }

    #[test]
    fn test_spotter_ignores_case() {
        let info = SpotterInfo {
            tag: "programming".into(),
            capture_tag: "ProgrammingLanguage".into(),
            entries: vec!["Python".into(), "C++".into()],
        };
        let doc = engine("")
            .analyze_with_spotter("I write PYTHON and C++ daily", &info, Language::English)
            .unwrap();
        let found: Vec<&str> = doc.entities.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(found, vec!["PYTHON", "C++"]);
    }

    #[test]
    fn test_url_content() {
        let report = engine("Rust is a language").recognize_entities_from_url("http://x", Language::English).unwrap();
        assert!(report.contains("a language [IsA]"));

        let empty = engine("   ").recognize_entities_from_url("http://x", Language::English);
        assert!(matches!(empty, Err(AnalysisError::NoContent(_))));
    }

    #[test]
    fn test_missing_recognizer_is_model_not_found() {
        let mut engine = engine("");
        engine.config.recognizer = Some(RecognizerConfig { tag: "WikiNER".into(), version: 3 });
        let result = engine.recognize_entities("Amazon is a company", Language::English);
        assert_eq!(result.unwrap_err().kind(), ErrorKind::ModelNotFound);
    }

    #[test]
    fn test_sample_recognizer_joins_pipeline() {
        let mut engine = engine("");
        engine.config.recognizer = Some(RecognizerConfig::default());
        engine.install_sample_recognizer().unwrap();

        let doc = engine.analyze_entities("Barack Obama visited Paris last week.", Language::English).unwrap();
        assert!(doc.entities.iter().any(|e| e.text == "Barack Obama" && e.entity_type == "Person"));
    }

    #[test]
    fn test_training_failure_is_reported() {
        let outcome = engine("").train_topic_model(&[], &[], "empty", Language::English, 2);
        assert!(!outcome.success);
        assert_eq!(outcome.cause_kind, Some(ErrorKind::InvalidArgument));
    }

    #[test]
    fn test_predict_unknown_tag() {
        let result = engine("").predict_topics("cats", "never-trained", Language::English);
        assert_eq!(result.unwrap_err().kind(), ErrorKind::ModelNotFound);
    }

    #[test]
    fn test_detect_language_modes() {
        let engine = engine("");
        let text = "The government announced new measures to support small businesses and families.";
        assert_eq!(engine.detect_language(text, DetectorMode::Signature), Language::English);
        assert_eq!(engine.detect_language(text, DetectorMode::Classifier), Language::English);
    }
}
