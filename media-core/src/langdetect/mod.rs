//! # Detecção de Idioma
//!
//! Estratégias intercambiáveis atrás do trait [`LanguageDetector`]:
//!
//! | Modo                      | Implementação                                   |
//! |---------------------------|-------------------------------------------------|
//! | [`DetectorMode::Signature`]  | perfis de trigramas do `whatlang`            |
//! | [`DetectorMode::Classifier`] | Naive Bayes multinomial sobre n-gramas de caracteres, treinável e persistível |
//!
//! A detecção nunca falha: abaixo do limiar de confiança a resposta é
//! [`Language::Unknown`].

mod classifier;
mod signature;

pub use classifier::NgramClassifier;
pub use signature::SignatureDetector;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analyzer::{Analyzer, Capabilities};
use crate::document::Document;
use crate::error::Result;
use crate::language::Language;

/// Limiar padrão de confiança.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Detector de idioma.
pub trait LanguageDetector: Send + Sync {
    /// Idioma mais provável, ou `Unknown` abaixo do limiar.
    fn detect(&self, text: &str) -> Language;

    /// Todos os candidatos com pontuação, em ordem decrescente.
    fn detect_all(&self, text: &str) -> Vec<(Language, f64)>;
}

/// Estratégia de detecção.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorMode {
    #[default]
    Signature,
    Classifier,
}

/// Constrói o detector do modo pedido.
///
/// O classificador usa o modelo embutido (treinado com as sentenças de
/// referência de cada idioma).
pub fn detector_for(mode: DetectorMode, threshold: f64) -> Box<dyn LanguageDetector> {
    match mode {
        DetectorMode::Signature => Box::new(SignatureDetector::new(threshold)),
        DetectorMode::Classifier => Box::new(NgramClassifier::pretrained().with_threshold(threshold)),
    }
}

/// Estágio de pipeline que grava o idioma detectado no documento.
pub struct LanguageDetectorAnalyzer {
    detector: Box<dyn LanguageDetector>,
    name: String,
}

impl LanguageDetectorAnalyzer {
    pub fn new(mode: DetectorMode, threshold: f64) -> Self {
        let name = match mode {
            DetectorMode::Signature => "language-detector:signature",
            DetectorMode::Classifier => "language-detector:classifier",
        };
        Self { detector: detector_for(mode, threshold), name: name.to_string() }
    }
}

impl Analyzer for LanguageDetectorAnalyzer {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    fn apply(&self, document: &mut Document) -> Result<()> {
        let language = self.detector.detect(&document.raw_text);
        debug!(detector = %self.name, %language, "language detected");
        document.language = language;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENGLISH: &str = "The government announced new measures to support small businesses \
                           and families affected by the rising cost of living this winter.";
    const GERMAN: &str = "Die Regierung hat heute neue Maßnahmen angekündigt, um kleine \
                          Unternehmen und Familien in diesem Winter zu unterstützen.";

    #[test]
    fn test_both_modes_agree_on_clear_text() {
        for mode in [DetectorMode::Signature, DetectorMode::Classifier] {
            let detector = detector_for(mode, DEFAULT_THRESHOLD);
            assert_eq!(detector.detect(ENGLISH), Language::English, "{mode:?}");
            assert_eq!(detector.detect(GERMAN), Language::German, "{mode:?}");
        }
    }

    #[test]
    fn test_empty_text_is_unknown() {
        for mode in [DetectorMode::Signature, DetectorMode::Classifier] {
            assert_eq!(detector_for(mode, DEFAULT_THRESHOLD).detect("  12 345 "), Language::Unknown);
        }
    }

    #[test]
    fn test_analyzer_sets_document_language() {
        let analyzer = LanguageDetectorAnalyzer::new(DetectorMode::Classifier, DEFAULT_THRESHOLD);
        let mut doc = Document::new(GERMAN, Language::Unknown);
        analyzer.apply(&mut doc).unwrap();
        assert_eq!(doc.language, Language::German);
        assert!(doc.tokens.is_empty());
    }
}
