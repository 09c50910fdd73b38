//! Detector por assinatura de trigramas (`whatlang`), restrito aos idiomas
//! suportados.

use whatlang::{Detector, Lang};

use super::LanguageDetector;
use crate::language::Language;

const ALLOWED: [Lang; 8] = [
    Lang::Eng,
    Lang::Por,
    Lang::Spa,
    Lang::Fra,
    Lang::Deu,
    Lang::Ita,
    Lang::Nld,
    Lang::Ind,
];

/// Detector baseado nos perfis de trigramas do `whatlang`.
pub struct SignatureDetector {
    detector: Detector,
    threshold: f64,
}

impl SignatureDetector {
    pub fn new(threshold: f64) -> Self {
        Self { detector: Detector::with_allowlist(ALLOWED.to_vec()), threshold }
    }
}

impl LanguageDetector for SignatureDetector {
    fn detect(&self, text: &str) -> Language {
        match self.detector.detect(text) {
            Some(info) if info.is_reliable() || info.confidence() >= self.threshold => {
                Language::from_iso3(info.lang().code())
            }
            _ => Language::Unknown,
        }
    }

    /// O `whatlang` expõe apenas o melhor candidato.
    fn detect_all(&self, text: &str) -> Vec<(Language, f64)> {
        self.detector
            .detect(text)
            .map(|info| (Language::from_iso3(info.lang().code()), info.confidence()))
            .filter(|(language, _)| language.is_concrete())
            .into_iter()
            .collect()
    }
}
