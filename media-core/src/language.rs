//! # Idiomas Suportados
//!
//! Etiqueta de idioma carregada por cada [`Document`](crate::document::Document)
//! e devolvida pelos detectores de idioma. `Any` marca recursos independentes de
//! idioma (ex: gazetteers); `Unknown` é a resposta explícita de um detector sem
//! confiança suficiente.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Etiqueta de idioma.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    English,
    Portuguese,
    Spanish,
    French,
    German,
    Italian,
    Dutch,
    Indonesian,
    /// Recurso válido para qualquer idioma.
    Any,
    /// Idioma não identificado (confiança abaixo do limiar).
    Unknown,
}

impl Language {
    /// Idiomas concretos (exclui `Any` e `Unknown`), em ordem estável.
    pub const SUPPORTED: [Language; 8] = [
        Language::English,
        Language::Portuguese,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Italian,
        Language::Dutch,
        Language::Indonesian,
    ];

    /// Código ISO 639-1 (ex: "en"). `Any` → "any", `Unknown` → "unknown".
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Portuguese => "pt",
            Language::Spanish => "es",
            Language::French => "fr",
            Language::German => "de",
            Language::Italian => "it",
            Language::Dutch => "nl",
            Language::Indonesian => "id",
            Language::Any => "any",
            Language::Unknown => "unknown",
        }
    }

    /// Mapeia códigos ISO 639-3 (os usados pelo `whatlang`) para a etiqueta.
    pub fn from_iso3(code: &str) -> Language {
        match code {
            "eng" => Language::English,
            "por" => Language::Portuguese,
            "spa" => Language::Spanish,
            "fra" => Language::French,
            "deu" => Language::German,
            "ita" => Language::Italian,
            "nld" => Language::Dutch,
            "ind" => Language::Indonesian,
            _ => Language::Unknown,
        }
    }

    /// Aceita códigos ISO 639-1, 639-3 ou o nome em inglês, sem diferenciar caixa.
    pub fn parse(s: &str) -> Option<Language> {
        let lower = s.trim().to_lowercase();
        let lang = match lower.as_str() {
            "en" | "eng" | "english" => Language::English,
            "pt" | "por" | "portuguese" => Language::Portuguese,
            "es" | "spa" | "spanish" => Language::Spanish,
            "fr" | "fra" | "french" => Language::French,
            "de" | "deu" | "german" => Language::German,
            "it" | "ita" | "italian" => Language::Italian,
            "nl" | "nld" | "dutch" => Language::Dutch,
            "id" | "ind" | "indonesian" => Language::Indonesian,
            "any" => Language::Any,
            "unknown" => Language::Unknown,
            _ => return None,
        };
        Some(lang)
    }

    /// `true` para etiquetas de idioma concreto.
    pub fn is_concrete(&self) -> bool {
        !matches!(self, Language::Any | Language::Unknown)
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::English
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Language::English => "English",
            Language::Portuguese => "Portuguese",
            Language::Spanish => "Spanish",
            Language::French => "French",
            Language::German => "German",
            Language::Italian => "Italian",
            Language::Dutch => "Dutch",
            Language::Indonesian => "Indonesian",
            Language::Any => "Any",
            Language::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_codes_and_names() {
        assert_eq!(Language::parse("en"), Some(Language::English));
        assert_eq!(Language::parse("POR"), Some(Language::Portuguese));
        assert_eq!(Language::parse("Indonesian"), Some(Language::Indonesian));
        assert_eq!(Language::parse("klingon"), None);
    }

    #[test]
    fn test_iso3_mapping() {
        assert_eq!(Language::from_iso3("deu"), Language::German);
        assert_eq!(Language::from_iso3("jpn"), Language::Unknown);
    }
}
