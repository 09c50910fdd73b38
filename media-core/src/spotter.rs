//! # Spotter: Reconhecimento por Gazetteer
//!
//! Lista de termos conhecidos (ex: linguagens de programação) reconhecidos no
//! texto tokenizado. Cada entrada vira um padrão de unidades `Single` literais,
//! então o spotter herda toda a semântica do [`PatternSpotter`]: casamentos
//! não sobrepostos, dentro de uma sentença, sem remover entidades anteriores.
//!
//! As entradas são tokenizadas com as mesmas regras do texto, de modo que
//! "C++" ou "e-mail" casam exatamente como aparecem no documento.

use serde::{Deserialize, Serialize};

use crate::analyzer::{Analyzer, Capabilities};
use crate::document::Document;
use crate::error::{AnalysisError, Result};
use crate::language::Language;
use crate::pattern::{PatternSpotter, PatternUnit};
use crate::tokenizer::tokenize;

/// Gazetteer construído sobre o [`PatternSpotter`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spotter {
    inner: PatternSpotter,
}

impl Spotter {
    pub fn new(language: Language, tag: impl Into<String>, capture_tag: impl Into<String>) -> Self {
        Self { inner: PatternSpotter::new(language, tag, capture_tag) }
    }

    pub fn set_ignore_case(&mut self, ignore_case: bool) {
        self.inner.ignore_case = ignore_case;
    }

    pub fn ignore_case(&self) -> bool {
        self.inner.ignore_case
    }

    /// Adiciona um termo ao gazetteer.
    pub fn add_entry(&mut self, entry: &str) -> Result<()> {
        let (tokens, _) = tokenize(entry, self.inner.language);
        if tokens.is_empty() {
            return Err(AnalysisError::invalid_argument("gazetteer entry is empty"));
        }
        let units = tokens
            .into_iter()
            .map(|t| PatternUnit::single().with_token(t.text))
            .collect();
        self.inner.new_pattern(entry.trim(), units)
    }

    pub fn entry_count(&self) -> usize {
        self.inner.patterns().len()
    }
}

impl Analyzer for Spotter {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::token_reader()
    }

    fn apply(&self, document: &mut Document) -> Result<()> {
        self.inner.apply(document)
    }
}
