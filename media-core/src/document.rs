//! # Documento: Estrutura Compartilhada do Pipeline
//!
//! O [`Document`] é o contêiner mutável que atravessa o pipeline. Ele nasce do
//! texto bruto + idioma, é mutado no lugar por cada analisador (na ordem do
//! pipeline) e passa a ser somente leitura quando o pipeline termina.
//!
//! ## Invariantes
//!
//! - Os tokens são produzidos **uma única vez** pelo tokenizador e nunca reordenados.
//! - Cada [`Span`] (sentença) cobre um intervalo contíguo de tokens.
//! - Cada [`Entity`] referencia um intervalo contíguo `start_token..=end_token`
//!   dentro de um único span.
//! - Analisadores posteriores nunca removem entidades de analisadores anteriores.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::language::Language;

/// Classes gramaticais no esquema Universal Dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PartOfSpeech {
    Adj,
    Adp,
    Adv,
    Aux,
    Cconj,
    Det,
    Intj,
    Noun,
    Num,
    Part,
    Pron,
    Propn,
    Punct,
    Sconj,
    Sym,
    Verb,
    X,
}

impl PartOfSpeech {
    /// Rótulo UD (ex: "PROPN").
    pub fn label(&self) -> &'static str {
        match self {
            PartOfSpeech::Adj => "ADJ",
            PartOfSpeech::Adp => "ADP",
            PartOfSpeech::Adv => "ADV",
            PartOfSpeech::Aux => "AUX",
            PartOfSpeech::Cconj => "CCONJ",
            PartOfSpeech::Det => "DET",
            PartOfSpeech::Intj => "INTJ",
            PartOfSpeech::Noun => "NOUN",
            PartOfSpeech::Num => "NUM",
            PartOfSpeech::Part => "PART",
            PartOfSpeech::Pron => "PRON",
            PartOfSpeech::Propn => "PROPN",
            PartOfSpeech::Punct => "PUNCT",
            PartOfSpeech::Sconj => "SCONJ",
            PartOfSpeech::Sym => "SYM",
            PartOfSpeech::Verb => "VERB",
            PartOfSpeech::X => "X",
        }
    }

    /// Classes que não carregam conteúdo lexical (ignoradas pelo modelo de tópicos).
    pub fn is_function_word(&self) -> bool {
        matches!(
            self,
            PartOfSpeech::Adp
                | PartOfSpeech::Aux
                | PartOfSpeech::Cconj
                | PartOfSpeech::Det
                | PartOfSpeech::Part
                | PartOfSpeech::Pron
                | PartOfSpeech::Punct
                | PartOfSpeech::Sconj
                | PartOfSpeech::Sym
                | PartOfSpeech::Num
        )
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Um token extraído do texto original.
///
/// Mantém a posição exata (`start`/`end`, em bytes) no texto bruto para que a
/// forma de superfície das entidades seja recortada do original sem alterar a
/// formatação.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// O texto do token (ex: "Amazon", ",", "company").
    pub text: String,
    /// Classe gramatical atribuída pelo tokenizador.
    pub pos: PartOfSpeech,
    /// Índice do span (sentença) ao qual o token pertence.
    pub span_index: usize,
    /// Índice de byte inicial no texto original (inclusive).
    pub start: usize,
    /// Índice de byte final no texto original (exclusivo).
    pub end: usize,
    /// Índice sequencial do token no documento.
    pub index: usize,
}

/// Região contígua da sequência de tokens (uma sentença).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub index: usize,
    /// Primeiro token (inclusive).
    pub start_token: usize,
    /// Último token (inclusive).
    pub end_token: usize,
}

impl Span {
    /// Número de tokens do span (sempre ≥ 1).
    pub fn token_count(&self) -> usize {
        self.end_token + 1 - self.start_token
    }

    pub fn token_range(&self) -> std::ops::Range<usize> {
        self.start_token..self.end_token + 1
    }
}

/// Uma entidade identificada por um analisador.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Forma de superfície no texto original (ex: "a company").
    pub text: String,
    /// Tipo da entidade (ex: "IsA", "Person", "ProgrammingLanguage").
    pub entity_type: String,
    /// Índice do primeiro token.
    pub start_token: usize,
    /// Índice do último token (inclusivo).
    pub end_token: usize,
    /// Span que contém a entidade.
    pub span_index: usize,
    /// Nome do analisador que produziu a entidade.
    pub source: String,
}

impl Entity {
    pub fn covers(&self, token_index: usize) -> bool {
        self.start_token <= token_index && token_index <= self.end_token
    }

    pub fn token_len(&self) -> usize {
        self.end_token + 1 - self.start_token
    }
}

/// O documento que atravessa o pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub raw_text: String,
    pub language: Language,
    pub tokens: Vec<Token>,
    pub spans: Vec<Span>,
    pub entities: Vec<Entity>,
}

impl Document {
    pub fn new(raw_text: impl Into<String>, language: Language) -> Self {
        Self {
            raw_text: raw_text.into(),
            language,
            tokens: Vec::new(),
            spans: Vec::new(),
            entities: Vec::new(),
        }
    }

    /// `true` se o tokenizador já rodou sobre este documento.
    pub fn is_tokenized(&self) -> bool {
        !self.tokens.is_empty()
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Tokens do span indicado.
    pub fn span_tokens(&self, span: &Span) -> &[Token] {
        &self.tokens[span.token_range()]
    }

    /// Recorta do texto original a forma de superfície dos tokens `start..=end`.
    pub fn surface(&self, start_token: usize, end_token: usize) -> String {
        match (self.tokens.get(start_token), self.tokens.get(end_token)) {
            (Some(first), Some(last)) if first.start <= last.end => {
                self.raw_text[first.start..last.end].trim().to_string()
            }
            _ => String::new(),
        }
    }

    /// Adiciona uma entidade, validando que ela fica dentro de um único span.
    pub fn add_entity(&mut self, entity: Entity) -> Result<()> {
        if entity.start_token > entity.end_token || entity.end_token >= self.tokens.len() {
            return Err(AnalysisError::invalid_argument(format!(
                "entity '{}' has invalid token range {}..={}",
                entity.text, entity.start_token, entity.end_token
            )));
        }
        let same_span = self.tokens[entity.start_token].span_index == entity.span_index
            && self.tokens[entity.end_token].span_index == entity.span_index;
        if !same_span {
            return Err(AnalysisError::invalid_argument(format!(
                "entity '{}' crosses a span boundary",
                entity.text
            )));
        }
        self.entities.push(entity);
        Ok(())
    }

    /// Entidades que cobrem o token indicado, em ordem de inserção.
    pub fn entities_covering(&self, token_index: usize) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(move |e| e.covers(token_index))
    }

    /// Renderiza os tokens separados por espaço.
    ///
    /// Com `merge_entities`, os tokens de uma mesma entidade viram uma única
    /// forma de superfície unida por `_` (ex: "Amazon is a_company"). Quando
    /// entidades se sobrepõem, vence a mais longa que começa primeiro.
    pub fn tokenized_value(&self, merge_entities: bool) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(self.tokens.len());
        let mut i = 0;

        while i < self.tokens.len() {
            let longest = if merge_entities {
                self.entities
                    .iter()
                    .filter(|e| e.start_token == i)
                    .max_by_key(|e| e.token_len())
            } else {
                None
            };

            match longest {
                Some(entity) => {
                    let merged: Vec<&str> = self.tokens[entity.start_token..=entity.end_token]
                        .iter()
                        .map(|t| t.text.as_str())
                        .collect();
                    parts.push(merged.join("_"));
                    i = entity.end_token + 1;
                }
                None => {
                    parts.push(self.tokens[i].text.clone());
                    i += 1;
                }
            }
        }

        parts.join(" ")
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::tagged_document;
    use super::*;

    fn is_a_document() -> Document {
        tagged_document(&[
            ("Amazon", PartOfSpeech::Propn),
            ("is", PartOfSpeech::Verb),
            ("a", PartOfSpeech::Det),
            ("company", PartOfSpeech::Noun),
        ])
    }

    #[test]
    fn test_surface_uses_original_offsets() {
        let doc = is_a_document();
        assert_eq!(doc.surface(2, 3), "a company");
        assert_eq!(doc.surface(7, 9), "");
    }

    #[test]
    fn test_tokenized_value_merges_entities() {
        let mut doc = is_a_document();
        doc.add_entity(Entity {
            text: "a company".into(),
            entity_type: "IsA".into(),
            start_token: 2,
            end_token: 3,
            span_index: 0,
            source: "test".into(),
        })
        .unwrap();

        assert_eq!(doc.tokenized_value(false), "Amazon is a company");
        assert_eq!(doc.tokenized_value(true), "Amazon is a_company");
    }

    #[test]
    fn test_add_entity_rejects_bad_range() {
        let mut doc = is_a_document();
        let bad = Entity {
            text: "x".into(),
            entity_type: "X".into(),
            start_token: 3,
            end_token: 1,
            span_index: 0,
            source: "test".into(),
        };
        assert!(doc.add_entity(bad).is_err());
        assert!(doc.entities.is_empty());
    }
}
