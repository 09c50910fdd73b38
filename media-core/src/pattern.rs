//! # Pattern Spotter: "Regex" sobre Tokens
//!
//! Reconhecimento de entidades por padrões declarativos que operam sobre a
//! forma **tokenizada** do texto (não sobre caracteres). Um [`Pattern`] é uma
//! sequência de [`PatternUnit`]s; cada unidade casa com um token por:
//!
//! - texto literal (uma lista de alternativas, opcionalmente sem caixa);
//! - classe gramatical (conjunto de POS aceitas);
//! - tipo de entidade já presente no documento.
//!
//! ## Semântica de Casamento
//!
//! - `Single` casa exatamente um token; `Multiple` casa a **maior** sequência
//!   contígua (≥ 1) de tokens que satisfazem a unidade.
//! - Casamento guloso, da esquerda para a direita, **sem backtracking**: um
//!   `Multiple` nunca devolve tokens para a unidade seguinte.
//! - Em um casamento completo emite-se uma entidade com `capture_tag` e a busca
//!   continua após o último token casado; caso contrário avança-se um token.
//! - Cada padrão é avaliado de forma independente sobre a sequência original de
//!   tokens e sobre as entidades existentes **antes** do spotter rodar.
//! - Casamentos nunca atravessam fronteiras de sentença.
//! - Unidades de **contexto** ([`PatternUnit::as_context`]) precisam casar, mas
//!   ficam fora da entidade emitida (como um lookbehind de regex): o padrão
//!   `context("is") + Multiple(DET|NOUN)` marca "a company" em
//!   "Amazon is a company". Sem unidades de contexto, a entidade cobre todos
//!   os tokens consumidos.
//!
//! ## Exemplo
//!
//! ```rust
//! use media_core::document::PartOfSpeech;
//! use media_core::language::Language;
//! use media_core::pattern::{PatternSpotter, PatternUnit};
//!
//! let mut spotter = PatternSpotter::new(Language::English, "is-a-pattern", "IsA");
//! spotter
//!     .new_pattern(
//!         "Is+Noun",
//!         vec![
//!             PatternUnit::single().with_token("is").with_pos(&[PartOfSpeech::Verb]),
//!             PatternUnit::multiple().with_pos(&[PartOfSpeech::Noun, PartOfSpeech::Det]),
//!         ],
//!     )
//!     .unwrap();
//! assert_eq!(spotter.patterns().len(), 1);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analyzer::{Analyzer, Capabilities};
use crate::document::{Document, Entity, PartOfSpeech, Span, Token};
use crate::error::{AnalysisError, Result};
use crate::language::Language;

/// Quantos tokens uma unidade consome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitMode {
    /// Exatamente um token.
    Single,
    /// A maior sequência contígua (≥ 1).
    Multiple,
}

/// Uma unidade de padrão: um predicado sobre tokens.
///
/// Restrições ausentes (`None`) aceitam qualquer token; as presentes são
/// combinadas com E lógico.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternUnit {
    pub mode: UnitMode,
    /// Alternativas literais do texto do token.
    pub tokens: Option<Vec<String>>,
    /// Classes gramaticais aceitas.
    pub pos: Option<Vec<PartOfSpeech>>,
    /// O token deve estar coberto por uma entidade deste tipo.
    pub entity_type: Option<String>,
    /// `false` para unidades de contexto (casam, mas não entram na entidade).
    #[serde(default = "default_capture")]
    pub capture: bool,
}

fn default_capture() -> bool {
    true
}

impl PatternUnit {
    pub fn single() -> Self {
        Self::with_mode(UnitMode::Single)
    }

    pub fn multiple() -> Self {
        Self::with_mode(UnitMode::Multiple)
    }

    fn with_mode(mode: UnitMode) -> Self {
        Self { mode, tokens: None, pos: None, entity_type: None, capture: true }
    }

    /// Acrescenta uma alternativa literal.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.tokens.get_or_insert_with(Vec::new).push(token.into());
        self
    }

    pub fn with_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokens.get_or_insert_with(Vec::new).extend(tokens.into_iter().map(Into::into));
        self
    }

    pub fn with_pos(mut self, pos: &[PartOfSpeech]) -> Self {
        self.pos.get_or_insert_with(Vec::new).extend_from_slice(pos);
        self
    }

    pub fn with_entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    /// Marca a unidade como contexto: ela precisa casar, mas seus tokens não
    /// entram na entidade emitida.
    pub fn as_context(mut self) -> Self {
        self.capture = false;
        self
    }

    fn accepts(&self, token: &Token, ignore_case: bool, prior_entities: &[Entity]) -> bool {
        if let Some(literals) = &self.tokens {
            let hit = if ignore_case {
                literals.iter().any(|l| l.to_lowercase() == token.text.to_lowercase())
            } else {
                literals.iter().any(|l| *l == token.text)
            };
            if !hit {
                return false;
            }
        }

        if let Some(tags) = &self.pos {
            if !tags.contains(&token.pos) {
                return false;
            }
        }

        if let Some(wanted) = &self.entity_type {
            let covered = prior_entities
                .iter()
                .any(|e| e.covers(token.index) && e.entity_type == *wanted);
            if !covered {
                return false;
            }
        }

        true
    }
}

struct PatternMatch {
    entity_start: usize,
    entity_end: usize,
    consumed_end: usize,
}

/// Padrão nomeado: sequência não vazia de unidades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub name: String,
    pub units: Vec<PatternUnit>,
}

impl Pattern {
    pub fn new(name: impl Into<String>, units: Vec<PatternUnit>) -> Result<Self> {
        let name = name.into();
        if units.is_empty() {
            return Err(AnalysisError::invalid_argument(format!("pattern '{name}' has no units")));
        }
        Ok(Self { name, units })
    }

    /// Tenta casar o padrão começando em `start`, sem passar de `last`.
    ///
    /// Devolve o último token consumido e o intervalo capturado.
    fn match_at(
        &self,
        tokens: &[Token],
        start: usize,
        last: usize,
        ignore_case: bool,
        prior_entities: &[Entity],
    ) -> Option<PatternMatch> {
        let mut pos = start;
        let mut captured: Option<(usize, usize)> = None;

        for unit in &self.units {
            let unit_start = pos;
            match unit.mode {
                UnitMode::Single => {
                    if pos > last || !unit.accepts(&tokens[pos], ignore_case, prior_entities) {
                        return None;
                    }
                    pos += 1;
                }
                UnitMode::Multiple => {
                    while pos <= last && unit.accepts(&tokens[pos], ignore_case, prior_entities) {
                        pos += 1;
                    }
                    if pos == unit_start {
                        return None;
                    }
                }
            }
            if unit.capture {
                let first = captured.map_or(unit_start, |(first, _)| first);
                captured = Some((first, pos - 1));
            }
        }

        let consumed_end = pos - 1;
        let (entity_start, entity_end) = captured.unwrap_or((start, consumed_end));
        Some(PatternMatch { entity_start, entity_end, consumed_end })
    }

    /// Todos os casamentos do padrão dentro de um span, como intervalos (início, fim)
    /// da entidade.
    fn find_in_span(
        &self,
        tokens: &[Token],
        span: &Span,
        ignore_case: bool,
        prior_entities: &[Entity],
    ) -> Vec<(usize, usize)> {
        let mut found = Vec::new();
        let mut i = span.start_token;

        while i <= span.end_token {
            match self.match_at(tokens, i, span.end_token, ignore_case, prior_entities) {
                Some(m) => {
                    found.push((m.entity_start, m.entity_end));
                    i = m.consumed_end + 1;
                }
                None => i += 1,
            }
        }

        found
    }
}

/// Analisador que aplica um conjunto de padrões e marca os casamentos.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternSpotter {
    pub language: Language,
    /// Nome do analisador (vira `Entity::source`).
    pub tag: String,
    /// Tipo atribuído às entidades emitidas.
    pub capture_tag: String,
    /// Casamento literal sem diferenciar caixa (não afeta POS nem tipos).
    pub ignore_case: bool,
    patterns: Vec<Pattern>,
}

impl PatternSpotter {
    pub fn new(language: Language, tag: impl Into<String>, capture_tag: impl Into<String>) -> Self {
        Self {
            language,
            tag: tag.into(),
            capture_tag: capture_tag.into(),
            ignore_case: false,
            patterns: Vec::new(),
        }
    }

    pub fn with_ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    /// Registra um novo padrão.
    pub fn new_pattern(&mut self, name: impl Into<String>, units: Vec<PatternUnit>) -> Result<()> {
        self.patterns.push(Pattern::new(name, units)?);
        Ok(())
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Procura todos os casamentos sem mutar o documento.
    ///
    /// Devolve `(padrão, início, fim)` na ordem de avaliação dos padrões.
    pub fn find_matches<'a>(&'a self, document: &Document) -> Vec<(&'a str, usize, usize)> {
        let mut matches = Vec::new();
        for pattern in &self.patterns {
            for span in &document.spans {
                for (start, end) in
                    pattern.find_in_span(&document.tokens, span, self.ignore_case, &document.entities)
                {
                    matches.push((pattern.name.as_str(), start, end));
                }
            }
        }
        matches
    }
}

impl Analyzer for PatternSpotter {
    fn name(&self) -> &str {
        &self.tag
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::token_reader()
    }

    fn apply(&self, document: &mut Document) -> Result<()> {
        // Todos os padrões enxergam o mesmo estado anterior ao spotter
        let matches = self.find_matches(document);
        debug!(spotter = %self.tag, matches = matches.len(), "patterns evaluated");

        for (pattern, start, end) in matches {
            let entity = Entity {
                text: document.surface(start, end),
                entity_type: self.capture_tag.clone(),
                start_token: start,
                end_token: end,
                span_index: document.tokens[start].span_index,
                source: self.tag.clone(),
            };
            debug!(pattern, entity = %entity.text, "pattern matched");
            document.add_entity(entity)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::test_support::tagged_document;
    use PartOfSpeech::*;

    fn is_a_spotter() -> PatternSpotter {
        let mut spotter = PatternSpotter::new(Language::English, "is-a-pattern", "IsA");
        spotter
            .new_pattern(
                "Is+Noun",
                vec![
                    PatternUnit::single().with_token("is").with_pos(&[Verb]),
                    PatternUnit::multiple().with_pos(&[Noun, Propn, Aux, Det, Adj]),
                ],
            )
            .unwrap();
        spotter
    }

    #[test]
    fn test_is_a_covers_whole_run() {
        let mut doc = tagged_document(&[("is", Verb), ("a", Det), ("cat", Noun)]);
        is_a_spotter().apply(&mut doc).unwrap();

        assert_eq!(doc.entities.len(), 1);
        let e = &doc.entities[0];
        assert_eq!((e.start_token, e.end_token), (0, 2));
        assert_eq!(e.text, "is a cat");
        assert_eq!(e.entity_type, "IsA");
        assert_eq!(e.source, "is-a-pattern");
    }

    #[test]
    fn test_no_match_without_following_run() {
        let mut doc = tagged_document(&[("it", Pron), ("is", Verb), ("quickly", Adv)]);
        is_a_spotter().apply(&mut doc).unwrap();
        assert!(doc.entities.is_empty());
    }

    #[test]
    fn test_matches_do_not_overlap() {
        let mut spotter = PatternSpotter::new(Language::English, "nouns", "NounRun");
        spotter.new_pattern("nouns", vec![PatternUnit::multiple().with_pos(&[Noun])]).unwrap();

        let mut doc = tagged_document(&[("cat", Noun), ("dog", Noun), ("and", Cconj), ("bird", Noun)]);
        spotter.apply(&mut doc).unwrap();

        let ranges: Vec<_> = doc.entities.iter().map(|e| (e.start_token, e.end_token)).collect();
        assert_eq!(ranges, vec![(0, 1), (3, 3)]);
    }

    #[test]
    fn test_multiple_does_not_backtrack() {
        // Multiple(NOUN) engole "dog", então Single("dog") nunca casa
        let mut spotter = PatternSpotter::new(Language::English, "greedy", "G");
        spotter
            .new_pattern(
                "greedy",
                vec![
                    PatternUnit::multiple().with_pos(&[Noun]),
                    PatternUnit::single().with_token("dog"),
                ],
            )
            .unwrap();

        let mut doc = tagged_document(&[("cat", Noun), ("dog", Noun)]);
        spotter.apply(&mut doc).unwrap();
        assert!(doc.entities.is_empty());
    }

    #[test]
    fn test_match_stops_at_span_boundary() {
        let mut doc = tagged_document(&[("is", Verb), ("a", Det), ("cat", Noun), ("dog", Noun)]);
        // Divide em duas sentenças: [is a cat] [dog]
        doc.spans = vec![
            Span { index: 0, start_token: 0, end_token: 2 },
            Span { index: 1, start_token: 3, end_token: 3 },
        ];
        doc.tokens[3].span_index = 1;

        is_a_spotter().apply(&mut doc).unwrap();
        assert_eq!(doc.entities.len(), 1);
        assert_eq!(doc.entities[0].end_token, 2);
    }

    #[test]
    fn test_entity_type_predicate_uses_prior_entities() {
        let mut doc = tagged_document(&[("Amazon", Propn), ("grew", Verb)]);
        doc.add_entity(Entity {
            text: "Amazon".into(),
            entity_type: "Location".into(),
            start_token: 0,
            end_token: 0,
            span_index: 0,
            source: "recognizer".into(),
        })
        .unwrap();

        let mut spotter = PatternSpotter::new(Language::English, "places", "Place");
        spotter
            .new_pattern("loc", vec![PatternUnit::single().with_token("Amazon").with_entity_type("Location")])
            .unwrap();
        spotter.apply(&mut doc).unwrap();

        assert_eq!(doc.entities.len(), 2);
        assert_eq!(doc.entities[1].entity_type, "Place");
        // A entidade anterior permanece
        assert_eq!(doc.entities[0].entity_type, "Location");
    }

    #[test]
    fn test_context_unit_is_left_out_of_entity() {
        let mut spotter = PatternSpotter::new(Language::English, "is-a-pattern", "IsA");
        spotter
            .new_pattern(
                "Is+Noun",
                vec![
                    PatternUnit::single().with_token("is").with_pos(&[Verb]).as_context(),
                    PatternUnit::multiple().with_pos(&[Noun, Propn, Aux, Det, Adj]),
                ],
            )
            .unwrap();

        let mut doc = tagged_document(&[("Amazon", Propn), ("is", Verb), ("a", Det), ("company", Noun)]);
        spotter.apply(&mut doc).unwrap();

        assert_eq!(doc.entities.len(), 1);
        assert_eq!(doc.entities[0].text, "a company");
        assert_eq!((doc.entities[0].start_token, doc.entities[0].end_token), (2, 3));
    }

    #[test]
    fn test_empty_pattern_is_rejected() {
        let mut spotter = PatternSpotter::new(Language::English, "x", "X");
        assert!(spotter.new_pattern("empty", vec![]).is_err());
    }
}
