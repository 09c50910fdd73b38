//! # Tokenizador Sensível ao Idioma
//!
//! Divide o texto bruto em tokens (palavras, números, pontuações), agrupa-os em
//! sentenças ([`Span`]) e atribui a classe gramatical de cada token via
//! [`pos::tag_sentence`](crate::pos::tag_sentence).
//!
//! ## Esquema de Tokenização
//!
//! 1. Segmentação de palavras UAX #29 (`unicode-segmentation`): "Amazon's",
//!    "3.14" e "U.S" já saem como uma única unidade.
//! 2. Abreviações do idioma absorvem o ponto seguinte ("Dr." + "Silva").
//! 3. Palavras unidas por hífen sem espaço viram um token ("e-mail", "curou-se").
//! 4. `.`, `!`, `?` e `…` encerram a sentença corrente.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use media_core::language::Language;
//! use media_core::tokenizer::tokenize;
//!
//! let (tokens, spans) = tokenize("Dr. Smith works at Amazon. It is big.", Language::English);
//! assert_eq!(tokens[0].text, "Dr.");
//! assert_eq!(spans.len(), 2);
//! ```

use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

use crate::analyzer::{Analyzer, Capabilities};
use crate::document::{Document, PartOfSpeech, Span, Token};
use crate::error::Result;
use crate::language::Language;
use crate::pos::tag_sentence;

/// Abreviações em inglês que não devem ter o ponto tratado como fim de sentença
const ENGLISH_ABBREVIATIONS: &[&str] = &[
    "Mr", "Mrs", "Ms", "Dr", "Prof", "Sr", "Jr", "St", "Inc", "Ltd", "Co", "Corp",
    "vs", "etc", "Jan", "Feb", "Mar", "Apr", "Aug", "Sep", "Sept", "Oct", "Nov", "Dec",
    "Gen", "Gov", "Sen", "Rep", "Mt", "No", "U.S", "U.K", "e.g", "i.e",
];

/// Abreviações comuns em PT-BR
const PORTUGUESE_ABBREVIATIONS: &[&str] = &[
    "Dr", "Dra", "Sr", "Sra", "Prof", "Profa", "Gov", "Dep", "Sen", "Min",
    "Gen", "Cap", "Sgt", "Cel", "Adm", "Pres", "Eng", "km", "cm", "kg", "etc",
    "art", "pág", "tel", "av", "Av",
];

/// Abreviações partilhadas pelas demais línguas latinas e germânicas
const COMMON_ABBREVIATIONS: &[&str] = &["Dr", "Prof", "Sr", "Sra", "St", "etc", "Nr", "z.B", "M", "Mme"];

fn abbreviations(language: Language) -> &'static [&'static str] {
    match language {
        Language::English | Language::Any | Language::Unknown => ENGLISH_ABBREVIATIONS,
        Language::Portuguese => PORTUGUESE_ABBREVIATIONS,
        _ => COMMON_ABBREVIATIONS,
    }
}

fn is_sentence_terminator(text: &str) -> bool {
    matches!(text, "." | "!" | "?" | "…")
}

fn is_wordlike(text: &str) -> bool {
    text.chars().any(char::is_alphanumeric)
}

/// Tokeniza o texto, devolvendo os tokens (já etiquetados) e as sentenças.
pub fn tokenize(text: &str, language: Language) -> (Vec<Token>, Vec<Span>) {
    let segments: Vec<(usize, &str)> = text
        .split_word_bound_indices()
        .filter(|(_, s)| !s.trim().is_empty())
        .collect();

    let abbrevs = abbreviations(language);
    let mut raw: Vec<(usize, usize)> = Vec::with_capacity(segments.len());
    let mut i = 0;

    while i < segments.len() {
        let (start, seg) = segments[i];
        let end = start + seg.len();

        if let Some(last) = raw.last_mut() {
            let adjacent = last.1 == start;
            let last_text = &text[last.0..last.1];

            // Abreviação: "Dr" + "." → "Dr."
            if adjacent && seg == "." && abbrevs.contains(&last_text) {
                last.1 = end;
                i += 1;
                continue;
            }

            // Hífen interno: "e" + "-" + "mail" → "e-mail"
            if adjacent && seg == "-" && is_wordlike(last_text) {
                if let Some(&(next_start, next_seg)) = segments.get(i + 1) {
                    if next_start == end && is_wordlike(next_seg) {
                        last.1 = next_start + next_seg.len();
                        i += 2;
                        continue;
                    }
                }
            }
        }

        raw.push((start, end));
        i += 1;
    }

    // Monta tokens e delimita sentenças
    let mut tokens: Vec<Token> = Vec::with_capacity(raw.len());
    let mut spans: Vec<Span> = Vec::new();
    let mut span_start = 0usize;

    for (index, (start, end)) in raw.into_iter().enumerate() {
        let token_text = &text[start..end];
        tokens.push(Token {
            text: token_text.to_string(),
            pos: PartOfSpeech::X, // será atribuído pelo etiquetador
            span_index: spans.len(),
            start,
            end,
            index,
        });

        if is_sentence_terminator(token_text) {
            spans.push(Span { index: spans.len(), start_token: span_start, end_token: index });
            span_start = index + 1;
        }
    }
    if span_start < tokens.len() {
        spans.push(Span { index: spans.len(), start_token: span_start, end_token: tokens.len() - 1 });
    }

    for span in &spans {
        tag_sentence(language, &mut tokens[span.token_range()]);
    }

    (tokens, spans)
}

/// Estágio de tokenização do pipeline.
///
/// Um documento já tokenizado passa intacto: os tokens são produzidos uma
/// única vez por documento.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    language: Language,
    name: String,
}

impl Tokenizer {
    pub fn new(language: Language) -> Self {
        Self { language, name: format!("tokenizer:{}", language.code()) }
    }

    pub fn language(&self) -> Language {
        self.language
    }
}

impl Analyzer for Tokenizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::tokenizer()
    }

    fn apply(&self, document: &mut Document) -> Result<()> {
        if document.is_tokenized() {
            debug!(stage = %self.name, "document already tokenized, skipping");
            return Ok(());
        }

        // Um tokenizador `Any` segue o idioma do próprio documento
        let language = if self.language == Language::Any { document.language } else { self.language };
        let (tokens, spans) = tokenize(&document.raw_text, language);
        debug!(tokens = tokens.len(), sentences = spans.len(), "tokenized document");
        document.tokens = tokens;
        document.spans = spans;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_tokenize_basic() {
        let (tokens, spans) = tokenize("Amazon is a company.", Language::English);
        assert_eq!(texts(&tokens), vec!["Amazon", "is", "a", "company", "."]);
        assert_eq!(spans.len(), 1);
        assert_eq!(tokens[3].start, 12);
        assert_eq!(tokens[3].end, 19);
    }

    #[test]
    fn test_abbreviation_keeps_dot() {
        let (tokens, spans) = tokenize("Dr. Smith arrived. He left.", Language::English);
        assert_eq!(tokens[0].text, "Dr.");
        assert_eq!(spans.len(), 2);
        assert_eq!(tokens[4].span_index, 1);
    }

    #[test]
    fn test_portuguese_abbreviation_and_hyphen() {
        let (tokens, _) = tokenize("A Sra. Silva curou-se rapidamente", Language::Portuguese);
        let t = texts(&tokens);
        assert!(t.contains(&"Sra."));
        assert!(t.contains(&"curou-se"));
    }

    #[test]
    fn test_empty_text() {
        let (tokens, spans) = tokenize("   ", Language::English);
        assert!(tokens.is_empty());
        assert!(spans.is_empty());
    }

    #[test]
    fn test_tokenizer_is_idempotent() {
        let tokenizer = Tokenizer::new(Language::English);
        let mut doc = Document::new("Cats are mammals. Dogs too.", Language::English);
        tokenizer.apply(&mut doc).unwrap();
        let first = doc.tokens.clone();

        tokenizer.apply(&mut doc).unwrap();
        assert_eq!(doc.tokens, first);
        assert_eq!(doc.spans.len(), 2);
    }
}
