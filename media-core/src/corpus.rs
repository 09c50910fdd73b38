//! # Corpus em Inglês com Anotações BIO
//!
//! Pequeno corpus anotado manualmente, usado para treinar o reconhecedor
//! estatístico de exemplo e pelos testes. Cada sentença traz pares
//! (palavra, rótulo BIO) com os tipos `Person`, `Organization` e `Location`.
//!
//! O formato BIO (Begin, Inside, Outside):
//! - **B-Tipo**: início de uma entidade.
//! - **I-Tipo**: continuação da entidade iniciada pelo B anterior.
//! - **O**: fora de qualquer entidade.

use serde::{Deserialize, Serialize};

/// Uma sentença anotada no formato BIO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedSentence {
    /// O texto da sentença (palavras unidas por espaço).
    pub text: String,
    /// Domínio temático (economia, política, tecnologia...).
    pub domain: String,
    /// Pares (palavra, rótulo BIO). Ex: `("Obama", "B-Person")`.
    pub annotations: Vec<(String, String)>,
}

impl AnnotatedSentence {
    pub fn new(domain: &str, annotations: &[(&str, &str)]) -> Self {
        let words: Vec<&str> = annotations.iter().map(|(w, _)| *w).collect();
        Self {
            text: words.join(" "),
            domain: domain.to_string(),
            annotations: annotations.iter().map(|(w, l)| (w.to_string(), l.to_string())).collect(),
        }
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.annotations.iter().map(|(w, _)| w.as_str())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.annotations.iter().map(|(_, l)| l.as_str())
    }
}

/// Corpus de treino em inglês.
pub fn english_corpus() -> Vec<AnnotatedSentence> {
    vec![
        // ===== ECONOMIA =====
        AnnotatedSentence::new(
            "economy",
            &[
                ("Amazon", "B-Organization"), ("opened", "O"), ("a", "O"), ("new", "O"),
                ("office", "O"), ("in", "O"), ("Seattle", "B-Location"), (".", "O"),
            ],
        ),
        AnnotatedSentence::new(
            "economy",
            &[
                ("Shares", "O"), ("of", "O"), ("Apple", "B-Organization"), ("rose", "O"),
                ("in", "O"), ("New", "B-Location"), ("York", "I-Location"), ("today", "O"), (".", "O"),
            ],
        ),
        AnnotatedSentence::new(
            "economy",
            &[
                ("Tim", "B-Person"), ("Cook", "I-Person"), ("said", "O"), ("Apple", "B-Organization"),
                ("will", "O"), ("invest", "O"), ("in", "O"), ("China", "B-Location"), (".", "O"),
            ],
        ),
        AnnotatedSentence::new(
            "economy",
            &[
                ("The", "O"), ("European", "B-Organization"), ("Central", "I-Organization"),
                ("Bank", "I-Organization"), ("raised", "O"), ("rates", "O"), ("in", "O"),
                ("Frankfurt", "B-Location"), (".", "O"),
            ],
        ),
        AnnotatedSentence::new(
            "economy",
            &[
                ("Warren", "B-Person"), ("Buffett", "I-Person"), ("bought", "O"), ("shares", "O"),
                ("of", "O"), ("Coca-Cola", "B-Organization"), (".", "O"),
            ],
        ),
        AnnotatedSentence::new(
            "economy",
            &[
                ("Microsoft", "B-Organization"), ("reported", "O"), ("strong", "O"), ("profits", "O"),
                ("this", "O"), ("quarter", "O"), (".", "O"),
            ],
        ),
        // ===== POLÍTICA =====
        AnnotatedSentence::new(
            "politics",
            &[
                ("Barack", "B-Person"), ("Obama", "I-Person"), ("visited", "O"), ("Paris", "B-Location"),
                ("last", "O"), ("week", "O"), (".", "O"),
            ],
        ),
        AnnotatedSentence::new(
            "politics",
            &[
                ("Angela", "B-Person"), ("Merkel", "I-Person"), ("met", "O"), ("the", "O"),
                ("president", "O"), ("in", "O"), ("Berlin", "B-Location"), (".", "O"),
            ],
        ),
        AnnotatedSentence::new(
            "politics",
            &[
                ("The", "O"), ("United", "B-Organization"), ("Nations", "I-Organization"),
                ("held", "O"), ("a", "O"), ("meeting", "O"), ("in", "O"), ("Geneva", "B-Location"), (".", "O"),
            ],
        ),
        AnnotatedSentence::new(
            "politics",
            &[
                ("President", "O"), ("Lula", "B-Person"), ("traveled", "O"), ("to", "O"),
                ("London", "B-Location"), ("on", "O"), ("Monday", "O"), (".", "O"),
            ],
        ),
        AnnotatedSentence::new(
            "politics",
            &[
                ("Emmanuel", "B-Person"), ("Macron", "I-Person"), ("spoke", "O"), ("with", "O"),
                ("reporters", "O"), ("in", "O"), ("Brussels", "B-Location"), (".", "O"),
            ],
        ),
        // ===== TECNOLOGIA =====
        AnnotatedSentence::new(
            "technology",
            &[
                ("Google", "B-Organization"), ("hired", "O"), ("engineers", "O"), ("in", "O"),
                ("Zurich", "B-Location"), (".", "O"),
            ],
        ),
        AnnotatedSentence::new(
            "technology",
            &[
                ("Linus", "B-Person"), ("Torvalds", "I-Person"), ("created", "O"), ("Linux", "O"),
                ("in", "O"), ("Helsinki", "B-Location"), (".", "O"),
            ],
        ),
        AnnotatedSentence::new(
            "technology",
            &[
                ("Satya", "B-Person"), ("Nadella", "I-Person"), ("leads", "O"),
                ("Microsoft", "B-Organization"), ("from", "O"), ("Redmond", "B-Location"), (".", "O"),
            ],
        ),
        AnnotatedSentence::new(
            "technology",
            &[
                ("Engineers", "O"), ("at", "O"), ("IBM", "B-Organization"), ("built", "O"),
                ("a", "O"), ("quantum", "O"), ("computer", "O"), (".", "O"),
            ],
        ),
        // ===== ESPORTES =====
        AnnotatedSentence::new(
            "sports",
            &[
                ("Lionel", "B-Person"), ("Messi", "I-Person"), ("scored", "O"), ("twice", "O"),
                ("for", "O"), ("Inter", "B-Organization"), ("Miami", "I-Organization"), (".", "O"),
            ],
        ),
        AnnotatedSentence::new(
            "sports",
            &[
                ("Serena", "B-Person"), ("Williams", "I-Person"), ("won", "O"), ("the", "O"),
                ("final", "O"), ("in", "O"), ("Melbourne", "B-Location"), (".", "O"),
            ],
        ),
        AnnotatedSentence::new(
            "sports",
            &[
                ("Real", "B-Organization"), ("Madrid", "I-Organization"), ("beat", "O"),
                ("Barcelona", "B-Organization"), ("in", "O"), ("Spain", "B-Location"), (".", "O"),
            ],
        ),
        AnnotatedSentence::new(
            "sports",
            &[
                ("The", "O"), ("team", "O"), ("flew", "O"), ("to", "O"), ("Tokyo", "B-Location"),
                ("after", "O"), ("the", "O"), ("game", "O"), (".", "O"),
            ],
        ),
        // ===== CIÊNCIA =====
        AnnotatedSentence::new(
            "science",
            &[
                ("Researchers", "O"), ("at", "O"), ("Oxford", "B-Organization"),
                ("University", "I-Organization"), ("published", "O"), ("a", "O"), ("study", "O"), (".", "O"),
            ],
        ),
        AnnotatedSentence::new(
            "science",
            &[
                ("Marie", "B-Person"), ("Curie", "I-Person"), ("worked", "O"), ("in", "O"),
                ("Paris", "B-Location"), ("for", "O"), ("years", "O"), (".", "O"),
            ],
        ),
        AnnotatedSentence::new(
            "science",
            &[
                ("NASA", "B-Organization"), ("launched", "O"), ("a", "O"), ("rocket", "O"),
                ("from", "O"), ("Florida", "B-Location"), (".", "O"),
            ],
        ),
    ]
}

/// Textos de demonstração para a interface web: (título, texto).
pub fn demo_texts() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "Economy",
            "Amazon is a company. Shares of Apple rose in New York today, while Microsoft reported strong profits. Warren Buffett said the market is calm.",
        ),
        (
            "Politics",
            "Barack Obama visited Paris last week. Angela Merkel met the president in Berlin before the United Nations meeting in Geneva.",
        ),
        (
            "Technology",
            "Rust is a language. Linus Torvalds created Linux in Helsinki, and Google hired engineers in Zurich to work on Visual Basic tooling and C++ compilers.",
        ),
        (
            "Sports",
            "Lionel Messi scored twice for Inter Miami. Serena Williams won the final in Melbourne and the team flew to Tokyo after the game.",
        ),
        (
            "Science",
            "Marie Curie worked in Paris for years. NASA launched a rocket from Florida and researchers at Oxford University published a study.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corpus_labels_are_well_formed() {
        for sentence in english_corpus() {
            let labels: Vec<&str> = sentence.labels().collect();
            for (i, label) in labels.iter().enumerate() {
                assert!(
                    *label == "O" || label.starts_with("B-") || label.starts_with("I-"),
                    "bad label {label}"
                );
                // Todo I-Tipo segue um B-Tipo ou I-Tipo do mesmo tipo
                if let Some(kind) = label.strip_prefix("I-") {
                    let prev = labels[i - 1];
                    assert!(prev.ends_with(kind) && prev != "O", "orphan {label} in '{}'", sentence.text);
                }
            }
        }
    }

    #[test]
    fn test_text_joins_words() {
        let sentence = AnnotatedSentence::new("test", &[("Hello", "O"), ("Paris", "B-Location")]);
        assert_eq!(sentence.text, "Hello Paris");
        assert_eq!(sentence.words().collect::<Vec<_>>(), vec!["Hello", "Paris"]);
    }
}
