//! # Normalização de Termos
//!
//! Converte os tokens de um documento nos termos usados pelo modelo de tópicos:
//!
//! 1. descarta palavras funcionais (DET, ADP, PRON, PUNCT, NUM...);
//! 2. converte para minúsculas e descarta stopwords do idioma;
//! 3. reduz ao radical com o stemmer Snowball do idioma (`rust-stemmers`).
//!
//! O idioma sem stemmer disponível (indonésio) usa só minúsculas.

use std::collections::HashSet;
use std::fmt;

use rust_stemmers::{Algorithm, Stemmer};

use crate::document::Token;
use crate::language::Language;

const ENGLISH_STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "all", "am", "an", "and", "any", "are", "as", "at",
    "be", "because", "been", "before", "being", "below", "between", "both", "but", "by", "can",
    "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for", "from",
    "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself", "him",
    "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just", "me",
    "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once", "only",
    "or", "other", "our", "ours", "out", "over", "own", "same", "she", "should", "so", "some",
    "such", "than", "that", "the", "their", "them", "then", "there", "these", "they", "this",
    "those", "through", "to", "too", "under", "until", "up", "very", "was", "we", "were", "what",
    "when", "where", "which", "while", "who", "whom", "why", "will", "with", "would", "you",
    "your", "yours", "also", "'s",
];

const PORTUGUESE_STOPWORDS: &[&str] = &[
    "a", "ao", "aos", "as", "até", "com", "como", "da", "das", "de", "dela", "dele", "deles",
    "do", "dos", "e", "é", "ela", "elas", "ele", "eles", "em", "entre", "era", "essa", "esse",
    "esta", "está", "este", "eu", "foi", "há", "isso", "isto", "já", "lhe", "mais", "mas", "me",
    "mesmo", "meu", "minha", "muito", "na", "nas", "não", "nem", "no", "nos", "nós", "num",
    "numa", "o", "os", "ou", "para", "pela", "pelas", "pelo", "pelos", "por", "qual", "quando",
    "que", "quem", "se", "sem", "ser", "seu", "seus", "só", "sua", "suas", "são", "também",
    "te", "tem", "um", "uma", "umas", "uns", "você", "vocês",
];

const SPANISH_STOPWORDS: &[&str] = &[
    "a", "al", "algo", "como", "con", "de", "del", "e", "el", "ella", "ellos", "en", "era",
    "es", "esa", "ese", "esta", "este", "está", "fue", "ha", "la", "las", "le", "les", "lo",
    "los", "más", "me", "mi", "muy", "no", "nos", "o", "para", "pero", "por", "que", "se",
    "sin", "son", "su", "sus", "también", "te", "tu", "un", "una", "y", "ya", "yo",
];

const FRENCH_STOPWORDS: &[&str] = &[
    "à", "au", "aux", "avec", "ce", "ces", "dans", "de", "des", "du", "elle", "en", "est",
    "et", "été", "il", "ils", "je", "la", "le", "les", "leur", "lui", "ma", "mais", "me",
    "mon", "ne", "nous", "on", "ou", "par", "pas", "pour", "qu", "que", "qui", "sa", "se",
    "ses", "son", "sont", "sur", "ta", "te", "tu", "un", "une", "vous", "y",
];

const GERMAN_STOPWORDS: &[&str] = &[
    "aber", "als", "am", "an", "auch", "auf", "aus", "bei", "bin", "bis", "das", "dass", "dem",
    "den", "der", "des", "die", "du", "ein", "eine", "einem", "einen", "einer", "er", "es",
    "für", "hat", "ich", "ihr", "im", "in", "ist", "mit", "nach", "nicht", "noch", "nur",
    "oder", "sich", "sie", "sind", "so", "um", "und", "uns", "von", "war", "was", "wie", "wir",
    "zu", "zum", "zur",
];

const ITALIAN_STOPWORDS: &[&str] = &[
    "a", "ai", "al", "alla", "anche", "che", "chi", "con", "da", "dal", "del", "della", "di",
    "e", "è", "gli", "ha", "il", "in", "io", "la", "le", "lo", "ma", "mi", "nel", "nella",
    "non", "o", "per", "più", "si", "sono", "su", "sua", "suo", "tra", "un", "una", "uno",
];

const DUTCH_STOPWORDS: &[&str] = &[
    "aan", "al", "als", "bij", "dat", "de", "den", "der", "die", "dit", "door", "een", "en",
    "er", "had", "heb", "het", "hij", "ik", "in", "is", "je", "maar", "me", "met", "naar",
    "niet", "nog", "of", "om", "ook", "op", "te", "tot", "uit", "van", "voor", "was", "wat",
    "we", "wij", "zal", "ze", "zich", "zij", "zijn", "zo",
];

const INDONESIAN_STOPWORDS: &[&str] = &[
    "ada", "adalah", "akan", "aku", "dalam", "dan", "dari", "dengan", "di", "dia", "ini",
    "itu", "juga", "ke", "kami", "kita", "mereka", "oleh", "pada", "saya", "sebagai", "sudah",
    "telah", "tidak", "untuk", "yang",
];

fn stopwords(language: Language) -> &'static [&'static str] {
    match language {
        Language::Portuguese => PORTUGUESE_STOPWORDS,
        Language::Spanish => SPANISH_STOPWORDS,
        Language::French => FRENCH_STOPWORDS,
        Language::German => GERMAN_STOPWORDS,
        Language::Italian => ITALIAN_STOPWORDS,
        Language::Dutch => DUTCH_STOPWORDS,
        Language::Indonesian => INDONESIAN_STOPWORDS,
        Language::English | Language::Any | Language::Unknown => ENGLISH_STOPWORDS,
    }
}

fn stemmer_algorithm(language: Language) -> Option<Algorithm> {
    match language {
        Language::English | Language::Any | Language::Unknown => Some(Algorithm::English),
        Language::Portuguese => Some(Algorithm::Portuguese),
        Language::Spanish => Some(Algorithm::Spanish),
        Language::French => Some(Algorithm::French),
        Language::German => Some(Algorithm::German),
        Language::Italian => Some(Algorithm::Italian),
        Language::Dutch => Some(Algorithm::Dutch),
        Language::Indonesian => None,
    }
}

/// Um termo normalizado e a forma de superfície (minúscula) que o originou.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub stem: String,
    pub surface: String,
}

/// Normalizador de termos de um idioma.
pub struct TermNormalizer {
    language: Language,
    stemmer: Option<Stemmer>,
    stopwords: HashSet<&'static str>,
}

impl TermNormalizer {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            stemmer: stemmer_algorithm(language).map(Stemmer::create),
            stopwords: stopwords(language).iter().copied().collect(),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    /// Normaliza um token; `None` se ele não carrega conteúdo.
    pub fn term(&self, token: &Token) -> Option<Term> {
        if token.pos.is_function_word() {
            return None;
        }
        let surface = token.text.to_lowercase();
        if !surface.chars().any(char::is_alphabetic) || self.is_stopword(&surface) {
            return None;
        }
        let stem = match &self.stemmer {
            Some(stemmer) => stemmer.stem(&surface).into_owned(),
            None => surface.clone(),
        };
        Some(Term { stem, surface })
    }

    pub fn terms(&self, tokens: &[Token]) -> Vec<Term> {
        tokens.iter().filter_map(|t| self.term(t)).collect()
    }
}

impl Clone for TermNormalizer {
    fn clone(&self) -> Self {
        // Stemmer não implementa Clone
        Self::new(self.language)
    }
}

impl fmt::Debug for TermNormalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TermNormalizer")
            .field("language", &self.language)
            .field("stemmer", &self.stemmer.is_some())
            .field("stopwords", &self.stopwords.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn stems(text: &str, language: Language) -> Vec<String> {
        let (tokens, _) = tokenize(text, language);
        TermNormalizer::new(language).terms(&tokens).into_iter().map(|t| t.stem).collect()
    }

    #[test]
    fn test_english_content_words() {
        assert_eq!(stems("cats are mammals", Language::English), vec!["cat", "mammal"]);
        assert_eq!(stems("my dog is a mammal too", Language::English), vec!["dog", "mammal"]);
        assert_eq!(stems("markets fell today.", Language::English), vec!["market", "fell", "today"]);
    }

    #[test]
    fn test_surface_form_is_kept() {
        let (tokens, _) = tokenize("Stocks", Language::English);
        let term = TermNormalizer::new(Language::English).term(&tokens[0]).unwrap();
        assert_eq!(term.surface, "stocks");
        assert_eq!(term.stem, "stock");
    }

    #[test]
    fn test_indonesian_has_no_stemmer() {
        assert_eq!(stems("saham naik", Language::Indonesian), vec!["saham", "naik"]);
    }
}
