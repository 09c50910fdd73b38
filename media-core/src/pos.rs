//! # Etiquetador de Classes Gramaticais (léxico + heurísticas)
//!
//! Etiquetador determinístico usado pelo tokenizador. Não pretende competir com
//! um modelo estatístico: combina um léxico de palavras funcionais por idioma
//! com regras ortográficas e de sufixo, o suficiente para alimentar padrões do
//! tipo `Single("is"/VERB) + Multiple(NOUN|DET|ADJ...)`.
//!
//! ## Ordem das Regras
//!
//! 1. Pontuação e símbolos → `PUNCT` / `SYM`
//! 2. Números → `NUM`
//! 3. Léxico fechado do idioma (artigos, preposições, pronomes, auxiliares...)
//! 4. Formas de "ser" (is/are/é/são): `AUX` quando seguidas de verbo, senão `VERB`
//! 5. Palavra capitalizada fora do léxico → `PROPN`
//! 6. Sufixos (`-ly`/`-mente` → ADV, `-ing`/`-ed`/`-ando` → VERB, `-ous`/`-oso` → ADJ)
//! 7. Padrão: `NOUN`

use crate::document::{PartOfSpeech, Token};
use crate::language::Language;

use PartOfSpeech::*;

fn english_lexicon(word: &str) -> Option<PartOfSpeech> {
    let pos = match word {
        "a" | "an" | "the" | "this" | "that" | "these" | "those" | "my" | "your" | "his" | "her"
        | "its" | "our" | "their" | "some" | "any" | "no" | "every" | "each" | "all" | "both" => Det,
        "i" | "you" | "he" | "she" | "it" | "we" | "they" | "me" | "him" | "us" | "them" | "who"
        | "what" | "which" | "myself" | "itself" | "themselves" | "something" | "nothing" => Pron,
        "in" | "on" | "at" | "of" | "for" | "with" | "by" | "from" | "about" | "into" | "over"
        | "under" | "after" | "before" | "between" | "through" | "during" | "without" | "against"
        | "among" | "across" | "behind" | "near" | "since" | "per" | "via" => Adp,
        "and" | "or" | "but" | "nor" | "yet" => Cconj,
        "if" | "because" | "while" | "although" | "though" | "unless" | "whether" | "when"
        | "where" => Sconj,
        "not" | "to" | "'s" => Part,
        "has" | "have" | "had" | "do" | "does" | "did" | "will" | "would" | "can" | "could"
        | "shall" | "should" | "may" | "might" | "must" => Aux,
        "very" | "too" | "also" | "now" | "then" | "here" | "there" | "just" | "still" | "already"
        | "often" | "never" | "always" | "again" | "soon" | "yesterday" | "tomorrow" => Adv,
        "oh" | "wow" | "hello" | "hi" | "yes" => Intj,
        "said" | "made" | "went" | "rose" | "fell" | "took" | "came" | "saw" | "gave" | "found"
        | "told" | "became" | "left" | "began" | "kept" | "held" | "brought" | "bought" | "sold"
        | "won" | "lost" | "grew" | "drove" | "ran" | "knew" | "thought" | "felt" => Verb,
        "good" | "bad" | "big" | "small" | "new" | "old" | "great" | "large" | "little" | "high"
        | "low" | "long" | "short" | "young" | "important" | "public" | "large-scale" => Adj,
        _ => return None,
    };
    Some(pos)
}

fn portuguese_lexicon(word: &str) -> Option<PartOfSpeech> {
    let pos = match word {
        "o" | "a" | "os" | "as" | "um" | "uma" | "uns" | "umas" | "este" | "esta" | "esse"
        | "essa" | "aquele" | "aquela" | "meu" | "minha" | "seu" | "sua" | "nosso" | "nossa" => Det,
        "de" | "em" | "para" | "por" | "com" | "sem" | "sobre" | "entre" | "até" | "desde" | "do"
        | "da" | "dos" | "das" | "no" | "na" | "nos" | "nas" | "ao" | "aos" | "pelo" | "pela"
        | "pelos" | "pelas" | "num" | "numa" | "contra" | "durante" => Adp,
        "e" | "ou" | "mas" | "nem" => Cconj,
        "que" | "se" | "porque" | "quando" | "embora" | "como" => Sconj,
        "eu" | "tu" | "ele" | "ela" | "nós" | "vós" | "eles" | "elas" | "você" | "vocês" | "me"
        | "te" | "lhe" | "isso" | "isto" | "quem" => Pron,
        "tem" | "têm" | "tinha" | "há" | "vai" | "vão" | "pode" | "podem" | "deve" | "devem" => Aux,
        "não" | "muito" | "também" | "já" | "ainda" | "hoje" | "ontem" | "amanhã" | "aqui" | "lá"
        | "sempre" | "nunca" => Adv,
        _ => return None,
    };
    Some(pos)
}

/// Formas do verbo "ser/to be" que podem atuar como cópula (VERB) ou auxiliar (AUX).
fn is_copula(language: Language, word: &str) -> bool {
    match language {
        Language::Portuguese => matches!(word, "é" | "são" | "foi" | "foram" | "era" | "eram" | "ser" | "está" | "estão"),
        _ => matches!(word, "is" | "are" | "was" | "were" | "am" | "be" | "been" | "being"),
    }
}

fn suffix_rule(language: Language, word: &str) -> Option<PartOfSpeech> {
    let char_count = word.chars().count();
    if char_count <= 3 {
        return None;
    }
    match language {
        Language::Portuguese => {
            if word.ends_with("mente") {
                Some(Adv)
            } else if ["ando", "endo", "indo", "ou", "aram", "eram", "iram"].iter().any(|s| word.ends_with(s)) {
                Some(Verb)
            } else if ["oso", "osa", "ível", "ável", "ico", "ica"].iter().any(|s| word.ends_with(s)) {
                Some(Adj)
            } else {
                None
            }
        }
        Language::English | Language::Any | Language::Unknown => {
            if word.ends_with("ly") {
                Some(Adv)
            } else if word.ends_with("ing") || word.ends_with("ed") {
                Some(Verb)
            } else if ["ous", "ful", "ive", "able", "ible", "less", "ical"].iter().any(|s| word.ends_with(s)) {
                Some(Adj)
            } else {
                None
            }
        }
        _ => None,
    }
}

fn is_verb_like(language: Language, word: &str) -> bool {
    let lower = word.to_lowercase();
    matches!(suffix_rule(language, &lower), Some(Verb))
        || matches!(english_lexicon(&lower), Some(Verb)) && language == Language::English
}

/// Etiqueta os tokens de uma sentença no lugar.
pub fn tag_sentence(language: Language, tokens: &mut [Token]) {
    for i in 0..tokens.len() {
        let next_is_verb = tokens
            .get(i + 1)
            .map(|t| is_verb_like(language, &t.text))
            .unwrap_or(false);
        tokens[i].pos = tag_word(language, &tokens[i].text, next_is_verb);
    }
}

/// Etiqueta uma única palavra, dado se a próxima palavra parece um verbo.
pub fn tag_word(language: Language, word: &str, next_is_verb: bool) -> PartOfSpeech {
    if !word.chars().any(char::is_alphanumeric) {
        return if word.chars().all(|c| "$%&@#+=<>*/\\|~^€£".contains(c)) { Sym } else { Punct };
    }
    if word.chars().all(|c| c.is_numeric() || c == '.' || c == ',') {
        return Num;
    }

    let lower = word.to_lowercase();

    if is_copula(language, &lower) {
        return if next_is_verb { Aux } else { Verb };
    }

    let lexical = match language {
        Language::Portuguese => portuguese_lexicon(&lower),
        Language::English | Language::Any | Language::Unknown => english_lexicon(&lower),
        _ => None,
    };
    if let Some(pos) = lexical {
        return pos;
    }

    let first_upper = word.chars().next().map(|c| c.is_uppercase()).unwrap_or(false);
    if first_upper {
        return Propn;
    }

    suffix_rule(language, &lower).unwrap_or(Noun)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn tags(text: &str, language: Language) -> Vec<PartOfSpeech> {
        tokenize(text, language).0.iter().map(|t| t.pos).collect()
    }

    #[test]
    fn test_is_a_sentence() {
        assert_eq!(tags("Amazon is a company", Language::English), vec![Propn, Verb, Det, Noun]);
    }

    #[test]
    fn test_copula_before_verb_is_aux() {
        assert_eq!(tags("prices are rising", Language::English), vec![Noun, Aux, Verb]);
    }

    #[test]
    fn test_punctuation_and_numbers() {
        assert_eq!(tags("stocks rose 5 %", Language::English), vec![Noun, Verb, Num, Sym]);
        assert_eq!(tags("today.", Language::English), vec![Noun, Punct]);
    }

    #[test]
    fn test_portuguese_lexicon() {
        assert_eq!(
            tags("a Petrobras é uma empresa", Language::Portuguese),
            vec![Det, Propn, Verb, Det, Noun]
        );
    }
}
