//! # Engenharia de Features para o Reconhecedor de Entidades
//!
//! Para cada token de uma sentença, extrai um vetor esparso de features
//! binárias usado pelo perceptron médio. As features capturam informação
//! ortográfica, lexical, gramatical (POS) e de contexto.
//!
//! ## Features Implementadas
//!
//! ### Token atual
//! - Forma da palavra (lowercase) e "shape" (`Xxxx`, `dd`, `X.X.`)
//! - Capitalização: is_capitalized, is_all_caps, is_mixed_case
//! - Prefixos e sufixos de 2, 3 e 4 caracteres
//! - Contém dígitos, hífens, pontos
//! - Classe gramatical atribuída pelo tokenizador
//!
//! ### Contexto (janela de 2 tokens)
//! - Palavras e classes gramaticais vizinhas
//! - Bigrama (anterior, seguinte)
//! - Início/fim de sentença (BOS/EOS)

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::document::Token;

/// Vetor esparso de features de um token.
///
/// O espaço de features é aberto ("word=abacaxi", "suffix3=axi"), mas cada
/// token ativa apenas algumas dezenas delas.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Features ativas. Ex: `{"is_capitalized": 1.0, "word=brasil": 1.0}`.
    pub features: HashMap<String, f64>,
    /// Índice do token dentro da sentença.
    pub token_index: usize,
}

impl FeatureVector {
    pub fn new(token_index: usize) -> Self {
        Self { features: HashMap::new(), token_index }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.features.insert(key.into(), value);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.features.contains_key(key)
    }
}

/// Forma resumida da palavra: maiúsculas → `X`, minúsculas → `x`, dígitos →
/// `d`; repetições consecutivas colapsam ("Amazon" → "Xx", "2023" → "d").
fn word_shape(word: &str) -> String {
    let mut shape = String::new();
    let mut last: Option<char> = None;
    for c in word.chars() {
        let class = if c.is_uppercase() {
            'X'
        } else if c.is_lowercase() {
            'x'
        } else if c.is_numeric() {
            'd'
        } else {
            c
        };
        if last != Some(class) {
            shape.push(class);
            last = Some(class);
        }
    }
    shape
}

fn starts_upper(text: &str) -> bool {
    text.chars().next().map(|c| c.is_uppercase()).unwrap_or(false)
}

/// Gera os vetores de features de uma sentença, alinhados com os tokens.
pub fn extract_features(tokens: &[Token]) -> Vec<FeatureVector> {
    (0..tokens.len()).map(|i| extract_for_token(tokens, i)).collect()
}

/// Extrai as features de um token em seu contexto.
pub fn extract_for_token(tokens: &[Token], i: usize) -> FeatureVector {
    let mut fv = FeatureVector::new(i);
    let token = &tokens[i];
    let word = &token.text;
    let lower = word.to_lowercase();

    fv.insert("bias", 1.0);
    fv.insert(format!("word={lower}"), 1.0);
    fv.insert(format!("shape={}", word_shape(word)), 1.0);
    fv.insert(format!("pos={}", token.pos), 1.0);

    // Capitalização
    let all_upper = word.chars().all(|c| c.is_uppercase() || !c.is_alphabetic());
    if starts_upper(word) {
        fv.insert("is_capitalized", 1.0);
    }
    if all_upper && word.chars().filter(|c| c.is_alphabetic()).count() > 1 {
        fv.insert("is_all_caps", 1.0);
    }
    if word.chars().skip(1).any(char::is_uppercase) {
        fv.insert("is_mixed_case", 1.0);
    }

    // Prefixos e sufixos
    let chars: Vec<char> = lower.chars().collect();
    for n in 2..=4 {
        if chars.len() >= n {
            let prefix: String = chars[..n].iter().collect();
            let suffix: String = chars[chars.len() - n..].iter().collect();
            fv.insert(format!("prefix{n}={prefix}"), 1.0);
            fv.insert(format!("suffix{n}={suffix}"), 1.0);
        }
    }

    if word.chars().any(char::is_numeric) {
        fv.insert("has_digit", 1.0);
    }
    if word.contains('-') {
        fv.insert("has_hyphen", 1.0);
    }
    if word.contains('.') {
        fv.insert("has_period", 1.0);
    }

    // Contexto à esquerda
    if i > 0 {
        let prev = &tokens[i - 1];
        fv.insert(format!("prev_word={}", prev.text.to_lowercase()), 1.0);
        fv.insert(format!("prev_pos={}", prev.pos), 1.0);
        if starts_upper(&prev.text) {
            fv.insert("prev_is_capitalized", 1.0);
        }
    } else {
        fv.insert("BOS", 1.0);
    }
    if i > 1 {
        fv.insert(format!("prev2_word={}", tokens[i - 2].text.to_lowercase()), 1.0);
    }

    // Contexto à direita
    if i + 1 < tokens.len() {
        let next = &tokens[i + 1];
        fv.insert(format!("next_word={}", next.text.to_lowercase()), 1.0);
        fv.insert(format!("next_pos={}", next.pos), 1.0);
        if starts_upper(&next.text) {
            fv.insert("next_is_capitalized", 1.0);
        }
    } else {
        fv.insert("EOS", 1.0);
    }
    if i + 2 < tokens.len() {
        fv.insert(format!("next2_word={}", tokens[i + 2].text.to_lowercase()), 1.0);
    }

    if i > 0 && i + 1 < tokens.len() {
        fv.insert(
            format!("bigram={}_{}", tokens[i - 1].text.to_lowercase(), tokens[i + 1].text.to_lowercase()),
            1.0,
        );
    }

    fv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use crate::tokenizer::tokenize;

    #[test]
    fn test_capitalization_and_pos() {
        let (tokens, _) = tokenize("Amazon is a company", Language::English);
        let features = extract_features(&tokens);

        assert!(features[0].contains("is_capitalized"));
        assert!(features[0].contains("pos=PROPN"));
        assert!(features[0].contains("BOS"));
        assert!(!features[1].contains("is_capitalized"));
        assert!(features[3].contains("EOS"));
    }

    #[test]
    fn test_prefix_suffix_and_shape() {
        let (tokens, _) = tokenize("Microsoft 2023", Language::English);
        let features = extract_features(&tokens);

        assert!(features[0].contains("prefix2=mi"));
        assert!(features[0].contains("suffix3=oft"));
        assert!(features[0].contains("shape=Xx"));
        assert!(features[1].contains("shape=d"));
        assert!(features[1].contains("has_digit"));
    }

    #[test]
    fn test_context_features() {
        let (tokens, _) = tokenize("the president Obama said", Language::English);
        let features = extract_features(&tokens);

        let obama = &features[2];
        assert!(obama.contains("prev_word=president"));
        assert!(obama.contains("next_word=said"));
        assert!(obama.contains("next_pos=VERB"));
        assert!(obama.contains("bigram=president_said"));
    }
}
