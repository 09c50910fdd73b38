//! # Reconhecedor Estatístico: Averaged Perceptron
//!
//! Classificador online simples e eficiente que atribui a cada token um rótulo
//! BIO (`B-Person`, `I-Person`, `O`...). Os rótulos de uma sentença são então
//! fundidos em entidades ([`labels_to_entities`]).
//!
//! O Perceptron é **mistake-driven**: processa um token por vez e só atualiza
//! os pesos quando erra a predição. A versão "Averaged" usa a média dos pesos
//! ao longo de todo o treino como modelo final, o que estabiliza o
//! aprendizado.
//!
//! ## Lazy Averaging
//!
//! Calcular a média real a cada passo seria O(N·T). O acumulado de cada peso
//! só é atualizado quando a feature é ativa, registrando o passo da última
//! alteração; o resultado é o mesmo modelo com custo constante por passo.
//!
//! ## Persistência
//!
//! Apenas os pesos médios e os rótulos conhecidos são gravados no
//! [`ModelStore`] (tipo `"averaged-perceptron"`).

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analyzer::{Analyzer, Capabilities};
use crate::corpus::AnnotatedSentence;
use crate::document::{Document, Entity, PartOfSpeech, Token};
use crate::error::{AnalysisError, Result};
use crate::features::{self, FeatureVector};
use crate::language::Language;
use crate::pos;
use crate::store::{load_model, save_model, ModelStore, ModelStoreKey};

const MODEL_KIND: &str = "averaged-perceptron";
const OUTSIDE: &str = "O";

/// Pesos finais: feature → (rótulo → peso médio).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct PerceptronWeights {
    weights: HashMap<String, HashMap<String, f64>>,
    /// Rótulos conhecidos, em ordem alfabética (desempate determinístico).
    labels: Vec<String>,
    steps: usize,
}

impl PerceptronWeights {
    fn score(&self, fv: &FeatureVector, label: &str) -> f64 {
        fv.features
            .iter()
            .filter_map(|(name, value)| self.weights.get(name).and_then(|row| row.get(label)).map(|w| w * value))
            .sum()
    }

    /// Empates (inclusive o vetor sem features conhecidas) ficam com `O`.
    fn predict(&self, fv: &FeatureVector) -> &str {
        let mut best = OUTSIDE;
        let mut best_score = self.score(fv, OUTSIDE);
        for label in &self.labels {
            let score = self.score(fv, label);
            if score > best_score {
                best_score = score;
                best = label.as_str();
            }
        }
        best
    }
}

/// Estado de treino com os acumuladores do lazy averaging.
#[derive(Default)]
struct Trainer {
    model: PerceptronWeights,
    totals: HashMap<String, HashMap<String, f64>>,
    last_update: HashMap<String, HashMap<String, usize>>,
}

impl Trainer {
    /// Atualiza um peso aplicando lazy averaging.
    fn update_feature(&mut self, feature: &str, label: &str, delta: f64) {
        let steps = self.model.steps;
        let weight = self.model.weights.entry(feature.to_string()).or_default().entry(label.to_string()).or_insert(0.0);
        let last = self.last_update.entry(feature.to_string()).or_default().entry(label.to_string()).or_insert(0);

        // O peso antigo vigorou desde a última atualização até agora
        *self.totals.entry(feature.to_string()).or_default().entry(label.to_string()).or_insert(0.0) +=
            (steps - *last) as f64 * *weight;
        *last = steps;
        *weight += delta;
    }

    /// `w_correto += φ(x)`, `w_predito -= φ(x)`.
    fn update(&mut self, fv: &FeatureVector, truth: &str, predicted: &str) {
        for (name, value) in &fv.features {
            self.update_feature(name, truth, *value);
            self.update_feature(name, predicted, -*value);
        }
    }

    /// Fecha os acumuladores no passo final e troca os pesos pelas médias.
    fn finalize(mut self) -> PerceptronWeights {
        let steps = self.model.steps;
        if steps == 0 {
            return self.model;
        }
        for (feature, row) in self.model.weights.iter_mut() {
            for (label, weight) in row.iter_mut() {
                let last = self.last_update.get(feature).and_then(|r| r.get(label)).copied().unwrap_or(0);
                let total = self.totals.get(feature).and_then(|r| r.get(label)).copied().unwrap_or(0.0)
                    + (steps - last) as f64 * *weight;
                *weight = total / steps as f64;
            }
            row.retain(|_, w| *w != 0.0);
        }
        self.model.weights.retain(|_, row| !row.is_empty());
        self.model
    }
}

/// Monta tokens etiquetados (POS) a partir das palavras de uma sentença anotada.
fn sentence_tokens(language: Language, words: &[&str]) -> Vec<Token> {
    let mut offset = 0;
    let mut tokens: Vec<Token> = words
        .iter()
        .enumerate()
        .map(|(index, word)| {
            let token = Token {
                text: word.to_string(),
                pos: PartOfSpeech::X,
                span_index: 0,
                start: offset,
                end: offset + word.len(),
                index,
            };
            offset += word.len() + 1;
            token
        })
        .collect();
    pos::tag_sentence(language, &mut tokens);
    tokens
}

/// Funde rótulos BIO em intervalos `(tipo, início, fim)` (índices relativos, fim inclusivo).
///
/// Um `I-Tipo` sem `B-Tipo` anterior abre uma nova entidade.
pub fn labels_to_entities(labels: &[&str]) -> Vec<(String, usize, usize)> {
    let mut found = Vec::new();
    let mut current: Option<(String, usize, usize)> = None;

    for (i, label) in labels.iter().enumerate() {
        let (prefix, kind) = match label.split_once('-') {
            Some((p, k)) if p == "B" || p == "I" => (p, k),
            _ => {
                found.extend(current.take());
                continue;
            }
        };
        let continues = matches!(&current, Some((open, _, _)) if prefix == "I" && open == kind);
        if continues {
            if let Some((_, _, end)) = current.as_mut() {
                *end = i;
            }
        } else {
            found.extend(current.take());
            current = Some((kind.to_string(), i, i));
        }
    }
    found.extend(current);
    found
}

/// Reconhecedor de entidades baseado em Averaged Perceptron.
#[derive(Debug, Clone)]
pub struct AveragedPerceptronRecognizer {
    language: Language,
    tag: String,
    model: PerceptronWeights,
}

impl AveragedPerceptronRecognizer {
    /// Treina sobre sentenças anotadas, percorrendo o corpus `iterations` vezes.
    pub fn train(
        language: Language,
        tag: impl Into<String>,
        corpus: &[AnnotatedSentence],
        iterations: usize,
    ) -> Result<Self> {
        if corpus.is_empty() || iterations == 0 {
            return Err(AnalysisError::invalid_argument(
                "perceptron training needs a non-empty corpus and at least one iteration",
            ));
        }

        let labels: BTreeSet<String> = corpus.iter().flat_map(|s| s.labels().map(str::to_string)).collect();
        let mut trainer = Trainer::default();
        trainer.model.labels = labels.into_iter().collect();

        // Features não dependem dos pesos: extraídas uma única vez
        let examples: Vec<(Vec<FeatureVector>, Vec<&str>)> = corpus
            .iter()
            .map(|sentence| {
                let words: Vec<&str> = sentence.words().collect();
                let tokens = sentence_tokens(language, &words);
                (features::extract_features(&tokens), sentence.labels().collect())
            })
            .collect();

        for iteration in 0..iterations {
            let mut mistakes = 0usize;
            for (vectors, truth) in &examples {
                for (fv, gold) in vectors.iter().zip(truth) {
                    let predicted = trainer.model.predict(fv).to_string();
                    if predicted != *gold {
                        trainer.update(fv, gold, &predicted);
                        mistakes += 1;
                    }
                    trainer.model.steps += 1;
                }
            }
            debug!(iteration, mistakes, "perceptron epoch");
        }

        let model = trainer.finalize();
        info!(
            sentences = corpus.len(),
            labels = model.labels.len(),
            features = model.weights.len(),
            "perceptron trained"
        );
        Ok(Self { language, tag: tag.into(), model })
    }

    /// Carrega um reconhecedor previamente persistido.
    pub fn from_store(store: &dyn ModelStore, language: Language, version: u32, tag: &str) -> Result<Self> {
        let key = ModelStoreKey::new(language, tag, version);
        let model: PerceptronWeights = load_model(store, &key, MODEL_KIND)?;
        Ok(Self { language, tag: tag.to_string(), model })
    }

    pub fn persist(&self, store: &dyn ModelStore, version: u32) -> Result<()> {
        let key = ModelStoreKey::new(self.language, &self.tag, version);
        save_model(store, &key, MODEL_KIND, &self.model)
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn labels(&self) -> &[String] {
        &self.model.labels
    }

    /// Rótulo BIO de cada token da sentença.
    pub fn predict_labels(&self, tokens: &[Token]) -> Vec<String> {
        features::extract_features(tokens).iter().map(|fv| self.model.predict(fv).to_string()).collect()
    }
}

impl Analyzer for AveragedPerceptronRecognizer {
    fn name(&self) -> &str {
        &self.tag
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::token_reader()
    }

    fn apply(&self, document: &mut Document) -> Result<()> {
        let mut found: Vec<Entity> = Vec::new();

        for span in &document.spans {
            let tokens = document.span_tokens(span);
            let labels = self.predict_labels(tokens);
            let labels: Vec<&str> = labels.iter().map(String::as_str).collect();

            for (entity_type, start, end) in labels_to_entities(&labels) {
                let (start, end) = (span.start_token + start, span.start_token + end);
                found.push(Entity {
                    text: document.surface(start, end),
                    entity_type,
                    start_token: start,
                    end_token: end,
                    span_index: span.index,
                    source: self.tag.clone(),
                });
            }
        }

        debug!(recognizer = %self.tag, entities = found.len(), "statistical entities found");
        for entity in found {
            document.add_entity(entity)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::english_corpus;
    use crate::store::MemoryStore;
    use crate::tokenizer::Tokenizer;

    fn trained() -> AveragedPerceptronRecognizer {
        AveragedPerceptronRecognizer::train(Language::English, "perceptron-ner", &english_corpus(), 10).unwrap()
    }

    fn recognize(recognizer: &AveragedPerceptronRecognizer, text: &str) -> Vec<(String, String)> {
        let mut doc = Document::new(text, Language::English);
        Tokenizer::new(Language::English).apply(&mut doc).unwrap();
        recognizer.apply(&mut doc).unwrap();
        doc.entities.into_iter().map(|e| (e.text, e.entity_type)).collect()
    }

    #[test]
    fn test_labels_to_entities() {
        let labels = ["B-Person", "I-Person", "O", "B-Location", "I-Organization", "O"];
        assert_eq!(
            labels_to_entities(&labels),
            vec![
                ("Person".to_string(), 0, 1),
                ("Location".to_string(), 3, 3),
                ("Organization".to_string(), 4, 4),
            ]
        );
        assert!(labels_to_entities(&["O", "O"]).is_empty());
    }

    #[test]
    fn test_ties_prefer_outside() {
        let weights = PerceptronWeights {
            labels: vec!["B-Person".to_string(), "I-Person".to_string(), OUTSIDE.to_string()],
            ..PerceptronWeights::default()
        };
        assert_eq!(weights.predict(&FeatureVector::new(0)), OUTSIDE);

        let mut fv = FeatureVector::new(0);
        fv.features.insert("word=maria".to_string(), 1.0);
        let mut row = HashMap::new();
        row.insert("B-Person".to_string(), 2.0);
        row.insert(OUTSIDE.to_string(), 2.0);
        let mut tied = weights.clone();
        tied.weights.insert("word=maria".to_string(), row);
        assert_eq!(tied.predict(&fv), OUTSIDE);
    }

    #[test]
    fn test_recovers_training_entities() {
        let recognizer = trained();
        let entities = recognize(&recognizer, "Barack Obama visited Paris last week.");
        assert!(entities.contains(&("Barack Obama".to_string(), "Person".to_string())));
        assert!(entities.contains(&("Paris".to_string(), "Location".to_string())));
    }

    #[test]
    fn test_labels_are_sorted() {
        let recognizer = trained();
        let labels = recognizer.labels();
        assert!(labels.windows(2).all(|w| w[0] < w[1]));
        assert!(labels.iter().any(|l| l == "O"));
    }

    #[test]
    fn test_persist_and_load() {
        let store = MemoryStore::new();
        let recognizer = trained();
        recognizer.persist(&store, 1).unwrap();

        let loaded = AveragedPerceptronRecognizer::from_store(&store, Language::English, 1, "perceptron-ner").unwrap();
        let text = "Angela Merkel met the president in Berlin.";
        assert_eq!(recognize(&loaded, text), recognize(&recognizer, text));

        let missing = AveragedPerceptronRecognizer::from_store(&store, Language::English, 2, "perceptron-ner");
        assert!(matches!(missing, Err(AnalysisError::ModelNotFound(_))));
    }

    #[test]
    fn test_empty_corpus_is_rejected() {
        let result = AveragedPerceptronRecognizer::train(Language::English, "x", &[], 5);
        assert!(matches!(result, Err(AnalysisError::InvalidArgument(_))));
    }
}
