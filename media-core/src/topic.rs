//! # Modelo de Tópicos: Ciclo de Vida
//!
//! Treino, persistência, carga e predição de um modelo LDA.
//!
//! ```text
//! corpus tokenizado ──train──► TopicModel ──persist──► ModelStore
//!                                                         │
//!                       predict / describe_topic ◄──load──┘
//! ```
//!
//! ## Invariantes
//!
//! - O treino recusa documentos com texto mas sem tokens (`UntokenizedCorpus`).
//! - O modelo é imutável após o treino; o que se persiste são as contagens
//!   inteiras tópico×termo, então `persist → load` reproduz exatamente o mesmo
//!   modelo e as mesmas predições.
//! - A predição é uma iteração de ponto fixo determinística (sem amostragem).
//!
//! ## Reprodutibilidade
//!
//! O treino é reproduzível para o mesmo `(seed, parallelism)`; valores
//! diferentes de `parallelism` dividem o corpus em outras fatias e levam a
//! modelos diferentes (ver [`crate::lda`]).

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::document::Document;
use crate::error::{AnalysisError, Result};
use crate::language::Language;
use crate::lda::{fit, SamplerParams};
use crate::normalize::TermNormalizer;
use crate::store::{load_model, save_model, ModelStore, ModelStoreKey};

const MODEL_KIND: &str = "lda";

/// Iterações de ponto fixo usadas para inferir a mistura de tópicos de um documento.
const INFERENCE_ITERATIONS: usize = 50;

/// Configuração de treino do LDA.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LdaConfig {
    pub number_of_topics: usize,
    /// Prior de Dirichlet documento→tópico.
    pub alpha: f64,
    /// Prior de Dirichlet tópico→termo.
    pub beta: f64,
    pub iterations: usize,
    pub seed: u64,
    /// Número de fatias (e threads) do amostrador.
    pub parallelism: usize,
    /// Termos mostrados na descrição de cada tópico.
    pub top_terms: usize,
}

impl Default for LdaConfig {
    fn default() -> Self {
        Self {
            number_of_topics: 20,
            alpha: 0.1,
            beta: 0.01,
            iterations: 1000,
            seed: 42,
            parallelism: rayon::current_num_threads(),
            top_terms: 8,
        }
    }
}

/// Pontuação de um tópico para um documento.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TopicScore {
    pub topic_id: usize,
    pub score: f64,
}

/// Termo de maior peso em um tópico.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicTerm {
    pub term: String,
    pub weight: f64,
}

/// Rótulo legível de um tópico (seus termos principais).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicDescription {
    pub topic_id: usize,
    pub terms: Vec<TopicTerm>,
}

impl fmt::Display for TopicDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms: Vec<&str> = self.terms.iter().map(|t| t.term.as_str()).collect();
        write!(f, "{}", terms.join(", "))
    }
}

/// Parte persistida do modelo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct TopicModelData {
    language: Language,
    tag: String,
    version: u32,
    number_of_topics: usize,
    alpha: f64,
    beta: f64,
    top_terms: usize,
    /// Radicais, indexados pelo id do termo.
    vocabulary: Vec<String>,
    /// Forma de superfície mais frequente de cada radical.
    labels: Vec<String>,
    topic_word: Vec<u32>,
    topic_totals: Vec<u32>,
    log_likelihood: f64,
}

/// Modelo LDA treinado.
#[derive(Debug, Clone)]
pub struct TopicModel {
    data: TopicModelData,
    /// `phi[k * V + w]`, derivado das contagens.
    phi: Vec<f64>,
    index: HashMap<String, usize>,
    normalizer: TermNormalizer,
}

impl TopicModel {
    /// Treina um modelo a partir de um corpus já tokenizado.
    pub fn train(identity: &ModelStoreKey, corpus: &[Document], config: &LdaConfig) -> Result<Self> {
        if config.number_of_topics == 0 {
            return Err(AnalysisError::invalid_argument("number_of_topics must be at least 1"));
        }
        if corpus.is_empty() {
            return Err(AnalysisError::invalid_argument("training corpus is empty"));
        }
        if let Some(i) = corpus
            .iter()
            .position(|d| !d.is_tokenized() && !d.raw_text.trim().is_empty())
        {
            return Err(AnalysisError::UntokenizedCorpus(i));
        }

        let normalizer = TermNormalizer::new(identity.language);
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut vocabulary: Vec<String> = Vec::new();
        let mut surfaces: Vec<HashMap<String, u32>> = Vec::new();

        let docs: Vec<Vec<usize>> = corpus
            .iter()
            .map(|doc| {
                normalizer
                    .terms(&doc.tokens)
                    .into_iter()
                    .map(|term| {
                        let id = *index.entry(term.stem.clone()).or_insert_with(|| {
                            vocabulary.push(term.stem.clone());
                            surfaces.push(HashMap::new());
                            vocabulary.len() - 1
                        });
                        *surfaces[id].entry(term.surface).or_insert(0) += 1;
                        id
                    })
                    .collect()
            })
            .collect();

        if vocabulary.is_empty() {
            return Err(AnalysisError::invalid_argument("training corpus has no content terms"));
        }

        let labels = surfaces
            .iter()
            .zip(&vocabulary)
            .map(|(forms, stem)| {
                forms
                    .iter()
                    .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
                    .map(|(form, _)| form.clone())
                    .unwrap_or_else(|| stem.clone())
            })
            .collect();

        let params = SamplerParams {
            topics: config.number_of_topics,
            vocabulary: vocabulary.len(),
            alpha: config.alpha,
            beta: config.beta,
            iterations: config.iterations,
            seed: config.seed,
            parallelism: config.parallelism,
        };
        let fitted = fit(&docs, &params)?;

        let data = TopicModelData {
            language: identity.language,
            tag: identity.tag.clone(),
            version: identity.version,
            number_of_topics: config.number_of_topics,
            alpha: config.alpha,
            beta: config.beta,
            top_terms: config.top_terms,
            vocabulary,
            labels,
            topic_word: fitted.topic_word,
            topic_totals: fitted.topic_totals,
            log_likelihood: fitted.log_likelihood,
        };

        info!(
            key = %identity,
            topics = data.number_of_topics,
            vocabulary = data.vocabulary.len(),
            documents = corpus.len(),
            "topic model trained"
        );
        Self::from_data(data)
    }

    fn from_data(data: TopicModelData) -> Result<Self> {
        let k = data.number_of_topics;
        let v = data.vocabulary.len();
        if k == 0
            || data.topic_word.len() != k * v
            || data.topic_totals.len() != k
            || data.labels.len() != v
        {
            return Err(AnalysisError::invalid_argument("topic model data has inconsistent dimensions"));
        }

        let v_beta = v as f64 * data.beta;
        let mut phi = vec![0.0; k * v];
        for topic in 0..k {
            let denominator = data.topic_totals[topic] as f64 + v_beta;
            for w in 0..v {
                phi[topic * v + w] = (data.topic_word[topic * v + w] as f64 + data.beta) / denominator;
            }
        }

        let index = data
            .vocabulary
            .iter()
            .enumerate()
            .map(|(i, stem)| (stem.clone(), i))
            .collect();
        let normalizer = TermNormalizer::new(data.language);

        Ok(Self { data, phi, index, normalizer })
    }

    /// Grava o modelo sob a chave (sobrescrita atômica).
    pub fn persist(&self, store: &dyn ModelStore, key: &ModelStoreKey) -> Result<()> {
        save_model(store, key, MODEL_KIND, &self.data)
    }

    /// Carrega um modelo persistido; `ModelNotFound` se a chave não existe.
    pub fn load(store: &dyn ModelStore, key: &ModelStoreKey) -> Result<Self> {
        let data: TopicModelData = load_model(store, key, MODEL_KIND)?;
        Self::from_data(data)
    }

    pub fn key(&self) -> ModelStoreKey {
        ModelStoreKey::new(self.data.language, self.data.tag.clone(), self.data.version)
    }

    pub fn language(&self) -> Language {
        self.data.language
    }

    pub fn tag(&self) -> &str {
        &self.data.tag
    }

    pub fn version(&self) -> u32 {
        self.data.version
    }

    pub fn number_of_topics(&self) -> usize {
        self.data.number_of_topics
    }

    pub fn vocabulary_size(&self) -> usize {
        self.data.vocabulary.len()
    }

    pub fn log_likelihood(&self) -> f64 {
        self.data.log_likelihood
    }

    /// Pontua o documento contra todos os tópicos, em ordem decrescente.
    ///
    /// Um documento sem nenhum termo conhecido recebe a distribuição uniforme.
    pub fn predict(&self, document: &Document) -> Result<Vec<TopicScore>> {
        if document.tokens.is_empty() {
            return Err(AnalysisError::EmptyDocument);
        }

        let k = self.data.number_of_topics;
        let v = self.data.vocabulary.len();
        let words: Vec<usize> = self
            .normalizer
            .terms(&document.tokens)
            .iter()
            .filter_map(|t| self.index.get(&t.stem).copied())
            .collect();

        let mut theta = vec![1.0 / k as f64; k];
        if words.is_empty() {
            debug!(tokens = document.tokens.len(), "no known terms, returning uniform prior");
        } else {
            let alpha = self.data.alpha;
            let denominator = words.len() as f64 + k as f64 * alpha;
            let mut expected = vec![0.0; k];
            let mut responsibility = vec![0.0; k];

            for _ in 0..INFERENCE_ITERATIONS {
                expected.iter_mut().for_each(|e| *e = 0.0);
                for &w in &words {
                    let mut total = 0.0;
                    for topic in 0..k {
                        responsibility[topic] = theta[topic] * self.phi[topic * v + w];
                        total += responsibility[topic];
                    }
                    for topic in 0..k {
                        expected[topic] += responsibility[topic] / total;
                    }
                }
                for topic in 0..k {
                    theta[topic] = (expected[topic] + alpha) / denominator;
                }
            }
        }

        let mut scores: Vec<TopicScore> = theta
            .into_iter()
            .enumerate()
            .map(|(topic_id, score)| TopicScore { topic_id, score })
            .collect();
        scores.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.topic_id.cmp(&b.topic_id))
        });
        Ok(scores)
    }

    /// Termos principais do tópico; `UnknownTopicId` fora do intervalo.
    pub fn describe_topic(&self, topic_id: usize) -> Result<TopicDescription> {
        let k = self.data.number_of_topics;
        if topic_id >= k {
            return Err(AnalysisError::UnknownTopicId { topic_id, number_of_topics: k });
        }

        let v = self.data.vocabulary.len();
        let row = &self.phi[topic_id * v..(topic_id + 1) * v];
        let mut ranked: Vec<usize> = (0..v).collect();
        ranked.sort_by(|&a, &b| {
            row[b]
                .partial_cmp(&row[a])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });

        let terms = ranked
            .into_iter()
            .take(self.data.top_terms.max(1))
            .map(|w| TopicTerm { term: self.data.labels[w].clone(), weight: row[w] })
            .collect();
        Ok(TopicDescription { topic_id, terms })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::pipeline::Pipeline;
    use crate::store::MemoryStore;

    fn key() -> ModelStoreKey {
        ModelStoreKey::new(Language::English, "test-lda", 0)
    }

    fn config() -> LdaConfig {
        LdaConfig { number_of_topics: 2, iterations: 300, parallelism: 1, top_terms: 3, ..LdaConfig::default() }
    }

    fn corpus() -> Vec<Document> {
        let pipeline = Pipeline::build(Language::English);
        ["cats are mammals", "dogs are mammals", "stocks rose today", "markets fell today"]
            .iter()
            .map(|t| pipeline.process_text(t).unwrap())
            .collect()
    }

    #[test]
    fn test_rejects_untokenized_corpus() {
        let mut docs = corpus();
        docs.push(Document::new("raw text only", Language::English));
        let err = TopicModel::train(&key(), &docs, &config()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UntokenizedCorpus);
    }

    #[test]
    fn test_rejects_zero_topics_and_empty_corpus() {
        let zero = LdaConfig { number_of_topics: 0, ..config() };
        assert_eq!(TopicModel::train(&key(), &corpus(), &zero).unwrap_err().kind(), ErrorKind::InvalidArgument);
        assert_eq!(TopicModel::train(&key(), &[], &config()).unwrap_err().kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_persist_load_predict_roundtrip() {
        let model = TopicModel::train(&key(), &corpus(), &config()).unwrap();
        let store = MemoryStore::new();

        assert_eq!(TopicModel::load(&store, &key()).unwrap_err().kind(), ErrorKind::ModelNotFound);
        model.persist(&store, &key()).unwrap();
        let loaded = TopicModel::load(&store, &key()).unwrap();

        let doc = Pipeline::build(Language::English).process_text("my cat is a mammal").unwrap();
        assert_eq!(model.predict(&doc).unwrap(), loaded.predict(&doc).unwrap());
        assert_eq!(model.describe_topic(1).unwrap(), loaded.describe_topic(1).unwrap());
    }

    #[test]
    fn test_predict_empty_document_fails() {
        let model = TopicModel::train(&key(), &corpus(), &config()).unwrap();
        let err = model.predict(&Document::new("", Language::English)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyDocument);
    }

    #[test]
    fn test_unknown_terms_get_uniform_scores() {
        let model = TopicModel::train(&key(), &corpus(), &config()).unwrap();
        let doc = Pipeline::build(Language::English).process_text("quantum physics").unwrap();
        let scores = model.predict(&doc).unwrap();
        assert!(scores.iter().all(|s| (s.score - 0.5).abs() < 1e-12));
    }

    #[test]
    fn test_describe_topic_bounds_and_labels() {
        let model = TopicModel::train(&key(), &corpus(), &config()).unwrap();
        let err = model.describe_topic(2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownTopicId);

        // Rótulos usam a forma de superfície, não o radical
        let all: Vec<String> = (0..2)
            .flat_map(|k| model.describe_topic(k).unwrap().terms)
            .map(|t| t.term)
            .collect();
        assert!(all.iter().any(|t| t == "mammals" || t == "today"));
        assert_eq!(model.describe_topic(0).unwrap().terms.len(), 3);
    }
}
