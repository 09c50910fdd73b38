//! # media-core: Pipeline de Análise de Documentos
//!
//! Este crate processa texto livre (fornecido diretamente ou extraído de uma
//! página web) por um pipeline configurável de analisadores, produzindo três
//! tipos de saída: entidades nomeadas, o idioma do texto e uma distribuição
//! sobre tópicos latentes.
//!
//! ## Arquitetura do Sistema
//!
//! ```text
//! texto ──► Pipeline [tokenizador → reconhecedores/padrões] ──► Document ──► relatório
//! texto ──► LanguageDetector ──► idioma
//! corpus ──► Pipeline ──► TopicModel (train / persist / load / predict) ──► tópicos
//! ```
//!
//! 1.  **Documento** ([`document`]): contêiner mutável com texto, tokens, sentenças e entidades.
//! 2.  **Tokenização** ([`tokenizer`], [`pos`]): tokens com classe gramatical e offsets originais.
//! 3.  **Analisadores** ([`analyzer`]): estágios que mutam o documento no lugar.
//!     *   **Padrões** ([`pattern`], [`spotter`]): "regex" sobre tokens e gazetteers.
//!     *   **Estatístico** ([`perceptron`]): Averaged Perceptron sobre [`features`].
//! 4.  **Idioma** ([`langdetect`]): perfis de trigramas ou classificador Naive Bayes.
//! 5.  **Tópicos** ([`topic`]): LDA com amostragem de Gibbs paralela.
//! 6.  **Modelos** ([`store`]): armazenamento chaveado por (idioma, tag, versão).
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use media_core::document::PartOfSpeech;
//! use media_core::language::Language;
//! use media_core::pattern::{PatternSpotter, PatternUnit};
//! use media_core::pipeline::Pipeline;
//! use media_core::report::format_entities;
//!
//! let mut spotter = PatternSpotter::new(Language::English, "is-a-pattern", "IsA");
//! spotter
//!     .new_pattern(
//!         "Is+Noun",
//!         vec![
//!             PatternUnit::single().with_token("is").with_pos(&[PartOfSpeech::Verb]).as_context(),
//!             PatternUnit::multiple().with_pos(&[PartOfSpeech::Det, PartOfSpeech::Noun]),
//!         ],
//!     )
//!     .unwrap();
//!
//! let pipeline = Pipeline::build(Language::English).with(Box::new(spotter)).unwrap();
//! let document = pipeline.process_text("Amazon is a company").unwrap();
//! assert!(format_entities(&document).ends_with("\ta company [IsA]"));
//! ```

pub mod analyzer;
pub mod config;
pub mod content;
pub mod corpus;
pub mod document;
pub mod engine;
pub mod error;
pub mod features;
pub mod langdetect;
pub mod language;
mod lda;
pub mod normalize;
pub mod pattern;
pub mod perceptron;
pub mod pipeline;
pub mod pos;
pub mod report;
pub mod spotter;
pub mod store;
pub mod tokenizer;
pub mod topic;

pub use analyzer::{Analyzer, Capabilities};
pub use config::EngineConfig;
pub use document::{Document, Entity, PartOfSpeech, Span, Token};
pub use engine::{MediaEngine, SpotterInfo, TrainingOutcome};
pub use error::{AnalysisError, ErrorKind, Result};
pub use langdetect::{DetectorMode, LanguageDetector};
pub use language::Language;
pub use pipeline::{BatchReport, Pipeline};
pub use store::{FileStore, MemoryStore, ModelStore, ModelStoreKey};
pub use topic::{LdaConfig, TopicModel};
