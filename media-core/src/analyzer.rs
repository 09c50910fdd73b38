//! # Contrato de Analisador
//!
//! Todo estágio do pipeline implementa [`Analyzer`]: recebe o documento,
//! muta-o no lugar e devolve `Ok(())`. Implementações concretas (tokenizador,
//! pattern spotter, gazetteer, reconhecedor estatístico) são variantes atrás
//! desta única interface.
//!
//! Cada analisador declara suas [`Capabilities`]; o pipeline as usa para
//! validar a ordem dos estágios no momento da construção.

use crate::document::Document;
use crate::error::Result;

/// Capacidades declaradas por um analisador.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// O analisador produz tokens (é um tokenizador).
    pub produces_tokens: bool,
    /// O analisador lê tokens e precisa que já existam.
    pub requires_tokens: bool,
}

impl Capabilities {
    pub const fn tokenizer() -> Self {
        Self { produces_tokens: true, requires_tokens: false }
    }

    pub const fn token_reader() -> Self {
        Self { produces_tokens: false, requires_tokens: true }
    }
}

/// Um estágio do pipeline.
///
/// Analisadores não dependem nem mutam estado global; por isso precisam ser
/// `Send + Sync` para que `process_many` distribua documentos entre threads.
pub trait Analyzer: Send + Sync {
    /// Nome do estágio (aparece em `PipelineStageFailure` e nos logs).
    fn name(&self) -> &str;

    fn capabilities(&self) -> Capabilities;

    /// Processa o documento no lugar.
    fn apply(&self, document: &mut Document) -> Result<()>;
}
