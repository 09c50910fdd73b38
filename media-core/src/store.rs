//! # Armazenamento de Modelos
//!
//! Repositório chave-valor de blobs de modelos treinados, endereçado por
//! [`ModelStoreKey`] `(idioma, tag, versão)`. O handle do armazenamento é
//! passado explicitamente para quem persiste ou carrega modelos; não há um
//! armazenamento global.
//!
//! ## Implementações
//!
//! | Tipo          | Escrita atômica                                 |
//! |---------------|-------------------------------------------------|
//! | [`FileStore`] | arquivo temporário + `rename` no mesmo diretório |
//! | [`MemoryStore`] | mapa protegido por `RwLock`                    |
//!
//! ## Envelope
//!
//! [`save_model`] / [`load_model`] gravam o modelo em JSON dentro de um
//! envelope `{ kind, payload }`; carregar um blob de outro tipo de modelo
//! falha com `ModelKindMismatch` em vez de produzir um modelo corrompido.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AnalysisError, Result};
use crate::language::Language;

/// Chave de um modelo no armazenamento.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelStoreKey {
    pub language: Language,
    pub tag: String,
    pub version: u32,
}

impl ModelStoreKey {
    pub fn new(language: Language, tag: impl Into<String>, version: u32) -> Self {
        Self { language, tag: tag.into(), version }
    }

    /// Nome de arquivo seguro e injetivo: bytes da tag fora de `[A-Za-z0-9_-]`
    /// (inclusive `%`) viram `%XX`, então tags distintas nunca dividem arquivo.
    fn file_name(&self) -> String {
        let mut tag = String::with_capacity(self.tag.len());
        for byte in self.tag.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
                tag.push(byte as char);
            } else {
                tag.push_str(&format!("%{byte:02X}"));
            }
        }
        format!("{}-{}-v{}.json", self.language.code(), tag, self.version)
    }
}

impl fmt::Display for ModelStoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/v{}", self.language.code(), self.tag, self.version)
    }
}

/// Armazenamento de blobs de modelos.
///
/// `put` sobrescreve atomicamente: um leitor concorrente vê o blob antigo ou o
/// novo, nunca um blob parcial.
pub trait ModelStore: Send + Sync {
    fn get(&self, key: &ModelStoreKey) -> Result<Option<Vec<u8>>>;

    fn put(&self, key: &ModelStoreKey, blob: &[u8]) -> Result<()>;
}

/// Armazenamento em diretório local.
#[derive(Debug, Clone)]
pub struct FileStore {
    directory: PathBuf,
}

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

impl FileStore {
    /// Abre (criando se necessário) o diretório de modelos.
    pub fn new<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();
        if !directory.exists() {
            fs::create_dir_all(&directory)?;
        }
        if !directory.is_dir() {
            return Err(AnalysisError::invalid_argument(format!(
                "model store path is not a directory: {}",
                directory.display()
            )));
        }
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, key: &ModelStoreKey) -> PathBuf {
        self.directory.join(key.file_name())
    }
}

impl ModelStore for FileStore {
    fn get(&self, key: &ModelStoreKey) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, key: &ModelStoreKey, blob: &[u8]) -> Result<()> {
        let target = self.path_for(key);
        let temp = self.directory.join(format!(
            ".{}.{}.{}.tmp",
            key.file_name(),
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        let written = (|| -> std::io::Result<()> {
            let mut file = fs::File::create(&temp)?;
            file.write_all(blob)?;
            file.sync_all()?;
            fs::rename(&temp, &target)
        })();

        if let Err(e) = written {
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }

        debug!(key = %key, bytes = blob.len(), path = %target.display(), "model blob written");
        Ok(())
    }
}

/// Armazenamento em memória (testes e uso embutido).
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: RwLock<HashMap<ModelStoreKey, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ModelStore for MemoryStore {
    fn get(&self, key: &ModelStoreKey) -> Result<Option<Vec<u8>>> {
        let blobs = self.blobs.read().unwrap_or_else(|e| e.into_inner());
        Ok(blobs.get(key).cloned())
    }

    fn put(&self, key: &ModelStoreKey, blob: &[u8]) -> Result<()> {
        let mut blobs = self.blobs.write().unwrap_or_else(|e| e.into_inner());
        blobs.insert(key.clone(), blob.to_vec());
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    kind: String,
    payload: T,
}

#[derive(Deserialize)]
struct EnvelopeHeader {
    kind: String,
}

/// Serializa o modelo em um envelope tipado e grava sob a chave.
pub fn save_model<T: Serialize>(
    store: &dyn ModelStore,
    key: &ModelStoreKey,
    kind: &str,
    model: &T,
) -> Result<()> {
    let blob = serde_json::to_vec(&Envelope { kind: kind.to_string(), payload: model })?;
    store.put(key, &blob)?;
    info!(key = %key, kind, bytes = blob.len(), "model persisted");
    Ok(())
}

/// Carrega um modelo gravado por [`save_model`].
///
/// Falha com `ModelNotFound` se a chave não existe e com `ModelKindMismatch`
/// se o blob pertence a outro tipo de modelo.
pub fn load_model<T: DeserializeOwned>(
    store: &dyn ModelStore,
    key: &ModelStoreKey,
    kind: &str,
) -> Result<T> {
    let blob = store
        .get(key)?
        .ok_or_else(|| AnalysisError::ModelNotFound(format!("{kind} {key}")))?;

    let header: EnvelopeHeader = serde_json::from_slice(&blob)?;
    if header.kind != kind {
        return Err(AnalysisError::ModelKindMismatch { expected: kind.to_string(), found: header.kind });
    }

    let envelope: Envelope<T> = serde_json::from_slice(&blob)?;
    debug!(key = %key, kind, "model loaded");
    Ok(envelope.payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Toy {
        weights: Vec<f64>,
    }

    fn key() -> ModelStoreKey {
        ModelStoreKey::new(Language::English, "my-lda", 0)
    }

    #[test]
    fn test_file_store_roundtrip_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("models")).unwrap();

        assert_eq!(store.get(&key()).unwrap(), None);
        store.put(&key(), b"first").unwrap();
        store.put(&key(), b"second").unwrap();
        assert_eq!(store.get(&key()).unwrap(), Some(b"second".to_vec()));

        // Nenhum arquivo temporário sobra no diretório
        let leftovers: Vec<_> = fs::read_dir(store.directory())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_keys_are_distinct_by_version_and_language() {
        let store = MemoryStore::new();
        store.put(&key(), b"v0").unwrap();
        store.put(&ModelStoreKey::new(Language::English, "my-lda", 1), b"v1").unwrap();
        store.put(&ModelStoreKey::new(Language::Portuguese, "my-lda", 0), b"pt").unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.get(&key()).unwrap(), Some(b"v0".to_vec()));
    }

    #[test]
    fn test_load_missing_model_fails() {
        let store = MemoryStore::new();
        let err = load_model::<Toy>(&store, &key(), "toy").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModelNotFound);
    }

    #[test]
    fn test_typed_envelope() {
        let store = MemoryStore::new();
        let toy = Toy { weights: vec![0.1, 0.2, 1.0 / 3.0] };
        save_model(&store, &key(), "toy", &toy).unwrap();

        let back: Toy = load_model(&store, &key(), "toy").unwrap();
        assert_eq!(back, toy);

        let err = load_model::<Toy>(&store, &key(), "lda").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModelKindMismatch);
    }

    #[test]
    fn test_file_name_is_sanitized() {
        let key = ModelStoreKey::new(Language::English, "../evil tag", 2);
        assert_eq!(key.file_name(), "en-%2E%2E%2Fevil%20tag-v2.json");
        assert_eq!(ModelStoreKey::new(Language::English, "50%", 0).file_name(), "en-50%25-v0.json");
    }

    #[test]
    fn test_similar_tags_do_not_share_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        let tags = ["my lda", "my_lda", "my.lda", "my%20lda"];
        for tag in tags {
            store.put(&ModelStoreKey::new(Language::English, tag, 0), tag.as_bytes()).unwrap();
        }
        for tag in tags {
            let blob = store.get(&ModelStoreKey::new(Language::English, tag, 0)).unwrap();
            assert_eq!(blob, Some(tag.as_bytes().to_vec()), "tag {tag}");
        }
    }
}
