// fingerprint.rs
use crate::BlockType;
use sha2::{Digest, Sha256};

/// Valor fijo que se guarda en `hash` mientras no se elija un algoritmo real.
pub const PLACEHOLDER_HASH: &str = "hash";

/// Estrategia para calcular la huella (`hash`) de un bloque nuevo.
pub trait ContentFingerprint: Send + Sync {
  fn fingerprint(&self, block_type: BlockType, content: &str) -> String;
}

/// Huella constante; no distingue contenidos.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderFingerprint;

impl ContentFingerprint for PlaceholderFingerprint {
  fn fingerprint(&self, _block_type: BlockType, _content: &str) -> String {
    PLACEHOLDER_HASH.to_string()
  }
}

/// SHA-256 (hex) de `TIPO\ncontenido`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Fingerprint;

impl ContentFingerprint for Sha256Fingerprint {
  fn fingerprint(&self, block_type: BlockType, content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(block_type.as_str().as_bytes());
    hasher.update(b"\n");
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
  }
}
