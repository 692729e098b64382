use crate::errors::{Result, ServiceError};
use pradera_domain::{ContentFingerprint, PlaceholderFingerprint, Sha256Fingerprint};
use pradera_store::{Pageable, DEFAULT_PAGE_SIZE};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

/// Tope de tamaño de página por defecto.
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 2000;

/// Estrategia para el campo `hash` de los bloques nuevos.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintStrategy {
  /// Valor constante `"hash"`; compatible con los datos existentes.
  Placeholder,
  /// SHA-256 hexadecimal de `TIPO\ncontenido`.
  Sha256,
}

impl FingerprintStrategy {
  pub fn build(self) -> Arc<dyn ContentFingerprint> {
    match self {
      FingerprintStrategy::Placeholder => Arc::new(PlaceholderFingerprint),
      FingerprintStrategy::Sha256 => Arc::new(Sha256Fingerprint),
    }
  }
}

impl FromStr for FingerprintStrategy {
  type Err = ServiceError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_lowercase().as_str() {
      "placeholder" => Ok(FingerprintStrategy::Placeholder),
      "sha256" => Ok(FingerprintStrategy::Sha256),
      other => Err(ServiceError::Validation(format!("PRADERA_FINGERPRINT desconocido: {}", other))),
    }
  }
}

/// Configuracion de los servicios.
///
/// Se lee de variables de entorno (`.env` incluido):
/// `PRADERA_USER`, `PRADERA_FINGERPRINT`, `PRADERA_PAGE_SIZE`,
/// `PRADERA_MAX_PAGE_SIZE` y `PRADERA_SEARCH_ON_RECONCILE`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
  /// Login con el que actúa la CLI.
  pub acting_login: String,
  pub fingerprint: FingerprintStrategy,
  pub default_page_size: u32,
  pub max_page_size: u32,
  /// Replicar en el índice de búsqueda los bloques que crea la
  /// reconciliación.
  pub search_on_reconcile: bool,
}

impl Default for ServiceConfig {
  fn default() -> Self {
    ServiceConfig { acting_login: "user".to_string(),
                    fingerprint: FingerprintStrategy::Placeholder,
                    default_page_size: DEFAULT_PAGE_SIZE,
                    max_page_size: DEFAULT_MAX_PAGE_SIZE,
                    search_on_reconcile: true }
  }
}

impl ServiceConfig {
  pub fn from_env() -> Result<Self> {
    dotenvy::dotenv().ok();
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Igual que `from_env` pero con una fuente de variables arbitraria.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let mut cfg = ServiceConfig::default();
    if let Some(login) = lookup("PRADERA_USER").filter(|l| !l.trim().is_empty()) {
      cfg.acting_login = login.trim().to_string();
    }
    if let Some(f) = lookup("PRADERA_FINGERPRINT") {
      cfg.fingerprint = f.parse()?;
    }
    if let Some(v) = lookup("PRADERA_PAGE_SIZE") {
      cfg.default_page_size = parse_size("PRADERA_PAGE_SIZE", &v)?;
    }
    if let Some(v) = lookup("PRADERA_MAX_PAGE_SIZE") {
      cfg.max_page_size = parse_size("PRADERA_MAX_PAGE_SIZE", &v)?;
    }
    if let Some(v) = lookup("PRADERA_SEARCH_ON_RECONCILE") {
      cfg.search_on_reconcile = parse_flag("PRADERA_SEARCH_ON_RECONCILE", &v)?;
    }
    if cfg.default_page_size > cfg.max_page_size {
      return Err(ServiceError::Validation(format!("PRADERA_PAGE_SIZE ({}) supera PRADERA_MAX_PAGE_SIZE ({})",
                                                  cfg.default_page_size, cfg.max_page_size)));
    }
    Ok(cfg)
  }

  /// Normaliza una petición de página: tamaño 0 usa el tamaño por defecto y
  /// ningún tamaño supera `max_page_size`.
  pub fn clamp(&self, pageable: &Pageable) -> Pageable {
    let size = match pageable.size {
      0 => self.default_page_size,
      s => s.min(self.max_page_size),
    };
    Pageable::new(pageable.page, size)
  }

  pub fn first_page(&self) -> Pageable {
    Pageable::first(self.default_page_size)
  }
}

fn parse_size(key: &str, value: &str) -> Result<u32> {
  match value.trim().parse::<u32>() {
    Ok(n) if n > 0 => Ok(n),
    _ => Err(ServiceError::Validation(format!("{} debe ser un entero positivo: {}", key, value))),
  }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
  match value.trim().to_lowercase().as_str() {
    "true" | "1" | "yes" => Ok(true),
    "false" | "0" | "no" => Ok(false),
    _ => Err(ServiceError::Validation(format!("{} debe ser true/false: {}", key, value))),
  }
}
