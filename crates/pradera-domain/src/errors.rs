// errors.rs
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
  #[error("Error de validación: {0}")]
  ValidationError(String),
  #[error("Error de serialización: {0}")]
  SerializationError(String),
}

impl From<serde_json::Error> for DomainError {
  fn from(e: serde_json::Error) -> Self {
    Self::SerializationError(e.to_string())
  }
}

/// Valida que un campo de texto obligatorio tenga al menos `min` caracteres.
pub(crate) fn require_min_len(field: &str, value: &str, min: usize) -> Result<(), DomainError> {
  if value.chars().count() < min {
    return Err(DomainError::ValidationError(format!("{} debe tener al menos {} caracteres", field, min)));
  }
  Ok(())
}
