// Archivo: errors.rs
// Propósito: definir los errores de los stores y el alias Result<T> usado por
// las APIs del crate.
use thiserror::Error;
/// Errores comunes de los stores.
///
/// - `NotFound`: entidad no encontrada.
/// - `Conflict`: conflicto de concurrencia, versión o integridad.
/// - `Storage`: error al acceder al almacenamiento externo.
/// - `Other`: cualquier otro error.
#[derive(Error, Debug)]
pub enum StoreError {
  /// Entidad no encontrada (por ejemplo, flow o bloque).
  #[error("No encontrado: {0}")]
  NotFound(String),
  /// Conflicto optimista o de integridad referencial.
  #[error("Conflicto: {0}")]
  Conflict(String),
  /// Error genérico de almacenamiento (BD, índice, etc.).
  #[error("Error de almacenamiento: {0}")]
  Storage(String),
  /// Otro tipo de error.
  #[error("Otro: {0}")]
  Other(String),
}
/// Alias de resultado usado por las APIs del crate.
pub type Result<T> = std::result::Result<T, StoreError>;
