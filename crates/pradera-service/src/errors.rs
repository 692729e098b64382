use pradera_domain::DomainError;
use pradera_store::StoreError;
use thiserror::Error;

// Errores de la capa de servicios.
//
// Cada variante conserva el tipo de fallo de las capas inferiores: un
// `DomainError::ValidationError` llega como `Validation`, un
// `StoreError::NotFound` como `NotFound`, etc. Los mensajes nombran el id o
// valor que causó el fallo.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
  /// Usuario, flow, bloque o fila inexistente.
  #[error("No encontrado: {0}")]
  NotFound(String),

  /// Entrada rechazada (documento mal formado, campos obligatorios, ids
  /// incoherentes).
  #[error("Error de validacion: {0}")]
  Validation(String),

  /// Conflicto de versión o de integridad referencial.
  #[error("Conflicto: {0}")]
  Conflict(String),

  /// Fallo del almacenamiento o del índice de búsqueda.
  #[error("Error de almacenamiento: {0}")]
  Storage(String),

  /// Errores de serializacion/deserializacion JSON.
  #[error("Error de serializacion: {0}")]
  Serialization(String),
}

impl From<DomainError> for ServiceError {
  fn from(e: DomainError) -> Self {
    match e {
      DomainError::ValidationError(m) => ServiceError::Validation(m),
      DomainError::SerializationError(m) => ServiceError::Serialization(m),
    }
  }
}

impl From<StoreError> for ServiceError {
  fn from(e: StoreError) -> Self {
    match e {
      StoreError::NotFound(m) => ServiceError::NotFound(m),
      StoreError::Conflict(m) => ServiceError::Conflict(m),
      StoreError::Storage(m) | StoreError::Other(m) => ServiceError::Storage(m),
    }
  }
}

impl From<serde_json::Error> for ServiceError {
  fn from(e: serde_json::Error) -> Self {
    ServiceError::Serialization(e.to_string())
  }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
