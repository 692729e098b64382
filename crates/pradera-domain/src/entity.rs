// entity.rs
use crate::DomainError;

/// Contrato común de las entidades persistibles.
///
/// Las entidades llevan `id: Option<i64>`: `None` hasta que el store les
/// asigna un identificador en el primer `save`. Los servicios CRUD usan este
/// trait para validar, rechazar ids inesperados y aplicar actualizaciones
/// parciales sin conocer el tipo concreto.
pub trait Entity: Clone + Send + Sync + 'static {
  /// Campos opcionales aceptados por una actualización parcial.
  type Patch;

  /// Nombre corto usado en mensajes de error y logs.
  const NAME: &'static str;

  fn id(&self) -> Option<i64>;

  fn with_id(self, id: i64) -> Self;

  fn validate(&self) -> Result<(), DomainError>;

  /// Sobrescribe sólo los campos presentes en `patch`.
  fn apply_patch(&mut self, patch: Self::Patch);
}
