// book.rs
use crate::errors::require_min_len;
use crate::{DomainError, Entity};
use serde::{Deserialize, Serialize};

/// Contenedor con nombre que agrupa flows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
  pub id: Option<i64>,
  pub name: String,
}

impl Book {
  pub fn new(name: impl Into<String>) -> Self {
    Self { id: None, name: name.into() }
  }
}

impl Entity for Book {
  type Patch = BookPatch;

  const NAME: &'static str = "book";

  fn id(&self) -> Option<i64> {
    self.id
  }

  fn with_id(mut self, id: i64) -> Self {
    self.id = Some(id);
    self
  }

  fn validate(&self) -> Result<(), DomainError> {
    require_min_len("name", &self.name, 3)
  }

  fn apply_patch(&mut self, patch: BookPatch) {
    if let Some(n) = patch.name {
      self.name = n;
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookPatch {
  pub name: Option<String>,
}
