// user.rs
use serde::{Deserialize, Serialize};

/// Identidad externa. El directorio resuelve un `login` a un usuario; bloques
/// y flows lo referencian por id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
  pub id: i64,
  pub login: String,
  pub email: Option<String>,
  pub activated: bool,
}

impl User {
  pub fn new(id: i64, login: impl Into<String>) -> Self {
    Self { id, login: login.into(), email: None, activated: true }
  }
}
