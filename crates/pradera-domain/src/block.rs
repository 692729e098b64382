// block.rs
use crate::{DomainError, Entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tipo de bloque persistido. El editor usa otro vocabulario
/// (`heading`, `paragraph`, `chapter`) que se traduce 1:1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BlockType {
  Title,
  Paragraph,
  Chapter,
}

impl BlockType {
  pub const ALL: [BlockType; 3] = [BlockType::Title, BlockType::Paragraph, BlockType::Chapter];

  /// Traduce el tipo de nodo del editor al tipo de bloque.
  pub fn from_editor_type(editor_type: &str) -> Result<Self, DomainError> {
    match editor_type {
      "heading" => Ok(Self::Title),
      "paragraph" => Ok(Self::Paragraph),
      "chapter" => Ok(Self::Chapter),
      other => Err(DomainError::ValidationError(format!("unknown block type: {}", other))),
    }
  }

  pub fn to_editor_type(self) -> &'static str {
    match self {
      Self::Title => "heading",
      Self::Paragraph => "paragraph",
      Self::Chapter => "chapter",
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Title => "TITLE",
      Self::Paragraph => "PARAGRAPH",
      Self::Chapter => "CHAPTER",
    }
  }
}

impl FromStr for BlockType {
  type Err = DomainError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    BlockType::ALL.into_iter()
                  .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
                  .ok_or_else(|| DomainError::ValidationError(format!("tipo de bloque inválido: {}", s)))
  }
}

impl fmt::Display for BlockType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Fragmento de contenido. Dentro de la reconciliación un bloque nunca se
/// modifica: un cambio produce un bloque nuevo cuyo `parent_id` apunta a la
/// versión anterior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
  pub id: Option<i64>,
  #[serde(rename = "type")]
  pub block_type: BlockType,
  pub content: String,
  pub created_date: DateTime<Utc>,
  pub hash: String,
  pub parent_id: Option<i64>,
  pub user_id: i64,
}

impl Block {
  /// Bloque nuevo, sin id ni padre, fechado ahora.
  pub fn new(block_type: BlockType, content: impl Into<String>, user_id: i64, hash: impl Into<String>) -> Self {
    Self { id: None,
           block_type,
           content: content.into(),
           created_date: Utc::now(),
           hash: hash.into(),
           parent_id: None,
           user_id }
  }

  /// Construye la siguiente revisión de este bloque. El bloque original debe
  /// estar persistido para poder enlazarlo como padre.
  pub fn revise(&self,
                block_type: BlockType,
                content: impl Into<String>,
                user_id: i64,
                hash: impl Into<String>)
                -> Result<Self, DomainError> {
    let parent_id =
      self.id
          .ok_or_else(|| DomainError::ValidationError("no se puede revisar un bloque sin id".to_string()))?;
    Ok(Self { parent_id: Some(parent_id), ..Self::new(block_type, content, user_id, hash) })
  }

  /// Igualdad exacta de tipo y contenido; decide reutilizar o revisar.
  pub fn has_same_content(&self, block_type: BlockType, content: &str) -> bool {
    self.block_type == block_type && self.content == content
  }

  pub fn is_revision(&self) -> bool {
    self.parent_id.is_some()
  }
}

impl Entity for Block {
  type Patch = BlockPatch;

  const NAME: &'static str = "block";

  fn id(&self) -> Option<i64> {
    self.id
  }

  fn with_id(mut self, id: i64) -> Self {
    self.id = Some(id);
    self
  }

  fn validate(&self) -> Result<(), DomainError> {
    if self.hash.trim().is_empty() {
      return Err(DomainError::ValidationError("hash es obligatorio".to_string()));
    }
    if self.user_id <= 0 {
      return Err(DomainError::ValidationError("user es obligatorio".to_string()));
    }
    if self.parent_id.is_some() && self.parent_id == self.id {
      return Err(DomainError::ValidationError("un bloque no puede ser su propio padre".to_string()));
    }
    Ok(())
  }

  fn apply_patch(&mut self, patch: BlockPatch) {
    if let Some(t) = patch.block_type {
      self.block_type = t;
    }
    if let Some(c) = patch.content {
      self.content = c;
    }
    if let Some(d) = patch.created_date {
      self.created_date = d;
    }
    if let Some(h) = patch.hash {
      self.hash = h;
    }
    if let Some(p) = patch.parent_id {
      self.parent_id = Some(p);
    }
    if let Some(u) = patch.user_id {
      self.user_id = u;
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockPatch {
  #[serde(rename = "type")]
  pub block_type: Option<BlockType>,
  pub content: Option<String>,
  pub created_date: Option<DateTime<Utc>>,
  pub hash: Option<String>,
  pub parent_id: Option<i64>,
  pub user_id: Option<i64>,
}

impl fmt::Display for Block {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f,
           "Block(id: {:?}, type: {}, content: '{}', parent: {:?})",
           self.id, self.block_type, self.content, self.parent_id)
  }
}
