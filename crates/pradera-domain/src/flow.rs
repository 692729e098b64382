// flow.rs
use crate::errors::require_min_len;
use crate::{Block, BlockType, DomainError, Entity};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Documento con nombre. Sus bloques se ordenan mediante filas `FlowBlock`.
///
/// `version` es el token de concurrencia optimista: cada reconciliación lo
/// incrementa y falla si otro escritor lo movió antes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
  pub id: Option<i64>,
  pub name: String,
  pub user_id: Option<i64>,
  pub book_id: Option<i64>,
  #[serde(default)]
  pub version: i64,
}

impl Flow {
  pub fn new(name: impl Into<String>) -> Self {
    Self { id: None, name: name.into(), user_id: None, book_id: None, version: 0 }
  }

  pub fn owned_by(mut self, user_id: i64) -> Self {
    self.user_id = Some(user_id);
    self
  }

  pub fn in_book(mut self, book_id: i64) -> Self {
    self.book_id = Some(book_id);
    self
  }
}

impl Entity for Flow {
  type Patch = FlowPatch;

  const NAME: &'static str = "flow";

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

  fn apply_patch(&mut self, patch: FlowPatch) {
    if let Some(n) = patch.name {
      self.name = n;
    }
    if let Some(u) = patch.user_id {
      self.user_id = Some(u);
    }
    if let Some(b) = patch.book_id {
      self.book_id = Some(b);
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowPatch {
  pub name: Option<String>,
  pub user_id: Option<i64>,
  pub book_id: Option<i64>,
}

/// Fila de orden: el bloque `block_id` ocupa la posición `block_order` del
/// flow `flow_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowBlock {
  pub id: Option<i64>,
  pub block_order: i64,
  pub flow_id: i64,
  pub block_id: i64,
}

impl FlowBlock {
  pub fn new(flow_id: i64, block_id: i64, block_order: i64) -> Self {
    Self { id: None, block_order, flow_id, block_id }
  }
}

impl Entity for FlowBlock {
  type Patch = FlowBlockPatch;

  const NAME: &'static str = "flowBlock";

  fn id(&self) -> Option<i64> {
    self.id
  }

  fn with_id(mut self, id: i64) -> Self {
    self.id = Some(id);
    self
  }

  fn validate(&self) -> Result<(), DomainError> {
    if self.block_order < 1 {
      return Err(DomainError::ValidationError(format!("blockOrder debe ser positivo: {}", self.block_order)));
    }
    Ok(())
  }

  fn apply_patch(&mut self, patch: FlowBlockPatch) {
    if let Some(o) = patch.block_order {
      self.block_order = o;
    }
    if let Some(f) = patch.flow_id {
      self.flow_id = f;
    }
    if let Some(b) = patch.block_id {
      self.block_id = b;
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowBlockPatch {
  pub block_order: Option<i64>,
  pub flow_id: Option<i64>,
  pub block_id: Option<i64>,
}

/// Un bloque en su posición dentro del documento.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEntry {
  pub flow_block_id: Option<i64>,
  pub block_order: i64,
  pub block: Block,
}

/// Vista de lectura: un flow con su secuencia ordenada de bloques.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowDocument {
  pub flow: Flow,
  pub entries: Vec<DocumentEntry>,
}

impl FlowDocument {
  pub fn blocks(&self) -> impl Iterator<Item = &Block> {
    self.entries.iter().map(|e| &e.block)
  }

  pub fn block_ids(&self) -> Vec<i64> {
    self.blocks().filter_map(|b| b.id).collect()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

/// Texto plano del documento: una línea por bloque, títulos con `# `.
impl fmt::Display for FlowDocument {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for block in self.blocks() {
      if block.block_type == BlockType::Title {
        f.write_str("# ")?;
      }
      writeln!(f, "{}", block.content)?;
    }
    Ok(())
  }
}
