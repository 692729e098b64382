// document.rs
//
// Modelo del documento que envía el editor. Formato aceptado:
//
//   { "content": [ { "type": "heading" | "paragraph" | "chapter",
//                    "attrs": { "blockId": 12 },
//                    "content": [ { "type": "text", "text": "..." } ] } ] }
//
// Todo el documento se valida al parsear, antes de tocar ningún store.
use crate::{Block, BlockType, DomainError};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

/// Nodo de contenido ya tipado.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentNode {
  pub block_type: BlockType,
  /// Bloque que representa este nodo, si el editor lo conoce.
  pub block_id: Option<i64>,
  pub text: String,
}

impl ContentNode {
  pub fn new(block_type: BlockType, text: impl Into<String>) -> Self {
    Self { block_type, block_id: None, text: text.into() }
  }

  pub fn referencing(mut self, block_id: i64) -> Self {
    self.block_id = Some(block_id);
    self
  }

  fn to_json(&self) -> JsonValue {
    let mut attrs = json!({ "blockId": self.block_id });
    if self.block_type == BlockType::Title {
      attrs["level"] = json!(1);
    }
    json!({
      "type": self.block_type.to_editor_type(),
      "attrs": attrs,
      "content": [ { "type": "text", "text": self.text } ],
    })
  }
}

/// Documento del editor: secuencia ordenada de nodos.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocState {
  pub nodes: Vec<ContentNode>,
}

#[derive(Deserialize)]
struct RawDoc {
  #[serde(default)]
  content: Option<Vec<RawNode>>,
}

#[derive(Deserialize)]
struct RawNode {
  #[serde(rename = "type", default)]
  node_type: Option<JsonValue>,
  #[serde(default)]
  attrs: Option<RawAttrs>,
  #[serde(default)]
  content: Option<Vec<JsonValue>>,
}

#[derive(Deserialize)]
struct RawAttrs {
  #[serde(rename = "blockId", default)]
  block_id: Option<JsonValue>,
}

fn at_node(index: usize, e: DomainError) -> DomainError {
  match e {
    DomainError::ValidationError(msg) => DomainError::ValidationError(format!("node {}: {}", index, msg)),
    other => other,
  }
}

fn invalid(index: usize, msg: impl Into<String>) -> DomainError {
  DomainError::ValidationError(format!("node {}: {}", index, msg.into()))
}

/// `null`, ausente o `""` significan "sin bloque"; se aceptan enteros y
/// cadenas con un entero.
fn parse_block_id(index: usize, raw: Option<&JsonValue>) -> Result<Option<i64>, DomainError> {
  match raw {
    None | Some(JsonValue::Null) => Ok(None),
    Some(JsonValue::Number(n)) => n.as_i64().map(Some).ok_or_else(|| invalid(index, format!("blockId inválido: {}", n))),
    Some(JsonValue::String(s)) if s.trim().is_empty() => Ok(None),
    Some(JsonValue::String(s)) => {
      s.trim().parse::<i64>().map(Some).map_err(|_| invalid(index, format!("blockId inválido: {}", s)))
    }
    Some(other) => Err(invalid(index, format!("blockId inválido: {}", other))),
  }
}

/// Texto del primer hijo que lleve un `text` de tipo cadena.
fn extract_text(index: usize, children: Option<&[JsonValue]>) -> Result<String, DomainError> {
  children.unwrap_or_default()
          .iter()
          .find_map(|child| child.get("text").and_then(JsonValue::as_str))
          .map(str::to_string)
          .ok_or_else(|| invalid(index, "no extractable text"))
}

impl DocState {
  pub fn new(nodes: Vec<ContentNode>) -> Self {
    Self { nodes }
  }

  /// Parsea y valida el documento completo.
  pub fn from_json(value: &JsonValue) -> Result<Self, DomainError> {
    let raw: RawDoc = serde_json::from_value(value.clone())?;
    let raw_nodes =
      raw.content
         .ok_or_else(|| DomainError::ValidationError("el documento no tiene un array 'content'".to_string()))?;
    let mut nodes = Vec::with_capacity(raw_nodes.len());
    for (index, node) in raw_nodes.into_iter().enumerate() {
      let editor_type = match node.node_type {
        Some(JsonValue::String(t)) => t,
        Some(other) => return Err(invalid(index, format!("unknown block type: {}", other))),
        None => return Err(invalid(index, "unknown block type: <missing>")),
      };
      let block_type = BlockType::from_editor_type(&editor_type).map_err(|e| at_node(index, e))?;
      let block_id = parse_block_id(index, node.attrs.as_ref().and_then(|a| a.block_id.as_ref()))?;
      let text = extract_text(index, node.content.as_deref())?;
      nodes.push(ContentNode { block_type, block_id, text });
    }
    Ok(Self { nodes })
  }

  pub fn from_json_str(s: &str) -> Result<Self, DomainError> {
    let value: JsonValue = serde_json::from_str(s)?;
    Self::from_json(&value)
  }

  /// Documento equivalente a una secuencia de bloques persistidos; cada nodo
  /// lleva el id de su bloque.
  pub fn from_blocks<'a>(blocks: impl IntoIterator<Item = &'a Block>) -> Self {
    let nodes = blocks.into_iter()
                      .map(|b| ContentNode { block_type: b.block_type, block_id: b.id, text: b.content.clone() })
                      .collect();
    Self { nodes }
  }

  pub fn to_json(&self) -> JsonValue {
    json!({
      "type": "doc",
      "content": self.nodes.iter().map(ContentNode::to_json).collect::<Vec<_>>(),
    })
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }
}
