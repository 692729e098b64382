// Ejemplo: reconciliar dos versiones de un documento sobre el store en memoria
// y mostrar el historial del título.
use pradera_domain::Flow;
use pradera_service::{Repositories, ServiceConfig, Services};
use pradera_store::{InMemoryBlockSearch, InMemoryStore};
use serde_json::json;
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
  let repos = Repositories::from_store(Arc::new(InMemoryStore::new()), Arc::new(InMemoryBlockSearch::new()));
  let services = Services::new(&repos, &ServiceConfig::default());

  let flow = services.flows.create(Flow::new("official").owned_by(2))?;
  let flow_id = flow.id.ok_or("flow sin id")?;

  let first = json!({ "type": "doc", "content": [
    { "type": "heading", "content": [ { "type": "text", "text": "This is a Title" } ] },
    { "type": "paragraph", "content": [ { "type": "text", "text": "Hello world" } ] },
    { "type": "paragraph", "content": [ { "type": "text", "text": "bye" } ] }
  ]});
  let document = services.flows.update_doc_state("user", flow_id, &first)?;
  println!("v{}:\n{}", document.flow.version, document);

  // el editor devuelve los ids que recibió
  let ids = document.block_ids();
  let second = json!({ "type": "doc", "content": [
    { "type": "heading", "attrs": { "blockId": ids[0] }, "content": [ { "type": "text", "text": "New title" } ] },
    { "type": "paragraph", "attrs": { "blockId": ids[1] }, "content": [ { "type": "text", "text": "Hello world" } ] },
    { "type": "paragraph", "content": [ { "type": "text", "text": "ok" } ] }
  ]});
  let document = services.flows.update_doc_state("user", flow_id, &second)?;
  println!("v{}:\n{}", document.flow.version, document);

  let title_id = document.block_ids()[0];
  for block in services.blocks.history(title_id)? {
    println!("  {}", block);
  }
  Ok(())
}
