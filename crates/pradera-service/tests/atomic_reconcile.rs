// Una reconciliación que falla a mitad de la escritura no deja rastro.
mod common;

use common::{doc, failing_services, node, orders, seed_official};
use pradera_domain::Block;
use pradera_persistence::DieselStore;
use pradera_service::{BlockCriteria, ServiceError, Services};
use pradera_store::{InMemoryBlockSearch, InMemoryStore, Pageable};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use uuid::Uuid;

/// Revisa el título, conserva "Hello world" y añade dos párrafos: tres
/// inserciones de bloque.
fn edited(seeded: &[Block]) -> JsonValue {
  doc(vec![node("heading", "New title", seeded[0].id),
           node("paragraph", "Hello world", seeded[1].id),
           node("paragraph", "ok", None),
           node("paragraph", "more", None)])
}

fn assert_untouched(services: &Services, flow_id: i64, seeded: &[Block]) {
  assert_eq!(orders(services, flow_id), vec![1, 2, 3]);
  let document = services.flows.document(flow_id).unwrap();
  assert_eq!(document.flow.version, 0);
  assert_eq!(document.block_ids(), seeded.iter().map(|b| b.id.unwrap()).collect::<Vec<_>>());
  assert_eq!(services.blocks.count_by_criteria(&BlockCriteria::default()).unwrap(), 3);
}

#[test]
fn failed_block_save_keeps_previous_document() {
  let services = failing_services(Arc::new(InMemoryStore::new()), Arc::new(InMemoryBlockSearch::new()), 2);
  let (flow, seeded) = seed_official(&services);
  let flow_id = flow.id.unwrap();

  let err = services.flows.update_doc_state("user", flow_id, &edited(&seeded)).unwrap_err();

  assert!(matches!(err, ServiceError::Storage(ref m) if m.contains("disco lleno")), "{:?}", err);
  assert_untouched(&services, flow_id, &seeded);
  // nada llega al índice
  assert_eq!(services.blocks.search("new title", &Pageable::default()).unwrap().total_elements, 0);

  // la versión no se consumió: reintentar con la misma versión funciona
  let document = services.flows.update_doc_state_at_version("user", flow_id, 0, &edited(&seeded)).unwrap();
  assert_eq!(document.flow.version, 1);
  assert_eq!(orders(&services, flow_id), vec![1, 2, 3, 4]);
  assert_eq!(services.blocks.search("new title", &Pageable::default()).unwrap().total_elements, 1);
}

#[test]
fn failure_on_first_insert_keeps_previous_document() {
  let services = failing_services(Arc::new(InMemoryStore::new()), Arc::new(InMemoryBlockSearch::new()), 1);
  let (flow, seeded) = seed_official(&services);
  let flow_id = flow.id.unwrap();

  assert!(services.flows.update_doc_state("user", flow_id, &edited(&seeded)).is_err());
  assert_untouched(&services, flow_id, &seeded);
}

#[test]
fn failed_block_save_is_rolled_back_on_sqlite() {
  let tmp_path = std::env::temp_dir().join(format!("pradera_atomic_{}.db", Uuid::new_v4()));
  let store = Arc::new(DieselStore::new(tmp_path.to_str().unwrap()).expect("failed to create store"));
  let services = failing_services(store, Arc::new(InMemoryBlockSearch::new()), 3);
  let (flow, seeded) = seed_official(&services);
  let flow_id = flow.id.unwrap();

  let err = services.flows.update_doc_state("user", flow_id, &edited(&seeded)).unwrap_err();

  assert!(matches!(err, ServiceError::Storage(_)), "{:?}", err);
  assert_untouched(&services, flow_id, &seeded);
}
