// Utilidades compartidas por las pruebas de integración del servicio.
#![allow(dead_code)]

use pradera_domain::{Block, BlockType, Flow, FlowBlock};
use pradera_service::{Repositories, ServiceConfig, Services};
use pradera_store::{InMemoryBlockSearch, InMemoryStore, PersistResult, Result as StoreResult, StoreError,
                    StoreTransaction, UnitOfWork};
use serde_json::{json, Value as JsonValue};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub struct Fixture {
  pub store: Arc<InMemoryStore>,
  pub search: Arc<InMemoryBlockSearch>,
  pub services: Services,
}

pub fn in_memory() -> Fixture {
  in_memory_with(ServiceConfig::default())
}

pub fn in_memory_with(config: ServiceConfig) -> Fixture {
  let store = Arc::new(InMemoryStore::new());
  let search = Arc::new(InMemoryBlockSearch::new());
  let repos = Repositories::from_store(store.clone(), search.clone());
  let services = Services::new(&repos, &config);
  Fixture { store, search, services }
}

/// Nodo del editor. `block_id` vacío significa nodo nuevo.
pub fn node(editor_type: &str, text: &str, block_id: Option<i64>) -> JsonValue {
  json!({
    "type": editor_type,
    "attrs": { "blockId": block_id },
    "content": [ { "type": "text", "text": text } ],
  })
}

pub fn doc(nodes: Vec<JsonValue>) -> JsonValue {
  json!({ "type": "doc", "content": nodes })
}

/// Flow "official" del usuario `user` con
/// [TITLE "This is a Title", PARAGRAPH "Hello world", PARAGRAPH "bye"].
pub fn seed_official(services: &Services) -> (Flow, Vec<Block>) {
  let flow = services.flows.create(Flow::new("official").owned_by(2)).unwrap();
  let flow_id = flow.id.unwrap();
  let contents = [(BlockType::Title, "This is a Title"),
                  (BlockType::Paragraph, "Hello world"),
                  (BlockType::Paragraph, "bye")];
  let blocks: Vec<Block> = contents.iter()
                                   .enumerate()
                                   .map(|(i, (t, c))| {
                                     let block = services.blocks.create(Block::new(*t, *c, 2, "hash")).unwrap();
                                     services.flow_blocks
                                             .create(FlowBlock::new(flow_id, block.id.unwrap(), i as i64 + 1))
                                             .unwrap();
                                     block
                                   })
                                   .collect();
  (flow, blocks)
}

pub fn orders(services: &Services, flow_id: i64) -> Vec<i64> {
  services.flow_blocks.find_by_flow_id(flow_id).unwrap().iter().map(|fb| fb.block_order).collect()
}

/// Transacciones de `inner` en las que el `fail_at`-ésimo `save_block`
/// (contando desde 1 y entre todas las transacciones) falla con `Storage`.
pub struct FailingSaves<S> {
  inner: Arc<S>,
  fail_at: usize,
  saves: AtomicUsize,
}

impl<S: UnitOfWork> FailingSaves<S> {
  pub fn new(inner: Arc<S>, fail_at: usize) -> Self {
    FailingSaves { inner, fail_at, saves: AtomicUsize::new(0) }
  }
}

struct FailingTransaction<'a> {
  inner: &'a dyn StoreTransaction,
  fail_at: usize,
  saves: &'a AtomicUsize,
}

impl StoreTransaction for FailingTransaction<'_> {
  fn lock_for_update(&self, flow_id: i64, expected_version: i64) -> StoreResult<PersistResult> {
    self.inner.lock_for_update(flow_id, expected_version)
  }

  fn delete_flow_blocks(&self, flow_id: i64) -> StoreResult<u64> {
    self.inner.delete_flow_blocks(flow_id)
  }

  fn save_block(&self, block: Block) -> StoreResult<Block> {
    if self.saves.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_at {
      return Err(StoreError::Storage("disco lleno".to_string()));
    }
    self.inner.save_block(block)
  }

  fn save_flow_block(&self, flow_block: FlowBlock) -> StoreResult<FlowBlock> {
    self.inner.save_flow_block(flow_block)
  }
}

impl<S: UnitOfWork> UnitOfWork for FailingSaves<S> {
  fn transaction(&self, work: &mut dyn FnMut(&dyn StoreTransaction) -> StoreResult<()>) -> StoreResult<()> {
    self.inner.transaction(&mut |tx| {
                work(&FailingTransaction { inner: tx, fail_at: self.fail_at, saves: &self.saves })
              })
  }
}

/// Servicios sobre `store` cuyas transacciones fallan en el `fail_at`-ésimo
/// `save_block`.
pub fn failing_services<S>(store: Arc<S>, search: Arc<InMemoryBlockSearch>, fail_at: usize) -> Services
  where S: UnitOfWork
           + pradera_store::UserDirectory
           + pradera_store::BookRepository
           + pradera_store::FlowRepository
           + pradera_store::BlockRepository
           + pradera_store::FlowBlockRepository
           + 'static
{
  let mut repos = Repositories::from_store(store.clone(), search);
  repos.unit_of_work = Arc::new(FailingSaves::new(store, fail_at));
  Services::new(&repos, &ServiceConfig::default())
}
