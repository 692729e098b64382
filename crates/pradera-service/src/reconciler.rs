//! Reconciliación del documento del editor con los bloques persistidos de un
//! flow.
//!
//! El documento se procesa en dos fases:
//!
//! 1. Planificación (sin escrituras): se parsea el documento completo, se
//!    resuelven usuario y flow, y cada nodo se clasifica como `Keep`
//!    (mismo tipo y contenido que el bloque referenciado), `Revise` (bloque
//!    referenciado con cambios) o `Create` (nodo sin `blockId`). Un
//!    `blockId` que no pertenece al flow aborta aquí.
//! 2. Escritura, en una sola transacción del store: se reserva la versión
//!    del flow, se borran sus filas `FlowBlock` y se reconstruyen en orden
//!    1..N, guardando antes los bloques nuevos o revisados. Si algo falla no
//!    queda ninguna de estas escrituras.
//! 3. Tras confirmar, los bloques nuevos o revisados se replican en el
//!    índice de búsqueda.
//!
//! Los bloques existentes nunca se modifican: un cambio crea un bloque nuevo
//! cuyo `parent_id` apunta al anterior.
use crate::errors::{Result, ServiceError};
use crate::repositories::Repositories;
use indexmap::IndexMap;
use log::{debug, info, warn};
use pradera_domain::{Block, ContentFingerprint, ContentNode, DocState, DocumentEntry, Flow, FlowBlock, FlowDocument,
                     User};
use pradera_store::{BlockRepository, BlockSearchRepository, FlowRepository, PersistResult, Result as StoreResult,
                    StoreError, StoreTransaction, UnitOfWork, UserDirectory};
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Decisión para una posición del documento. `Revise` y `Create` llevan el
/// bloque listo para insertar.
#[derive(Debug, Clone, PartialEq)]
enum Step {
  Keep(Block),
  Revise(Block),
  Create(Block),
}

/// Recuento de decisiones de una reconciliación.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ReconcileSummary {
  kept: usize,
  revised: usize,
  created: usize,
  /// Filas `FlowBlock` borradas antes de reconstruir.
  detached: u64,
}

/// Lo que deja escrito una transacción confirmada.
struct Written {
  new_version: i64,
  entries: Vec<DocumentEntry>,
  /// Bloques insertados, pendientes de indexar.
  inserted: Vec<Block>,
  summary: ReconcileSummary,
}

pub struct DocumentReconciler {
  users: Arc<dyn UserDirectory>,
  flows: Arc<dyn FlowRepository>,
  blocks: Arc<dyn BlockRepository>,
  unit_of_work: Arc<dyn UnitOfWork>,
  search: Option<Arc<dyn BlockSearchRepository>>,
  fingerprint: Arc<dyn ContentFingerprint>,
}

impl DocumentReconciler {
  pub fn new(users: Arc<dyn UserDirectory>,
             flows: Arc<dyn FlowRepository>,
             blocks: Arc<dyn BlockRepository>,
             unit_of_work: Arc<dyn UnitOfWork>,
             fingerprint: Arc<dyn ContentFingerprint>)
             -> Self {
    DocumentReconciler { users, flows, blocks, unit_of_work, search: None, fingerprint }
  }

  /// Replica en `search` los bloques que se creen.
  pub fn with_search(mut self, search: Arc<dyn BlockSearchRepository>) -> Self {
    self.search = Some(search);
    self
  }

  pub fn from_repositories(repos: &Repositories, fingerprint: Arc<dyn ContentFingerprint>, index: bool) -> Self {
    let reconciler = DocumentReconciler::new(repos.users.clone(),
                                             repos.flows.clone(),
                                             repos.blocks.clone(),
                                             repos.unit_of_work.clone(),
                                             fingerprint);
    if index {
      reconciler.with_search(repos.search.clone())
    } else {
      reconciler
    }
  }

  /// Reconcilia el documento JSON del editor con el flow `flow_id` usando la
  /// versión que tenga el flow al leerlo.
  pub fn reconcile(&self, login: &str, flow_id: i64, doc: &JsonValue) -> Result<FlowDocument> {
    let state = DocState::from_json(doc)?;
    self.reconcile_state(login, flow_id, &state, None)
  }

  /// Como `reconcile`, pero falla con `Conflict` si la versión del flow no
  /// es `expected_version`.
  pub fn reconcile_at_version(&self,
                              login: &str,
                              flow_id: i64,
                              expected_version: i64,
                              doc: &JsonValue)
                              -> Result<FlowDocument> {
    let state = DocState::from_json(doc)?;
    self.reconcile_state(login, flow_id, &state, Some(expected_version))
  }

  /// Reconciliación sobre un documento ya parseado.
  pub fn reconcile_state(&self,
                         login: &str,
                         flow_id: i64,
                         state: &DocState,
                         expected_version: Option<i64>)
                         -> Result<FlowDocument> {
    debug!("Request to update doc state of flow {} by '{}' ({} nodos)", flow_id, login, state.len());
    let user = self.resolve_user(login)?;
    let flow = self.flows
                   .find_by_id(flow_id)?
                   .ok_or_else(|| ServiceError::NotFound(format!("flow {}", flow_id)))?;

    let before = self.snapshot(flow_id)?;
    let plan = plan(flow_id, &state.nodes, &before, &user, self.fingerprint.as_ref())?;

    let expected = expected_version.unwrap_or(flow.version);
    let mut written = None;
    self.unit_of_work.transaction(&mut |tx| {
                       written = Some(write_plan(tx, flow_id, expected, &plan)?);
                       Ok(())
                     })?;
    let Written { new_version, entries, inserted, summary } =
      written.ok_or_else(|| ServiceError::Storage(format!("flow {}: la transacción no llegó a ejecutarse", flow_id)))?;

    self.index(&inserted);
    info!("flow {} reconciliado v{}: {} conservados, {} revisados, {} nuevos, {} filas previas",
          flow_id, new_version, summary.kept, summary.revised, summary.created, summary.detached);
    Ok(FlowDocument { flow: Flow { version: new_version, ..flow }, entries })
  }

  fn resolve_user(&self, login: &str) -> Result<User> {
    if login.trim().is_empty() {
      return Err(ServiceError::NotFound("unknown user: (vacío)".to_string()));
    }
    self.users
        .find_by_login(login)?
        .ok_or_else(|| ServiceError::NotFound(format!("unknown user: {}", login)))
  }

  /// Bloques actuales del flow por id, en orden de documento.
  fn snapshot(&self, flow_id: i64) -> Result<IndexMap<i64, Block>> {
    let mut before = IndexMap::new();
    for block in self.blocks.find_by_flow_id(flow_id)? {
      let id = block.id
                    .ok_or_else(|| ServiceError::Storage(format!("flow {}: bloque sin id", flow_id)))?;
      before.insert(id, block);
    }
    Ok(before)
  }

  /// El documento ya está confirmado: un fallo del índice no lo deshace, se
  /// corrige con `BlockService::rebuild_index`.
  fn index(&self, inserted: &[Block]) {
    let Some(search) = &self.search else { return };
    for block in inserted {
      if let Err(e) = search.index(block) {
        warn!("no se pudo indexar el bloque {:?}: {}", block.id, e);
      }
    }
  }
}

/// Clasifica cada nodo frente a los bloques actuales del flow y prepara los
/// bloques a insertar, con `author` como dueño.
fn plan(flow_id: i64,
        nodes: &[ContentNode],
        before: &IndexMap<i64, Block>,
        author: &User,
        fingerprint: &dyn ContentFingerprint)
        -> Result<Vec<Step>> {
  nodes.iter()
       .map(|node| {
         let hash = || fingerprint.fingerprint(node.block_type, &node.text);
         match node.block_id {
           None => Ok(Step::Create(Block::new(node.block_type, node.text.clone(), author.id, hash()))),
           Some(id) => {
             let existing = before.get(&id).ok_or_else(|| {
                                              warn!("blockId {} no pertenece al flow {}", id, flow_id);
                                              ServiceError::NotFound(format!("block {} is not part of flow {}",
                                                                             id, flow_id))
                                            })?;
             if existing.has_same_content(node.block_type, &node.text) {
               Ok(Step::Keep(existing.clone()))
             } else {
               Ok(Step::Revise(existing.revise(node.block_type, node.text.clone(), author.id, hash())?))
             }
           }
         }
       })
       .collect()
}

/// Escrituras de una reconciliación sobre una transacción abierta.
fn write_plan(tx: &dyn StoreTransaction, flow_id: i64, expected: i64, plan: &[Step]) -> StoreResult<Written> {
  let new_version = match tx.lock_for_update(flow_id, expected)? {
    PersistResult::Ok { new_version } => new_version,
    PersistResult::Conflict { current_version } => {
      warn!("flow {}: versión esperada {}, actual {}", flow_id, expected, current_version);
      return Err(StoreError::Conflict(format!("flow {} was modified concurrently (expected version {}, found {})",
                                              flow_id, expected, current_version)));
    }
  };

  let mut summary = ReconcileSummary { detached: tx.delete_flow_blocks(flow_id)?, ..Default::default() };
  let mut entries = Vec::with_capacity(plan.len());
  let mut inserted = Vec::new();
  for (i, step) in plan.iter().enumerate() {
    let order = i as i64 + 1;
    let block = match step {
      Step::Keep(block) => {
        summary.kept += 1;
        block.clone()
      }
      Step::Revise(block) => {
        summary.revised += 1;
        insert_block(tx, block, &mut inserted)?
      }
      Step::Create(block) => {
        summary.created += 1;
        insert_block(tx, block, &mut inserted)?
      }
    };
    let block_id = block.id
                        .ok_or_else(|| StoreError::Storage("el store no asignó id al bloque".to_string()))?;
    let row = tx.save_flow_block(FlowBlock::new(flow_id, block_id, order))?;
    entries.push(DocumentEntry { flow_block_id: row.id, block_order: order, block });
  }
  Ok(Written { new_version, entries, inserted, summary })
}

fn insert_block(tx: &dyn StoreTransaction, block: &Block, inserted: &mut Vec<Block>) -> StoreResult<Block> {
  let saved = tx.save_block(block.clone())?;
  debug!("bloque guardado: {}", saved);
  inserted.push(saved.clone());
  Ok(saved)
}
