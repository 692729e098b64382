use crate::config::ServiceConfig;
use crate::criteria::{EntityCriteria, FlowCriteria};
use crate::crud;
use crate::errors::{Result, ServiceError};
use crate::reconciler::DocumentReconciler;
use crate::repositories::Repositories;
use log::debug;
use pradera_domain::{Block, DocState, DocumentEntry, Flow, FlowDocument, FlowPatch};
use pradera_store::{BlockRepository, FlowBlockRepository, FlowRepository, Page, Pageable, Specification,
                    UserDirectory};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;

/// Gestión de flows y de su documento ordenado de bloques.
pub struct FlowService {
  flows: Arc<dyn FlowRepository>,
  blocks: Arc<dyn BlockRepository>,
  flow_blocks: Arc<dyn FlowBlockRepository>,
  users: Arc<dyn UserDirectory>,
  reconciler: DocumentReconciler,
  config: ServiceConfig,
}

impl FlowService {
  pub fn new(repos: &Repositories, config: ServiceConfig) -> Self {
    let reconciler =
      DocumentReconciler::from_repositories(repos, config.fingerprint.build(), config.search_on_reconcile);
    FlowService { flows: repos.flows.clone(),
                  blocks: repos.blocks.clone(),
                  flow_blocks: repos.flow_blocks.clone(),
                  users: repos.users.clone(),
                  reconciler,
                  config }
  }

  pub fn create(&self, flow: Flow) -> Result<Flow> {
    crud::create(self.flows.as_ref(), flow)
  }

  pub fn update(&self, id: i64, flow: Flow) -> Result<Flow> {
    crud::update(self.flows.as_ref(), id, flow)
  }

  pub fn partial_update(&self, id: i64, patch: FlowPatch) -> Result<Flow> {
    crud::partial_update(self.flows.as_ref(), id, patch)
  }

  pub fn find_all(&self, pageable: &Pageable) -> Result<Page<Flow>> {
    crud::find_page(self.flows.as_ref(), &Specification::all(), &self.config.clamp(pageable))
  }

  pub fn find_one(&self, id: i64) -> Result<Option<Flow>> {
    crud::find_one(self.flows.as_ref(), id)
  }

  pub fn find_by_criteria(&self, criteria: &FlowCriteria, pageable: &Pageable) -> Result<Page<Flow>> {
    crud::find_page(self.flows.as_ref(), &criteria.to_specification(), &self.config.clamp(pageable))
  }

  pub fn count_by_criteria(&self, criteria: &FlowCriteria) -> Result<u64> {
    crud::count(self.flows.as_ref(), &criteria.to_specification())
  }

  pub fn find_by_user_login(&self, login: &str) -> Result<Vec<Flow>> {
    let user = self.users
                   .find_by_login(login)?
                   .ok_or_else(|| ServiceError::NotFound(format!("unknown user: {}", login)))?;
    Ok(self.flows.find_by_user_id(user.id)?)
  }

  /// Borra el flow junto con sus filas de orden. Los bloques se conservan.
  pub fn delete(&self, id: i64) -> Result<()> {
    debug!("Request to delete flow : {}", id);
    let detached = self.flow_blocks.delete_by_flow_id(id)?;
    self.flows.delete_by_id(id)?;
    debug!("flow {} borrado ({} filas flow_block)", id, detached);
    Ok(())
  }

  /// Documento actual del flow: sus bloques en orden.
  pub fn document(&self, flow_id: i64) -> Result<FlowDocument> {
    let flow = self.flows
                   .find_by_id(flow_id)?
                   .ok_or_else(|| ServiceError::NotFound(format!("flow {}", flow_id)))?;
    // un mismo bloque puede ocupar varias posiciones
    let blocks: HashMap<i64, Block> = self.blocks
                                          .find_by_flow_id(flow_id)?
                                          .into_iter()
                                          .filter_map(|b| b.id.map(|id| (id, b)))
                                          .collect();
    let entries = self.flow_blocks
                      .find_by_flow_id(flow_id)?
                      .into_iter()
                      .map(|row| {
                        let block = blocks.get(&row.block_id).cloned().ok_or_else(|| {
                                      ServiceError::Storage(format!("flowBlock {:?} sin bloque {}", row.id, row.block_id))
                                    })?;
                        Ok(DocumentEntry { flow_block_id: row.id, block_order: row.block_order, block })
                      })
                      .collect::<Result<Vec<_>>>()?;
    Ok(FlowDocument { flow, entries })
  }

  /// Documento en el formato JSON del editor. Reenviarlo sin cambios a
  /// `update_doc_state` no crea bloques.
  pub fn doc_state(&self, flow_id: i64) -> Result<JsonValue> {
    let document = self.document(flow_id)?;
    Ok(DocState::from_blocks(document.blocks()).to_json())
  }

  /// Reconcilia el documento del editor con los bloques del flow.
  pub fn update_doc_state(&self, login: &str, flow_id: i64, doc: &JsonValue) -> Result<FlowDocument> {
    self.reconciler.reconcile(login, flow_id, doc)
  }

  /// Como `update_doc_state` con control explícito de versión.
  pub fn update_doc_state_at_version(&self,
                                     login: &str,
                                     flow_id: i64,
                                     expected_version: i64,
                                     doc: &JsonValue)
                                     -> Result<FlowDocument> {
    self.reconciler.reconcile_at_version(login, flow_id, expected_version, doc)
  }
}
