use crate::config::ServiceConfig;
use crate::criteria::{EntityCriteria, FlowBlockCriteria};
use crate::crud;
use crate::errors::Result;
use crate::repositories::Repositories;
use log::debug;
use pradera_domain::{FlowBlock, FlowBlockPatch};
use pradera_store::{FlowBlockRepository, Page, Pageable, Specification};
use std::sync::Arc;

/// CRUD directo de filas de orden. La reconciliación no pasa por aquí.
pub struct FlowBlockService {
  flow_blocks: Arc<dyn FlowBlockRepository>,
  config: ServiceConfig,
}

impl FlowBlockService {
  pub fn new(repos: &Repositories, config: ServiceConfig) -> Self {
    FlowBlockService { flow_blocks: repos.flow_blocks.clone(), config }
  }

  /// `NotFound` si el flow o el bloque no existen; `Conflict` si el flow ya
  /// tiene una fila en esa posición. Lo mismo vale para `update` y
  /// `partial_update`.
  pub fn create(&self, flow_block: FlowBlock) -> Result<FlowBlock> {
    crud::create(self.flow_blocks.as_ref(), flow_block)
  }

  pub fn update(&self, id: i64, flow_block: FlowBlock) -> Result<FlowBlock> {
    crud::update(self.flow_blocks.as_ref(), id, flow_block)
  }

  pub fn partial_update(&self, id: i64, patch: FlowBlockPatch) -> Result<FlowBlock> {
    crud::partial_update(self.flow_blocks.as_ref(), id, patch)
  }

  pub fn find_all(&self, pageable: &Pageable) -> Result<Page<FlowBlock>> {
    crud::find_page(self.flow_blocks.as_ref(), &Specification::all(), &self.config.clamp(pageable))
  }

  pub fn find_one(&self, id: i64) -> Result<Option<FlowBlock>> {
    crud::find_one(self.flow_blocks.as_ref(), id)
  }

  pub fn find_by_criteria(&self, criteria: &FlowBlockCriteria, pageable: &Pageable) -> Result<Page<FlowBlock>> {
    crud::find_page(self.flow_blocks.as_ref(), &criteria.to_specification(), &self.config.clamp(pageable))
  }

  pub fn count_by_criteria(&self, criteria: &FlowBlockCriteria) -> Result<u64> {
    crud::count(self.flow_blocks.as_ref(), &criteria.to_specification())
  }

  pub fn find_by_flow_id(&self, flow_id: i64) -> Result<Vec<FlowBlock>> {
    Ok(self.flow_blocks.find_by_flow_id(flow_id)?)
  }

  pub fn delete(&self, id: i64) -> Result<()> {
    debug!("Request to delete flowBlock : {}", id);
    Ok(self.flow_blocks.delete_by_id(id)?)
  }
}
