use crate::config::ServiceConfig;
use crate::criteria::{BlockCriteria, EntityCriteria};
use crate::crud;
use crate::errors::{Result, ServiceError};
use crate::repositories::Repositories;
use log::{debug, warn};
use pradera_domain::{Block, BlockPatch, ContentFingerprint};
use pradera_store::{BlockRepository, BlockSearchRepository, Page, Pageable, Specification, UserDirectory};
use std::collections::HashSet;
use std::sync::Arc;

/// Gestión de bloques: CRUD, búsqueda de texto e historial de revisiones.
///
/// Las escrituras se replican en el índice de búsqueda.
pub struct BlockService {
  blocks: Arc<dyn BlockRepository>,
  users: Arc<dyn UserDirectory>,
  search: Arc<dyn BlockSearchRepository>,
  fingerprint: Arc<dyn ContentFingerprint>,
  config: ServiceConfig,
}

impl BlockService {
  pub fn new(repos: &Repositories, config: ServiceConfig) -> Self {
    BlockService { blocks: repos.blocks.clone(),
                   users: repos.users.clone(),
                   search: repos.search.clone(),
                   fingerprint: config.fingerprint.build(),
                   config }
  }

  /// Alta de un bloque. Un `hash` vacío se calcula con la estrategia
  /// configurada.
  pub fn create(&self, mut block: Block) -> Result<Block> {
    if block.hash.trim().is_empty() {
      block.hash = self.fingerprint.fingerprint(block.block_type, &block.content);
    }
    let saved = crud::create(self.blocks.as_ref(), block)?;
    self.search.index(&saved)?;
    Ok(saved)
  }

  pub fn update(&self, id: i64, block: Block) -> Result<Block> {
    let saved = crud::update(self.blocks.as_ref(), id, block)?;
    self.search.index(&saved)?;
    Ok(saved)
  }

  pub fn partial_update(&self, id: i64, patch: BlockPatch) -> Result<Block> {
    let saved = crud::partial_update(self.blocks.as_ref(), id, patch)?;
    self.search.index(&saved)?;
    Ok(saved)
  }

  pub fn find_all(&self, pageable: &Pageable) -> Result<Page<Block>> {
    crud::find_page(self.blocks.as_ref(), &Specification::all(), &self.config.clamp(pageable))
  }

  pub fn find_one(&self, id: i64) -> Result<Option<Block>> {
    crud::find_one(self.blocks.as_ref(), id)
  }

  pub fn find_by_criteria(&self, criteria: &BlockCriteria, pageable: &Pageable) -> Result<Page<Block>> {
    crud::find_page(self.blocks.as_ref(), &criteria.to_specification(), &self.config.clamp(pageable))
  }

  pub fn count_by_criteria(&self, criteria: &BlockCriteria) -> Result<u64> {
    crud::count(self.blocks.as_ref(), &criteria.to_specification())
  }

  /// Borra el bloque y su entrada del índice. Un bloque todavía usado por
  /// un flow o con revisiones hijas no se puede borrar.
  pub fn delete(&self, id: i64) -> Result<()> {
    debug!("Request to delete block : {}", id);
    if self.blocks.is_referenced(id)? {
      warn!("block {} sigue referenciado; no se borra", id);
      return Err(ServiceError::Conflict(format!("block {} is still referenced by a flow or a revision", id)));
    }
    self.blocks.delete_by_id(id)?;
    self.search.remove(id)?;
    Ok(())
  }

  /// Búsqueda de texto en el índice (ver `BlockSearchRepository`).
  pub fn search(&self, query: &str, pageable: &Pageable) -> Result<Page<Block>> {
    debug!("Request to search for a page of blocks for query {}", query);
    Ok(self.search.search(query, &self.config.clamp(pageable))?)
  }

  pub fn find_by_flow_id(&self, flow_id: i64) -> Result<Vec<Block>> {
    Ok(self.blocks.find_by_flow_id(flow_id)?)
  }

  pub fn find_by_user_login(&self, login: &str) -> Result<Vec<Block>> {
    let user = self.users
                   .find_by_login(login)?
                   .ok_or_else(|| ServiceError::NotFound(format!("unknown user: {}", login)))?;
    Ok(self.blocks.find_by_user_id(user.id)?)
  }

  /// Cadena de revisiones desde `block_id` hacia atrás (la más reciente
  /// primero). Se detiene ante un padre inexistente o un ciclo.
  pub fn history(&self, block_id: i64) -> Result<Vec<Block>> {
    let mut current = self.blocks
                          .find_by_id(block_id)?
                          .ok_or_else(|| ServiceError::NotFound(format!("block {}", block_id)))?;
    let mut seen = HashSet::from([block_id]);
    let mut chain = Vec::new();
    loop {
      let parent_id = current.parent_id;
      chain.push(current);
      let Some(parent_id) = parent_id else { break };
      if !seen.insert(parent_id) {
        warn!("ciclo en la cadena de revisiones de block {} (en {})", block_id, parent_id);
        break;
      }
      match self.blocks.find_by_id(parent_id)? {
        Some(parent) => current = parent,
        None => {
          warn!("block {}: padre {} inexistente", block_id, parent_id);
          break;
        }
      }
    }
    Ok(chain)
  }

  /// Vacía el índice y vuelve a indexar todos los bloques del store.
  pub fn rebuild_index(&self) -> Result<u64> {
    self.search.clear()?;
    let all = self.blocks.find_all(&Specification::all(), &Pageable::unpaged())?;
    for block in &all.content {
      self.search.index(block)?;
    }
    debug!("índice reconstruido con {} bloques", all.total_elements);
    Ok(all.total_elements)
  }
}
