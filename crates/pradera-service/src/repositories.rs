use pradera_store::{BlockRepository, BlockSearchRepository, BookRepository, FlowBlockRepository, FlowRepository,
                    UnitOfWork, UserDirectory};
use std::sync::Arc;

/// Colaboradores de persistencia que comparten los servicios.
#[derive(Clone)]
pub struct Repositories {
  pub users: Arc<dyn UserDirectory>,
  pub books: Arc<dyn BookRepository>,
  pub flows: Arc<dyn FlowRepository>,
  pub blocks: Arc<dyn BlockRepository>,
  pub flow_blocks: Arc<dyn FlowBlockRepository>,
  /// Transacciones del mismo store que `flows`, `blocks` y `flow_blocks`.
  pub unit_of_work: Arc<dyn UnitOfWork>,
  pub search: Arc<dyn BlockSearchRepository>,
}

impl Repositories {
  /// Usa un único store (en memoria o Diesel) para todas las entidades.
  pub fn from_store<S>(store: Arc<S>, search: Arc<dyn BlockSearchRepository>) -> Self
    where S: UserDirectory + BookRepository + FlowRepository + BlockRepository + FlowBlockRepository + UnitOfWork
            + 'static
  {
    Repositories { users: store.clone(),
                   books: store.clone(),
                   flows: store.clone(),
                   blocks: store.clone(),
                   flow_blocks: store.clone(),
                   unit_of_work: store,
                   search }
  }
}
