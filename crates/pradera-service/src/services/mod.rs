mod block_service;
mod book_service;
mod flow_block_service;
mod flow_service;

pub use block_service::BlockService;
pub use book_service::BookService;
pub use flow_block_service::FlowBlockService;
pub use flow_service::FlowService;

use crate::config::ServiceConfig;
use crate::repositories::Repositories;

/// Todos los servicios construidos sobre los mismos repositorios.
pub struct Services {
  pub blocks: BlockService,
  pub flows: FlowService,
  pub books: BookService,
  pub flow_blocks: FlowBlockService,
}

impl Services {
  pub fn new(repos: &Repositories, config: &ServiceConfig) -> Self {
    Services { blocks: BlockService::new(repos, config.clone()),
               flows: FlowService::new(repos, config.clone()),
               books: BookService::new(repos, config.clone()),
               flow_blocks: FlowBlockService::new(repos, config.clone()) }
  }
}
