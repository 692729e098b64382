//! pradera-service: servicios de documentos
//!
//! Capa de servicios sobre los contratos de `pradera-store`: la
//! reconciliación de documentos del editor (`DocumentReconciler`), los
//! servicios CRUD por entidad, los criterios de búsqueda y la configuración.
//!
//! Ejemplo rápido:
//! ```rust
//! use pradera_service::{Repositories, ServiceConfig, Services};
//! use pradera_store::{InMemoryBlockSearch, InMemoryStore};
//! use pradera_domain::Flow;
//! use std::sync::Arc;
//! let repos = Repositories::from_store(Arc::new(InMemoryStore::new()), Arc::new(InMemoryBlockSearch::new()));
//! let services = Services::new(&repos, &ServiceConfig::default());
//! let flow = services.flows.create(Flow::new("official").owned_by(2)).unwrap();
//! let doc = serde_json::json!({ "type": "doc", "content": [
//!   { "type": "heading", "content": [ { "type": "text", "text": "This is a Title" } ] }
//! ]});
//! let document = services.flows.update_doc_state("user", flow.id.unwrap(), &doc).unwrap();
//! assert_eq!(document.to_string(), "# This is a Title\n");
//! ```

pub mod config;
pub mod criteria;
mod crud;
pub mod errors;
pub mod reconciler;
pub mod repositories;
pub mod services;

pub use config::{FingerprintStrategy, ServiceConfig};
pub use criteria::{BlockCriteria, BookCriteria, EntityCriteria, FlowBlockCriteria, FlowCriteria};
pub use errors::ServiceError;
pub use reconciler::DocumentReconciler;
pub use repositories::Repositories;
pub use services::{BlockService, BookService, FlowBlockService, FlowService, Services};
