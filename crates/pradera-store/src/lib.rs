//! Crate `pradera-store` — contratos de persistencia y stores en memoria
//!
//! Define los traits que la capa de servicios usa para leer y escribir
//! entidades (`CrudRepository<E>` y sus extensiones por entidad), el
//! directorio de usuarios, el índice de búsqueda de bloques, la paginación y
//! los filtros tipados que se traducen a `Specification<T>`.
//!
//! Diseño resumido:
//! - Ids asignados por el store en el primer `save`.
//! - Locking optimista: `FlowRepository::lock_for_update` compara e
//!   incrementa la versión del flow (`PersistResult::Conflict` si no
//!   coincide).
//! - `UnitOfWork::transaction` agrupa escrituras que deben aplicarse todas o
//!   ninguna (la reconciliación de un documento).
//! - `InMemoryStore` e `InMemoryBlockSearch` sirven para pruebas y demos; la
//!   implementación durable vive en `pradera-persistence`.
//!
//! Ejemplo rápido:
//! ```rust
//! use pradera_store::{CrudRepository, InMemoryStore, Pageable, Specification};
//! use pradera_domain::Book;
//! let store = InMemoryStore::new();
//! let book = CrudRepository::<Book>::save(&store, Book::new("first book")).unwrap();
//! let page = CrudRepository::<Book>::find_all(&store, &Specification::all(), &Pageable::default()).unwrap();
//! assert_eq!(page.content, vec![book]);
//! ```
pub mod criteria;
pub mod errors;
pub mod paging;
pub mod repository;
pub mod search;
pub mod stubs;

pub use criteria::*;
pub use errors::*;
pub use paging::*;
pub use repository::*;
pub use search::*;
pub use stubs::*;
