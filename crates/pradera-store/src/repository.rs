// Archivo: repository.rs
// Propósito: contratos de persistencia (CRUD genérico + consultas propias de
// cada entidad), el directorio de usuarios y el índice de búsqueda de
// bloques. Los implementan el store en memoria y el store Diesel.
use crate::criteria::Specification;
use crate::errors::Result;
use crate::paging::{Page, Pageable};
use pradera_domain::{Block, Book, Entity, Flow, FlowBlock, User};

/// Resultado del intento de reservar una versión de flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistResult {
    /// La versión esperada coincidía; el flow quedó en `new_version`.
    Ok { new_version: i64 },
    /// Otro escritor movió la versión antes.
    Conflict { current_version: i64 },
}

impl PersistResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, PersistResult::Ok { .. })
    }
}

/// Operaciones CRUD comunes a todas las entidades.
pub trait CrudRepository<E: Entity>: Send + Sync {
    /// Inserta (`id == None`, el store asigna el id) o reemplaza (`id`
    /// existente). Reemplazar un id inexistente es `NotFound`.
    fn save(&self, entity: E) -> Result<E>;

    fn find_by_id(&self, id: i64) -> Result<Option<E>>;

    fn exists_by_id(&self, id: i64) -> Result<bool> {
        Ok(self.find_by_id(id)?.is_some())
    }

    /// Página de entidades que cumplen `spec`, ordenadas por id.
    fn find_all(&self, spec: &Specification<E>, pageable: &Pageable) -> Result<Page<E>>;

    fn count(&self, spec: &Specification<E>) -> Result<u64>;

    /// Borra la entidad si existe. Borrar un id inexistente no es error.
    fn delete_by_id(&self, id: i64) -> Result<()>;
}

pub trait BlockRepository: CrudRepository<Block> {
    /// Bloques del flow en orden de documento (`block_order` ascendente).
    fn find_by_flow_id(&self, flow_id: i64) -> Result<Vec<Block>>;

    fn find_by_user_id(&self, user_id: i64) -> Result<Vec<Block>>;

    /// `true` si alguna fila flow_block o alguna revisión apunta al bloque.
    fn is_referenced(&self, block_id: i64) -> Result<bool>;
}

pub trait FlowRepository: CrudRepository<Flow> {
    fn find_by_user_id(&self, user_id: i64) -> Result<Vec<Flow>>;

    /// Compara e incrementa la versión del flow de forma atómica.
    /// `NotFound` si el flow no existe.
    fn lock_for_update(&self, flow_id: i64, expected_version: i64) -> Result<PersistResult>;
}

/// `save` devuelve `NotFound` si el flow o el bloque no existen y
/// `Conflict` si el flow ya tiene otra fila con el mismo `block_order`.
pub trait FlowBlockRepository: CrudRepository<FlowBlock> {
    /// Filas del flow ordenadas por `block_order`.
    fn find_by_flow_id(&self, flow_id: i64) -> Result<Vec<FlowBlock>>;

    /// Borra todas las filas del flow y devuelve cuántas había.
    fn delete_by_flow_id(&self, flow_id: i64) -> Result<u64>;
}

pub trait BookRepository: CrudRepository<Book> {}

/// Escrituras disponibles dentro de una transacción.
///
/// Ninguna es visible fuera de la transacción hasta que ésta se confirma.
pub trait StoreTransaction {
    /// Igual que `FlowRepository::lock_for_update`.
    fn lock_for_update(&self, flow_id: i64, expected_version: i64) -> Result<PersistResult>;

    fn delete_flow_blocks(&self, flow_id: i64) -> Result<u64>;

    fn save_block(&self, block: Block) -> Result<Block>;

    /// Mismas comprobaciones que `CrudRepository<FlowBlock>::save`.
    fn save_flow_block(&self, flow_block: FlowBlock) -> Result<FlowBlock>;
}

/// Agrupa escrituras que se aplican todas o ninguna.
pub trait UnitOfWork: Send + Sync {
    /// Ejecuta `work` dentro de una transacción. Si `work` devuelve `Err` se
    /// descartan todas sus escrituras y se devuelve ese mismo error.
    fn transaction(&self, work: &mut dyn FnMut(&dyn StoreTransaction) -> Result<()>) -> Result<()>;
}

/// Resolución de identidades por login.
pub trait UserDirectory: Send + Sync {
    fn find_by_login(&self, login: &str) -> Result<Option<User>>;

    fn find_user_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Alta o reemplazo de un usuario (por `id`).
    fn save_user(&self, user: User) -> Result<User>;
}

/// Índice de búsqueda de texto sobre bloques.
///
/// Consulta: términos separados por espacios, todos obligatorios, comparados
/// como subcadena sin distinguir mayúsculas contra el contenido. Un término
/// `type:<TIPO>` restringe el tipo de bloque.
pub trait BlockSearchRepository: Send + Sync {
    fn index(&self, block: &Block) -> Result<()>;

    fn remove(&self, block_id: i64) -> Result<()>;

    fn search(&self, query: &str, pageable: &Pageable) -> Result<Page<Block>>;

    fn clear(&self) -> Result<()>;
}
