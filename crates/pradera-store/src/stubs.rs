// Archivo: stubs.rs
// Propósito: store en memoria que implementa todos los contratos de
// `repository.rs`. No es durable; se usa en pruebas, demos y como referencia
// de la semántica esperada de un store real.
use crate::criteria::Specification;
use crate::errors::{Result, StoreError};
use crate::paging::{Page, Pageable};
use crate::repository::{BlockRepository, BookRepository, CrudRepository, FlowBlockRepository, FlowRepository,
                        PersistResult, StoreTransaction, UnitOfWork, UserDirectory};
use log::debug;
use pradera_domain::{Block, Book, Entity, Flow, FlowBlock, User};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard};

type Table<E> = Mutex<BTreeMap<i64, E>>;

/// Store en memoria con una tabla por entidad y una secuencia de ids
/// compartida.
///
/// Orden de bloqueo cuando se toman varias tablas: `flows`, `flow_blocks`,
/// `blocks`.
pub struct InMemoryStore {
    users: Table<User>,
    books: Table<Book>,
    flows: Table<Flow>,
    blocks: Table<Block>,
    flow_blocks: Table<FlowBlock>,
    sequence: AtomicI64,
}

impl InMemoryStore {
    /// Store vacío con los usuarios `admin` (id 1) y `user` (id 2).
    pub fn new() -> Self {
        let users = [User::new(1, "admin"), User::new(2, "user")].into_iter()
                                                                 .map(|u| (u.id, u))
                                                                 .collect();
        Self { users: Mutex::new(users),
               books: Mutex::new(BTreeMap::new()),
               flows: Mutex::new(BTreeMap::new()),
               blocks: Mutex::new(BTreeMap::new()),
               flow_blocks: Mutex::new(BTreeMap::new()),
               sequence: AtomicI64::new(1) }
    }

    /// Helper para mapear `Mutex::lock()` en un `Result` con
    /// `StoreError::Storage`.
    fn lock<'a, T>(&'a self, m: &'a Mutex<T>) -> std::result::Result<MutexGuard<'a, T>, StoreError> {
        m.lock().map_err(|e| StoreError::Storage(format!("mutex poisoned: {:?}", e)))
    }

    fn next_id(&self) -> i64 {
        self.sequence.fetch_add(1, Ordering::SeqCst)
    }

    fn save_in<E: Entity>(&self, table: &Table<E>, entity: E, keep: impl Fn(&E, &mut E)) -> Result<E> {
        let mut rows = self.lock(table)?;
        upsert(&mut *rows, entity, || self.next_id(), keep)
    }

    fn find_in<E: Entity>(&self, table: &Table<E>, id: i64) -> Result<Option<E>> {
        Ok(self.lock(table)?.get(&id).cloned())
    }

    fn page_in<E: Entity>(&self, table: &Table<E>, spec: &Specification<E>, pageable: &Pageable) -> Result<Page<E>> {
        let rows = self.lock(table)?;
        let matching: Vec<E> = rows.values().filter(|e| spec.is_satisfied_by(e)).cloned().collect();
        Ok(pageable.paginate(matching))
    }

    fn count_in<E: Entity>(&self, table: &Table<E>, spec: &Specification<E>) -> Result<u64> {
        Ok(self.lock(table)?.values().filter(|e| spec.is_satisfied_by(e)).count() as u64)
    }

    fn delete_in<E: Entity>(&self, table: &Table<E>, id: i64) -> Result<()> {
        if self.lock(table)?.remove(&id).is_some() {
            debug!("{} {} borrado", E::NAME, id);
        }
        Ok(())
    }
}

/// Inserta o reemplaza. `keep` copia del registro guardado los campos que el
/// llamador no controla.
fn upsert<E: Entity>(rows: &mut BTreeMap<i64, E>,
                     entity: E,
                     next_id: impl FnOnce() -> i64,
                     keep: impl Fn(&E, &mut E))
                     -> Result<E> {
    let entity = match entity.id() {
        None => entity.with_id(next_id()),
        Some(id) => {
            let stored = rows.get(&id)
                             .ok_or_else(|| StoreError::NotFound(format!("{} {}", E::NAME, id)))?;
            let mut entity = entity;
            keep(stored, &mut entity);
            entity
        }
    };
    if let Some(id) = entity.id() {
        rows.insert(id, entity.clone());
    }
    Ok(entity)
}

fn bump_version(flows: &mut BTreeMap<i64, Flow>, flow_id: i64, expected_version: i64) -> Result<PersistResult> {
    let flow = flows.get_mut(&flow_id)
                    .ok_or_else(|| StoreError::NotFound(format!("flow {}", flow_id)))?;
    if flow.version != expected_version {
        return Ok(PersistResult::Conflict { current_version: flow.version });
    }
    flow.version += 1;
    Ok(PersistResult::Ok { new_version: flow.version })
}

fn detach_flow(rows: &mut BTreeMap<i64, FlowBlock>, flow_id: i64) -> u64 {
    let before = rows.len();
    rows.retain(|_, fb| fb.flow_id != flow_id);
    (before - rows.len()) as u64
}

/// Flow y bloque existentes y posición libre dentro del flow.
fn check_flow_block(flows: &BTreeMap<i64, Flow>,
                    blocks: &BTreeMap<i64, Block>,
                    rows: &BTreeMap<i64, FlowBlock>,
                    fb: &FlowBlock)
                    -> Result<()> {
    if !flows.contains_key(&fb.flow_id) {
        return Err(StoreError::NotFound(format!("flow {}", fb.flow_id)));
    }
    if !blocks.contains_key(&fb.block_id) {
        return Err(StoreError::NotFound(format!("block {}", fb.block_id)));
    }
    if rows.values()
           .any(|r| r.flow_id == fb.flow_id && r.block_order == fb.block_order && r.id != fb.id)
    {
        return Err(StoreError::Conflict(format!("flow {} ya tiene un bloque en la posición {}",
                                                fb.flow_id, fb.block_order)));
    }
    Ok(())
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CrudRepository<Block> for InMemoryStore {
    fn save(&self, entity: Block) -> Result<Block> {
        self.save_in(&self.blocks, entity, |_, _| {})
    }

    fn find_by_id(&self, id: i64) -> Result<Option<Block>> {
        self.find_in(&self.blocks, id)
    }

    fn find_all(&self, spec: &Specification<Block>, pageable: &Pageable) -> Result<Page<Block>> {
        self.page_in(&self.blocks, spec, pageable)
    }

    fn count(&self, spec: &Specification<Block>) -> Result<u64> {
        self.count_in(&self.blocks, spec)
    }

    fn delete_by_id(&self, id: i64) -> Result<()> {
        self.delete_in(&self.blocks, id)
    }
}

impl BlockRepository for InMemoryStore {
    fn find_by_flow_id(&self, flow_id: i64) -> Result<Vec<Block>> {
        let flow_blocks = self.lock(&self.flow_blocks)?;
        let mut rows: Vec<&FlowBlock> = flow_blocks.values().filter(|fb| fb.flow_id == flow_id).collect();
        rows.sort_by_key(|fb| fb.block_order);
        let blocks = self.lock(&self.blocks)?;
        rows.iter()
            .map(|fb| {
                blocks.get(&fb.block_id)
                      .cloned()
                      .ok_or_else(|| StoreError::Storage(format!("flowBlock {:?} apunta a un bloque inexistente", fb.id)))
            })
            .collect()
    }

    fn find_by_user_id(&self, user_id: i64) -> Result<Vec<Block>> {
        Ok(self.lock(&self.blocks)?
               .values()
               .filter(|b| b.user_id == user_id)
               .cloned()
               .collect())
    }

    fn is_referenced(&self, block_id: i64) -> Result<bool> {
        if self.lock(&self.flow_blocks)?.values().any(|fb| fb.block_id == block_id) {
            return Ok(true);
        }
        Ok(self.lock(&self.blocks)?.values().any(|b| b.parent_id == Some(block_id)))
    }
}

impl CrudRepository<Flow> for InMemoryStore {
    /// La versión la gestiona `lock_for_update`: al reemplazar se conserva la
    /// guardada.
    fn save(&self, entity: Flow) -> Result<Flow> {
        self.save_in(&self.flows, entity, |stored, incoming| incoming.version = stored.version)
    }

    fn find_by_id(&self, id: i64) -> Result<Option<Flow>> {
        self.find_in(&self.flows, id)
    }

    fn find_all(&self, spec: &Specification<Flow>, pageable: &Pageable) -> Result<Page<Flow>> {
        self.page_in(&self.flows, spec, pageable)
    }

    fn count(&self, spec: &Specification<Flow>) -> Result<u64> {
        self.count_in(&self.flows, spec)
    }

    fn delete_by_id(&self, id: i64) -> Result<()> {
        self.delete_in(&self.flows, id)
    }
}

impl FlowRepository for InMemoryStore {
    fn find_by_user_id(&self, user_id: i64) -> Result<Vec<Flow>> {
        Ok(self.lock(&self.flows)?
               .values()
               .filter(|f| f.user_id == Some(user_id))
               .cloned()
               .collect())
    }

    fn lock_for_update(&self, flow_id: i64, expected_version: i64) -> Result<PersistResult> {
        bump_version(&mut *self.lock(&self.flows)?, flow_id, expected_version)
    }
}

impl CrudRepository<FlowBlock> for InMemoryStore {
    fn save(&self, entity: FlowBlock) -> Result<FlowBlock> {
        let flows = self.lock(&self.flows)?;
        let mut rows = self.lock(&self.flow_blocks)?;
        let blocks = self.lock(&self.blocks)?;
        check_flow_block(&flows, &blocks, &rows, &entity)?;
        upsert(&mut *rows, entity, || self.next_id(), |_, _| {})
    }

    fn find_by_id(&self, id: i64) -> Result<Option<FlowBlock>> {
        self.find_in(&self.flow_blocks, id)
    }

    fn find_all(&self, spec: &Specification<FlowBlock>, pageable: &Pageable) -> Result<Page<FlowBlock>> {
        self.page_in(&self.flow_blocks, spec, pageable)
    }

    fn count(&self, spec: &Specification<FlowBlock>) -> Result<u64> {
        self.count_in(&self.flow_blocks, spec)
    }

    fn delete_by_id(&self, id: i64) -> Result<()> {
        self.delete_in(&self.flow_blocks, id)
    }
}

impl FlowBlockRepository for InMemoryStore {
    fn find_by_flow_id(&self, flow_id: i64) -> Result<Vec<FlowBlock>> {
        let mut rows: Vec<FlowBlock> = self.lock(&self.flow_blocks)?
                                           .values()
                                           .filter(|fb| fb.flow_id == flow_id)
                                           .cloned()
                                           .collect();
        rows.sort_by_key(|fb| fb.block_order);
        Ok(rows)
    }

    fn delete_by_flow_id(&self, flow_id: i64) -> Result<u64> {
        Ok(detach_flow(&mut *self.lock(&self.flow_blocks)?, flow_id))
    }
}

/// Copias de las tablas que escribe una transacción.
struct InMemoryTransaction<'a> {
    store: &'a InMemoryStore,
    flows: RefCell<BTreeMap<i64, Flow>>,
    flow_blocks: RefCell<BTreeMap<i64, FlowBlock>>,
    blocks: RefCell<BTreeMap<i64, Block>>,
}

impl StoreTransaction for InMemoryTransaction<'_> {
    fn lock_for_update(&self, flow_id: i64, expected_version: i64) -> Result<PersistResult> {
        bump_version(&mut *self.flows.borrow_mut(), flow_id, expected_version)
    }

    fn delete_flow_blocks(&self, flow_id: i64) -> Result<u64> {
        Ok(detach_flow(&mut *self.flow_blocks.borrow_mut(), flow_id))
    }

    fn save_block(&self, block: Block) -> Result<Block> {
        upsert(&mut *self.blocks.borrow_mut(), block, || self.store.next_id(), |_, _| {})
    }

    fn save_flow_block(&self, flow_block: FlowBlock) -> Result<FlowBlock> {
        check_flow_block(&self.flows.borrow(), &self.blocks.borrow(), &self.flow_blocks.borrow(), &flow_block)?;
        upsert(&mut *self.flow_blocks.borrow_mut(), flow_block, || self.store.next_id(), |_, _| {})
    }
}

impl UnitOfWork for InMemoryStore {
    /// `work` escribe sobre copias de las tablas, que sólo se publican si
    /// termina bien. Las tablas quedan bloqueadas hasta entonces. Los ids
    /// consumidos por una transacción descartada no se reutilizan.
    fn transaction(&self, work: &mut dyn FnMut(&dyn StoreTransaction) -> Result<()>) -> Result<()> {
        let mut flows = self.lock(&self.flows)?;
        let mut flow_blocks = self.lock(&self.flow_blocks)?;
        let mut blocks = self.lock(&self.blocks)?;
        let tx = InMemoryTransaction { store: self,
                                       flows: RefCell::new(flows.clone()),
                                       flow_blocks: RefCell::new(flow_blocks.clone()),
                                       blocks: RefCell::new(blocks.clone()) };
        work(&tx)?;
        *flows = tx.flows.into_inner();
        *flow_blocks = tx.flow_blocks.into_inner();
        *blocks = tx.blocks.into_inner();
        Ok(())
    }
}

impl CrudRepository<Book> for InMemoryStore {
    fn save(&self, entity: Book) -> Result<Book> {
        self.save_in(&self.books, entity, |_, _| {})
    }

    fn find_by_id(&self, id: i64) -> Result<Option<Book>> {
        self.find_in(&self.books, id)
    }

    fn find_all(&self, spec: &Specification<Book>, pageable: &Pageable) -> Result<Page<Book>> {
        self.page_in(&self.books, spec, pageable)
    }

    fn count(&self, spec: &Specification<Book>) -> Result<u64> {
        self.count_in(&self.books, spec)
    }

    fn delete_by_id(&self, id: i64) -> Result<()> {
        self.delete_in(&self.books, id)
    }
}

impl BookRepository for InMemoryStore {}

impl UserDirectory for InMemoryStore {
    fn find_by_login(&self, login: &str) -> Result<Option<User>> {
        Ok(self.lock(&self.users)?.values().find(|u| u.login == login).cloned())
    }

    fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.lock(&self.users)?.get(&id).cloned())
    }

    fn save_user(&self, user: User) -> Result<User> {
        let mut users = self.lock(&self.users)?;
        if users.values().any(|u| u.login == user.login && u.id != user.id) {
            return Err(StoreError::Conflict(format!("login duplicado: {}", user.login)));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }
}
