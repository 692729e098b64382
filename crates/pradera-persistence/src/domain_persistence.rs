use crate::schema::{blocks, books, flow_blocks, flows, users};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::{debug, info};
use pradera_domain::{Block, BlockType, Book, Entity, Flow, FlowBlock, User};
use pradera_store::{BlockRepository, BookRepository, CrudRepository, FlowBlockRepository, FlowRepository, Page,
                    Pageable, PersistResult, Result, Specification, StoreError, StoreTransaction, UnitOfWork,
                    UserDirectory};
use std::cell::RefCell;
use std::sync::Arc;
#[cfg(feature = "pg")]
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations/postgres");
#[cfg(not(feature = "pg"))]
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations/sqlite");
#[cfg(feature = "pg")]
type DbConn = diesel::pg::PgConnection;
#[cfg(not(feature = "pg"))]
type DbConn = diesel::sqlite::SqliteConnection;
type DbPool = Pool<ConnectionManager<DbConn>>;
/// URL usada cuando no hay `PRADERA_DB_URL` ni `DATABASE_URL` (sólo SQLite).
#[cfg(not(feature = "pg"))]
pub const DEFAULT_SQLITE_URL: &str = "pradera.db";
/// Pragmas aplicados a cada conexión SQLite que entrega el pool. SQLite no
/// comprueba las claves ajenas salvo que se active en cada conexión.
#[cfg(not(feature = "pg"))]
#[derive(Debug)]
struct SqlitePragmas;
#[cfg(not(feature = "pg"))]
impl diesel::r2d2::CustomizeConnection<DbConn, diesel::r2d2::Error> for SqlitePragmas {
  fn on_acquire(&self, conn: &mut DbConn) -> std::result::Result<(), diesel::r2d2::Error> {
    use diesel::connection::SimpleConnection;
    conn.batch_execute("PRAGMA journal_mode = WAL; PRAGMA busy_timeout = 5000; PRAGMA foreign_keys = ON;")
        .map_err(diesel::r2d2::Error::QueryError)
  }
}
/// Store Diesel que implementa todos los contratos de `pradera-store`.
pub struct DieselStore {
  pool: Arc<DbPool>,
}
impl DieselStore {
  /// Abre el pool y aplica las migraciones pendientes.
  pub fn new(database_url: &str) -> Result<Self> {
    let manager = ConnectionManager::<DbConn>::new(database_url);
    let builder = Pool::builder().max_size(4);
    #[cfg(not(feature = "pg"))]
    let builder = builder.connection_customizer(Box::new(SqlitePragmas));
    let pool = builder.build(manager)
                      .map_err(|e| StoreError::Storage(format!("no se pudo crear el pool de conexiones: {}", e)))?;
    let store = DieselStore { pool: Arc::new(pool) };
    store.run_migrations()?;
    Ok(store)
  }
  fn run_migrations(&self) -> Result<()> {
    let mut conn = self.conn()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)
                      .map_err(|e| StoreError::Storage(format!("migraciones: {}", e)))?;
    if !applied.is_empty() {
      info!("{} migración(es) aplicada(s)", applied.len());
    }
    Ok(())
  }
  fn conn(&self) -> Result<PooledConnection<ConnectionManager<DbConn>>> {
    self.pool.get().map_err(|e| StoreError::Storage(format!("pool: {}", e)))
  }
}
fn map_db_err<T>(res: std::result::Result<T, DieselError>) -> Result<T> {
  res.map_err(|e| match e {
       DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
         StoreError::Conflict(format!("db: {}", info.message()))
       }
       DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
         StoreError::NotFound(format!("db: {}", info.message()))
       }
       other => StoreError::Storage(format!("db: {}", other)),
     })
}
fn not_found(entity: &str, id: i64) -> StoreError {
  StoreError::NotFound(format!("{} {}", entity, id))
}
/// Filtra en proceso: la especificación es un conjunto de closures, no SQL.
fn page_of<E>(items: Vec<E>, spec: &Specification<E>, pageable: &Pageable) -> Page<E> {
  pageable.paginate(items.into_iter().filter(|e| spec.is_satisfied_by(e)).collect())
}
// Filas Diesel
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = blocks)]
struct BlockRow {
  id: i64,
  block_type: String,
  content: String,
  created_date_ts: i64,
  hash: String,
  parent_id: Option<i64>,
  user_id: i64,
}
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = blocks, treat_none_as_null = true)]
struct BlockValues<'a> {
  block_type: &'a str,
  content: &'a str,
  created_date_ts: i64,
  hash: &'a str,
  parent_id: Option<i64>,
  user_id: i64,
}
impl BlockRow {
  fn into_domain(self) -> Result<Block> {
    let block_type = self.block_type
                         .parse::<BlockType>()
                         .map_err(|e| StoreError::Storage(format!("block {}: {}", self.id, e)))?;
    let created_date = DateTime::<Utc>::from_timestamp_millis(self.created_date_ts).ok_or_else(|| {
                         StoreError::Storage(format!("block {}: fecha inválida {}", self.id, self.created_date_ts))
                       })?;
    Ok(Block { id: Some(self.id),
               block_type,
               content: self.content,
               created_date,
               hash: self.hash,
               parent_id: self.parent_id,
               user_id: self.user_id })
  }
}
impl<'a> From<&'a Block> for BlockValues<'a> {
  fn from(b: &'a Block) -> Self {
    BlockValues { block_type: b.block_type.as_str(),
                  content: &b.content,
                  created_date_ts: b.created_date.timestamp_millis(),
                  hash: &b.hash,
                  parent_id: b.parent_id,
                  user_id: b.user_id }
  }
}
fn blocks_into_domain(rows: Vec<BlockRow>) -> Result<Vec<Block>> {
  rows.into_iter().map(BlockRow::into_domain).collect()
}
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = flows)]
struct FlowRow {
  id: i64,
  name: String,
  user_id: Option<i64>,
  book_id: Option<i64>,
  version: i64,
}
#[derive(Debug, Insertable)]
#[diesel(table_name = flows)]
struct NewFlowRow<'a> {
  name: &'a str,
  user_id: Option<i64>,
  book_id: Option<i64>,
  version: i64,
}
/// Cambios de un flow; `version` sólo la mueve `lock_for_update`.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = flows, treat_none_as_null = true)]
struct FlowChangeset<'a> {
  name: &'a str,
  user_id: Option<i64>,
  book_id: Option<i64>,
}
impl From<FlowRow> for Flow {
  fn from(r: FlowRow) -> Self {
    Flow { id: Some(r.id), name: r.name, user_id: r.user_id, book_id: r.book_id, version: r.version }
  }
}
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = flow_blocks)]
struct FlowBlockRow {
  id: i64,
  block_order: i64,
  flow_id: i64,
  block_id: i64,
}
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = flow_blocks)]
struct FlowBlockValues {
  block_order: i64,
  flow_id: i64,
  block_id: i64,
}
impl From<FlowBlockRow> for FlowBlock {
  fn from(r: FlowBlockRow) -> Self {
    FlowBlock { id: Some(r.id), block_order: r.block_order, flow_id: r.flow_id, block_id: r.block_id }
  }
}
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = books)]
struct BookRow {
  id: i64,
  name: String,
}
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = books)]
struct BookValues<'a> {
  name: &'a str,
}
#[derive(Debug, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = users, treat_none_as_null = true)]
struct UserRow {
  id: i64,
  login: String,
  email: Option<String>,
  activated: bool,
}
impl From<UserRow> for User {
  fn from(r: UserRow) -> Self {
    User { id: r.id, login: r.login, email: r.email, activated: r.activated }
  }
}
// Escrituras sobre una conexión concreta: las comparten los repositorios y
// `DieselTransaction`.
fn save_block(conn: &mut DbConn, entity: Block) -> Result<Block> {
  let values = BlockValues::from(&entity);
  match entity.id {
    None => {
      let id = map_db_err(diesel::insert_into(blocks::table).values(&values)
                                                            .returning(blocks::id)
                                                            .get_result::<i64>(conn))?;
      debug!("block {} insertado", id);
      Ok(entity.with_id(id))
    }
    Some(id) => {
      let n = map_db_err(diesel::update(blocks::table.find(id)).set(&values).execute(conn))?;
      if n == 0 {
        return Err(not_found(Block::NAME, id));
      }
      Ok(entity)
    }
  }
}
/// `UPDATE flows SET version = expected + 1 WHERE id = ? AND version =
/// expected`; cero filas afectadas significa conflicto o flow inexistente.
fn compare_and_increment(conn: &mut DbConn, flow_id: i64, expected_version: i64) -> Result<PersistResult> {
  let target = flows::table.filter(flows::id.eq(flow_id)).filter(flows::version.eq(expected_version));
  let n = map_db_err(diesel::update(target).set(flows::version.eq(expected_version + 1)).execute(conn))?;
  if n == 1 {
    return Ok(PersistResult::Ok { new_version: expected_version + 1 });
  }
  let current = map_db_err(flows::table.find(flow_id)
                                       .select(flows::version)
                                       .first::<i64>(conn)
                                       .optional())?;
  match current {
    Some(current_version) => Ok(PersistResult::Conflict { current_version }),
    None => Err(not_found(Flow::NAME, flow_id)),
  }
}
/// Flow y bloque existentes y posición libre dentro del flow. El índice
/// único `(flow_id, block_order)` y las claves ajenas lo respaldan.
fn check_flow_block(conn: &mut DbConn, entity: &FlowBlock) -> Result<()> {
  let flow_exists =
    map_db_err(diesel::select(diesel::dsl::exists(flows::table.find(entity.flow_id))).get_result::<bool>(conn))?;
  if !flow_exists {
    return Err(not_found(Flow::NAME, entity.flow_id));
  }
  let block_exists =
    map_db_err(diesel::select(diesel::dsl::exists(blocks::table.find(entity.block_id))).get_result::<bool>(conn))?;
  if !block_exists {
    return Err(not_found(Block::NAME, entity.block_id));
  }
  // los ids asignados empiezan en 1
  let taken = flow_blocks::table.filter(flow_blocks::flow_id.eq(entity.flow_id))
                                .filter(flow_blocks::block_order.eq(entity.block_order))
                                .filter(flow_blocks::id.ne(entity.id.unwrap_or(0)));
  if map_db_err(diesel::select(diesel::dsl::exists(taken)).get_result::<bool>(conn))? {
    return Err(StoreError::Conflict(format!("flow {} ya tiene un bloque en la posición {}",
                                            entity.flow_id, entity.block_order)));
  }
  Ok(())
}
fn save_flow_block(conn: &mut DbConn, entity: FlowBlock) -> Result<FlowBlock> {
  check_flow_block(conn, &entity)?;
  let values = FlowBlockValues { block_order: entity.block_order,
                                 flow_id: entity.flow_id,
                                 block_id: entity.block_id };
  match entity.id {
    None => {
      let id = map_db_err(diesel::insert_into(flow_blocks::table).values(&values)
                                                                 .returning(flow_blocks::id)
                                                                 .get_result::<i64>(conn))?;
      Ok(entity.with_id(id))
    }
    Some(id) => {
      let n = map_db_err(diesel::update(flow_blocks::table.find(id)).set(&values).execute(conn))?;
      if n == 0 {
        return Err(not_found(FlowBlock::NAME, id));
      }
      Ok(entity)
    }
  }
}
fn delete_flow_blocks(conn: &mut DbConn, flow_id: i64) -> Result<u64> {
  let n = map_db_err(diesel::delete(flow_blocks::table.filter(flow_blocks::flow_id.eq(flow_id))).execute(conn))?;
  Ok(n as u64)
}
impl CrudRepository<Block> for DieselStore {
  fn save(&self, entity: Block) -> Result<Block> {
    save_block(&mut *self.conn()?, entity)
  }
  fn find_by_id(&self, id: i64) -> Result<Option<Block>> {
    let mut conn = self.conn()?;
    let row = map_db_err(blocks::table.find(id)
                                      .select(BlockRow::as_select())
                                      .first::<BlockRow>(&mut conn)
                                      .optional())?;
    row.map(BlockRow::into_domain).transpose()
  }
  fn find_all(&self, spec: &Specification<Block>, pageable: &Pageable) -> Result<Page<Block>> {
    let mut conn = self.conn()?;
    let rows = map_db_err(blocks::table.order(blocks::id.asc())
                                       .select(BlockRow::as_select())
                                       .load::<BlockRow>(&mut conn))?;
    Ok(page_of(blocks_into_domain(rows)?, spec, pageable))
  }
  fn count(&self, spec: &Specification<Block>) -> Result<u64> {
    Ok(self.find_all(spec, &Pageable::unpaged())?.total_elements)
  }
  fn delete_by_id(&self, id: i64) -> Result<()> {
    let mut conn = self.conn()?;
    map_db_err(diesel::delete(blocks::table.find(id)).execute(&mut conn))?;
    Ok(())
  }
}
impl BlockRepository for DieselStore {
  fn find_by_flow_id(&self, flow_id: i64) -> Result<Vec<Block>> {
    let mut conn = self.conn()?;
    let rows = map_db_err(flow_blocks::table.inner_join(blocks::table)
                                            .filter(flow_blocks::flow_id.eq(flow_id))
                                            .order(flow_blocks::block_order.asc())
                                            .select(BlockRow::as_select())
                                            .load::<BlockRow>(&mut conn))?;
    blocks_into_domain(rows)
  }
  fn find_by_user_id(&self, user_id: i64) -> Result<Vec<Block>> {
    let mut conn = self.conn()?;
    let rows = map_db_err(blocks::table.filter(blocks::user_id.eq(user_id))
                                       .order(blocks::id.asc())
                                       .select(BlockRow::as_select())
                                       .load::<BlockRow>(&mut conn))?;
    blocks_into_domain(rows)
  }
  fn is_referenced(&self, block_id: i64) -> Result<bool> {
    let mut conn = self.conn()?;
    let in_flows: i64 = map_db_err(flow_blocks::table.filter(flow_blocks::block_id.eq(block_id))
                                                     .count()
                                                     .get_result(&mut conn))?;
    if in_flows > 0 {
      return Ok(true);
    }
    let children: i64 =
      map_db_err(blocks::table.filter(blocks::parent_id.eq(block_id)).count().get_result(&mut conn))?;
    Ok(children > 0)
  }
}
impl CrudRepository<Flow> for DieselStore {
  fn save(&self, entity: Flow) -> Result<Flow> {
    let mut conn = self.conn()?;
    match entity.id {
      None => {
        let row = NewFlowRow { name: &entity.name,
                               user_id: entity.user_id,
                               book_id: entity.book_id,
                               version: entity.version };
        let id = map_db_err(diesel::insert_into(flows::table).values(&row)
                                                             .returning(flows::id)
                                                             .get_result::<i64>(&mut conn))?;
        debug!("flow {} insertado", id);
        Ok(entity.with_id(id))
      }
      Some(id) => {
        let changes = FlowChangeset { name: &entity.name, user_id: entity.user_id, book_id: entity.book_id };
        let stored_version = map_db_err(diesel::update(flows::table.find(id)).set(&changes)
                                                                             .returning(flows::version)
                                                                             .get_result::<i64>(&mut conn)
                                                                             .optional())?;
        match stored_version {
          Some(version) => Ok(Flow { version, ..entity }),
          None => Err(not_found(Flow::NAME, id)),
        }
      }
    }
  }
  fn find_by_id(&self, id: i64) -> Result<Option<Flow>> {
    let mut conn = self.conn()?;
    let row = map_db_err(flows::table.find(id)
                                     .select(FlowRow::as_select())
                                     .first::<FlowRow>(&mut conn)
                                     .optional())?;
    Ok(row.map(Flow::from))
  }
  fn find_all(&self, spec: &Specification<Flow>, pageable: &Pageable) -> Result<Page<Flow>> {
    let mut conn = self.conn()?;
    let rows = map_db_err(flows::table.order(flows::id.asc())
                                      .select(FlowRow::as_select())
                                      .load::<FlowRow>(&mut conn))?;
    Ok(page_of(rows.into_iter().map(Flow::from).collect(), spec, pageable))
  }
  fn count(&self, spec: &Specification<Flow>) -> Result<u64> {
    Ok(self.find_all(spec, &Pageable::unpaged())?.total_elements)
  }
  fn delete_by_id(&self, id: i64) -> Result<()> {
    let mut conn = self.conn()?;
    map_db_err(diesel::delete(flows::table.find(id)).execute(&mut conn))?;
    Ok(())
  }
}
impl FlowRepository for DieselStore {
  fn find_by_user_id(&self, user_id: i64) -> Result<Vec<Flow>> {
    let mut conn = self.conn()?;
    let rows = map_db_err(flows::table.filter(flows::user_id.eq(user_id))
                                      .order(flows::id.asc())
                                      .select(FlowRow::as_select())
                                      .load::<FlowRow>(&mut conn))?;
    Ok(rows.into_iter().map(Flow::from).collect())
  }
  fn lock_for_update(&self, flow_id: i64, expected_version: i64) -> Result<PersistResult> {
    compare_and_increment(&mut *self.conn()?, flow_id, expected_version)
  }
}
impl CrudRepository<FlowBlock> for DieselStore {
  fn save(&self, entity: FlowBlock) -> Result<FlowBlock> {
    save_flow_block(&mut *self.conn()?, entity)
  }
  fn find_by_id(&self, id: i64) -> Result<Option<FlowBlock>> {
    let mut conn = self.conn()?;
    let row = map_db_err(flow_blocks::table.find(id)
                                           .select(FlowBlockRow::as_select())
                                           .first::<FlowBlockRow>(&mut conn)
                                           .optional())?;
    Ok(row.map(FlowBlock::from))
  }
  fn find_all(&self, spec: &Specification<FlowBlock>, pageable: &Pageable) -> Result<Page<FlowBlock>> {
    let mut conn = self.conn()?;
    let rows = map_db_err(flow_blocks::table.order(flow_blocks::id.asc())
                                            .select(FlowBlockRow::as_select())
                                            .load::<FlowBlockRow>(&mut conn))?;
    Ok(page_of(rows.into_iter().map(FlowBlock::from).collect(), spec, pageable))
  }
  fn count(&self, spec: &Specification<FlowBlock>) -> Result<u64> {
    Ok(self.find_all(spec, &Pageable::unpaged())?.total_elements)
  }
  fn delete_by_id(&self, id: i64) -> Result<()> {
    let mut conn = self.conn()?;
    map_db_err(diesel::delete(flow_blocks::table.find(id)).execute(&mut conn))?;
    Ok(())
  }
}
impl FlowBlockRepository for DieselStore {
  fn find_by_flow_id(&self, flow_id: i64) -> Result<Vec<FlowBlock>> {
    let mut conn = self.conn()?;
    let rows = map_db_err(flow_blocks::table.filter(flow_blocks::flow_id.eq(flow_id))
                                            .order(flow_blocks::block_order.asc())
                                            .select(FlowBlockRow::as_select())
                                            .load::<FlowBlockRow>(&mut conn))?;
    Ok(rows.into_iter().map(FlowBlock::from).collect())
  }
  fn delete_by_flow_id(&self, flow_id: i64) -> Result<u64> {
    delete_flow_blocks(&mut *self.conn()?, flow_id)
  }
}
/// Escrituras sobre la conexión de una transacción abierta.
struct DieselTransaction<'c> {
  conn: RefCell<&'c mut DbConn>,
}
impl StoreTransaction for DieselTransaction<'_> {
  fn lock_for_update(&self, flow_id: i64, expected_version: i64) -> Result<PersistResult> {
    compare_and_increment(&mut self.conn.borrow_mut(), flow_id, expected_version)
  }
  fn delete_flow_blocks(&self, flow_id: i64) -> Result<u64> {
    delete_flow_blocks(&mut self.conn.borrow_mut(), flow_id)
  }
  fn save_block(&self, block: Block) -> Result<Block> {
    save_block(&mut self.conn.borrow_mut(), block)
  }
  fn save_flow_block(&self, flow_block: FlowBlock) -> Result<FlowBlock> {
    save_flow_block(&mut self.conn.borrow_mut(), flow_block)
  }
}
impl UnitOfWork for DieselStore {
  /// Una transacción de base de datos sobre una sola conexión del pool. El
  /// error de `work` se conserva tal cual tras el rollback.
  fn transaction(&self, work: &mut dyn FnMut(&dyn StoreTransaction) -> Result<()>) -> Result<()> {
    let mut pooled = self.conn()?;
    let conn: &mut DbConn = &mut pooled;
    let mut failure = None;
    let outcome = conn.transaction::<(), DieselError, _>(|c| {
                        let tx = DieselTransaction { conn: RefCell::new(c) };
                        work(&tx).map_err(|e| {
                                   failure = Some(e);
                                   DieselError::RollbackTransaction
                                 })
                      });
    match (outcome, failure) {
      (Ok(()), _) => Ok(()),
      (Err(_), Some(e)) => {
        debug!("transacción descartada: {}", e);
        Err(e)
      }
      (Err(e), None) => map_db_err(Err(e)),
    }
  }
}
impl CrudRepository<Book> for DieselStore {
  fn save(&self, entity: Book) -> Result<Book> {
    let mut conn = self.conn()?;
    let values = BookValues { name: &entity.name };
    match entity.id {
      None => {
        let id = map_db_err(diesel::insert_into(books::table).values(&values)
                                                             .returning(books::id)
                                                             .get_result::<i64>(&mut conn))?;
        Ok(entity.with_id(id))
      }
      Some(id) => {
        let n = map_db_err(diesel::update(books::table.find(id)).set(&values).execute(&mut conn))?;
        if n == 0 {
          return Err(not_found(Book::NAME, id));
        }
        Ok(entity)
      }
    }
  }
  fn find_by_id(&self, id: i64) -> Result<Option<Book>> {
    let mut conn = self.conn()?;
    let row = map_db_err(books::table.find(id)
                                     .select(BookRow::as_select())
                                     .first::<BookRow>(&mut conn)
                                     .optional())?;
    Ok(row.map(|r| Book { id: Some(r.id), name: r.name }))
  }
  fn find_all(&self, spec: &Specification<Book>, pageable: &Pageable) -> Result<Page<Book>> {
    let mut conn = self.conn()?;
    let rows = map_db_err(books::table.order(books::id.asc())
                                      .select(BookRow::as_select())
                                      .load::<BookRow>(&mut conn))?;
    let items = rows.into_iter().map(|r| Book { id: Some(r.id), name: r.name }).collect();
    Ok(page_of(items, spec, pageable))
  }
  fn count(&self, spec: &Specification<Book>) -> Result<u64> {
    Ok(self.find_all(spec, &Pageable::unpaged())?.total_elements)
  }
  fn delete_by_id(&self, id: i64) -> Result<()> {
    let mut conn = self.conn()?;
    map_db_err(diesel::delete(books::table.find(id)).execute(&mut conn))?;
    Ok(())
  }
}
impl BookRepository for DieselStore {}
impl UserDirectory for DieselStore {
  fn find_by_login(&self, login: &str) -> Result<Option<User>> {
    let mut conn = self.conn()?;
    let row = map_db_err(users::table.filter(users::login.eq(login))
                                     .select(UserRow::as_select())
                                     .first::<UserRow>(&mut conn)
                                     .optional())?;
    Ok(row.map(User::from))
  }
  fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
    let mut conn = self.conn()?;
    let row = map_db_err(users::table.find(id)
                                     .select(UserRow::as_select())
                                     .first::<UserRow>(&mut conn)
                                     .optional())?;
    Ok(row.map(User::from))
  }
  fn save_user(&self, user: User) -> Result<User> {
    let mut conn = self.conn()?;
    let taken: i64 = map_db_err(users::table.filter(users::login.eq(&user.login))
                                            .filter(users::id.ne(user.id))
                                            .count()
                                            .get_result(&mut conn))?;
    if taken > 0 {
      return Err(StoreError::Conflict(format!("login duplicado: {}", user.login)));
    }
    let row = UserRow { id: user.id, login: user.login.clone(), email: user.email.clone(), activated: user.activated };
    let n = map_db_err(diesel::update(users::table.find(user.id)).set(&row).execute(&mut conn))?;
    if n == 0 {
      map_db_err(diesel::insert_into(users::table).values(&row).execute(&mut conn))?;
    }
    Ok(user)
  }
}
/// Construye el store a partir del entorno (`.env` incluido).
///
/// Con `pg` exige `PRADERA_DB_URL` / `DATABASE_URL` con una URL Postgres.
#[cfg(feature = "pg")]
pub fn new_from_env() -> Result<DieselStore> {
  dotenvy::dotenv().ok();
  let url = std::env::var("PRADERA_DB_URL").or_else(|_| std::env::var("DATABASE_URL"))
                                           .map_err(|_| StoreError::Storage("PRADERA_DB_URL / DATABASE_URL not set".into()))?;
  let l = url.to_lowercase();
  if !(l.starts_with("postgres://") || l.starts_with("postgresql://") || url.contains('@')) {
    return Err(StoreError::Storage("PRADERA_DB_URL / DATABASE_URL does not look like Postgres URL".into()));
  }
  DieselStore::new(&url)
}
/// Construye el store a partir del entorno (`.env` incluido).
///
/// Sin `pg` usa SQLite; si no hay URL configurada abre `DEFAULT_SQLITE_URL`.
#[cfg(not(feature = "pg"))]
pub fn new_from_env() -> Result<DieselStore> {
  dotenvy::dotenv().ok();
  let url = std::env::var("PRADERA_DB_URL").or_else(|_| std::env::var("DATABASE_URL"))
                                           .unwrap_or_else(|_| DEFAULT_SQLITE_URL.into());
  if url.to_lowercase().starts_with("postgres") {
    return Err(StoreError::Storage("pradera-persistence was compiled without 'pg' feature; enable it to use \
                                    Postgres"
                                             .into()));
  }
  DieselStore::new(&url)
}
