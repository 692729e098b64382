use pradera_domain::{Block, BlockType, Book, Flow, FlowBlock, User};
use pradera_persistence::DieselStore;
use pradera_store::{BlockRepository, CrudRepository, FlowBlockRepository, FlowRepository, Pageable, PersistResult,
                    Specification, StoreError, UnitOfWork, UserDirectory};
use uuid::Uuid;

// Base SQLite en un fichero temporal: cada test tiene la suya.
fn setup_store() -> Option<DieselStore> {
  if cfg!(feature = "pg") {
    eprintln!("skipping sqlite-only persistence test because 'pg' feature is enabled");
    return None;
  }
  let tmp_path = std::env::temp_dir().join(format!("pradera_test_{}.db", Uuid::new_v4()));
  let db_url = tmp_path.to_str().unwrap().to_string();
  Some(DieselStore::new(&db_url).expect("failed to create store"))
}

#[test]
fn migrations_seed_default_users() {
  let Some(store) = setup_store() else { return };
  let admin = store.find_by_login("admin").unwrap().expect("admin seeded");
  let user = store.find_by_login("user").unwrap().expect("user seeded");
  assert_eq!(admin.id, 1);
  assert_eq!(user.id, 2);
  assert!(store.find_by_login("nobody").unwrap().is_none());
}

#[test]
fn block_round_trip_keeps_fields() {
  let Some(store) = setup_store() else { return };
  let original = Block::new(BlockType::Title, "This is a Title", 2, "hash");
  let saved = CrudRepository::<Block>::save(&store, original.clone()).unwrap();
  let id = saved.id.expect("id assigned");
  let loaded = CrudRepository::<Block>::find_by_id(&store, id).unwrap().expect("stored");
  assert_eq!(loaded.block_type, BlockType::Title);
  assert_eq!(loaded.content, "This is a Title");
  assert_eq!(loaded.parent_id, None);
  // se guarda con precisión de milisegundos
  assert_eq!(loaded.created_date.timestamp_millis(), original.created_date.timestamp_millis());

  let rev = loaded.revise(BlockType::Title, "New title", 2, "hash").unwrap();
  let rev = CrudRepository::<Block>::save(&store, rev).unwrap();
  assert_eq!(rev.parent_id, Some(id));
  assert!(store.is_referenced(id).unwrap());
}

#[test]
fn updating_missing_row_is_not_found() {
  let Some(store) = setup_store() else { return };
  let ghost = Book { id: Some(999), name: "ghost".into() };
  assert!(matches!(CrudRepository::<Book>::save(&store, ghost), Err(StoreError::NotFound(_))));
}

#[test]
fn flow_blocks_join_in_order_and_delete_by_flow() {
  let Some(store) = setup_store() else { return };
  let flow = CrudRepository::<Flow>::save(&store, Flow::new("official").owned_by(2)).unwrap();
  let flow_id = flow.id.unwrap();
  let texts = ["This is a Title", "Hello world", "bye"];
  let mut ids = Vec::new();
  for text in texts {
    let b = CrudRepository::<Block>::save(&store, Block::new(BlockType::Paragraph, text, 2, "hash")).unwrap();
    ids.push(b.id.unwrap());
  }
  // filas insertadas fuera de orden
  for (order, idx) in [(3, 2), (1, 0), (2, 1)] {
    CrudRepository::<FlowBlock>::save(&store, FlowBlock::new(flow_id, ids[idx], order)).unwrap();
  }
  let blocks = BlockRepository::find_by_flow_id(&store, flow_id).unwrap();
  assert_eq!(blocks.iter().map(|b| b.content.as_str()).collect::<Vec<_>>(), texts.to_vec());
  assert_eq!(store.delete_by_flow_id(flow_id).unwrap(), 3);
  assert!(FlowBlockRepository::find_by_flow_id(&store, flow_id).unwrap().is_empty());
  assert_eq!(FlowRepository::find_by_user_id(&store, 2).unwrap().len(), 1);
}

#[test]
fn lock_for_update_compares_and_increments() {
  let Some(store) = setup_store() else { return };
  let flow = CrudRepository::<Flow>::save(&store, Flow::new("versioned")).unwrap();
  let id = flow.id.unwrap();
  assert_eq!(store.lock_for_update(id, 0).unwrap(), PersistResult::Ok { new_version: 1 });
  assert_eq!(store.lock_for_update(id, 0).unwrap(), PersistResult::Conflict { current_version: 1 });
  // renombrar no toca la versión
  let renamed = CrudRepository::<Flow>::save(&store, Flow { name: "renamed".into(), version: 0, ..flow }).unwrap();
  assert_eq!(renamed.version, 1);
  assert!(matches!(store.lock_for_update(12345, 0), Err(StoreError::NotFound(_))));
}

#[test]
fn find_all_applies_specification_and_paging() {
  let Some(store) = setup_store() else { return };
  for name in ["alpha", "beta", "gamma", "delta"] {
    CrudRepository::<Book>::save(&store, Book::new(name)).unwrap();
  }
  let with_a = Specification::<Book>::all().and(|b| b.name.ends_with('a'));
  let page = CrudRepository::<Book>::find_all(&store, &with_a, &Pageable::new(1, 2)).unwrap();
  assert_eq!(page.total_elements, 4);
  assert_eq!(page.content.iter().map(|b| b.name.as_str()).collect::<Vec<_>>(), vec!["gamma", "delta"]);
  let short = Specification::<Book>::all().and(|b| b.name.len() == 4);
  assert_eq!(CrudRepository::<Book>::count(&store, &short).unwrap(), 1);
}

#[test]
fn save_user_rejects_duplicate_login() {
  let Some(store) = setup_store() else { return };
  let carol = store.save_user(User::new(3, "carol")).unwrap();
  assert_eq!(store.find_user_by_id(3).unwrap(), Some(carol));
  assert!(matches!(store.save_user(User::new(4, "carol")), Err(StoreError::Conflict(_))));
}

fn official_flow(store: &DieselStore) -> (i64, Vec<i64>) {
  let flow = CrudRepository::<Flow>::save(store, Flow::new("official").owned_by(2)).unwrap();
  let flow_id = flow.id.unwrap();
  let mut ids = Vec::new();
  for (order, text) in ["This is a Title", "Hello world"].into_iter().enumerate() {
    let b = CrudRepository::<Block>::save(store, Block::new(BlockType::Paragraph, text, 2, "hash")).unwrap();
    let id = b.id.unwrap();
    CrudRepository::<FlowBlock>::save(store, FlowBlock::new(flow_id, id, order as i64 + 1)).unwrap();
    ids.push(id);
  }
  (flow_id, ids)
}

#[test]
fn flow_block_rows_need_flow_block_and_free_order() {
  let Some(store) = setup_store() else { return };
  let (flow_id, ids) = official_flow(&store);

  let taken = CrudRepository::<FlowBlock>::save(&store, FlowBlock::new(flow_id, ids[1], 1));
  assert!(matches!(taken, Err(StoreError::Conflict(_))), "{:?}", taken);
  let no_block = CrudRepository::<FlowBlock>::save(&store, FlowBlock::new(flow_id, 999_999, 3));
  assert!(matches!(no_block, Err(StoreError::NotFound(_))), "{:?}", no_block);
  let no_flow = CrudRepository::<FlowBlock>::save(&store, FlowBlock::new(999_999, ids[0], 1));
  assert!(matches!(no_flow, Err(StoreError::NotFound(_))), "{:?}", no_flow);

  let orders: Vec<i64> = FlowBlockRepository::find_by_flow_id(&store, flow_id).unwrap()
                                                                              .iter()
                                                                              .map(|fb| fb.block_order)
                                                                              .collect();
  assert_eq!(orders, vec![1, 2]);
}

#[test]
fn foreign_keys_are_enforced() {
  let Some(store) = setup_store() else { return };
  // usuario 77 no existe
  let orphan = CrudRepository::<Block>::save(&store, Block::new(BlockType::Paragraph, "x", 77, "hash"));
  assert!(matches!(orphan, Err(StoreError::NotFound(_))), "{:?}", orphan);
}

#[test]
fn failed_transaction_is_rolled_back() {
  let Some(store) = setup_store() else { return };
  let (flow_id, ids) = official_flow(&store);
  let blocks_before = CrudRepository::<Block>::count(&store, &Specification::all()).unwrap();

  let res = store.transaction(&mut |tx| {
                   tx.lock_for_update(flow_id, 0)?;
                   tx.delete_flow_blocks(flow_id)?;
                   let b = tx.save_block(Block::new(BlockType::Paragraph, "new", 2, "hash"))?;
                   tx.save_flow_block(FlowBlock::new(flow_id, b.id.unwrap(), 1))?;
                   tx.save_flow_block(FlowBlock::new(flow_id, 999_999, 2))?;
                   Ok(())
                 });

  assert!(matches!(res, Err(StoreError::NotFound(_))), "{:?}", res);
  assert_eq!(CrudRepository::<Flow>::find_by_id(&store, flow_id).unwrap().unwrap().version, 0);
  let rows = FlowBlockRepository::find_by_flow_id(&store, flow_id).unwrap();
  assert_eq!(rows.iter().map(|fb| fb.block_id).collect::<Vec<_>>(), ids);
  assert_eq!(CrudRepository::<Block>::count(&store, &Specification::all()).unwrap(), blocks_before);
}
