mod common;

use common::{doc, in_memory, in_memory_with, node, orders, seed_official};
use pradera_domain::{Block, BlockPatch, BlockType, Book, Entity, Flow, FlowBlock, FlowBlockPatch, FlowPatch,
                     PLACEHOLDER_HASH};
use pradera_service::{BlockCriteria, FingerprintStrategy, FlowCriteria, ServiceConfig, ServiceError};
use pradera_store::{Filter, Pageable, RangeFilter, StringFilter};

#[test]
fn create_with_id_is_rejected() {
  let fx = in_memory();
  let err = fx.services.books.create(Book::new("Libro").with_id(5)).unwrap_err();
  assert!(matches!(err, ServiceError::Conflict(ref m) if m.contains("idexists")));
}

#[test]
fn update_checks_body_id_against_path() {
  let fx = in_memory();
  let flow = fx.services.flows.create(Flow::new("primero").owned_by(2)).unwrap();
  let id = flow.id.unwrap();

  let err = fx.services.flows.update(id, Flow::new("sin id")).unwrap_err();
  assert!(matches!(err, ServiceError::Validation(ref m) if m.contains("idnull")));

  let err = fx.services.flows.update(id + 100, flow.clone()).unwrap_err();
  assert!(matches!(err, ServiceError::Validation(ref m) if m.contains("idinvalid")));

  let ghost = Flow::new("fantasma").with_id(9999);
  let err = fx.services.flows.update(9999, ghost).unwrap_err();
  assert!(matches!(err, ServiceError::NotFound(ref m) if m.contains("idnotfound")));

  let renamed = fx.services.flows.update(id, Flow { name: "renombrado".into(), ..flow }).unwrap();
  assert_eq!(renamed.name, "renombrado");
}

#[test]
fn invalid_entities_are_rejected() {
  let fx = in_memory();
  assert!(matches!(fx.services.flows.create(Flow::new("ab")), Err(ServiceError::Validation(_))));
  assert!(matches!(fx.services.blocks.create(Block::new(BlockType::Paragraph, "x", 0, "hash")),
                   Err(ServiceError::Validation(_))));
  assert!(matches!(fx.services.flow_blocks.create(FlowBlock::new(1, 1, 0)), Err(ServiceError::Validation(_))));
}

#[test]
fn block_order_is_unique_within_a_flow() {
  let fx = in_memory();
  let (flow, seeded) = seed_official(&fx.services);
  let flow_id = flow.id.unwrap();

  let err = fx.services.flow_blocks.create(FlowBlock::new(flow_id, seeded[2].id.unwrap(), 1)).unwrap_err();
  assert!(matches!(err, ServiceError::Conflict(_)), "{:?}", err);

  let last = fx.services.flow_blocks.find_by_flow_id(flow_id).unwrap()[2].clone();
  let moved = FlowBlockPatch { block_order: Some(2), ..Default::default() };
  let err = fx.services.flow_blocks.partial_update(last.id.unwrap(), moved).unwrap_err();
  assert!(matches!(err, ServiceError::Conflict(_)), "{:?}", err);
  assert_eq!(orders(&fx.services, flow_id), vec![1, 2, 3]);

  // otro flow puede usar la misma posición
  let other = fx.services.flows.create(Flow::new("borrador").owned_by(2)).unwrap();
  fx.services.flow_blocks.create(FlowBlock::new(other.id.unwrap(), seeded[0].id.unwrap(), 1)).unwrap();
}

#[test]
fn flow_block_needs_existing_flow_and_block() {
  let fx = in_memory();
  let (flow, seeded) = seed_official(&fx.services);
  let flow_id = flow.id.unwrap();

  let err = fx.services.flow_blocks.create(FlowBlock::new(flow_id, 999_999, 4)).unwrap_err();
  assert!(matches!(err, ServiceError::NotFound(ref m) if m.contains("999999")), "{:?}", err);
  let err = fx.services.flow_blocks.create(FlowBlock::new(999_999, seeded[0].id.unwrap(), 1)).unwrap_err();
  assert!(matches!(err, ServiceError::NotFound(_)), "{:?}", err);
  let first = fx.services.flow_blocks.find_by_flow_id(flow_id).unwrap()[0].clone();
  let dangling = FlowBlockPatch { block_id: Some(999_999), ..Default::default() };
  assert!(matches!(fx.services.flow_blocks.partial_update(first.id.unwrap(), dangling),
                   Err(ServiceError::NotFound(_))));

  // el flow sigue siendo legible y reconciliable
  assert_eq!(fx.services.flows.document(flow_id).unwrap().entries.len(), 3);
  let exported = fx.services.flows.doc_state(flow_id).unwrap();
  assert_eq!(fx.services.flows.update_doc_state("user", flow_id, &exported).unwrap().flow.version, 1);
}

#[test]
fn partial_update_only_touches_given_fields() {
  let fx = in_memory();
  let book = fx.services.books.create(Book::new("Libro")).unwrap();
  let flow = fx.services.flows.create(Flow::new("capitulo").owned_by(2)).unwrap();

  let patched = fx.services
                  .flows
                  .partial_update(flow.id.unwrap(), FlowPatch { book_id: book.id, ..FlowPatch::default() })
                  .unwrap();

  assert_eq!(patched.book_id, book.id);
  assert_eq!(patched.name, "capitulo");
  assert_eq!(patched.user_id, Some(2));

  let err = fx.services.flows.partial_update(9999, FlowPatch::default()).unwrap_err();
  assert!(matches!(err, ServiceError::NotFound(_)));
}

#[test]
fn block_create_fills_empty_hash() {
  let fx = in_memory();
  let block = fx.services.blocks.create(Block::new(BlockType::Paragraph, "x", 2, "")).unwrap();
  assert_eq!(block.hash, PLACEHOLDER_HASH);

  let config = ServiceConfig { fingerprint: FingerprintStrategy::Sha256, ..ServiceConfig::default() };
  let fx = in_memory_with(config);
  let block = fx.services.blocks.create(Block::new(BlockType::Paragraph, "x", 2, "  ")).unwrap();
  assert_eq!(block.hash.len(), 64);
  let given = fx.services.blocks.create(Block::new(BlockType::Paragraph, "x", 2, "propio")).unwrap();
  assert_eq!(given.hash, "propio");
}

#[test]
fn referenced_block_cannot_be_deleted() {
  let fx = in_memory();
  let (_, seeded) = seed_official(&fx.services);
  let err = fx.services.blocks.delete(seeded[0].id.unwrap()).unwrap_err();
  assert!(matches!(err, ServiceError::Conflict(_)));
  assert!(fx.services.blocks.find_one(seeded[0].id.unwrap()).unwrap().is_some());
}

#[test]
fn parent_of_a_revision_cannot_be_deleted() {
  let fx = in_memory();
  let (flow, seeded) = seed_official(&fx.services);
  let title = seeded[0].id.unwrap();
  fx.services.flows.update_doc_state("user", flow.id.unwrap(), &doc(vec![node("heading", "Nuevo", Some(title))])).unwrap();
  assert!(orders(&fx.services, flow.id.unwrap()).len() == 1);
  assert!(matches!(fx.services.blocks.delete(title), Err(ServiceError::Conflict(_))));
}

#[test]
fn deleting_a_free_block_removes_it_from_search() {
  let fx = in_memory();
  let block = fx.services.blocks.create(Block::new(BlockType::Paragraph, "solitario", 2, "hash")).unwrap();
  assert_eq!(fx.services.blocks.search("solitario", &Pageable::default()).unwrap().total_elements, 1);

  fx.services.blocks.delete(block.id.unwrap()).unwrap();

  assert!(fx.services.blocks.find_one(block.id.unwrap()).unwrap().is_none());
  assert_eq!(fx.services.blocks.search("solitario", &Pageable::default()).unwrap().total_elements, 0);
}

#[test]
fn block_updates_are_mirrored_in_search() {
  let fx = in_memory();
  let block = fx.services.blocks.create(Block::new(BlockType::Paragraph, "antes", 2, "hash")).unwrap();
  fx.services
    .blocks
    .partial_update(block.id.unwrap(), BlockPatch { content: Some("despues".into()), ..BlockPatch::default() })
    .unwrap();

  assert_eq!(fx.services.blocks.search("antes", &Pageable::default()).unwrap().total_elements, 0);
  assert_eq!(fx.services.blocks.search("despues", &Pageable::default()).unwrap().total_elements, 1);
}

#[test]
fn search_can_filter_by_type() {
  let fx = in_memory();
  seed_official(&fx.services);
  let hits = fx.services.blocks.search("type:TITLE title", &Pageable::default()).unwrap();
  assert_eq!(hits.total_elements, 1);
  assert_eq!(hits.content[0].block_type, BlockType::Title);
}

#[test]
fn rebuild_index_restores_every_block() {
  let fx = in_memory();
  seed_official(&fx.services);
  pradera_store::BlockSearchRepository::clear(fx.search.as_ref()).unwrap();
  assert!(fx.search.is_empty());

  let indexed = fx.services.blocks.rebuild_index().unwrap();

  assert_eq!(indexed, 3);
  assert_eq!(fx.search.len(), 3);
}

#[test]
fn deleting_a_flow_keeps_its_blocks() {
  let fx = in_memory();
  let (flow, seeded) = seed_official(&fx.services);
  let flow_id = flow.id.unwrap();

  fx.services.flows.delete(flow_id).unwrap();

  assert!(fx.services.flows.find_one(flow_id).unwrap().is_none());
  assert!(fx.services.flow_blocks.find_by_flow_id(flow_id).unwrap().is_empty());
  assert!(fx.services.blocks.find_one(seeded[0].id.unwrap()).unwrap().is_some());
  fx.services.blocks.delete(seeded[2].id.unwrap()).unwrap();
}

#[test]
fn book_with_flows_cannot_be_deleted() {
  let fx = in_memory();
  let book = fx.services.books.create(Book::new("Libro")).unwrap();
  let book_id = book.id.unwrap();
  let flow = fx.services.flows.create(Flow::new("capitulo").in_book(book_id)).unwrap();

  assert!(matches!(fx.services.books.delete(book_id), Err(ServiceError::Conflict(_))));

  fx.services.flows.delete(flow.id.unwrap()).unwrap();
  fx.services.books.delete(book_id).unwrap();
  assert!(fx.services.books.find_one(book_id).unwrap().is_none());
}

#[test]
fn criteria_filter_and_count_blocks() {
  let fx = in_memory();
  seed_official(&fx.services);
  fx.services.blocks.create(Block::new(BlockType::Paragraph, "de admin", 1, "hash")).unwrap();

  let paragraphs_by_user = BlockCriteria { block_type: Some(Filter::equals(BlockType::Paragraph)),
                                           user_id: Some(RangeFilter::equals(2)),
                                           ..BlockCriteria::default() };
  let page = fx.services.blocks.find_by_criteria(&paragraphs_by_user, &Pageable::default()).unwrap();
  let contents: Vec<&str> = page.content.iter().map(|b| b.content.as_str()).collect();
  assert_eq!(contents, vec!["Hello world", "bye"]);
  assert_eq!(fx.services.blocks.count_by_criteria(&paragraphs_by_user).unwrap(), 2);

  let hello = BlockCriteria { content: Some(StringFilter::contains("HELLO")), ..BlockCriteria::default() };
  assert_eq!(fx.services.blocks.count_by_criteria(&hello).unwrap(), 1);
}

#[test]
fn criteria_deserialize_from_query_shape() {
  let fx = in_memory();
  fx.services.flows.create(Flow::new("alfa").owned_by(1)).unwrap();
  fx.services.flows.create(Flow::new("beta").owned_by(2)).unwrap();

  let criteria: FlowCriteria = serde_json::from_value(serde_json::json!({ "userId": { "equals": 2 } })).unwrap();
  let page = fx.services.flows.find_by_criteria(&criteria, &Pageable::default()).unwrap();
  assert_eq!(page.total_elements, 1);
  assert_eq!(page.content[0].name, "beta");
}

#[test]
fn page_size_is_clamped() {
  let config = ServiceConfig { default_page_size: 2, max_page_size: 3, ..ServiceConfig::default() };
  let fx = in_memory_with(config);
  for name in ["uno", "dos", "tres", "cuatro", "cinco"] {
    fx.services.books.create(Book::new(name)).unwrap();
  }

  let unsized_page = fx.services.books.find_all(&Pageable::new(0, 0)).unwrap();
  assert_eq!(unsized_page.content.len(), 2);

  let huge = fx.services.books.find_all(&Pageable::unpaged()).unwrap();
  assert_eq!(huge.content.len(), 3);
  assert_eq!(huge.total_elements, 5);
}

#[test]
fn lookups_by_login() {
  let fx = in_memory();
  let (flow, _) = seed_official(&fx.services);

  let flows = fx.services.flows.find_by_user_login("user").unwrap();
  assert_eq!(flows.iter().map(|f| f.id).collect::<Vec<_>>(), vec![flow.id]);
  assert_eq!(fx.services.blocks.find_by_user_login("user").unwrap().len(), 3);
  assert!(fx.services.blocks.find_by_user_login("admin").unwrap().is_empty());
  assert!(matches!(fx.services.flows.find_by_user_login("ghost"), Err(ServiceError::NotFound(_))));
}

#[test]
fn doc_state_exports_editor_shape() {
  let fx = in_memory();
  let (flow, seeded) = seed_official(&fx.services);
  let exported = fx.services.flows.doc_state(flow.id.unwrap()).unwrap();

  assert_eq!(exported["type"], "doc");
  assert_eq!(exported["content"][0]["type"], "heading");
  assert_eq!(exported["content"][0]["attrs"]["blockId"], seeded[0].id.unwrap());
  assert_eq!(exported["content"][2]["content"][0]["text"], "bye");
}
