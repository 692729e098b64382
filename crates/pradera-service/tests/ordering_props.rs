//! Propiedades de la reconciliación sobre documentos generados.
//!
//! Partiendo del flow "official" se generan documentos que mezclan nodos
//! nuevos, nodos que reutilizan un bloque sin cambios y nodos que lo editan.

mod common;

use common::{doc, in_memory, node, orders, seed_official};
use proptest::prelude::*;
use serde_json::Value as JsonValue;

#[derive(Debug, Clone)]
enum Edit {
  New(String),
  Same(usize),
  Changed(usize, String),
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
  prop_oneof![
    "[a-z ]{1,12}".prop_map(Edit::New),
    (0..3usize).prop_map(Edit::Same),
    // mayúsculas: nunca coincide con el contenido sembrado
    (0..3usize, "[A-Z]{1,8}").prop_map(|(i, s)| Edit::Changed(i, s)),
  ]
}

proptest! {
  #![proptest_config(ProptestConfig::with_cases(64))]

  #[test]
  fn orders_are_contiguous_and_reuse_is_exact(edits in prop::collection::vec(edit_strategy(), 0..10)) {
    let fx = in_memory();
    let (flow, seeded) = seed_official(&fx.services);
    let flow_id = flow.id.unwrap();
    let editor_type = |i: usize| if i == 0 { "heading" } else { "paragraph" };

    let nodes: Vec<JsonValue> = edits.iter()
                                     .map(|e| match e {
                                       Edit::New(text) => node("paragraph", text, None),
                                       Edit::Same(i) => node(editor_type(*i), &seeded[*i].content, seeded[*i].id),
                                       Edit::Changed(i, text) => node(editor_type(*i), text, seeded[*i].id),
                                     })
                                     .collect();
    let document = fx.services.flows.update_doc_state("user", flow_id, &doc(nodes)).unwrap();

    let expected: Vec<i64> = (1..=edits.len() as i64).collect();
    prop_assert_eq!(orders(&fx.services, flow_id), expected.clone());
    prop_assert_eq!(document.entries.iter().map(|e| e.block_order).collect::<Vec<_>>(), expected);

    for (edit, entry) in edits.iter().zip(&document.entries) {
      match edit {
        Edit::New(_) => prop_assert_eq!(entry.block.parent_id, None),
        Edit::Same(i) => prop_assert_eq!(entry.block.id, seeded[*i].id),
        Edit::Changed(i, text) => {
          prop_assert_eq!(entry.block.parent_id, seeded[*i].id);
          prop_assert_eq!(&entry.block.content, text);
        }
      }
    }

    // reenviar lo exportado no crea bloques
    let exported = fx.services.flows.doc_state(flow_id).unwrap();
    let again = fx.services.flows.update_doc_state("user", flow_id, &exported).unwrap();
    prop_assert_eq!(again.block_ids(), document.block_ids());
  }
}
