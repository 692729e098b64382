use pradera_domain::{Block, BlockType, Flow, FlowBlock};
use pradera_persistence::new_from_env;
use pradera_store::{BlockRepository, CrudRepository, UserDirectory};

fn main() {
  // El ejemplo usa PRADERA_DB_URL / DATABASE_URL. Sin ninguna de las dos, la
  // build SQLite abre `pradera.db` en el directorio actual.
  let store = new_from_env().expect("no se pudo inicializar el store");

  let user = store.find_by_login("user").expect("lookup").expect("usuario 'user' sembrado");
  let flow = CrudRepository::<Flow>::save(&store, Flow::new("example").owned_by(user.id)).expect("create flow");
  let flow_id = flow.id.expect("id");
  println!("created flow {}", flow_id);

  let contents = [(BlockType::Title, "This is a Title"),
                  (BlockType::Paragraph, "Hello world"),
                  (BlockType::Paragraph, "bye")];
  for (i, (t, text)) in contents.into_iter().enumerate() {
    let b = CrudRepository::<Block>::save(&store, Block::new(t, text, user.id, "hash")).expect("save block");
    CrudRepository::<FlowBlock>::save(&store, FlowBlock::new(flow_id, b.id.expect("id"), i as i64 + 1))
      .expect("save flowBlock");
  }

  for b in BlockRepository::find_by_flow_id(&store, flow_id).expect("load") {
    println!("  {}", b);
  }
}
