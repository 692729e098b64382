// Ejemplo mínimo: guardar bloques en el store en memoria, replicarlos en el
// índice de búsqueda y consultarlos.
use pradera_domain::{Block, BlockType};
use pradera_store::{BlockSearchRepository, CrudRepository, InMemoryBlockSearch, InMemoryStore, Pageable};

fn main() -> Result<(), Box<dyn std::error::Error>> {
  let store = InMemoryStore::new();
  let search = InMemoryBlockSearch::new();

  for (t, text) in [(BlockType::Title, "This is a Title"),
                    (BlockType::Paragraph, "Hello world"),
                    (BlockType::Paragraph, "bye")]
  {
    let saved = CrudRepository::<Block>::save(&store, Block::new(t, text, 2, "hash"))?;
    search.index(&saved)?;
  }

  let page = search.search("hello", &Pageable::default())?;
  println!("{} resultado(s) para 'hello':", page.total_elements);
  for b in page.content {
    println!("  {}", b);
  }
  Ok(())
}
