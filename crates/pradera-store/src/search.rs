// Archivo: search.rs
// Propósito: índice de búsqueda de bloques en memoria. Replica los bloques
// guardados por el store principal y resuelve consultas de texto simples.
use crate::errors::Result;
use crate::paging::{Page, Pageable};
use crate::repository::BlockSearchRepository;
use dashmap::DashMap;
use pradera_domain::{Block, BlockType};

/// Consulta ya interpretada.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub terms: Vec<String>,
    pub block_type: Option<BlockType>,
}

impl SearchQuery {
    /// Separa la consulta en términos. `type:<TIPO>` con un tipo válido
    /// restringe el tipo; si el tipo no existe se trata como texto.
    pub fn parse(query: &str) -> Self {
        let mut parsed = SearchQuery::default();
        for token in query.split_whitespace() {
            let as_type = token.strip_prefix("type:").and_then(|t| t.parse::<BlockType>().ok());
            match as_type {
                Some(t) => parsed.block_type = Some(t),
                None => parsed.terms.push(token.to_lowercase()),
            }
        }
        parsed
    }

    pub fn matches(&self, block: &Block) -> bool {
        if self.block_type.is_some_and(|t| t != block.block_type) {
            return false;
        }
        let content = block.content.to_lowercase();
        self.terms.iter().all(|term| content.contains(term.as_str()))
    }
}

/// Índice en memoria sobre `DashMap`, seguro entre hilos sin `Mutex`.
#[derive(Debug, Default)]
pub struct InMemoryBlockSearch {
    docs: DashMap<i64, Block>,
}

impl InMemoryBlockSearch {
    pub fn new() -> Self {
        Self { docs: DashMap::new() }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl BlockSearchRepository for InMemoryBlockSearch {
    /// Los bloques sin id no se indexan.
    fn index(&self, block: &Block) -> Result<()> {
        if let Some(id) = block.id {
            self.docs.insert(id, block.clone());
        }
        Ok(())
    }

    fn remove(&self, block_id: i64) -> Result<()> {
        self.docs.remove(&block_id);
        Ok(())
    }

    fn search(&self, query: &str, pageable: &Pageable) -> Result<Page<Block>> {
        let parsed = SearchQuery::parse(query);
        let mut hits: Vec<Block> = self.docs
                                       .iter()
                                       .filter(|entry| parsed.matches(entry.value()))
                                       .map(|entry| entry.value().clone())
                                       .collect();
        hits.sort_by_key(|b| b.id);
        Ok(pageable.paginate(hits))
    }

    fn clear(&self) -> Result<()> {
        self.docs.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pradera_domain::Entity;

    fn indexed() -> InMemoryBlockSearch {
        let search = InMemoryBlockSearch::new();
        let blocks = [Block::new(BlockType::Title, "This is a Title", 2, "hash").with_id(1),
                      Block::new(BlockType::Paragraph, "Hello world", 2, "hash").with_id(2),
                      Block::new(BlockType::Paragraph, "bye world", 2, "hash").with_id(3)];
        for b in &blocks {
            search.index(b).unwrap();
        }
        search
    }

    #[test]
    fn terms_are_anded_and_case_insensitive() {
        let search = indexed();
        let page = search.search("WORLD", &Pageable::default()).unwrap();
        assert_eq!(page.total_elements, 2);
        let page = search.search("hello world", &Pageable::default()).unwrap();
        assert_eq!(page.content.len(), 1);
        assert_eq!(page.content[0].id, Some(2));
    }

    #[test]
    fn type_prefix_restricts_block_type() {
        let search = indexed();
        let page = search.search("type:title", &Pageable::default()).unwrap();
        assert_eq!(page.content.iter().map(|b| b.id).collect::<Vec<_>>(), vec![Some(1)]);
        assert!(search.search("type:title world", &Pageable::default()).unwrap().content.is_empty());
    }

    #[test]
    fn unknown_type_prefix_is_plain_text() {
        let q = SearchQuery::parse("type:image");
        assert_eq!(q.block_type, None);
        assert_eq!(q.terms, vec!["type:image".to_string()]);
    }

    #[test]
    fn remove_and_clear() {
        let search = indexed();
        search.remove(1).unwrap();
        assert_eq!(search.len(), 2);
        search.clear().unwrap();
        assert!(search.is_empty());
    }
}
