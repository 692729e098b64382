// Archivo: paging.rs
// Propósito: paginación simple (página 0-based, orden por id ascendente)
// compartida por todos los stores.
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Petición de página.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pageable {
    pub page: u32,
    pub size: u32,
}

impl Pageable {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    /// Primera página con el tamaño indicado.
    pub fn first(size: u32) -> Self {
        Self::new(0, size)
    }

    /// Todos los elementos en una sola página.
    pub fn unpaged() -> Self {
        Self::new(0, u32::MAX)
    }

    pub fn offset(&self) -> usize {
        (self.page as usize).saturating_mul(self.size as usize)
    }

    /// Recorta `items` (ya ordenados) a la página pedida.
    pub fn paginate<T>(&self, items: Vec<T>) -> Page<T> {
        let total = items.len() as u64;
        let size = self.size.max(1);
        let content = items.into_iter()
                           .skip((self.page as usize).saturating_mul(size as usize))
                           .take(size as usize)
                           .collect();
        Page { content, total_elements: total, page: self.page, size }
    }
}

impl Default for Pageable {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}

/// Página de resultados con el total de elementos que cumplen el filtro.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub page: u32,
    pub size: u32,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.total_elements.div_ceil(self.size as u64)
    }

    pub fn is_last(&self) -> bool {
        (self.page as u64) + 1 >= self.total_pages()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page { content: self.content.into_iter().map(f).collect(),
               total_elements: self.total_elements,
               page: self.page,
               size: self.size }
    }
}
