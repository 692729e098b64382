use crate::config::ServiceConfig;
use crate::criteria::{BookCriteria, EntityCriteria};
use crate::crud;
use crate::errors::{Result, ServiceError};
use crate::repositories::Repositories;
use log::debug;
use pradera_domain::{Book, BookPatch, Flow};
use pradera_store::{BookRepository, FlowRepository, Page, Pageable, Specification};
use std::sync::Arc;

pub struct BookService {
  books: Arc<dyn BookRepository>,
  flows: Arc<dyn FlowRepository>,
  config: ServiceConfig,
}

impl BookService {
  pub fn new(repos: &Repositories, config: ServiceConfig) -> Self {
    BookService { books: repos.books.clone(), flows: repos.flows.clone(), config }
  }

  pub fn create(&self, book: Book) -> Result<Book> {
    crud::create(self.books.as_ref(), book)
  }

  pub fn update(&self, id: i64, book: Book) -> Result<Book> {
    crud::update(self.books.as_ref(), id, book)
  }

  pub fn partial_update(&self, id: i64, patch: BookPatch) -> Result<Book> {
    crud::partial_update(self.books.as_ref(), id, patch)
  }

  pub fn find_all(&self, pageable: &Pageable) -> Result<Page<Book>> {
    crud::find_page(self.books.as_ref(), &Specification::all(), &self.config.clamp(pageable))
  }

  pub fn find_one(&self, id: i64) -> Result<Option<Book>> {
    crud::find_one(self.books.as_ref(), id)
  }

  pub fn find_by_criteria(&self, criteria: &BookCriteria, pageable: &Pageable) -> Result<Page<Book>> {
    crud::find_page(self.books.as_ref(), &criteria.to_specification(), &self.config.clamp(pageable))
  }

  pub fn count_by_criteria(&self, criteria: &BookCriteria) -> Result<u64> {
    crud::count(self.books.as_ref(), &criteria.to_specification())
  }

  /// Un libro que todavía agrupa flows no se borra.
  pub fn delete(&self, id: i64) -> Result<()> {
    debug!("Request to delete book : {}", id);
    let in_book = Specification::<Flow>::all().and(move |f| f.book_id == Some(id));
    let flows = self.flows.count(&in_book)?;
    if flows > 0 {
      return Err(ServiceError::Conflict(format!("book {} still groups {} flow(s)", id, flows)));
    }
    Ok(self.books.delete_by_id(id)?)
  }
}
