// Criterios de búsqueda por entidad.
//
// Cada struct enumera los campos filtrables de su entidad con un filtro
// tipado opcional; `to_specification` los combina con AND en una
// `Specification` que los stores aplican al listar y contar.
use chrono::{DateTime, Utc};
use pradera_domain::{Block, BlockType, Book, Flow, FlowBlock};
use pradera_store::{Filter, RangeFilter, Specification, StringFilter};
use serde::{Deserialize, Serialize};

/// Criterios traducibles a `Specification`.
pub trait EntityCriteria {
  type Entity;

  fn to_specification(&self) -> Specification<Self::Entity>;
}

fn with_filter<E, T>(spec: Specification<E>, filter: &Option<Filter<T>>, field: fn(&E) -> Option<&T>) -> Specification<E>
  where E: 'static,
        T: PartialEq + Clone + Send + Sync + 'static
{
  match filter {
    Some(f) => {
      let f = f.clone();
      spec.and(move |e| f.matches(field(e)))
    }
    None => spec,
  }
}

fn with_range<E, T>(spec: Specification<E>,
                    filter: &Option<RangeFilter<T>>,
                    field: fn(&E) -> Option<&T>)
                    -> Specification<E>
  where E: 'static,
        T: PartialOrd + Clone + Send + Sync + 'static
{
  match filter {
    Some(f) => {
      let f = f.clone();
      spec.and(move |e| f.matches(field(e)))
    }
    None => spec,
  }
}

fn with_text<E>(spec: Specification<E>, filter: &Option<StringFilter>, field: fn(&E) -> Option<&str>) -> Specification<E>
  where E: 'static
{
  match filter {
    Some(f) => {
      let f = f.clone();
      spec.and(move |e| f.matches(field(e)))
    }
    None => spec,
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockCriteria {
  pub id: Option<RangeFilter<i64>>,
  #[serde(rename = "type")]
  pub block_type: Option<Filter<BlockType>>,
  pub content: Option<StringFilter>,
  pub created_date: Option<RangeFilter<DateTime<Utc>>>,
  pub hash: Option<StringFilter>,
  pub parent_id: Option<RangeFilter<i64>>,
  pub user_id: Option<RangeFilter<i64>>,
}

impl EntityCriteria for BlockCriteria {
  type Entity = Block;

  fn to_specification(&self) -> Specification<Block> {
    let spec = Specification::<Self::Entity>::all();
    let spec = with_range(spec, &self.id, |b| b.id.as_ref());
    let spec = with_filter(spec, &self.block_type, |b| Some(&b.block_type));
    let spec = with_text(spec, &self.content, |b| Some(b.content.as_str()));
    let spec = with_range(spec, &self.created_date, |b| Some(&b.created_date));
    let spec = with_text(spec, &self.hash, |b| Some(b.hash.as_str()));
    let spec = with_range(spec, &self.parent_id, |b| b.parent_id.as_ref());
    with_range(spec, &self.user_id, |b| Some(&b.user_id))
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlowCriteria {
  pub id: Option<RangeFilter<i64>>,
  pub name: Option<StringFilter>,
  pub user_id: Option<RangeFilter<i64>>,
  pub book_id: Option<RangeFilter<i64>>,
}

impl EntityCriteria for FlowCriteria {
  type Entity = Flow;

  fn to_specification(&self) -> Specification<Flow> {
    let spec = Specification::<Self::Entity>::all();
    let spec = with_range(spec, &self.id, |f| f.id.as_ref());
    let spec = with_text(spec, &self.name, |f| Some(f.name.as_str()));
    let spec = with_range(spec, &self.user_id, |f| f.user_id.as_ref());
    with_range(spec, &self.book_id, |f| f.book_id.as_ref())
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlowBlockCriteria {
  pub id: Option<RangeFilter<i64>>,
  pub block_order: Option<RangeFilter<i64>>,
  pub flow_id: Option<RangeFilter<i64>>,
  pub block_id: Option<RangeFilter<i64>>,
}

impl EntityCriteria for FlowBlockCriteria {
  type Entity = FlowBlock;

  fn to_specification(&self) -> Specification<FlowBlock> {
    let spec = Specification::<Self::Entity>::all();
    let spec = with_range(spec, &self.id, |fb| fb.id.as_ref());
    let spec = with_range(spec, &self.block_order, |fb| Some(&fb.block_order));
    let spec = with_range(spec, &self.flow_id, |fb| Some(&fb.flow_id));
    with_range(spec, &self.block_id, |fb| Some(&fb.block_id))
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookCriteria {
  pub id: Option<RangeFilter<i64>>,
  pub name: Option<StringFilter>,
}

impl EntityCriteria for BookCriteria {
  type Entity = Book;

  fn to_specification(&self) -> Specification<Book> {
    let spec = Specification::<Self::Entity>::all();
    let spec = with_range(spec, &self.id, |b| b.id.as_ref());
    with_text(spec, &self.name, |b| Some(b.name.as_str()))
  }
}
