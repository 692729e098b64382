// Operaciones CRUD genéricas compartidas por los servicios de entidad.
use crate::errors::{Result, ServiceError};
use log::debug;
use pradera_domain::Entity;
use pradera_store::{CrudRepository, Page, Pageable, Specification};
use std::fmt::Debug;

pub(crate) fn create<E, R>(repo: &R, entity: E) -> Result<E>
  where E: Entity + Debug,
        R: CrudRepository<E> + ?Sized
{
  debug!("Request to save {} : {:?}", E::NAME, entity);
  if entity.id().is_some() {
    return Err(ServiceError::Conflict(format!("A new {} cannot already have an ID (idexists)", E::NAME)));
  }
  entity.validate()?;
  Ok(repo.save(entity)?)
}

pub(crate) fn update<E, R>(repo: &R, id: i64, entity: E) -> Result<E>
  where E: Entity + Debug,
        R: CrudRepository<E> + ?Sized
{
  debug!("Request to update {} {} : {:?}", E::NAME, id, entity);
  check_path_id::<E, R>(repo, id, entity.id())?;
  entity.validate()?;
  Ok(repo.save(entity)?)
}

pub(crate) fn partial_update<E, R>(repo: &R, id: i64, patch: E::Patch) -> Result<E>
  where E: Entity + Debug,
        R: CrudRepository<E> + ?Sized
{
  debug!("Request to partially update {} {}", E::NAME, id);
  let mut current = repo.find_by_id(id)?
                        .ok_or_else(|| ServiceError::NotFound(format!("{} {} (idnotfound)", E::NAME, id)))?;
  current.apply_patch(patch);
  current.validate()?;
  Ok(repo.save(current)?)
}

pub(crate) fn find_one<E, R>(repo: &R, id: i64) -> Result<Option<E>>
  where E: Entity,
        R: CrudRepository<E> + ?Sized
{
  debug!("Request to get {} : {}", E::NAME, id);
  Ok(repo.find_by_id(id)?)
}

pub(crate) fn find_page<E, R>(repo: &R, spec: &Specification<E>, pageable: &Pageable) -> Result<Page<E>>
  where E: Entity,
        R: CrudRepository<E> + ?Sized
{
  debug!("Request to get {}s by {:?}, page {:?}", E::NAME, spec, pageable);
  Ok(repo.find_all(spec, pageable)?)
}

pub(crate) fn count<E, R>(repo: &R, spec: &Specification<E>) -> Result<u64>
  where E: Entity,
        R: CrudRepository<E> + ?Sized
{
  debug!("count {}s by {:?}", E::NAME, spec);
  Ok(repo.count(spec)?)
}

/// Comprueba el id del cuerpo frente al de la ruta y que la fila exista.
fn check_path_id<E, R>(repo: &R, id: i64, body_id: Option<i64>) -> Result<()>
  where E: Entity,
        R: CrudRepository<E> + ?Sized
{
  let body_id = body_id.ok_or_else(|| ServiceError::Validation(format!("Invalid {} id (idnull)", E::NAME)))?;
  if body_id != id {
    return Err(ServiceError::Validation(format!("Invalid {} id {} != {} (idinvalid)", E::NAME, body_id, id)));
  }
  if !repo.exists_by_id(id)? {
    return Err(ServiceError::NotFound(format!("{} {} (idnotfound)", E::NAME, id)));
  }
  Ok(())
}
