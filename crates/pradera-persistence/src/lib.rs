//! Persistencia Diesel para los contratos de `pradera-store`.
//! Este archivo expone el módulo `schema` y reexporta `DieselStore`, que
//! implementa todos los repositorios y el directorio de usuarios sobre un
//! pool r2d2. La implementación detallada está en `domain_persistence.rs`.

mod domain_persistence;
pub mod schema;

#[cfg(not(feature = "pg"))]
pub use domain_persistence::DEFAULT_SQLITE_URL;
pub use domain_persistence::{new_from_env, DieselStore, MIGRATIONS};
