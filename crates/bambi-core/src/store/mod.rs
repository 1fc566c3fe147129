//! Contrato de almacenamiento de documentos.

pub mod memory;

pub use memory::InMemoryStore;

use crate::document::Document;
use crate::errors::StoreError;
use crate::schema::{CollectionSchema, EnsureOutcome, IndexSpec};

/// Conteos de una operación "vaciar y cargar".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplaceSummary {
    pub removed: u64,
    pub inserted: u64,
}

/// Almacenamiento de documentos sobre una base de datos destino.
///
/// Contrato común a todos los backends:
/// - `ensure_*` es idempotente: una definición idéntica a la existente no hace
///   nada; una distinta con el mismo nombre devuelve `SchemaConflict`.
/// - Las escrituras pasan por el validador estructural de la colección.
/// - `insert_many` y `replace_all` son atómicas: ante cualquier error
///   (`Validation`, `DuplicateKey`) la colección queda como estaba.
/// - `find_all` devuelve los documentos ordenados por `_id`.
pub trait DocumentStore {
    /// Nombre de la base de datos destino.
    fn database(&self) -> &str;

    fn ensure_collection(&mut self, schema: &CollectionSchema) -> Result<EnsureOutcome, StoreError>;

    fn ensure_index(&mut self, index: &IndexSpec) -> Result<EnsureOutcome, StoreError>;

    /// Inserta un lote y devuelve los `_id` en el orden recibido.
    fn insert_many(&mut self, collection: &str, docs: Vec<Document>) -> Result<Vec<String>, StoreError>;

    /// Borra todos los documentos de la colección y devuelve cuántos había.
    fn delete_all(&mut self, collection: &str) -> Result<u64, StoreError>;

    /// Vacía la colección y carga `docs` como una sola unidad.
    fn replace_all(&mut self, collection: &str, docs: Vec<Document>) -> Result<ReplaceSummary, StoreError>;

    fn count(&self, collection: &str) -> Result<u64, StoreError>;

    fn find_all(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// Elimina todos los contenedores, índices y definiciones de la base.
    fn drop_database(&mut self) -> Result<(), StoreError>;
}
