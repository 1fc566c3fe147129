//! bambi-core: modelo de documentos, definiciones de colección y contrato de
//! almacenamiento, independiente de cualquier base de datos concreta.
//!
//! Módulos:
//! - `document`: `Document` y `FieldValue` (valores con tipo primitivo).
//! - `schema`: definiciones de colecciones e índices.
//! - `validate`: validador estructural compartido por todos los backends.
//! - `store`: trait `DocumentStore` y backend en memoria.
//! - `hashing`: JSON canónico y huellas de definiciones.
pub mod document;
pub mod errors;
pub mod hashing;
pub mod schema;
pub mod store;
pub mod validate;

pub use document::{Document, FieldValue, ID_FIELD};
pub use errors::StoreError;
pub use schema::{CollectionSchema, EnsureOutcome, FieldKind, FieldSpec, IdPolicy, IndexKey, IndexSpec, SortOrder};
pub use store::{DocumentStore, InMemoryStore, ReplaceSummary};
