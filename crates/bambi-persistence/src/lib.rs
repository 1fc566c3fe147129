//! bambi-persistence
//!
//! Backend PostgreSQL (Diesel + r2d2) del contrato `DocumentStore`, con
//! paridad respecto a `InMemoryStore`.
//!
//! Módulos:
//! - `pg`: pool, proveedor de conexiones, reintentos y `PgDocumentStore`.
//! - `migrations`: runner embebido de migraciones Diesel (catálogo).
//! - `config`: carga de configuración desde .env.
//! - `schema`: tabla Diesel del catálogo de definiciones.

pub mod config;
pub mod error;
pub mod migrations;
pub mod pg;
pub mod schema;

pub use config::{init_dotenv, DbConfig};
pub use error::PersistenceError;
pub use pg::{build_dev_pool_from_env, build_pool, is_valid_database_name, ConnectionProvider, PgDocumentStore, PgPool, PoolProvider};
