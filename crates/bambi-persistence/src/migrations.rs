//! Runner de migraciones embebidas.
//!
//! Las migraciones viven en `migrations/` de este crate y solo crean el
//! catálogo de definiciones; las tablas de cada base destino se crean en
//! tiempo de ejecución desde `CollectionSchema`.

use crate::error::PersistenceError;
use diesel::pg::PgConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::debug;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

pub fn run_pending_migrations(conn: &mut PgConnection) -> Result<(), PersistenceError> {
    let applied = conn.run_pending_migrations(MIGRATIONS)
                      .map_err(|e| PersistenceError::Unknown(format!("migration error: {e}")))?;
    debug!("migrations:applied count={}", applied.len());
    Ok(())
}
