#![allow(dead_code)]

use bambi_persistence::config::DbConfig;
use bambi_persistence::pg::{build_pool, PgDocumentStore, PgPool, PoolProvider};
use once_cell::sync::Lazy;

pub static TEST_POOL: Lazy<Option<PgPool>> = Lazy::new(|| {
    if std::env::var("DATABASE_URL").is_err() {
        return None;
    }
    let cfg = DbConfig::from_env().ok()?;
    match build_pool(&cfg.url, 1, 2) {
        Ok(p) => Some(p),
        Err(e) => {
            eprintln!("No se pudo construir pool de test: {e}");
            None
        }
    }
});

pub fn with_pool<F, R>(f: F) -> Option<R>
    where F: FnOnce(&PgPool) -> R
{
    TEST_POOL.as_ref().map(f)
}

/// Store sobre una base destino nueva y única por test.
pub fn fresh_store(pool: &PgPool) -> PgDocumentStore<PoolProvider> {
    let name = format!("bambi_test_{}", uuid::Uuid::new_v4().simple());
    PgDocumentStore::new(PoolProvider { pool: pool.clone() }, &name).expect("nombre válido")
}
