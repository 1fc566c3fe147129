//! Configuración de la aplicación.
//! Combina variables de entorno (.env incluido) con los flags de la línea de
//! comandos. `BAMBI_DB_NAME` llega ya resuelto por clap como valor de `--db`.

use bambi_persistence::{is_valid_database_name, DbConfig};
use std::env;

use crate::errors::AppError;

pub const DEFAULT_DB_NAME: &str = "nutricion_hogar_bambi";

/// Dónde se ejecuta la inicialización.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Postgres(DbConfig),
    /// `--dry-run`: backend en memoria, nada se escribe.
    InMemory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Nombre de la base destino.
    pub database: String,
    pub backend: Backend,
}

impl AppConfig {
    /// Resuelve la configuración desde el entorno del proceso.
    pub fn from_env(db: Option<String>, dry_run: bool) -> Result<Self, AppError> {
        bambi_persistence::init_dotenv();
        Self::resolve(db, dry_run, |key| env::var(key).ok())
    }

    /// Resuelve con una fuente de variables arbitraria.
    pub fn resolve<F>(db: Option<String>, dry_run: bool, lookup: F) -> Result<Self, AppError>
        where F: Fn(&str) -> Option<String>
    {
        let database = db.unwrap_or_else(|| DEFAULT_DB_NAME.to_string());
        if !is_valid_database_name(&database) {
            return Err(AppError::Config(format!("nombre de base destino inválido '{database}' (se espera [A-Za-z_][A-Za-z0-9_]*)")));
        }
        let backend = if dry_run {
            Backend::InMemory
        } else {
            Backend::Postgres(DbConfig::from_lookup(lookup)?)
        };
        Ok(Self { database, backend })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_vars(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn dry_run_needs_no_database_url() {
        let cfg = AppConfig::resolve(None, true, no_vars).unwrap();
        assert_eq!(cfg.database, DEFAULT_DB_NAME);
        assert_eq!(cfg.backend, Backend::InMemory);
    }

    #[test]
    fn postgres_requires_database_url() {
        let err = AppConfig::resolve(None, false, no_vars).unwrap_err();
        assert_eq!(err.exit_code(), crate::errors::app_error::EXIT_CONFIG);
    }

    #[test]
    fn rejects_names_that_are_not_identifiers() {
        let err = AppConfig::resolve(Some("hogar bambi".into()), true, no_vars).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
