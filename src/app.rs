//! Ejecución de un comando de `bambi-init` contra el backend configurado.

use std::io::Write;

use bambi_adapters::{InitStep, Initializer, SeedClock};
use bambi_core::{DocumentStore, InMemoryStore};
use bambi_persistence::{build_pool, PgDocumentStore, PoolProvider};
use log::info;

use crate::cli::{Cli, Command};
use crate::config::{AppConfig, Backend};
use crate::errors::AppError;

/// Resuelve la configuración, construye el backend y ejecuta el comando.
/// Las líneas de confirmación se escriben en `out`.
pub fn run(cli: Cli, out: &mut dyn Write) -> Result<(), AppError> {
    if cli.command == (Command::Drop { yes: false }) {
        return Err(AppError::Config("drop elimina la base destino completa; confirme con --yes".into()));
    }
    let config = AppConfig::from_env(cli.db, cli.dry_run)?;
    match config.backend {
        Backend::InMemory => {
            info!("--dry-run: backend en memoria para DB {}", config.database);
            let mut init = Initializer::new(InMemoryStore::new(&config.database), SeedClock::System);
            // la memoria empieza vacía: los pasos sueltos necesitan las colecciones
            if !matches!(cli.command, Command::All | Command::Schema | Command::Drop { .. }) {
                init.run_step(InitStep::Schema)?;
            }
            execute(&mut init, &cli.command, out)
        }
        Backend::Postgres(db) => {
            let pool = build_pool(&db.url, db.min_connections, db.max_connections)?;
            let store = PgDocumentStore::new(PoolProvider { pool }, &config.database)?;
            execute(&mut Initializer::new(store, SeedClock::System), &cli.command, out)
        }
    }
}

/// Ejecuta `command` con un `Initializer` ya construido.
pub fn execute<S: DocumentStore>(init: &mut Initializer<S>, command: &Command, out: &mut dyn Write) -> Result<(), AppError> {
    match command {
        Command::All => {
            let mut write_err = None;
            let summary = init.run_all_with(|report| {
                                  if let Err(e) = writeln!(out, "{report}") {
                                      write_err.get_or_insert(e);
                                  }
                              })?;
            if let Some(e) = write_err {
                return Err(e.into());
            }
            for inc in &summary.inconsistencies {
                writeln!(out, "Advertencia: {inc}")?;
            }
            Ok(())
        }
        Command::Verify => {
            let found = init.verify()?;
            if found.is_empty() {
                writeln!(out, "Referencias verificadas en DB {}: sin inconsistencias", init.store().database())?;
                return Ok(());
            }
            for inc in &found {
                writeln!(out, "Inconsistencia: {inc}")?;
            }
            Err(AppError::Inconsistent(found.len()))
        }
        Command::Drop { yes } => {
            if !yes {
                return Err(AppError::Config("drop elimina la base destino completa; confirme con --yes".into()));
            }
            init.store_mut().drop_database()?;
            writeln!(out, "Base de datos {} eliminada", init.store().database())?;
            Ok(())
        }
        single => {
            if let Some(step) = single.step() {
                let report = init.run_step(step)?;
                writeln!(out, "{report}")?;
            }
            Ok(())
        }
    }
}
