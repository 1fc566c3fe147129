use bambi_adapters::catalog::PRODUCTOS;
use bambi_adapters::{Initializer, SeedClock};
use bambi_core::{Document, DocumentStore, InMemoryStore, ID_FIELD};
use chrono::{TimeZone, Utc};
use clap::Parser;
use hogar_bambi_init::app::{execute, run};
use hogar_bambi_init::cli::{Cli, Command};
use hogar_bambi_init::errors::app_error::{EXIT_CONFIG, EXIT_INCONSISTENT};
use hogar_bambi_init::errors::AppError;

fn lines(out: Vec<u8>) -> Vec<String> {
    String::from_utf8(out).unwrap().lines().map(str::to_string).collect()
}

fn seeded() -> Initializer<InMemoryStore> {
    let clock = SeedClock::Fixed(Utc.with_ymd_and_hms(2025, 1, 28, 8, 0, 0).unwrap());
    let mut init = Initializer::new(InMemoryStore::new("prueba_cli"), clock);
    init.run_all().unwrap();
    init
}

#[test]
fn parses_subcommands_and_global_flags() {
    let cli = Cli::try_parse_from(["bambi-init", "products", "--db", "otra_db", "--dry-run"]).unwrap();
    assert_eq!(cli.command, Command::Products);
    assert_eq!(cli.db.as_deref(), Some("otra_db"));
    assert!(cli.dry_run);

    let cli = Cli::try_parse_from(["bambi-init", "drop", "--yes"]).unwrap();
    assert_eq!(cli.command, Command::Drop { yes: true });
    assert!(Cli::try_parse_from(["bambi-init", "seed"]).is_err());
}

#[test]
fn dry_run_all_prints_one_line_per_step() {
    let cli = Cli::try_parse_from(["bambi-init", "--dry-run", "--db", "prueba_cli", "all"]).unwrap();
    let mut out = Vec::new();
    run(cli, &mut out).unwrap();
    assert_eq!(lines(out),
               ["Colecciones creadas y configuradas en DB prueba_cli",
                "Sedes insertadas en DB prueba_cli",
                "Cargos insertados en DB prueba_cli",
                "Productos insertados en DB prueba_cli",
                "Historial de inventario insertado en DB prueba_cli",
                "Historial de platos servidos insertado en DB prueba_cli"]);
}

#[test]
fn dry_run_single_step_prepares_collections() {
    let cli = Cli::try_parse_from(["bambi-init", "--dry-run", "--db", "prueba_cli", "meals"]).unwrap();
    let mut out = Vec::new();
    run(cli, &mut out).unwrap();
    assert_eq!(lines(out), ["Historial de platos servidos insertado en DB prueba_cli"]);
}

#[test]
fn invalid_database_name_is_a_config_error() {
    let cli = Cli::try_parse_from(["bambi-init", "--dry-run", "--db", "hogar-bambi", "all"]).unwrap();
    let err = run(cli, &mut Vec::new()).unwrap_err();
    assert_eq!(err.exit_code(), EXIT_CONFIG);
}

#[test]
fn drop_without_confirmation_is_refused() {
    let cli = Cli::try_parse_from(["bambi-init", "--dry-run", "drop"]).unwrap();
    let err = run(cli, &mut Vec::new()).unwrap_err();
    assert_eq!(err.exit_code(), EXIT_CONFIG);
}

#[test]
fn verify_reports_dangling_references_with_exit_three() {
    let mut init = seeded();
    let huerfano = Document::new().with(ID_FIELD, "MAIZ")
                                  .with("nombre", "Maíz")
                                  .with("categoria", "Granos")
                                  .with("unidad", "kg")
                                  .with("stockMinimo", 5)
                                  .with("cantidadActual", 5)
                                  .with("sedeId", "CASA_X");
    init.store_mut().insert_many(PRODUCTOS, vec![huerfano]).unwrap();

    let mut out = Vec::new();
    let err = execute(&mut init, &Command::Verify, &mut out).unwrap_err();
    assert!(matches!(err, AppError::Inconsistent(1)));
    assert_eq!(err.exit_code(), EXIT_INCONSISTENT);
    assert_eq!(lines(out), ["Inconsistencia: productos[MAIZ].sedeId apunta a 'CASA_X', que no existe"]);
}

#[test]
fn verify_on_clean_seed_succeeds() {
    let mut init = seeded();
    let mut out = Vec::new();
    execute(&mut init, &Command::Verify, &mut out).unwrap();
    assert_eq!(lines(out), ["Referencias verificadas en DB prueba_cli: sin inconsistencias"]);
}

#[test]
fn drop_removes_every_collection() {
    let mut init = seeded();
    let mut out = Vec::new();
    execute(&mut init, &Command::Drop { yes: true }, &mut out).unwrap();
    assert!(init.store().count(PRODUCTOS).is_err());
    assert_eq!(lines(out), ["Base de datos prueba_cli eliminada"]);
}
