use std::process;

use anyhow::Context;
use bambi_adapters::needs_manual_reset;
use clap::Parser;
use hogar_bambi_init::app;
use hogar_bambi_init::cli::Cli;
use hogar_bambi_init::errors::app_error::{EXIT_OK, EXIT_STEP_FAILED};
use hogar_bambi_init::errors::AppError;

fn main() {
    // .env antes de parsear: clap lee BAMBI_DB_NAME del entorno
    bambi_persistence::init_dotenv();
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let code = match run(cli) {
        Ok(()) => EXIT_OK,
        Err(e) => {
            eprintln!("Error: {e:#}");
            let app_err = e.downcast_ref::<AppError>();
            if let Some(AppError::Init(init_err)) = app_err {
                if needs_manual_reset(init_err) {
                    eprintln!("La definición existente difiere de la declarada: ejecute `bambi-init drop --yes` y vuelva a inicializar.");
                }
            }
            app_err.map(AppError::exit_code).unwrap_or(EXIT_STEP_FAILED)
        }
    };
    process::exit(code);
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    app::run(cli, &mut out).context("la inicialización no se completó")
}
