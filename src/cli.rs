//! Línea de comandos de `bambi-init`.

use bambi_adapters::InitStep;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "bambi-init")]
#[command(about = "Crea las colecciones de Hogar Bambi y carga los datos semilla")]
#[command(version)]
pub struct Cli {
    /// Base de datos destino (por defecto `nutricion_hogar_bambi`)
    #[arg(long, global = true, env = "BAMBI_DB_NAME")]
    pub db: Option<String>,

    /// Ejecutar contra un backend en memoria, sin tocar Postgres
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Todos los pasos en orden y luego la verificación de referencias
    All,
    /// Crear colecciones, validadores e índices
    Schema,
    /// Cargar sedes
    Sites,
    /// Cargar cargos
    Roles,
    /// Cargar productos
    Products,
    /// Cargar historial de inventario
    Inventory,
    /// Cargar historial de platos servidos
    Meals,
    /// Verificar referencias entre colecciones
    Verify,
    /// Eliminar todas las colecciones y definiciones de la base destino
    Drop {
        /// Confirmación explícita
        #[arg(long)]
        yes: bool,
    },
}

impl Command {
    /// Paso único que ejecuta el comando, si es uno de los pasos.
    pub fn step(&self) -> Option<InitStep> {
        match self {
            Command::Schema => Some(InitStep::Schema),
            Command::Sites => Some(InitStep::Sites),
            Command::Roles => Some(InitStep::Roles),
            Command::Products => Some(InitStep::Products),
            Command::Inventory => Some(InitStep::InventoryMovements),
            Command::Meals => Some(InitStep::ServedMeals),
            Command::All | Command::Verify | Command::Drop { .. } => None,
        }
    }
}
