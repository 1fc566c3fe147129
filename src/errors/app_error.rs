use bambi_adapters::InitError;
use bambi_core::StoreError;
use bambi_persistence::PersistenceError;
use thiserror::Error;

/// Códigos de salida del binario.
pub const EXIT_OK: i32 = 0;
pub const EXIT_STEP_FAILED: i32 = 1;
pub const EXIT_CONFIG: i32 = 2;
pub const EXIT_INCONSISTENT: i32 = 3;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de configuración: {0}")]
    Config(String),
    #[error("Error de conexión: {0}")]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Init(#[from] InitError),
    #[error("Error de almacenamiento: {0}")]
    Store(#[from] StoreError),
    #[error("Se encontraron {0} referencias inconsistentes")]
    Inconsistent(usize),
    #[error("Error en IO: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Config(_) | AppError::Persistence(PersistenceError::Config(_)) => EXIT_CONFIG,
            AppError::Inconsistent(_) => EXIT_INCONSISTENT,
            _ => EXIT_STEP_FAILED,
        }
    }
}
