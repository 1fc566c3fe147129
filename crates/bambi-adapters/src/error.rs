use bambi_core::StoreError;
use bambi_domain::DomainError;
use thiserror::Error;

use crate::steps::InitStep;

/// Error del procedimiento de inicialización.
///
/// Los errores de paso nombran siempre el paso que detuvo la secuencia.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("paso '{step}' falló: {source}")]
    Store {
        step: InitStep,
        #[source]
        source: StoreError,
    },
    #[error("paso '{step}' no pudo construir las semillas: {source}")]
    Domain {
        step: InitStep,
        #[source]
        source: DomainError,
    },
    /// La verificación de referencias no pudo leer las colecciones.
    #[error("verificación de referencias falló: {0}")]
    References(#[source] StoreError),
}

impl InitError {
    /// Paso que falló; `None` si el error vino de la verificación de
    /// referencias.
    pub fn step(&self) -> Option<InitStep> {
        match self {
            InitError::Store { step, .. } | InitError::Domain { step, .. } => Some(*step),
            InitError::References(_) => None,
        }
    }

    /// Error de almacenamiento subyacente, si lo hay.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            InitError::Store { source, .. } | InitError::References(source) => Some(source),
            InitError::Domain { .. } => None,
        }
    }
}
