use thiserror::Error;

/// Error del dominio: una entidad no cumple sus reglas de construcción.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Error de validación: {0}")]
    Validation(String),
}

/// Rechaza cadenas vacías (o solo espacios) en campos obligatorios.
pub(crate) fn require_text(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation(format!("{field} no puede estar vacío")));
    }
    Ok(())
}
