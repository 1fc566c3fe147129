//! Errores del contrato de almacenamiento.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum StoreError {
    /// Ya existe un contenedor o índice con el mismo nombre y otra definición.
    #[error("conflicto de esquema en '{object}': {detail}")]
    SchemaConflict { object: String, detail: String },
    /// Una inserción viola una restricción de unicidad.
    #[error("clave duplicada en '{collection}' (índice {index}): {detail}")]
    DuplicateKey { collection: String, index: String, detail: String },
    /// El validador estructural rechazó un documento.
    #[error("documento rechazado por el validador de '{collection}': {detail}")]
    Validation { collection: String, detail: String },
    #[error("definición inválida: {0}")]
    InvalidDefinition(String),
    #[error("colección desconocida: {0}")]
    UnknownCollection(String),
    #[error("error del backend: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_schema_conflict(&self) -> bool {
        matches!(self, StoreError::SchemaConflict { .. })
    }

    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, StoreError::DuplicateKey { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_key_message_names_index() {
        let err = StoreError::DuplicateKey { collection: "sedes".into(),
                                             index: "codigo_1".into(),
                                             detail: "codigo=CP".into() };
        assert_eq!(err.to_string(), "clave duplicada en 'sedes' (índice codigo_1): codigo=CP");
        assert!(err.is_duplicate_key());
        assert!(!err.is_schema_conflict());
    }
}
