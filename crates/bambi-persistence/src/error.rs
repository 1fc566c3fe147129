//! Errores de persistencia.
//! Mapea errores de Diesel / conexión a variantes semánticas y, en el borde
//! del `DocumentStore`, a `StoreError`.

use bambi_core::StoreError;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

use crate::pg::sql::{index_name_from_constraint, PRIMARY_KEY_INDEX};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("unique violation on {table:?} ({constraint:?}): {message}")]
    UniqueViolation {
        table: Option<String>,
        constraint: Option<String>,
        message: String,
    },
    #[error("check violation: {0}")]
    CheckViolation(String),
    #[error("not null violation: {0}")]
    NotNullViolation(String),
    #[error("not found")]
    NotFound,
    #[error("serialization conflict (retryable)")]
    SerializationConflict,
    #[error("transient IO / connection pool error: {0}")]
    TransientIo(String),
    #[error("configuration error: {0}")]
    Config(String),
    /// Error del contrato de almacenamiento detectado antes de llegar a la DB.
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("unknown database error: {0}")]
    Unknown(String),
}

impl From<DieselError> for PersistenceError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => Self::NotFound,
            DieselError::DatabaseError(kind, info) => match kind {
                DatabaseErrorKind::UniqueViolation => Self::UniqueViolation { table: info.table_name().map(str::to_string),
                                                                              constraint: info.constraint_name().map(str::to_string),
                                                                              message: info.message().to_string() },
                DatabaseErrorKind::CheckViolation => Self::CheckViolation(info.message().to_string()),
                DatabaseErrorKind::NotNullViolation => Self::NotNullViolation(info.message().to_string()),
                DatabaseErrorKind::SerializationFailure => Self::SerializationConflict,
                DatabaseErrorKind::ClosedConnection => Self::TransientIo(info.message().to_string()),
                other => Self::Unknown(format!("db error kind {:?}: {}", other, info.message())),
            },
            DieselError::DeserializationError(e) => Self::Unknown(format!("deser: {e}")),
            DieselError::SerializationError(e) => Self::Unknown(format!("ser: {e}")),
            DieselError::AlreadyInTransaction => Self::Unknown("already in transaction".into()),
            DieselError::RollbackErrorOnCommit { rollback_error, commit_error } => {
                Self::Unknown(format!("rollback={rollback_error}; commit={commit_error}"))
            }
            DieselError::BrokenTransactionManager => Self::TransientIo("broken transaction manager".into()),
            DieselError::QueryBuilderError(e) => Self::Unknown(format!("query builder: {e}")),
            DieselError::RollbackTransaction => Self::Unknown("rollback transaction".into()),
            DieselError::NotInTransaction => Self::Unknown("not in transaction".into()),
            other => Self::Unknown(format!("unhandled diesel error: {other:?}")),
        }
    }
}

impl From<PersistenceError> for StoreError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::Store(e) => e,
            PersistenceError::UniqueViolation { table, constraint, message } => {
                let collection = table.unwrap_or_else(|| "?".into());
                let index = constraint.map(|c| index_name_from_constraint(&collection, &c))
                                      .unwrap_or_else(|| PRIMARY_KEY_INDEX.to_string());
                StoreError::DuplicateKey { collection, index, detail: message }
            }
            other => StoreError::Backend(other.to_string()),
        }
    }
}
