//! Identificadores tipados.
//!
//! Las referencias entre colecciones son códigos de texto sin integridad
//! referencial en el almacenamiento. Cada tipo de código tiene su propio
//! newtype para que el compilador no permita pasar un `RoleId` donde se
//! espera un `SiteId`; la verificación de que el código exista se hace en un
//! paso explícito aparte. Los registros de historial no tienen código: su
//! identidad la genera el almacenamiento.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{require_text, DomainError};

macro_rules! code_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Crea el código validando que no esté vacío.
            pub fn new(code: impl Into<String>) -> Result<Self, DomainError> {
                let code = code.into();
                require_text($label, &code)?;
                Ok(Self(code))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

code_id!(
    /// Código de sede asignado a mano (p. ej. `CASA_PRINCIPAL`).
    SiteId, "id de sede"
);
code_id!(
    /// Código de cargo (grupo que recibe comida, p. ej. `NINOS`).
    RoleId, "id de cargo"
);
code_id!(
    /// Código de producto de inventario (p. ej. `ARROZ`).
    ProductId, "id de producto"
);
