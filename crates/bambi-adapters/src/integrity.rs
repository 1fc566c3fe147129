//! Verificación de referencias blandas.
//!
//! El almacenamiento no impone las referencias entre colecciones (son códigos
//! de texto). Esta pasada lee los documentos y lista las que no resuelven.

use std::collections::BTreeSet;
use std::fmt;

use bambi_core::{DocumentStore, StoreError, ID_FIELD};

use crate::catalog::{CARGOS, INVENTARIO_HISTORIAL, PLATOS_HISTORIAL, PRODUCTOS, SEDES};

/// Referencia que apunta a una identidad inexistente.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceInconsistency {
    pub collection: String,
    pub document_id: String,
    pub field: String,
    pub missing: String,
}

impl fmt::Display for ReferenceInconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f,
               "{}[{}].{} apunta a '{}', que no existe",
               self.collection, self.document_id, self.field, self.missing)
    }
}

// (colección, campo, colección destino)
const RULES: &[(&str, &str, &str)] = &[(PRODUCTOS, "sedeId", SEDES),
                                       (INVENTARIO_HISTORIAL, "productoId", PRODUCTOS),
                                       (INVENTARIO_HISTORIAL, "sedeId", SEDES),
                                       (INVENTARIO_HISTORIAL, "sedeOrigenId", SEDES),
                                       (INVENTARIO_HISTORIAL, "sedeDestinoId", SEDES),
                                       (PLATOS_HISTORIAL, "sedeId", SEDES),
                                       (PLATOS_HISTORIAL, "cargoId", CARGOS)];

/// Revisa `sedeId`, `productoId`, `cargoId`, `sedeOrigenId` y `sedeDestinoId`
/// contra las identidades existentes.
///
/// Los campos opcionales ausentes no cuentan como inconsistencia. El orden
/// del resultado es estable: por regla y luego por `_id`.
pub fn check_references<S>(store: &S) -> Result<Vec<ReferenceInconsistency>, StoreError>
    where S: DocumentStore + ?Sized
{
    let sites = identities(store, SEDES)?;
    let roles = identities(store, CARGOS)?;
    let products = identities(store, PRODUCTOS)?;
    let target = |name: &str| match name {
        SEDES => &sites,
        CARGOS => &roles,
        _ => &products,
    };

    let mut found = Vec::new();
    for &(collection, field, to) in RULES {
        let known = target(to);
        for doc in store.find_all(collection)? {
            let Some(value) = doc.get_str(field) else { continue };
            if !known.contains(value) {
                found.push(ReferenceInconsistency { collection: collection.to_string(),
                                                    document_id: doc.id().unwrap_or_default().to_string(),
                                                    field: field.to_string(),
                                                    missing: value.to_string() });
            }
        }
    }
    Ok(found)
}

fn identities<S>(store: &S, collection: &str) -> Result<BTreeSet<String>, StoreError>
    where S: DocumentStore + ?Sized
{
    Ok(store.find_all(collection)?.iter().filter_map(|d| d.get_str(ID_FIELD).map(str::to_string)).collect())
}
