//! Definiciones declarativas de colecciones e índices.
//!
//! Una `CollectionSchema` describe el validador estructural de un contenedor:
//! qué campos existen, cuáles son obligatorios, su tipo primitivo y si admiten
//! `null`. Un `IndexSpec` describe un índice (posiblemente único) sobre uno o
//! varios campos. Ambas se identifican por una huella (`fingerprint`) calculada
//! sobre su JSON canónico: dos definiciones con la misma huella son idénticas.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::StoreError;
use crate::hashing::fingerprint;

/// Tipo primitivo de un campo (nombres iguales a los `bsonType` del validador).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Int,
    Bool,
    #[serde(rename = "date")]
    Timestamp,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Int => "int",
            FieldKind::Bool => "bool",
            FieldKind::Timestamp => "date",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub nullable: bool,
}

/// Origen del `_id` de los documentos de una colección.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdPolicy {
    /// Código de texto asignado por quien inserta (`CASA_PRINCIPAL`).
    Assigned,
    /// UUID generado por el almacenamiento si el documento no trae `_id`.
    Generated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSchema {
    pub name: String,
    pub id_policy: IdPolicy,
    pub fields: Vec<FieldSpec>,
}

impl CollectionSchema {
    pub fn new(name: &str, id_policy: IdPolicy) -> Self {
        Self { name: name.to_string(), id_policy, fields: Vec::new() }
    }

    /// Campo obligatorio, no admite `null`.
    pub fn required(self, name: &str, kind: FieldKind) -> Self {
        self.push(name, kind, true, false)
    }

    /// Campo opcional que, si aparece, debe tener el tipo indicado.
    pub fn optional(self, name: &str, kind: FieldKind) -> Self {
        self.push(name, kind, false, false)
    }

    /// Campo opcional que admite `null` (`bsonType: [kind, 'null']`).
    pub fn nullable(self, name: &str, kind: FieldKind) -> Self {
        self.push(name, kind, false, true)
    }

    fn push(mut self, name: &str, kind: FieldKind, required: bool, nullable: bool) -> Self {
        self.fields.push(FieldSpec { name: name.to_string(), kind, required, nullable });
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }

    /// Verifica la coherencia interna (sin campos repetidos ni `_id` declarado).
    pub fn check(&self) -> Result<(), StoreError> {
        if self.name.trim().is_empty() {
            return Err(StoreError::InvalidDefinition("colección sin nombre".into()));
        }
        for (i, f) in self.fields.iter().enumerate() {
            if f.name == crate::ID_FIELD {
                return Err(StoreError::InvalidDefinition(format!("{}: `_id` no se declara como campo", self.name)));
            }
            if self.fields[..i].iter().any(|prev| prev.name == f.name) {
                return Err(StoreError::InvalidDefinition(format!("{}: campo repetido {}", self.name, f.name)));
            }
        }
        Ok(())
    }

    pub fn fingerprint(&self) -> Result<String, StoreError> {
        fingerprint(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexKey {
    pub field: String,
    pub order: SortOrder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    pub collection: String,
    pub keys: Vec<IndexKey>,
    pub unique: bool,
}

impl IndexSpec {
    pub fn on(collection: &str) -> Self {
        Self { collection: collection.to_string(), keys: Vec::new(), unique: false }
    }

    pub fn asc(mut self, field: &str) -> Self {
        self.keys.push(IndexKey { field: field.to_string(), order: SortOrder::Ascending });
        self
    }

    pub fn desc(mut self, field: &str) -> Self {
        self.keys.push(IndexKey { field: field.to_string(), order: SortOrder::Descending });
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Nombre derivado de las claves, igual que lo nombraría Mongo
    /// (`sedeId_1_fecha_-1`).
    pub fn name(&self) -> String {
        self.keys
            .iter()
            .map(|k| match k.order {
                SortOrder::Ascending => format!("{}_1", k.field),
                SortOrder::Descending => format!("{}_-1", k.field),
            })
            .collect::<Vec<_>>()
            .join("_")
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(|k| k.field.as_str())
    }

    /// Verifica que el índice tenga claves y que todas existan en `schema`.
    pub fn check_against(&self, schema: &CollectionSchema) -> Result<(), StoreError> {
        if self.keys.is_empty() {
            return Err(StoreError::InvalidDefinition(format!("índice sin claves en {}", self.collection)));
        }
        for field in self.fields() {
            if field != crate::ID_FIELD && schema.field(field).is_none() {
                return Err(StoreError::InvalidDefinition(format!("índice {} usa campo no declarado {field}", self.name())));
            }
        }
        Ok(())
    }

    pub fn fingerprint(&self) -> Result<String, StoreError> {
        fingerprint(self)
    }
}

/// Resultado de asegurar un contenedor o índice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    Created,
    /// Ya existía con una definición idéntica; no se hizo nada.
    AlreadyExists,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sedes() -> CollectionSchema {
        CollectionSchema::new("sedes", IdPolicy::Assigned).required("nombre", FieldKind::String)
                                                          .required("codigo", FieldKind::String)
                                                          .nullable("direccion", FieldKind::String)
    }

    #[test]
    fn index_name_follows_key_order() {
        let idx = IndexSpec::on("inventario_historial").asc("sedeId").desc("fecha");
        assert_eq!(idx.name(), "sedeId_1_fecha_-1");
    }

    #[test]
    fn fingerprint_changes_with_definition() {
        let a = sedes().fingerprint().unwrap();
        let b = sedes().fingerprint().unwrap();
        let c = sedes().optional("telefono", FieldKind::String).fingerprint().unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn unique_flag_changes_index_fingerprint() {
        let plain = IndexSpec::on("sedes").asc("codigo");
        let unique = plain.clone().unique();
        assert_eq!(plain.name(), unique.name());
        assert_ne!(plain.fingerprint().unwrap(), unique.fingerprint().unwrap());
    }

    #[test]
    fn index_on_undeclared_field_is_invalid() {
        let idx = IndexSpec::on("sedes").asc("telefono");
        assert!(matches!(idx.check_against(&sedes()), Err(StoreError::InvalidDefinition(_))));
    }

    #[test]
    fn repeated_field_is_invalid() {
        let schema = sedes().required("nombre", FieldKind::String);
        assert!(schema.check().is_err());
    }
}
