//! Documentos: mapas ordenados de nombre de campo a valor primitivo.
//!
//! Los tipos primitivos son los que admite el validador estructural
//! (`string`, `int`, `bool`, `date`) más `Null`. El orden de inserción de los
//! campos se conserva para que los documentos se lean igual que se escribieron.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::schema::FieldKind;

/// Nombre del campo identidad de todos los documentos.
pub const ID_FIELD: &str = "_id";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldValue {
    Null,
    String(String),
    Int(i32),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    /// Tipo primitivo del valor; `None` para `Null`.
    pub fn kind(&self) -> Option<FieldKind> {
        match self {
            FieldValue::Null => None,
            FieldValue::String(_) => Some(FieldKind::String),
            FieldValue::Int(_) => Some(FieldKind::Int),
            FieldValue::Bool(_) => Some(FieldKind::Bool),
            FieldValue::Timestamp(_) => Some(FieldKind::Timestamp),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            FieldValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Nombre del tipo para mensajes de error.
    pub fn kind_name(&self) -> &'static str {
        self.kind().map(|k| k.as_str()).unwrap_or("null")
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self { FieldValue::String(v.to_string()) }
}
impl From<String> for FieldValue {
    fn from(v: String) -> Self { FieldValue::String(v) }
}
impl From<i32> for FieldValue {
    fn from(v: i32) -> Self { FieldValue::Int(v) }
}
impl From<bool> for FieldValue {
    fn from(v: bool) -> Self { FieldValue::Bool(v) }
}
impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self { FieldValue::Timestamp(v) }
}
impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    fields: IndexMap<String, FieldValue>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Variante encadenable de `insert`.
    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserta solo si el valor existe (omite el campo en caso contrario).
    pub fn with_opt<T: Into<FieldValue>>(self, name: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.with(name, v),
            None => self,
        }
    }

    pub fn insert(&mut self, name: &str, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.fields.insert(name.to_string(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.shift_remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Identidad del documento (`_id`) si ya fue asignada.
    pub fn id(&self) -> Option<&str> {
        self.get_str(ID_FIELD)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Quita los campos con valor `Null`: un null almacenado equivale a un
    /// campo ausente en todos los backends.
    pub(crate) fn strip_nulls(&mut self) {
        self.fields.retain(|_, v| !v.is_null());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_opt_skips_missing_values() {
        let doc = Document::new().with("nombre", "Arroz").with_opt::<&str>("motivo", None);
        assert!(doc.contains("nombre"));
        assert!(!doc.contains("motivo"));
    }

    #[test]
    fn option_none_becomes_null() {
        let v: FieldValue = Option::<i32>::None.into();
        assert!(v.is_null());
        assert_eq!(v.kind_name(), "null");
    }

    #[test]
    fn preserves_insertion_order() {
        let doc = Document::new().with("_id", "ARROZ").with("nombre", "Arroz").with("cantidadActual", 45);
        let names: Vec<&str> = doc.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["_id", "nombre", "cantidadActual"]);
        assert_eq!(doc.id(), Some("ARROZ"));
    }
}
