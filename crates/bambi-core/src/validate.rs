//! Validador estructural compartido.
//!
//! Equivale al `$jsonSchema` de cada contenedor: campos obligatorios
//! presentes, tipos primitivos correctos, `null` solo donde se admite y
//! ningún campo fuera de la definición. Todos los backends lo ejecutan antes
//! de escribir, así que un documento inválido se rechaza igual en memoria que
//! en Postgres.

use uuid::Uuid;

use crate::document::{Document, FieldValue, ID_FIELD};
use crate::errors::StoreError;
use crate::schema::{CollectionSchema, IdPolicy};

fn rejected(schema: &CollectionSchema, detail: String) -> StoreError {
    StoreError::Validation { collection: schema.name.clone(), detail }
}

/// Valida un documento contra la definición de su colección.
pub fn validate_document(schema: &CollectionSchema, doc: &Document) -> Result<(), StoreError> {
    match doc.get(ID_FIELD) {
        Some(FieldValue::String(id)) if !id.is_empty() => {}
        Some(other) => {
            return Err(rejected(schema, format!("_id debe ser string no vacío, recibido {}", other.kind_name())));
        }
        None if schema.id_policy == IdPolicy::Assigned => {
            return Err(rejected(schema, "falta _id (código asignado)".into()));
        }
        None => {}
    }

    for spec in &schema.fields {
        match doc.get(&spec.name) {
            None if spec.required => {
                return Err(rejected(schema, format!("falta el campo requerido {}", spec.name)));
            }
            None => {}
            Some(FieldValue::Null) if spec.nullable => {}
            Some(value) => {
                if value.kind() != Some(spec.kind) {
                    return Err(rejected(schema,
                                        format!("{} debe ser de tipo {}, recibido {}", spec.name, spec.kind, value.kind_name())));
                }
            }
        }
    }

    if let Some((name, _)) = doc.iter().find(|(name, _)| *name != ID_FIELD && schema.field(name).is_none()) {
        return Err(rejected(schema, format!("campo no declarado {name}")));
    }
    Ok(())
}

/// Valida un lote completo y lo deja listo para escribir: asigna `_id` a las
/// colecciones con identidad generada y quita los campos `null`.
///
/// Si un solo documento es inválido se rechaza el lote entero.
pub fn prepare_batch(schema: &CollectionSchema, docs: Vec<Document>) -> Result<Vec<Document>, StoreError> {
    docs.into_iter()
        .map(|mut doc| {
            validate_document(schema, &doc)?;
            if doc.id().is_none() {
                doc.insert(ID_FIELD, Uuid::new_v4().to_string());
            }
            doc.strip_nulls();
            Ok(doc)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldKind;
    use chrono::Utc;

    fn productos() -> CollectionSchema {
        CollectionSchema::new("productos", IdPolicy::Assigned).required("nombre", FieldKind::String)
                                                              .required("stockMinimo", FieldKind::Int)
                                                              .optional("estado", FieldKind::String)
                                                              .nullable("creadoEn", FieldKind::Timestamp)
    }

    fn historial() -> CollectionSchema {
        CollectionSchema::new("inventario_historial", IdPolicy::Generated).required("fecha", FieldKind::Timestamp)
                                                                          .nullable("motivo", FieldKind::String)
    }

    fn arroz() -> Document {
        Document::new().with("_id", "ARROZ").with("nombre", "Arroz").with("stockMinimo", 30)
    }

    #[test]
    fn accepts_valid_document() {
        assert!(validate_document(&productos(), &arroz()).is_ok());
    }

    #[test]
    fn rejects_missing_required_field() {
        let mut doc = arroz();
        doc.remove("stockMinimo");
        let err = validate_document(&productos(), &doc).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("stockMinimo"));
    }

    #[test]
    fn rejects_wrong_kind() {
        let doc = arroz().with("stockMinimo", "treinta");
        assert!(validate_document(&productos(), &doc).unwrap_err().is_validation());
    }

    #[test]
    fn null_only_where_nullable() {
        assert!(validate_document(&productos(), &arroz().with("creadoEn", FieldValue::Null)).is_ok());
        assert!(validate_document(&productos(), &arroz().with("estado", FieldValue::Null)).is_err());
        assert!(validate_document(&productos(), &arroz().with("stockMinimo", FieldValue::Null)).is_err());
    }

    #[test]
    fn rejects_undeclared_field() {
        let doc = arroz().with("ingredientesDetalle", "x");
        assert!(validate_document(&productos(), &doc).is_err());
    }

    #[test]
    fn assigned_identity_is_mandatory() {
        let mut doc = arroz();
        doc.remove("_id");
        assert!(validate_document(&productos(), &doc).is_err());
    }

    #[test]
    fn prepare_assigns_generated_ids_and_strips_nulls() {
        let docs = vec![Document::new().with("fecha", Utc::now()).with("motivo", FieldValue::Null)];
        let prepared = prepare_batch(&historial(), docs).unwrap();
        assert!(prepared[0].id().is_some());
        assert!(!prepared[0].contains("motivo"));
    }

    #[test]
    fn one_invalid_document_rejects_batch() {
        let docs = vec![Document::new().with("fecha", Utc::now()), Document::new().with("motivo", "sin fecha")];
        assert!(prepare_batch(&historial(), docs).is_err());
    }
}
