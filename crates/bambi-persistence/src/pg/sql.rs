//! Traducción de definiciones y documentos a SQL de Postgres.
//!
//! Funciones puras: no tocan la conexión, así que se prueban sin base de
//! datos.

use bambi_core::{CollectionSchema, Document, FieldKind, FieldValue, IndexSpec, SortOrder, StoreError, ID_FIELD};
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::PersistenceError;

/// Nombre con que se reporta la unicidad de `_id` (igual que en memoria).
pub const PRIMARY_KEY_INDEX: &str = "_id_";

/// `true` si `name` sirve como nombre de base destino (schema de Postgres):
/// `[A-Za-z_][A-Za-z0-9_]*`, hasta 63 caracteres.
pub fn is_valid_database_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    name.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

pub fn qualified(database: &str, object: &str) -> String {
    format!("{}.{}", quote_ident(database), quote_ident(object))
}

fn column_type(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::String => "TEXT",
        FieldKind::Int => "INTEGER",
        FieldKind::Bool => "BOOLEAN",
        FieldKind::Timestamp => "TIMESTAMPTZ",
    }
}

/// `CREATE TABLE` con `_id` como clave primaria y una columna por campo.
/// Los campos requeridos son `NOT NULL`.
pub fn create_table_sql(database: &str, schema: &CollectionSchema) -> String {
    let mut columns = vec![format!("{} TEXT PRIMARY KEY", quote_ident(ID_FIELD))];
    for f in &schema.fields {
        let not_null = if f.required { " NOT NULL" } else { "" };
        columns.push(format!("{} {}{}", quote_ident(&f.name), column_type(f.kind), not_null));
    }
    format!("CREATE TABLE {} ({})", qualified(database, &schema.name), columns.join(", "))
}

/// Nombre del índice en Postgres: los índices viven en el schema de la base,
/// así que se prefijan con la colección.
pub fn pg_index_name(index: &IndexSpec) -> String {
    format!("{}__{}", index.collection, index.name())
}

pub fn create_index_sql(database: &str, index: &IndexSpec) -> String {
    let keys: Vec<String> = index.keys
                                 .iter()
                                 .map(|k| {
                                     let order = match k.order {
                                         SortOrder::Ascending => "ASC",
                                         SortOrder::Descending => "DESC",
                                     };
                                     format!("{} {order}", quote_ident(&k.field))
                                 })
                                 .collect();
    format!("CREATE {}INDEX {} ON {} ({})",
            if index.unique { "UNIQUE " } else { "" },
            quote_ident(&pg_index_name(index)),
            qualified(database, &index.collection),
            keys.join(", "))
}

/// `INSERT` con todas las columnas de la colección: `$1` es `_id` y luego un
/// parámetro por campo en el orden declarado.
pub fn insert_sql(database: &str, schema: &CollectionSchema) -> String {
    let names: Vec<String> = std::iter::once(ID_FIELD).chain(schema.fields.iter().map(|f| f.name.as_str()))
                                                      .map(quote_ident)
                                                      .collect();
    let params: Vec<String> = (1..=names.len()).map(|i| format!("${i}")).collect();
    format!("INSERT INTO {} ({}) VALUES ({})",
            qualified(database, &schema.name),
            names.join(", "),
            params.join(", "))
}

/// Lectura ordenada por `_id` (orden de bytes, igual que en memoria); cada
/// fila llega como un objeto JSON.
pub fn select_json_sql(database: &str, collection: &str) -> String {
    format!("SELECT row_to_json(t)::text AS doc FROM {} t ORDER BY t.{} COLLATE \"C\"",
            qualified(database, collection),
            quote_ident(ID_FIELD))
}

/// Columna tal como la describe `information_schema.columns`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveColumn {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
}

/// Clave de un índice tal como la describe `pg_index`, en orden.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveIndexKey {
    pub column: String,
    pub descending: bool,
}

fn information_schema_type(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::String => "text",
        FieldKind::Int => "integer",
        FieldKind::Bool => "boolean",
        FieldKind::Timestamp => "timestamp with time zone",
    }
}

/// Columnas que `create_table_sql` produce para `schema`, ordenadas por nombre.
pub fn expected_columns(schema: &CollectionSchema) -> Vec<LiveColumn> {
    let mut columns = vec![LiveColumn { name: ID_FIELD.to_string(),
                                        data_type: information_schema_type(FieldKind::String).to_string(),
                                        nullable: false }];
    columns.extend(schema.fields.iter().map(|f| LiveColumn { name: f.name.clone(),
                                                             data_type: information_schema_type(f.kind).to_string(),
                                                             nullable: !f.required }));
    columns.sort_by(|a, b| a.name.cmp(&b.name));
    columns
}

pub fn columns_sql() -> &'static str {
    "SELECT column_name::text AS name, data_type::text AS data_type, (is_nullable = 'YES') AS nullable \
     FROM information_schema.columns WHERE table_schema = $1 AND table_name = $2 ORDER BY column_name::text COLLATE \"C\""
}

pub fn index_keys_sql() -> &'static str {
    "SELECT i.indisunique AS is_unique, a.attname::text AS column_name, \
            (i.indoption[k.ord::int - 1]::int & 1) = 1 AS descending \
     FROM pg_index i \
     JOIN pg_class c ON c.oid = i.indexrelid \
     JOIN pg_namespace n ON n.oid = c.relnamespace \
     CROSS JOIN LATERAL unnest(i.indkey::int2[]) WITH ORDINALITY AS k(attnum, ord) \
     JOIN pg_attribute a ON a.attrelid = i.indrelid AND a.attnum = k.attnum \
     WHERE n.nspname = $1 AND c.relname = $2 \
     ORDER BY k.ord"
}

/// Diferencia entre la tabla viva y la declarada; `None` si coinciden.
/// `live` debe venir ordenada por nombre de columna.
pub fn table_drift(schema: &CollectionSchema, live: &[LiveColumn]) -> Option<String> {
    if live.is_empty() {
        return Some("la tabla registrada no existe".into());
    }
    let expected = expected_columns(schema);
    if expected == live {
        return None;
    }
    let describe = |cols: &[LiveColumn]| {
        cols.iter()
            .map(|c| format!("{} {}{}", c.name, c.data_type, if c.nullable { "" } else { " not null" }))
            .collect::<Vec<_>>()
            .join(", ")
    };
    Some(format!("columnas vivas [{}] distintas de las declaradas [{}]", describe(live), describe(&expected)))
}

/// Diferencia entre el índice vivo y el declarado; `None` si coinciden.
pub fn index_drift(index: &IndexSpec, live_unique: Option<bool>, live_keys: &[LiveIndexKey]) -> Option<String> {
    let Some(unique) = live_unique else {
        return Some("el índice registrado no existe".into());
    };
    if unique != index.unique {
        return Some(format!("índice vivo con unique={unique}, declarado unique={}", index.unique));
    }
    let expected: Vec<LiveIndexKey> = index.keys
                                           .iter()
                                           .map(|k| LiveIndexKey { column: k.field.clone(),
                                                                   descending: k.order == SortOrder::Descending })
                                           .collect();
    (expected != live_keys).then(|| format!("claves vivas {live_keys:?} distintas de las declaradas {expected:?}"))
}

/// Traduce el nombre de restricción que reporta Postgres al nombre de índice
/// del contrato (`sedeId_1_nombre_1`, `_id_`).
pub fn index_name_from_constraint(collection: &str, constraint: &str) -> String {
    if constraint == format!("{collection}_pkey") {
        return PRIMARY_KEY_INDEX.to_string();
    }
    constraint.strip_prefix(&format!("{collection}__")).unwrap_or(constraint).to_string()
}

/// Reconstruye un documento desde el JSON de una fila. Las columnas `NULL` se
/// omiten (un null almacenado equivale a un campo ausente).
pub fn decode_row(schema: &CollectionSchema, json: &str) -> Result<Document, PersistenceError> {
    let value: Value = serde_json::from_str(json).map_err(|e| PersistenceError::Unknown(format!("fila no es JSON: {e}")))?;
    let Value::Object(row) = value else {
        return Err(PersistenceError::Unknown(format!("fila inesperada en {}", schema.name)));
    };
    let mut doc = Document::new();
    if let Some(Value::String(id)) = row.get(ID_FIELD) {
        doc.insert(ID_FIELD, id.as_str());
    }
    for spec in &schema.fields {
        let Some(raw) = row.get(&spec.name).filter(|v| !v.is_null()) else { continue };
        let decoded = decode_value(spec.kind, raw).ok_or_else(|| {
                          PersistenceError::Store(StoreError::Backend(format!("columna {}.{} con valor inesperado {raw}",
                                                                              schema.name, spec.name)))
                      })?;
        doc.insert(&spec.name, decoded);
    }
    Ok(doc)
}

fn decode_value(kind: FieldKind, raw: &Value) -> Option<FieldValue> {
    match kind {
        FieldKind::String => raw.as_str().map(FieldValue::from),
        FieldKind::Int => raw.as_i64().and_then(|i| i32::try_from(i).ok()).map(FieldValue::Int),
        FieldKind::Bool => raw.as_bool().map(FieldValue::Bool),
        FieldKind::Timestamp => raw.as_str()
                                   .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                                   .map(|t| FieldValue::Timestamp(t.with_timezone(&Utc))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bambi_core::IdPolicy;
    use chrono::TimeZone;

    fn productos() -> CollectionSchema {
        CollectionSchema::new("productos", IdPolicy::Assigned).required("nombre", FieldKind::String)
                                                              .required("stockMinimo", FieldKind::Int)
                                                              .optional("estado", FieldKind::String)
                                                              .nullable("creadoEn", FieldKind::Timestamp)
    }

    #[test]
    fn database_names_are_plain_identifiers() {
        assert!(is_valid_database_name("nutricion_hogar_bambi"));
        assert!(is_valid_database_name("_tmp1"));
        assert!(!is_valid_database_name("1bambi"));
        assert!(!is_valid_database_name("hogar-bambi"));
        assert!(!is_valid_database_name(""));
        assert!(!is_valid_database_name(&"a".repeat(64)));
    }

    #[test]
    fn table_has_primary_key_and_not_null_required_columns() {
        assert_eq!(create_table_sql("bambi", &productos()),
                   "CREATE TABLE \"bambi\".\"productos\" (\"_id\" TEXT PRIMARY KEY, \"nombre\" TEXT NOT NULL, \
                    \"stockMinimo\" INTEGER NOT NULL, \"estado\" TEXT, \"creadoEn\" TIMESTAMPTZ)");
    }

    #[test]
    fn index_keeps_order_and_uniqueness() {
        let unique = IndexSpec::on("productos").asc("sedeId").asc("nombre").unique();
        assert_eq!(create_index_sql("bambi", &unique),
                   "CREATE UNIQUE INDEX \"productos__sedeId_1_nombre_1\" ON \"bambi\".\"productos\" (\"sedeId\" ASC, \"nombre\" ASC)");
        let recent = IndexSpec::on("platos_historial").asc("cargoId").desc("fecha");
        assert!(create_index_sql("bambi", &recent).ends_with("(\"cargoId\" ASC, \"fecha\" DESC)"));
    }

    #[test]
    fn insert_binds_every_column() {
        assert_eq!(insert_sql("bambi", &productos()),
                   "INSERT INTO \"bambi\".\"productos\" (\"_id\", \"nombre\", \"stockMinimo\", \"estado\", \"creadoEn\") \
                    VALUES ($1, $2, $3, $4, $5)");
    }

    #[test]
    fn live_table_matching_declaration_has_no_drift() {
        let live = expected_columns(&productos());
        assert_eq!(live.first().map(|c| c.name.as_str()), Some("_id"));
        assert_eq!(table_drift(&productos(), &live), None);
    }

    #[test]
    fn dropped_not_null_is_drift() {
        let mut live = expected_columns(&productos());
        for c in live.iter_mut().filter(|c| c.name == "stockMinimo") {
            c.nullable = true;
        }
        let drift = table_drift(&productos(), &live).unwrap();
        assert!(drift.contains("stockMinimo integer]"), "{drift}");
        assert!(table_drift(&productos(), &[]).is_some());
    }

    #[test]
    fn non_unique_or_reordered_index_is_drift() {
        let declared = IndexSpec::on("productos").asc("sedeId").asc("nombre").unique();
        let keys = vec![LiveIndexKey { column: "sedeId".into(), descending: false },
                        LiveIndexKey { column: "nombre".into(), descending: false }];
        assert_eq!(index_drift(&declared, Some(true), &keys), None);
        assert!(index_drift(&declared, Some(false), &keys).is_some());
        assert!(index_drift(&declared, None, &[]).is_some());
        let reversed: Vec<LiveIndexKey> = keys.iter().rev().cloned().collect();
        assert!(index_drift(&declared, Some(true), &reversed).is_some());
    }

    #[test]
    fn descending_key_must_stay_descending() {
        let declared = IndexSpec::on("platos_historial").asc("cargoId").desc("fecha");
        let mut keys = vec![LiveIndexKey { column: "cargoId".into(), descending: false },
                            LiveIndexKey { column: "fecha".into(), descending: true }];
        assert_eq!(index_drift(&declared, Some(false), &keys), None);
        keys[1].descending = false;
        assert!(index_drift(&declared, Some(false), &keys).is_some());
    }

    #[test]
    fn constraint_names_map_back_to_index_names() {
        assert_eq!(index_name_from_constraint("sedes", "sedes__codigo_1"), "codigo_1");
        assert_eq!(index_name_from_constraint("sedes", "sedes_pkey"), "_id_");
    }

    #[test]
    fn decodes_row_json_and_skips_nulls() {
        let json = r#"{"_id":"PASTA","nombre":"Pasta","stockMinimo":20,"estado":null,"creadoEn":"2025-01-28T08:00:00+00:00"}"#;
        let doc = decode_row(&productos(), json).unwrap();
        assert_eq!(doc.id(), Some("PASTA"));
        assert_eq!(doc.get("stockMinimo"), Some(&FieldValue::Int(20)));
        assert!(!doc.contains("estado"));
        assert_eq!(doc.get("creadoEn"),
                   Some(&FieldValue::Timestamp(Utc.with_ymd_and_hms(2025, 1, 28, 8, 0, 0).unwrap())));
    }

    #[test]
    fn mistyped_column_is_a_backend_error() {
        let json = r#"{"_id":"PASTA","nombre":"Pasta","stockMinimo":"veinte"}"#;
        assert!(decode_row(&productos(), json).is_err());
    }
}
