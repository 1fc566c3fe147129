//! Catálogo de colecciones ("tablas") de la app de nutrición.
//!
//! Los nombres de colecciones y campos son el contrato persistido del que
//! dependen otras aplicaciones; no se renombran.

use bambi_core::{CollectionSchema, FieldKind, IdPolicy, IndexSpec};

pub const SEDES: &str = "sedes";
pub const CARGOS: &str = "cargos";
pub const PRODUCTOS: &str = "productos";
pub const INVENTARIO_HISTORIAL: &str = "inventario_historial";
pub const PLATOS_HISTORIAL: &str = "platos_historial";

/// Cada casa / sede de Hogar Bambi.
pub fn sedes() -> CollectionSchema {
    CollectionSchema::new(SEDES, IdPolicy::Assigned).required("nombre", FieldKind::String)
                                                    .required("codigo", FieldKind::String)
                                                    .nullable("direccion", FieldKind::String)
                                                    .nullable("telefono", FieldKind::String)
                                                    .required("activa", FieldKind::Bool)
                                                    .nullable("creadoEn", FieldKind::Timestamp)
}

/// Grupos que reciben comida: niños, personal, visitas...
pub fn cargos() -> CollectionSchema {
    CollectionSchema::new(CARGOS, IdPolicy::Assigned).required("nombre", FieldKind::String)
                                                     .nullable("descripcion", FieldKind::String)
                                                     .nullable("creadoEn", FieldKind::Timestamp)
}

/// Inventario por sede (no por despensa interna).
pub fn productos() -> CollectionSchema {
    CollectionSchema::new(PRODUCTOS, IdPolicy::Assigned).required("nombre", FieldKind::String)
                                                        .required("categoria", FieldKind::String)
                                                        .required("unidad", FieldKind::String)
                                                        .required("stockMinimo", FieldKind::Int)
                                                        .required("cantidadActual", FieldKind::Int)
                                                        .required("sedeId", FieldKind::String)
                                                        .optional("estado", FieldKind::String)
                                                        .nullable("creadoEn", FieldKind::Timestamp)
                                                        .nullable("actualizadoEn", FieldKind::Timestamp)
}

/// Movimientos de entrada / salida / transferencia de productos.
pub fn inventario_historial() -> CollectionSchema {
    CollectionSchema::new(INVENTARIO_HISTORIAL, IdPolicy::Generated).required("fecha", FieldKind::Timestamp)
                                                                    .required("tipo", FieldKind::String)
                                                                    .required("productoId", FieldKind::String)
                                                                    .required("sedeId", FieldKind::String)
                                                                    .required("cantidad", FieldKind::Int)
                                                                    .nullable("sedeOrigenId", FieldKind::String)
                                                                    .nullable("sedeDestinoId", FieldKind::String)
                                                                    .nullable("motivo", FieldKind::String)
                                                                    .nullable("creadoEn", FieldKind::Timestamp)
}

/// Registros de la sección "Platos Servidos".
pub fn platos_historial() -> CollectionSchema {
    CollectionSchema::new(PLATOS_HISTORIAL, IdPolicy::Generated).required("fecha", FieldKind::Timestamp)
                                                                .required("sedeId", FieldKind::String)
                                                                .required("tipoComida", FieldKind::String)
                                                                .required("cargoId", FieldKind::String)
                                                                .required("nombrePlato", FieldKind::String)
                                                                .nullable("ingredientes", FieldKind::String)
                                                                .required("cantidadPersonas", FieldKind::Int)
                                                                .nullable("observaciones", FieldKind::String)
                                                                .nullable("creadoEn", FieldKind::Timestamp)
}

/// Las cinco colecciones en orden de dependencia.
pub fn collections() -> Vec<CollectionSchema> {
    vec![sedes(), cargos(), productos(), inventario_historial(), platos_historial()]
}

/// Índices únicos y secundarios (consultas recientes primero por sede,
/// producto, cargo y tipo de comida).
pub fn indexes() -> Vec<IndexSpec> {
    vec![IndexSpec::on(SEDES).asc("codigo").unique(),
         IndexSpec::on(CARGOS).asc("nombre").unique(),
         IndexSpec::on(PRODUCTOS).asc("sedeId").asc("nombre").unique(),
         IndexSpec::on(INVENTARIO_HISTORIAL).asc("sedeId").desc("fecha"),
         IndexSpec::on(INVENTARIO_HISTORIAL).asc("productoId").desc("fecha"),
         IndexSpec::on(PLATOS_HISTORIAL).asc("sedeId").desc("fecha"),
         IndexSpec::on(PLATOS_HISTORIAL).asc("cargoId").desc("fecha"),
         IndexSpec::on(PLATOS_HISTORIAL).asc("tipoComida").desc("fecha"),]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_index_targets_declared_fields() {
        let schemas = collections();
        for idx in indexes() {
            let schema = schemas.iter().find(|s| s.name == idx.collection).expect("colección del índice");
            idx.check_against(schema).unwrap();
        }
    }

    #[test]
    fn all_definitions_are_consistent() {
        for schema in collections() {
            schema.check().unwrap();
        }
    }

    #[test]
    fn product_requires_minimum_stock() {
        let schema = productos();
        let required: Vec<&str> = schema.required_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(required, ["nombre", "categoria", "unidad", "stockMinimo", "cantidadActual", "sedeId"]);
    }

    #[test]
    fn unique_indexes_match_data_model() {
        let unique: Vec<(String, String)> =
            indexes().into_iter().filter(|i| i.unique).map(|i| (i.collection.clone(), i.name())).collect();
        assert_eq!(unique,
                   [(SEDES.to_string(), "codigo_1".to_string()),
                    (CARGOS.to_string(), "nombre_1".to_string()),
                    (PRODUCTOS.to_string(), "sedeId_1_nombre_1".to_string())]);
    }
}
