//! Esquema Diesel del catálogo (escrito a mano, igual a la migración).

diesel::table! {
    bambi_esquema_catalogo (base_datos, tipo, nombre) {
        base_datos -> Text,
        tipo -> Text,
        nombre -> Text,
        definicion -> Jsonb,
        huella -> Text,
        creado_en -> Timestamptz,
    }
}
