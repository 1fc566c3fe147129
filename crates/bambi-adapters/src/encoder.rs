//! Encoder Dominio → Document
//!
//! Empaqueta entidades de `bambi-domain` en documentos de `bambi-core` con
//! los nombres de campo persistidos. Reglas:
//! - Los opcionales ausentes se omiten (no se escriben como `null`).
//! - `estado` de un producto se calcula aquí con `Product::status()`; es la
//!   única ruta por la que se persiste.
//! - Los historiales no llevan `_id`: lo genera el almacenamiento.

use bambi_core::{Document, ID_FIELD};
use bambi_domain::{InventoryMovement, Product, Role, ServedMealRecord, Site};

/// Contrato de empaquetado dominio → documento.
pub trait DomainDocumentEncoder {
    fn encode_site(&self, s: &Site) -> Document;
    fn encode_role(&self, r: &Role) -> Document;
    fn encode_product(&self, p: &Product) -> Document;
    fn encode_movement(&self, m: &InventoryMovement) -> Document;
    fn encode_meal(&self, m: &ServedMealRecord) -> Document;
}

#[derive(Clone, Default)]
pub struct SimpleDocumentEncoder;

impl DomainDocumentEncoder for SimpleDocumentEncoder {
    fn encode_site(&self, s: &Site) -> Document {
        Document::new().with(ID_FIELD, s.id().as_str())
                       .with("nombre", s.name())
                       .with("codigo", s.short_code())
                       .with_opt("direccion", s.address())
                       .with_opt("telefono", s.phone())
                       .with("activa", s.is_active())
                       .with_opt("creadoEn", s.created_at())
    }

    fn encode_role(&self, r: &Role) -> Document {
        Document::new().with(ID_FIELD, r.id().as_str())
                       .with("nombre", r.name())
                       .with_opt("descripcion", r.description())
                       .with_opt("creadoEn", r.created_at())
    }

    fn encode_product(&self, p: &Product) -> Document {
        Document::new().with(ID_FIELD, p.id().as_str())
                       .with("nombre", p.name())
                       .with("categoria", p.category())
                       .with("unidad", p.unit())
                       .with("stockMinimo", p.minimum_stock())
                       .with("cantidadActual", p.current_quantity())
                       .with("sedeId", p.site_id().as_str())
                       .with("estado", p.status().as_str())
                       .with_opt("creadoEn", p.created_at())
                       .with_opt("actualizadoEn", p.updated_at())
    }

    fn encode_movement(&self, m: &InventoryMovement) -> Document {
        let route = m.kind().route();
        Document::new().with("fecha", m.date())
                       .with("tipo", m.kind().as_str())
                       .with("productoId", m.product_id().as_str())
                       .with("sedeId", m.site_id().as_str())
                       .with("cantidad", m.quantity())
                       .with_opt("sedeOrigenId", route.map(|r| r.origin.as_str()))
                       .with_opt("sedeDestinoId", route.map(|r| r.destination.as_str()))
                       .with_opt("motivo", m.reason())
                       .with_opt("creadoEn", m.created_at())
    }

    fn encode_meal(&self, m: &ServedMealRecord) -> Document {
        Document::new().with("fecha", m.date())
                       .with("sedeId", m.site_id().as_str())
                       .with("tipoComida", m.meal_type().as_str())
                       .with("cargoId", m.role_id().as_str())
                       .with("nombrePlato", m.dish_name())
                       .with_opt("ingredientes", m.ingredients())
                       .with("cantidadPersonas", m.people_served())
                       .with_opt("observaciones", m.observations())
                       .with_opt("creadoEn", m.created_at())
    }
}
