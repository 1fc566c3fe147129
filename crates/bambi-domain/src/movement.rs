use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::{ProductId, SiteId};

/// Sedes de origen y destino de una transferencia.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRoute {
    pub origin: SiteId,
    pub destination: SiteId,
}

/// Tipo de movimiento de inventario. Solo las transferencias llevan ruta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementKind {
    In,
    Out,
    Transfer(TransferRoute),
}

impl MovementKind {
    /// Nombre persistido en `inventario_historial.tipo`.
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::In => "entrada",
            MovementKind::Out => "salida",
            MovementKind::Transfer(_) => "transferencia",
        }
    }

    pub fn route(&self) -> Option<&TransferRoute> {
        match self {
            MovementKind::Transfer(route) => Some(route),
            _ => None,
        }
    }
}

/// Movimiento de inventario (entrada, salida o transferencia).
///
/// Es un hecho inmutable del historial: no hay setters ni operaciones de
/// modificación; el identificador lo asigna el almacenamiento al insertarlo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryMovement {
    date: DateTime<Utc>,
    kind: MovementKind,
    product_id: ProductId,
    site_id: SiteId,
    quantity: i32,
    reason: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl InventoryMovement {
    /// Crea un movimiento registrado por `site_id`.
    ///
    /// # Errores
    /// `DomainError::Validation` si la cantidad no es positiva o si una
    /// transferencia tiene el mismo origen y destino.
    pub fn new(date: DateTime<Utc>,
               kind: MovementKind,
               product_id: ProductId,
               site_id: SiteId,
               quantity: i32)
               -> Result<Self, DomainError> {
        if quantity <= 0 {
            return Err(DomainError::Validation(format!("la cantidad debe ser mayor a 0 (recibido {quantity})")));
        }
        if let MovementKind::Transfer(route) = &kind {
            if route.origin == route.destination {
                return Err(DomainError::Validation(format!("transferencia con origen y destino iguales: {}", route.origin)));
            }
        }
        Ok(InventoryMovement { date,
                               kind,
                               product_id,
                               site_id,
                               quantity,
                               reason: None,
                               created_at: None })
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    pub fn date(&self) -> DateTime<Utc> { self.date }
    pub fn kind(&self) -> &MovementKind { &self.kind }
    pub fn product_id(&self) -> &ProductId { &self.product_id }
    pub fn site_id(&self) -> &SiteId { &self.site_id }
    pub fn quantity(&self) -> i32 { self.quantity }
    pub fn reason(&self) -> Option<&str> { self.reason.as_deref() }
    pub fn created_at(&self) -> Option<DateTime<Utc>> { self.created_at }
}
