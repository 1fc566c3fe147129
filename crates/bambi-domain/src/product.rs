// product.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{require_text, DomainError};
use crate::{ProductId, SiteId};

/// Estado de stock de un producto.
///
/// No se almacena en `Product`: se deriva siempre de `cantidadActual` frente a
/// `stockMinimo` con [`StockStatus::for_levels`]. Cualquier código que
/// modifique cantidades debe recalcularlo con esa misma función.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StockStatus {
    #[serde(rename = "NORMAL")]
    Normal,
    #[serde(rename = "STOCK_BAJO")]
    LowStock,
}

impl StockStatus {
    /// `STOCK_BAJO` si la cantidad actual está por debajo del mínimo.
    pub fn for_levels(current_quantity: i32, minimum_stock: i32) -> Self {
        if current_quantity < minimum_stock {
            StockStatus::LowStock
        } else {
            StockStatus::Normal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::Normal => "NORMAL",
            StockStatus::LowStock => "STOCK_BAJO",
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StockStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NORMAL" => Ok(StockStatus::Normal),
            "STOCK_BAJO" => Ok(StockStatus::LowStock),
            other => Err(DomainError::Validation(format!("estado de stock desconocido: {other}"))),
        }
    }
}

/// Producto de inventario de una sede. El par (sede, nombre) es único.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    category: String,
    unit: String,
    minimum_stock: i32,
    current_quantity: i32,
    site_id: SiteId,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Crea un producto validando textos obligatorios y cantidades no negativas.
    ///
    /// # Errores
    /// `DomainError::Validation` si algún texto está vacío o si `minimum_stock`
    /// o `current_quantity` son negativos.
    pub fn new(id: ProductId,
               name: &str,
               category: &str,
               unit: &str,
               minimum_stock: i32,
               current_quantity: i32,
               site_id: SiteId)
               -> Result<Self, DomainError> {
        require_text("nombre de producto", name)?;
        require_text("categoría", category)?;
        require_text("unidad", unit)?;
        if minimum_stock < 0 {
            return Err(DomainError::Validation(format!("stockMinimo negativo en {id}: {minimum_stock}")));
        }
        if current_quantity < 0 {
            return Err(DomainError::Validation(format!("cantidadActual negativa en {id}: {current_quantity}")));
        }
        Ok(Product { id,
                     name: name.to_string(),
                     category: category.to_string(),
                     unit: unit.to_string(),
                     minimum_stock,
                     current_quantity,
                     site_id,
                     created_at: None,
                     updated_at: None })
    }

    /// Marca creación y última actualización con el mismo instante.
    pub fn with_timestamps(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self.updated_at = Some(at);
        self
    }

    pub fn status(&self) -> StockStatus {
        StockStatus::for_levels(self.current_quantity, self.minimum_stock)
    }

    pub fn id(&self) -> &ProductId { &self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn category(&self) -> &str { &self.category }
    pub fn unit(&self) -> &str { &self.unit }
    pub fn minimum_stock(&self) -> i32 { self.minimum_stock }
    pub fn current_quantity(&self) -> i32 { self.current_quantity }
    pub fn site_id(&self) -> &SiteId { &self.site_id }
    pub fn created_at(&self) -> Option<DateTime<Utc>> { self.created_at }
    pub fn updated_at(&self) -> Option<DateTime<Utc>> { self.updated_at }
}
