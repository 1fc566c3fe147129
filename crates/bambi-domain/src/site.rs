use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{require_text, DomainError};
use crate::SiteId;

/// Casa / sede de Hogar Bambi. Cada sede mantiene su propio inventario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    id: SiteId,
    name: String,
    short_code: String,
    address: Option<String>,
    phone: Option<String>,
    active: bool,
    created_at: Option<DateTime<Utc>>,
}

impl Site {
    /// Crea una sede activa sin dirección ni teléfono.
    pub fn new(id: SiteId, name: &str, short_code: &str) -> Result<Self, DomainError> {
        require_text("nombre de sede", name)?;
        require_text("código de sede", short_code)?;
        Ok(Site { id,
                  name: name.to_string(),
                  short_code: short_code.to_string(),
                  address: None,
                  phone: None,
                  active: true,
                  created_at: None })
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    pub fn id(&self) -> &SiteId { &self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn short_code(&self) -> &str { &self.short_code }
    pub fn address(&self) -> Option<&str> { self.address.as_deref() }
    pub fn phone(&self) -> Option<&str> { self.phone.as_deref() }
    pub fn is_active(&self) -> bool { self.active }
    pub fn created_at(&self) -> Option<DateTime<Utc>> { self.created_at }
}
