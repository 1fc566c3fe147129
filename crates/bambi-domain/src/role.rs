use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{require_text, DomainError};
use crate::RoleId;

/// Cargo: grupo que recibe comida (niños, personal, visitas...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    id: RoleId,
    name: String,
    description: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl Role {
    pub fn new(id: RoleId, name: &str) -> Result<Self, DomainError> {
        require_text("nombre de cargo", name)?;
        Ok(Role { id, name: name.to_string(), description: None, created_at: None })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    pub fn id(&self) -> &RoleId { &self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn description(&self) -> Option<&str> { self.description.as_deref() }
    pub fn created_at(&self) -> Option<DateTime<Utc>> { self.created_at }
}
