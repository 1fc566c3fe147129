use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{require_text, DomainError};
use crate::{RoleId, SiteId};

/// Momento del día en que se sirvió el plato.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MealType {
    #[serde(rename = "DESAYUNO")]
    Breakfast,
    #[serde(rename = "MERIENDA_MATUTINA")]
    MorningSnack,
    #[serde(rename = "ALMUERZO")]
    Lunch,
    #[serde(rename = "MERIENDA_VESPERTINA")]
    AfternoonSnack,
    #[serde(rename = "CENA")]
    Dinner,
}

impl MealType {
    pub const ALL: [MealType; 5] = [MealType::Breakfast,
                                    MealType::MorningSnack,
                                    MealType::Lunch,
                                    MealType::AfternoonSnack,
                                    MealType::Dinner];

    /// Nombre persistido en `platos_historial.tipoComida`.
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "DESAYUNO",
            MealType::MorningSnack => "MERIENDA_MATUTINA",
            MealType::Lunch => "ALMUERZO",
            MealType::AfternoonSnack => "MERIENDA_VESPERTINA",
            MealType::Dinner => "CENA",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MealType::ALL.into_iter()
                     .find(|m| m.as_str() == s)
                     .ok_or_else(|| DomainError::Validation(format!("tipo de comida desconocido: {s}")))
    }
}

/// Registro de un plato servido (sección "Platos Servidos"). Inmutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServedMealRecord {
    date: DateTime<Utc>,
    site_id: SiteId,
    meal_type: MealType,
    role_id: RoleId,
    dish_name: String,
    people_served: i32,
    ingredients: Option<String>,
    observations: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl ServedMealRecord {
    /// # Errores
    /// `DomainError::Validation` si el nombre del plato está vacío o si
    /// `people_served` no es positivo.
    pub fn new(date: DateTime<Utc>,
               site_id: SiteId,
               meal_type: MealType,
               role_id: RoleId,
               dish_name: &str,
               people_served: i32)
               -> Result<Self, DomainError> {
        require_text("nombre del plato", dish_name)?;
        if people_served <= 0 {
            return Err(DomainError::Validation(format!("la cantidad de personas debe ser mayor a 0 (recibido {people_served})")));
        }
        Ok(ServedMealRecord { date,
                              site_id,
                              meal_type,
                              role_id,
                              dish_name: dish_name.to_string(),
                              people_served,
                              ingredients: None,
                              observations: None,
                              created_at: None })
    }

    pub fn with_ingredients(mut self, ingredients: impl Into<String>) -> Self {
        self.ingredients = Some(ingredients.into());
        self
    }

    pub fn with_observations(mut self, observations: impl Into<String>) -> Self {
        self.observations = Some(observations.into());
        self
    }

    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    pub fn date(&self) -> DateTime<Utc> { self.date }
    pub fn site_id(&self) -> &SiteId { &self.site_id }
    pub fn meal_type(&self) -> MealType { self.meal_type }
    pub fn role_id(&self) -> &RoleId { &self.role_id }
    pub fn dish_name(&self) -> &str { &self.dish_name }
    pub fn people_served(&self) -> i32 { self.people_served }
    pub fn ingredients(&self) -> Option<&str> { self.ingredients.as_deref() }
    pub fn observations(&self) -> Option<&str> { self.observations.as_deref() }
    pub fn created_at(&self) -> Option<DateTime<Utc>> { self.created_at }
}
