//! Conjuntos semilla de referencia para desarrollo y demostración.
//!
//! Valores literales fijos: 3 sedes, 5 cargos, 6 productos (todos de
//! `CASA_PRINCIPAL`), 3 movimientos de inventario y 3 platos servidos. Solo
//! `now` (creación / actualización) varía entre corridas.

use bambi_domain::{DomainError,
                   InventoryMovement,
                   MealType,
                   MovementKind,
                   Product,
                   ProductId,
                   Role,
                   RoleId,
                   ServedMealRecord,
                   Site,
                   SiteId,
                   TransferRoute};
use chrono::{DateTime, TimeZone, Utc};

pub const CASA_PRINCIPAL: &str = "CASA_PRINCIPAL";
pub const CASA_ANGELES: &str = "CASA_ANGELES";
pub const CASA_ESPERANZA: &str = "CASA_ESPERANZA";

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> Result<DateTime<Utc>, DomainError> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0)
       .single()
       .ok_or_else(|| DomainError::Validation(format!("fecha inválida {y}-{mo}-{d} {h}:{mi}")))
}

/// Sedes (casas).
pub fn sites(now: DateTime<Utc>) -> Result<Vec<Site>, DomainError> {
    let rows = [(CASA_PRINCIPAL, "Casa Principal", "CP", "+58 000-0000000"),
                (CASA_ANGELES, "Casa Ángeles", "CA", "+58 000-0000001"),
                (CASA_ESPERANZA, "Casa Esperanza", "CE", "+58 000-0000002")];
    rows.into_iter()
        .map(|(id, name, code, phone)| -> Result<Site, DomainError> {
            Ok(Site::new(SiteId::new(id)?, name, code)?.with_address("Caracas, Venezuela")
                                                      .with_phone(phone)
                                                      .with_active(true)
                                                      .with_created_at(now))
        })
        .collect()
}

/// Cargos: quién recibe la comida.
pub fn roles(now: DateTime<Utc>) -> Result<Vec<Role>, DomainError> {
    let rows = [("NINOS", "Niños", "Niños y niñas atendidos en la sede"),
                ("PERSONAL", "Personal", "Personal que trabaja en la sede"),
                ("VISITAS", "Visitas", "Visitantes puntuales"),
                ("VOLUNTARIOS", "Voluntarios", "Voluntarios que apoyan en la sede"),
                ("TODOS", "Todos", "Cuando aplica a todos los grupos")];
    rows.into_iter()
        .map(|(id, name, description)| -> Result<Role, DomainError> {
            Ok(Role::new(RoleId::new(id)?, name)?.with_description(description).with_created_at(now))
        })
        .collect()
}

/// Productos de inventario de `CASA_PRINCIPAL`.
///
/// Con estos niveles PASTA y LECHE_POLVO quedan en `STOCK_BAJO`.
pub fn products(now: DateTime<Utc>) -> Result<Vec<Product>, DomainError> {
    let rows = [("ARROZ", "Arroz", "Granos", "kg", 30, 45),
                ("FRIJOLES", "Frijoles", "Granos", "kg", 20, 22),
                ("ACEITE", "Aceite", "Condimentos", "L", 10, 15),
                ("AZUCAR", "Azúcar", "Endulzantes", "kg", 15, 18),
                ("PASTA", "Pasta", "Granos", "kg", 20, 12),
                ("LECHE_POLVO", "Leche en Polvo", "Lácteos", "kg", 12, 8)];
    rows.into_iter()
        .map(|(id, name, category, unit, minimum, current)| -> Result<Product, DomainError> {
            Ok(Product::new(ProductId::new(id)?, name, category, unit, minimum, current, SiteId::new(CASA_PRINCIPAL)?)?.with_timestamps(now))
        })
        .collect()
}

/// Historial de movimientos de inventario.
pub fn inventory_movements(now: DateTime<Utc>) -> Result<Vec<InventoryMovement>, DomainError> {
    let principal = SiteId::new(CASA_PRINCIPAL)?;
    let route = TransferRoute { origin: principal.clone(), destination: SiteId::new(CASA_ANGELES)? };
    Ok(vec![InventoryMovement::new(at(2025, 1, 28, 10, 0)?, MovementKind::In, ProductId::new("ARROZ")?, principal.clone(), 20)?
                .with_reason("Compra mensual")
                .with_created_at(now),
            InventoryMovement::new(at(2025, 1, 28, 11, 0)?, MovementKind::Out, ProductId::new("FRIJOLES")?, principal.clone(), 5)?
                .with_reason("Preparación almuerzo")
                .with_created_at(now),
            // la sede que registra el movimiento es la de origen
            InventoryMovement::new(at(2025, 1, 27, 9, 30)?, MovementKind::Transfer(route), ProductId::new("ACEITE")?, principal, 3)?
                .with_reason("Préstamo a Casa Ángeles")
                .with_created_at(now),])
}

/// Historial de platos servidos.
pub fn served_meals(now: DateTime<Utc>) -> Result<Vec<ServedMealRecord>, DomainError> {
    let principal = SiteId::new(CASA_PRINCIPAL)?;
    Ok(vec![ServedMealRecord::new(at(2025, 1, 28, 7, 30)?, principal.clone(), MealType::Breakfast, RoleId::new("NINOS")?, "Panqueques", 25)?
                .with_ingredients("Harina, huevos, leche, azúcar")
                .with_observations("Buena aceptación general")
                .with_created_at(now),
            ServedMealRecord::new(at(2025, 1, 28, 12, 30)?, principal.clone(), MealType::Lunch, RoleId::new("PERSONAL")?, "Arroz con pollo", 15)?
                .with_ingredients("Arroz, pollo, vegetales")
                .with_observations("")
                .with_created_at(now),
            ServedMealRecord::new(at(2025, 1, 28, 15, 30)?, principal, MealType::MorningSnack, RoleId::new("NINOS")?, "Frutas variadas", 25)?
                .with_ingredients("Manzana, banana, papaya")
                .with_observations("Porciones suficientes")
                .with_created_at(now),])
}
