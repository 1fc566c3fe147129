// bambi-domain: entidades de Hogar Bambi (sedes, cargos, productos e historiales)
pub mod error;
pub mod ids;
pub mod meal;
pub mod movement;
pub mod product;
pub mod role;
pub mod site;

pub use error::DomainError;
pub use ids::{ProductId, RoleId, SiteId};
pub use meal::{MealType, ServedMealRecord};
pub use movement::{InventoryMovement, MovementKind, TransferRoute};
pub use product::{Product, StockStatus};
pub use role::Role;
pub use site::Site;
