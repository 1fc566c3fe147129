//! bambi-adapters: capa de adaptación Dominio ↔ Core.
//!
//! Este crate provee:
//! - `catalog`: las cinco colecciones de Hogar Bambi y sus índices.
//! - `encoder`: empaquetado de entidades de dominio en `Document`.
//! - `seeds`: los conjuntos semilla fijos (sedes, cargos, productos e
//!   historiales de ejemplo).
//! - `steps`: el procedimiento de inicialización, paso a paso y completo.
//! - `integrity`: verificación explícita de referencias blandas.
//!
//! El core solo conoce documentos y definiciones; todo lo que sabe de sedes,
//! productos o platos vive aquí y en `bambi-domain`.

pub mod catalog;
pub mod clock;
pub mod encoder;
pub mod error;
pub mod integrity;
pub mod seeds;
pub mod steps;

pub use clock::SeedClock;
pub use error::InitError;
pub use integrity::{check_references, ReferenceInconsistency};
pub use steps::{needs_manual_reset, InitStep, Initializer, RunSummary, StepReport};
