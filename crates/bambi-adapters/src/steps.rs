//! Procedimiento de inicialización
//!
//! Orden fijo: `Schema → Sites → Roles → Products → InventoryMovements →
//! ServedMeals`. Cada paso termina completo o falla y detiene la secuencia.
//! Los pasos de semillas vacían la colección y cargan el conjunto fijo como
//! una sola unidad (`DocumentStore::replace_all`), así que repetirlos deja el
//! mismo contenido.

use std::fmt;
use std::str::FromStr;

use bambi_core::{Document, DocumentStore, EnsureOutcome, StoreError};
use bambi_domain::DomainError;
use log::{debug, info, warn};

use crate::catalog;
use crate::clock::SeedClock;
use crate::encoder::{DomainDocumentEncoder, SimpleDocumentEncoder};
use crate::error::InitError;
use crate::integrity::{check_references, ReferenceInconsistency};
use crate::seeds;

/// Paso del procedimiento.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InitStep {
    Schema,
    Sites,
    Roles,
    Products,
    InventoryMovements,
    ServedMeals,
}

impl InitStep {
    /// Todos los pasos en el orden de ejecución.
    pub const ALL: [InitStep; 6] = [InitStep::Schema,
                                    InitStep::Sites,
                                    InitStep::Roles,
                                    InitStep::Products,
                                    InitStep::InventoryMovements,
                                    InitStep::ServedMeals];

    /// Nombre corto (el mismo que usa la línea de comandos).
    pub fn name(&self) -> &'static str {
        match self {
            InitStep::Schema => "schema",
            InitStep::Sites => "sites",
            InitStep::Roles => "roles",
            InitStep::Products => "products",
            InitStep::InventoryMovements => "inventory",
            InitStep::ServedMeals => "meals",
        }
    }

    /// Colección que carga el paso; `None` para `Schema`.
    pub fn collection(&self) -> Option<&'static str> {
        match self {
            InitStep::Schema => None,
            InitStep::Sites => Some(catalog::SEDES),
            InitStep::Roles => Some(catalog::CARGOS),
            InitStep::Products => Some(catalog::PRODUCTOS),
            InitStep::InventoryMovements => Some(catalog::INVENTARIO_HISTORIAL),
            InitStep::ServedMeals => Some(catalog::PLATOS_HISTORIAL),
        }
    }

    fn confirmation(&self) -> &'static str {
        match self {
            InitStep::Schema => "Colecciones creadas y configuradas",
            InitStep::Sites => "Sedes insertadas",
            InitStep::Roles => "Cargos insertados",
            InitStep::Products => "Productos insertados",
            InitStep::InventoryMovements => "Historial de inventario insertado",
            InitStep::ServedMeals => "Historial de platos servidos insertado",
        }
    }
}

impl fmt::Display for InitStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InitStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InitStep::ALL.into_iter()
                     .find(|step| step.name() == s)
                     .ok_or_else(|| format!("paso desconocido '{s}'"))
    }
}

/// Resultado de un paso completado.
///
/// `Display` produce la línea de confirmación para el operador, p. ej.
/// `Sedes insertadas en DB nutricion_hogar_bambi`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub step: InitStep,
    pub database: String,
    /// Documentos borrados antes de cargar (0 en `Schema`).
    pub removed: u64,
    /// Documentos cargados (0 en `Schema`).
    pub inserted: u64,
    /// Colecciones e índices creados por primera vez (solo `Schema`).
    pub created: usize,
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} en DB {}", self.step.confirmation(), self.database)
    }
}

/// Resultado de `run_all`: un reporte por paso más las referencias que no
/// resuelven.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub reports: Vec<StepReport>,
    pub inconsistencies: Vec<ReferenceInconsistency>,
}

/// Ejecuta los pasos contra un `DocumentStore`.
pub struct Initializer<S: DocumentStore> {
    store: S,
    clock: SeedClock,
    encoder: SimpleDocumentEncoder,
}

impl<S: DocumentStore> Initializer<S> {
    pub fn new(store: S, clock: SeedClock) -> Self {
        Self { store, clock, encoder: SimpleDocumentEncoder }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Ejecuta un solo paso.
    pub fn run_step(&mut self, step: InitStep) -> Result<StepReport, InitError> {
        debug!("step:start step={step} db={}", self.store.database());
        let report = match step.collection() {
            None => self.ensure_schema()?,
            Some(collection) => {
                let docs = self.seed_documents(step).map_err(|source| InitError::Domain { step, source })?;
                let summary = self.store
                                  .replace_all(collection, docs)
                                  .map_err(|source| InitError::Store { step, source })?;
                StepReport { step,
                             database: self.store.database().to_string(),
                             removed: summary.removed,
                             inserted: summary.inserted,
                             created: 0 }
            }
        };
        info!("{report} (borrados={} insertados={})", report.removed, report.inserted);
        Ok(report)
    }

    /// Ejecuta todos los pasos en orden y luego la verificación de
    /// referencias. Se detiene en el primer paso que falla.
    pub fn run_all(&mut self) -> Result<RunSummary, InitError> {
        self.run_all_with(|_| {})
    }

    /// Como `run_all`, invocando `on_step` tras cada paso completado.
    pub fn run_all_with<F>(&mut self, mut on_step: F) -> Result<RunSummary, InitError>
        where F: FnMut(&StepReport)
    {
        let mut summary = RunSummary::default();
        for step in InitStep::ALL {
            let report = self.run_step(step)?;
            on_step(&report);
            summary.reports.push(report);
        }
        summary.inconsistencies = self.verify()?;
        Ok(summary)
    }

    /// Verificación de referencias blandas. Solo informa: cada inconsistencia
    /// se registra con `warn!` y se devuelve al llamador.
    pub fn verify(&self) -> Result<Vec<ReferenceInconsistency>, InitError> {
        let found = check_references(&self.store).map_err(InitError::References)?;
        for inc in &found {
            warn!("referencia inconsistente: {inc}");
        }
        Ok(found)
    }

    fn ensure_schema(&mut self) -> Result<StepReport, InitError> {
        let step = InitStep::Schema;
        let mut created = 0usize;
        for schema in catalog::collections() {
            let outcome = self.store
                              .ensure_collection(&schema)
                              .map_err(|source| InitError::Store { step, source })?;
            created += count_created(outcome, &schema.name);
        }
        for index in catalog::indexes() {
            let outcome = self.store.ensure_index(&index).map_err(|source| InitError::Store { step, source })?;
            created += count_created(outcome, &format!("{}.{}", index.collection, index.name()));
        }
        Ok(StepReport { step, database: self.store.database().to_string(), removed: 0, inserted: 0, created })
    }

    fn seed_documents(&self, step: InitStep) -> Result<Vec<Document>, DomainError> {
        let now = self.clock.now();
        let enc = &self.encoder;
        let docs = match step {
            InitStep::Schema => Vec::new(),
            InitStep::Sites => seeds::sites(now)?.iter().map(|s| enc.encode_site(s)).collect(),
            InitStep::Roles => seeds::roles(now)?.iter().map(|r| enc.encode_role(r)).collect(),
            InitStep::Products => seeds::products(now)?.iter().map(|p| enc.encode_product(p)).collect(),
            InitStep::InventoryMovements => {
                seeds::inventory_movements(now)?.iter().map(|m| enc.encode_movement(m)).collect()
            }
            InitStep::ServedMeals => seeds::served_meals(now)?.iter().map(|m| enc.encode_meal(m)).collect(),
        };
        Ok(docs)
    }
}

fn count_created(outcome: EnsureOutcome, object: &str) -> usize {
    match outcome {
        EnsureOutcome::Created => {
            debug!("schema:created {object}");
            1
        }
        EnsureOutcome::AlreadyExists => {
            debug!("schema:exists {object}");
            0
        }
    }
}

/// Atajo para tests y la línea de comandos: `true` si el error es un conflicto
/// de definición que requiere `drop` manual.
pub fn needs_manual_reset(err: &InitError) -> bool {
    err.store_error().is_some_and(StoreError::is_schema_conflict)
}
