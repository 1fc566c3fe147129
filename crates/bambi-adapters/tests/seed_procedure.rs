use bambi_adapters::catalog::{self, CARGOS, INVENTARIO_HISTORIAL, PLATOS_HISTORIAL, PRODUCTOS, SEDES};
use bambi_adapters::{check_references, needs_manual_reset, InitStep, Initializer, SeedClock};
use bambi_core::{CollectionSchema,
                 Document,
                 DocumentStore,
                 EnsureOutcome,
                 FieldKind,
                 FieldValue,
                 IdPolicy,
                 InMemoryStore,
                 IndexSpec,
                 ReplaceSummary,
                 StoreError,
                 ID_FIELD};
use chrono::{DateTime, TimeZone, Utc};

const DB: &str = "nutricion_hogar_bambi";

fn fixed() -> SeedClock {
    SeedClock::Fixed(Utc.with_ymd_and_hms(2025, 1, 28, 8, 0, 0).unwrap())
}

fn seeded() -> Initializer<InMemoryStore> {
    let mut init = Initializer::new(InMemoryStore::new(DB), fixed());
    init.run_all().unwrap();
    init
}

fn producto(id: &str, nombre: &str, sede: &str) -> Document {
    Document::new().with(ID_FIELD, id)
                   .with("nombre", nombre)
                   .with("categoria", "Granos")
                   .with("unidad", "kg")
                   .with("stockMinimo", 10)
                   .with("cantidadActual", 10)
                   .with("sedeId", sede)
}

/// Historial sin `_id` generado, en orden estable.
fn without_ids(mut docs: Vec<Document>) -> Vec<Document> {
    for d in docs.iter_mut() {
        d.remove(ID_FIELD);
    }
    docs.sort_by_key(|d| format!("{d:?}"));
    docs
}

#[test]
fn full_run_loads_every_seed_set() {
    let mut init = Initializer::new(InMemoryStore::new(DB), fixed());
    let mut lines = Vec::new();
    let summary = init.run_all_with(|r| lines.push(r.to_string())).unwrap();

    assert_eq!(summary.reports.len(), InitStep::ALL.len());
    assert_eq!(lines[1], format!("Sedes insertadas en DB {DB}"));
    let store = init.store();
    assert_eq!(store.count(SEDES).unwrap(), 3);
    assert_eq!(store.count(CARGOS).unwrap(), 5);
    assert_eq!(store.count(PRODUCTOS).unwrap(), 6);
    assert_eq!(store.count(INVENTARIO_HISTORIAL).unwrap(), 3);
    assert_eq!(store.count(PLATOS_HISTORIAL).unwrap(), 3);
    assert!(summary.inconsistencies.is_empty());
}

#[test]
fn schema_step_creates_collections_and_indexes_once() {
    let mut init = Initializer::new(InMemoryStore::new(DB), fixed());
    let first = init.run_step(InitStep::Schema).unwrap();
    assert_eq!(first.created, catalog::collections().len() + catalog::indexes().len());
    let second = init.run_step(InitStep::Schema).unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(init.store().index_names(PLATOS_HISTORIAL).unwrap(),
               ["cargoId_1_fecha_-1", "sedeId_1_fecha_-1", "tipoComida_1_fecha_-1"]);
}

#[test]
fn running_twice_yields_same_contents() {
    let mut init = seeded();
    let before: Vec<Vec<Document>> = [SEDES, CARGOS, PRODUCTOS].iter().map(|c| init.store().find_all(c).unwrap()).collect();
    let logs_before: Vec<Vec<Document>> = [INVENTARIO_HISTORIAL, PLATOS_HISTORIAL].iter()
                                                                                   .map(|c| without_ids(init.store().find_all(c).unwrap()))
                                                                                   .collect();

    let summary = init.run_all().unwrap();
    assert_eq!(summary.reports[3].removed, 6);
    assert_eq!(summary.reports[3].inserted, 6);

    let after: Vec<Vec<Document>> = [SEDES, CARGOS, PRODUCTOS].iter().map(|c| init.store().find_all(c).unwrap()).collect();
    let logs_after: Vec<Vec<Document>> = [INVENTARIO_HISTORIAL, PLATOS_HISTORIAL].iter()
                                                                                  .map(|c| without_ids(init.store().find_all(c).unwrap()))
                                                                                  .collect();
    assert_eq!(before, after);
    assert_eq!(logs_before, logs_after);
}

#[test]
fn product_step_resets_to_literal_seeds() {
    let mut init = seeded();
    init.store_mut().insert_many(PRODUCTOS, vec![producto("LENTEJAS", "Lentejas", "CASA_PRINCIPAL")]).unwrap();
    assert_eq!(init.store().count(PRODUCTOS).unwrap(), 7);

    let report = init.run_step(InitStep::Products).unwrap();
    assert_eq!((report.removed, report.inserted), (7, 6));
    let ids: Vec<String> = init.store().find_all(PRODUCTOS).unwrap().iter().filter_map(|d| d.id().map(str::to_string)).collect();
    assert_eq!(ids, ["ACEITE", "ARROZ", "AZUCAR", "FRIJOLES", "LECHE_POLVO", "PASTA"]);
}

#[test]
fn seeded_products_carry_derived_status_and_clock_time() {
    let init = seeded();
    let at: DateTime<Utc> = fixed().now();
    for doc in init.store().find_all(PRODUCTOS).unwrap() {
        let expected = match doc.id() {
            Some("PASTA") | Some("LECHE_POLVO") => "STOCK_BAJO",
            _ => "NORMAL",
        };
        assert_eq!(doc.get_str("estado"), Some(expected));
        assert_eq!(doc.get("creadoEn"), Some(&FieldValue::Timestamp(at)));
        assert_eq!(doc.get("actualizadoEn"), Some(&FieldValue::Timestamp(at)));
    }
}

#[test]
fn duplicate_product_name_in_same_site_is_rejected() {
    let mut init = seeded();
    let err = init.store_mut()
                  .insert_many(PRODUCTOS, vec![producto("ARROZ_2", "Arroz", "CASA_PRINCIPAL")])
                  .unwrap_err();
    match err {
        StoreError::DuplicateKey { collection, index, .. } => {
            assert_eq!(collection, PRODUCTOS);
            assert_eq!(index, "sedeId_1_nombre_1");
        }
        other => panic!("esperado DuplicateKey, recibido {other:?}"),
    }
}

#[test]
fn duplicate_site_code_and_role_name_are_rejected() {
    let mut init = seeded();
    let sede = Document::new().with(ID_FIELD, "CASA_NUEVA").with("nombre", "Casa Nueva").with("codigo", "CP").with("activa", true);
    assert!(init.store_mut().insert_many(SEDES, vec![sede]).unwrap_err().is_duplicate_key());

    let cargo = Document::new().with(ID_FIELD, "NINOS_2").with("nombre", "Niños");
    assert!(init.store_mut().insert_many(CARGOS, vec![cargo]).unwrap_err().is_duplicate_key());
}

#[test]
fn duplicate_literals_in_one_batch_fail_without_changes() {
    let mut init = seeded();
    let batch = vec![producto("LENTEJAS", "Lentejas", "CASA_ANGELES"), producto("LENTEJAS_B", "Lentejas", "CASA_ANGELES")];
    let err = init.store_mut().replace_all(PRODUCTOS, batch).unwrap_err();
    assert!(err.is_duplicate_key());
    assert_eq!(init.store().count(PRODUCTOS).unwrap(), 6);
}

#[test]
fn validator_rejects_missing_or_mistyped_minimum_stock() {
    let mut init = seeded();
    let mut missing = producto("MAIZ", "Maíz", "CASA_PRINCIPAL");
    missing.remove("stockMinimo");
    assert!(init.store_mut().insert_many(PRODUCTOS, vec![missing]).unwrap_err().is_validation());

    let wrong = producto("MAIZ", "Maíz", "CASA_PRINCIPAL").with("stockMinimo", "diez");
    assert!(init.store_mut().insert_many(PRODUCTOS, vec![wrong]).unwrap_err().is_validation());
    assert_eq!(init.store().count(PRODUCTOS).unwrap(), 6);
}

#[test]
fn seeded_references_all_resolve() {
    let init = seeded();
    let store = init.store();
    let site_ids: Vec<String> = store.find_all(SEDES).unwrap().iter().filter_map(|d| d.id().map(str::to_string)).collect();
    let role_ids: Vec<String> = store.find_all(CARGOS).unwrap().iter().filter_map(|d| d.id().map(str::to_string)).collect();
    let product_ids: Vec<String> = store.find_all(PRODUCTOS).unwrap().iter().filter_map(|d| d.id().map(str::to_string)).collect();
    let has = |ids: &[String], v: Option<&str>| v.is_some_and(|v| ids.iter().any(|i| i == v));

    for p in store.find_all(PRODUCTOS).unwrap() {
        assert!(has(&site_ids, p.get_str("sedeId")));
    }
    for m in store.find_all(INVENTARIO_HISTORIAL).unwrap() {
        assert!(has(&product_ids, m.get_str("productoId")));
        assert!(has(&site_ids, m.get_str("sedeId")));
        if m.get_str("tipo") == Some("transferencia") {
            assert!(has(&site_ids, m.get_str("sedeOrigenId")));
            assert!(has(&site_ids, m.get_str("sedeDestinoId")));
        }
    }
    for p in store.find_all(PLATOS_HISTORIAL).unwrap() {
        assert!(has(&site_ids, p.get_str("sedeId")));
        assert!(has(&role_ids, p.get_str("cargoId")));
    }
    assert!(check_references(store).unwrap().is_empty());
}

#[test]
fn dangling_site_reference_is_reported() {
    let mut init = seeded();
    init.store_mut().insert_many(PRODUCTOS, vec![producto("MAIZ", "Maíz", "CASA_X")]).unwrap();
    let found = init.verify().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].document_id, "MAIZ");
    assert_eq!(found[0].field, "sedeId");
    assert_eq!(found[0].missing, "CASA_X");
}

#[test]
fn conflicting_existing_collection_halts_at_schema() {
    let mut store = InMemoryStore::new(DB);
    let other = CollectionSchema::new(SEDES, IdPolicy::Assigned).required("nombre", FieldKind::String);
    assert_eq!(store.ensure_collection(&other).unwrap(), EnsureOutcome::Created);

    let mut init = Initializer::new(store, fixed());
    let err = init.run_all().unwrap_err();
    assert_eq!(err.step(), Some(InitStep::Schema));
    assert!(needs_manual_reset(&err));
}

/// Envuelve el backend en memoria y hace fallar la carga de una colección.
struct FailingOn {
    inner: InMemoryStore,
    collection: &'static str,
}

impl DocumentStore for FailingOn {
    fn database(&self) -> &str {
        self.inner.database()
    }
    fn ensure_collection(&mut self, schema: &CollectionSchema) -> Result<EnsureOutcome, StoreError> {
        self.inner.ensure_collection(schema)
    }
    fn ensure_index(&mut self, index: &IndexSpec) -> Result<EnsureOutcome, StoreError> {
        self.inner.ensure_index(index)
    }
    fn insert_many(&mut self, collection: &str, docs: Vec<Document>) -> Result<Vec<String>, StoreError> {
        self.inner.insert_many(collection, docs)
    }
    fn delete_all(&mut self, collection: &str) -> Result<u64, StoreError> {
        self.inner.delete_all(collection)
    }
    fn replace_all(&mut self, collection: &str, docs: Vec<Document>) -> Result<ReplaceSummary, StoreError> {
        if collection == self.collection {
            return Err(StoreError::Backend("conexión perdida".into()));
        }
        self.inner.replace_all(collection, docs)
    }
    fn count(&self, collection: &str) -> Result<u64, StoreError> {
        self.inner.count(collection)
    }
    fn find_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        self.inner.find_all(collection)
    }
    fn drop_database(&mut self) -> Result<(), StoreError> {
        self.inner.drop_database()
    }
}

#[test]
fn failing_step_stops_the_sequence() {
    let store = FailingOn { inner: InMemoryStore::new(DB), collection: PRODUCTOS };
    let mut init = Initializer::new(store, fixed());
    let mut done = Vec::new();
    let err = init.run_all_with(|r| done.push(r.step)).unwrap_err();

    assert_eq!(err.step(), Some(InitStep::Products));
    assert_eq!(done, [InitStep::Schema, InitStep::Sites, InitStep::Roles]);
    assert_eq!(init.store().count(SEDES).unwrap(), 3);
    assert_eq!(init.store().count(INVENTARIO_HISTORIAL).unwrap(), 0);
}
