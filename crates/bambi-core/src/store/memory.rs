//! Backend en memoria.
//!
//! Paridad con el backend Postgres: mismas reglas de definición, validación y
//! unicidad. Se usa en tests y en el modo `--dry-run` de la CLI.

use log::debug;
use std::collections::{BTreeMap, HashMap};

use crate::document::{Document, FieldValue};
use crate::errors::StoreError;
use crate::schema::{CollectionSchema, EnsureOutcome, IndexSpec};
use crate::store::{DocumentStore, ReplaceSummary};
use crate::validate::prepare_batch;

struct StoredIndex {
    spec: IndexSpec,
    fingerprint: String,
}

struct MemCollection {
    schema: CollectionSchema,
    fingerprint: String,
    indexes: BTreeMap<String, StoredIndex>,
    docs: BTreeMap<String, Document>,
}

impl MemCollection {
    /// Aplica un lote sobre `base` (copia de trabajo) verificando `_id` y los
    /// índices únicos. Devuelve la copia resultante solo si todo el lote es
    /// válido.
    fn stage(&self,
             mut base: BTreeMap<String, Document>,
             batch: Vec<Document>)
             -> Result<(BTreeMap<String, Document>, Vec<String>), StoreError> {
        let mut ids = Vec::with_capacity(batch.len());
        for doc in batch {
            let id = doc.id()
                        .map(str::to_string)
                        .ok_or_else(|| StoreError::Backend("documento preparado sin _id".into()))?;
            if base.contains_key(&id) {
                return Err(StoreError::DuplicateKey { collection: self.schema.name.clone(),
                                                      index: "_id_".into(),
                                                      detail: format!("_id={id}") });
            }
            for stored in self.indexes.values().filter(|i| i.spec.unique) {
                let Some(key) = unique_key(&stored.spec, &doc) else { continue };
                if base.values().any(|other| unique_key(&stored.spec, other).as_ref() == Some(&key)) {
                    return Err(StoreError::DuplicateKey { collection: self.schema.name.clone(),
                                                          index: stored.spec.name(),
                                                          detail: describe_key(&stored.spec, &key) });
                }
            }
            base.insert(id.clone(), doc);
            ids.push(id);
        }
        Ok((base, ids))
    }
}

/// Tupla de valores de un índice único. `None` si algún campo falta: igual
/// que en Postgres, las claves con nulos no participan en la unicidad.
fn unique_key(spec: &IndexSpec, doc: &Document) -> Option<Vec<FieldValue>> {
    spec.fields().map(|f| doc.get(f).filter(|v| !v.is_null()).cloned()).collect()
}

fn describe_key(spec: &IndexSpec, key: &[FieldValue]) -> String {
    spec.fields()
        .zip(key)
        .map(|(f, v)| match v {
            FieldValue::String(s) => format!("{f}={s}"),
            other => format!("{f}={other:?}"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Almacenamiento en memoria de una base de datos destino.
pub struct InMemoryStore {
    database: String,
    collections: HashMap<String, MemCollection>,
}

impl InMemoryStore {
    pub fn new(database: &str) -> Self {
        Self { database: database.to_string(), collections: HashMap::new() }
    }

    fn collection(&self, name: &str) -> Result<&MemCollection, StoreError> {
        self.collections.get(name).ok_or_else(|| StoreError::UnknownCollection(name.to_string()))
    }

    fn collection_mut(&mut self, name: &str) -> Result<&mut MemCollection, StoreError> {
        self.collections.get_mut(name).ok_or_else(|| StoreError::UnknownCollection(name.to_string()))
    }

    /// Nombres de índices definidos sobre una colección.
    pub fn index_names(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        Ok(self.collection(collection)?.indexes.keys().cloned().collect())
    }
}

impl DocumentStore for InMemoryStore {
    fn database(&self) -> &str {
        &self.database
    }

    fn ensure_collection(&mut self, schema: &CollectionSchema) -> Result<EnsureOutcome, StoreError> {
        schema.check()?;
        let fingerprint = schema.fingerprint()?;
        if let Some(existing) = self.collections.get(&schema.name) {
            if existing.fingerprint == fingerprint {
                debug!("ensure_collection:noop db={} coll={}", self.database, schema.name);
                return Ok(EnsureOutcome::AlreadyExists);
            }
            return Err(StoreError::SchemaConflict { object: schema.name.clone(),
                                                    detail: format!("validador existente {} distinto del declarado {}",
                                                                    existing.fingerprint, fingerprint) });
        }
        self.collections.insert(schema.name.clone(),
                                MemCollection { schema: schema.clone(),
                                                fingerprint,
                                                indexes: BTreeMap::new(),
                                                docs: BTreeMap::new() });
        debug!("ensure_collection:created db={} coll={}", self.database, schema.name);
        Ok(EnsureOutcome::Created)
    }

    fn ensure_index(&mut self, index: &IndexSpec) -> Result<EnsureOutcome, StoreError> {
        let name = index.name();
        let fingerprint = index.fingerprint()?;
        let coll = self.collection_mut(&index.collection)?;
        index.check_against(&coll.schema)?;
        if let Some(existing) = coll.indexes.get(&name) {
            if existing.fingerprint == fingerprint {
                return Ok(EnsureOutcome::AlreadyExists);
            }
            return Err(StoreError::SchemaConflict { object: format!("{}.{}", index.collection, name),
                                                    detail: format!("índice existente (unique={}) distinto del declarado (unique={})",
                                                                    existing.spec.unique, index.unique) });
        }
        if index.unique {
            // Igual que al crear un índice único sobre datos existentes: si ya
            // hay duplicados, el índice no se puede crear.
            let probe = MemCollection { schema: coll.schema.clone(),
                                        fingerprint: String::new(),
                                        indexes: BTreeMap::from([(name.clone(),
                                                                  StoredIndex { spec: index.clone(),
                                                                                fingerprint: fingerprint.clone() })]),
                                        docs: BTreeMap::new() };
            probe.stage(BTreeMap::new(), coll.docs.values().cloned().collect())?;
        }
        coll.indexes.insert(name.clone(), StoredIndex { spec: index.clone(), fingerprint });
        debug!("ensure_index:created coll={} index={name}", index.collection);
        Ok(EnsureOutcome::Created)
    }

    fn insert_many(&mut self, collection: &str, docs: Vec<Document>) -> Result<Vec<String>, StoreError> {
        let coll = self.collection_mut(collection)?;
        let batch = prepare_batch(&coll.schema, docs)?;
        let (staged, ids) = coll.stage(coll.docs.clone(), batch)?;
        coll.docs = staged;
        debug!("insert_many coll={collection} inserted={}", ids.len());
        Ok(ids)
    }

    fn delete_all(&mut self, collection: &str) -> Result<u64, StoreError> {
        let coll = self.collection_mut(collection)?;
        let removed = coll.docs.len() as u64;
        coll.docs.clear();
        debug!("delete_all coll={collection} removed={removed}");
        Ok(removed)
    }

    fn replace_all(&mut self, collection: &str, docs: Vec<Document>) -> Result<ReplaceSummary, StoreError> {
        let coll = self.collection_mut(collection)?;
        let batch = prepare_batch(&coll.schema, docs)?;
        let (staged, ids) = coll.stage(BTreeMap::new(), batch)?;
        let summary = ReplaceSummary { removed: coll.docs.len() as u64, inserted: ids.len() as u64 };
        coll.docs = staged;
        debug!("replace_all coll={collection} removed={} inserted={}", summary.removed, summary.inserted);
        Ok(summary)
    }

    fn count(&self, collection: &str) -> Result<u64, StoreError> {
        Ok(self.collection(collection)?.docs.len() as u64)
    }

    fn find_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        Ok(self.collection(collection)?.docs.values().cloned().collect())
    }

    fn drop_database(&mut self) -> Result<(), StoreError> {
        self.collections.clear();
        Ok(())
    }
}
