use bambi_core::validate::prepare_batch;
use bambi_core::{CollectionSchema,
                 Document,
                 DocumentStore,
                 EnsureOutcome,
                 FieldKind,
                 FieldValue,
                 IndexSpec,
                 ReplaceSummary,
                 StoreError};
use diesel::connection::SimpleConnection;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Bool, Integer, Nullable, Text, Timestamptz};
use log::debug;
use serde_json::Value;

use super::sql::{self, is_valid_database_name, quote_ident, LiveColumn, LiveIndexKey};
use super::{with_retry, ConnectionProvider};
use crate::error::PersistenceError;
use crate::schema::bambi_esquema_catalogo as catalog;

const KIND_COLLECTION: &str = "coleccion";
const KIND_INDEX: &str = "indice";

/// Fila de alta en el catálogo de definiciones.
#[derive(Insertable, Debug)]
#[diesel(table_name = catalog)]
struct NewCatalogRow<'a> {
    base_datos: &'a str,
    tipo: &'a str,
    nombre: &'a str,
    definicion: &'a Value,
    huella: &'a str,
}

#[derive(QueryableByName, Debug)]
struct Presence {
    #[diesel(sql_type = Bool)]
    present: bool,
}

#[derive(QueryableByName, Debug)]
struct Counted {
    #[diesel(sql_type = BigInt)]
    n: i64,
}

#[derive(QueryableByName, Debug)]
struct ColumnRow {
    #[diesel(sql_type = Text)]
    name: String,
    #[diesel(sql_type = Text)]
    data_type: String,
    #[diesel(sql_type = Bool)]
    nullable: bool,
}

#[derive(QueryableByName, Debug)]
struct IndexKeyRow {
    #[diesel(sql_type = Bool)]
    is_unique: bool,
    #[diesel(sql_type = Text)]
    column_name: String,
    #[diesel(sql_type = Bool)]
    descending: bool,
}

#[derive(QueryableByName, Debug)]
struct JsonRow {
    #[diesel(sql_type = Text)]
    doc: String,
}

/// `DocumentStore` sobre Postgres.
///
/// La base destino es un schema de Postgres con el mismo nombre; se crea al
/// asegurar la primera colección.
pub struct PgDocumentStore<P: ConnectionProvider> {
    provider: P,
    database: String,
}

impl<P: ConnectionProvider> PgDocumentStore<P> {
    /// Crea el store. `database` debe ser un identificador simple
    /// (`[A-Za-z_][A-Za-z0-9_]*`).
    pub fn new(provider: P, database: &str) -> Result<Self, PersistenceError> {
        if !is_valid_database_name(database) {
            return Err(PersistenceError::Config(format!("nombre de base destino inválido '{database}'")));
        }
        Ok(Self { provider, database: database.to_string() })
    }

    /// Corre `work` dentro de una transacción `read_write`, con reintento de
    /// errores transitorios.
    fn transaction<T, F>(&self, mut work: F) -> Result<T, StoreError>
        where F: FnMut(&mut PgConnection) -> Result<T, PersistenceError>
    {
        with_retry(|| {
            let mut conn = self.provider.connection()?;
            conn.build_transaction().read_write().run(|tx| work(tx))
        }).map_err(StoreError::from)
    }

    /// Huella registrada de una definición, si existe.
    fn registered(&self, tx: &mut PgConnection, kind: &str, name: &str) -> Result<Option<String>, PersistenceError> {
        Ok(catalog::table.filter(catalog::base_datos.eq(&self.database))
                         .filter(catalog::tipo.eq(kind))
                         .filter(catalog::nombre.eq(name))
                         .select(catalog::huella)
                         .first::<String>(tx)
                         .optional()?)
    }

    fn register(&self, tx: &mut PgConnection, kind: &str, name: &str, definition: &Value, fingerprint: &str) -> Result<(), PersistenceError> {
        diesel::insert_into(catalog::table).values(&NewCatalogRow { base_datos: &self.database,
                                                                   tipo: kind,
                                                                   nombre: name,
                                                                   definicion: definition,
                                                                   huella: fingerprint })
                                           .execute(tx)?;
        Ok(())
    }

    /// Definición registrada de una colección; `UnknownCollection` si no existe.
    fn load_schema(&self, tx: &mut PgConnection, collection: &str) -> Result<CollectionSchema, PersistenceError> {
        let definition = catalog::table.filter(catalog::base_datos.eq(&self.database))
                                       .filter(catalog::tipo.eq(KIND_COLLECTION))
                                       .filter(catalog::nombre.eq(collection))
                                       .select(catalog::definicion)
                                       .first::<Value>(tx)
                                       .optional()?
                                       .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;
        serde_json::from_value(definition).map_err(|e| PersistenceError::Unknown(format!("definición de {collection} ilegible: {e}")))
    }

    fn relation_exists(&self, tx: &mut PgConnection, object: &str) -> Result<bool, PersistenceError> {
        let found: Presence = diesel::sql_query("SELECT to_regclass($1) IS NOT NULL AS present")
            .bind::<Text, _>(sql::qualified(&self.database, object))
            .get_result(tx)?;
        Ok(found.present)
    }

    /// Compara la tabla viva con la definición registrada: una tabla alterada
    /// fuera de la herramienta es un `SchemaConflict`.
    fn check_live_table(&self, tx: &mut PgConnection, schema: &CollectionSchema) -> Result<(), PersistenceError> {
        let rows: Vec<ColumnRow> = diesel::sql_query(sql::columns_sql()).bind::<Text, _>(&self.database)
                                                                        .bind::<Text, _>(&schema.name)
                                                                        .load(tx)?;
        let live: Vec<LiveColumn> = rows.into_iter()
                                        .map(|r| LiveColumn { name: r.name, data_type: r.data_type, nullable: r.nullable })
                                        .collect();
        match sql::table_drift(schema, &live) {
            None => Ok(()),
            Some(detail) => Err(StoreError::SchemaConflict { object: schema.name.clone(), detail }.into()),
        }
    }

    fn check_live_index(&self, tx: &mut PgConnection, index: &IndexSpec, catalog_name: &str) -> Result<(), PersistenceError> {
        let rows: Vec<IndexKeyRow> = diesel::sql_query(sql::index_keys_sql()).bind::<Text, _>(&self.database)
                                                                             .bind::<Text, _>(sql::pg_index_name(index))
                                                                             .load(tx)?;
        let unique = rows.first().map(|r| r.is_unique);
        let keys: Vec<LiveIndexKey> = rows.into_iter()
                                          .map(|r| LiveIndexKey { column: r.column_name, descending: r.descending })
                                          .collect();
        match sql::index_drift(index, unique, &keys) {
            None => Ok(()),
            Some(detail) => Err(StoreError::SchemaConflict { object: catalog_name.to_string(), detail }.into()),
        }
    }

    fn insert_documents(&self, tx: &mut PgConnection, schema: &CollectionSchema, docs: &[Document]) -> Result<Vec<String>, PersistenceError> {
        let statement = sql::insert_sql(&self.database, schema);
        let mut ids = Vec::with_capacity(docs.len());
        for doc in docs {
            let id = doc.id()
                        .map(str::to_string)
                        .ok_or_else(|| StoreError::Backend("documento preparado sin _id".into()))?;
            let mut query = diesel::sql_query(statement.as_str()).into_boxed::<Pg>().bind::<Text, _>(id.clone());
            for spec in &schema.fields {
                let value = doc.get(&spec.name);
                query = match spec.kind {
                    FieldKind::String => query.bind::<Nullable<Text>, _>(value.and_then(FieldValue::as_str).map(str::to_string)),
                    FieldKind::Int => query.bind::<Nullable<Integer>, _>(value.and_then(FieldValue::as_int)),
                    FieldKind::Bool => query.bind::<Nullable<Bool>, _>(value.and_then(FieldValue::as_bool)),
                    FieldKind::Timestamp => query.bind::<Nullable<Timestamptz>, _>(value.and_then(FieldValue::as_timestamp)),
                };
            }
            query.execute(tx)?;
            ids.push(id);
        }
        Ok(ids)
    }

    fn delete_rows(&self, tx: &mut PgConnection, collection: &str) -> Result<u64, PersistenceError> {
        let removed = diesel::sql_query(format!("DELETE FROM {}", sql::qualified(&self.database, collection))).execute(tx)?;
        Ok(removed as u64)
    }
}

impl<P: ConnectionProvider> DocumentStore for PgDocumentStore<P> {
    fn database(&self) -> &str {
        &self.database
    }

    fn ensure_collection(&mut self, schema: &CollectionSchema) -> Result<EnsureOutcome, StoreError> {
        schema.check()?;
        let fingerprint = schema.fingerprint()?;
        let definition = serde_json::to_value(schema).map_err(|e| StoreError::InvalidDefinition(format!("serialización: {e}")))?;
        debug!("ensure_collection:start db={} coll={}", self.database, schema.name);
        self.transaction(|tx| {
                match self.registered(tx, KIND_COLLECTION, &schema.name)? {
                    Some(existing) if existing == fingerprint => {
                        self.check_live_table(tx, schema)?;
                        return Ok(EnsureOutcome::AlreadyExists);
                    }
                    Some(existing) => {
                        return Err(StoreError::SchemaConflict { object: schema.name.clone(),
                                                                detail: format!("validador existente {existing} distinto del declarado {fingerprint}") }.into())
                    }
                    None => {}
                }
                tx.batch_execute(&format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(&self.database)))?;
                if self.relation_exists(tx, &schema.name)? {
                    return Err(StoreError::SchemaConflict { object: schema.name.clone(),
                                                            detail: "la tabla existe sin definición registrada".into() }.into());
                }
                tx.batch_execute(&sql::create_table_sql(&self.database, schema))?;
                self.register(tx, KIND_COLLECTION, &schema.name, &definition, &fingerprint)?;
                Ok(EnsureOutcome::Created)
            })
            .inspect(|outcome| debug!("ensure_collection:done db={} coll={} outcome={outcome:?}", self.database, schema.name))
    }

    fn ensure_index(&mut self, index: &IndexSpec) -> Result<EnsureOutcome, StoreError> {
        let fingerprint = index.fingerprint()?;
        let definition = serde_json::to_value(index).map_err(|e| StoreError::InvalidDefinition(format!("serialización: {e}")))?;
        let catalog_name = format!("{}.{}", index.collection, index.name());
        debug!("ensure_index:start db={} index={catalog_name}", self.database);
        self.transaction(|tx| {
                let schema = self.load_schema(tx, &index.collection)?;
                index.check_against(&schema)?;
                match self.registered(tx, KIND_INDEX, &catalog_name)? {
                    Some(existing) if existing == fingerprint => {
                        self.check_live_index(tx, index, &catalog_name)?;
                        return Ok(EnsureOutcome::AlreadyExists);
                    }
                    Some(_) => {
                        return Err(StoreError::SchemaConflict { object: catalog_name.clone(),
                                                                detail: format!("índice existente distinto del declarado (unique={})", index.unique) }.into())
                    }
                    None => {}
                }
                if self.relation_exists(tx, &sql::pg_index_name(index))? {
                    return Err(StoreError::SchemaConflict { object: catalog_name.clone(),
                                                            detail: "el índice existe sin definición registrada".into() }.into());
                }
                tx.batch_execute(&sql::create_index_sql(&self.database, index))?;
                self.register(tx, KIND_INDEX, &catalog_name, &definition, &fingerprint)?;
                Ok(EnsureOutcome::Created)
            })
            .inspect(|outcome| debug!("ensure_index:done db={} index={catalog_name} outcome={outcome:?}", self.database))
    }

    fn insert_many(&mut self, collection: &str, docs: Vec<Document>) -> Result<Vec<String>, StoreError> {
        debug!("insert_many:start db={} coll={collection} docs={}", self.database, docs.len());
        self.transaction(|tx| {
                let schema = self.load_schema(tx, collection)?;
                let batch = prepare_batch(&schema, docs.clone())?;
                self.insert_documents(tx, &schema, &batch)
            })
            .inspect(|ids| debug!("insert_many:done coll={collection} inserted={}", ids.len()))
    }

    fn delete_all(&mut self, collection: &str) -> Result<u64, StoreError> {
        self.transaction(|tx| {
                self.load_schema(tx, collection)?;
                self.delete_rows(tx, collection)
            })
            .inspect(|removed| debug!("delete_all coll={collection} removed={removed}"))
    }

    fn replace_all(&mut self, collection: &str, docs: Vec<Document>) -> Result<ReplaceSummary, StoreError> {
        debug!("replace_all:start db={} coll={collection} docs={}", self.database, docs.len());
        self.transaction(|tx| {
                let schema = self.load_schema(tx, collection)?;
                let batch = prepare_batch(&schema, docs.clone())?;
                let removed = self.delete_rows(tx, collection)?;
                let inserted = self.insert_documents(tx, &schema, &batch)?.len() as u64;
                Ok(ReplaceSummary { removed, inserted })
            })
            .inspect(|s| debug!("replace_all:done coll={collection} removed={} inserted={}", s.removed, s.inserted))
    }

    fn count(&self, collection: &str) -> Result<u64, StoreError> {
        self.transaction(|tx| {
                self.load_schema(tx, collection)?;
                let counted: Counted =
                    diesel::sql_query(format!("SELECT COUNT(*) AS n FROM {}", sql::qualified(&self.database, collection))).get_result(tx)?;
                Ok(counted.n as u64)
            })
    }

    fn find_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        self.transaction(|tx| {
                let schema = self.load_schema(tx, collection)?;
                let rows: Vec<JsonRow> = diesel::sql_query(sql::select_json_sql(&self.database, collection)).load(tx)?;
                rows.iter().map(|r| sql::decode_row(&schema, &r.doc)).collect()
            })
    }

    fn drop_database(&mut self) -> Result<(), StoreError> {
        debug!("drop_database db={}", self.database);
        self.transaction(|tx| {
                tx.batch_execute(&format!("DROP SCHEMA IF EXISTS {} CASCADE", quote_ident(&self.database)))?;
                diesel::delete(catalog::table.filter(catalog::base_datos.eq(&self.database))).execute(tx)?;
                Ok(())
            })
    }
}
