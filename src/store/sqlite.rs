//! SQLite-backed document store.
//!
//! Uses `rusqlite` with the `bundled` feature so no system SQLite
//! library is required.  Each collection is a table of JSON documents
//! (`id`, `doc`, `created_at`); the schema carries no per-field columns
//! so record shapes can evolve without migrations.  All async trait
//! methods are thin wrappers around synchronous rusqlite calls executed
//! under a `Mutex`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::store::{
    AdminRecord, ContactMessageRecord, DocumentStore, ProductRecord, VacancyRecord,
};

const ADMINS: &str = "admins";
const PRODUCTS: &str = "products";
const VACANCIES: &str = "vacancies";
const CONTACT_MESSAGES: &str = "contact_messages";

/// Document store backed by a single SQLite database file.
pub struct SqliteStore {
    /// The database connection, guarded by a mutex for Send + Sync.
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and initialize the schema.
    ///
    /// Passing `":memory:"` creates an in-memory database (useful for tests).
    pub fn new(path: &str) -> anyhow::Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.apply_pragmas()?;
        store.init_db()?;
        Ok(store)
    }

    /// Apply recommended SQLite pragmas for performance and safety.
    fn apply_pragmas(&self) -> anyhow::Result<()> {
        let conn = self.conn.lock().expect("mutex poisoned");
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA busy_timeout = 5000;
            ",
        )?;
        Ok(())
    }

    /// Create the collection tables if they do not already exist.
    /// Idempotent, safe to call on every startup.
    fn init_db(&self) -> anyhow::Result<()> {
        let conn = self.conn.lock().expect("mutex poisoned");
        for table in [ADMINS, PRODUCTS, VACANCIES, CONTACT_MESSAGES] {
            conn.execute_batch(&format!(
                "
                CREATE TABLE IF NOT EXISTS {table} (
                    id          TEXT PRIMARY KEY,
                    doc         TEXT NOT NULL,
                    created_at  TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_{table}_created
                    ON {table} (created_at DESC);
                "
            ))?;
        }
        Ok(())
    }

    fn insert_doc<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        created_at: &str,
        record: &T,
    ) -> anyhow::Result<()> {
        let doc = serde_json::to_string(record)?;
        let conn = self.conn.lock().expect("mutex poisoned");
        conn.execute(
            &format!("INSERT INTO {table} (id, doc, created_at) VALUES (?1, ?2, ?3)"),
            params![id, doc, created_at],
        )?;
        Ok(())
    }

    fn replace_doc<T: Serialize>(&self, table: &str, id: &str, record: &T) -> anyhow::Result<()> {
        let doc = serde_json::to_string(record)?;
        let conn = self.conn.lock().expect("mutex poisoned");
        let changed = conn.execute(
            &format!("UPDATE {table} SET doc = ?2 WHERE id = ?1"),
            params![id, doc],
        )?;
        if changed == 0 {
            return Err(anyhow::anyhow!("no {table} document with id {id}"));
        }
        Ok(())
    }

    fn get_doc<T: DeserializeOwned>(&self, table: &str, id: &str) -> anyhow::Result<Option<T>> {
        let conn = self.conn.lock().expect("mutex poisoned");
        let doc: Option<String> = conn
            .query_row(
                &format!("SELECT doc FROM {table} WHERE id = ?1"),
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        doc.map(|d| serde_json::from_str(&d).map_err(Into::into))
            .transpose()
    }

    /// All documents in a collection, newest first.  Insertion order
    /// breaks created_at ties.
    fn list_docs<T: DeserializeOwned>(&self, table: &str) -> anyhow::Result<Vec<T>> {
        let conn = self.conn.lock().expect("mutex poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT doc FROM {table} ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(serde_json::from_str(&row?)?);
        }
        Ok(out)
    }

    fn delete_doc(&self, table: &str, id: &str) -> anyhow::Result<bool> {
        let conn = self.conn.lock().expect("mutex poisoned");
        let changed = conn.execute(
            &format!("DELETE FROM {table} WHERE id = ?1"),
            params![id],
        )?;
        Ok(changed > 0)
    }
}

impl DocumentStore for SqliteStore {
    fn get_admin(
        &self,
        id: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<AdminRecord>>> + Send + '_>> {
        let id = id.to_string();
        Box::pin(async move { self.get_doc(ADMINS, &id) })
    }

    fn get_admin_by_username(
        &self,
        username: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<AdminRecord>>> + Send + '_>> {
        let username = username.to_string();
        Box::pin(async move {
            let admins: Vec<AdminRecord> = self.list_docs(ADMINS)?;
            Ok(admins.into_iter().find(|a| a.username == username))
        })
    }

    fn seed_admin(
        &self,
        record: AdminRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>> {
        Box::pin(async move {
            let admins: Vec<AdminRecord> = self.list_docs(ADMINS)?;
            if admins.iter().any(|a| a.username == record.username) {
                return Ok(());
            }
            self.insert_doc(ADMINS, &record.id, &record.created_at, &record)
        })
    }

    fn update_admin(
        &self,
        record: AdminRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>> {
        Box::pin(async move { self.replace_doc(ADMINS, &record.id, &record) })
    }

    fn insert_product(
        &self,
        record: ProductRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>> {
        Box::pin(async move {
            self.insert_doc(
                PRODUCTS,
                &record.id,
                &record.created_at,
                &record,
            )
        })
    }

    fn get_product(
        &self,
        id: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<ProductRecord>>> + Send + '_>> {
        let id = id.to_string();
        Box::pin(async move { self.get_doc(PRODUCTS, &id) })
    }

    fn list_products(
        &self,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<ProductRecord>>> + Send + '_>> {
        Box::pin(async move { self.list_docs(PRODUCTS) })
    }

    fn update_product(
        &self,
        record: ProductRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>> {
        Box::pin(async move { self.replace_doc(PRODUCTS, &record.id, &record) })
    }

    fn delete_product(
        &self,
        id: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<bool>> + Send + '_>> {
        let id = id.to_string();
        Box::pin(async move { self.delete_doc(PRODUCTS, &id) })
    }

    fn search_products(
        &self,
        name_fragment: &str,
        limit: usize,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<ProductRecord>>> + Send + '_>> {
        let needle = name_fragment.to_lowercase();
        Box::pin(async move {
            let products: Vec<ProductRecord> = self.list_docs(PRODUCTS)?;
            Ok(products
                .into_iter()
                .filter(|p| p.name.to_lowercase().contains(&needle))
                .take(limit)
                .collect())
        })
    }

    fn insert_vacancy(
        &self,
        record: VacancyRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>> {
        Box::pin(async move {
            self.insert_doc(
                VACANCIES,
                &record.id,
                &record.created_at,
                &record,
            )
        })
    }

    fn get_vacancy(
        &self,
        id: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<VacancyRecord>>> + Send + '_>> {
        let id = id.to_string();
        Box::pin(async move { self.get_doc(VACANCIES, &id) })
    }

    fn list_vacancies(
        &self,
        active_only: bool,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<VacancyRecord>>> + Send + '_>> {
        Box::pin(async move {
            let vacancies: Vec<VacancyRecord> = self.list_docs(VACANCIES)?;
            Ok(vacancies
                .into_iter()
                .filter(|v| !active_only || v.is_active)
                .collect())
        })
    }

    fn update_vacancy(
        &self,
        record: VacancyRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>> {
        Box::pin(async move { self.replace_doc(VACANCIES, &record.id, &record) })
    }

    fn delete_vacancy(
        &self,
        id: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<bool>> + Send + '_>> {
        let id = id.to_string();
        Box::pin(async move { self.delete_doc(VACANCIES, &id) })
    }

    fn insert_contact_message(
        &self,
        record: ContactMessageRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>> {
        Box::pin(async move {
            self.insert_doc(
                CONTACT_MESSAGES,
                &record.id,
                &record.created_at,
                &record,
            )
        })
    }

    fn list_contact_messages(
        &self,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<ContactMessageRecord>>> + Send + '_>> {
        Box::pin(async move { self.list_docs(CONTACT_MESSAGES) })
    }
}
