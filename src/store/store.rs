//! Abstract document store trait.
//!
//! Any persistence backend must implement [`DocumentStore`].  The trait
//! uses manually desugared async methods (pinned boxed futures) so it
//! can sit behind an `Arc<dyn DocumentStore>` shared by all handlers.
//!
//! Records are schemaless documents: each backend stores them as
//! independent JSON-like values in a single collection per entity, with
//! no references between collections.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

// ── Record types ───────────────────────────────────────────────────

/// Stored admin account.  Created out-of-band (startup seeding or the
/// `storefront-admin` tool); mutated by the profile handlers; never
/// deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminRecord {
    /// UUID v4 identifier.
    pub id: String,
    /// Login name, unique across admins.
    pub username: String,
    /// Argon2id PHC hash of the password.
    pub password_hash: String,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// RFC 3339 last-update timestamp.
    pub updated_at: String,
}

/// Stored product document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    /// UUID v4 identifier.
    pub id: String,
    pub name: String,
    pub description: String,
    /// Unit price, non-negative.
    pub price: f64,
    /// Units in stock, non-negative.
    pub stock: i64,
    pub category: String,
    /// Public URLs on the media host, 1 to 4 entries.
    pub images: Vec<String>,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// RFC 3339 last-update timestamp.
    pub updated_at: String,
}

/// Stored vacancy document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VacancyRecord {
    /// UUID v4 identifier.
    pub id: String,
    pub title: String,
    pub description: String,
    /// Whether the vacancy is publicly listed.
    pub is_active: bool,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// RFC 3339 last-update timestamp.
    pub updated_at: String,
}

/// Stored contact-form submission.  Read-only after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessageRecord {
    /// UUID v4 identifier.
    pub id: String,
    pub name: String,
    pub email: String,
    pub message: String,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

/// RFC 3339 timestamp for "now", millisecond precision.
pub fn now_rfc3339() -> String {
    chrono::Utc::now()
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

// ── Trait ──────────────────────────────────────────────────────────

/// Async document persistence contract.
///
/// Implementations must treat each `*_record` argument as the full new
/// state of the document: updates are whole-document replacements, and
/// partial-update semantics live in the handlers.
pub trait DocumentStore: Send + Sync + 'static {
    // -- Admins --------------------------------------------------------------

    /// Fetch an admin by id.
    fn get_admin(
        &self,
        id: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<AdminRecord>>> + Send + '_>>;

    /// Fetch an admin by username.
    fn get_admin_by_username(
        &self,
        username: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<AdminRecord>>> + Send + '_>>;

    /// Insert the admin if no account with its username exists yet.
    /// Idempotent, safe to call on every startup.
    fn seed_admin(
        &self,
        record: AdminRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>>;

    /// Replace an existing admin document by id.
    fn update_admin(
        &self,
        record: AdminRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>>;

    // -- Products ------------------------------------------------------------

    /// Insert a new product document.
    fn insert_product(
        &self,
        record: ProductRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>>;

    /// Fetch a product by id.
    fn get_product(
        &self,
        id: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<ProductRecord>>> + Send + '_>>;

    /// List all products, newest first.
    fn list_products(
        &self,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<ProductRecord>>> + Send + '_>>;

    /// Replace an existing product document by id.
    fn update_product(
        &self,
        record: ProductRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>>;

    /// Delete a product by id.  Returns `false` when no such document
    /// existed.
    fn delete_product(
        &self,
        id: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<bool>> + Send + '_>>;

    /// Case-insensitive substring search over product names, newest
    /// first, capped at `limit` results.
    fn search_products(
        &self,
        name_fragment: &str,
        limit: usize,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<ProductRecord>>> + Send + '_>>;

    // -- Vacancies -----------------------------------------------------------

    /// Insert a new vacancy document.
    fn insert_vacancy(
        &self,
        record: VacancyRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>>;

    /// Fetch a vacancy by id.
    fn get_vacancy(
        &self,
        id: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<VacancyRecord>>> + Send + '_>>;

    /// List vacancies, newest first.  With `active_only`, inactive
    /// vacancies are filtered out.
    fn list_vacancies(
        &self,
        active_only: bool,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<VacancyRecord>>> + Send + '_>>;

    /// Replace an existing vacancy document by id.
    fn update_vacancy(
        &self,
        record: VacancyRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>>;

    /// Delete a vacancy by id.  Returns `false` when no such document
    /// existed.
    fn delete_vacancy(
        &self,
        id: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<bool>> + Send + '_>>;

    // -- Contact messages ----------------------------------------------------

    /// Insert a new contact message.
    fn insert_contact_message(
        &self,
        record: ContactMessageRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>>;

    /// List all contact messages, newest first.
    fn list_contact_messages(
        &self,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<ContactMessageRecord>>> + Send + '_>>;
}
