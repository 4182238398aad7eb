//! In-memory document store.
//!
//! Stores all documents in memory with no persistence.  Useful for
//! tests and ephemeral deployments.  Uses `RwLock<Inner>` for
//! thread-safe access.  Collections are vectors in insertion order;
//! listings iterate in reverse so the newest document comes first.

use std::future::Future;
use std::pin::Pin;
use std::sync::RwLock;

use super::store::{
    AdminRecord, ContactMessageRecord, DocumentStore, ProductRecord, VacancyRecord,
};

#[derive(Debug, Default)]
struct Inner {
    admins: Vec<AdminRecord>,
    products: Vec<ProductRecord>,
    vacancies: Vec<VacancyRecord>,
    messages: Vec<ContactMessageRecord>,
}

/// Document store backed by process memory.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }
}

impl DocumentStore for MemoryStore {
    fn get_admin(
        &self,
        id: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<AdminRecord>>> + Send + '_>> {
        let id = id.to_string();
        Box::pin(async move {
            let inner = self.inner.read().expect("rwlock poisoned");
            Ok(inner.admins.iter().find(|a| a.id == id).cloned())
        })
    }

    fn get_admin_by_username(
        &self,
        username: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<AdminRecord>>> + Send + '_>> {
        let username = username.to_string();
        Box::pin(async move {
            let inner = self.inner.read().expect("rwlock poisoned");
            Ok(inner.admins.iter().find(|a| a.username == username).cloned())
        })
    }

    fn seed_admin(
        &self,
        record: AdminRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>> {
        Box::pin(async move {
            let mut inner = self.inner.write().expect("rwlock poisoned");
            if !inner.admins.iter().any(|a| a.username == record.username) {
                inner.admins.push(record);
            }
            Ok(())
        })
    }

    fn update_admin(
        &self,
        record: AdminRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>> {
        Box::pin(async move {
            let mut inner = self.inner.write().expect("rwlock poisoned");
            match inner.admins.iter_mut().find(|a| a.id == record.id) {
                Some(slot) => {
                    *slot = record;
                    Ok(())
                }
                None => Err(anyhow::anyhow!("no admin with id {}", record.id)),
            }
        })
    }

    fn insert_product(
        &self,
        record: ProductRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>> {
        Box::pin(async move {
            let mut inner = self.inner.write().expect("rwlock poisoned");
            inner.products.push(record);
            Ok(())
        })
    }

    fn get_product(
        &self,
        id: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<ProductRecord>>> + Send + '_>> {
        let id = id.to_string();
        Box::pin(async move {
            let inner = self.inner.read().expect("rwlock poisoned");
            Ok(inner.products.iter().find(|p| p.id == id).cloned())
        })
    }

    fn list_products(
        &self,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<ProductRecord>>> + Send + '_>> {
        Box::pin(async move {
            let inner = self.inner.read().expect("rwlock poisoned");
            Ok(inner.products.iter().rev().cloned().collect())
        })
    }

    fn update_product(
        &self,
        record: ProductRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>> {
        Box::pin(async move {
            let mut inner = self.inner.write().expect("rwlock poisoned");
            match inner.products.iter_mut().find(|p| p.id == record.id) {
                Some(slot) => {
                    *slot = record;
                    Ok(())
                }
                None => Err(anyhow::anyhow!("no product with id {}", record.id)),
            }
        })
    }

    fn delete_product(
        &self,
        id: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<bool>> + Send + '_>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut inner = self.inner.write().expect("rwlock poisoned");
            let before = inner.products.len();
            inner.products.retain(|p| p.id != id);
            Ok(inner.products.len() < before)
        })
    }

    fn search_products(
        &self,
        name_fragment: &str,
        limit: usize,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<ProductRecord>>> + Send + '_>> {
        let needle = name_fragment.to_lowercase();
        Box::pin(async move {
            let inner = self.inner.read().expect("rwlock poisoned");
            Ok(inner
                .products
                .iter()
                .rev()
                .filter(|p| p.name.to_lowercase().contains(&needle))
                .take(limit)
                .cloned()
                .collect())
        })
    }

    fn insert_vacancy(
        &self,
        record: VacancyRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>> {
        Box::pin(async move {
            let mut inner = self.inner.write().expect("rwlock poisoned");
            inner.vacancies.push(record);
            Ok(())
        })
    }

    fn get_vacancy(
        &self,
        id: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<VacancyRecord>>> + Send + '_>> {
        let id = id.to_string();
        Box::pin(async move {
            let inner = self.inner.read().expect("rwlock poisoned");
            Ok(inner.vacancies.iter().find(|v| v.id == id).cloned())
        })
    }

    fn list_vacancies(
        &self,
        active_only: bool,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<VacancyRecord>>> + Send + '_>> {
        Box::pin(async move {
            let inner = self.inner.read().expect("rwlock poisoned");
            Ok(inner
                .vacancies
                .iter()
                .rev()
                .filter(|v| !active_only || v.is_active)
                .cloned()
                .collect())
        })
    }

    fn update_vacancy(
        &self,
        record: VacancyRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>> {
        Box::pin(async move {
            let mut inner = self.inner.write().expect("rwlock poisoned");
            match inner.vacancies.iter_mut().find(|v| v.id == record.id) {
                Some(slot) => {
                    *slot = record;
                    Ok(())
                }
                None => Err(anyhow::anyhow!("no vacancy with id {}", record.id)),
            }
        })
    }

    fn delete_vacancy(
        &self,
        id: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<bool>> + Send + '_>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut inner = self.inner.write().expect("rwlock poisoned");
            let before = inner.vacancies.len();
            inner.vacancies.retain(|v| v.id != id);
            Ok(inner.vacancies.len() < before)
        })
    }

    fn insert_contact_message(
        &self,
        record: ContactMessageRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>> {
        Box::pin(async move {
            let mut inner = self.inner.write().expect("rwlock poisoned");
            inner.messages.push(record);
            Ok(())
        })
    }

    fn list_contact_messages(
        &self,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<ContactMessageRecord>>> + Send + '_>> {
        Box::pin(async move {
            let inner = self.inner.read().expect("rwlock poisoned");
            Ok(inner.messages.iter().rev().cloned().collect())
        })
    }
}
