//! Per-tenant cache of connection managers, filled lazily through a credentials resolver.
//!
//! Each tenant key maps to a once-initialised slot. Concurrent first requests for the same key
//! wait on one resolution, so a tenant never gets more than one pool. A failed resolution removes
//! the key again and the next request resolves afresh. Opened managers are never evicted.

use crate::config::PoolSettings;
use crate::db::credentials::CredentialsResolver;
use crate::db::manager::ConnectionManager;
use crate::error::{AppError, ConfigError};
use crate::types::TenantId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::OnceCell;

type Slot = Arc<OnceCell<Arc<ConnectionManager>>>;

pub struct ManagerRegistry {
    settings: PoolSettings,
    resolver: RwLock<Option<Arc<dyn CredentialsResolver>>>,
    managers: Mutex<HashMap<Option<TenantId>, Slot>>,
}

impl ManagerRegistry {
    /// Registry without a resolver; acquisitions fail until [`Self::set_resolver`] is called.
    pub fn new(settings: PoolSettings) -> Self {
        ManagerRegistry {
            settings,
            resolver: RwLock::new(None),
            managers: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_resolver(settings: PoolSettings, resolver: Arc<dyn CredentialsResolver>) -> Self {
        let registry = Self::new(settings);
        registry.set_resolver(resolver);
        registry
    }

    /// Replace the active resolver. Already cached managers are kept.
    pub fn set_resolver(&self, resolver: Arc<dyn CredentialsResolver>) {
        *self.resolver.write().unwrap_or_else(|e| e.into_inner()) = Some(resolver);
    }

    pub fn clear_resolver(&self) {
        *self.resolver.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    fn resolver(&self) -> Result<Arc<dyn CredentialsResolver>, AppError> {
        self.resolver
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or_else(|| ConfigError::ResolverNotSet.into())
    }

    fn cached(&self, tenant: &Option<TenantId>) -> Option<Arc<ConnectionManager>> {
        self.managers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(tenant)
            .and_then(|s| s.get().cloned())
    }

    fn slot_or_insert(&self, tenant: &Option<TenantId>) -> Slot {
        self.managers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(tenant.clone())
            .or_default()
            .clone()
    }

    /// Drop the key after a failed initialisation, unless another caller still waits on the slot.
    /// `slot` is released while the map is locked so the last failing caller sees a count of two.
    fn discard_failed(&self, tenant: &Option<TenantId>, slot: Slot) {
        let mut managers = self.managers.lock().unwrap_or_else(|e| e.into_inner());
        let unused = managers
            .get(tenant)
            .is_some_and(|s| Arc::ptr_eq(s, &slot) && !s.initialized() && Arc::strong_count(s) == 2);
        drop(slot);
        if unused {
            managers.remove(tenant);
        }
    }

    /// Manager for `tenant`, resolving credentials and opening a pool on first use.
    /// Resolver failures are returned unchanged and nothing is cached.
    pub async fn get_manager(&self, tenant: Option<TenantId>) -> Result<Arc<ConnectionManager>, AppError> {
        if let Some(manager) = self.cached(&tenant) {
            return Ok(manager);
        }

        let resolver = self.resolver().inspect_err(|e| {
            tracing::warn!(tenant = ?tenant, "cannot open connection manager: {}", e);
        })?;
        let slot = self.slot_or_insert(&tenant);
        let opened = slot
            .get_or_try_init(|| async {
                let credentials = resolver.resolve(tenant.clone()).await.inspect_err(|e| {
                    tracing::warn!(tenant = ?tenant, "credentials resolution failed: {}", e);
                })?;
                ConnectionManager::open(tenant.clone(), &credentials, &self.settings)
                    .await
                    .map(Arc::new)
            })
            .await
            .map(Arc::clone);
        if opened.is_err() {
            self.discard_failed(&tenant, slot);
        }
        opened
    }

    /// True once a manager for `tenant` has been opened.
    pub fn contains(&self, tenant: &Option<TenantId>) -> bool {
        self.cached(tenant).is_some()
    }

    /// Number of opened managers.
    pub fn len(&self) -> usize {
        self.ready_managers().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ready_managers(&self) -> Vec<Arc<ConnectionManager>> {
        self.managers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter_map(|s| s.get().cloned())
            .collect()
    }

    /// Close every opened pool. Managers stay cached in the closed state.
    pub async fn close_all(&self) {
        for manager in self.ready_managers() {
            manager.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::credentials::{Credentials, MockCredentialsResolver, SslPolicy};

    fn credentials() -> Credentials {
        Credentials {
            host: "127.0.0.1".into(),
            port: 1,
            database: "app".into(),
            username: "svc".into(),
            password: "pw".into(),
            ssl: SslPolicy::Disabled,
        }
    }

    fn tenant() -> Option<TenantId> {
        Some(TenantId::parse("123e4567-e89b-12d3-a456-426614174000").unwrap())
    }

    #[tokio::test]
    async fn second_call_hits_cache() {
        let mut mock = MockCredentialsResolver::new();
        mock.expect_resolve().times(1).returning(|_| Ok(credentials()));
        let registry = ManagerRegistry::with_resolver(PoolSettings::default(), Arc::new(mock));

        let first = registry.get_manager(tenant()).await.unwrap();
        let second = registry.get_manager(tenant()).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.tenant(), tenant().as_ref());
        assert!(registry.contains(&tenant()));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn resolver_receives_the_requested_key() {
        let mut mock = MockCredentialsResolver::new();
        mock.expect_resolve()
            .withf(|t| t.is_none())
            .times(1)
            .returning(|_| Ok(credentials()));
        let registry = ManagerRegistry::with_resolver(PoolSettings::default(), Arc::new(mock));
        assert!(registry.get_manager(None).await.unwrap().tenant().is_none());
    }

    #[tokio::test]
    async fn missing_resolver_leaves_cache_untouched() {
        let registry = ManagerRegistry::new(PoolSettings::default());
        let err = registry.get_manager(tenant()).await.unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::ResolverNotSet)));
        assert!(registry.is_empty());
        assert!(registry.managers.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_resolutions_leave_no_entries() {
        let mut mock = MockCredentialsResolver::new();
        mock.expect_resolve()
            .times(50)
            .returning(|_| Err(AppError::resolution("unknown tenant")));
        let registry = ManagerRegistry::with_resolver(PoolSettings::default(), Arc::new(mock));

        for _ in 0..50 {
            let err = registry.get_manager(Some(TenantId::generate())).await.unwrap_err();
            assert_eq!(err.code(), "resolution_error");
        }
        assert!(registry.is_empty());
        assert!(registry.managers.lock().unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_failures_for_one_tenant_leave_no_entry() {
        let mut mock = MockCredentialsResolver::new();
        mock.expect_resolve()
            .returning(|_| Err(AppError::resolution("secrets service unavailable")));
        let registry = Arc::new(ManagerRegistry::with_resolver(PoolSettings::default(), Arc::new(mock)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move { registry.get_manager(tenant()).await })
            })
            .collect();
        for joined in futures::future::join_all(handles).await {
            assert!(joined.unwrap().is_err());
        }
        assert!(registry.managers.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn cleared_resolver_does_not_affect_cached_managers() {
        let mut mock = MockCredentialsResolver::new();
        mock.expect_resolve().times(1).returning(|_| Ok(credentials()));
        let registry = ManagerRegistry::with_resolver(PoolSettings::default(), Arc::new(mock));
        registry.get_manager(None).await.unwrap();

        registry.clear_resolver();
        assert!(registry.get_manager(None).await.is_ok());
        assert!(registry.get_manager(tenant()).await.is_err());
    }

    #[tokio::test]
    async fn close_all_closes_every_pool() {
        let mut mock = MockCredentialsResolver::new();
        mock.expect_resolve().times(2).returning(|_| Ok(credentials()));
        let registry = ManagerRegistry::with_resolver(PoolSettings::default(), Arc::new(mock));
        let a = registry.get_manager(None).await.unwrap();
        let b = registry.get_manager(tenant()).await.unwrap();

        registry.close_all().await;
        assert!(a.is_closed());
        assert!(b.is_closed());
        assert_eq!(registry.len(), 2);
    }
}
