//! Backend bindings
//!
//! Resolves the [`Backend`] that serves an [`ApiFlavor`] and memoizes it for
//! the life of the process. Construction is lazy and happens at most once per
//! flavor: concurrent callers for an unresolved flavor wait on the same
//! per-flavor build lock and then observe the single binding it produced. A
//! failed construction leaves no entry behind, so the next call retries.
//!
//! Where bindings live is pluggable through [`BindingStore`]; the default is an
//! in-memory map. Both the store and the cache can be cleared, which is what
//! tests use to isolate themselves.

use crate::backends::Backend;
use crate::error::{Failure, ProviderError, classify};
use crate::types::ApiFlavor;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Builds the backend for a flavor. Called at most once per flavor while the
/// binding stays cached.
#[async_trait]
pub trait BackendLoader: Send + Sync {
    async fn load(&self, flavor: ApiFlavor) -> Result<Arc<dyn Backend>, Failure>;
}

/// Storage for resolved bindings.
pub trait BindingStore: Send + Sync {
    fn get(&self, flavor: ApiFlavor) -> Option<Arc<dyn Backend>>;
    fn insert(&self, flavor: ApiFlavor, backend: Arc<dyn Backend>);
    fn remove(&self, flavor: ApiFlavor) -> Option<Arc<dyn Backend>>;
    fn clear(&self);
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Process-local [`BindingStore`].
#[derive(Default)]
pub struct InMemoryBindingStore {
    bindings: Mutex<HashMap<ApiFlavor, Arc<dyn Backend>>>,
}

impl InMemoryBindingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BindingStore for InMemoryBindingStore {
    fn get(&self, flavor: ApiFlavor) -> Option<Arc<dyn Backend>> {
        lock(&self.bindings).get(&flavor).cloned()
    }

    fn insert(&self, flavor: ApiFlavor, backend: Arc<dyn Backend>) {
        lock(&self.bindings).insert(flavor, backend);
    }

    fn remove(&self, flavor: ApiFlavor) -> Option<Arc<dyn Backend>> {
        lock(&self.bindings).remove(&flavor)
    }

    fn clear(&self) {
        lock(&self.bindings).clear();
    }

    fn len(&self) -> usize {
        lock(&self.bindings).len()
    }
}

/// Memoized flavor → backend resolution.
pub struct BindingCache {
    loader: Arc<dyn BackendLoader>,
    store: Arc<dyn BindingStore>,
    in_flight: Mutex<HashMap<ApiFlavor, Arc<tokio::sync::Mutex<()>>>>,
}

impl BindingCache {
    pub fn new(loader: impl BackendLoader + 'static) -> Self {
        Self::with_store(Arc::new(loader), Arc::new(InMemoryBindingStore::new()))
    }

    /// Use a custom store, e.g. one shared between several caches.
    pub fn with_store(loader: Arc<dyn BackendLoader>, store: Arc<dyn BindingStore>) -> Self {
        Self {
            loader,
            store,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<dyn BindingStore> {
        &self.store
    }

    /// Resolve the binding for `flavor`, constructing it on first use.
    ///
    /// A construction failure is classified and returned; nothing is cached,
    /// so a later call tries again.
    pub async fn resolve(&self, flavor: ApiFlavor) -> Result<Arc<dyn Backend>, ProviderError> {
        if let Some(backend) = self.store.get(flavor) {
            return Ok(backend);
        }

        // Held across construction: at most one loader runs per flavor and
        // every waiter sees its result in the double-check below.
        let build_lock = {
            let mut map = lock(&self.in_flight);
            Arc::clone(
                map.entry(flavor)
                    .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
            )
        };
        let _guard = build_lock.lock().await;

        if let Some(backend) = self.store.get(flavor) {
            return Ok(backend);
        }

        match self.loader.load(flavor).await {
            Ok(backend) => {
                tracing::debug!(%flavor, "backend binding constructed");
                self.store.insert(flavor, Arc::clone(&backend));
                Ok(backend)
            }
            Err(failure) => {
                let error = classify(failure, None);
                tracing::debug!(%flavor, "backend binding construction failed: {error}");
                Err(error)
            }
        }
    }

    /// Drop every cached binding.
    pub fn clear(&self) {
        self.store.clear();
        lock(&self.in_flight).clear();
        tracing::debug!("backend bindings cleared");
    }

    /// Drop the binding of one flavor.
    pub fn evict(&self, flavor: ApiFlavor) -> bool {
        let evicted = self.store.remove(flavor).is_some();
        if evicted {
            tracing::debug!(%flavor, "backend binding evicted");
        }
        evicted
    }
}

impl std::fmt::Debug for BindingCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingCache")
            .field("cached", &self.store.len())
            .finish()
    }
}
