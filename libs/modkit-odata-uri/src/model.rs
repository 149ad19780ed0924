//! Model identity and the per-model store side-table.

use dashmap::DashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_MODEL_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a model. Never reused, even after the model is dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(u64);

impl ModelId {
    fn next() -> Self {
        Self(NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "model#{}", self.0)
    }
}

/// The data model a query targets.
///
/// Only its identity matters here: per-model registries are memoized by
/// [`ModelId`] and released when the model is dropped. Not `Clone`; share it
/// via `Arc`.
#[derive(Debug)]
pub struct EdmModel {
    id: ModelId,
    namespace: String,
}

impl EdmModel {
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            id: ModelId::next(),
            namespace: namespace.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> ModelId {
        self.id
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl Drop for EdmModel {
    fn drop(&mut self) {
        crate::literal::release_model(self);
    }
}

/// Side-table holding exactly one `S` per model.
///
/// Host-owned tables are not cleared when a model is dropped; call
/// [`ModelStores::release`].
///
/// The first `get_or_create` for a model inserts the store atomically; racing
/// callers all observe the same `Arc`.
pub struct ModelStores<S> {
    stores: DashMap<ModelId, Arc<S>>,
}

impl<S> fmt::Debug for ModelStores<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelStores")
            .field("models", &self.stores.len())
            .finish()
    }
}

impl<S> ModelStores<S> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            stores: DashMap::new(),
        }
    }

    /// Return the model's store, creating it with `init` on first access.
    #[must_use]
    pub fn get_or_create_with(&self, model: &EdmModel, init: impl FnOnce() -> S) -> Arc<S> {
        if let Some(existing) = self.stores.get(&model.id()) {
            return Arc::clone(existing.value());
        }
        let entry = self.stores.entry(model.id()).or_insert_with(|| {
            tracing::debug!(model = %model.id(), namespace = model.namespace(), "Creating per-model store");
            Arc::new(init())
        });
        Arc::clone(entry.value())
    }

    /// The model's store, if one was created.
    #[must_use]
    pub fn get(&self, model: &EdmModel) -> Option<Arc<S>> {
        self.stores.get(&model.id()).map(|e| Arc::clone(e.value()))
    }

    /// Drop the store of a model the host no longer serves.
    #[must_use]
    pub fn release(&self, model: &EdmModel) -> Option<Arc<S>> {
        self.stores.remove(&model.id()).map(|(_, store)| store)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

impl<S: Default> ModelStores<S> {
    /// Return the model's store, creating a default one on first access.
    #[must_use]
    pub fn get_or_create(&self, model: &EdmModel) -> Arc<S> {
        self.get_or_create_with(model, S::default)
    }
}

impl<S> Default for ModelStores<S> {
    fn default() -> Self {
        Self::new()
    }
}
