//! Binding registry — the `(scope, tag) → holder` store.
//!
//! The registry only ever inserts through [`Registry::create_or_get`],
//! which never overwrites: the first holder stored under a key stays
//! there until it is removed. Rebinding a key means unbinding it first.

use std::collections::BTreeSet;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use kodi_support::rendering::BindingRow;
use tracing::debug;

use crate::holder::Holder;
use crate::key::BindingKey;
use crate::module::Module;
use crate::scope::Scope;
use crate::tag::Tag;

/// Stores every bound holder, partitioned by scope.
///
/// Thread-safe: the map is sharded, and create-or-get happens under the
/// shard's entry lock, so two threads can never store two holders for
/// one key. Holders are handed out as `Arc`s and evaluated after the
/// lock is released.
#[derive(Debug, Default)]
pub struct Registry {
    entries: DashMap<BindingKey, Arc<Holder>>,
    modules: DashMap<String, Arc<Module>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the holder at `key`, storing the result of `create` if
    /// the key is free.
    ///
    /// `create` runs only when nothing is stored yet. Returning `None`
    /// from it leaves the key free and yields `None`. It runs under the
    /// shard lock and must not call back into the registry.
    pub fn create_or_get<F>(&self, key: BindingKey, create: F) -> Option<Arc<Holder>>
    where
        F: FnOnce() -> Option<Arc<Holder>>,
    {
        match self.entries.entry(key) {
            Entry::Occupied(entry) => Some(entry.get().clone()),
            Entry::Vacant(entry) => {
                let holder = create()?;
                debug!(key = %entry.key(), kind = %holder.kind(), "Bound holder");
                entry.insert(holder.clone());
                Some(holder)
            }
        }
    }

    /// Read-only lookup. Never inserts.
    pub fn get(&self, key: &BindingKey) -> Option<Arc<Holder>> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Removes whatever is stored at `(scope, tag)`.
    ///
    /// The same tag in other scopes is untouched.
    pub fn remove_instance(&self, tag: &Tag, scope: &Scope) -> Option<Arc<Holder>> {
        let key = BindingKey::new(scope.clone(), tag.clone());
        let removed = self.entries.remove(&key).map(|(_, holder)| holder);
        if removed.is_some() {
            debug!(key = %key, "Removed holder");
        }
        removed
    }

    /// Removes the entry at `key` only if it is this very holder.
    pub(crate) fn remove_holder(&self, key: &BindingKey, holder: &Arc<Holder>) -> bool {
        let removed = self
            .entries
            .remove_if(key, |_, stored| Arc::ptr_eq(stored, holder))
            .is_some();
        if removed {
            debug!(key = %key, "Unregistered holder");
        }
        removed
    }

    /// Removes every entry of `scope`. Returns whether anything was removed.
    pub fn remove_all_scope(&self, scope: &Scope) -> bool {
        let mut removed = 0usize;
        self.entries.retain(|key, _| {
            if key.scope() == scope {
                removed += 1;
                false
            } else {
                true
            }
        });
        debug!(scope = %scope, removed, "Removed scope");
        removed > 0
    }

    /// Removes every entry and every module record.
    pub fn clear_all(&self) {
        let entries = self.entries.len();
        self.entries.clear();
        self.modules.clear();
        debug!(entries, "Cleared registry");
    }

    /// Returns `true` if `tag` is bound in any scope.
    pub fn has_instance(&self, tag: &Tag) -> bool {
        self.entries.iter().any(|entry| entry.key().tag() == tag)
    }

    /// Returns `true` if something is bound at `(scope, tag)`.
    pub fn contains(&self, tag: &Tag, scope: &Scope) -> bool {
        self.entries
            .contains_key(&BindingKey::new(scope.clone(), tag.clone()))
    }

    /// Returns `true` if any imported module recorded `tag`.
    pub fn has_module_by_tag(&self, tag: &Tag) -> bool {
        self.modules.iter().any(|module| module.contains(tag))
    }

    /// All scopes `tag` is bound in, sorted.
    pub fn scopes_of(&self, tag: &Tag) -> Vec<Scope> {
        let scopes: BTreeSet<Scope> = self
            .entries
            .iter()
            .filter(|entry| entry.key().tag() == tag)
            .map(|entry| entry.key().scope().clone())
            .collect();
        scopes.into_iter().collect()
    }

    /// All tags bound in `scope`, sorted.
    pub fn tags_in(&self, scope: &Scope) -> Vec<Tag> {
        let mut tags: Vec<Tag> = self
            .entries
            .iter()
            .filter(|entry| entry.key().scope() == scope)
            .map(|entry| entry.key().tag().clone())
            .collect();
        tags.sort();
        tags
    }

    /// Every distinct bound tag, sorted.
    pub fn registered_tags(&self) -> Vec<Tag> {
        let tags: BTreeSet<Tag> = self
            .entries
            .iter()
            .map(|entry| entry.key().tag().clone())
            .collect();
        tags.into_iter().collect()
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stores a module record, or returns the one already kept under its name.
    pub(crate) fn insert_module(&self, module: Module) -> Arc<Module> {
        self.modules
            .entry(module.name().to_string())
            .or_insert_with(|| Arc::new(module))
            .value()
            .clone()
    }

    pub fn module(&self, name: &str) -> Option<Arc<Module>> {
        self.modules.get(name).map(|module| module.value().clone())
    }

    pub(crate) fn remove_module(&self, name: &str) -> Option<Arc<Module>> {
        self.modules.remove(name).map(|(_, module)| module)
    }

    /// Snapshot of all entries for rendering.
    pub fn rows(&self) -> Vec<BindingRow> {
        self.entries
            .iter()
            .map(|entry| BindingRow {
                scope: entry.key().scope().to_string(),
                tag: entry.key().tag().to_string(),
                kind: entry.value().kind().to_string(),
            })
            .collect()
    }
}
