//! # Kodi — the registry facade
//!
//! [`Kodi`] ties tags, scopes, holders and the [`Registry`] together
//! into the binding and resolution API.
//!
//! # Architecture
//! ```text
//! bind / bind_tag  ──>  Binding  ──with(holder)──>  Registry[(scope, tag)]
//!                                                         │
//! instance / holder  ──create_or_get──────────────────────┘
//!                                                         │
//!                                                   Holder::get
//! ```
//!
//! # Examples
//! ```rust
//! use kodi_container::prelude::*;
//! use std::sync::Arc;
//!
//! trait Logger: Send + Sync {
//!     fn log(&self, msg: &str);
//! }
//!
//! struct ConsoleLogger;
//! impl Logger for ConsoleLogger {
//!     fn log(&self, msg: &str) { println!("{msg}"); }
//! }
//!
//! struct UserService {
//!     logger: Arc<dyn Logger>,
//! }
//!
//! let kodi = Kodi::new();
//! kodi.bind::<Arc<dyn Logger>>()
//!     .single(|_| Ok(Arc::new(ConsoleLogger) as Arc<dyn Logger>))
//!     .unwrap();
//! kodi.bind::<UserService>()
//!     .provider(|k| {
//!         let logger = k.instance::<Arc<dyn Logger>>()?;
//!         Ok(UserService { logger: Arc::clone(&*logger) })
//!     })
//!     .unwrap();
//!
//! let service = kodi.instance::<UserService>().expect("Failed to resolve");
//! service.logger.log("ready");
//! ```

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use kodi_support::rendering::{render_bindings, suggest_similar};
use tracing::{debug, instrument, trace, warn};

use crate::binding::Binder;
use crate::delegate::{ImmutableDelegate, MutableDelegate};
use crate::error::{KodiError, Result, RetagError, UnboundTagError};
use crate::holder::{Holder, Instance};
use crate::key::BindingKey;
use crate::module::{Bindings, Module, ModuleBinder};
use crate::registry::Registry;
use crate::scope::Scope;
use crate::settings::KodiSettings;
use crate::tag::Tag;

// ============================================================
// KodiBuilder
// ============================================================

/// Builds a [`Kodi`] with non-default settings.
///
/// ```rust
/// use kodi_container::container::Kodi;
///
/// let kodi = Kodi::builder()
///     .max_suggestions(5)
///     .warn_on_rebind(false)
///     .build();
/// assert_eq!(kodi.settings().max_suggestions, 5);
/// ```
#[derive(Debug, Default)]
pub struct KodiBuilder {
    settings: KodiSettings,
}

impl KodiBuilder {
    /// How many "did you mean" tags an unbound-tag error carries.
    pub fn max_suggestions(mut self, max: usize) -> Self {
        self.settings.max_suggestions = max;
        self
    }

    /// Log discarded duplicate bindings at `warn` (default) or `debug`.
    pub fn warn_on_rebind(mut self, warn: bool) -> Self {
        self.settings.warn_on_rebind = warn;
        self
    }

    pub fn build(self) -> Kodi {
        Kodi::with_settings(self.settings)
    }
}

// ═══════════════════════════════════════════
// Kodi
// ═══════════════════════════════════════════

/// Thread-safe tag-and-scope dependency registry.
///
/// Bindings can be added and removed at any time; resolution funnels
/// through [`Registry::create_or_get`].
#[derive(Default)]
pub struct Kodi {
    registry: Registry,
    settings: KodiSettings,
}

impl Kodi {
    /// Creates an empty registry with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> KodiBuilder {
        KodiBuilder::default()
    }

    pub fn with_settings(settings: KodiSettings) -> Self {
        Self {
            registry: Registry::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &KodiSettings {
        &self.settings
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    // ── Graph membership ──

    /// Tags `holder`, optionally places it in `scope`, and adds it to the graph.
    pub(crate) fn register(
        &self,
        tag: Tag,
        holder: Arc<Holder>,
        scope: Option<Scope>,
    ) -> Result<Arc<Holder>> {
        holder.assign_tag(tag)?;
        if let Some(scope) = scope {
            holder.set_scope(scope);
        }
        self.add_to_graph(&holder);
        Ok(holder)
    }

    /// Stores a tagged holder under the default scope, and under its own
    /// scope when that is a named one.
    fn add_to_graph(&self, holder: &Arc<Holder>) {
        let tag = holder.tag();
        if tag.is_empty() {
            return;
        }
        self.insert_first(BindingKey::in_default(tag.clone()), holder);

        let scope = holder.scope();
        if scope.is_named() {
            self.insert_first(BindingKey::new(scope, tag), holder);
        }
    }

    fn insert_first(&self, key: BindingKey, holder: &Arc<Holder>) {
        let stored = self
            .registry
            .create_or_get(key.clone(), || Some(holder.clone()));

        if let Some(existing) = stored {
            if !Arc::ptr_eq(&existing, holder) {
                if self.settings.warn_on_rebind {
                    warn!(key = %key, kept = %existing.kind(), "Key already bound, keeping first holder");
                } else {
                    debug!(key = %key, kept = %existing.kind(), "Key already bound, keeping first holder");
                }
            }
        }
    }

    /// Takes `holder` out of the graph and clears its tag.
    ///
    /// Drops the default-scope entry and the named-scope entry, each only
    /// if it is this very holder. Afterwards the holder may be bound again
    /// under a new tag.
    ///
    /// Returns whether an entry was removed.
    pub fn unregister(&self, holder: &Arc<Holder>) -> bool {
        if !holder.is_tagged() {
            return false;
        }
        let key = holder.key();
        let mut removed = self
            .registry
            .remove_holder(&BindingKey::in_default(key.tag().clone()), holder);
        if key.scope().is_named() {
            removed |= self.registry.remove_holder(&key, holder);
        }
        let tag = holder.clear_tag();
        debug!(tag = %tag, removed, "Cleared holder tag");
        removed
    }

    /// Moves `holder` to `scope`.
    ///
    /// [`Scope::empty`] on a tagged holder takes it out of the graph, like
    /// [`unregister`](Kodi::unregister). A tagged holder moving to a real
    /// scope leaves its old named scope and joins the new one.
    pub fn at(&self, holder: &Arc<Holder>, scope: impl Into<Scope>) {
        let scope = scope.into();
        if !holder.is_tagged() {
            holder.set_scope(scope);
            return;
        }
        if scope.is_empty() {
            self.unregister(holder);
            return;
        }

        let old = holder.key();
        if old.scope() == &scope {
            return;
        }
        if old.scope().is_named() {
            self.registry.remove_holder(&old, holder);
        }
        holder.set_scope(scope);
        self.add_to_graph(holder);
    }

    // ── Modules ──

    /// Imports a [`Bindings`] module.
    #[instrument(skip(self, bindings), fields(module = bindings.name()))]
    pub fn import(&self, bindings: &dyn Bindings) -> Result<Arc<Module>> {
        self.module(bindings.name(), bindings.scope(), |module| bindings.register(module))
    }

    /// Runs `register` with a module binding context.
    ///
    /// Importing a module name twice reuses the first record and its scope.
    pub fn module<F>(&self, name: &str, scope: impl Into<Scope>, register: F) -> Result<Arc<Module>>
    where
        F: FnOnce(&ModuleBinder<'_>) -> Result<()>,
    {
        let module = self.registry.insert_module(Module::new(name, scope.into()));
        register(&ModuleBinder::new(self, &module))?;
        debug!(module = name, scope = %module.scope(), tags = module.len(), "Imported module");
        Ok(module)
    }

    // ── Resolution ──

    /// Returns the holder bound at `(scope, tag)`.
    ///
    /// `tag` defaults to the type name of `T`, `scope` to the default scope.
    pub fn holder<T: ?Sized + 'static>(&self, tag: Option<&str>, scope: Option<&str>) -> Result<Arc<Holder>> {
        let key = BindingKey::new(Scope::or_default(scope), Tag::or_type::<T>(tag));
        self.lookup(key)
    }

    fn lookup(&self, key: BindingKey) -> Result<Arc<Holder>> {
        match self.registry.create_or_get(key.clone(), || None) {
            Some(holder) => Ok(holder),
            None => Err(self.unbound(key)),
        }
    }

    fn unbound(&self, key: BindingKey) -> KodiError {
        let tags = self.registry.registered_tags();
        let available: Vec<&str> = tags.iter().map(Tag::as_str).collect();
        let suggestions = suggest_similar(key.tag().as_str(), &available, self.settings.max_suggestions)
            .into_iter()
            .map(Tag::from)
            .collect();

        KodiError::UnboundTag(UnboundTagError {
            requested: key,
            suggestions,
        })
    }

    /// Resolves `T` by its type-derived tag in the default scope.
    ///
    /// ```rust,ignore
    /// let db: Arc<Database> = kodi.instance()?;
    /// ```
    pub fn instance<T: Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        self.instance_in(None, None)
    }

    /// Resolves `T` bound under `tag` in the default scope.
    pub fn instance_by<T: Send + Sync + 'static>(&self, tag: &str) -> Result<Arc<T>> {
        self.instance_in(Some(tag), None)
    }

    /// Resolves `T` at `(scope, tag)`, each defaulting when `None`.
    pub fn instance_in<T: Send + Sync + 'static>(
        &self,
        tag: Option<&str>,
        scope: Option<&str>,
    ) -> Result<Arc<T>> {
        let holder = self.holder::<T>(tag, scope)?;
        let key = holder.key();
        trace!(key = %key, kind = %holder.kind(), "Resolving");
        downcast(key, holder.get(self)?)
    }

    /// Resolves `T` under `tag`, storing `fallback` first if nothing is bound.
    ///
    /// The fallback, if untagged, takes the tag and the default scope.
    ///
    /// # Errors
    /// - [`KodiError::EmptyTag`] if `tag` is empty
    /// - [`KodiError::Retag`] if the fallback is bound under another tag
    pub fn instance_with<T: Send + Sync + 'static>(
        &self,
        tag: Option<&str>,
        fallback: Option<Arc<Holder>>,
    ) -> Result<Arc<T>> {
        let tag = Tag::or_type::<T>(tag);
        if tag.is_empty() {
            return Err(KodiError::EmptyTag);
        }
        if let Some(fallback) = &fallback {
            let current = fallback.tag();
            if current.is_not_empty() && current != tag {
                return Err(KodiError::Retag(RetagError {
                    current,
                    requested: tag,
                }));
            }
        }

        let key = BindingKey::in_default(tag);
        let holder = self
            .registry
            .create_or_get(key.clone(), || fallback.clone())
            .ok_or_else(|| self.unbound(key.clone()))?;

        if let Some(fallback) = &fallback {
            if Arc::ptr_eq(fallback, &holder) && !holder.is_tagged() {
                holder.set_scope(Scope::default_scope());
                holder.assign_tag(key.tag().clone())?;
            }
        }

        trace!(key = %key, kind = %holder.kind(), "Resolving");
        downcast(key, holder.get(self)?)
    }

    /// Resolves `T` through a `ProviderWithParam` holder with `param`.
    pub fn instance_with_param<T, P>(
        &self,
        tag: Option<&str>,
        scope: Option<&str>,
        param: P,
    ) -> Result<Arc<T>>
    where
        T: Send + Sync + 'static,
        P: Send + 'static,
    {
        let holder = self.holder::<T>(tag, scope)?;
        let key = holder.key();
        trace!(key = %key, param = type_name::<P>(), "Resolving with parameter");
        downcast(key, holder.get_with_param(self, Box::new(param))?)
    }

    // ── Removal ──

    /// Removes the entry at `(scope, tag)`. Returns whether one was removed.
    pub fn unbind<T: ?Sized + 'static>(&self, tag: Option<&str>, scope: Option<&str>) -> bool {
        self.registry
            .remove_instance(&Tag::or_type::<T>(tag), &Scope::or_default(scope))
            .is_some()
    }

    /// Removes the default-scope entry for an explicit tag.
    ///
    /// # Errors
    /// [`KodiError::EmptyTag`] if `tag` is empty.
    pub fn unbind_tag(&self, tag: &str) -> Result<bool> {
        if tag.is_empty() {
            return Err(KodiError::EmptyTag);
        }
        Ok(self.unbind::<()>(Some(tag), None))
    }

    /// Removes every entry of a scope. Returns whether any were removed.
    #[instrument(skip(self))]
    pub fn unbind_scope(&self, scope: &str) -> bool {
        self.registry.remove_all_scope(&Scope::new(scope))
    }

    /// Removes a module's tags from the module's scope and forgets the module.
    pub fn unbind_module(&self, name: &str) -> bool {
        let Some(module) = self.registry.remove_module(name) else {
            return false;
        };
        let mut removed = false;
        for tag in module.tags() {
            removed |= self.registry.remove_instance(&tag, module.scope()).is_some();
        }
        debug!(module = name, removed, "Unbound module");
        removed
    }

    /// Removes everything.
    pub fn unbind_all(&self) {
        self.registry.clear_all();
        debug!("Unbound all instances");
    }

    // ── Introspection ──

    /// Returns `true` if the tag is bound in any scope.
    pub fn is_bound<T: ?Sized + 'static>(&self, tag: Option<&str>) -> bool {
        self.registry.has_instance(&Tag::or_type::<T>(tag))
    }

    /// Returns `true` if an imported module bound the tag.
    pub fn has_module<T: ?Sized + 'static>(&self, tag: Option<&str>) -> bool {
        self.registry.has_module_by_tag(&Tag::or_type::<T>(tag))
    }

    /// The first named scope the tag is bound in, if any.
    pub fn scope_of<T: ?Sized + 'static>(&self, tag: Option<&str>) -> Option<Scope> {
        self.registry
            .scopes_of(&Tag::or_type::<T>(tag))
            .into_iter()
            .find(Scope::is_named)
    }

    pub fn has_scope<T: ?Sized + 'static>(&self, tag: Option<&str>) -> bool {
        self.scope_of::<T>(tag).is_some()
    }

    /// Plain-text listing of every entry.
    pub fn describe(&self) -> String {
        render_bindings(&self.registry.rows())
    }

    // ── Delegates ──

    /// A cell that resolves `T` on first access and keeps it.
    pub fn immutable_instance<T: Send + Sync + 'static>(
        self: &Arc<Self>,
        tag: Option<&str>,
    ) -> ImmutableDelegate<Arc<T>> {
        let kodi = Arc::clone(self);
        let tag = tag.map(str::to_owned);
        ImmutableDelegate::new(move || kodi.instance_in::<T>(tag.as_deref(), None))
    }

    /// Like [`immutable_instance`](Kodi::immutable_instance), but overwritable.
    pub fn mutable_instance<T: Send + Sync + 'static>(
        self: &Arc<Self>,
        tag: Option<&str>,
    ) -> MutableDelegate<Arc<T>> {
        let kodi = Arc::clone(self);
        let tag = tag.map(str::to_owned);
        MutableDelegate::new(move || kodi.instance_in::<T>(tag.as_deref(), None))
    }
}

impl Binder for Kodi {
    fn kodi(&self) -> &Kodi {
        self
    }
}

impl fmt::Debug for Kodi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kodi")
            .field("registered", &self.registry.len())
            .field("settings", &self.settings)
            .finish()
    }
}

fn downcast<T: Send + Sync + 'static>(key: BindingKey, value: Instance) -> Result<Arc<T>> {
    value.downcast::<T>().map_err(|_| KodiError::TypeMismatch {
        key,
        expected: type_name::<T>(),
    })
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::{Kodi, KodiBuilder};
    pub use crate::binding::{Binder, Binding};
    pub use crate::delegate::{ImmutableDelegate, MutableDelegate, Optional};
    pub use crate::error::{KodiError, Result};
    pub use crate::global::global;
    pub use crate::holder::{Holder, HolderKind};
    pub use crate::key::BindingKey;
    pub use crate::module::{Bindings, Module, ModuleBinder};
    pub use crate::scope::Scope;
    pub use crate::settings::KodiSettings;
    pub use crate::tag::Tag;
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    struct Counter(u32);

    fn counting_single(kodi: &Kodi, tag: &str, counter: &Arc<AtomicU32>) {
        let counter = counter.clone();
        kodi.bind_tag(tag)
            .unwrap()
            .single(move |_| Ok(Counter(counter.fetch_add(1, Ordering::SeqCst))))
            .unwrap();
    }

    #[test]
    fn resolve_constant() {
        let kodi = Kodi::new();
        kodi.bind::<i32>().constant(42i32).unwrap();

        assert_eq!(*kodi.instance::<i32>().unwrap(), 42);
        assert_eq!(*kodi.instance::<i32>().unwrap(), 42);
    }

    #[test]
    fn holder_lookup_is_idempotent() {
        let kodi = Kodi::new();
        kodi.bind_tag("x").unwrap().constant(1u8).unwrap();

        let a = kodi.holder::<u8>(Some("x"), None).unwrap();
        let b = kodi.holder::<u8>(Some("x"), None).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(kodi.registry().len(), 1);
    }

    #[test]
    fn single_memoizes() {
        let kodi = Kodi::new();
        let counter = Arc::new(AtomicU32::new(0));
        counting_single(&kodi, "counter", &counter);

        let a = kodi.instance_by::<Counter>("counter").unwrap();
        let b = kodi.instance_by::<Counter>("counter").unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn single_concurrent_resolution_runs_factory_once() {
        let kodi = Kodi::new();
        let counter = Arc::new(AtomicU32::new(0));
        counting_single(&kodi, "counter", &counter);

        let kodi = &kodi;
        let values: Vec<Arc<Counter>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(move || kodi.instance_by::<Counter>("counter").unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(values.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn provider_runs_every_time() {
        let kodi = Kodi::new();
        let counter = Arc::new(AtomicU32::new(0));
        kodi.bind::<u32>()
            .provider({
                let counter = counter.clone();
                move |_| Ok(counter.fetch_add(1, Ordering::SeqCst))
            })
            .unwrap();

        for expected in 0..5 {
            assert_eq!(*kodi.instance::<u32>().unwrap(), expected);
        }
        assert_eq!(counter.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn provider_with_param() {
        let kodi = Kodi::new();
        kodi.bind_tag("greet")
            .unwrap()
            .provider_with_param(|_, name: Option<&'static str>| {
                Ok(format!("hello {}", name.unwrap_or("world")))
            })
            .unwrap();

        let named = kodi.instance_with_param::<String, _>(Some("greet"), None, "kodi").unwrap();
        let plain = kodi.instance_by::<String>("greet").unwrap();

        assert_eq!(named.as_str(), "hello kodi");
        assert_eq!(plain.as_str(), "hello world");
    }

    #[test]
    fn param_on_plain_provider_fails() {
        let kodi = Kodi::new();
        kodi.bind_tag("n").unwrap().provider(|_| Ok(1u8)).unwrap();

        let err = kodi.instance_with_param::<u8, _>(Some("n"), None, 5u8).unwrap_err();
        assert!(matches!(err, KodiError::ParameterNotAccepted { .. }));
    }

    #[test]
    fn resolve_with_dependency() {
        let kodi = Kodi::new();
        kodi.bind_tag("url").unwrap().constant(String::from("postgres://localhost")).unwrap();
        kodi.bind::<Vec<u8>>()
            .provider(|k| Ok(k.instance_by::<String>("url")?.as_bytes().to_vec()))
            .unwrap();

        assert_eq!(kodi.instance::<Vec<u8>>().unwrap().as_slice(), b"postgres://localhost");
    }

    #[test]
    fn resolve_unbound_tag() {
        let kodi = Kodi::new();
        kodi.bind_tag("database_url").unwrap().constant(String::new()).unwrap();

        match kodi.instance_by::<String>("database_uri").unwrap_err() {
            KodiError::UnboundTag(e) => {
                assert_eq!(e.requested.tag().as_str(), "database_uri");
                assert_eq!(e.suggestions, vec![Tag::new("database_url")]);
            }
            other => panic!("Expected UnboundTag, got: {other:?}"),
        }
    }

    #[test]
    fn suggestions_follow_settings() {
        let kodi = Kodi::builder().max_suggestions(0).build();
        kodi.bind_tag("database_url").unwrap().constant(String::new()).unwrap();

        match kodi.instance_by::<String>("database_uri").unwrap_err() {
            KodiError::UnboundTag(e) => assert!(e.suggestions.is_empty()),
            other => panic!("Expected UnboundTag, got: {other:?}"),
        }
    }

    #[test]
    fn resolve_wrong_type() {
        let kodi = Kodi::new();
        kodi.bind_tag("n").unwrap().constant(1u8).unwrap();

        let err = kodi.instance_by::<String>("n").unwrap_err();
        assert!(matches!(err, KodiError::TypeMismatch { .. }));
    }

    #[test]
    fn factory_errors_propagate() {
        let kodi = Kodi::new();
        kodi.bind::<u16>()
            .provider(|_| Err::<u16, KodiError>(KodiError::construction::<u16>("port out of range")))
            .unwrap();

        assert!(matches!(
            kodi.instance::<u16>().unwrap_err(),
            KodiError::ConstructionFailed { .. }
        ));
    }

    #[test]
    fn scopes_are_isolated() {
        let kodi = Kodi::new();
        kodi.bind_tag("x").unwrap().at("a").constant(String::from("from a")).unwrap();
        kodi.bind_tag("x").unwrap().at("b").constant(String::from("from b")).unwrap();

        assert!(kodi.unbind_scope("a"));
        assert!(kodi.instance_in::<String>(Some("x"), Some("a")).is_err());
        assert_eq!(
            kodi.instance_in::<String>(Some("x"), Some("b")).unwrap().as_str(),
            "from b"
        );
    }

    #[test]
    fn bind_unbind_rebind_round_trip() {
        let kodi = Kodi::new();
        let counter = Arc::new(AtomicU32::new(0));
        counting_single(&kodi, "svc", &counter);
        let first = kodi.instance_by::<Counter>("svc").unwrap();

        assert!(kodi.unbind_tag("svc").unwrap());
        assert!(matches!(
            kodi.instance_by::<Counter>("svc").unwrap_err(),
            KodiError::UnboundTag(_)
        ));

        counting_single(&kodi, "svc", &counter);
        let second = kodi.instance_by::<Counter>("svc").unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first.0, 0);
        assert_eq!(second.0, 1);
    }

    #[test]
    fn unbind_reports_removal() {
        let kodi = Kodi::new();
        kodi.bind::<u8>().constant(1u8).unwrap();

        assert!(kodi.unbind::<u8>(None, None));
        assert!(!kodi.unbind::<u8>(None, None));
        assert!(matches!(kodi.unbind_tag(""), Err(KodiError::EmptyTag)));
    }

    #[test]
    fn constant_is_same_from_every_scope() {
        let kodi = Kodi::new();
        let holder = kodi.bind_tag("c").unwrap().at("s").constant(String::from("fixed")).unwrap();

        let from_default = kodi.instance_by::<String>("c").unwrap();
        let from_scope = kodi.instance_in::<String>(Some("c"), Some("s")).unwrap();
        for _ in 0..3 {
            assert!(Arc::ptr_eq(&from_default, &kodi.instance_by::<String>("c").unwrap()));
        }
        assert!(Arc::ptr_eq(&from_default, &from_scope));
        assert_eq!(holder.kind(), crate::holder::HolderKind::Constant);
    }

    #[test]
    fn module_scope_bulk_removal() {
        let kodi = Kodi::new();
        kodi.bind_tag("t1").unwrap().constant(1u8).unwrap();

        kodi.module("feature", "feature", |m| {
            m.bind_tag("t1")?.constant(10u8)?;
            m.bind_tag("t2")?.constant(20u8)?;
            m.bind_tag("t3")?.constant(30u8)?;
            Ok(())
        })
        .unwrap();

        assert!(kodi.unbind_scope("feature"));
        for tag in ["t1", "t2", "t3"] {
            assert!(kodi.instance_in::<u8>(Some(tag), Some("feature")).is_err());
        }
        assert_eq!(*kodi.instance_by::<u8>("t1").unwrap(), 1);
    }

    #[test]
    fn unbind_module_removes_its_scope_entries() {
        let kodi = Kodi::new();
        kodi.module("feature", "feature", |m| {
            m.bind_tag("t1")?.constant(1u8)?;
            Ok(())
        })
        .unwrap();

        assert!(kodi.has_module::<u8>(Some("t1")));
        assert!(kodi.unbind_module("feature"));
        assert!(!kodi.has_module::<u8>(Some("t1")));
        assert!(kodi.instance_in::<u8>(Some("t1"), Some("feature")).is_err());
        assert!(!kodi.unbind_module("feature"));
    }

    #[test]
    fn unregister_clears_tag_and_entry() {
        let kodi = Kodi::new();
        let holder = kodi.bind_tag("x").unwrap().constant(1u8).unwrap();

        assert!(kodi.unregister(&holder));
        assert!(!holder.is_tagged());
        assert!(!kodi.is_bound::<u8>(Some("x")));

        kodi.bind_tag("y").unwrap().with(holder).unwrap();
        assert_eq!(*kodi.instance_by::<u8>("y").unwrap(), 1);
    }

    #[test]
    fn unregister_leaves_foreign_holder() {
        let kodi = Kodi::new();
        kodi.bind_tag("x").unwrap().constant(1u8).unwrap();
        let loser = kodi.bind_tag("x").unwrap().constant(2u8).unwrap();

        assert!(!kodi.unregister(&loser));
        assert_eq!(*kodi.instance_by::<u8>("x").unwrap(), 1);
    }

    #[test]
    fn empty_scope_takes_holder_out_of_graph() {
        let kodi = Kodi::new();
        let holder = kodi.bind_tag("x").unwrap().at("s").constant(1u8).unwrap();

        kodi.at(&holder, Scope::empty());
        assert!(!holder.is_tagged());
        assert!(kodi.instance_in::<u8>(Some("x"), Some("s")).is_err());
        assert!(kodi.instance_by::<u8>("x").is_err());
        assert!(kodi.registry().is_empty());
    }

    #[test]
    fn retagged_holder_lives_under_new_tag_only() {
        let kodi = Kodi::new();
        let holder = kodi.bind_tag("x").unwrap().at("s").constant(1u8).unwrap();

        assert!(kodi.unregister(&holder));
        kodi.bind_tag("y").unwrap().with(holder).unwrap();

        assert!(!kodi.is_bound::<u8>(Some("x")));
        assert_eq!(*kodi.instance_by::<u8>("y").unwrap(), 1);
        assert_eq!(kodi.describe().lines().count(), 1);
    }

    #[test]
    fn instance_with_rejects_empty_tag() {
        let kodi = Kodi::new();
        let fallback = Arc::new(Holder::constant(9u8));

        let err = kodi.instance_with::<u8>(Some(""), Some(fallback.clone())).unwrap_err();
        assert!(matches!(err, KodiError::EmptyTag));
        assert!(kodi.registry().is_empty());
        assert!(!fallback.is_tagged());
        assert!(kodi.instance_with::<u8>(Some(""), None).is_err());
    }

    #[test]
    fn instance_with_rejects_fallback_bound_elsewhere() {
        let kodi = Kodi::new();
        let holder = kodi.bind_tag("a").unwrap().constant(1u8).unwrap();

        let err = kodi.instance_with::<u8>(Some("b"), Some(holder.clone())).unwrap_err();
        assert!(matches!(err, KodiError::Retag(_)));
        assert!(!kodi.is_bound::<u8>(Some("b")));

        kodi.unregister(&holder);
        assert!(kodi.registry().is_empty());
    }

    #[test]
    fn at_moves_tagged_holder() {
        let kodi = Kodi::new();
        let holder = kodi.bind_tag("x").unwrap().at("old").constant(1u8).unwrap();

        kodi.at(&holder, "new");
        assert!(kodi.instance_in::<u8>(Some("x"), Some("old")).is_err());
        assert_eq!(*kodi.instance_in::<u8>(Some("x"), Some("new")).unwrap(), 1);
    }

    #[test]
    fn instance_with_fallback() {
        let kodi = Kodi::new();
        let err = kodi.instance_with::<u8>(Some("lazy"), None).unwrap_err();
        assert!(matches!(err, KodiError::UnboundTag(_)));

        let fallback = Arc::new(Holder::constant(9u8));
        assert_eq!(*kodi.instance_with::<u8>(Some("lazy"), Some(fallback.clone())).unwrap(), 9);
        assert_eq!(fallback.tag(), Tag::new("lazy"));

        let ignored = Arc::new(Holder::constant(10u8));
        assert_eq!(*kodi.instance_with::<u8>(Some("lazy"), Some(ignored.clone())).unwrap(), 9);
        assert!(!ignored.is_tagged());
    }

    #[test]
    fn introspection() {
        let kodi = Kodi::new();
        kodi.bind_tag("x").unwrap().at("s").constant(1u8).unwrap();
        kodi.bind_tag("y").unwrap().constant(1u8).unwrap();

        assert!(kodi.is_bound::<u8>(Some("x")));
        assert_eq!(kodi.scope_of::<u8>(Some("x")), Some(Scope::new("s")));
        assert!(kodi.has_scope::<u8>(Some("x")));
        assert!(!kodi.has_scope::<u8>(Some("y")));
        assert!(!kodi.has_module::<u8>(Some("x")));
    }

    #[test]
    fn unbind_all_clears() {
        let kodi = Kodi::new();
        kodi.bind_tag("x").unwrap().at("s").constant(1u8).unwrap();
        kodi.unbind_all();

        assert!(kodi.registry().is_empty());
        assert!(!kodi.is_bound::<u8>(Some("x")));
    }

    #[test]
    fn delegates_resolve_lazily() {
        let kodi = Arc::new(Kodi::new());
        let immutable = kodi.immutable_instance::<u8>(Some("late"));
        let mutable = kodi.mutable_instance::<u8>(Some("late"));

        assert!(immutable.get().is_err());
        kodi.bind_tag("late").unwrap().constant(5u8).unwrap();
        assert_eq!(*immutable.get().unwrap(), 5);

        mutable.overwrite(Arc::new(6));
        assert_eq!(*mutable.get().unwrap(), 6);

        kodi.unbind_all();
        assert_eq!(*immutable.get().unwrap(), 5);
    }

    #[test]
    fn describe_lists_entries() {
        let kodi = Kodi::new();
        kodi.bind_tag("x").unwrap().at("s").single(|_| Ok(1u8)).unwrap();

        let listing = kodi.describe();
        assert_eq!(listing.lines().count(), 2);
        assert!(listing.contains("[s]"));
        assert!(listing.contains("Single"));
    }

    #[test]
    fn debug_display() {
        let kodi = Kodi::new();
        kodi.bind_tag("a").unwrap().constant(1i32).unwrap();
        kodi.bind_tag("b").unwrap().constant(2i32).unwrap();

        let debug = format!("{kodi:?}");
        assert!(debug.contains("Kodi"));
        assert!(debug.contains("registered: 2"));
    }
}
