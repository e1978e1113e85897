//! Binding entry points.
//!
//! [`Binder`] is implemented by the root [`Kodi`] and by
//! [`ModuleBinder`](crate::module::ModuleBinder). Both create holders and
//! tags the same way; the module flavour also records each tag and puts
//! every holder it creates into the module's scope.
//!
//! ```rust
//! use kodi_container::prelude::*;
//!
//! struct Config { retries: u32 }
//!
//! let kodi = Kodi::new();
//! kodi.bind::<Config>().constant(Config { retries: 3 }).unwrap();
//!
//! let counter = kodi.provider(|_| Ok(std::time::Instant::now())).unwrap();
//! kodi.bind_tag("now").unwrap().with(counter).unwrap();
//!
//! assert_eq!(kodi.instance::<Config>().unwrap().retries, 3);
//! ```

use std::sync::Arc;

use crate::container::Kodi;
use crate::error::{KodiError, Result};
use crate::holder::{Holder, HolderKind};
use crate::module::Module;
use crate::scope::Scope;
use crate::tag::Tag;

/// A context that can create holders and tags.
pub trait Binder {
    /// The registry holders are bound into.
    fn kodi(&self) -> &Kodi;

    /// The module currently collecting tags, if any.
    fn module(&self) -> Option<&Module> {
        None
    }

    /// Starts a binding under the type-derived tag of `T`.
    fn bind<T: ?Sized + 'static>(&self) -> Binding<'_> {
        self.binding(Tag::of::<T>())
    }

    /// Starts a binding under `tag`, or the type-derived tag when `None`.
    fn bind_as<T: ?Sized + 'static>(&self, tag: Option<&str>) -> Binding<'_> {
        self.binding(Tag::or_type::<T>(tag))
    }

    /// Starts a binding for the interface `T` under the tag of its
    /// implementation `R`, or under `tag` when given.
    fn bind_type<T: ?Sized + 'static, R: ?Sized + 'static>(&self, tag: Option<&str>) -> Binding<'_> {
        self.bind_as::<R>(tag)
    }

    /// Starts a binding under an explicit tag.
    ///
    /// # Errors
    /// [`KodiError::EmptyTag`] if `tag` is empty.
    fn bind_tag(&self, tag: &str) -> Result<Binding<'_>> {
        if tag.is_empty() {
            return Err(KodiError::EmptyTag);
        }
        Ok(self.binding(Tag::new(tag)))
    }

    /// Starts a binding under `tag` in the active module, if any.
    fn binding(&self, tag: Tag) -> Binding<'_> {
        Binding {
            kodi: self.kodi(),
            module: self.module(),
            tag,
            scope: None,
        }
    }

    /// Builds a holder of the requested kind through the dispatcher.
    ///
    /// # Errors
    /// [`KodiError::UnsupportedHolder`] for kinds that need a parameterized
    /// factory; factory errors for `Constant`.
    fn holder_of<T, F>(&self, kind: HolderKind, factory: F) -> Result<Arc<Holder>>
    where
        T: Send + Sync + 'static,
        F: Fn(&Kodi) -> Result<T> + Send + Sync + 'static,
    {
        let holder = Holder::create(kind, self.kodi(), factory)?;
        Ok(adopt(self.module(), holder))
    }

    /// Untagged memoized holder.
    fn single<T, F>(&self, factory: F) -> Result<Arc<Holder>>
    where
        T: Send + Sync + 'static,
        F: Fn(&Kodi) -> Result<T> + Send + Sync + 'static,
    {
        self.holder_of(HolderKind::Single, factory)
    }

    /// Untagged fresh-per-call holder.
    fn provider<T, F>(&self, factory: F) -> Result<Arc<Holder>>
    where
        T: Send + Sync + 'static,
        F: Fn(&Kodi) -> Result<T> + Send + Sync + 'static,
    {
        self.holder_of(HolderKind::Provider, factory)
    }

    /// Untagged fresh-per-call holder taking an optional `P`.
    fn provider_with_param<T, P, F>(&self, factory: F) -> Arc<Holder>
    where
        T: Send + Sync + 'static,
        P: Send + 'static,
        F: Fn(&Kodi, Option<P>) -> Result<T> + Send + Sync + 'static,
    {
        adopt(self.module(), Holder::provider_with_param(factory))
    }

    /// Untagged constant holder; the factory runs now.
    fn constant<T, F>(&self, factory: F) -> Result<Arc<Holder>>
    where
        T: Send + Sync + 'static,
        F: Fn(&Kodi) -> Result<T> + Send + Sync + 'static,
    {
        self.holder_of(HolderKind::Constant, factory)
    }
}

fn adopt(module: Option<&Module>, holder: Holder) -> Arc<Holder> {
    if let Some(module) = module {
        holder.set_scope(module.scope().clone());
    }
    Arc::new(holder)
}

/// A tag waiting for its holder.
///
/// Finish it with [`with`](Binding::with) or one of the shortcuts.
#[must_use = "a binding does nothing until a holder is attached"]
pub struct Binding<'a> {
    kodi: &'a Kodi,
    module: Option<&'a Module>,
    tag: Tag,
    scope: Option<Scope>,
}

impl<'a> Binding<'a> {
    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    /// Places the holder in `scope` instead of the module's (or default) scope.
    pub fn at(mut self, scope: impl Into<Scope>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Tags `holder` and adds it to the graph.
    ///
    /// The holder is stored under the default scope and, if its scope is
    /// a named one, under that scope too. Keys that are already taken keep
    /// their existing holder. The active module records the tag once the
    /// holder is bound.
    ///
    /// # Errors
    /// [`KodiError::Retag`] if `holder` is already bound under a tag.
    pub fn with(self, holder: Arc<Holder>) -> Result<Arc<Holder>> {
        let scope = self
            .scope
            .or_else(|| self.module.map(|module| module.scope().clone()));
        let holder = self.kodi.register(self.tag.clone(), holder, scope)?;
        if let Some(module) = self.module {
            module.record(self.tag);
        }
        Ok(holder)
    }

    pub fn single<T, F>(self, factory: F) -> Result<Arc<Holder>>
    where
        T: Send + Sync + 'static,
        F: Fn(&Kodi) -> Result<T> + Send + Sync + 'static,
    {
        let holder = Holder::create(HolderKind::Single, self.kodi, factory)?;
        self.with(Arc::new(holder))
    }

    pub fn provider<T, F>(self, factory: F) -> Result<Arc<Holder>>
    where
        T: Send + Sync + 'static,
        F: Fn(&Kodi) -> Result<T> + Send + Sync + 'static,
    {
        let holder = Holder::create(HolderKind::Provider, self.kodi, factory)?;
        self.with(Arc::new(holder))
    }

    pub fn provider_with_param<T, P, F>(self, factory: F) -> Result<Arc<Holder>>
    where
        T: Send + Sync + 'static,
        P: Send + 'static,
        F: Fn(&Kodi, Option<P>) -> Result<T> + Send + Sync + 'static,
    {
        self.with(Arc::new(Holder::provider_with_param(factory)))
    }

    /// Binds a ready value.
    pub fn constant<T: Send + Sync + 'static>(self, value: T) -> Result<Arc<Holder>> {
        self.with(Arc::new(Holder::constant(value)))
    }

    /// Binds the value `factory` produces right now.
    pub fn constant_with<T, F>(self, factory: F) -> Result<Arc<Holder>>
    where
        T: Send + Sync + 'static,
        F: Fn(&Kodi) -> Result<T> + Send + Sync + 'static,
    {
        let holder = Holder::create(HolderKind::Constant, self.kodi, factory)?;
        self.with(Arc::new(holder))
    }
}
