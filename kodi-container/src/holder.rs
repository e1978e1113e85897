//! Holders — the binding strategies stored in the registry.
//!
//! A [`Holder`] wraps a factory and decides when it runs:
//! - [`HolderKind::Single`] — first `get` runs the factory, later calls reuse the result
//! - [`HolderKind::Provider`] — every `get` runs the factory
//! - [`HolderKind::ProviderWithParam`] — like `Provider`, plus a run-time argument
//! - [`HolderKind::Constant`] — value computed at binding time
//!
//! Holders also carry their identity (tag and scope). A fresh holder is
//! untagged; the registry assigns the tag when the holder is bound.

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::sync::Arc;

use kodi_support::rendering::shorten_type_name;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing::trace;

use crate::container::Kodi;
use crate::error::{KodiError, Result, RetagError};
use crate::key::BindingKey;
use crate::scope::Scope;
use crate::tag::Tag;

/// A resolved, type-erased value.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// A type-erased run-time argument for [`HolderKind::ProviderWithParam`].
pub type Param = Box<dyn Any + Send>;

/// Zero-argument factory, erased.
///
/// `Box` is enough here: the registry shares whole holders through `Arc`,
/// never the factories themselves.
pub(crate) type Factory = Box<dyn Fn(&Kodi) -> Result<Instance> + Send + Sync>;

type ParamFactory =
    Box<dyn Fn(&Kodi, &BindingKey, Option<Param>) -> Result<Instance> + Send + Sync>;

/// The four binding strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HolderKind {
    Single,
    Provider,
    ProviderWithParam,
    Constant,
}

impl fmt::Display for HolderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HolderKind::Single => write!(f, "Single"),
            HolderKind::Provider => write!(f, "Provider"),
            HolderKind::ProviderWithParam => write!(f, "ProviderWithParam"),
            HolderKind::Constant => write!(f, "Constant"),
        }
    }
}

enum Strategy {
    Single {
        factory: Factory,
        cell: OnceCell<Instance>,
    },
    Provider {
        factory: Factory,
    },
    ProviderWithParam {
        factory: ParamFactory,
        param_type: TypeId,
        param_name: &'static str,
    },
    Constant {
        value: Instance,
    },
}

struct Identity {
    tag: Tag,
    scope: Scope,
}

/// A bound factory strategy plus its identity in the graph.
pub struct Holder {
    strategy: Strategy,
    type_name: &'static str,
    identity: Mutex<Identity>,
}

pub(crate) fn erase<T, F>(factory: F) -> Factory
where
    T: Send + Sync + 'static,
    F: Fn(&Kodi) -> Result<T> + Send + Sync + 'static,
{
    Box::new(move |kodi: &Kodi| Ok(Arc::new(factory(kodi)?) as Instance))
}

impl Holder {
    fn with_strategy(strategy: Strategy, type_name: &'static str) -> Self {
        Self {
            strategy,
            type_name,
            identity: Mutex::new(Identity {
                tag: Tag::empty(),
                scope: Scope::empty(),
            }),
        }
    }

    /// Builds the holder for `kind` from a zero-argument factory.
    ///
    /// This is the only place variant selection happens. `Constant`
    /// runs the factory right away; `ProviderWithParam` needs a factory
    /// that takes a parameter, so asking for it here is an error.
    ///
    /// # Errors
    /// - [`KodiError::UnsupportedHolder`] for `ProviderWithParam`
    /// - whatever the factory returns, for `Constant`
    pub fn create<T, F>(kind: HolderKind, kodi: &Kodi, factory: F) -> Result<Self>
    where
        T: Send + Sync + 'static,
        F: Fn(&Kodi) -> Result<T> + Send + Sync + 'static,
    {
        let type_name = type_name::<T>();
        let strategy = match kind {
            HolderKind::Single => Strategy::Single {
                factory: erase(factory),
                cell: OnceCell::new(),
            },
            HolderKind::Provider => Strategy::Provider {
                factory: erase(factory),
            },
            HolderKind::Constant => Strategy::Constant {
                value: Arc::new(factory(kodi)?),
            },
            HolderKind::ProviderWithParam => {
                return Err(KodiError::UnsupportedHolder { kind, type_name });
            }
        };
        Ok(Self::with_strategy(strategy, type_name))
    }

    /// Memoized holder: the factory runs at most once.
    pub fn single<T, F>(factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Kodi) -> Result<T> + Send + Sync + 'static,
    {
        Self::with_strategy(
            Strategy::Single {
                factory: erase(factory),
                cell: OnceCell::new(),
            },
            type_name::<T>(),
        )
    }

    /// Fresh value on every `get`.
    pub fn provider<T, F>(factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Kodi) -> Result<T> + Send + Sync + 'static,
    {
        Self::with_strategy(
            Strategy::Provider {
                factory: erase(factory),
            },
            type_name::<T>(),
        )
    }

    /// Fresh value on every `get`, built from an optional argument of type `P`.
    pub fn provider_with_param<T, P, F>(factory: F) -> Self
    where
        T: Send + Sync + 'static,
        P: Send + 'static,
        F: Fn(&Kodi, Option<P>) -> Result<T> + Send + Sync + 'static,
    {
        let wrapped: ParamFactory = Box::new(move |kodi: &Kodi, key: &BindingKey, param: Option<Param>| {
            let param = match param {
                Some(boxed) => Some(*boxed.downcast::<P>().map_err(|_| {
                    KodiError::TypeMismatch {
                        key: key.clone(),
                        expected: type_name::<P>(),
                    }
                })?),
                None => None,
            };
            Ok(Arc::new(factory(kodi, param)?) as Instance)
        });

        Self::with_strategy(
            Strategy::ProviderWithParam {
                factory: wrapped,
                param_type: TypeId::of::<P>(),
                param_name: type_name::<P>(),
            },
            type_name::<T>(),
        )
    }

    /// Fixed value.
    pub fn constant<T: Send + Sync + 'static>(value: T) -> Self {
        Self::with_strategy(
            Strategy::Constant {
                value: Arc::new(value),
            },
            type_name::<T>(),
        )
    }

    pub fn kind(&self) -> HolderKind {
        match self.strategy {
            Strategy::Single { .. } => HolderKind::Single,
            Strategy::Provider { .. } => HolderKind::Provider,
            Strategy::ProviderWithParam { .. } => HolderKind::ProviderWithParam,
            Strategy::Constant { .. } => HolderKind::Constant,
        }
    }

    /// Name of the type this holder produces.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the holder's value according to its strategy.
    ///
    /// `ProviderWithParam` receives no argument here.
    pub fn get(&self, kodi: &Kodi) -> Result<Instance> {
        match &self.strategy {
            Strategy::Single { factory, cell } => {
                if let Some(value) = cell.get() {
                    trace!(type_name = self.type_name, "Single hit");
                    return Ok(value.clone());
                }
                cell.get_or_try_init(|| {
                    trace!(type_name = self.type_name, "Single miss, running factory");
                    factory(kodi)
                })
                .cloned()
            }
            Strategy::Provider { factory } => factory(kodi),
            Strategy::ProviderWithParam { factory, .. } => factory(kodi, &self.key(), None),
            Strategy::Constant { value } => Ok(value.clone()),
        }
    }

    /// Returns the holder's value, threading `param` into the factory.
    ///
    /// # Errors
    /// - [`KodiError::ParameterNotAccepted`] unless this is a `ProviderWithParam`
    /// - [`KodiError::TypeMismatch`] if `param` is not the declared type
    pub fn get_with_param(&self, kodi: &Kodi, param: Param) -> Result<Instance> {
        match &self.strategy {
            Strategy::ProviderWithParam {
                factory,
                param_type,
                param_name,
            } => {
                if (*param).type_id() != *param_type {
                    return Err(KodiError::TypeMismatch {
                        key: self.key(),
                        expected: *param_name,
                    });
                }
                factory(kodi, &self.key(), Some(param))
            }
            _ => Err(KodiError::ParameterNotAccepted {
                key: self.key(),
                kind: self.kind(),
            }),
        }
    }

    /// Returns `true` once a `Single` has run its factory.
    pub fn is_initialized(&self) -> bool {
        match &self.strategy {
            Strategy::Single { cell, .. } => cell.get().is_some(),
            Strategy::Constant { .. } => true,
            _ => false,
        }
    }

    pub fn tag(&self) -> Tag {
        self.identity.lock().tag.clone()
    }

    /// The scope as assigned; empty until a scope is given.
    pub fn scope(&self) -> Scope {
        self.identity.lock().scope.clone()
    }

    /// The scope the holder lives in: its assigned scope, or the default one.
    pub fn effective_scope(&self) -> Scope {
        let identity = self.identity.lock();
        if identity.scope.is_empty() {
            Scope::default_scope()
        } else {
            identity.scope.clone()
        }
    }

    pub fn is_tagged(&self) -> bool {
        self.identity.lock().tag.is_not_empty()
    }

    /// The key this holder is stored under once tagged.
    pub fn key(&self) -> BindingKey {
        BindingKey::new(self.effective_scope(), self.tag())
    }

    /// Tags an untagged holder. A tagged holder must be cleared first.
    pub(crate) fn assign_tag(&self, tag: Tag) -> Result<()> {
        if tag.is_empty() {
            return Err(KodiError::EmptyTag);
        }
        let mut identity = self.identity.lock();
        if identity.tag.is_not_empty() {
            return Err(KodiError::Retag(RetagError {
                current: identity.tag.clone(),
                requested: tag,
            }));
        }
        identity.tag = tag;
        Ok(())
    }

    /// Resets the tag to empty, returning the old one.
    pub(crate) fn clear_tag(&self) -> Tag {
        std::mem::take(&mut self.identity.lock().tag)
    }

    pub(crate) fn set_scope(&self, scope: Scope) {
        self.identity.lock().scope = scope;
    }
}

impl fmt::Debug for Holder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let identity = self.identity.lock();
        f.debug_struct("Holder")
            .field("kind", &self.kind())
            .field("type", &shorten_type_name(self.type_name))
            .field("tag", &identity.tag)
            .field("scope", &identity.scope)
            .finish()
    }
}
