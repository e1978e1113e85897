//! Modules — named groups of bindings sharing one scope.
//!
//! A module remembers which tags were bound while it was the active
//! binding context. Holders created through a module land in the
//! module's scope, so removing that scope tears the whole group down.
//!
//! # Examples
//! ```rust
//! use kodi_container::prelude::*;
//!
//! struct Database { url: String }
//!
//! struct DatabaseModule;
//!
//! impl Bindings for DatabaseModule {
//!     fn register(&self, module: &ModuleBinder<'_>) -> Result<()> {
//!         module.bind_tag("db_url")?.constant(String::from("postgres://localhost"))?;
//!         module.bind::<Database>().single(|kodi| {
//!             let url = kodi.instance_by::<String>("db_url")?;
//!             Ok(Database { url: url.to_string() })
//!         })?;
//!         Ok(())
//!     }
//!
//!     fn scope(&self) -> Scope {
//!         Scope::new("storage")
//!     }
//! }
//!
//! let kodi = Kodi::new();
//! let module = kodi.import(&DatabaseModule).unwrap();
//! assert_eq!(module.len(), 2);
//!
//! let db = kodi.instance_in::<Database>(None, Some("storage")).unwrap();
//! assert_eq!(db.url, "postgres://localhost");
//! ```

use std::any::type_name;

use parking_lot::RwLock;

use crate::binding::Binder;
use crate::container::Kodi;
use crate::error::Result;
use crate::scope::Scope;
use crate::tag::Tag;

/// Record of the tags bound under one module.
///
/// Holds no values itself.
#[derive(Debug)]
pub struct Module {
    name: String,
    scope: Scope,
    tags: RwLock<Vec<Tag>>,
}

impl Module {
    pub fn new(name: impl Into<String>, scope: Scope) -> Self {
        Self {
            name: name.into(),
            scope,
            tags: RwLock::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Tags in the order they were first bound.
    pub fn tags(&self) -> Vec<Tag> {
        self.tags.read().clone()
    }

    pub fn contains(&self, tag: &Tag) -> bool {
        self.tags.read().contains(tag)
    }

    pub fn len(&self) -> usize {
        self.tags.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.read().is_empty()
    }

    pub(crate) fn record(&self, tag: Tag) {
        let mut tags = self.tags.write();
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
}

/// A reusable group of bindings.
///
/// Implement this to keep related bindings together; generated binding
/// modules implement it too.
///
/// ```rust,ignore
/// kodi.import(&DatabaseModule)?;
/// kodi.import(&AuthModule)?;
/// ```
pub trait Bindings: Send + Sync {
    /// Bind everything through `module`.
    ///
    /// Called once per import.
    fn register(&self, module: &ModuleBinder<'_>) -> Result<()>;

    /// Optional: module name, used as the record key.
    fn name(&self) -> &str {
        type_name::<Self>()
    }

    /// Scope every holder of this module is placed in.
    fn scope(&self) -> Scope {
        Scope::default_scope()
    }
}

/// Binding context handed to a module while it registers.
pub struct ModuleBinder<'a> {
    kodi: &'a Kodi,
    module: &'a Module,
}

impl<'a> ModuleBinder<'a> {
    pub(crate) fn new(kodi: &'a Kodi, module: &'a Module) -> Self {
        Self { kodi, module }
    }
}

impl Binder for ModuleBinder<'_> {
    fn kodi(&self) -> &Kodi {
        self.kodi
    }

    fn module(&self) -> Option<&Module> {
        Some(self.module)
    }
}
