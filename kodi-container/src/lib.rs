//! Core registry implementation for Kodi.

pub mod binding;
pub mod container;
pub mod delegate;
pub mod error;
pub mod global;
pub mod holder;
pub mod key;
pub mod module;
pub mod registry;
pub mod scope;
pub mod settings;
pub mod tag;

pub use binding::{Binder, Binding};
pub use container::{prelude, Kodi, KodiBuilder};
pub use error::{KodiError, Result};
pub use global::global;
pub use holder::{Holder, HolderKind};
pub use module::Bindings;
pub use scope::Scope;
pub use tag::Tag;
