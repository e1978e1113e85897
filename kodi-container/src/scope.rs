//! Binding scopes.
//!
//! Scopes partition the registry into independent namespaces:
//! - [`Scope::default_scope`] — where every binding lives when no scope is named
//! - named scopes — created implicitly by binding into them, removed in bulk
//!   with `unbind_scope`
//! - [`Scope::empty`] — sentinel meaning "take this holder out of the graph"
use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the implicit namespace.
pub const DEFAULT_SCOPE_NAME: &str = "kodi.default";

/// String-backed namespace identifier.
///
/// # Examples
/// ```
/// use kodi_container::scope::Scope;
///
/// let session = Scope::new("session");
/// assert!(session.is_not_empty());
/// assert!(!session.is_default());
/// assert!(Scope::default_scope().is_default());
/// assert!(Scope::empty().is_empty());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope(String);

impl Scope {
    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The namespace used when no scope is specified.
    #[inline]
    pub fn default_scope() -> Self {
        Self(DEFAULT_SCOPE_NAME.to_string())
    }

    /// The "remove from graph" sentinel.
    #[inline]
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Uses `name` when given, otherwise the default scope.
    pub fn or_default(name: Option<&str>) -> Self {
        name.map_or_else(Self::default_scope, Self::new)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn is_not_empty(&self) -> bool {
        !self.is_empty()
    }

    #[inline]
    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_SCOPE_NAME
    }

    /// Returns `true` for real scopes other than the default one.
    #[inline]
    pub fn is_named(&self) -> bool {
        self.is_not_empty() && !self.is_default()
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::default_scope()
    }
}

impl From<&str> for Scope {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Scope {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "Scope(<empty>)")
        } else {
            write!(f, "Scope({:?})", self.0)
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
