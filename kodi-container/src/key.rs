//! Registry keys.
//!
//! [`BindingKey`] uniquely identifies an entry in the registry.
//! It combines a [`Scope`] with a [`Tag`]; the same tag may live
//! in several scopes at once.

use std::fmt;

use crate::scope::Scope;
use crate::tag::Tag;

/// The `(scope, tag)` pair an entry is stored under.
///
/// # Examples
/// ```
/// use kodi_container::key::BindingKey;
///
/// let key = BindingKey::new("session", "user");
/// assert_eq!(key.scope().as_str(), "session");
/// assert_eq!(key.tag().as_str(), "user");
///
/// // Same tag, different scope: different entries
/// assert_ne!(key, BindingKey::in_default("user"));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingKey {
    scope: Scope,
    tag: Tag,
}

impl BindingKey {
    #[inline]
    pub fn new(scope: impl Into<Scope>, tag: impl Into<Tag>) -> Self {
        Self {
            scope: scope.into(),
            tag: tag.into(),
        }
    }

    /// Creates a key in the default scope.
    #[inline]
    pub fn in_default(tag: impl Into<Tag>) -> Self {
        Self::new(Scope::default_scope(), tag)
    }

    #[inline]
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    #[inline]
    pub fn tag(&self) -> &Tag {
        &self.tag
    }
}

impl fmt::Debug for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BindingKey({}, scope={})", self.tag, self.scope)
    }
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scope.is_default() {
            write!(f, "`{}`", self.tag)
        } else {
            write!(f, "`{}` (scope={})", self.tag, self.scope)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_equality_same_pair() {
        assert_eq!(BindingKey::new("s", "t"), BindingKey::new("s", "t"));
    }

    #[test]
    fn scopes_partition_keys() {
        assert_ne!(BindingKey::new("a", "x"), BindingKey::new("b", "x"));
        assert_ne!(BindingKey::new("a", "x"), BindingKey::in_default("x"));
    }

    #[test]
    fn key_in_hashmap() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(BindingKey::in_default("db"), "default");
        map.insert(BindingKey::new("test", "db"), "test");
        assert_eq!(map.get(&BindingKey::in_default("db")), Some(&"default"));
        assert_eq!(map.get(&BindingKey::new("test", "db")), Some(&"test"));
        assert_eq!(map.get(&BindingKey::new("other", "db")), None);
    }

    #[test]
    fn display_hides_default_scope() {
        assert_eq!(BindingKey::in_default("db").to_string(), "`db`");
        assert_eq!(BindingKey::new("s", "db").to_string(), "`db` (scope=s)");
    }
}
