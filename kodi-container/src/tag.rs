//! Binding tags.
//!
//! A [`Tag`] names a binding inside a scope. Tags are plain strings;
//! the registry never looks inside them. When no explicit tag is given
//! the binding facade derives one from the Rust type name.

use std::any::type_name;
use std::fmt;

use serde::{Deserialize, Serialize};

/// String-backed identifier naming a binding.
///
/// [`Tag::empty`] is the "no tag assigned" sentinel carried by fresh
/// holders. It is never used as a registry key.
///
/// # Examples
/// ```
/// use kodi_container::tag::Tag;
///
/// let tag = Tag::new("database_url");
/// assert!(tag.is_not_empty());
/// assert_eq!(tag, Tag::from("database_url"));
/// assert!(Tag::empty().is_empty());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    /// Creates a tag from any string.
    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The "unset" sentinel.
    #[inline]
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Derives the default tag for type `T` from its type name.
    ///
    /// ```
    /// use kodi_container::tag::Tag;
    ///
    /// assert_eq!(Tag::of::<String>().as_str(), "alloc::string::String");
    /// ```
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self(type_name::<T>().to_string())
    }

    /// Uses `name` when given, otherwise the type-derived tag.
    pub fn or_type<T: ?Sized + 'static>(name: Option<&str>) -> Self {
        name.map_or_else(Self::of::<T>, Self::new)
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
}

impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Tag {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "Tag(<empty>)")
        } else {
            write!(f, "Tag({:?})", self.0)
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
