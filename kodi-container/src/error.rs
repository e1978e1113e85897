//! Error types for Kodi registry operations.
//!
//! Every failure is local to the call that caused it: nothing is
//! retried or recovered inside the registry.

use std::fmt;

use kodi_support::rendering::shorten_type_name;

use crate::holder::HolderKind;
use crate::key::BindingKey;
use crate::tag::Tag;

/// Main error type for all Kodi operations.
#[derive(Debug, thiserror::Error)]
pub enum KodiError {
    /// Resolution requested for a key with nothing bound and no fallback.
    #[error("{}", .0)]
    UnboundTag(UnboundTagError),

    /// An empty string was supplied where a real tag is required.
    #[error("Tag cannot be empty")]
    EmptyTag,

    /// A holder that already carries a tag was given another one.
    #[error("{}", .0)]
    Retag(RetagError),

    /// The holder dispatcher cannot build this variant from the given factory.
    #[error("There is no {kind} holder for a plain factory of {}", shorten_type_name(.type_name))]
    UnsupportedHolder {
        kind: HolderKind,
        type_name: &'static str,
    },

    /// The bound value (or provider parameter) is not of the requested type.
    #[error("Type mismatch at {key}: expected {}", shorten_type_name(.expected))]
    TypeMismatch {
        key: BindingKey,
        expected: &'static str,
    },

    /// A run-time parameter was passed to a holder that takes none.
    #[error("{key} is bound to a {kind} holder, which does not accept parameters")]
    ParameterNotAccepted { key: BindingKey, kind: HolderKind },

    /// A delegate cell in the `None` state was read.
    #[error("Can't get a value from Optional::None")]
    EmptyOptional,

    /// A user factory failed.
    #[error("Failed to construct {}: {source}", shorten_type_name(.type_name))]
    ConstructionFailed {
        type_name: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl KodiError {
    /// Wraps an application error raised inside a factory for `T`.
    ///
    /// ```
    /// use kodi_container::error::KodiError;
    ///
    /// let err = KodiError::construction::<u32>("port out of range");
    /// assert!(err.to_string().contains("u32"));
    /// ```
    pub fn construction<T: ?Sized + 'static>(
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        KodiError::ConstructionFailed {
            type_name: std::any::type_name::<T>(),
            source: source.into(),
        }
    }
}

/// Error when nothing is bound under the requested key.
///
/// Carries bound tags that look similar to the one requested.
#[derive(Debug)]
pub struct UnboundTagError {
    /// The key that was looked up
    pub requested: BindingKey,
    /// Similar tags that ARE bound (for "did you mean?" suggestions)
    pub suggestions: Vec<Tag>,
}

impl fmt::Display for UnboundTagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "There is no tag {} in dependency graph", self.requested)?;

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion}")?;
            }
        }

        write!(
            f,
            "\n  Hint: bind `{}` before resolving it, or pass a fallback holder",
            shorten_type_name(self.requested.tag().as_str())
        )
    }
}

/// Error when a tagged holder is asked to take a different tag.
#[derive(Debug)]
pub struct RetagError {
    pub current: Tag,
    pub requested: Tag,
}

impl fmt::Display for RetagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "You can't change tag `{}` to `{}` on a bound holder",
            self.current, self.requested
        )?;
        write!(f, "\n  Hint: unregister the holder first")
    }
}

/// Convenient Result type for Kodi operations.
pub type Result<T> = std::result::Result<T, KodiError>;
