//! Registry settings.
//!
//! Settings are plain data so a host application can load them from
//! whatever format it already uses for configuration.

use serde::{Deserialize, Serialize};

/// Tunables for a [`Kodi`](crate::container::Kodi) registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KodiSettings {
    /// How many "did you mean" tags an unbound-tag error carries.
    pub max_suggestions: usize,
    /// Log discarded duplicate bindings at `warn` instead of `debug`.
    pub warn_on_rebind: bool,
}

impl Default for KodiSettings {
    fn default() -> Self {
        Self {
            max_suggestions: 3,
            warn_on_rebind: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = KodiSettings::default();
        assert_eq!(settings.max_suggestions, 3);
        assert!(settings.warn_on_rebind);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings: KodiSettings = serde_json::from_str(r#"{ "max_suggestions": 5 }"#).unwrap();
        assert_eq!(settings.max_suggestions, 5);
        assert!(settings.warn_on_rebind);
    }

    #[test]
    fn round_trips_through_json() {
        let settings = KodiSettings {
            max_suggestions: 0,
            warn_on_rebind: false,
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(serde_json::from_str::<KodiSettings>(&json).unwrap(), settings);
    }
}
