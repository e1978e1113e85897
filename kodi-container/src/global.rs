//! The process-wide registry and access functions.
//!
//! Everything the global instance offers is also available on a `Kodi`
//! you construct yourself; prefer an owned instance in tests.

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::container::Kodi;

// Created on first access; emptied only by `unbind_all`.
static GLOBAL_KODI: Lazy<Arc<Kodi>> = Lazy::new(|| Arc::new(Kodi::new()));

/// Returns the process-wide registry.
///
/// # Examples
///
/// ```
/// use kodi_container::global::global;
/// use kodi_container::prelude::*;
///
/// global().bind_tag("app_name").unwrap().constant(String::from("demo")).unwrap();
/// assert_eq!(global().instance_by::<String>("app_name").unwrap().as_str(), "demo");
/// ```
pub fn global() -> &'static Arc<Kodi> {
    &GLOBAL_KODI
}

/// Runs an initialization block against the process-wide registry.
///
/// ```
/// use kodi_container::global::kodi;
/// use kodi_container::prelude::*;
///
/// let port = kodi(|k| {
///     k.bind_tag("port").unwrap().constant(8080u16).unwrap();
///     k.instance_by::<u16>("port").unwrap()
/// });
/// assert_eq!(*port, 8080);
/// ```
pub fn kodi<R>(block: impl FnOnce(&Kodi) -> R) -> R {
    let registry: &Kodi = global();
    block(registry)
}
