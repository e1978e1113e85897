//! # Kodi — runtime dependency registry for Rust
//!
//! Bind values and factories under string tags, group them into scopes
//! and modules, and resolve them from anywhere at runtime.
//!
//! ```rust
//! use kodi::prelude::*;
//!
//! let kodi = Kodi::new();
//! kodi.bind_tag("greeting").unwrap().constant(String::from("hello")).unwrap();
//! assert_eq!(kodi.instance_by::<String>("greeting").unwrap().as_str(), "hello");
//! ```

pub use kodi_container::*;
pub use kodi_support::*;
