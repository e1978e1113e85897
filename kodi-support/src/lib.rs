//! # Kodi Support
//!
//! Shared utilities for the Kodi registry crates.
//!
//! This crate provides:
//! - Type name shortening for default tags and error hints
//! - "Did you mean?" suggestions for unbound tags
//! - Plain-text rendering of registry contents

pub mod rendering;
