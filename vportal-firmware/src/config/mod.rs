//! Configuration loading
//!
//! The configuration is validated at build time and embedded as postcard
//! bytes; it is decoded and re-checked at boot.

pub mod loader;

pub use loader::load_config;
