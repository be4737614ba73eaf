//! Hardware abstraction traits
//!
//! These traits define the interface between the portal logic
//! and hardware-specific implementations.

pub mod light;
pub mod tag;

pub use light::{LedLink, LightChannel, LightOutput};
pub use tag::TagStorage;
