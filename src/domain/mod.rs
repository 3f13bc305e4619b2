//! Pure domain types with minimal dependencies
//!
//! This module contains the guide data model used throughout the engine.
//! Types here carry no rendering or editor state so a step can be persisted
//! and reloaded with its annotations intact.

pub mod annotation;
pub mod geometry;
pub mod id;
pub mod image;
pub mod step;

pub use annotation::*;
pub use geometry::*;
pub use id::*;
pub use self::image::*;
pub use step::*;
