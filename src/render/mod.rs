//! Annotation rendering module
//!
//! This module contains:
//! - Geometry constants shared by every backend
//! - The draw-op planner and the `Surface` trait
//! - Image rendering using tiny-skia
//! - The compositor and its per-step cache

pub mod cache;
pub mod commands;
pub mod compositor;
pub mod geometry;
pub mod image;
pub mod text;

pub use cache::CompositeCache;
pub use commands::{DrawOp, Surface};
pub use compositor::{composite, composite_async, composite_rgba};
