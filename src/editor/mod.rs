//! Interactive annotation editor
//!
//! Maps pointer input in screen space onto percentage-space annotations
//! and keeps per-gesture undo history for the active step.

pub mod canvas;
pub mod history;
pub mod shortcuts;
pub mod viewport;

pub use canvas::{AnnotationEditor, AnnotationEvent, Interaction, Preview};
pub use history::History;
pub use hit_test::hit_test;
pub use shortcuts::{Key, Named, shortcut_for};
pub use viewport::Viewport;
