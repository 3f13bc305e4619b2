//! Annotation compositing and editing engine for screenshot step guides
//!
//! A guide is an ordered list of steps, each a screenshot with numbered
//! badges, labels, boxes, ellipses and arrows placed in percent coordinates.
//! The host UI feeds pointer and keyboard input into a `GuideSession`,
//! previews flattened images through a `CompositeCache` and exports the
//! finished guide as HTML.

pub mod assist;
pub mod capture;
pub mod config;
pub mod crop;
pub mod domain;
pub mod editor;
pub mod error;
pub mod export;
pub mod render;
pub mod session;
pub mod store;

pub use config::{EditorConfig, ShapeColor, Tool};
pub use domain::{Annotation, AnnotationKind, Guide, ImageData, Step};
pub use editor::AnnotationEditor;
pub use render::{CompositeCache, composite};
pub use session::{EditMsg, GuideSession, handle_edit_msg};

/// Initialise `env_logger` with a default filter of `warn`, overridable
/// through `RUST_LOG`. Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .try_init();
}
