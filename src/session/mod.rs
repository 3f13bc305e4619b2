//! Guide editing session module
//!
//! This module contains:
//! - Session state (the guide being edited and the selected step)
//! - Message types for host UI interactions
//! - The message handler

pub mod messages;
pub mod state;

pub use messages::{EditMsg, PointerAction, StepMsg, handle_edit_msg};
pub use state::{GuideSession, IndentDirection, MoveDirection};
