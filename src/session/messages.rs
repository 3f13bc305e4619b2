//! Message types for the guide editing session
//!
//! This module contains:
//! - EditMsg enum with nested sub-enums for organized message handling
//! - handle_edit_msg, which applies a message to a GuideSession

use crate::config::{ShapeColor, Tool};
use crate::domain::{AnnotationId, HeadingLevel, ShapeStyle, StepId};
use crate::editor::{AnnotationEvent, Viewport};

use super::state::{GuideSession, IndentDirection, MoveDirection};

// ============================================================================
// Pointer Types
// ============================================================================

/// Pointer input over the step image, in screen pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerAction {
    Down(f32, f32),
    Move(f32, f32),
    Up(f32, f32),
    /// Pointer left the canvas
    Leave,
}

// ============================================================================
// Step List Types
// ============================================================================

/// Step list and step field edits
#[derive(Debug, Clone, PartialEq)]
pub enum StepMsg {
    Select(StepId),
    Delete(StepId),
    Move(usize, MoveDirection),
    Indent(usize, IndentDirection),
    SetTitle(StepId, String),
    SetDescription(StepId, String),
    SetHeading(StepId, HeadingLevel),
}

// ============================================================================
// Top-level Message
// ============================================================================

/// All editing messages a host UI can send
#[derive(Debug, Clone, PartialEq)]
pub enum EditMsg {
    Pointer(PointerAction),
    /// Image box moved or resized on screen
    Resize(Viewport),
    SetTool(Tool),
    SetColor(ShapeColor),
    SetStyle(ShapeStyle),
    Delete(AnnotationId),
    BeginTextEdit(AnnotationId),
    UpdateText(AnnotationId, String),
    /// Text field lost focus
    CommitTextEdit,
    Undo,
    Redo,
    ConfirmCrop,
    CancelCrop,
    Step(StepMsg),
}

impl EditMsg {
    pub fn undo() -> Self {
        Self::Undo
    }

    pub fn redo() -> Self {
        Self::Redo
    }

    pub fn pointer_down(x: f32, y: f32) -> Self {
        Self::Pointer(PointerAction::Down(x, y))
    }

    pub fn pointer_move(x: f32, y: f32) -> Self {
        Self::Pointer(PointerAction::Move(x, y))
    }

    pub fn pointer_up(x: f32, y: f32) -> Self {
        Self::Pointer(PointerAction::Up(x, y))
    }

    pub fn select_step(id: StepId) -> Self {
        Self::Step(StepMsg::Select(id))
    }
}

/// Apply a message to the session.
///
/// Returns the annotation event it produced, if any. Messages that need a
/// selected step are ignored when there is none.
pub fn handle_edit_msg(session: &mut GuideSession, msg: EditMsg) -> Option<AnnotationEvent> {
    match msg {
        EditMsg::Pointer(action) => handle_pointer(session, action),
        EditMsg::Resize(viewport) => {
            session.set_viewport(viewport);
            None
        }
        EditMsg::SetTool(tool) => {
            session.set_tool(tool);
            None
        }
        EditMsg::SetColor(color) => {
            session.set_color(color);
            None
        }
        EditMsg::SetStyle(style) => {
            session.set_style(style);
            None
        }
        EditMsg::Delete(id) => session
            .with_annotations(|editor, list, _| editor.delete(list, &id))
            .flatten(),
        EditMsg::BeginTextEdit(id) => {
            session.with_annotations(|editor, list, _| editor.begin_text_edit(list, &id));
            None
        }
        EditMsg::UpdateText(id, text) => {
            session.with_annotations(|editor, list, _| editor.update_text(list, &id, &text));
            None
        }
        EditMsg::CommitTextEdit => session
            .with_annotations(|editor, list, _| editor.commit_text_edit(list))
            .flatten(),
        EditMsg::Undo => {
            session.with_annotations(|editor, list, _| editor.undo(list));
            None
        }
        EditMsg::Redo => {
            session.with_annotations(|editor, list, _| editor.redo(list));
            None
        }
        EditMsg::ConfirmCrop => {
            if let Err(err) = session.confirm_crop() {
                log::error!("Crop failed: {err}");
            }
            None
        }
        EditMsg::CancelCrop => {
            session.cancel_crop();
            None
        }
        EditMsg::Step(msg) => {
            handle_step_msg(session, msg);
            None
        }
    }
}

fn handle_pointer(session: &mut GuideSession, action: PointerAction) -> Option<AnnotationEvent> {
    session
        .with_annotations(|editor, list, viewport| match action {
            PointerAction::Down(x, y) => editor.pointer_down(list, x, y, viewport),
            PointerAction::Move(x, y) => editor.pointer_move(list, x, y, viewport),
            PointerAction::Up(x, y) => editor.pointer_up(list, x, y, viewport),
            PointerAction::Leave => editor.pointer_leave(list),
        })
        .flatten()
}

fn handle_step_msg(session: &mut GuideSession, msg: StepMsg) {
    let handled = match msg {
        StepMsg::Select(id) => session.select_step(&id),
        StepMsg::Delete(id) => session.delete_step(&id),
        StepMsg::Move(index, direction) => session.move_step(index, direction),
        StepMsg::Indent(index, direction) => session.change_indentation(index, direction),
        StepMsg::SetTitle(id, title) => session.set_title(&id, title),
        StepMsg::SetDescription(id, description) => session.set_description(&id, description),
        StepMsg::SetHeading(id, level) => session.set_heading_level(&id, level),
    };
    if !handled {
        log::debug!("Step message had no effect");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::domain::ImageData;
    use crate::editor::{Key, shortcut_for};
    use image::RgbaImage;

    fn session() -> GuideSession {
        let mut session = GuideSession::new(&EditorConfig::default());
        let image = ImageData::from_rgba(&RgbaImage::new(100, 100)).unwrap();
        session.add_step(image);
        handle_edit_msg(&mut session, EditMsg::Resize(Viewport::new(0.0, 0.0, 100.0, 100.0)));
        session
    }

    fn annotations(session: &GuideSession) -> usize {
        session.selected_step().map_or(0, |s| s.annotations.len())
    }

    #[test]
    fn test_draw_rect_through_messages() {
        let mut s = session();
        handle_edit_msg(&mut s, EditMsg::SetTool(Tool::Rect));
        handle_edit_msg(&mut s, EditMsg::pointer_down(10.0, 10.0));
        handle_edit_msg(&mut s, EditMsg::pointer_move(40.0, 30.0));
        let event = handle_edit_msg(&mut s, EditMsg::pointer_up(40.0, 30.0));
        assert!(matches!(event, Some(AnnotationEvent::Created(_))));
        assert_eq!(annotations(&s), 1);
    }

    #[test]
    fn test_undo_shortcut_round_trip() {
        let mut s = session();
        handle_edit_msg(&mut s, EditMsg::pointer_down(50.0, 50.0));
        assert_eq!(annotations(&s), 1);

        let undo = shortcut_for(Key::Character('z'), true, false).unwrap();
        handle_edit_msg(&mut s, undo);
        assert_eq!(annotations(&s), 0);
        handle_edit_msg(&mut s, EditMsg::redo());
        assert_eq!(annotations(&s), 1);
    }

    #[test]
    fn test_text_edit_messages() {
        let mut s = session();
        handle_edit_msg(&mut s, EditMsg::SetTool(Tool::Text));
        handle_edit_msg(&mut s, EditMsg::pointer_down(50.0, 50.0));
        let id = s.selected_step().unwrap().annotations[0].id.clone();
        handle_edit_msg(&mut s, EditMsg::UpdateText(id.clone(), "Click here".into()));
        let event = handle_edit_msg(&mut s, EditMsg::CommitTextEdit);
        assert_eq!(event, Some(AnnotationEvent::TextEdited(id)));
        assert_eq!(s.selected_step().unwrap().annotations[0].text(), Some("Click here"));
    }

    #[test]
    fn test_step_messages() {
        let mut s = session();
        let id = s.selected_step_id().unwrap().clone();
        handle_edit_msg(&mut s, EditMsg::Step(StepMsg::SetTitle(id.clone(), "Log in".into())));
        handle_edit_msg(&mut s, EditMsg::Step(StepMsg::SetHeading(id.clone(), HeadingLevel::H3)));
        let step = s.step(&id).unwrap();
        assert_eq!(step.title, "Log in");
        assert_eq!(step.heading_level, HeadingLevel::H3);

        handle_edit_msg(&mut s, EditMsg::Step(StepMsg::Delete(id)));
        assert!(s.selected_step().is_none());
        assert_eq!(handle_edit_msg(&mut s, EditMsg::pointer_down(1.0, 1.0)), None);
    }
}
