//! Keyboard shortcuts for the annotation editor

use crate::config::Tool;
use crate::session::messages::EditMsg;

/// Named keys the editor reacts to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Named {
    Enter,
    Escape,
}

/// A key press as delivered by the host toolkit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Character(char),
    Named(Named),
}

/// Map a key press to an editor message.
///
/// Hosts should not forward keys while a text field has focus, otherwise
/// typing a label would switch tools.
pub fn shortcut_for(key: Key, ctrl: bool, shift: bool) -> Option<EditMsg> {
    match key {
        // Undo/redo shortcuts
        Key::Character(c) if c.eq_ignore_ascii_case(&'z') && ctrl && !shift => Some(EditMsg::undo()),
        Key::Character(c)
            if (c.eq_ignore_ascii_case(&'y') && ctrl)
                || (c.eq_ignore_ascii_case(&'z') && ctrl && shift) =>
        {
            Some(EditMsg::redo())
        }
        Key::Named(Named::Enter) => Some(EditMsg::ConfirmCrop),
        Key::Named(Named::Escape) => Some(EditMsg::CancelCrop),
        // Tool selection
        Key::Character(c) if !ctrl => Tool::from_key(c).map(EditMsg::SetTool),
        Key::Character(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo() {
        assert_eq!(shortcut_for(Key::Character('z'), true, false), Some(EditMsg::Undo));
        assert_eq!(shortcut_for(Key::Character('Z'), true, true), Some(EditMsg::Redo));
        assert_eq!(shortcut_for(Key::Character('y'), true, false), Some(EditMsg::Redo));
    }

    #[test]
    fn test_crop_keys() {
        assert_eq!(shortcut_for(Key::Named(Named::Enter), false, false), Some(EditMsg::ConfirmCrop));
        assert_eq!(shortcut_for(Key::Named(Named::Escape), false, false), Some(EditMsg::CancelCrop));
    }

    #[test]
    fn test_tool_letters() {
        assert_eq!(shortcut_for(Key::Character('a'), false, false), Some(EditMsg::SetTool(Tool::Arrow)));
        assert_eq!(shortcut_for(Key::Character('x'), false, false), Some(EditMsg::SetTool(Tool::Crop)));
        assert_eq!(shortcut_for(Key::Character('a'), true, false), None);
        assert_eq!(shortcut_for(Key::Character('q'), false, false), None);
    }
}
