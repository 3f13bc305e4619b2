//! Pointer-driven annotation editing for one step
//!
//! `AnnotationEditor` holds the gesture state and undo history; the
//! annotation list itself stays with the step and is passed into every call.
//! History entries are recorded per gesture: create, delete, move-finalize
//! and text-edit commit each push one snapshot.

use super::hit_test::hit_test;
use super::history::History;
use super::viewport::Viewport;
use crate::config::{EditorConfig, ShapeColor, Tool};
use crate::domain::{
    Annotation, AnnotationId, AnnotationKind, ArrowShape, CircleShape, DEFAULT_TEXT_FONT_SIZE,
    NumberBadge, PctPoint, PctRect, RectShape, ShapeStyle, TextLabel, next_badge_number,
};

/// Content of a freshly placed text label
pub const DEFAULT_LABEL_TEXT: &str = "Text";
/// Rectangles and circles must be larger than this (percent) on both axes
pub const MIN_SHAPE_SIZE: f32 = 1.0;

/// Current gesture
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Interaction {
    #[default]
    Idle,
    /// Dragging out a new rect, circle, arrow or crop selection
    Drawing {
        tool: Tool,
        start: PctPoint,
        current: PctPoint,
    },
    /// Dragging an existing annotation by its handle
    Moving {
        id: AnnotationId,
        /// Pointer position minus handle position at grab time
        offset: PctPoint,
        before: Vec<Annotation>,
        moved: bool,
    },
    /// Crop selection awaiting confirm or cancel
    CropPending { rect: PctRect },
}

/// Live shape shown while drawing
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Preview {
    /// Normalized box for rect, circle and crop
    Box { tool: Tool, rect: PctRect },
    /// Unnormalized segment for arrows
    Arrow { start: PctPoint, end: PctPoint },
}

/// Outcome of an editor call the host may want to react to
#[derive(Clone, Debug, PartialEq)]
pub enum AnnotationEvent {
    Created(AnnotationId),
    Grabbed(AnnotationId),
    Dragged(AnnotationId),
    Moved(AnnotationId),
    Deleted(AnnotationId),
    TextEdited(AnnotationId),
    /// A drag ended without producing a shape
    Discarded,
    CropPending(PctRect),
}

#[derive(Clone, Debug)]
struct TextEdit {
    id: AnnotationId,
    before: Vec<Annotation>,
}

#[derive(Clone, Debug)]
pub struct AnnotationEditor {
    tool: Tool,
    color: ShapeColor,
    style: ShapeStyle,
    interaction: Interaction,
    history: History,
    text_edit: Option<TextEdit>,
}

impl Default for AnnotationEditor {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl AnnotationEditor {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            tool: config.default_tool,
            color: config.default_color,
            style: config.default_style,
            interaction: Interaction::Idle,
            history: History::new(),
            text_edit: None,
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn color(&self) -> ShapeColor {
        self.color
    }

    pub fn style(&self) -> ShapeStyle {
        self.style
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Switch tools. Any gesture in progress ends: a move is kept, a
    /// drawing or pending crop is dropped.
    pub fn set_tool(&mut self, tool: Tool) {
        self.end_gesture();
        self.tool = tool;
    }

    pub fn set_color(&mut self, color: ShapeColor) {
        self.color = color;
    }

    pub fn set_style(&mut self, style: ShapeStyle) {
        self.style = style;
    }

    /// Forget history and gesture state, e.g. when another step is selected
    pub fn reset(&mut self) {
        self.history.clear();
        self.interaction = Interaction::Idle;
        self.text_edit = None;
    }

    pub fn pointer_down(
        &mut self,
        list: &mut Vec<Annotation>,
        x: f32,
        y: f32,
        viewport: &Viewport,
    ) -> Option<AnnotationEvent> {
        // Clicking the canvas takes focus away from a text field
        self.commit_text_edit(list);
        self.end_gesture();

        let p = viewport.to_percent(x, y);

        if self.tool.allows_move()
            && let Some(index) = hit_test(list, x, y, viewport)
        {
            let annotation = &list[index];
            let handle = annotation.move_handle();
            let id = annotation.id.clone();
            self.interaction = Interaction::Moving {
                id: id.clone(),
                offset: PctPoint::new(p.x - handle.x, p.y - handle.y),
                before: list.clone(),
                moved: false,
            };
            return Some(AnnotationEvent::Grabbed(id));
        }

        if self.tool.is_click_tool() {
            let kind = match self.tool {
                Tool::Text => AnnotationKind::Text(TextLabel {
                    x: p.x,
                    y: p.y,
                    text: DEFAULT_LABEL_TEXT.to_string(),
                    color: Some(self.color),
                    font_size: DEFAULT_TEXT_FONT_SIZE,
                }),
                _ => AnnotationKind::Number(NumberBadge {
                    x: p.x,
                    y: p.y,
                    text: next_badge_number(list).to_string(),
                    color: Some(self.color),
                }),
            };
            return Some(self.commit_new(list, kind));
        }

        self.interaction = Interaction::Drawing {
            tool: self.tool,
            start: p,
            current: p,
        };
        None
    }

    pub fn pointer_move(
        &mut self,
        list: &mut [Annotation],
        x: f32,
        y: f32,
        viewport: &Viewport,
    ) -> Option<AnnotationEvent> {
        let p = viewport.to_percent(x, y);
        match &mut self.interaction {
            Interaction::Drawing { current, .. } => {
                *current = p;
                None
            }
            Interaction::Moving {
                id, offset, moved, ..
            } => {
                let Some(annotation) = list.iter_mut().find(|a| &a.id == id) else {
                    self.interaction = Interaction::Idle;
                    return None;
                };
                annotation.move_handle_to(PctPoint::new(p.x - offset.x, p.y - offset.y));
                *moved = true;
                Some(AnnotationEvent::Dragged(annotation.id.clone()))
            }
            Interaction::Idle | Interaction::CropPending { .. } => None,
        }
    }

    pub fn pointer_up(
        &mut self,
        list: &mut Vec<Annotation>,
        x: f32,
        y: f32,
        viewport: &Viewport,
    ) -> Option<AnnotationEvent> {
        if let Interaction::Drawing { current, .. } = &mut self.interaction {
            *current = viewport.to_percent(x, y);
        }
        self.finish(list, false)
    }

    /// Pointer left the canvas: a move is kept, a shape drag is dropped and
    /// a crop drag becomes pending.
    pub fn pointer_leave(&mut self, list: &mut Vec<Annotation>) -> Option<AnnotationEvent> {
        self.finish(list, true)
    }

    /// Remove an annotation by id. Unknown ids are ignored.
    pub fn delete(&mut self, list: &mut Vec<Annotation>, id: &AnnotationId) -> Option<AnnotationEvent> {
        let index = list.iter().position(|a| &a.id == id)?;
        self.commit_text_edit(list);
        self.end_gesture();
        self.history.record(list.clone());
        list.remove(index);
        Some(AnnotationEvent::Deleted(id.clone()))
    }

    /// Start editing the text of a badge or label
    pub fn begin_text_edit(&mut self, list: &[Annotation], id: &AnnotationId) -> bool {
        if let Some(edit) = &self.text_edit
            && &edit.id == id
        {
            return true;
        }
        if !list.iter().any(|a| &a.id == id && a.text().is_some()) {
            return false;
        }
        self.commit_text_edit(list);
        self.text_edit = Some(TextEdit {
            id: id.clone(),
            before: list.to_vec(),
        });
        true
    }

    /// Live text change. Recorded in history only when the edit commits.
    pub fn update_text(&mut self, list: &mut [Annotation], id: &AnnotationId, text: &str) -> bool {
        if !self.begin_text_edit(list, id) {
            return false;
        }
        list.iter_mut()
            .find(|a| &a.id == id)
            .is_some_and(|a| a.set_text(text))
    }

    /// Finish the active text edit (focus loss). Pushes one history entry
    /// if the text changed.
    pub fn commit_text_edit(&mut self, list: &[Annotation]) -> Option<AnnotationEvent> {
        let edit = self.text_edit.take()?;
        if edit.before.as_slice() == list {
            return None;
        }
        self.history.record(edit.before);
        Some(AnnotationEvent::TextEdited(edit.id))
    }

    pub fn undo(&mut self, list: &mut Vec<Annotation>) -> bool {
        self.commit_text_edit(list);
        self.end_gesture();
        self.history.undo(list)
    }

    pub fn redo(&mut self, list: &mut Vec<Annotation>) -> bool {
        self.commit_text_edit(list);
        self.end_gesture();
        self.history.redo(list)
    }

    /// Shape being dragged out or the pending crop box
    pub fn preview(&self) -> Option<Preview> {
        match &self.interaction {
            Interaction::Drawing {
                tool: Tool::Arrow,
                start,
                current,
            } => Some(Preview::Arrow {
                start: *start,
                end: *current,
            }),
            Interaction::Drawing {
                tool,
                start,
                current,
            } => Some(Preview::Box {
                tool: *tool,
                rect: PctRect::from_corners(*start, *current),
            }),
            Interaction::CropPending { rect } => Some(Preview::Box {
                tool: Tool::Crop,
                rect: *rect,
            }),
            Interaction::Idle | Interaction::Moving { .. } => None,
        }
    }

    pub fn pending_crop(&self) -> Option<PctRect> {
        match self.interaction {
            Interaction::CropPending { rect } => Some(rect),
            _ => None,
        }
    }

    /// Drop a pending or in-progress crop without touching anything
    pub fn cancel_crop(&mut self) -> bool {
        match self.interaction {
            Interaction::CropPending { .. }
            | Interaction::Drawing {
                tool: Tool::Crop, ..
            } => {
                self.interaction = Interaction::Idle;
                true
            }
            _ => false,
        }
    }

    /// Hand the pending crop to the caller, who replaces the image and then
    /// calls `reset`.
    pub fn take_crop(&mut self) -> Option<PctRect> {
        let rect = self.pending_crop()?;
        self.interaction = Interaction::Idle;
        Some(rect)
    }

    fn commit_new(&mut self, list: &mut Vec<Annotation>, kind: AnnotationKind) -> AnnotationEvent {
        let annotation = Annotation::new(kind);
        let id = annotation.id.clone();
        log::debug!("Created {} annotation {}", annotation.kind_name(), id);
        self.history.record(list.clone());
        list.push(annotation);
        AnnotationEvent::Created(id)
    }

    /// End the current gesture at its last known pointer position
    fn finish(&mut self, list: &mut Vec<Annotation>, left_canvas: bool) -> Option<AnnotationEvent> {
        match std::mem::take(&mut self.interaction) {
            Interaction::Drawing {
                tool: Tool::Crop,
                start,
                current,
            } => {
                let rect = PctRect::from_corners(start, current);
                if rect.is_empty() {
                    return None;
                }
                self.interaction = Interaction::CropPending { rect };
                Some(AnnotationEvent::CropPending(rect))
            }
            Interaction::Drawing { .. } if left_canvas => Some(AnnotationEvent::Discarded),
            Interaction::Drawing {
                tool,
                start,
                current,
            } => self.commit_drawing(list, tool, start, current),
            Interaction::Moving {
                id, before, moved, ..
            } => {
                if !moved {
                    return None;
                }
                self.history.record(before);
                Some(AnnotationEvent::Moved(id))
            }
            pending @ Interaction::CropPending { .. } => {
                self.interaction = pending;
                None
            }
            Interaction::Idle => None,
        }
    }

    fn commit_drawing(
        &mut self,
        list: &mut Vec<Annotation>,
        tool: Tool,
        start: PctPoint,
        current: PctPoint,
    ) -> Option<AnnotationEvent> {
        let rect = PctRect::from_corners(start, current);
        let kind = match tool {
            Tool::Arrow => AnnotationKind::Arrow(ArrowShape {
                x: start.x,
                y: start.y,
                end_x: current.x,
                end_y: current.y,
                color: Some(self.color),
            }),
            Tool::Rect if rect.exceeds(MIN_SHAPE_SIZE) => AnnotationKind::Rect(RectShape {
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
                color: Some(self.color),
                style: self.style,
            }),
            Tool::Circle if rect.exceeds(MIN_SHAPE_SIZE) => AnnotationKind::Circle(CircleShape {
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
                color: Some(self.color),
                style: self.style,
            }),
            _ => return Some(AnnotationEvent::Discarded),
        };
        Some(self.commit_new(list, kind))
    }

    /// Close out any gesture without a pointer position: moves keep their
    /// history entry, drawings and crops are dropped.
    fn end_gesture(&mut self) {
        if let Interaction::Moving {
            before, moved: true, ..
        } = std::mem::take(&mut self.interaction)
        {
            self.history.record(before);
        }
    }
}
