//! Editing session for one guide
//!
//! `GuideSession` owns the guide being edited, tracks which step is
//! selected and routes annotation edits for that step through a single
//! `AnnotationEditor`. Switching steps resets undo history.

use crate::assist::StepAnalysis;
use crate::config::{EditorConfig, ShapeColor, Tool};
use crate::crop::crop_image;
use crate::domain::{
    Annotation, Guide, GuideId, HeadingLevel, ImageData, MAX_INDENTATION, ProjectMetadata,
    ShapeStyle, Step, StepId,
};
use crate::editor::{AnnotationEditor, Viewport};
use crate::error::ImageDataError;

/// Direction for reordering a step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// Direction for changing a step's outline level
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndentDirection {
    In,
    Out,
}

#[derive(Clone, Debug)]
pub struct GuideSession {
    guide_id: GuideId,
    pub metadata: ProjectMetadata,
    steps: Vec<Step>,
    selected: Option<StepId>,
    editor: AnnotationEditor,
    viewport: Viewport,
}

impl GuideSession {
    /// Empty guide with default metadata
    pub fn new(config: &EditorConfig) -> Self {
        Self::from_guide(Guide::new(ProjectMetadata::default()), config)
    }

    /// Resume editing a stored guide. The first step is selected.
    pub fn from_guide(guide: Guide, config: &EditorConfig) -> Self {
        let selected = guide.steps.first().map(|s| s.id.clone());
        Self {
            guide_id: guide.id,
            metadata: guide.metadata,
            steps: guide.steps,
            selected,
            editor: AnnotationEditor::new(config),
            viewport: Viewport::default(),
        }
    }

    pub fn guide_id(&self) -> &GuideId {
        &self.guide_id
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step(&self, id: &StepId) -> Option<&Step> {
        self.steps.iter().find(|s| &s.id == id)
    }

    fn step_mut(&mut self, id: &StepId) -> Option<&mut Step> {
        self.steps.iter_mut().find(|s| &s.id == id)
    }

    pub fn selected_step_id(&self) -> Option<&StepId> {
        self.selected.as_ref()
    }

    pub fn selected_step(&self) -> Option<&Step> {
        self.selected.as_ref().and_then(|id| self.step(id))
    }

    pub fn editor(&self) -> &AnnotationEditor {
        &self.editor
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Screen box the selected step's image is currently drawn in
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Make `id` the editing subject. Unknown ids are ignored.
    pub fn select_step(&mut self, id: &StepId) -> bool {
        if self.step(id).is_none() {
            return false;
        }
        if self.selected.as_ref() != Some(id) {
            self.editor.reset();
            self.selected = Some(id.clone());
        }
        true
    }

    /// Run `f` with the editor and the selected step's annotation list.
    /// `None` when no step is selected.
    pub fn with_annotations<R>(
        &mut self,
        f: impl FnOnce(&mut AnnotationEditor, &mut Vec<Annotation>, &Viewport) -> R,
    ) -> Option<R> {
        let id = self.selected.clone()?;
        let step = self.steps.iter_mut().find(|s| s.id == id)?;
        Some(f(&mut self.editor, &mut step.annotations, &self.viewport))
    }

    /// Append a step awaiting analysis. The first step becomes selected.
    pub fn add_step(&mut self, image: ImageData) -> StepId {
        let step = Step::new(image);
        let id = step.id.clone();
        self.steps.push(step);
        if self.steps.len() == 1 {
            self.selected = Some(id.clone());
            self.editor.reset();
        }
        id
    }

    /// Swap a step's screenshot, keeping its annotations
    pub fn replace_image(&mut self, id: &StepId, image: ImageData) -> bool {
        let Some(step) = self.step_mut(id) else {
            return false;
        };
        step.image = image;
        true
    }

    /// Remove a step. If it was selected, the first remaining step is.
    pub fn delete_step(&mut self, id: &StepId) -> bool {
        let before = self.steps.len();
        self.steps.retain(|s| &s.id != id);
        if self.steps.len() == before {
            return false;
        }
        if self.selected.as_ref() == Some(id) {
            self.selected = self.steps.first().map(|s| s.id.clone());
            self.editor.reset();
        }
        true
    }

    /// Swap a step with its neighbour. No-op at either end.
    pub fn move_step(&mut self, index: usize, direction: MoveDirection) -> bool {
        let target = match direction {
            MoveDirection::Up => index.checked_sub(1),
            MoveDirection::Down => Some(index + 1),
        };
        match target {
            Some(target) if index < self.steps.len() && target < self.steps.len() => {
                self.steps.swap(index, target);
                true
            }
            _ => false,
        }
    }

    pub fn change_indentation(&mut self, index: usize, direction: IndentDirection) -> bool {
        let Some(step) = self.steps.get_mut(index) else {
            return false;
        };
        let level = i32::from(step.indentation)
            + match direction {
                IndentDirection::In => 1,
                IndentDirection::Out => -1,
            };
        step.set_indentation(level);
        debug_assert!(step.indentation <= MAX_INDENTATION);
        true
    }

    pub fn set_title(&mut self, id: &StepId, title: impl Into<String>) -> bool {
        self.step_mut(id).map(|s| s.title = title.into()).is_some()
    }

    pub fn set_description(&mut self, id: &StepId, description: impl Into<String>) -> bool {
        self.step_mut(id)
            .map(|s| s.description = description.into())
            .is_some()
    }

    pub fn set_heading_level(&mut self, id: &StepId, level: HeadingLevel) -> bool {
        self.step_mut(id).map(|s| s.heading_level = level).is_some()
    }

    /// Fill in title and description from AI analysis and clear the
    /// processing flag
    pub fn apply_analysis(&mut self, id: &StepId, analysis: StepAnalysis) -> bool {
        let Some(step) = self.step_mut(id) else {
            log::debug!("Analysis arrived for removed step {id}");
            return false;
        };
        step.title = analysis.title;
        step.description = analysis.description;
        step.is_processing = false;
        true
    }

    /// Apply the pending crop to the selected step: the image is replaced,
    /// annotations and history are cleared.
    ///
    /// `Ok(false)` when there is nothing to crop or the selection is empty.
    pub fn confirm_crop(&mut self) -> Result<bool, ImageDataError> {
        let Some(id) = self.selected.clone() else {
            return Ok(false);
        };
        let Some(rect) = self.editor.take_crop() else {
            return Ok(false);
        };
        let Some(step) = self.steps.iter_mut().find(|s| s.id == id) else {
            return Ok(false);
        };

        let Some(cropped) = crop_image(&step.image, rect)? else {
            return Ok(false);
        };
        step.image = cropped;
        step.annotations.clear();
        self.editor.reset();
        log::debug!("Cropped step {id} to {rect:?}");
        Ok(true)
    }

    pub fn cancel_crop(&mut self) -> bool {
        self.editor.cancel_crop()
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.editor.set_tool(tool);
    }

    pub fn set_color(&mut self, color: ShapeColor) {
        self.editor.set_color(color);
    }

    pub fn set_style(&mut self, style: ShapeStyle) {
        self.editor.set_style(style);
    }

    /// Snapshot for saving, stamped with the current time
    pub fn to_guide(&self) -> Guide {
        Guide {
            id: self.guide_id.clone(),
            metadata: self.metadata.clone(),
            steps: self.steps.clone(),
            last_modified: chrono::Utc::now().timestamp_millis(),
        }
    }
}
