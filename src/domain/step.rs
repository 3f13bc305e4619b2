//! Steps, guides and projects

use serde::{Deserialize, Serialize};

use super::annotation::Annotation;
use super::id::{GuideId, ProjectId, StepId};
use super::image::ImageData;

/// Deepest nesting level of a step in the outline
pub const MAX_INDENTATION: u8 = 2;

/// Title shown while AI analysis of a new step is running
pub const PROCESSING_TITLE: &str = "Processing...";
/// Description shown while AI analysis of a new step is running
pub const PROCESSING_DESCRIPTION: &str = "Analyzing...";

/// Heading tag used for a step title in exported documents
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingLevel {
    H1,
    #[default]
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl HeadingLevel {
    /// HTML tag name, e.g. `h2`
    pub fn tag(self) -> &'static str {
        match self {
            HeadingLevel::H1 => "h1",
            HeadingLevel::H2 => "h2",
            HeadingLevel::H3 => "h3",
            HeadingLevel::H4 => "h4",
            HeadingLevel::H5 => "h5",
            HeadingLevel::H6 => "h6",
        }
    }
}

/// One screenshot plus its title, description and annotations
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: StepId,
    pub image: ImageData,
    pub title: String,
    /// Rich text (HTML fragment)
    pub description: String,
    #[serde(default)]
    pub heading_level: HeadingLevel,
    #[serde(default)]
    pub indentation: u8,
    /// Paint order: later entries are drawn on top
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub is_processing: bool,
}

impl Step {
    /// New step awaiting AI analysis
    pub fn new(image: ImageData) -> Self {
        Self {
            id: StepId::new(),
            image,
            title: PROCESSING_TITLE.to_string(),
            description: PROCESSING_DESCRIPTION.to_string(),
            heading_level: HeadingLevel::default(),
            indentation: 0,
            annotations: Vec::new(),
            is_processing: true,
        }
    }

    /// Set the outline level, clamped to `0..=MAX_INDENTATION`
    pub fn set_indentation(&mut self, level: i32) {
        self.indentation = level.clamp(0, MAX_INDENTATION as i32) as u8;
    }
}

/// Shared metadata of a guide
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub title: String,
    pub author: String,
    pub date: String,
}

impl Default for ProjectMetadata {
    fn default() -> Self {
        Self {
            title: "New Guide".to_string(),
            author: "Author".to_string(),
            date: chrono::Local::now().format("%Y-%m-%d").to_string(),
        }
    }
}

/// An ordered sequence of steps
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guide {
    pub id: GuideId,
    pub metadata: ProjectMetadata,
    pub steps: Vec<Step>,
    /// Epoch milliseconds
    pub last_modified: i64,
}

impl Guide {
    pub fn new(metadata: ProjectMetadata) -> Self {
        Self {
            id: GuideId::new(),
            metadata,
            steps: Vec::new(),
            last_modified: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn step(&self, id: &StepId) -> Option<&Step> {
        self.steps.iter().find(|s| &s.id == id)
    }
}

/// A named collection of guides
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    #[serde(default)]
    pub guide_ids: Vec<GuideId>,
    pub last_modified: i64,
}

impl Project {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: ProjectId::new(),
            title: title.into(),
            guide_ids: Vec::new(),
            last_modified: chrono::Utc::now().timestamp_millis(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_image() -> ImageData {
        ImageData::from_rgba(&image::RgbaImage::new(2, 2)).unwrap()
    }

    #[test]
    fn test_indentation_is_clamped() {
        let mut step = Step::new(tiny_image());
        step.set_indentation(5);
        assert_eq!(step.indentation, 2);
        step.set_indentation(-1);
        assert_eq!(step.indentation, 0);
    }

    #[test]
    fn test_step_json_uses_camel_case() {
        let step = Step::new(tiny_image());
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["headingLevel"], "h2");
        assert_eq!(json["isProcessing"], true);
        let back: Step = serde_json::from_value(json).unwrap();
        assert_eq!(back, step);
    }

    #[test]
    fn test_heading_tag() {
        assert_eq!(HeadingLevel::H4.tag(), "h4");
        assert_eq!(HeadingLevel::default().tag(), "h2");
    }
}
