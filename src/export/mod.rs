//! Guide export
//!
//! This module contains:
//! - HTML document rendering (html.rs)
//! - Clipboard output (clipboard.rs)
//! - `GuideExport`, which composites every step once and produces the
//!   HTML, Word-compatible and clipboard forms of the guide

pub mod clipboard;
pub mod html;

use std::path::{Path, PathBuf};

use crate::domain::{ImageData, ProjectMetadata, Step};
use crate::error::ExportError;
use crate::render::CompositeCache;
use crate::session::GuideSession;

pub use clipboard::{ClipboardPayload, write_clipboard};
pub use html::render_document;

pub const HTML_MIME: &str = "text/html";
/// Word opens HTML served under this type
pub const DOC_MIME: &str = "application/msword";

const UTF8_BOM: &[u8] = "\u{feff}".as_bytes();

/// A guide with its composited step images, ready to serialize
#[derive(Clone, Debug)]
pub struct GuideExport {
    metadata: ProjectMetadata,
    steps: Vec<Step>,
    images: Vec<ImageData>,
    include_toc: bool,
}

impl GuideExport {
    /// Composite every step through `cache`
    pub fn new(
        metadata: ProjectMetadata,
        steps: Vec<Step>,
        cache: &mut CompositeCache,
        include_toc: bool,
    ) -> Self {
        let images = steps.iter().map(|s| cache.get_or_render(s)).collect();
        Self {
            metadata,
            steps,
            images,
            include_toc,
        }
    }

    /// Like `new`, compositing stale steps concurrently first
    pub async fn prepare(
        metadata: ProjectMetadata,
        steps: Vec<Step>,
        cache: &mut CompositeCache,
        include_toc: bool,
    ) -> Self {
        cache.refresh_all(&steps).await;
        Self::new(metadata, steps, cache, include_toc)
    }

    pub fn from_session(session: &GuideSession, cache: &mut CompositeCache, include_toc: bool) -> Self {
        Self::new(
            session.metadata.clone(),
            session.steps().to_vec(),
            cache,
            include_toc,
        )
    }

    pub fn html(&self) -> String {
        render_document(&self.metadata, &self.steps, &self.images, self.include_toc)
    }

    /// HTML with a UTF-8 byte order mark, served as `DOC_MIME`
    pub fn doc_bytes(&self) -> Vec<u8> {
        let html = self.html();
        let mut bytes = Vec::with_capacity(UTF8_BOM.len() + html.len());
        bytes.extend_from_slice(UTF8_BOM);
        bytes.extend_from_slice(html.as_bytes());
        bytes
    }

    /// Title, blank line, then each step's title and tag-stripped description
    pub fn plain_text(&self) -> String {
        let body = self
            .steps
            .iter()
            .map(|s| format!("{}\n{}", s.title, html::strip_tags(&s.description)))
            .collect::<Vec<_>>()
            .join("\n\n");
        format!("{}\n\n{}", self.metadata.title, body)
    }

    pub fn clipboard_payload(&self) -> ClipboardPayload {
        ClipboardPayload {
            html: self.html(),
            text: self.plain_text(),
        }
    }

    /// Title with every non-alphanumeric replaced by `_`, lowercased
    pub fn file_stem(&self) -> String {
        self.metadata
            .title
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect()
    }

    /// Write `<stem>.html` into `dir`
    pub fn write_html(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let path = dir.join(format!("{}.html", self.file_stem()));
        std::fs::write(&path, self.html())?;
        log::info!("Exported guide to {}", path.display());
        Ok(path)
    }

    /// Write `<stem>.doc` into `dir`
    pub fn write_doc(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let path = dir.join(format!("{}.doc", self.file_stem()));
        std::fs::write(&path, self.doc_bytes())?;
        log::info!("Exported guide to {}", path.display());
        Ok(path)
    }
}
