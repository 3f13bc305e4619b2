//! System clipboard output

use crate::error::ExportError;

/// Rich clipboard content with a plain-text alternative
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClipboardPayload {
    pub html: String,
    pub text: String,
}

/// Put `payload` on the system clipboard as `text/html` + `text/plain`
pub fn write_clipboard(payload: &ClipboardPayload) -> Result<(), ExportError> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| ExportError::Clipboard(e.to_string()))?;
    clipboard
        .set_html(payload.html.as_str(), Some(payload.text.as_str()))
        .map_err(|e| {
            log::error!("Copy failed: {e}");
            ExportError::Clipboard(e.to_string())
        })?;
    // Keep the clipboard owner alive briefly so managers can take the data
    std::thread::sleep(std::time::Duration::from_millis(100));
    Ok(())
}
