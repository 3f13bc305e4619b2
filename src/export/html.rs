//! Self-contained HTML document for a guide
//!
//! Images are embedded as data URIs so the file can be opened, mailed or
//! pasted without its assets. Step descriptions are already HTML fragments
//! and go in as-is; every other user string is escaped.

use std::fmt::Write;

use crate::domain::{ImageData, ProjectMetadata, Step};

/// Left padding per indentation level in the table of contents (px)
const TOC_INDENT_PX: u32 = 15;
/// Left margin per indentation level for step blocks (px)
const STEP_INDENT_PX: u32 = 20;

const STYLE: &str = "\
body { font-family: sans-serif; max-width: 800px; margin: 40px auto; color: #333; line-height: 1.6; }
h1 { font-size: 32px; border-bottom: 2px solid #eee; padding-bottom: 20px; color: #111; }
.meta { color: #666; font-size: 14px; margin-bottom: 40px; }
.step { margin-bottom: 60px; page-break-inside: avoid; }
.step h1, .step h2, .step h3, .step h4, .step h5, .step h6 { margin-bottom: 20px; color: #222; }
.step img { max-width: 100%; height: auto; border: 1px solid #eee; border-radius: 8px; box-shadow: 0 4px 6px rgba(0,0,0,0.1); margin-bottom: 20px; }
.step-desc { font-size: 16px; color: #444; background: #f9fafb; padding: 20px; border-radius: 8px; border-left: 4px solid #6366f1; }
.toc { background: #f8fafc; padding: 20px; border-radius: 12px; margin-bottom: 40px; }
.toc h3 { margin-top: 0; font-size: 14px; text-transform: uppercase; color: #64748b; letter-spacing: 1px; }
.toc ul { list-style: none; padding: 0; }
.toc li { margin-bottom: 8px; }
.toc a { text-decoration: none; color: #475569; font-weight: 500; }
.toc a:hover { color: #6366f1; }
";

/// Escape text for element content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Drop everything between `<` and `>`
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Render the whole guide.
///
/// `images[i]` is the composited image of `steps[i]`; a step without one
/// falls back to its raw screenshot.
pub fn render_document(
    metadata: &ProjectMetadata,
    steps: &[Step],
    images: &[ImageData],
    include_toc: bool,
) -> String {
    let title = escape_html(&metadata.title);
    let mut out = String::new();

    // fmt::Write into a String cannot fail
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
         <style>\n{STYLE}</style>\n</head>\n<body>\n<h1>{title}</h1>\n\
         <div class=\"meta\">Author: {} &bull; {}</div>\n",
        escape_html(&metadata.author),
        escape_html(&metadata.date),
    );

    if include_toc {
        out.push_str("<div class=\"toc\">\n<h3>Contents</h3>\n<ul>\n");
        for (i, step) in steps.iter().enumerate() {
            let _ = writeln!(
                out,
                "<li style=\"padding-left: {}px\"><a href=\"#step-{}\">{}. {}</a></li>",
                u32::from(step.indentation) * TOC_INDENT_PX,
                escape_html(step.id.as_str()),
                i + 1,
                escape_html(&step.title),
            );
        }
        out.push_str("</ul>\n</div>\n");
    }

    for (i, step) in steps.iter().enumerate() {
        let image = images.get(i).unwrap_or(&step.image);
        let tag = step.heading_level.tag();
        let step_title = escape_html(&step.title);
        let _ = write!(
            out,
            "<div class=\"step\" id=\"step-{}\" style=\"margin-left: {}px\">\n\
             <{tag}>{}. {step_title}</{tag}>\n\
             <img src=\"{}\" alt=\"{step_title}\" />\n\
             <div class=\"step-desc\">\n{}\n</div>\n</div>\n",
            escape_html(step.id.as_str()),
            u32::from(step.indentation) * STEP_INDENT_PX,
            i + 1,
            image.to_data_uri(),
            step.description,
        );
    }

    out.push_str("</body>\n</html>\n");
    out
}
