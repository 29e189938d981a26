//! Brief exporters. Every format is derived purely from the brief Markdown.

mod pdf;
mod slides;

use crate::brief::BriefDocument;
use copilot_core::{CopilotError, CopilotResult};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

pub use pdf::render_pdf;
pub use slides::render_slides;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Markdown,
    Pdf,
    Slides,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [Self::Markdown, Self::Pdf, Self::Slides];

    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Markdown => "weekly_brief.md",
            Self::Pdf => "weekly_brief.pdf",
            Self::Slides => "weekly_brief.pptx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Markdown => "text/markdown",
            Self::Pdf => "application/pdf",
            Self::Slides => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Pdf => "pdf",
            Self::Slides => "pptx",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = CopilotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "md" | "markdown" => Ok(Self::Markdown),
            "pdf" => Ok(Self::Pdf),
            "pptx" | "slides" => Ok(Self::Slides),
            other => Err(CopilotError::Export(format!(
                "unsupported export format '{other}' (expected md, pdf or pptx)"
            ))),
        }
    }
}

/// A rendered file ready to be written to disk or streamed as a download.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub format: ExportFormat,
    pub file_name: &'static str,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

pub fn export_brief(brief: &BriefDocument, format: ExportFormat) -> CopilotResult<ExportedDocument> {
    let bytes = match format {
        ExportFormat::Markdown => brief.markdown.as_bytes().to_vec(),
        ExportFormat::Pdf => render_pdf(&brief.markdown),
        ExportFormat::Slides => render_slides(brief)?,
    };
    debug!(format = %format, size = bytes.len(), "Rendered brief export");

    Ok(ExportedDocument {
        format,
        file_name: format.file_name(),
        content_type: format.content_type(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use copilot_core::DateWindow;

    fn brief() -> BriefDocument {
        let end = NaiveDate::from_ymd_opt(2025, 9, 28).unwrap();
        BriefDocument {
            window: DateWindow::trailing(end, 7),
            markdown: "# Eloqua Performance Brief\n\n**Headlines**\n- One\n".to_string(),
        }
    }

    #[test]
    fn test_parse_formats() {
        assert_eq!("md".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert_eq!("PDF".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert_eq!("pptx".parse::<ExportFormat>().unwrap(), ExportFormat::Slides);
        assert!("docx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_markdown_export_is_brief_bytes() {
        let doc = export_brief(&brief(), ExportFormat::Markdown).unwrap();
        assert_eq!(doc.bytes, brief().markdown.as_bytes());
        assert_eq!(doc.file_name, "weekly_brief.md");
        assert_eq!(doc.content_type, "text/markdown");
    }

    #[test]
    fn test_every_format_renders() {
        for format in ExportFormat::ALL {
            let doc = export_brief(&brief(), format).unwrap();
            assert!(!doc.bytes.is_empty(), "{format} export was empty");
            assert!(doc.file_name.ends_with(format.extension()));
        }
    }
}
