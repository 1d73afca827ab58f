/*!
 * Presentation of loaded documents.
 *
 * Documents are rendered as a header, one block per segment and a footer. The
 * same pieces back both the all-at-once and the batched renderer, so their output
 * is byte-identical.
 */

use anyhow::{anyhow, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::str::FromStr;

use crate::extraction::Segment;
use crate::viewer::LoadedDocument;

/// Output format of the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text blocks for terminal reading
    #[default]
    Text,
    /// Markdown with one section per segment
    Markdown,
    /// A single JSON object, segments in document order
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Markdown => "markdown",
            Self::Json => "json",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            _ => Err(anyhow!("Invalid output format: {}", s)),
        }
    }
}

/// Display toggles and placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub show_source: bool,
    pub show_translation: bool,
    pub empty_source_placeholder: String,
    pub missing_translation_placeholder: String,
    /// Segments per batch in progressive rendering
    pub batch_size: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_source: true,
            show_translation: true,
            empty_source_placeholder: "(empty)".to_string(),
            missing_translation_placeholder: "(no translation note found)".to_string(),
            batch_size: 80,
        }
    }
}

impl RenderOptions {
    fn source_text<'a>(&'a self, segment: &'a Segment) -> &'a str {
        if segment.source.is_empty() {
            &self.empty_source_placeholder
        } else {
            &segment.source
        }
    }

    fn translation_text<'a>(&'a self, segment: &'a Segment) -> &'a str {
        if segment.translation.is_empty() {
            &self.missing_translation_placeholder
        } else {
            &segment.translation
        }
    }
}

/// A slice of consecutive segments handed out by [`batches`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch<'a> {
    pub segments: &'a [Segment],
    /// Index of the first segment of this batch
    pub offset: usize,
    /// Segments rendered once this batch is done
    pub end: usize,
    pub total: usize,
}

/// Split `segments` into batches of at most `batch_size` (minimum 1)
pub fn batches(segments: &[Segment], batch_size: usize) -> impl Iterator<Item = Batch<'_>> {
    let size = batch_size.max(1);
    let total = segments.len();
    segments.chunks(size).enumerate().map(move |(n, chunk)| {
        let offset = n * size;
        Batch {
            segments: chunk,
            offset,
            end: offset + chunk.len(),
            total,
        }
    })
}

/// Render one segment; `index` is its 0-based position in the document
pub fn render_segment(segment: &Segment, index: usize, options: &RenderOptions, format: OutputFormat) -> Result<String> {
    let mut out = String::new();
    match format {
        OutputFormat::Text => {
            out.push_str(&format!("[{}]\n", segment.id));
            if options.show_source {
                out.push_str(&format!("  original:    {}\n", options.source_text(segment)));
            }
            if options.show_translation {
                out.push_str(&format!("  translation: {}\n", options.translation_text(segment)));
            }
            out.push('\n');
        }
        OutputFormat::Markdown => {
            out.push_str(&format!("## Segment {} ({})\n", index + 1, segment.id));
            if options.show_source {
                out.push_str(&format!("**Original:** {}\n\n", options.source_text(segment)));
            }
            if options.show_translation {
                out.push_str(&format!("**English:** {}\n\n", options.translation_text(segment)));
            }
            out.push_str("---\n\n");
        }
        OutputFormat::Json => {
            if index > 0 {
                out.push(',');
            }
            out.push_str(&serde_json::to_string(segment)?);
        }
    }
    Ok(out)
}

fn render_header(document: &LoadedDocument, format: OutputFormat) -> Result<String> {
    let count = document.segments.len();
    let header = match format {
        OutputFormat::Text => format!(
            "Title: {}\nFile: {}\nSegments: {}\n\n",
            document.title, document.key, count
        ),
        OutputFormat::Markdown => format!(
            "# {}\n\n_File: {} · Segments: {}_\n\n",
            document.title, document.key, count
        ),
        OutputFormat::Json => format!(
            "{{\"key\":{},\"title\":{},\"segments\":[",
            serde_json::to_string(&document.key)?,
            serde_json::to_string(&document.title)?
        ),
    };
    Ok(header)
}

fn render_footer(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Json => "]}\n",
        OutputFormat::Text | OutputFormat::Markdown => "",
    }
}

/// Render a whole document in one go.
///
/// Display toggles and placeholders apply to text and Markdown; JSON always
/// carries the raw segment data.
pub fn render_document(document: &LoadedDocument, options: &RenderOptions, format: OutputFormat) -> Result<String> {
    let mut out = render_header(document, format)?;
    for (index, segment) in document.segments.iter().enumerate() {
        out.push_str(&render_segment(segment, index, options, format)?);
    }
    out.push_str(render_footer(format));
    Ok(out)
}

/// Write a document batch by batch, yielding to the runtime between batches
pub async fn render_progressively<W: Write>(
    document: &LoadedDocument,
    options: &RenderOptions,
    format: OutputFormat,
    writer: &mut W,
) -> Result<()> {
    writer.write_all(render_header(document, format)?.as_bytes())?;

    for batch in batches(&document.segments, options.batch_size) {
        let mut chunk = String::new();
        for (i, segment) in batch.segments.iter().enumerate() {
            chunk.push_str(&render_segment(segment, batch.offset + i, options, format)?);
        }
        writer.write_all(chunk.as_bytes())?;
        debug!("Rendering segments {}/{} ...", batch.end, batch.total);
        tokio::task::yield_now().await;
    }

    writer.write_all(render_footer(format).as_bytes())?;
    writer.flush()?;
    Ok(())
}
