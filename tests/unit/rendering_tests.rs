/*!
 * Tests for document rendering
 */

use std::str::FromStr;

use anyhow::Result;
use tei_align::extraction::Segment;
use tei_align::rendering::{batches, render_document, render_progressively, render_segment, OutputFormat, RenderOptions};
use tei_align::viewer::LoadedDocument;

fn sample_document(count: usize) -> LoadedDocument {
    let segments = (1..=count)
        .map(|n| {
            let translation = if n % 2 == 0 { format!("translation {}", n) } else { String::new() };
            Segment::new(format!("seg-{}", n), format!("source {}", n), translation)
        })
        .collect();
    LoadedDocument {
        key: "juan1.xml".to_string(),
        title: "千字文".to_string(),
        segments,
    }
}

#[test]
fn test_outputFormat_fromStr_shouldAcceptAliases() {
    assert_eq!(OutputFormat::from_str("md").unwrap(), OutputFormat::Markdown);
    assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
    assert_eq!(OutputFormat::from_str("txt").unwrap(), OutputFormat::Text);
    assert!(OutputFormat::from_str("html").is_err());
    assert_eq!(OutputFormat::Markdown.to_string(), "markdown");
}

#[test]
fn test_batches_shouldCoverAllSegmentsInOrder() {
    let document = sample_document(7);
    let parts: Vec<_> = batches(&document.segments, 3).collect();

    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0].offset, 0);
    assert_eq!(parts[2].offset, 6);
    assert_eq!(parts[2].end, 7);
    assert!(parts.iter().all(|batch| batch.total == 7));
    assert_eq!(parts.iter().map(|b| b.segments.len()).sum::<usize>(), 7);
}

#[test]
fn test_batches_withZeroSize_shouldUseOne() {
    let document = sample_document(2);
    assert_eq!(batches(&document.segments, 0).count(), 2);
}

#[test]
fn test_renderSegment_text_shouldUsePlaceholders() -> Result<()> {
    let options = RenderOptions::default();
    let rendered = render_segment(&Segment::new("a", "天地", ""), 0, &options, OutputFormat::Text)?;

    assert_eq!(
        rendered,
        "[a]\n  original:    天地\n  translation: (no translation note found)\n\n"
    );
    Ok(())
}

#[test]
fn test_renderSegment_withEmptySource_shouldShowEmptyPlaceholder() -> Result<()> {
    let options = RenderOptions::default();
    let rendered = render_segment(&Segment::new("a", "", "x"), 0, &options, OutputFormat::Text)?;
    assert!(rendered.contains("original:    (empty)"));
    Ok(())
}

#[test]
fn test_renderSegment_withToggles_shouldHideColumns() -> Result<()> {
    let options = RenderOptions {
        show_translation: false,
        ..RenderOptions::default()
    };
    let segment = Segment::new("a", "src", "tr");

    let text = render_segment(&segment, 0, &options, OutputFormat::Text)?;
    assert!(text.contains("src"));
    assert!(!text.contains("translation:"));

    let hidden_source = RenderOptions {
        show_source: false,
        ..RenderOptions::default()
    };
    let markdown = render_segment(&segment, 4, &hidden_source, OutputFormat::Markdown)?;
    assert_eq!(markdown, "## Segment 5 (a)\n**English:** tr\n\n---\n\n");
    Ok(())
}

#[test]
fn test_renderDocument_json_shouldBeValidJson() -> Result<()> {
    let document = sample_document(3);
    let rendered = render_document(&document, &RenderOptions::default(), OutputFormat::Json)?;

    let value: serde_json::Value = serde_json::from_str(&rendered)?;
    assert_eq!(value["key"], "juan1.xml");
    assert_eq!(value["title"], "千字文");
    assert_eq!(value["segments"].as_array().map(|s| s.len()), Some(3));
    assert_eq!(value["segments"][1]["translation"], "translation 2");
    assert_eq!(value["segments"][0]["translation"], "");
    Ok(())
}

#[test]
fn test_renderDocument_markdown_shouldStartWithTitle() -> Result<()> {
    let document = sample_document(1);
    let rendered = render_document(&document, &RenderOptions::default(), OutputFormat::Markdown)?;
    assert!(rendered.starts_with("# 千字文\n\n"));
    assert!(rendered.contains("Segments: 1"));
    Ok(())
}

#[tokio::test]
async fn test_renderProgressively_shouldMatchRenderDocument() -> Result<()> {
    let document = sample_document(181);
    let options = RenderOptions {
        batch_size: 80,
        ..RenderOptions::default()
    };

    for format in [OutputFormat::Text, OutputFormat::Markdown, OutputFormat::Json] {
        let expected = render_document(&document, &options, format)?;
        let mut buffer: Vec<u8> = Vec::new();
        render_progressively(&document, &options, format, &mut buffer).await?;
        assert_eq!(String::from_utf8(buffer)?, expected, "format {}", format);
    }
    Ok(())
}

#[tokio::test]
async fn test_renderProgressively_withEmptyDocument_shouldWriteHeaderOnly() -> Result<()> {
    let document = sample_document(0);
    let mut buffer: Vec<u8> = Vec::new();
    render_progressively(&document, &RenderOptions::default(), OutputFormat::Json, &mut buffer).await?;
    assert_eq!(String::from_utf8(buffer)?, "{\"key\":\"juan1.xml\",\"title\":\"千字文\",\"segments\":[]}\n");
    Ok(())
}
