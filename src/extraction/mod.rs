/*!
 * Aligned segment extraction for TEI documents.
 *
 * This module turns a parsed TEI tree into an ordered list of source/translation
 * pairs plus a display title. It is split into several submodules:
 *
 * - `normalizer`: whitespace normalization applied to every surfaced string
 * - `classifier`: element classification by local name
 * - `collector`: exclusion-aware subtree text accumulation
 * - `matcher`: adjacent translation note lookup
 * - `segments`: the body walk producing `Segment`s
 * - `title`: display title selection
 *
 * Everything here is synchronous and side-effect free.
 */

use serde::{Deserialize, Serialize};

use crate::document::XmlDocument;
use crate::errors::DocumentError;

// Re-export main types for easier usage
pub use self::classifier::{classify, is_excluded_subtree, is_translatable, NodeClass};
pub use self::collector::collect_text;
pub use self::matcher::find_translation;
pub use self::normalizer::{normalize_optional, normalize_whitespace};
pub use self::segments::{extract_segments, translated_count, translation_coverage, Segment};
pub use self::title::{resolve_title, FALLBACK_TITLE};

// Submodules
pub mod classifier;
pub mod collector;
pub mod matcher;
pub mod normalizer;
pub mod segments;
pub mod title;

/// Attributes carrying an element's language, most specific first
pub(crate) const LANGUAGE_ATTRIBUTES: [&str; 2] = ["xml:lang", "lang"];

/// Title and aligned segments of one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub title: String,
    pub segments: Vec<Segment>,
}

impl ExtractionResult {
    pub fn translated_count(&self) -> usize {
        translated_count(&self.segments)
    }

    pub fn translation_coverage(&self) -> f32 {
        translation_coverage(&self.segments)
    }
}

/// Locate the body, extract its segments and resolve the title
pub fn extract_document(document: &XmlDocument) -> Result<ExtractionResult, DocumentError> {
    let body = document.find_body().ok_or(DocumentError::MissingBody)?;
    let segments = extract_segments(body)?;
    let title = resolve_title(document.root());
    Ok(ExtractionResult { title, segments })
}
