use log::debug;
use serde::{Deserialize, Serialize};

use crate::document::Node;
use crate::errors::ExtractionError;
use crate::extraction::classifier::{classify, NodeClass};
use crate::extraction::collector::collect_text;
use crate::extraction::matcher::find_translation;
use crate::extraction::normalizer::normalize_whitespace;

/// Attributes carrying an element's identity, most specific first
const IDENTITY_ATTRIBUTES: [&str; 2] = ["xml:id", "id"];

// @const: Prefix of positional ids for elements without identity
const SYNTHETIC_ID_PREFIX: &str = "seg-";

/// One aligned unit: source passage plus its (possibly empty) translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    // @field: Identity attribute or positional `seg-<n>`
    pub id: String,

    // @field: Normalized source text, never empty
    pub source: String,

    // @field: Normalized translation, "" when none matched
    pub translation: String,
}

impl Segment {
    pub fn new(id: impl Into<String>, source: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            translation: translation.into(),
        }
    }

    pub fn has_translation(&self) -> bool {
        !self.translation.is_empty()
    }
}

/// Number of segments with a matched translation
pub fn translated_count(segments: &[Segment]) -> usize {
    segments.iter().filter(|s| s.has_translation()).count()
}

/// Share of `segments` with a translation, as a percentage.
///
/// An empty sequence counts as fully covered.
pub fn translation_coverage(segments: &[Segment]) -> f32 {
    if segments.is_empty() {
        return 100.0;
    }
    (translated_count(segments) as f32 / segments.len() as f32) * 100.0
}

/// Walk `body` in document order and emit one segment per non-empty
/// translatable element.
///
/// Header and excluded subtrees are skipped without descending; translatable
/// elements are not searched for nested units. Fails only when `body` is not
/// an element.
pub fn extract_segments(body: Node<'_>) -> Result<Vec<Segment>, ExtractionError> {
    if !body.is_element() {
        return Err(ExtractionError::InvalidInput(body.kind().describe().to_string()));
    }

    let mut segments: Vec<Segment> = Vec::new();
    let mut pending = vec![body];

    while let Some(node) = pending.pop() {
        let Some(element) = node.as_element() else {
            continue;
        };

        match classify(&element.name) {
            NodeClass::Header | NodeClass::Excluded => {}
            NodeClass::Translatable => {
                let source = normalize_whitespace(&collect_text(node));
                if source.is_empty() {
                    continue;
                }
                let id = segment_id(node, segments.len() + 1);
                let translation = find_translation(node);
                segments.push(Segment { id, source, translation });
            }
            NodeClass::Container => {
                let children: Vec<Node<'_>> = node.children().filter(|child| child.is_element()).collect();
                pending.extend(children.into_iter().rev());
            }
        }
    }

    debug!("Extracted {} segments", segments.len());
    Ok(segments)
}

fn segment_id(node: Node<'_>, position: usize) -> String {
    match node.first_attribute(&IDENTITY_ATTRIBUTES) {
        Some(id) => id.to_string(),
        None => format!("{}{}", SYNTHETIC_ID_PREFIX, position),
    }
}
