use crate::document::{Node, NodeKind};
use crate::extraction::normalizer::normalize_whitespace;
use crate::extraction::LANGUAGE_ATTRIBUTES;

/// Local name of annotation elements
pub const NOTE_ELEMENT: &str = "note";

/// `type` value marking a note as a translation
pub const TRANSLATION_NOTE_TYPE: &str = "translation";

/// Language a translation note must declare
pub const TRANSLATION_LANGUAGE: &str = "en";

/// Translation text attached to `node`, or "" when there is none.
///
/// Only the nearest sibling that is not whitespace-only text is inspected. The
/// lookup never scans past it, so a note further away is never attached to the
/// wrong unit.
pub fn find_translation(node: Node<'_>) -> String {
    let nearest = node.following_siblings().find(|sibling| match sibling.kind() {
        NodeKind::Text(text) => !normalize_whitespace(text).is_empty(),
        _ => true,
    });

    nearest.and_then(translation_note_text).unwrap_or_default()
}

fn translation_note_text(candidate: Node<'_>) -> Option<String> {
    if candidate.local_name() != NOTE_ELEMENT {
        return None;
    }
    let note_type = candidate.attribute("type")?;
    let language = candidate.first_attribute(&LANGUAGE_ATTRIBUTES)?;
    if note_type != TRANSLATION_NOTE_TYPE || language != TRANSLATION_LANGUAGE {
        return None;
    }
    Some(normalize_whitespace(&candidate.text_content()))
}
