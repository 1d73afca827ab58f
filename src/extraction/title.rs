use crate::document::Node;
use crate::extraction::normalizer::normalize_whitespace;
use crate::extraction::LANGUAGE_ATTRIBUTES;

/// Shown when no title element has any text
pub const FALLBACK_TITLE: &str = "Untitled TEI";

// @const: Local name of title elements
const TITLE_ELEMENT: &str = "title";

// @const: Preferred title language (compared as a lower-cased prefix)
const PREFERRED_LANGUAGE_PREFIX: &str = "zh";

/// Pick a display title from every `title` element under `root`.
///
/// A non-empty Chinese-tagged title wins, then the first non-empty title of any
/// language, then [`FALLBACK_TITLE`].
pub fn resolve_title(root: Node<'_>) -> String {
    let titles: Vec<Node<'_>> = std::iter::once(root)
        .chain(root.descendants())
        .filter(|node| node.local_name() == TITLE_ELEMENT)
        .collect();

    let preferred = titles
        .iter()
        .filter(|title| has_preferred_language(title))
        .map(|title| normalize_whitespace(&title.text_content()))
        .find(|text| !text.is_empty());

    preferred
        .or_else(|| {
            titles
                .iter()
                .map(|title| normalize_whitespace(&title.text_content()))
                .find(|text| !text.is_empty())
        })
        .unwrap_or_else(|| FALLBACK_TITLE.to_string())
}

fn has_preferred_language(title: &Node<'_>) -> bool {
    title
        .first_attribute(&LANGUAGE_ATTRIBUTES)
        .is_some_and(|lang| lang.to_lowercase().starts_with(PREFERRED_LANGUAGE_PREFIX))
}
