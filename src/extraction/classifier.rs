use crate::document::local_name;

/// Element whose subtree is metadata and never part of extracted content
pub const HEADER_ELEMENT: &str = "teiHeader";

// @const: Elements contributing nothing to enclosing text
const EXCLUDED_SUBTREES: [&str; 8] = ["note", "pb", "lb", "cb", "fw", "ref", "anchor", "milestone"];

// @const: Elements whose whole text forms one alignable unit
const TRANSLATABLE_UNITS: [&str; 5] = ["p", "l", "ab", "head", "seg"];

/// How the segment walk treats an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeClass {
    /// `teiHeader`: skipped together with its subtree
    Header,
    /// Excluded from text collection and from the walk
    Excluded,
    /// One segment; the walk stops here
    Translatable,
    /// Anything else; the walk descends into its children
    Container,
}

pub fn is_excluded_subtree(name: &str) -> bool {
    EXCLUDED_SUBTREES.contains(&local_name(name))
}

pub fn is_translatable(name: &str) -> bool {
    TRANSLATABLE_UNITS.contains(&local_name(name))
}

/// Classify an element by (possibly qualified) name
pub fn classify(name: &str) -> NodeClass {
    let name = local_name(name);
    if name == HEADER_ELEMENT {
        NodeClass::Header
    } else if is_excluded_subtree(name) {
        NodeClass::Excluded
    } else if is_translatable(name) {
        NodeClass::Translatable
    } else {
        NodeClass::Container
    }
}
