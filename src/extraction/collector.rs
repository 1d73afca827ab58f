use crate::document::{Node, NodeKind};
use crate::extraction::classifier::is_excluded_subtree;

/// Gather the text under `node`, skipping excluded subtrees.
///
/// Text and CDATA contributions are joined with a single space; the caller is
/// expected to normalize the result. The walk uses an explicit stack, so nesting
/// depth is bounded by memory rather than by the thread's stack.
pub fn collect_text(node: Node<'_>) -> String {
    let mut chunks: Vec<&str> = Vec::new();
    let mut pending = vec![node];

    while let Some(current) = pending.pop() {
        match current.kind() {
            NodeKind::Text(text) | NodeKind::CData(text) => chunks.push(text),
            NodeKind::Element(element) if is_excluded_subtree(&element.name) => {}
            NodeKind::Element(_) | NodeKind::Document => {
                let children: Vec<Node<'_>> = current.children().collect();
                pending.extend(children.into_iter().rev());
            }
            NodeKind::Comment(_) | NodeKind::ProcessingInstruction(_) => {}
        }
    }

    chunks.join(" ")
}
