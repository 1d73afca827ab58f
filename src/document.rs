/*!
 * Read-only XML document tree.
 *
 * The tree is built once from markup text with the `quick_xml` event reader and
 * is never mutated afterwards. Nodes live in a flat arena; every node records its
 * parent and its position in the parent's child list, so sibling access is a
 * positional lookup rather than a linked structure.
 */

use std::collections::HashMap;
use std::fmt;

use log::{debug, trace};
use once_cell::sync::Lazy;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;

use crate::errors::DocumentError;

/// Local name of the element holding the document's content
pub const BODY_ELEMENT: &str = "body";

/// Strip any namespace prefix from a qualified name (`tei:p` -> `p`)
pub fn local_name(qualified: &str) -> &str {
    qualified.rsplit(':').next().unwrap_or(qualified)
}

// @const: Internal general entity declaration with a quoted literal value
static ENTITY_DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<!ENTITY\s+([^\s%"'>]+)\s+(?:"([^"]*)"|'([^']*)')\s*>"#).unwrap()
});

// @const: Entities every XML document understands
const PREDEFINED_ENTITIES: [(&str, &str); 5] = [
    ("lt", "<"),
    ("gt", ">"),
    ("amp", "&"),
    ("apos", "'"),
    ("quot", "\""),
];

/// Named entities usable in text and attribute values.
///
/// Besides the predefined ones, general entities declared with a literal value
/// in the internal DTD subset are expanded as plain text. External and
/// parameter entities are not supported.
#[derive(Debug, Default)]
struct EntityTable {
    declared: HashMap<String, String>,
}

impl EntityTable {
    fn declare_from_doctype(&mut self, doctype: &str) {
        for caps in ENTITY_DECLARATION.captures_iter(doctype) {
            let raw = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
            let value = unescape(raw).map(|v| v.into_owned()).unwrap_or_else(|_| raw.to_string());
            // The first declaration of a name is binding
            self.declared.entry(caps[1].to_string()).or_insert(value);
        }
        debug!("DOCTYPE declares {} entities", self.declared.len());
    }

    fn resolve(&self, name: &str) -> Option<&str> {
        PREDEFINED_ENTITIES
            .iter()
            .find(|(predefined, _)| *predefined == name)
            .map(|(_, value)| *value)
            .or_else(|| self.declared.get(name).map(String::as_str))
    }
}

// @struct: Index of a node inside its document arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeId(usize);

const DOCUMENT_NODE: NodeId = NodeId(0);

/// A single `name="value"` pair, name kept exactly as written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Element payload: qualified tag name plus ordered attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<Attribute>,
}

impl Element {
    /// Tag name without namespace prefix
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Attribute lookup by exact (qualified or unqualified) name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }
}

/// What a node is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The synthetic document node owning the root element
    Document,
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
}

impl NodeKind {
    /// Short human-readable kind, used in error messages
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Element(_) => "element",
            Self::Text(_) => "text",
            Self::CData(_) => "character data",
            Self::Comment(_) => "comment",
            Self::ProcessingInstruction(_) => "processing instruction",
        }
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    position: usize,
    children: Vec<NodeId>,
}

/// Immutable parsed XML document
#[derive(Debug, Clone)]
pub struct XmlDocument {
    nodes: Vec<NodeData>,
}

impl XmlDocument {
    /// Parse markup text into a document tree.
    ///
    /// Whitespace-only text nodes are preserved, since sibling matching depends on
    /// them. A leading byte order mark is ignored. Entities declared in the
    /// internal DTD subset are expanded.
    pub fn parse(xml: &str) -> Result<Self, DocumentError> {
        let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut builder = TreeBuilder::new();
        let mut entities = EntityTable::default();

        loop {
            let event = reader.read_event().map_err(|e| {
                DocumentError::Parse(format!("{} at position {}", e, reader.buffer_position()))
            })?;

            match event {
                Event::Start(start) => builder.open_element(&start, &entities)?,
                Event::Empty(start) => {
                    builder.open_element(&start, &entities)?;
                    builder.close_element();
                }
                Event::End(_) => builder.close_element(),
                Event::Text(text) => {
                    let text = text.unescape_with(|name| entities.resolve(name)).map_err(|e| {
                        DocumentError::Parse(format!("{} at position {}", e, reader.buffer_position()))
                    })?;
                    builder.push_text(text.into_owned())?;
                }
                Event::CData(data) => {
                    builder.push_cdata(String::from_utf8_lossy(&data).into_owned())?;
                }
                Event::Comment(comment) => {
                    builder.push_leaf(NodeKind::Comment(String::from_utf8_lossy(&comment).into_owned()));
                }
                Event::PI(instruction) => {
                    builder.push_leaf(NodeKind::ProcessingInstruction(
                        String::from_utf8_lossy(&instruction).into_owned(),
                    ));
                }
                Event::DocType(doctype) => {
                    entities.declare_from_doctype(&String::from_utf8_lossy(&doctype));
                }
                Event::Decl(_) => {}
                Event::Eof => break,
            }
        }

        let document = builder.finish()?;
        trace!("Parsed XML document with {} nodes", document.nodes.len());
        Ok(document)
    }

    /// The document node (parent of the root element)
    pub fn root(&self) -> Node<'_> {
        Node { document: self, id: DOCUMENT_NODE }
    }

    /// The single top-level element
    pub fn document_element(&self) -> Option<Node<'_>> {
        self.root().children().find(|node| node.is_element())
    }

    /// First element in document order whose local name is `body`
    pub fn find_body(&self) -> Option<Node<'_>> {
        self.root()
            .descendants()
            .find(|node| node.is_element() && node.local_name() == BODY_ELEMENT)
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }
}

/// Borrowed, copyable view of one node in an [`XmlDocument`]
#[derive(Clone, Copy)]
pub struct Node<'a> {
    document: &'a XmlDocument,
    id: NodeId,
}

impl<'a> Node<'a> {
    pub fn kind(&self) -> &'a NodeKind {
        &self.document.data(self.id).kind
    }

    pub fn is_element(&self) -> bool {
        matches!(self.kind(), NodeKind::Element(_))
    }

    pub fn as_element(&self) -> Option<&'a Element> {
        match self.kind() {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Qualified tag name, `None` for non-elements
    pub fn name(&self) -> Option<&'a str> {
        self.as_element().map(|element| element.name.as_str())
    }

    /// Unqualified tag name, empty for non-elements
    pub fn local_name(&self) -> &'a str {
        self.as_element().map(Element::local_name).unwrap_or("")
    }

    /// Attribute value by exact name (`xml:lang`, `lang`, ...)
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.as_element().and_then(|element| element.attribute(name))
    }

    /// First non-empty value among `names`, in the given order of preference
    pub fn first_attribute(&self, names: &[&str]) -> Option<&'a str> {
        names
            .iter()
            .filter_map(|name| self.attribute(name))
            .find(|value| !value.is_empty())
    }

    /// Raw content of a text or CDATA node
    pub fn text(&self) -> Option<&'a str> {
        match self.kind() {
            NodeKind::Text(text) | NodeKind::CData(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn parent(&self) -> Option<Node<'a>> {
        self.document
            .data(self.id)
            .parent
            .map(|id| Node { document: self.document, id })
    }

    pub fn children(self) -> impl Iterator<Item = Node<'a>> {
        let document = self.document;
        document
            .data(self.id)
            .children
            .iter()
            .map(move |&id| Node { document, id })
    }

    pub fn next_sibling(&self) -> Option<Node<'a>> {
        self.following_siblings().next()
    }

    /// Siblings after this node, nearest first
    pub fn following_siblings(self) -> impl Iterator<Item = Node<'a>> {
        let document = self.document;
        let data = document.data(self.id);
        let siblings: &'a [NodeId] = match data.parent {
            Some(parent) => &document.data(parent).children[data.position + 1..],
            None => &[],
        };
        siblings.iter().map(move |&id| Node { document, id })
    }

    /// All nodes below this one in pre-order, excluding the node itself
    pub fn descendants(self) -> Descendants<'a> {
        let mut stack: Vec<NodeId> = self.document.data(self.id).children.clone();
        stack.reverse();
        Descendants { document: self.document, stack }
    }

    /// Concatenation of every text and CDATA descendant, without separators
    pub fn text_content(&self) -> String {
        if let Some(text) = self.text() {
            return text.to_string();
        }
        self.descendants().filter_map(|node| node.text()).collect()
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.document, other.document) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            NodeKind::Element(element) => write!(f, "<{}>#{}", element.name, self.id.0),
            other => write!(f, "{}#{}", other.describe(), self.id.0),
        }
    }
}

/// Pre-order iterator over a subtree
pub struct Descendants<'a> {
    document: &'a XmlDocument,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let children = &self.document.data(id).children;
        self.stack.extend(children.iter().rev().copied());
        Some(Node { document: self.document, id })
    }
}

struct TreeBuilder {
    nodes: Vec<NodeData>,
    open: Vec<NodeId>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Document,
                parent: None,
                position: 0,
                children: Vec::new(),
            }],
            open: vec![DOCUMENT_NODE],
        }
    }

    fn current(&self) -> NodeId {
        self.open.last().copied().unwrap_or(DOCUMENT_NODE)
    }

    fn at_document_level(&self) -> bool {
        self.open.len() <= 1
    }

    fn has_root(&self) -> bool {
        self.nodes[DOCUMENT_NODE.0]
            .children
            .iter()
            .any(|id| matches!(self.nodes[id.0].kind, NodeKind::Element(_)))
    }

    fn append(&mut self, kind: NodeKind) -> NodeId {
        let parent = self.current();
        let id = NodeId(self.nodes.len());
        let position = self.nodes[parent.0].children.len();
        self.nodes.push(NodeData {
            kind,
            parent: Some(parent),
            position,
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    fn open_element(&mut self, start: &BytesStart<'_>, entities: &EntityTable) -> Result<(), DocumentError> {
        let element = read_element(start, entities)?;
        if self.at_document_level() && self.has_root() {
            return Err(DocumentError::MultipleRoots(element.name));
        }
        let id = self.append(NodeKind::Element(element));
        self.open.push(id);
        Ok(())
    }

    fn close_element(&mut self) {
        if !self.at_document_level() {
            self.open.pop();
        }
    }

    fn push_text(&mut self, text: String) -> Result<(), DocumentError> {
        if self.at_document_level() {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(());
            }
            return Err(DocumentError::TextOutsideRoot(trimmed.to_string()));
        }
        if !text.is_empty() {
            self.append(NodeKind::Text(text));
        }
        Ok(())
    }

    fn push_cdata(&mut self, data: String) -> Result<(), DocumentError> {
        if self.at_document_level() {
            return Err(DocumentError::TextOutsideRoot(data));
        }
        self.append(NodeKind::CData(data));
        Ok(())
    }

    fn push_leaf(&mut self, kind: NodeKind) {
        self.append(kind);
    }

    fn finish(self) -> Result<XmlDocument, DocumentError> {
        if !self.at_document_level() {
            let name = match &self.nodes[self.current().0].kind {
                NodeKind::Element(element) => element.name.clone(),
                other => other.describe().to_string(),
            };
            return Err(DocumentError::UnclosedElement(name));
        }
        if !self.has_root() {
            return Err(DocumentError::MissingRoot);
        }
        Ok(XmlDocument { nodes: self.nodes })
    }
}

fn read_element(start: &BytesStart<'_>, entities: &EntityTable) -> Result<Element, DocumentError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| DocumentError::Parse(format!("bad attribute on <{}>: {}", name, e)))?;
        let value = attr
            .unescape_value_with(|name| entities.resolve(name))
            .map_err(|e| DocumentError::Parse(format!("bad attribute value on <{}>: {}", name, e)))?
            .into_owned();
        attributes.push(Attribute {
            name: String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            value,
        });
    }
    Ok(Element { name, attributes })
}
