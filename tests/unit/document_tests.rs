/*!
 * Tests for XML document tree construction
 */

use tei_align::document::{local_name, NodeKind, XmlDocument};
use tei_align::errors::DocumentError;
use tei_align::extraction::extract_document;

#[test]
fn test_parse_withBom_shouldIgnoreIt() {
    let doc = XmlDocument::parse("\u{feff}<TEI><text><body/></text></TEI>").unwrap();
    assert_eq!(doc.document_element().unwrap().local_name(), "TEI");
}

#[test]
fn test_parse_withEntities_shouldUnescapeTextAndAttributes() {
    let doc = XmlDocument::parse(r#"<r a="x &amp; y">1 &lt; 2</r>"#).unwrap();
    let root = doc.document_element().unwrap();
    assert_eq!(root.attribute("a"), Some("x & y"));
    assert_eq!(root.text_content(), "1 < 2");
}

#[test]
fn test_parse_withCData_shouldKeepCDataNode() {
    let doc = XmlDocument::parse("<r><![CDATA[a <b>]]></r>").unwrap();
    let child = doc.document_element().unwrap().children().next().unwrap();
    assert!(matches!(child.kind(), NodeKind::CData(_)));
    assert_eq!(child.text(), Some("a <b>"));
}

#[test]
fn test_parse_withTwoRoots_shouldFail() {
    let result = XmlDocument::parse("<a/><b/>");
    assert!(matches!(result, Err(DocumentError::MultipleRoots(name)) if name == "b"));
}

#[test]
fn test_parse_withTextOutsideRoot_shouldFail() {
    let result = XmlDocument::parse("<a/>stray");
    assert!(matches!(result, Err(DocumentError::TextOutsideRoot(text)) if text == "stray"));
}

#[test]
fn test_parse_withUnclosedElement_shouldFail() {
    let result = XmlDocument::parse("<a><b>");
    assert!(matches!(result, Err(DocumentError::UnclosedElement(_))));
}

#[test]
fn test_parse_withMismatchedEndTag_shouldFail() {
    let result = XmlDocument::parse("<a><b></a>");
    assert!(matches!(result, Err(DocumentError::Parse(_))));
}

#[test]
fn test_parse_withDeclarationAndComments_shouldKeepSingleRoot() {
    let doc = XmlDocument::parse("<?xml version=\"1.0\"?>\n<!-- c --><r/>\n<!-- d -->").unwrap();
    let kinds: Vec<&str> = doc.root().children().map(|node| node.kind().describe()).collect();
    assert_eq!(kinds, vec!["comment", "element", "comment"]);
    assert_eq!(doc.document_element().unwrap().local_name(), "r");
}

#[test]
fn test_findBody_withPrefixedName_shouldMatchLocalName() {
    let doc = XmlDocument::parse(r#"<tei:TEI xmlns:tei="x"><tei:text><tei:body/></tei:text></tei:TEI>"#).unwrap();
    let body = doc.find_body().unwrap();
    assert_eq!(body.name(), Some("tei:body"));
    assert_eq!(local_name(body.name().unwrap()), "body");
}

#[test]
fn test_descendants_shouldYieldPreOrder() {
    let doc = XmlDocument::parse("<r><a><b/></a><c/></r>").unwrap();
    let names: Vec<&str> = doc
        .document_element()
        .unwrap()
        .descendants()
        .map(|node| node.local_name())
        .collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[test]
fn test_firstAttribute_withEmptyPreferred_shouldFallBack() {
    let doc = XmlDocument::parse(r#"<r xml:lang="" lang="en"/>"#).unwrap();
    let root = doc.document_element().unwrap();
    assert_eq!(root.first_attribute(&["xml:lang", "lang"]), Some("en"));
    assert_eq!(root.first_attribute(&["missing"]), None);
}

#[test]
fn test_extractDocument_withoutBody_shouldReportMissingBody() {
    let doc = XmlDocument::parse("<TEI><text><div><p>x</p></div></text></TEI>").unwrap();
    assert_eq!(extract_document(&doc), Err(DocumentError::MissingBody));
}

#[test]
fn test_parse_withInternalSubsetEntities_shouldExpandThem() {
    let xml = r#"<!DOCTYPE TEI [
        <!ENTITY ed "Kangxi edition">
        <!ENTITY sep '&#x3001;'>
        <!ENTITY ed "ignored redefinition">
    ]>
    <TEI source="&ed;"><p>天&sep;地 &amp; &ed;</p></TEI>"#;

    let doc = XmlDocument::parse(xml).unwrap();
    let root = doc.document_element().unwrap();

    assert_eq!(root.attribute("source"), Some("Kangxi edition"));
    assert_eq!(root.text_content(), "天、地 & Kangxi edition");
}

#[test]
fn test_parse_withUndeclaredEntity_shouldFail() {
    let result = XmlDocument::parse("<!DOCTYPE r [<!ENTITY e \"v\">]><r>&other;</r>");
    assert!(matches!(result, Err(DocumentError::Parse(_))));
}

#[test]
fn test_parse_withExternalEntity_shouldNotExpandIt() {
    let result = XmlDocument::parse(r#"<!DOCTYPE r [<!ENTITY ext SYSTEM "other.xml">]><r>&ext;</r>"#);
    assert!(matches!(result, Err(DocumentError::Parse(_))));
}
