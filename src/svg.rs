//! SVG markup parsing
//!
//! Turns icon markup into a small DOM. Markup that opens with `<svg`
//! is parsed as a document, with the SVG namespace injected into the
//! opening tag when missing. Anything else is treated as a fragment:
//! it is wrapped in a synthetic namespaced root for parsing and
//! unwrapped afterwards, so callers never see the wrapper.

use std::borrow::Cow;

use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

/// XML namespace of SVG documents
pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

const SVG_START: &str = r#"<svg xmlns="http://www.w3.org/2000/svg""#;

/// Problems turning markup into a DOM
#[derive(Debug, Error)]
pub enum SvgError {
    /// Markup failed XML parsing
    #[error("malformed markup: {0}")]
    Malformed(#[from] quick_xml::Error),
    /// An attribute list failed parsing
    #[error("malformed attribute: {0}")]
    Attribute(#[from] AttrError),
    /// Input ended with elements still open
    #[error("markup ends inside an unclosed element")]
    Truncated,
    /// A closing tag appeared without a matching open tag
    #[error("unmatched closing tag")]
    UnmatchedClosingTag,
    /// The document did not reduce to a single root element
    #[error("expected a single root element")]
    InvalidRoot,
}

/// An element with attributes and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvgElement {
    /// Tag name as written, prefix included
    pub name: String,
    /// Attributes in document order
    pub attributes: Vec<(String, String)>,
    /// Child nodes in document order
    pub children: Vec<SvgNode>,
}

impl SvgElement {
    /// Look up an attribute value by name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// A node in parsed markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SvgNode {
    /// An element
    Element(SvgElement),
    /// Character data, entities resolved
    Text(String),
}

/// Result of [`parse`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SvgDom {
    /// Markup that carried its own `<svg>` root
    Document(SvgElement),
    /// Loose markup, returned without the synthetic root
    Fragment(Vec<SvgNode>),
}

/// Parse SVG markup into a DOM
pub fn parse(markup: &str) -> Result<SvgDom, SvgError> {
    let mut unwrap = false;

    let source = if markup.starts_with("<svg") {
        if markup.contains(SVG_NS) {
            Cow::Borrowed(markup)
        } else {
            Cow::Owned(format!("{}{}", SVG_START, &markup[4..]))
        }
    } else {
        unwrap = true;
        Cow::Owned(format!("{}>{}</svg>", SVG_START, markup))
    };

    let mut nodes = parse_nodes(&source)?;
    let root = match nodes.pop() {
        Some(SvgNode::Element(root)) if nodes.is_empty() => root,
        _ => return Err(SvgError::InvalidRoot),
    };

    if unwrap {
        Ok(SvgDom::Fragment(root.children))
    } else {
        Ok(SvgDom::Document(root))
    }
}

/// Checks whether a string parses as SVG markup
///
/// A format sniff, not a sanitizer: the parse must succeed and the
/// first node of the result must be an element. Malicious but
/// well-formed markup still passes.
pub fn is_valid_svg(markup: &str) -> bool {
    match parse(markup) {
        Ok(SvgDom::Document(_)) => true,
        Ok(SvgDom::Fragment(nodes)) => matches!(nodes.first(), Some(SvgNode::Element(_))),
        Err(_) => false,
    }
}

fn parse_nodes(source: &str) -> Result<Vec<SvgNode>, SvgError> {
    let mut reader = Reader::from_str(source);
    let mut stack: Vec<SvgElement> = Vec::new();
    let mut top_level: Vec<SvgNode> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                stack.push(element_from(&reader, &start)?);
            }
            Event::Empty(start) => {
                let element = element_from(&reader, &start)?;
                append(&mut stack, &mut top_level, SvgNode::Element(element));
            }
            Event::End(_) => match stack.pop() {
                Some(element) => {
                    append(&mut stack, &mut top_level, SvgNode::Element(element));
                }
                None => return Err(SvgError::UnmatchedClosingTag),
            },
            Event::Text(text) => {
                let content = text.unescape()?.into_owned();
                // whitespace after the root element is not part of the
                // document
                if stack.is_empty() && content.trim().is_empty() {
                    continue;
                }
                append(&mut stack, &mut top_level, SvgNode::Text(content));
            }
            Event::CData(cdata) => {
                let content = reader.decoder().decode(&cdata)?.into_owned();
                append(&mut stack, &mut top_level, SvgNode::Text(content));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.is_empty() {
        Ok(top_level)
    } else {
        Err(SvgError::Truncated)
    }
}

fn append(stack: &mut Vec<SvgElement>, top_level: &mut Vec<SvgNode>, node: SvgNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => top_level.push(node),
    }
}

fn element_from(reader: &Reader<&[u8]>, start: &BytesStart<'_>) -> Result<SvgElement, SvgError> {
    let decoder = reader.decoder();
    let name = decoder.decode(start.name().as_ref())?.into_owned();

    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute?;
        let key = decoder.decode(attribute.key.as_ref())?.into_owned();
        let value = attribute.unescape_value()?.into_owned();
        attributes.push((key, value));
    }

    Ok(SvgElement {
        name,
        attributes,
        children: Vec::new(),
    })
}
