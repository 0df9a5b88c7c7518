use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::core::NfceError;

/// An owned XML element: qualified name, attributes and children in document
/// order, plus its concatenated (trimmed) text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
    text: String,
}

/// Outcome of a child lookup. A miss is an explicit variant so every caller
/// has to decide what an absent element means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    Found(&'a XmlNode),
    Missing,
}

/// Whether a qualified tag name has the given local name.
///
/// Namespace decoration is ignored in both forms, `prefix:name` and
/// `{uri}name`. Comparison is case-insensitive.
pub fn local_name_matches(qualified: &str, wanted: &str) -> bool {
    let after_colon = qualified.rsplit(':').next().unwrap_or(qualified);
    let after_brace = qualified.rsplit('}').next().unwrap_or(qualified);
    after_colon.eq_ignore_ascii_case(wanted) || after_brace.eq_ignore_ascii_case(wanted)
}

impl XmlNode {
    /// Qualified name as written in the document.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// All child elements in document order.
    pub fn elements(&self) -> &[XmlNode] {
        &self.children
    }

    pub fn has_local_name(&self, local_name: &str) -> bool {
        local_name_matches(&self.name, local_name)
    }

    /// True when the element has neither children nor attributes.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.attributes.is_empty()
    }

    /// First child with the given local name.
    pub fn child(&self, local_name: &str) -> Lookup<'_> {
        self.children
            .iter()
            .find(|c| c.has_local_name(local_name))
            .map_or(Lookup::Missing, Lookup::Found)
    }

    /// All children with the given local name.
    pub fn children<'a>(&'a self, local_name: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children
            .iter()
            .filter(move |c| c.has_local_name(local_name))
    }

    /// Attribute value by local name.
    pub fn attribute(&self, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| local_name_matches(k, local_name))
            .map(|(_, v)| v.as_str())
    }
}

impl<'a> Lookup<'a> {
    pub fn node(self) -> Option<&'a XmlNode> {
        match self {
            Lookup::Found(n) => Some(n),
            Lookup::Missing => None,
        }
    }

    pub fn is_found(self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    /// Descend one level; a miss stays a miss.
    pub fn child(self, local_name: &str) -> Lookup<'a> {
        match self {
            Lookup::Found(n) => n.child(local_name),
            Lookup::Missing => Lookup::Missing,
        }
    }

    /// Text of the named child, or `None` if this node or the child is missing.
    pub fn child_text(self, local_name: &str) -> Option<&'a str> {
        self.child(local_name).node().map(XmlNode::text)
    }

    /// Text of the named child, empty when missing.
    pub fn text_of(self, local_name: &str) -> &'a str {
        self.child_text(local_name).unwrap_or("")
    }

    pub fn attribute(self, local_name: &str) -> Option<&'a str> {
        self.node().and_then(|n| n.attribute(local_name))
    }

    /// All children with the given local name; empty when missing.
    pub fn children(self, local_name: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.node()
            .into_iter()
            .flat_map(move |n| n.children(local_name))
    }
}

impl<'a> From<&'a XmlNode> for Lookup<'a> {
    fn from(node: &'a XmlNode) -> Self {
        Lookup::Found(node)
    }
}

/// Deepest element nesting accepted by [`parse_document`]. Real envelopes
/// stay below ten levels.
pub const MAX_DEPTH: usize = 256;

/// Parse a complete XML document into its root element.
///
/// Fails with [`NfceError::MalformedXml`] on syntax errors, mismatched or
/// unclosed tags, a missing root element, more than one root element, text
/// outside the root, or nesting deeper than [`MAX_DEPTH`].
pub fn parse_document(xml: &str) -> Result<XmlNode, NfceError> {
    let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                if stack.is_empty() && root.is_some() {
                    return Err(malformed("more than one root element"));
                }
                if stack.len() >= MAX_DEPTH {
                    return Err(malformed("nesting too deep"));
                }
                stack.push(open_element(e)?);
            }
            Ok(Event::Empty(ref e)) => {
                if stack.len() >= MAX_DEPTH {
                    return Err(malformed("nesting too deep"));
                }
                let node = open_element(e)?;
                attach(&mut stack, &mut root, node)?;
            }
            Ok(Event::End(_)) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| malformed("closing tag without opening tag"))?;
                attach(&mut stack, &mut root, node)?;
            }
            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| malformed(format!("invalid text content: {err}")))?;
                push_text(&mut stack, &text)?;
            }
            Ok(Event::CData(ref e)) => {
                let text = String::from_utf8_lossy(e);
                push_text(&mut stack, &text)?;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(malformed(format!(
                    "XML parse error at position {}: {e}",
                    reader.error_position()
                )));
            }
            // Declaration, comments, processing instructions, doctype
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(malformed(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| malformed("no root element"))
}

fn malformed(message: impl Into<String>) -> NfceError {
    NfceError::MalformedXml(message.into())
}

fn open_element(e: &BytesStart<'_>) -> Result<XmlNode, NfceError> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| malformed(format!("invalid attribute in <{name}>: {err}")))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| malformed(format!("invalid attribute value in <{name}>: {err}")))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(XmlNode {
        name,
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}

fn attach(
    stack: &mut [XmlNode],
    root: &mut Option<XmlNode>,
    node: XmlNode,
) -> Result<(), NfceError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(node);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(node);
            Ok(())
        }
        None => Err(malformed("more than one root element")),
    }
}

fn push_text(stack: &mut [XmlNode], text: &str) -> Result<(), NfceError> {
    match stack.last_mut() {
        Some(node) => {
            node.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(malformed("text outside the root element")),
    }
}
