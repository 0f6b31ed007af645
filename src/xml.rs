//! Minimal element tree over `quick-xml` events
//!
//! The parsers only need element names, attributes and text content, so the
//! tree keeps exactly that. Lookups follow DOM `getElementsByTagName`
//! semantics: descendants in document order, matched on the qualified name
//! as written. [`Element::find`] adds the namespace-wildcard fallback used
//! for XCCDF documents with prefixed elements.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{ParseError, Result};

/// A node in the element tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element with its attributes and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| ParseError::xml(0, e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = match attr.unescape_value() {
                Ok(v) => v.into_owned(),
                Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
            };
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    /// Qualified name as written (e.g. "xccdf:Rule")
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without namespace prefix
    pub fn local_name(&self) -> &str {
        match self.name.rsplit_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    /// Attribute value by qualified name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Direct element children
    pub fn child_elements(&self) -> impl DoubleEndedIterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    /// All descendant elements in document order, excluding `self`
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.child_elements().rev().collect(),
        }
    }

    /// Descendants whose qualified name equals `name`
    pub fn elements_by_tag_name<'a, 'n: 'a>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.descendants().filter(move |el| el.name() == name)
    }

    /// First descendant named `name`: qualified match first, then any namespace
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.descendants()
            .find(|el| el.name() == name)
            .or_else(|| self.descendants().find(|el| el.local_name() == name))
    }

    /// All descendants named `name`; the namespace wildcard is used only when
    /// no qualified match exists
    pub fn find_all(&self, name: &str) -> Vec<&Element> {
        let qualified: Vec<&Element> = self
            .descendants()
            .filter(|el| el.name() == name)
            .collect();
        if qualified.is_empty() {
            self.descendants()
                .filter(|el| el.local_name() == name)
                .collect()
        } else {
            qualified
        }
    }

    /// Trimmed text content of the first descendant with qualified name
    /// `name`, or an empty string
    pub fn child_text(&self, name: &str) -> String {
        self.descendants()
            .find(|el| el.name() == name)
            .map(|el| el.text_content().trim().to_string())
            .unwrap_or_default()
    }

    /// Concatenated text of every descendant text node
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(el) => el.collect_text(out),
            }
        }
    }
}

/// Pre-order iterator over descendant elements
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<&'a Element> {
        let next = self.stack.pop()?;
        self.stack.extend(next.child_elements().rev());
        Some(next)
    }
}

/// A parsed XML document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Element,
}

impl Document {
    /// Build the element tree. Fails only on input that is not well-formed.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| ParseError::xml(reader.buffer_position() as u64, e.to_string()))?;

            match event {
                Event::Start(ref e) => stack.push(Element::from_start(e)?),
                Event::Empty(ref e) => {
                    let el = Element::from_start(e)?;
                    attach(&mut stack, &mut root, el);
                }
                Event::End(_) => {
                    // quick-xml checks end names, so the stack is never empty here
                    if let Some(el) = stack.pop() {
                        attach(&mut stack, &mut root, el);
                    }
                }
                Event::Text(ref e) => {
                    let text = match e.unescape() {
                        Ok(t) => t.into_owned(),
                        Err(_) => String::from_utf8_lossy(e).into_owned(),
                    };
                    push_text(&mut stack, text);
                }
                Event::CData(ref e) => {
                    push_text(&mut stack, String::from_utf8_lossy(e).into_owned());
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(ParseError::xml(
                reader.buffer_position() as u64,
                format!("unclosed element <{}>", open.name()),
            ));
        }

        root.map(|root| Self { root })
            .ok_or_else(|| ParseError::xml(0, "document has no root element"))
    }

    #[cfg(test)]
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Root and all its descendants in document order
    pub fn elements(&self) -> Descendants<'_> {
        Descendants {
            stack: vec![&self.root],
        }
    }

    pub fn elements_by_tag_name<'a, 'n: 'a>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements().filter(move |el| el.name() == name)
    }

    /// First element named `name`: qualified match first, then any namespace
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.elements()
            .find(|el| el.name() == name)
            .or_else(|| self.elements().find(|el| el.local_name() == name))
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, el: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(el)),
        // Content after the first root element is ignored
        None if root.is_none() => *root = Some(el),
        None => {}
    }
}

/// Text is stored with XML line-end normalization: CRLF and lone CR become LF
fn push_text(stack: &mut [Element], text: String) {
    if let Some(parent) = stack.last_mut() {
        let text = if text.contains('\r') {
            text.replace("\r\n", "\n").replace('\r', "\n")
        } else {
            text
        };
        parent.children.push(Node::Text(text));
    }
}
