//! XML element tree and traversal.
//!
//! The compiler walks a fully materialized element tree rather than a
//! live event stream: the whole document is parsed up front (one
//! `quick-xml` pass) and traversal afterwards is a plain depth-first
//! walk with explicit descend/skip control. Malformed XML is fatal
//! here, before any schema object exists.

use crate::error::ParseError;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// One XML element: name, attributes, child elements, optional text.
#[derive(Debug, Clone, Default)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: Option<String>,
}

impl Element {
    /// Parses an XML document into its root element.
    ///
    /// # Errors
    /// Returns `ParseError` for malformed XML, unclosed tags, empty
    /// documents and multiple roots.
    pub fn parse(xml: &str) -> Result<Element, ParseError> {
        let mut reader = Reader::from_reader(xml.as_bytes());
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    if root.is_some() && stack.is_empty() {
                        return Err(ParseError::invalid_structure("multiple root elements"));
                    }
                    stack.push(Self::from_start(e)?);
                }
                Ok(Event::Empty(ref e)) => {
                    let element = Self::from_start(e)?;
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| ParseError::invalid_structure("unmatched end tag"))?;
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::Text(ref t)) => {
                    let text = std::str::from_utf8(t.as_ref())?.trim().to_string();
                    if !text.is_empty()
                        && let Some(top) = stack.last_mut()
                    {
                        top.text = Some(text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(ParseError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(ParseError::invalid_structure("unexpected end of document"));
        }
        root.ok_or_else(|| ParseError::invalid_structure("empty document"))
    }

    fn from_start(e: &BytesStart<'_>) -> Result<Element, ParseError> {
        let name = std::str::from_utf8(e.name().as_ref())?.to_string();
        let mut attributes = Vec::new();

        for attr in e.attributes().flatten() {
            let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
            let value = std::str::from_utf8(&attr.value)?.to_string();
            attributes.push((key, value));
        }

        Ok(Element {
            name,
            attributes,
            children: Vec::new(),
            text: None,
        })
    }

    fn attach(
        stack: &mut Vec<Element>,
        root: &mut Option<Element>,
        element: Element,
    ) -> Result<(), ParseError> {
        match stack.last_mut() {
            Some(parent) => {
                parent.children.push(element);
                Ok(())
            }
            None if root.is_none() => {
                *root = Some(element);
                Ok(())
            }
            None => Err(ParseError::invalid_structure("multiple root elements")),
        }
    }

    /// Returns the element name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up an attribute by name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Looks up an attribute, falling back to `default` when absent.
    #[must_use]
    pub fn attr_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.attr(name).unwrap_or(default)
    }

    /// Returns the first child element, if any.
    #[must_use]
    pub fn first_child(&self) -> Option<&Element> {
        self.children.first()
    }

    /// Returns all child elements in document order.
    #[must_use]
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Returns the trimmed text content, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

/// Control signal returned by [`ElementVisitor::enter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// Continue into this element's children.
    Descend,
    /// Do not descend; the visitor owns this subtree.
    Skip,
}

/// Depth-first visitor over an element tree.
///
/// `exit` runs for every entered element, including ones whose
/// subtree was skipped.
pub trait ElementVisitor {
    /// Error type propagated out of the walk.
    type Error;

    /// Called when entering an element.
    fn enter(&mut self, element: &Element) -> Result<Traversal, Self::Error>;

    /// Called when leaving an element.
    fn exit(&mut self, element: &Element) -> Result<(), Self::Error>;
}

/// Walks `element` depth-first, honoring the visitor's control signals.
///
/// # Errors
/// Propagates the first error returned by the visitor.
pub fn walk<V: ElementVisitor>(element: &Element, visitor: &mut V) -> Result<(), V::Error> {
    if visitor.enter(element)? == Traversal::Descend {
        for child in element.children() {
            walk(child, visitor)?;
        }
    }
    visitor.exit(element)
}
