//! Lightweight owned XML document model for feed bodies.
//!
//! Feed dialects need random access to items — ordered attribute-bag
//! scans, fallback chains across sibling elements, a document-wide search
//! for a top-level `<error>` — which a streaming reader cannot give the
//! extraction hooks directly. This module loads the body once into a
//! small owned tree and the hooks query that.
//!
//! XXE (XML External Entity) attacks are mitigated because `quick-xml`
//! (0.37) does not parse `<!ENTITY>` declarations. Custom entities cause
//! an unescape error rather than expanding.

use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

use crate::error::FeedError;

/// Maximum allowed element nesting depth. Real feeds are a handful of
/// levels deep; past this cap the tree recursion (descendant scans and
/// the drop of nested children) risks overflowing the stack on a
/// maliciously crafted body.
const MAX_FEED_DEPTH: usize = 50;

/// One element of a parsed feed, with its namespace resolved to a plain
/// URI string. Children are kept in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    name: String,
    namespace: Option<String>,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    /// Local element name, prefix stripped (`torznab:attr` → `attr`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolved namespace URI, if the element is namespace-qualified.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Value of the named attribute, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Child elements in document order.
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter()
    }

    /// First direct child with the given local name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Text content of the first direct child with the given local name,
    /// or the empty string when the child is absent.
    pub fn child_text(&self, name: &str) -> &str {
        self.child(name).map(|c| c.text.as_str()).unwrap_or("")
    }

    /// Accumulated text content (text nodes and CDATA sections).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// All descendants with the given local name, in document order.
    pub fn descendants(&self, name: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.collect_descendants(name, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        for child in &self.children {
            if child.name == name {
                found.push(child);
            }
            child.collect_descendants(name, found);
        }
    }
}

/// A parsed feed body. Owns the root element; all lookups borrow.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Element,
}

impl Document {
    /// Parses a raw feed body into an element tree.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::MalformedFeed`] when the body is not
    /// well-formed XML (unclosed tags, garbage, multiple roots, or no
    /// root element at all), or when elements nest deeper than
    /// [`MAX_FEED_DEPTH`] levels.
    pub fn parse(body: &str) -> Result<Document, FeedError> {
        let mut reader = NsReader::from_str(body);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_resolved_event() {
                Ok((resolve, Event::Start(e))) => {
                    if stack.len() >= MAX_FEED_DEPTH {
                        return Err(FeedError::MalformedFeed(format!(
                            "element nesting depth exceeds maximum of {MAX_FEED_DEPTH} levels"
                        )));
                    }
                    let element = read_start(&resolve, &e)?;
                    stack.push(element);
                }
                Ok((resolve, Event::Empty(e))) => {
                    let element = read_start(&resolve, &e)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok((_, Event::End(_))) => {
                    let element = stack.pop().ok_or_else(|| {
                        FeedError::MalformedFeed("unexpected closing tag".into())
                    })?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok((_, Event::Text(e))) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = e
                            .unescape()
                            .map_err(|e| FeedError::MalformedFeed(e.to_string()))?;
                        parent.text.push_str(&text);
                    }
                }
                Ok((_, Event::CData(e))) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.text.push_str(&String::from_utf8_lossy(e.as_ref()));
                    }
                }
                Ok((_, Event::Eof)) => break,
                Ok(_) => {} // declaration, processing instructions, comments, doctype
                Err(e) => return Err(FeedError::MalformedFeed(e.to_string())),
            }
        }

        if !stack.is_empty() {
            return Err(FeedError::MalformedFeed("unclosed element".into()));
        }

        root.map(|root| Document { root })
            .ok_or_else(|| FeedError::MalformedFeed("no root element".into()))
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// First descendant of the document (root included) with the given
    /// local name, in document order.
    pub fn first_descendant(&self, name: &str) -> Option<&Element> {
        if self.root.name == name {
            return Some(&self.root);
        }
        self.root.descendants(name).into_iter().next()
    }
}

fn read_start(
    resolve: &ResolveResult,
    e: &quick_xml::events::BytesStart<'_>,
) -> Result<Element, FeedError> {
    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
    let namespace = match resolve {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.into_inner()).into_owned()),
        _ => None,
    };

    let mut attributes = Vec::new();
    for attr_result in e.attributes() {
        let attr = match attr_result {
            Ok(attr) => attr,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed feed attribute");
                continue;
            }
        };
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        // Input is always &str here, so plain UTF-8 unescaping suffices.
        let value = attr
            .unescape_value()
            .map_err(|e| FeedError::MalformedFeed(e.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(Element {
        name,
        namespace,
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}

fn attach(
    stack: &mut Vec<Element>,
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), FeedError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_some() {
                return Err(FeedError::MalformedFeed("multiple root elements".into()));
            }
            *root = Some(element);
        }
    }
    Ok(())
}
