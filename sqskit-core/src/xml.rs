//! XML response tree
//!
//! SQS answers every query action with a small XML envelope. The envelope is
//! folded into a [`Node`] tree keyed by local element names: leaf elements
//! become text, elements with children become maps and repeated siblings
//! become lists, in document order.

use std::collections::BTreeMap;

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

/// Errors while reading a response body
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("XML parsing error: {0}")]
    Malformed(#[from] quick_xml::Error),

    #[error("Element name is not valid UTF-8")]
    InvalidName,

    #[error("Unexpected closing tag </{0}>")]
    UnexpectedClose(String),

    #[error("Unclosed element <{0}>")]
    Unclosed(String),
}

/// A parsed XML value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Map(BTreeMap<String, Node>),
    List(Vec<Node>),
}

impl Default for Node {
    fn default() -> Self {
        Self::Map(BTreeMap::new())
    }
}

impl Node {
    /// Child element by name, only meaningful on maps
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Self::Map(children) => children.get(key),
            _ => None,
        }
    }

    /// Text content of a child element
    pub fn text_of(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Node::as_text)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Node]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Node>> {
        match self {
            Self::Map(children) => Some(children),
            _ => None,
        }
    }

    /// The element as a sequence: lists yield their items, anything else
    /// yields itself. Smooths over single vs. repeated elements.
    pub fn items(&self) -> &[Node] {
        match self {
            Self::List(items) => items,
            other => std::slice::from_ref(other),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Map(children) => children.is_empty(),
            Self::List(items) => items.is_empty(),
        }
    }
}

/// Open element being collected
struct Frame {
    name: String,
    children: BTreeMap<String, Node>,
    text: String,
}

impl Frame {
    fn new(name: String) -> Self {
        Self {
            name,
            children: BTreeMap::new(),
            text: String::new(),
        }
    }

    /// Text between child elements is layout; leaf text is kept verbatim
    fn into_node(self) -> Node {
        if self.children.is_empty() {
            Node::Text(self.text)
        } else {
            Node::Map(self.children)
        }
    }
}

fn insert_child(children: &mut BTreeMap<String, Node>, name: String, node: Node) {
    match children.remove(&name) {
        None => {
            children.insert(name, node);
        }
        Some(Node::List(mut items)) => {
            items.push(node);
            children.insert(name, Node::List(items));
        }
        Some(existing) => {
            children.insert(name, Node::List(vec![existing, node]));
        }
    }
}

fn element_name(raw: &[u8]) -> Result<String, XmlError> {
    std::str::from_utf8(raw)
        .map(String::from)
        .map_err(|_| XmlError::InvalidName)
}

/// Parse a response body and return the content of its root element
///
/// An empty body yields an empty map.
pub fn parse(body: &str) -> Result<Node, XmlError> {
    let mut reader = Reader::from_str(body);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = element_name(e.local_name().as_ref())?;
                stack.push(Frame::new(name));
            }
            Event::Empty(e) => {
                let name = element_name(e.local_name().as_ref())?;
                match stack.last_mut() {
                    Some(parent) => insert_child(&mut parent.children, name, Node::Text(String::new())),
                    None => root = Some(Node::Text(String::new())),
                }
            }
            Event::Text(e) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(e) => {
                let name = element_name(e.local_name().as_ref())?;
                let frame = stack.pop().ok_or_else(|| XmlError::UnexpectedClose(name.clone()))?;
                if frame.name != name {
                    return Err(XmlError::UnexpectedClose(name));
                }

                let node_name = frame.name.clone();
                let node = frame.into_node();
                match stack.last_mut() {
                    Some(parent) => insert_child(&mut parent.children, node_name, node),
                    None => root = Some(node),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(frame) = stack.pop() {
        return Err(XmlError::Unclosed(frame.name));
    }

    Ok(root.unwrap_or_default())
}
