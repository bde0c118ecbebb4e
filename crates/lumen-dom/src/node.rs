//! DOM Node
//!
//! Closed set of node kinds addressed through `NodeId` handles. Parent and
//! owner-document links are plain handles looked up through the arena, so
//! the tree never holds reference cycles.

use crate::{AttributeMap, ListenerRegistry, NodeId, StyleDeclaration};

/// Node kind tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Document,
    Element,
    Text,
}

/// DOM Node - Core structure
#[derive(Debug)]
pub struct Node {
    /// Parent node (`None` when detached or for the document root)
    pub(crate) parent: Option<NodeId>,
    /// Owning document (`None` while detached)
    pub(crate) owner: Option<NodeId>,
    /// Children in document order
    pub(crate) children: Vec<NodeId>,
    /// Capture/bubble listener registries
    pub(crate) listeners: ListenerRegistry,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    pub(crate) fn with_data(data: NodeData) -> Self {
        Self {
            parent: None,
            owner: None,
            children: Vec::new(),
            listeners: ListenerRegistry::default(),
            data,
        }
    }

    /// Create a new element node
    pub fn element(tag: &str) -> Self {
        Self::with_data(NodeData::Element(ElementData::new(tag)))
    }

    /// Create a new text node
    pub fn text(content: impl Into<String>) -> Self {
        Self::with_data(NodeData::Text(TextData {
            content: content.into(),
        }))
    }

    /// Create a document node
    pub fn document() -> Self {
        Self::with_data(NodeData::Document)
    }

    /// Kind of this node
    #[inline]
    pub fn node_type(&self) -> NodeType {
        match self.data {
            NodeData::Document => NodeType::Document,
            NodeData::Element(_) => NodeType::Element,
            NodeData::Text(_) => NodeType::Text,
        }
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Owning document, set only while attached
    #[inline]
    pub fn owner_document(&self) -> Option<NodeId> {
        self.owner
    }

    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[inline]
    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Check if this is text
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    /// Nodes of this kind may hold children
    #[inline]
    pub fn can_have_children(&self) -> bool {
        !self.is_text()
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(&t.content),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug)]
pub enum NodeData {
    /// Document root
    Document,
    /// Element
    Element(ElementData),
    /// Text content
    Text(TextData),
}

/// Element-specific data
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Normalized (ASCII lowercase) tag name
    pub(crate) tag: String,
    pub(crate) attrs: AttributeMap,
    pub(crate) style: StyleDeclaration,
    /// Set by attribute/style mutations, consumed by layout
    pub(crate) layout_dirty: bool,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: AttributeMap::new(),
            style: StyleDeclaration::new(),
            layout_dirty: true,
        }
    }

    #[inline]
    pub fn tag_name(&self) -> &str {
        &self.tag
    }

    #[inline]
    pub fn attrs(&self) -> &AttributeMap {
        &self.attrs
    }

    /// Attribute map for construction paths that must not emit records
    #[inline]
    pub fn attrs_mut(&mut self) -> &mut AttributeMap {
        &mut self.attrs
    }

    #[inline]
    pub fn style(&self) -> &StyleDeclaration {
        &self.style
    }

    /// Get an attribute value
    #[inline]
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name)
    }

    #[inline]
    pub fn id(&self) -> Option<&str> {
        self.attrs.get("id")
    }

    /// Check class membership
    pub fn has_class(&self, class: &str) -> bool {
        self.attrs.has_token("class", class)
    }

    #[inline]
    pub fn is_layout_dirty(&self) -> bool {
        self.layout_dirty
    }

    /// Set an attribute without notification; `style` also refreshes the
    /// style store. Tracked changes go through `Document::set_attribute`.
    pub fn set_attr(&mut self, name: &str, value: &str) -> Option<String> {
        let old = self.attrs.set(name, value);
        if name.eq_ignore_ascii_case("style") {
            self.style.set_css_text(value);
        }
        self.layout_dirty = true;
        old
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let old = self.attrs.remove(name);
        if old.is_some() {
            if name.eq_ignore_ascii_case("style") {
                self.style = StyleDeclaration::new();
            }
            self.layout_dirty = true;
        }
        old
    }
}

/// Text node data
#[derive(Debug, Clone)]
pub struct TextData {
    pub content: String,
}
