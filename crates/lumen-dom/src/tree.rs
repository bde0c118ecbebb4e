//! DOM Tree (arena-based allocation)
//!
//! Structural primitives without change notification. `Document` layers
//! dirty tracking and mutation records on top; the fragment parser links
//! through these directly.

use crate::{DomError, DomResult, ElementData, Node, NodeData, NodeId, NodeType};

/// Arena-based DOM tree. Slot 0 is always the document node.
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
        }
    }

    /// Document root ID
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes in the arena, detached ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the document node is never freed
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::element(tag))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(Node::text(content))
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::NotFound(id))
    }

    // ------------------------------------------------------------------
    // Read-only traversal
    // ------------------------------------------------------------------

    pub fn node_type(&self, id: NodeId) -> Option<NodeType> {
        self.get(id).map(Node::node_type)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Children in document order (empty for unknown IDs)
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(Node::as_element_mut)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    /// Tag name of an element
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(ElementData::tag_name)
    }

    /// Attached nodes carry an owner document; the document itself is
    /// always connected
    pub fn is_connected(&self, id: NodeId) -> bool {
        id == NodeId::ROOT || self.get(id).is_some_and(|n| n.owner.is_some())
    }

    /// Parent chain, nearest first
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Is `ancestor` equal to `node` or one of its ancestors?
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        ancestor == node || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Topmost node of the tree containing `id`
    pub fn tree_root(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().unwrap_or(id)
    }

    /// All descendants of `id` in document order, excluding `id`
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Element children in document order
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.is_element(c))
            .collect()
    }

    /// Position of `id` among its parent's children
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        index
            .checked_sub(1)
            .and_then(|i| self.children(parent).get(i).copied())
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.children(parent).get(index + 1).copied()
    }

    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.children(parent)[..index]
            .iter()
            .rev()
            .copied()
            .find(|&c| self.is_element(c))
    }

    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.children(parent)[index + 1..]
            .iter()
            .copied()
            .find(|&c| self.is_element(c))
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.get(id).and_then(Node::as_text) {
            return text.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|d| self.get(d).and_then(Node::as_text))
            .collect()
    }

    // ------------------------------------------------------------------
    // Structural primitives
    // ------------------------------------------------------------------

    /// Validate that `child` may be inserted under `parent`
    pub fn check_insert(&self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;
        let hierarchy = DomError::HierarchyRequest { parent, child };

        if !parent_node.can_have_children() || child_node.node_type() == NodeType::Document {
            return Err(hierarchy);
        }
        if self.is_inclusive_ancestor(child, parent) {
            return Err(hierarchy);
        }
        Ok(())
    }

    /// Unlink a node from its parent, clearing ownership over its subtree.
    /// Returns the former parent and index.
    pub fn detach(&mut self, child: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(child)?;
        let index = self.index_in_parent(child)?;
        self.nodes[parent.index()].children.remove(index);
        self.nodes[child.index()].parent = None;
        self.set_owner_subtree(child, None);
        Some((parent, index))
    }

    /// Link `child` under `parent` at `index`, detaching it first.
    /// `None` (or an out-of-range index) appends.
    pub fn insert_at(&mut self, parent: NodeId, index: Option<usize>, child: NodeId) -> DomResult<()> {
        self.check_insert(parent, child)?;
        self.detach(child);

        let siblings = &mut self.nodes[parent.index()].children;
        let index = index.filter(|&i| i <= siblings.len()).unwrap_or(siblings.len());
        siblings.insert(index, child);
        self.nodes[child.index()].parent = Some(parent);

        let owner = self.owner_for_children_of(parent);
        self.set_owner_subtree(child, owner);
        Ok(())
    }

    /// Append a child, detaching it from any previous parent
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.insert_at(parent, None, child)
    }

    /// Insert before `reference`; a missing or foreign reference appends
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<()> {
        self.check_insert(parent, child)?;
        if reference == Some(child) && self.parent(child) == Some(parent) {
            return Ok(());
        }
        let reference = reference.filter(|&r| r != child);
        self.detach(child);
        let index = reference.and_then(|r| self.children(parent).iter().position(|&c| c == r));
        self.insert_at(parent, index, child)
    }

    fn owner_for_children_of(&self, parent: NodeId) -> Option<NodeId> {
        match self.get(parent) {
            Some(node) if node.node_type() == NodeType::Document => Some(parent),
            Some(node) => node.owner,
            None => None,
        }
    }

    fn set_owner_subtree(&mut self, root: NodeId, owner: Option<NodeId>) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = &mut self.nodes[id.index()];
            node.owner = owner;
            stack.extend(node.children.iter().copied());
        }
    }

    /// Copy a node (and optionally its subtree) into a new detached node.
    /// Listeners are not copied.
    pub fn clone_node(&mut self, id: NodeId, deep: bool) -> DomResult<NodeId> {
        let data = match &self.node(id)?.data {
            NodeData::Document => return Err(DomError::InvalidNodeType(id)),
            NodeData::Element(elem) => NodeData::Element(elem.clone()),
            NodeData::Text(text) => NodeData::Text(text.clone()),
        };
        let copy = self.push(Node::with_data(data));

        if deep {
            let children = self.children(id).to_vec();
            for child in children {
                let child_copy = self.clone_node(child, true)?;
                self.nodes[child_copy.index()].parent = Some(copy);
                self.nodes[copy.index()].children.push(child_copy);
            }
        }
        Ok(copy)
    }
}

/// Iterator over a node's ancestors
pub struct Ancestors<'a> {
    tree: &'a DomTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}
