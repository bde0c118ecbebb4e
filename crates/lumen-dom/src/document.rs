//! Document
//!
//! Owns the node arena and layers change tracking on top of the raw tree
//! primitives: every structural, attribute and style mutation sets the dirty
//! flag and queues a [`MutationRecord`]. Event dispatch also lives here since
//! listeners receive the document mutably.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::{
    Ancestors, DomError, DomResult, DomTree, ElementData, Event, EventCallback, EventPhase,
    HandlerId, ListenerOptions, MutationCallback, MutationQueue, MutationRecord, Node, NodeData,
    NodeId, NodeType, ObserverId, StyleDeclaration,
};

/// A DOM document
pub struct Document {
    tree: DomTree,
    html: NodeId,
    head: NodeId,
    body: NodeId,
    title: String,
    dirty: bool,
    mutations: MutationQueue,
    handlers: HashMap<HandlerId, EventCallback>,
    next_handler: u64,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.tree.len())
            .field("title", &self.title)
            .field("dirty", &self.dirty)
            .field("mutations", &self.mutations)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document with `html`, `head` and `body`
    pub fn new() -> Self {
        let mut tree = DomTree::new();
        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        // Fresh elements in a fresh arena cannot violate insertion rules
        let _ = tree.append_child(NodeId::ROOT, html);
        let _ = tree.append_child(html, head);
        let _ = tree.append_child(html, body);

        Self {
            tree,
            html,
            head,
            body,
            title: String::new(),
            dirty: false,
            mutations: MutationQueue::new(),
            handlers: HashMap::new(),
            next_handler: 0,
        }
    }

    // ------------------------------------------------------------------
    // Structure and scalar state
    // ------------------------------------------------------------------

    /// Get the underlying tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Raw tree access for construction paths (parsers, builders).
    /// Changes made here are neither recorded nor marked dirty.
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    #[inline]
    pub fn document_element(&self) -> NodeId {
        self.html
    }

    #[inline]
    pub fn head(&self) -> NodeId {
        self.head
    }

    #[inline]
    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Has anything changed since the last `clear_dirty`?
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    // ------------------------------------------------------------------
    // Factories and reads
    // ------------------------------------------------------------------

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.tree.create_element(tag)
    }

    /// Create a detached text node
    pub fn create_text_node(&mut self, text: &str) -> NodeId {
        self.tree.create_text(text)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.tree.get(id)
    }

    pub fn node_type(&self, id: NodeId) -> Option<NodeType> {
        self.tree.node_type(id)
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.tree.element(id)
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.tree.tag_name(id)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.tree.parent(id)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.tree.children(id)
    }

    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.tree.element_children(id)
    }

    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.tree.previous_element_sibling(id)
    }

    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.tree.next_element_sibling(id)
    }

    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        self.tree.ancestors(id)
    }

    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        self.tree.descendants(id)
    }

    /// Is `other` equal to `node` or inside its subtree?
    pub fn contains(&self, node: NodeId, other: NodeId) -> bool {
        self.tree.is_inclusive_ancestor(node, other)
    }

    pub fn text_content(&self, id: NodeId) -> String {
        self.tree.text_content(id)
    }

    pub fn is_connected(&self, id: NodeId) -> bool {
        self.tree.is_connected(id)
    }

    /// First connected element with the given `id` attribute
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree
            .descendants(NodeId::ROOT)
            .into_iter()
            .find(|&n| self.tree.element(n).and_then(ElementData::id) == Some(id))
    }

    /// Connected elements by tag name (`*` matches all)
    pub fn get_elements_by_tag_name(&self, tag: &str) -> Vec<NodeId> {
        self.tree
            .descendants(NodeId::ROOT)
            .into_iter()
            .filter(|&n| {
                self.tree
                    .tag_name(n)
                    .is_some_and(|t| tag == "*" || t.eq_ignore_ascii_case(tag))
            })
            .collect()
    }

    /// Connected elements carrying every class in `classes`
    pub fn get_elements_by_class_name(&self, classes: &str) -> Vec<NodeId> {
        let wanted: Vec<&str> = classes.split_ascii_whitespace().collect();
        if wanted.is_empty() {
            return Vec::new();
        }
        self.tree
            .descendants(NodeId::ROOT)
            .into_iter()
            .filter(|&n| {
                self.tree
                    .element(n)
                    .is_some_and(|e| wanted.iter().all(|c| e.has_class(c)))
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Tree mutation
    // ------------------------------------------------------------------

    fn record_child_list(
        &mut self,
        target: NodeId,
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
        previous_sibling: Option<NodeId>,
        next_sibling: Option<NodeId>,
    ) {
        self.dirty = true;
        self.mutations.push(MutationRecord::ChildList {
            target,
            added,
            removed,
            previous_sibling,
            next_sibling,
        });
    }

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent first
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.tree.check_insert(parent, child)?;
        self.tree.detach(child);
        let previous = self.tree.children(parent).last().copied();
        self.tree.insert_at(parent, None, child)?;

        tracing::trace!(%parent, %child, "append_child");
        self.record_child_list(parent, vec![child], Vec::new(), previous, None);
        Ok(())
    }

    /// Insert `child` before `reference`. `None` or a reference that is not
    /// a child of `parent` appends.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<()> {
        self.tree.insert_before(parent, child, reference)?;
        let previous = self.tree.previous_sibling(child);
        let next = self.tree.next_sibling(child);

        tracing::trace!(%parent, %child, ?reference, "insert_before");
        self.record_child_list(parent, vec![child], Vec::new(), previous, next);
        Ok(())
    }

    /// Remove `child` from `parent`, returning it detached
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        if self.tree.get(parent).is_none() {
            return Err(DomError::NotFound(parent));
        }
        if self.tree.get(child).is_none() {
            return Err(DomError::NotFound(child));
        }
        if self.tree.parent(child) != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }
        let previous = self.tree.previous_sibling(child);
        let next = self.tree.next_sibling(child);
        self.tree.detach(child);

        tracing::trace!(%parent, %child, "remove_child");
        self.record_child_list(parent, Vec::new(), vec![child], previous, next);
        Ok(child)
    }

    /// Detach `node` from its parent, if any
    pub fn remove(&mut self, node: NodeId) -> DomResult<()> {
        match self.tree.parent(node) {
            Some(parent) => self.remove_child(parent, node).map(|_| ()),
            None if self.tree.get(node).is_some() => Ok(()),
            None => Err(DomError::NotFound(node)),
        }
    }

    /// Replace `old_child` with `new_child` in place, returning the detached
    /// old child
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        old_child: NodeId,
    ) -> DomResult<NodeId> {
        if self.tree.get(old_child).is_none() {
            return Err(DomError::NotFound(old_child));
        }
        if self.tree.parent(old_child) != Some(parent) {
            return Err(DomError::NotAChild {
                parent,
                child: old_child,
            });
        }
        self.tree.check_insert(parent, new_child)?;

        if new_child != old_child {
            self.tree.detach(new_child);
            let previous = self.tree.previous_sibling(old_child);
            let next = self.tree.next_sibling(old_child);
            let (_, index) = self
                .tree
                .detach(old_child)
                .ok_or(DomError::NotAChild { parent, child: old_child })?;
            self.tree.insert_at(parent, Some(index), new_child)?;

            tracing::trace!(%parent, %new_child, %old_child, "replace_child");
            self.record_child_list(parent, vec![new_child], vec![old_child], previous, next);
        } else {
            let previous = self.tree.previous_sibling(old_child);
            let next = self.tree.next_sibling(old_child);
            self.record_child_list(parent, vec![new_child], vec![old_child], previous, next);
        }
        Ok(old_child)
    }

    /// Replace all children of `parent` with `nodes` as one change
    pub fn replace_children(&mut self, parent: NodeId, nodes: &[NodeId]) -> DomResult<()> {
        if self.tree.get(parent).is_none() {
            return Err(DomError::NotFound(parent));
        }
        for &node in nodes {
            self.tree.check_insert(parent, node)?;
        }

        let current = self.tree.children(parent).to_vec();
        for &child in &current {
            self.tree.detach(child);
        }
        let removed: Vec<NodeId> = current.into_iter().filter(|c| !nodes.contains(c)).collect();
        for &node in nodes {
            self.tree.insert_at(parent, None, node)?;
        }

        tracing::trace!(%parent, added = nodes.len(), removed = removed.len(), "replace_children");
        self.record_child_list(parent, nodes.to_vec(), removed, None, None);
        Ok(())
    }

    /// Replace the content of `node`. Elements lose all children and gain
    /// one text node (none for empty text); text nodes get new data.
    pub fn set_text_content(&mut self, node: NodeId, text: &str) -> DomResult<()> {
        match self.tree.node_type(node) {
            None => Err(DomError::NotFound(node)),
            Some(NodeType::Text) => self.set_text_data(node, text),
            Some(_) => {
                let removed = self.tree.children(node).to_vec();
                for &child in &removed {
                    self.tree.detach(child);
                }
                let mut added = Vec::new();
                if !text.is_empty() {
                    let text_node = self.tree.create_text(text);
                    self.tree.insert_at(node, None, text_node)?;
                    added.push(text_node);
                }

                tracing::trace!(%node, removed = removed.len(), "set_text_content");
                self.record_child_list(node, added, removed, None, None);
                Ok(())
            }
        }
    }

    /// Replace the data of a text node
    pub fn set_text_data(&mut self, node: NodeId, data: &str) -> DomResult<()> {
        let connected = self.tree.is_connected(node);
        let text = match self.tree.get_mut(node).map(|n| &mut n.data) {
            Some(NodeData::Text(text)) => text,
            Some(_) => return Err(DomError::InvalidNodeType(node)),
            None => return Err(DomError::NotFound(node)),
        };
        let old_value = std::mem::replace(&mut text.content, data.to_string());

        self.dirty = true;
        if connected {
            self.mutations.push(MutationRecord::CharacterData {
                target: node,
                old_value,
            });
        }
        Ok(())
    }

    /// Copy a node into a new detached node. Listeners are not copied.
    pub fn clone_node(&mut self, node: NodeId, deep: bool) -> DomResult<NodeId> {
        self.tree.clone_node(node, deep)
    }

    // ------------------------------------------------------------------
    // Attributes and style
    // ------------------------------------------------------------------

    fn element_data_mut(&mut self, node: NodeId) -> DomResult<&mut ElementData> {
        match self.tree.get_mut(node) {
            Some(n) => n.as_element_mut().ok_or(DomError::InvalidNodeType(node)),
            None => Err(DomError::NotFound(node)),
        }
    }

    fn record_attribute(&mut self, node: NodeId, name: String, old_value: Option<String>) {
        self.dirty = true;
        if self.tree.is_connected(node) {
            self.mutations.push(MutationRecord::Attributes {
                target: node,
                name,
                old_value,
            });
        }
    }

    pub fn get_attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.tree.element(node).and_then(|e| e.get_attr(name))
    }

    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.tree.element(node).is_some_and(|e| e.attrs().contains(name))
    }

    pub fn attribute_names(&self, node: NodeId) -> Vec<String> {
        self.tree
            .element(node)
            .map(|e| e.attrs().names().into_iter().map(String::from).collect())
            .unwrap_or_default()
    }

    /// Set an attribute (name is case-insensitive)
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> DomResult<()> {
        let old = self.element_data_mut(node)?.set_attr(name, value);
        tracing::trace!(%node, name, "set_attribute");
        self.record_attribute(node, name.to_ascii_lowercase(), old);
        Ok(())
    }

    /// Remove an attribute, returning whether it was present
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> DomResult<bool> {
        let Some(old) = self.element_data_mut(node)?.remove_attr(name) else {
            return Ok(false);
        };
        tracing::trace!(%node, name, "remove_attribute");
        self.record_attribute(node, name.to_ascii_lowercase(), Some(old));
        Ok(true)
    }

    /// Toggle a boolean attribute. Returns whether it is present afterwards.
    pub fn toggle_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        force: Option<bool>,
    ) -> DomResult<bool> {
        let present = self.element_data_mut(node)?.attrs().contains(name);
        let want = force.unwrap_or(!present);
        match (present, want) {
            (false, true) => self.set_attribute(node, name, "")?,
            (true, false) => {
                self.remove_attribute(node, name)?;
            }
            _ => {}
        }
        Ok(want)
    }

    /// Class tokens of an element in attribute order
    pub fn class_list(&self, node: NodeId) -> Vec<String> {
        self.tree
            .element(node)
            .map(|e| e.attrs().tokens("class").map(String::from).collect())
            .unwrap_or_default()
    }

    /// Toggle a class token. Returns whether it is present afterwards.
    pub fn toggle_class(&mut self, node: NodeId, class: &str, force: Option<bool>) -> DomResult<bool> {
        let mut classes = self.class_list(node);
        let present = classes.iter().any(|c| c == class);
        let want = force.unwrap_or(!present);
        if want == present {
            // Still validates the node kind
            self.element_data_mut(node)?;
            return Ok(want);
        }
        if want {
            classes.push(class.to_string());
        } else {
            classes.retain(|c| c != class);
        }
        self.set_attribute(node, "class", &classes.join(" "))?;
        Ok(want)
    }

    pub fn style(&self, node: NodeId) -> Option<&StyleDeclaration> {
        self.tree.element(node).map(ElementData::style)
    }

    /// Read an inline style property (camelCase or kebab-case)
    pub fn get_style_property(&self, node: NodeId, name: &str) -> Option<&str> {
        self.style(node).and_then(|s| s.get(name))
    }

    /// Set an inline style property. An empty value removes it.
    pub fn set_style_property(&mut self, node: NodeId, name: &str, value: &str) -> DomResult<()> {
        let elem = self.element_data_mut(node)?;
        let old = elem.style.css_text();
        elem.style.set(name, value);
        Self::sync_style_attribute(elem);

        tracing::trace!(%node, name, "set_style_property");
        self.record_attribute(node, "style".to_string(), Some(old).filter(|s| !s.is_empty()));
        Ok(())
    }

    /// Remove an inline style property, returning its previous value
    pub fn remove_style_property(&mut self, node: NodeId, name: &str) -> DomResult<Option<String>> {
        let elem = self.element_data_mut(node)?;
        let old = elem.style.css_text();
        let Some(removed) = elem.style.remove(name) else {
            return Ok(None);
        };
        Self::sync_style_attribute(elem);

        tracing::trace!(%node, name, "remove_style_property");
        self.record_attribute(node, "style".to_string(), Some(old));
        Ok(Some(removed))
    }

    /// Keep a raw `style` attribute in step with the style store
    fn sync_style_attribute(elem: &mut ElementData) {
        elem.layout_dirty = true;
        if elem.attrs.contains("style") {
            let text = elem.style.css_text();
            elem.attrs.set("style", text);
        }
    }

    /// Read and clear an element's layout-dirty flag
    pub fn take_layout_dirty(&mut self, node: NodeId) -> bool {
        match self.tree.element_mut(node) {
            Some(elem) => std::mem::take(&mut elem.layout_dirty),
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Register a callback and get a handle for listener registration
    pub fn register_handler(
        &mut self,
        callback: impl Fn(&mut Document, &mut Event) + 'static,
    ) -> HandlerId {
        self.next_handler += 1;
        let id = HandlerId(self.next_handler);
        self.handlers.insert(id, Rc::new(callback));
        id
    }

    /// Drop a callback. Listeners still referring to it stop firing.
    pub fn unregister_handler(&mut self, id: HandlerId) -> bool {
        self.handlers.remove(&id).is_some()
    }

    /// Add a listener. Returns false for unknown nodes and for a duplicate
    /// (type, handler, phase) registration.
    pub fn add_event_listener(
        &mut self,
        node: NodeId,
        event_type: &str,
        handler: HandlerId,
        options: ListenerOptions,
    ) -> bool {
        match self.tree.get_mut(node) {
            Some(n) => n.listeners.add(event_type, handler, options),
            None => false,
        }
    }

    pub fn remove_event_listener(
        &mut self,
        node: NodeId,
        event_type: &str,
        handler: HandlerId,
        capture: bool,
    ) -> bool {
        match self.tree.get_mut(node) {
            Some(n) => n.listeners.remove(event_type, handler, capture),
            None => false,
        }
    }

    /// Dispatch `event` at `target` through capture, target and bubble
    /// phases. Returns false if a listener prevented the default action.
    pub fn dispatch_event(&mut self, target: NodeId, event: &mut Event) -> bool {
        event.begin_dispatch(target);
        if self.tree.get(target).is_none() {
            event.end_dispatch();
            return !event.default_prevented();
        }

        // Root of the target's tree first, immediate parent last
        let mut path: Vec<NodeId> = self.tree.ancestors(target).collect();
        path.reverse();
        tracing::trace!(%target, event_type = event.event_type(), depth = path.len(), "dispatch_event");

        self.propagate(target, &path, event);
        event.end_dispatch();
        !event.default_prevented()
    }

    fn propagate(&mut self, target: NodeId, path: &[NodeId], event: &mut Event) {
        for &node in path {
            self.invoke_listeners(node, event, EventPhase::Capturing, true);
            if event.propagation_stopped() {
                // The stopping node still finishes with its own bubble listeners
                if event.bubbles() && !event.immediate_propagation_stopped() {
                    self.invoke_listeners(node, event, EventPhase::Bubbling, false);
                }
                return;
            }
        }

        self.invoke_listeners(target, event, EventPhase::AtTarget, true);
        if !event.immediate_propagation_stopped() {
            self.invoke_listeners(target, event, EventPhase::AtTarget, false);
        }
        if event.propagation_stopped() || !event.bubbles() {
            return;
        }

        for &node in path.iter().rev() {
            self.invoke_listeners(node, event, EventPhase::Bubbling, false);
            if event.propagation_stopped() {
                return;
            }
        }
    }

    fn invoke_listeners(&mut self, node: NodeId, event: &mut Event, phase: EventPhase, capture: bool) {
        let event_type = event.event_type().to_string();
        let snapshot = match self.tree.get(node) {
            Some(n) => n.listeners.listeners(&event_type, capture).to_vec(),
            None => return,
        };
        if snapshot.is_empty() {
            return;
        }

        for listener in snapshot {
            if event.immediate_propagation_stopped() {
                break;
            }
            // Removed by an earlier listener in this dispatch
            let Some(registry) = self.tree.get_mut(node).map(|n| &mut n.listeners) else {
                break;
            };
            if !registry.contains(&event_type, listener.handler, capture) {
                continue;
            }
            if listener.once {
                registry.remove(&event_type, listener.handler, capture);
            }
            let Some(callback) = self.handlers.get(&listener.handler).cloned() else {
                continue;
            };

            event.current_target = Some(node);
            event.phase = phase;
            event.in_passive = listener.passive;
            callback(self, event);
            event.in_passive = false;
        }
    }

    // ------------------------------------------------------------------
    // Mutation observers
    // ------------------------------------------------------------------

    /// Start receiving flushed record batches
    pub fn observe(
        &mut self,
        callback: impl Fn(&mut Document, &[MutationRecord]) + 'static,
    ) -> ObserverId {
        let callback: MutationCallback = Rc::new(callback);
        self.mutations.observe(callback)
    }

    pub fn disconnect(&mut self, id: ObserverId) -> bool {
        self.mutations.disconnect(id)
    }

    /// Records queued since the last flush
    pub fn pending_records(&self) -> &[MutationRecord] {
        self.mutations.pending()
    }

    /// Drain queued records without delivering them
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        self.mutations.take_records()
    }

    /// Deliver every queued record to every active observer and empty the
    /// queue. Records produced by observers are kept for the next flush.
    /// Returns the number of records delivered.
    pub fn flush(&mut self) -> usize {
        let records = self.mutations.take_records();
        if records.is_empty() {
            return 0;
        }
        let observers = self.mutations.observers();
        tracing::debug!(records = records.len(), observers = observers.len(), "flush mutations");

        for (id, callback) in observers {
            // An earlier observer may have disconnected this one
            if self.mutations.is_active(id) {
                callback(self, &records);
            }
        }
        records.len()
    }
}
