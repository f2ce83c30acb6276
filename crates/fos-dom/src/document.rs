//! Document - High-level document API

use std::collections::VecDeque;

use crate::{
    DomError, DomResult, DomTree, ElementData, Event, EventListeners, EventType, ListenerId,
    NodeId, SimpleSelector,
};

/// HTML Document
///
/// Owns the tree, the listener registry and the queue of events waiting to
/// be delivered by the embedder's event loop.
#[derive(Debug)]
pub struct Document {
    tree: DomTree,
    url: String,
    html_element: NodeId,
    head_element: NodeId,
    body_element: NodeId,
    listeners: EventListeners,
    queue: VecDeque<Event>,
}

impl Document {
    /// Create a document with the basic html/head/body structure
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();

        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        // Fresh nodes under a live root cannot violate the hierarchy
        let _ = tree.append_child(tree.root(), html);
        let _ = tree.append_child(html, head);
        let _ = tree.append_child(html, body);

        Self {
            tree,
            url: url.to_string(),
            html_element: html,
            head_element: head,
            body_element: body,
            listeners: EventListeners::new(),
            queue: VecDeque::new(),
        }
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get <html> element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// Get <head> element
    pub fn head(&self) -> NodeId {
        self.head_element
    }

    /// Get <body> element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.tree.create_element(tag)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.tree.append_child(parent, child)
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.tree.remove_child(parent, child)
    }

    /// Destroy a node and its subtree, dropping their listeners and any
    /// events still queued for them.
    pub fn destroy_node(&mut self, id: NodeId) -> DomResult<()> {
        let freed = self.tree.destroy(id)?;
        for node in &freed {
            self.listeners.remove_all_for(*node);
        }
        self.queue.retain(|e| !freed.contains(&e.target));
        tracing::trace!(node = %id, count = freed.len(), "destroyed subtree");
        Ok(())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.tree.contains(id)
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.tree.element(id)
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.tree.element_mut(id)
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.tree.tag_name(id)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.tree.parent(id)
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.get_attr(name))
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) -> DomResult<()> {
        let element = self.element_mut(id).ok_or(DomError::NotFound(id))?;
        element.set_attr(name, value);
        Ok(())
    }

    /// Set or clear a boolean attribute
    pub fn set_flag(&mut self, id: NodeId, name: &str, on: bool) -> DomResult<()> {
        let element = self.element_mut(id).ok_or(DomError::NotFound(id))?;
        element.attrs.set_flag(name, on);
        Ok(())
    }

    /// First element in document order matching a simple selector
    pub fn query_selector(&self, selector: &str) -> Option<NodeId> {
        let selector = SimpleSelector::parse(selector)?;
        self.tree
            .descendants(self.tree.root())
            .into_iter()
            .find(|id| self.element(*id).is_some_and(|e| selector.matches(e)))
    }

    /// Get element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.query_selector(&format!("#{id}"))
    }

    // === Events ===

    pub fn add_event_listener(&mut self, target: NodeId, event_type: EventType) -> ListenerId {
        self.listeners.add(target, event_type)
    }

    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn listeners(&self) -> &EventListeners {
        &self.listeners
    }

    /// Queue an event for delivery on the next loop turn
    pub fn dispatch_event(&mut self, event: Event) {
        self.queue.push_back(event);
    }

    /// Pop the oldest queued event
    pub fn next_event(&mut self) -> Option<Event> {
        self.queue.pop_front()
    }

    pub fn has_pending_events(&self) -> bool {
        !self.queue.is_empty()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}
