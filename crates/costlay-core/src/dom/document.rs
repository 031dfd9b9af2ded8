//! Arena-backed document tree.
//!
//! Nodes are never freed; removing a node detaches it from its parent. Only
//! child-list changes are reported to observers (`childList` + `subtree`
//! semantics). Attribute writes are silent.

use super::node::{ElementData, Node, NodeId, NodeKind};
use super::observer::{MutationObserver, MutationRecord};
use super::DomError;

/// In-memory document with an `<html>` root and a `<body>`
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    body: NodeId,
    observers: Vec<MutationObserver>,
    mutation_count: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document (`<html><body></body></html>`)
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            body: NodeId(0),
            observers: Vec::new(),
            mutation_count: 0,
        };
        let root = doc.alloc(NodeKind::Element(ElementData::new("html")));
        let body = doc.alloc(NodeKind::Element(ElementData::new("body")));
        doc.nodes[body.0].parent = Some(root);
        doc.nodes[root.0].children.push(body);
        doc.root = root;
        doc.body = body;
        doc
    }

    /// The document element (`<html>`)
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Number of child-list mutations applied since creation
    pub fn mutation_count(&self) -> u64 {
        self.mutation_count
    }

    // =========================================================
    // Construction
    // =========================================================

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeKind::Element(ElementData::new(tag)))
    }

    /// Create a detached element with the given attributes
    pub fn create_element_with(&mut self, tag: &str, attributes: &[(&str, &str)]) -> NodeId {
        let mut data = ElementData::new(tag);
        for (name, value) in attributes {
            data.set(name, value);
        }
        self.alloc(NodeKind::Element(data))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeKind::Text(text.to_string()))
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(kind));
        id
    }

    // =========================================================
    // Inspection
    // =========================================================

    fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.nodes.get(id.0).ok_or(DomError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.nodes.get_mut(id.0).ok_or(DomError::NodeNotFound(id))
    }

    fn element(&self, id: NodeId) -> Result<&ElementData, DomError> {
        match &self.node(id)?.kind {
            NodeKind::Element(data) => Ok(data),
            NodeKind::Text(_) => Err(DomError::NotAnElement(id)),
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, DomError> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element(data) => Ok(data),
            NodeKind::Text(_) => Err(DomError::NotAnElement(id)),
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_ok()
    }

    /// Lower-case tag name, `None` for text nodes
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).ok().map(|data| data.tag.as_str())
    }

    pub(crate) fn text_of(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).ok()?.kind {
            NodeKind::Text(text) => Some(text.as_str()),
            NodeKind::Element(_) => None,
        }
    }

    pub(crate) fn attributes(&self, id: NodeId) -> &[(String, String)] {
        self.element(id)
            .map(|data| data.attributes.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).ok()?.parent
    }

    /// All child nodes (elements and text)
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|child| self.is_element(*child))
            .collect()
    }

    /// Direct element children with the given tag
    pub fn children_by_tag(&self, id: NodeId, tag: &str) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|child| self.tag(*child) == Some(tag))
            .collect()
    }

    pub fn first_element_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|child| self.is_element(*child))
    }

    /// Whether the node is reachable from the document root
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(self.root, id)
    }

    /// Whether `node` is `ancestor` or one of its descendants
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Descendants of `scope` in document order, excluding `scope` itself
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// First descendant element of `scope` with the given tag
    pub fn find_first(&self, scope: NodeId, tag: &str) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|id| self.tag(*id) == Some(tag))
    }

    /// Every descendant element of `scope` with the given tag, in document order
    pub fn find_all(&self, scope: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|id| self.tag(*id) == Some(tag))
            .collect()
    }

    /// Connected element whose `id` attribute equals `id`
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|node| self.attribute(*node, "id") == Some(id))
    }

    /// Concatenated text of the node and all its descendants
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text_of(id) {
            return text.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|node| self.text_of(node))
            .collect()
    }

    // =========================================================
    // Attributes (not observed)
    // =========================================================

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).ok()?.get(name)
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.element_mut(id)?.set(name, value);
        Ok(())
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attribute(id, "class")
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) -> Result<(), DomError> {
        if self.has_class(id, class) {
            return Ok(());
        }
        let classes = match self.attribute(id, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), class),
            _ => class.to_string(),
        };
        self.set_attribute(id, "class", &classes)
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) -> Result<(), DomError> {
        let Some(existing) = self.attribute(id, "class") else {
            return Ok(());
        };
        let classes: Vec<&str> = existing.split_whitespace().filter(|c| *c != class).collect();
        let joined = classes.join(" ");
        self.set_attribute(id, "class", &joined)
    }

    // =========================================================
    // Child-list mutations (observed)
    // =========================================================

    /// Append `child` as the last child of `parent`, moving it if attached elsewhere
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        self.detach(child);
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        self.notify(parent);
        Ok(())
    }

    /// Insert `child` into `parent` immediately before `reference`
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        if child == reference {
            return Ok(());
        }
        if self.parent(reference) != Some(parent) {
            return Err(DomError::NotAChild { parent, reference });
        }
        self.detach(child);
        let siblings = &mut self.node_mut(parent)?.children;
        let index = siblings
            .iter()
            .position(|id| *id == reference)
            .ok_or(DomError::NotAChild { parent, reference })?;
        siblings.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        self.notify(parent);
        Ok(())
    }

    /// Insert `child` immediately after `reference` (`insertAdjacentElement("afterend")`)
    pub fn insert_after(&mut self, reference: NodeId, child: NodeId) -> Result<(), DomError> {
        let parent = self
            .parent(reference)
            .ok_or(DomError::Detached { node: reference })?;
        self.check_insert(parent, child)?;
        if child == reference {
            return Ok(());
        }
        self.detach(child);
        let siblings = &mut self.node_mut(parent)?.children;
        let index = siblings
            .iter()
            .position(|id| *id == reference)
            .ok_or(DomError::NotAChild { parent, reference })?;
        siblings.insert(index + 1, child);
        self.node_mut(child)?.parent = Some(parent);
        self.notify(parent);
        Ok(())
    }

    /// Detach `id` from its parent; a no-op for already detached nodes
    pub fn remove(&mut self, id: NodeId) -> Result<(), DomError> {
        self.node(id)?;
        if id == self.root {
            return Err(DomError::HierarchyRequest {
                parent: id,
                child: id,
            });
        }
        self.detach(id);
        Ok(())
    }

    /// Replace all children of `id` with a single text node (`textContent = text`)
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> Result<(), DomError> {
        self.element(id)?;
        let old = std::mem::take(&mut self.node_mut(id)?.children);
        for child in old {
            self.node_mut(child)?.parent = None;
        }
        if !text.is_empty() {
            let node = self.create_text(text);
            self.node_mut(node)?.parent = Some(id);
            self.node_mut(id)?.children.push(node);
        }
        self.notify(id);
        Ok(())
    }

    /// Remove every child of `id`
    pub fn clear_children(&mut self, id: NodeId) -> Result<(), DomError> {
        self.set_text_content(id, "")
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.element(parent)?;
        self.node(child)?;
        if child == self.root || self.contains(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        Ok(())
    }

    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(node) = self.nodes.get_mut(parent.0) {
            node.children.retain(|child| *child != id);
        }
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.parent = None;
        }
        self.notify(parent);
    }

    // =========================================================
    // Observation
    // =========================================================

    pub(crate) fn register_observer(&mut self, observer: MutationObserver) {
        if !self.observers.iter().any(|o| o.same_as(&observer)) {
            self.observers.push(observer);
        }
    }

    fn notify(&mut self, target: NodeId) {
        self.mutation_count += 1;
        let record = MutationRecord { target };
        for observer in &self.observers {
            observer.deliver(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_shape() {
        let doc = Document::new();
        assert_eq!(doc.tag(doc.root()), Some("html"));
        assert_eq!(doc.tag(doc.body()), Some("body"));
        assert_eq!(doc.parent(doc.body()), Some(doc.root()));
        assert!(doc.is_connected(doc.body()));
    }

    #[test]
    fn test_insert_before_and_after() {
        let mut doc = Document::new();
        let body = doc.body();
        let a = doc.create_element_with("p", &[("id", "a")]);
        let b = doc.create_element_with("p", &[("id", "b")]);
        let c = doc.create_element_with("p", &[("id", "c")]);
        doc.append_child(body, b).unwrap();
        doc.insert_before(body, a, b).unwrap();
        doc.insert_after(b, c).unwrap();

        assert_eq!(doc.children(body), &[a, b, c]);
    }

    #[test]
    fn test_append_moves_node() {
        let mut doc = Document::new();
        let body = doc.body();
        let first = doc.create_element("div");
        let second = doc.create_element("div");
        let child = doc.create_element("span");
        doc.append_child(body, first).unwrap();
        doc.append_child(body, second).unwrap();
        doc.append_child(first, child).unwrap();
        doc.append_child(second, child).unwrap();

        assert!(doc.children(first).is_empty());
        assert_eq!(doc.parent(child), Some(second));
    }

    #[test]
    fn test_cycle_is_rejected() {
        let mut doc = Document::new();
        let outer = doc.create_element("div");
        let inner = doc.create_element("div");
        doc.append_child(outer, inner).unwrap();

        let err = doc.append_child(inner, outer).unwrap_err();
        assert!(matches!(err, DomError::HierarchyRequest { .. }));
    }

    #[test]
    fn test_get_element_by_id_ignores_detached() {
        let mut doc = Document::new();
        let div = doc.create_element_with("div", &[("id", "chart")]);
        assert_eq!(doc.get_element_by_id("chart"), None);

        doc.append_child(doc.body(), div).unwrap();
        assert_eq!(doc.get_element_by_id("chart"), Some(div));

        doc.remove(div).unwrap();
        assert_eq!(doc.get_element_by_id("chart"), None);
    }

    #[test]
    fn test_text_content_and_replace() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        let b = doc.create_element("b");
        let t1 = doc.create_text("Total: ");
        let t2 = doc.create_text("$3.50");
        doc.append_child(p, t1).unwrap();
        doc.append_child(b, t2).unwrap();
        doc.append_child(p, b).unwrap();
        assert_eq!(doc.text_content(p), "Total: $3.50");

        doc.set_text_content(p, "replaced").unwrap();
        assert_eq!(doc.text_content(p), "replaced");
        assert_eq!(doc.children(p).len(), 1);
    }

    #[test]
    fn test_classes() {
        let mut doc = Document::new();
        let root = doc.root();
        assert!(!doc.has_class(root, "dark"));
        doc.add_class(root, "dark").unwrap();
        doc.add_class(root, "dark").unwrap();
        assert_eq!(doc.attribute(root, "class"), Some("dark"));
        doc.add_class(root, "wide").unwrap();
        assert!(doc.has_class(root, "wide"));
        doc.remove_class(root, "dark").unwrap();
        assert!(!doc.has_class(root, "dark"));
    }

    #[test]
    fn test_mutation_count_tracks_child_list_changes() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        assert_eq!(doc.mutation_count(), 0);
        doc.append_child(doc.body(), div).unwrap();
        doc.set_attribute(div, "title", "x").unwrap();
        assert_eq!(doc.mutation_count(), 1);
        doc.remove(div).unwrap();
        assert_eq!(doc.mutation_count(), 2);
        // Removing a detached node changes nothing
        doc.remove(div).unwrap();
        assert_eq!(doc.mutation_count(), 2);
    }

    #[test]
    fn test_text_node_is_not_an_element() {
        let mut doc = Document::new();
        let text = doc.create_text("hello");
        let err = doc.set_attribute(text, "id", "x").unwrap_err();
        assert_eq!(err, DomError::NotAnElement(text));
    }
}
