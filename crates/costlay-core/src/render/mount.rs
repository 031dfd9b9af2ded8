//! Where render targets are inserted into the host page.

use crate::dom::{Document, DomError, NodeId};

/// Insertion position relative to an existing node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountPoint {
    After(NodeId),
    Before(NodeId),
}

/// The first `<p>` whose trimmed text equals `text`
pub fn find_heading(doc: &Document, text: &str) -> Option<NodeId> {
    doc.find_all(doc.root(), "p")
        .into_iter()
        .find(|p| doc.text_content(*p).trim() == text)
}

/// After the heading's wrapper when the heading exists, else before the table
pub fn visualization_anchor(doc: &Document, table: NodeId, heading_text: &str) -> MountPoint {
    match find_heading(doc, heading_text) {
        Some(heading) => MountPoint::After(doc.parent(heading).unwrap_or(heading)),
        None => MountPoint::Before(table),
    }
}

/// Insert `node` at `point`
pub fn mount(doc: &mut Document, node: NodeId, point: MountPoint) -> Result<(), DomError> {
    match point {
        MountPoint::After(reference) => doc.insert_after(reference, node),
        MountPoint::Before(reference) => {
            let parent = doc
                .parent(reference)
                .ok_or(DomError::Detached { node: reference })?;
            doc.insert_before(parent, node, reference)
        }
    }
}

/// Detach the connected element with `id`; returns whether one existed
pub fn remove_by_id(doc: &mut Document, id: &str) -> Result<bool, DomError> {
    match doc.get_element_by_id(id) {
        Some(node) => {
            doc.remove(node)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::build_usage_page;

    #[test]
    fn test_anchor_after_heading_wrapper() {
        let mut doc = Document::new();
        let page = build_usage_page(&mut doc, "Filtered Usage Events", &[]).unwrap();
        let wrapper = doc.parent(page.heading).unwrap();

        let point = visualization_anchor(&doc, page.table, "Filtered Usage Events");
        assert_eq!(point, MountPoint::After(wrapper));

        let div = doc.create_element("div");
        mount(&mut doc, div, point).unwrap();
        let siblings = doc.children(page.container);
        let idx = siblings.iter().position(|n| *n == wrapper).unwrap();
        assert_eq!(siblings[idx + 1], div);
    }

    #[test]
    fn test_anchor_before_table_without_heading() {
        let mut doc = Document::new();
        let page = build_usage_page(&mut doc, "Something Else", &[]).unwrap();

        let point = visualization_anchor(&doc, page.table, "Filtered Usage Events");
        assert_eq!(point, MountPoint::Before(page.table));

        let div = doc.create_element("div");
        mount(&mut doc, div, point).unwrap();
        let scroll = doc.parent(page.table).unwrap();
        assert_eq!(doc.children(scroll)[0], div);
    }

    #[test]
    fn test_heading_match_trims_whitespace() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        doc.set_text_content(p, "  Filtered Usage Events \n").unwrap();
        doc.append_child(doc.body(), p).unwrap();
        assert_eq!(find_heading(&doc, "Filtered Usage Events"), Some(p));
    }

    #[test]
    fn test_remove_by_id() {
        let mut doc = Document::new();
        let div = doc.create_element_with("div", &[("id", "x")]);
        doc.append_child(doc.body(), div).unwrap();
        assert!(remove_by_id(&mut doc, "x").unwrap());
        assert!(!remove_by_id(&mut doc, "x").unwrap());
    }
}
