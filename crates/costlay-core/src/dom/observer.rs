//! Child-list mutation observation.
//!
//! A [`MutationObserver`] is registered on a [`Document`] once and then
//! toggled with [`MutationObserver::disconnect`] / [`MutationObserver::reconnect`].
//! While disconnected, mutations are dropped rather than queued, so writes
//! made during that window are never reported.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::document::Document;
use super::node::NodeId;

/// A single child-list change under the observed document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationRecord {
    /// Node whose child list changed
    pub target: NodeId,
}

type Callback = Box<dyn Fn(MutationRecord) + Send + Sync>;

struct ObserverInner {
    callback: Callback,
    connected: AtomicBool,
}

/// Cloneable observer handle; all clones share the connection flag
#[derive(Clone)]
pub struct MutationObserver {
    inner: Arc<ObserverInner>,
}

impl MutationObserver {
    /// Create a disconnected observer that invokes `callback` per mutation
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(MutationRecord) + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(ObserverInner {
                callback: Box::new(callback),
                connected: AtomicBool::new(false),
            }),
        }
    }

    /// Register on `document` (subtree-wide) and start delivering
    pub fn observe(&self, document: &mut Document) {
        document.register_observer(self.clone());
        self.reconnect();
    }

    /// Stop delivering mutations until [`reconnect`](Self::reconnect)
    pub fn disconnect(&self) {
        self.inner.connected.store(false, Ordering::SeqCst);
    }

    /// Resume delivery on every document this observer is registered with
    pub fn reconnect(&self) {
        self.inner.connected.store(true, Ordering::SeqCst);
    }

    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::SeqCst)
    }

    pub(crate) fn same_as(&self, other: &MutationObserver) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn deliver(&self, record: MutationRecord) {
        if self.is_connected() {
            (self.inner.callback)(record);
        }
    }
}

impl fmt::Debug for MutationObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutationObserver")
            .field("connected", &self.is_connected())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn recording_observer() -> (MutationObserver, Arc<Mutex<Vec<MutationRecord>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let observer = MutationObserver::new(move |record| sink.lock().push(record));
        (observer, seen)
    }

    #[test]
    fn test_delivers_only_while_connected() {
        let mut doc = Document::new();
        let (observer, seen) = recording_observer();
        observer.observe(&mut doc);

        let div = doc.create_element("div");
        doc.append_child(doc.body(), div).unwrap();
        assert_eq!(seen.lock().len(), 1);
        assert_eq!(seen.lock()[0].target, doc.body());

        observer.disconnect();
        let span = doc.create_element("span");
        doc.append_child(div, span).unwrap();
        assert_eq!(seen.lock().len(), 1);

        observer.reconnect();
        doc.remove(span).unwrap();
        assert_eq!(seen.lock().len(), 2);
    }

    #[test]
    fn test_registering_twice_delivers_once() {
        let mut doc = Document::new();
        let (observer, seen) = recording_observer();
        observer.observe(&mut doc);
        observer.observe(&mut doc);

        let div = doc.create_element("div");
        doc.append_child(doc.body(), div).unwrap();
        assert_eq!(seen.lock().len(), 1);
    }

    #[test]
    fn test_attribute_changes_are_not_child_list_mutations() {
        let mut doc = Document::new();
        let (observer, seen) = recording_observer();
        observer.observe(&mut doc);

        doc.set_attribute(doc.body(), "data-x", "1").unwrap();
        assert!(seen.lock().is_empty());
    }
}
