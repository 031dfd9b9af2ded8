//! The host page environment: document, location, load state, the optional
//! charting capability, and lifecycle notifications.

mod usage_table;

pub use usage_table::{build_usage_page, render_usage_rows, UsagePage, UsageRow};

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::dom::{Document, MutationRecord};
use crate::render::ChartEngine;

/// Shared page type alias
pub type SharedPage = Arc<Mutex<Page>>;

/// Document loading state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    /// Still parsing; the first cycle waits for [`PageEvent::Loaded`]
    Loading,
    /// Ready for processing
    Complete,
}

/// Notification delivered to page listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    /// A child-list mutation seen by a connected observer
    Mutation(MutationRecord),
    /// The document finished loading
    Loaded,
    /// The page is going away; listeners should dispose
    Unloaded,
}

/// Sender half used to subscribe to page notifications
pub type PageEventSender = mpsc::UnboundedSender<PageEvent>;

/// A host page as seen by the overlay
pub struct Page {
    /// The document tree (shared with the host's own rendering)
    pub document: Document,
    url: String,
    ready_state: ReadyState,
    charting: Option<Box<dyn ChartEngine>>,
    listeners: Vec<PageEventSender>,
}

impl Page {
    /// Create a fully loaded page at `url`
    pub fn new(url: &str) -> Self {
        Self {
            document: Document::new(),
            url: url.to_string(),
            ready_state: ReadyState::Complete,
            charting: None,
            listeners: Vec::new(),
        }
    }

    /// Create a page that is still loading
    pub fn loading(url: &str) -> Self {
        Self {
            ready_state: ReadyState::Loading,
            ..Self::new(url)
        }
    }

    /// Attach a charting capability
    pub fn with_charting(mut self, engine: Box<dyn ChartEngine>) -> Self {
        self.charting = Some(engine);
        self
    }

    /// Wrap into the shared handle used by the host and the overlay
    pub fn shared(self) -> SharedPage {
        Arc::new(Mutex::new(self))
    }

    /// Query string without the leading `?` (empty when absent)
    pub fn search(&self) -> &str {
        let without_fragment = self.url.split('#').next().unwrap_or_default();
        match without_fragment.split_once('?') {
            Some((_, query)) => query,
            None => "",
        }
    }

    /// Change the location (client-side navigation, no reload)
    pub fn navigate(&mut self, url: &str) {
        self.url = url.to_string();
    }

    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    /// Mark loading complete and notify listeners once
    pub fn finish_loading(&mut self) {
        if self.ready_state == ReadyState::Complete {
            return;
        }
        self.ready_state = ReadyState::Complete;
        self.broadcast(PageEvent::Loaded);
    }

    /// Notify listeners that the page is being torn down
    pub fn unload(&mut self) {
        self.broadcast(PageEvent::Unloaded);
    }

    /// Subscribe to lifecycle notifications
    pub fn add_listener(&mut self, sender: PageEventSender) {
        self.listeners.push(sender);
    }

    pub fn has_charting(&self) -> bool {
        self.charting.is_some()
    }

    /// Install or remove the charting capability
    pub fn set_charting(&mut self, engine: Option<Box<dyn ChartEngine>>) {
        self.charting = engine;
    }

    /// Split borrow of the document and the charting capability
    pub fn parts_mut(&mut self) -> (&mut Document, Option<&mut (dyn ChartEngine + 'static)>) {
        (&mut self.document, self.charting.as_deref_mut())
    }

    /// Whether the document root carries the dark-theme class
    pub fn is_dark(&self, dark_class: &str) -> bool {
        self.document.has_class(self.document.root(), dark_class)
    }

    fn broadcast(&mut self, event: PageEvent) {
        self.listeners.retain(|tx| tx.send(event).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_extraction() {
        assert_eq!(
            Page::new("https://cursor.com/dashboard?tab=usage").search(),
            "tab=usage"
        );
        assert_eq!(
            Page::new("https://cursor.com/dashboard?tab=usage&page=2#top").search(),
            "tab=usage&page=2"
        );
        assert_eq!(Page::new("https://cursor.com/dashboard").search(), "");
    }

    #[test]
    fn test_finish_loading_notifies_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut page = Page::loading("https://cursor.com/dashboard?tab=usage");
        page.add_listener(tx);
        assert_eq!(page.ready_state(), ReadyState::Loading);

        page.finish_loading();
        page.finish_loading();
        assert_eq!(page.ready_state(), ReadyState::Complete);
        assert_eq!(rx.try_recv().ok(), Some(PageEvent::Loaded));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_listeners_are_dropped() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut page = Page::new("https://cursor.com/dashboard");
        page.add_listener(tx);
        drop(rx);
        page.unload();
        assert!(page.listeners.is_empty());
    }

    #[test]
    fn test_dark_theme_detection() {
        let mut page = Page::new("https://cursor.com/dashboard");
        assert!(!page.is_dark("dark"));
        let root = page.document.root();
        page.document.add_class(root, "dark").unwrap();
        assert!(page.is_dark("dark"));
    }
}
