//! The document library and the user's selection.

use counsel_core::DocItem;

/// Documents known to the client and the ordered set the user selected.
///
/// Selection order matters: it is the order of `document_ids` sent with a
/// question, and `Review` uses the first entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentLibrary {
    documents: Vec<DocItem>,
    selected: Vec<String>,
}

impl DocumentLibrary {
    /// Create an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Known documents.
    #[must_use]
    pub fn documents(&self) -> &[DocItem] {
        &self.documents
    }

    /// Look up a document.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&DocItem> {
        self.documents.iter().find(|d| d.id == id)
    }

    /// Replace the document list with a fresh fetch.
    pub fn set_documents(&mut self, documents: Vec<DocItem>) {
        self.documents = documents;
    }

    /// Selected IDs, in selection order.
    #[must_use]
    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    /// Owned copy of the selection.
    #[must_use]
    pub fn selection(&self) -> Vec<String> {
        self.selected.clone()
    }

    /// Whether `id` is selected.
    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|s| s == id)
    }

    /// Flip the selection state of `id`. Returns whether it is now selected.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.is_selected(id) {
            self.deselect(id);
            false
        } else {
            self.select(id);
            true
        }
    }

    /// Append `id` to the selection.
    pub fn select(&mut self, id: &str) {
        if !self.is_selected(id) {
            self.selected.push(id.to_string());
        }
    }

    /// Put `id` at the front of the selection.
    pub fn select_first(&mut self, id: &str) {
        if !self.is_selected(id) {
            self.selected.insert(0, id.to_string());
        }
    }

    /// Remove `id` from the selection.
    pub fn deselect(&mut self, id: &str) {
        self.selected.retain(|s| s != id);
    }

    /// Drop the whole selection.
    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Drop selected IDs that are no longer in the document list.
    pub fn retain_known(&mut self) {
        let documents = &self.documents;
        self.selected.retain(|id| documents.iter().any(|d| &d.id == id));
    }

    /// Forget a deleted document.
    pub fn remove(&mut self, id: &str) {
        self.deselect(id);
        self.documents.retain(|d| d.id != id);
    }
}
