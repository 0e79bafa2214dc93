//! Editable list of supporting documents
//!
//! Rows are addressed by a [`DocumentId`] handed out from a monotonic counter, so
//! removing a row never changes which entry another row's state refers to.

use crate::models::{Document, DocumentId, FileRef, FileType};

/// Control shown next to a document row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowControl {
    /// Append a blank document; only the first row has it
    Add,
    /// Remove this row
    Remove(DocumentId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentEntry {
    pub id: DocumentId,
    pub document: Document,
}

#[derive(Debug, Clone)]
pub struct DocumentList {
    entries: Vec<DocumentEntry>,
    next_id: u64,
}

impl Default for DocumentList {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentList {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    pub fn from_documents(documents: Vec<Document>) -> Self {
        let mut list = Self::new();
        for document in documents {
            list.push(document);
        }
        list
    }

    fn push(&mut self, document: Document) -> DocumentId {
        let id = DocumentId(self.next_id);
        self.next_id += 1;
        self.entries.push(DocumentEntry { id, document });
        id
    }

    /// Append a blank document to the end of the list
    pub fn append(&mut self) -> DocumentId {
        self.push(Document::blank())
    }

    /// Remove the entry with `id`. Returns the removed document, if any.
    pub fn remove(&mut self, id: DocumentId) -> Option<Document> {
        let position = self.position(id)?;
        Some(self.entries.remove(position).document)
    }

    pub fn remove_at(&mut self, position: usize) -> Option<Document> {
        if position < self.entries.len() {
            Some(self.entries.remove(position).document)
        } else {
            None
        }
    }

    pub fn position(&self, id: DocumentId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.entries.iter().find(|e| e.id == id).map(|e| &e.document)
    }

    pub fn get_mut(&mut self, id: DocumentId) -> Option<&mut Document> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .map(|e| &mut e.document)
    }

    pub fn id_at(&self, position: usize) -> Option<DocumentId> {
        self.entries.get(position).map(|e| e.id)
    }

    pub fn set_file_name(&mut self, id: DocumentId, name: &str) -> bool {
        match self.get_mut(id) {
            Some(doc) => {
                doc.file_name = name.to_string();
                true
            }
            None => false,
        }
    }

    pub fn set_file_type(&mut self, id: DocumentId, file_type: FileType) -> bool {
        match self.get_mut(id) {
            Some(doc) => {
                doc.file_type = file_type;
                true
            }
            None => false,
        }
    }

    pub fn attach(&mut self, id: DocumentId, file: FileRef) -> bool {
        match self.get_mut(id) {
            Some(doc) => {
                doc.file = Some(file);
                true
            }
            None => false,
        }
    }

    pub fn detach(&mut self, id: DocumentId) -> Option<FileRef> {
        self.get_mut(id).and_then(|doc| doc.file.take())
    }

    /// Control for the row at `position`
    pub fn control_at(&self, position: usize) -> Option<RowControl> {
        let id = self.id_at(position)?;
        if position == 0 {
            Some(RowControl::Add)
        } else {
            Some(RowControl::Remove(id))
        }
    }

    /// Apply a row control. Returns the id of a newly appended row, if any.
    pub fn activate(&mut self, control: RowControl) -> Option<DocumentId> {
        match control {
            RowControl::Add => Some(self.append()),
            RowControl::Remove(id) => {
                self.remove(id);
                None
            }
        }
    }

    pub fn entries(&self) -> &[DocumentEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &DocumentEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_documents(&self) -> Vec<Document> {
        self.entries.iter().map(|e| e.document.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(list: &mut DocumentList, names: &[&str]) -> Vec<DocumentId> {
        names
            .iter()
            .map(|name| {
                let id = list.append();
                list.set_file_name(id, name);
                id
            })
            .collect()
    }

    fn names(list: &DocumentList) -> Vec<String> {
        list.iter().map(|e| e.document.file_name.clone()).collect()
    }

    #[test]
    fn test_append_adds_one_blank_document() {
        let mut list = DocumentList::from_documents(vec![Document::blank(), Document::blank()]);
        let id = list.append();
        assert_eq!(list.len(), 3);
        assert_eq!(list.position(id), Some(2));
        assert_eq!(list.get(id), Some(&Document::blank()));
    }

    #[test]
    fn test_remove_preserves_relative_order() {
        let mut list = DocumentList::new();
        named(&mut list, &["a", "b", "c", "d"]);

        assert!(list.remove_at(1).is_some());
        assert_eq!(names(&list), ["a", "c", "d"]);
        assert!(list.remove_at(7).is_none());
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_ids_survive_removal() {
        let mut list = DocumentList::new();
        let ids = named(&mut list, &["a", "b", "c"]);

        list.remove(ids[0]);
        assert_eq!(list.position(ids[2]), Some(1));
        assert!(list.set_file_name(ids[2], "c2"));
        assert_eq!(names(&list), ["b", "c2"]);

        // Removed ids are never reissued
        let fresh = list.append();
        assert!(!ids.contains(&fresh));
        assert!(!list.set_file_name(ids[0], "gone"));
    }

    #[test]
    fn test_row_controls() {
        let mut list = DocumentList::new();
        let ids = named(&mut list, &["a", "b", "c"]);

        assert_eq!(list.control_at(0), Some(RowControl::Add));
        assert_eq!(list.control_at(1), Some(RowControl::Remove(ids[1])));
        assert_eq!(list.control_at(3), None);

        let added = list.activate(RowControl::Add);
        assert_eq!(list.len(), 4);
        assert_eq!(added, list.id_at(3));

        assert_eq!(list.activate(RowControl::Remove(ids[1])), None);
        assert_eq!(names(&list), ["a", "c", ""]);
    }

    #[test]
    fn test_attach_and_detach() {
        let mut list = DocumentList::new();
        let id = list.append();
        let file = FileRef {
            path: "scan.pdf".into(),
            name: "scan.pdf".to_string(),
            size: 10,
            content_type: "application/pdf".to_string(),
        };
        assert!(list.attach(id, file.clone()));
        assert!(list.set_file_type(id, FileType::Pdf));
        assert_eq!(list.get(id).unwrap().file.as_ref(), Some(&file));
        assert_eq!(list.detach(id), Some(file));
        assert!(list.get(id).unwrap().file.is_none());
    }
}
