// src/domain/note_list.rs
use crate::domain::{Note, NoteId};
use serde::Serialize;

/// Immutable, ordered snapshot of the notes a view displays.
///
/// Workflows never mutate a snapshot in place; they hand back a new one for
/// the view layer to apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NoteList {
    notes: Vec<Note>,
}

/// A note taken out of a snapshot, remembering where it was
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedNote {
    pub index: usize,
    pub note: Note,
}

impl NoteList {
    pub fn new(notes: Vec<Note>) -> Self {
        Self { notes }
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Note> {
        self.notes.iter()
    }

    pub fn as_slice(&self) -> &[Note] {
        &self.notes
    }

    pub fn find(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id.as_ref() == Some(id))
    }

    pub fn contains(&self, id: &NoteId) -> bool {
        self.find(id).is_some()
    }

    /// Snapshot without every note carrying `id`; the first match is returned
    /// so it can be restored later.
    pub fn without(&self, id: &NoteId) -> (NoteList, Option<RemovedNote>) {
        let mut removed = None;
        let mut notes = Vec::with_capacity(self.notes.len());

        for (index, note) in self.notes.iter().enumerate() {
            if note.id.as_ref() == Some(id) {
                if removed.is_none() {
                    removed = Some(RemovedNote {
                        index,
                        note: note.clone(),
                    });
                }
            } else {
                notes.push(note.clone());
            }
        }

        (NoteList { notes }, removed)
    }

    /// Snapshot with `removed` put back at its original position, clamped to
    /// the end if the list has shrunk since.
    pub fn restore(&self, removed: RemovedNote) -> NoteList {
        let mut notes = self.notes.clone();
        let index = removed.index.min(notes.len());
        notes.insert(index, removed.note);
        NoteList { notes }
    }
}

impl From<Vec<Note>> for NoteList {
    fn from(notes: Vec<Note>) -> Self {
        Self::new(notes)
    }
}

impl<'a> IntoIterator for &'a NoteList {
    type Item = &'a Note;
    type IntoIter = std::slice::Iter<'a, Note>;

    fn into_iter(self) -> Self::IntoIter {
        self.notes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: &str, name: &str) -> Note {
        Note {
            id: Some(NoteId::new(id)),
            name: name.to_string(),
            description: format!("{name} description"),
            image: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn given_list_when_removing_middle_note_then_keeps_order_of_others() {
        // Arrange
        let list = NoteList::new(vec![note("1", "a"), note("2", "b"), note("3", "c")]);

        // Act
        let (remaining, removed) = list.without(&NoteId::new("2"));

        // Assert
        let names: Vec<_> = remaining.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
        let removed = removed.expect("note 2 was present");
        assert_eq!(removed.index, 1);
        assert_eq!(removed.note.name, "b");
    }

    #[test]
    fn given_unknown_id_when_removing_then_returns_same_notes_and_nothing_removed() {
        let list = NoteList::new(vec![note("1", "a")]);

        let (remaining, removed) = list.without(&NoteId::new("missing"));

        assert_eq!(remaining, list);
        assert!(removed.is_none());
    }

    #[test]
    fn given_removed_note_when_restoring_then_returns_to_original_index() {
        let list = NoteList::new(vec![note("1", "a"), note("2", "b"), note("3", "c")]);
        let (remaining, removed) = list.without(&NoteId::new("2"));

        let restored = remaining.restore(removed.unwrap());

        assert_eq!(restored, list);
    }

    #[test]
    fn given_shrunk_list_when_restoring_then_appends_at_end() {
        let removed = RemovedNote {
            index: 5,
            note: note("9", "z"),
        };
        let list = NoteList::new(vec![note("1", "a")]);

        let restored = list.restore(removed);

        assert_eq!(restored.len(), 2);
        assert_eq!(restored.as_slice()[1].name, "z");
    }
}
