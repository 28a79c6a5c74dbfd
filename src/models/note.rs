use serde::{Deserialize, Serialize};

use super::filter::{equals, Matches};
use super::{BaseFilter, BaseObject, ContainerRef, Timestamp};

/// A note from the Notes application.
///
/// Every note belongs to exactly one folder (`container`). The dates and
/// `plain_text` are host-derived and read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub name: String,
    /// HTML body as stored by the host.
    pub body: String,
    pub creation_date: Timestamp,
    pub modification_date: Timestamp,
    pub plain_text: String,
    pub container: ContainerRef,
}

impl BaseObject for Note {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn body(&self) -> &str {
        &self.body
    }

    fn created(&self) -> Option<Timestamp> {
        Some(self.creation_date)
    }

    fn modified(&self) -> Option<Timestamp> {
        Some(self.modification_date)
    }
}

/// A Notes folder.
pub type Folder = ContainerRef;

/// Filter for listing notes.
///
/// `container_id` and `container_name` are independent exact filters: when
/// both are given a folder must satisfy both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteFilter {
    #[serde(flatten)]
    pub base: BaseFilter,
    pub container_id: Option<String>,
    pub container_name: Option<String>,
}

impl NoteFilter {
    /// Whether the filter narrows the set of folders searched.
    pub fn narrows_containers(&self) -> bool {
        self.container_id.is_some() || self.container_name.is_some()
    }

    pub fn accepts_container(&self, container: &ContainerRef) -> bool {
        equals(container.id.as_str(), self.container_id.as_deref())
            && equals(container.name.as_str(), self.container_name.as_deref())
    }
}

impl Matches<Note> for NoteFilter {
    fn matches(&self, note: &Note) -> bool {
        self.base.matches_base(note) && self.accepts_container(&note.container)
    }
}

/// Sparse update for a note. Only the title and body are writable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteInput {
    pub name: Option<String>,
    pub body: Option<String>,
}
