use serde::{Deserialize, Serialize};

use super::filter::{contains_text, within_range};
use super::Timestamp;

/// The shape shared by reminders, notes and events.
///
/// `created` and `modified` return `None` when the host does not track the
/// timestamp for an entity; range filters never match a missing timestamp.
pub trait BaseObject {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn body(&self) -> &str;

    fn created(&self) -> Option<Timestamp> {
        None
    }

    fn modified(&self) -> Option<Timestamp> {
        None
    }
}

/// A non-owning reference to the folder, list or calendar holding an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRef {
    pub id: String,
    pub name: String,
}

impl ContainerRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Filter keys common to every entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseFilter {
    /// Case-insensitive substring of the name.
    pub name: Option<String>,
    /// Case-insensitive substring of the body.
    pub body: Option<String>,
    pub created_after: Option<Timestamp>,
    pub created_before: Option<Timestamp>,
    pub modified_after: Option<Timestamp>,
    pub modified_before: Option<Timestamp>,
}

impl BaseFilter {
    pub fn matches_base<T: BaseObject + ?Sized>(&self, record: &T) -> bool {
        contains_text(record.name(), self.name.as_deref())
            && contains_text(record.body(), self.body.as_deref())
            && within_range(record.created(), self.created_after, self.created_before)
            && within_range(record.modified(), self.modified_after, self.modified_before)
    }
}
