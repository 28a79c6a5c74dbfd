use serde_json::Value;

use super::narrowed_ids;
use crate::bridge::{invoke_as, NoteField, NoteRecord, Patch, Script, SharedBridge};
use crate::error::{Error, Result};
use crate::models::filter::apply;
use crate::models::{Folder, Note, NoteFilter, UpdateNoteInput};

/// Notes across every folder of the default Notes account.
pub struct NotesService {
    bridge: SharedBridge,
}

impl NotesService {
    pub fn new(bridge: SharedBridge) -> Self {
        Self { bridge }
    }

    /// Creates a note in the folder named `folder_name`, or in the default
    /// folder when none is given.
    pub async fn create_note(&self, name: &str, body: &str, folder_name: Option<&str>) -> Result<Note> {
        let folder_id = match folder_name {
            Some(folder_name) => {
                let folder = self
                    .list_folders()
                    .await?
                    .into_iter()
                    .find(|f| f.name == folder_name)
                    .ok_or_else(|| Error::not_found(format!("Folder named {}", folder_name)))?;
                Value::from(folder.id)
            }
            None => Value::Null,
        };

        let record: NoteRecord = invoke_as(
            self.bridge.as_ref(),
            Script::CreateNote,
            vec![Value::from(name), Value::from(body), folder_id],
        )
        .await?;

        tracing::debug!(id = %record.id, folder = %record.container.name, "created note");
        Ok(record.into())
    }

    /// Lists notes, searching only the folders the filter's container keys
    /// accept.
    pub async fn list_notes(&self, filter: Option<&NoteFilter>) -> Result<Vec<Note>> {
        let folder_ids = match filter {
            Some(f) if f.narrows_containers() => {
                let folders = self.list_folders().await?;
                let ids = narrowed_ids(&folders, |id, name| {
                    f.accepts_container(&Folder::new(id, name))
                });
                if ids.is_empty() {
                    tracing::debug!("no folder matches the container filter");
                    return Ok(Vec::new());
                }
                Some(ids)
            }
            _ => None,
        };

        let notes: Vec<Note> = self
            .fetch(folder_ids)
            .await?
            .into_iter()
            .map(Note::from)
            .collect();
        let total = notes.len();
        let notes = apply(notes, filter);

        tracing::debug!(total, matched = notes.len(), "listed notes");
        Ok(notes)
    }

    /// Renames a note or replaces its body. The host bumps the modification
    /// date on any write.
    pub async fn update_note(&self, id: &str, update: UpdateNoteInput) -> Result<Note> {
        let current = self
            .fetch(None)
            .await?
            .into_iter()
            .find(|n| n.id == id)
            .ok_or_else(|| Error::not_found(format!("Note with id {}", id)))?;

        let mut patch = Patch::new();
        patch.set_some(NoteField::Name, update.name);
        patch.set_some(NoteField::Body, update.body);
        let patch = patch.retain_changes(&current);
        if patch.is_empty() {
            tracing::debug!(id, "note already up to date");
            return Ok(current.into());
        }

        tracing::debug!(id, fields = ?patch.fields(), "updating note");
        let record: NoteRecord = invoke_as(
            self.bridge.as_ref(),
            Script::UpdateNote,
            vec![Value::from(id), patch.to_value()],
        )
        .await?;
        Ok(record.into())
    }

    pub async fn list_folders(&self) -> Result<Vec<Folder>> {
        Ok(invoke_as(self.bridge.as_ref(), Script::ListFolders, vec![]).await?)
    }

    async fn fetch(&self, folder_ids: Option<Vec<String>>) -> Result<Vec<NoteRecord>> {
        let scope = folder_ids.map(Value::from).unwrap_or(Value::Null);
        Ok(invoke_as(self.bridge.as_ref(), Script::ListNotes, vec![scope]).await?)
    }
}
