//! Admin editor panels.
//!
//! A [`CollectionEditor`] manages one ordered table; a [`SingletonEditor`]
//! manages a single-row table. Both keep a local copy of the rows and at most
//! one draft, and write through to the store only on `save`, `add`, and
//! `remove`.
//!
//! ## Row states
//!
//! ```text
//! viewing ──start_edit──▶ editing ──save ok──▶ viewing
//!                           │  ▲
//!                 cancel ◀──┘  └── save failed (draft kept)
//! ```
//!
//! Starting an edit on another row replaces the current draft. `save` holds
//! `&mut self` for its whole duration, which is the "saving" state: nothing
//! else can touch the editor until it returns.
//!
//! ## Notifications
//!
//! Every write emits exactly one notification: success on the store's
//! confirmation, error otherwise. Local-only operations (`start_edit`,
//! `update_field`, `cancel`) emit nothing. A declined delete confirmation
//! emits nothing either.
//!
//! ## Patches
//!
//! `update_field` takes a JSON object and merges it into the draft: object
//! keys replace, nested objects merge, arrays replace. The merged value must
//! still deserialize into the record type, so a wrong type or an unknown
//! icon name is rejected and the draft is left as it was.

use crate::cache::QueryCache;
use crate::content::{Insertable, Ordered, Record, Singleton, ValidationError};
use crate::notify::{Confirm, Notification, Notifier, sentence_case};
use crate::repo;
use crate::store::{ContentStore, ID_COLUMN, REVISION_COLUMN, StoreError};
use crate::upload::{ImageFile, ImageUploader, UploadError};
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("no {noun} with id {id}")]
    UnknownRow { noun: &'static str, id: String },
    #[error("not editing {noun} {id}")]
    NotEditing { noun: &'static str, id: String },
    #[error("{field} cannot be changed")]
    ReadOnlyField { field: String },
    #[error("invalid change: {0}")]
    InvalidPatch(String),
    #[error("no unsaved changes")]
    NothingToSave,
    #[error("{noun} has not been set up yet")]
    NotSeeded { noun: &'static str },
}

/// Merge `patch` into `draft` and re-check it against the record type.
fn apply_patch<R: Record>(draft: &R, patch: Value) -> Result<R, EditorError> {
    let Value::Object(fields) = patch else {
        return Err(EditorError::InvalidPatch(
            "expected an object of field values".into(),
        ));
    };
    if let Some(field) = fields.keys().find(|key| {
        key.as_str() == ID_COLUMN || key.as_str() == REVISION_COLUMN || R::READ_ONLY.contains(&key.as_str())
    }) {
        return Err(EditorError::ReadOnlyField {
            field: field.clone(),
        });
    }

    let mut value = serde_json::to_value(draft).map_err(|e| EditorError::InvalidPatch(e.to_string()))?;
    repo::merge_json(&mut value, Value::Object(fields));
    serde_json::from_value(value).map_err(|e| EditorError::InvalidPatch(e.to_string()))
}

/// Whether `field` names an image-capable column of `R`.
fn has_field<R: Record>(draft: &R, field: &str) -> bool {
    match serde_json::to_value(draft) {
        Ok(Value::Object(map)) => matches!(map.get(field), Some(Value::String(_) | Value::Null)),
        _ => false,
    }
}

/// Draft of the row currently in edit mode.
#[derive(Debug, Clone)]
struct Draft<R> {
    id: String,
    record: R,
}

pub struct CollectionEditor<'a, R: Ordered> {
    store: &'a dyn ContentStore,
    notifier: &'a dyn Notifier,
    cache: Option<&'a QueryCache>,
    rows: Vec<R>,
    loaded: bool,
    draft: Option<Draft<R>>,
}

impl<'a, R: Ordered> CollectionEditor<'a, R> {
    pub fn new(store: &'a dyn ContentStore, notifier: &'a dyn Notifier) -> Self {
        Self {
            store,
            notifier,
            cache: None,
            rows: Vec::new(),
            loaded: false,
            draft: None,
        }
    }

    /// Drop cached reads of this table after every successful write.
    pub fn invalidating(mut self, cache: &'a QueryCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Fetch rows in display order. On failure the previous list is kept.
    pub fn list(&mut self) -> Result<&[R], EditorError> {
        match repo::list::<R>(self.store) {
            Ok(rows) => {
                self.rows = rows;
                self.loaded = true;
                Ok(&self.rows)
            }
            Err(e) => {
                tracing::warn!(table = %R::TABLE, error = %e, "list failed");
                self.notifier
                    .notify(Notification::error(format!("Failed to load {}", R::PLURAL)));
                Err(e.into())
            }
        }
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.draft.as_ref().map(|d| d.id.as_str())
    }

    pub fn draft(&self) -> Option<&R> {
        self.draft.as_ref().map(|d| &d.record)
    }

    fn find(&self, id: &str) -> Result<&R, EditorError> {
        self.rows
            .iter()
            .find(|r| r.id() == id)
            .ok_or_else(|| EditorError::UnknownRow {
                noun: R::NOUN,
                id: id.to_string(),
            })
    }

    fn draft_for(&mut self, id: &str) -> Result<&mut Draft<R>, EditorError> {
        match &mut self.draft {
            Some(draft) if draft.id == id => Ok(draft),
            _ => Err(EditorError::NotEditing {
                noun: R::NOUN,
                id: id.to_string(),
            }),
        }
    }

    /// Enter edit mode on `id`, abandoning any other draft.
    pub fn start_edit(&mut self, id: &str) -> Result<(), EditorError> {
        let record = self.find(id)?.clone();
        self.draft = Some(Draft {
            id: id.to_string(),
            record,
        });
        Ok(())
    }

    pub fn update_field(&mut self, id: &str, patch: Value) -> Result<(), EditorError> {
        let draft = self.draft_for(id)?;
        draft.record = apply_patch(&draft.record, patch)?;
        Ok(())
    }

    pub fn cancel(&mut self) {
        self.draft = None;
    }

    /// Upload `file` and put its URL into `field` of the draft. The draft is
    /// not saved.
    pub fn attach_image(
        &mut self,
        id: &str,
        field: &str,
        uploader: &ImageUploader<'_>,
        file: &ImageFile,
    ) -> Result<String, EditorError> {
        let draft = self.draft_for(id)?;
        if !has_field(&draft.record, field) {
            return Err(EditorError::InvalidPatch(format!(
                "{} has no image field `{field}`",
                R::NOUN
            )));
        }
        let url = uploader.upload(file, R::UPLOAD_FOLDER)?;
        draft.record = apply_patch(&draft.record, json!({ field: url }))?;
        Ok(url)
    }

    /// Write the draft back. Leaves edit mode only on success.
    pub fn save(&mut self) -> Result<R, EditorError> {
        let Some(draft) = &self.draft else {
            return Err(EditorError::NothingToSave);
        };
        let result = draft
            .record
            .validate()
            .map_err(EditorError::from)
            .and_then(|()| repo::update(self.store, &draft.record).map_err(EditorError::from));

        match result {
            Ok(saved) => {
                if let Some(slot) = self.rows.iter_mut().find(|r| r.id() == saved.id()) {
                    *slot = saved.clone();
                }
                self.rows.sort_by(R::display_cmp);
                self.draft = None;
                self.invalidate();
                self.notifier.notify(Notification::success(format!(
                    "{} updated!",
                    sentence_case(R::NOUN)
                )));
                Ok(saved)
            }
            Err(e) => {
                tracing::warn!(table = %R::TABLE, error = %e, "save failed");
                self.notifier.notify(Notification::error(format!(
                    "Failed to save {}: {e}",
                    R::NOUN
                )));
                Err(e)
            }
        }
    }

    fn invalidate(&self) {
        if let Some(cache) = self.cache {
            cache.invalidate(R::TABLE);
        }
    }
}

impl<R: Insertable> CollectionEditor<'_, R> {
    /// Insert a placeholder at the end and start editing it. Lists the table
    /// first if it has not been listed yet.
    pub fn add(&mut self) -> Result<R, EditorError> {
        if !self.loaded {
            self.list()?;
        }
        let placeholder = R::placeholder(self.rows.len(), chrono::Utc::now());
        match repo::insert(self.store, &placeholder) {
            Ok(stored) => {
                self.rows.push(stored.clone());
                self.rows.sort_by(R::display_cmp);
                self.draft = Some(Draft {
                    id: stored.id().to_string(),
                    record: stored.clone(),
                });
                self.invalidate();
                self.notifier.notify(Notification::success(format!(
                    "{} added!",
                    sentence_case(R::NOUN)
                )));
                Ok(stored)
            }
            Err(e) => {
                tracing::warn!(table = %R::TABLE, error = %e, "add failed");
                self.notifier
                    .notify(Notification::error(format!("Failed to add {}: {e}", R::NOUN)));
                Err(e.into())
            }
        }
    }

    /// Delete `id` after confirmation. Returns `Ok(false)` when declined.
    pub fn remove(&mut self, id: &str, confirm: &dyn Confirm) -> Result<bool, EditorError> {
        self.find(id)?;
        if !confirm.confirm(&format!("Delete this {}?", R::NOUN)) {
            return Ok(false);
        }
        match repo::delete::<R>(self.store, id) {
            Ok(()) => {
                self.rows.retain(|r| r.id() != id);
                if self.editing_id() == Some(id) {
                    self.draft = None;
                }
                self.invalidate();
                self.notifier.notify(Notification::success(format!(
                    "{} deleted!",
                    sentence_case(R::NOUN)
                )));
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(table = %R::TABLE, error = %e, "delete failed");
                self.notifier.notify(Notification::error(format!(
                    "Failed to delete {}: {e}",
                    R::NOUN
                )));
                Err(e.into())
            }
        }
    }
}

/// Editor for a single-row table. Never inserts: a missing row means the
/// table has not been seeded, and the editor has nothing to edit.
pub struct SingletonEditor<'a, R: Singleton> {
    store: &'a dyn ContentStore,
    notifier: &'a dyn Notifier,
    cache: Option<&'a QueryCache>,
    record: Option<R>,
    draft: Option<R>,
}

impl<'a, R: Singleton> SingletonEditor<'a, R> {
    pub fn new(store: &'a dyn ContentStore, notifier: &'a dyn Notifier) -> Self {
        Self {
            store,
            notifier,
            cache: None,
            record: None,
            draft: None,
        }
    }

    pub fn invalidating(mut self, cache: &'a QueryCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn load(&mut self) -> Result<Option<&R>, EditorError> {
        match repo::fetch_single::<R>(self.store) {
            Ok(record) => {
                self.record = record;
                Ok(self.record.as_ref())
            }
            Err(e) => {
                tracing::warn!(table = %R::TABLE, error = %e, "load failed");
                self.notifier
                    .notify(Notification::error(format!("Failed to load {}", R::PLURAL)));
                Err(e.into())
            }
        }
    }

    pub fn record(&self) -> Option<&R> {
        self.record.as_ref()
    }

    pub fn draft(&self) -> Option<&R> {
        self.draft.as_ref()
    }

    /// The draft, started from the loaded row if there is none yet.
    fn draft_mut(&mut self) -> Result<&mut R, EditorError> {
        if self.draft.is_none() {
            let record = self
                .record
                .clone()
                .ok_or(EditorError::NotSeeded { noun: R::NOUN })?;
            self.draft = Some(record);
        }
        self.draft
            .as_mut()
            .ok_or(EditorError::NotSeeded { noun: R::NOUN })
    }

    pub fn update_field(&mut self, patch: Value) -> Result<(), EditorError> {
        let draft = self.draft_mut()?;
        *draft = apply_patch(draft, patch)?;
        Ok(())
    }

    pub fn cancel(&mut self) {
        self.draft = None;
    }

    pub fn attach_image(
        &mut self,
        field: &str,
        uploader: &ImageUploader<'_>,
        file: &ImageFile,
    ) -> Result<String, EditorError> {
        let draft = self.draft_mut()?;
        if !has_field(draft, field) {
            return Err(EditorError::InvalidPatch(format!(
                "{} has no image field `{field}`",
                R::NOUN
            )));
        }
        let url = uploader.upload(file, R::UPLOAD_FOLDER)?;
        *draft = apply_patch(draft, json!({ field: url }))?;
        Ok(url)
    }

    pub fn save(&mut self) -> Result<R, EditorError> {
        let Some(draft) = &self.draft else {
            return Err(EditorError::NothingToSave);
        };
        let result = draft
            .validate()
            .map_err(EditorError::from)
            .and_then(|()| repo::update(self.store, draft).map_err(EditorError::from));

        match result {
            Ok(saved) => {
                self.record = Some(saved.clone());
                self.draft = None;
                if let Some(cache) = self.cache {
                    cache.invalidate(R::TABLE);
                }
                self.notifier.notify(Notification::success(format!(
                    "{} updated!",
                    sentence_case(R::NOUN)
                )));
                Ok(saved)
            }
            Err(e) => {
                tracing::warn!(table = %R::TABLE, error = %e, "save failed");
                self.notifier.notify(Notification::error(format!(
                    "Failed to save {}: {e}",
                    R::NOUN
                )));
                Err(e)
            }
        }
    }
}
