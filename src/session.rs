// Edit Session - composing a new asset or editing an existing one
//
// Closed -> Creating -> Closed            (commit or cancel)
// Closed -> Viewing -> Editing -> Closed  (commit or cancel)
//
// Drafts are plain text the way the form holds them; they only become an
// AssetRecord on a successful commit.

use crate::entities::{AssetId, AssetRecord, AssetType, MAX_VALUE};
use crate::error::{SessionError, ValidationError};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionMode {
    Closed,
    Creating,
    Viewing,
    Editing,
}

impl SessionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMode::Closed => "Closed",
            SessionMode::Creating => "Creating",
            SessionMode::Viewing => "Viewing",
            SessionMode::Editing => "Editing",
        }
    }

    /// Draft fields accept input in this mode
    pub fn is_writable(&self) -> bool {
        matches!(self, SessionMode::Creating | SessionMode::Editing)
    }
}

/// Text fields of the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Name,
    Description,
    Value,
}

/// Keep only ASCII digits ("$1,200" -> "1200")
pub fn sanitize_value(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Draft {
    pub asset_type: AssetType,
    /// Digits only; empty means no value entered
    pub value: String,
    pub name: String,
    pub description: String,
}

impl Draft {
    fn from_record(record: &AssetRecord) -> Self {
        Draft {
            asset_type: record.asset_type(),
            value: record.value().to_string(),
            name: record.name().to_string(),
            description: record.description().to_string(),
        }
    }

    /// `None` when nothing was entered or the number is above `MAX_VALUE`
    pub fn parsed_value(&self) -> Option<u64> {
        if self.value.is_empty() {
            return None;
        }
        self.value.parse().ok().filter(|value| *value <= MAX_VALUE)
    }

    pub fn validate(&self) -> Result<u64, Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.asset_type.is_none() {
            errors.push(ValidationError::new("type", "a category must be selected"));
        }
        if self.name.trim().is_empty() {
            errors.push(ValidationError::new("name", "must not be blank"));
        }
        if self.description.trim().is_empty() {
            errors.push(ValidationError::new("description", "must not be blank"));
        }

        let value = self.parsed_value();
        if value.is_none() {
            let message = if self.value.is_empty() {
                "no value entered"
            } else {
                "value is too large"
            };
            errors.push(ValidationError::new("value", message));
        }

        match value {
            Some(value) if errors.is_empty() => Ok(value),
            _ => Err(errors),
        }
    }
}

impl Default for Draft {
    fn default() -> Self {
        Draft {
            asset_type: AssetType::None,
            value: String::new(),
            name: String::new(),
            description: String::new(),
        }
    }
}

/// What a successful commit produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Created(AssetRecord),
    Updated {
        original: AssetId,
        record: AssetRecord,
    },
}

#[derive(Debug, Clone)]
pub struct EditSession {
    mode: SessionMode,
    draft: Draft,
    original: Option<AssetId>,
}

impl EditSession {
    pub fn new() -> Self {
        EditSession {
            mode: SessionMode::Closed,
            draft: Draft::default(),
            original: None,
        }
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Record being viewed or edited
    pub fn original(&self) -> Option<AssetId> {
        self.original
    }

    pub fn is_open(&self) -> bool {
        self.mode != SessionMode::Closed
    }

    /// Start composing a new record; any open session is discarded
    pub fn open_for_create(&mut self) {
        self.reset(SessionMode::Creating, Draft::default(), None);
    }

    /// Show an existing record read-only; any open session is discarded
    pub fn open_for_view(&mut self, record: &AssetRecord) {
        self.reset(SessionMode::Viewing, Draft::from_record(record), Some(record.id()));
    }

    /// Make the viewed record writable
    pub fn enter_edit(&mut self) -> Result<(), SessionError> {
        match self.mode {
            SessionMode::Viewing => {
                self.transition(SessionMode::Editing);
                Ok(())
            }
            SessionMode::Closed => Err(SessionError::NotOpen),
            from => Err(SessionError::InvalidTransition {
                from: from.as_str(),
                action: "enter edit mode",
            }),
        }
    }

    /// Set a text field and return the new `can_commit`
    ///
    /// The value field is stripped to digits before it is stored.
    pub fn set_field(&mut self, field: DraftField, text: &str) -> Result<bool, SessionError> {
        self.ensure_writable("change a field")?;

        match field {
            DraftField::Name => self.draft.name = text.to_string(),
            DraftField::Description => self.draft.description = text.to_string(),
            DraftField::Value => self.draft.value = sanitize_value(text),
        }

        Ok(self.can_commit())
    }

    /// Pick the draft's category and return the new `can_commit`
    pub fn select_type(&mut self, asset_type: AssetType) -> Result<bool, SessionError> {
        self.ensure_writable("select a category")?;
        self.draft.asset_type = asset_type;
        Ok(self.can_commit())
    }

    pub fn can_commit(&self) -> bool {
        self.mode.is_writable() && self.draft.validate().is_ok()
    }

    /// Turn the draft into a record and close the session
    ///
    /// On a validation failure the session stays open with its draft intact.
    pub fn commit(&mut self) -> Result<CommitOutcome, SessionError> {
        self.ensure_writable("commit")?;

        let value = self.draft.validate().map_err(SessionError::Validation)?;
        let record = AssetRecord::new(
            self.draft.asset_type,
            value,
            &self.draft.name,
            &self.draft.description,
        );

        let outcome = match (self.mode, self.original) {
            (SessionMode::Editing, Some(original)) => CommitOutcome::Updated { original, record },
            _ => CommitOutcome::Created(record),
        };

        self.close();
        Ok(outcome)
    }

    /// Drop the draft; no catalog effect
    pub fn cancel(&mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.reset(SessionMode::Closed, Draft::default(), None);
    }

    fn reset(&mut self, mode: SessionMode, draft: Draft, original: Option<AssetId>) {
        self.transition(mode);
        self.draft = draft;
        self.original = original;
    }

    fn transition(&mut self, mode: SessionMode) {
        debug!(from = self.mode.as_str(), to = mode.as_str(), "edit session transition");
        self.mode = mode;
    }

    fn ensure_writable(&self, action: &'static str) -> Result<(), SessionError> {
        match self.mode {
            SessionMode::Closed => Err(SessionError::NotOpen),
            mode if mode.is_writable() => Ok(()),
            from => Err(SessionError::InvalidTransition {
                from: from.as_str(),
                action,
            }),
        }
    }
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new()
    }
}
