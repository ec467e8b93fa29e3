//! Create/edit form state machine shared by every resource screen.
//!
//! `Pristine -> Editing -> Submitting -> {Submitted, Failed}`; edit mode
//! starts in `Loading` until the existing record arrives. A failed submit
//! keeps every value, and the next edit returns the form to `Editing`.

mod field;
mod file;
mod schema;
mod validate;

pub use field::{as_number, is_blank, Condition, FieldFormat, FieldKind, FieldSpec};
pub(crate) use field::is_iso_date;
pub use file::{FileValue, PreviewRegistry, PreviewUrl};
pub use schema::schema_for;
pub use validate::ValidationErrors;

use crate::error::RequestFailed;
use crate::notice::{capitalize, Notice};
use crate::page::PageRequest;
use crate::resource::{Payload, RecordId, Resource, ResourceApi, ResourceRecord};
use crate::transport::FilePart;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Pristine,
    Loading,
    Editing,
    Submitting,
    Submitted,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(RecordId),
}

/// Returned by a successful submit: the saved record and the list screen
/// control goes back to.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub record: ResourceRecord,
    pub return_to: Resource,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("{0}")]
    Invalid(ValidationErrors),
    #[error("the form is busy ({0:?})")]
    Busy(FormPhase),
    #[error("the record has not been loaded")]
    NotLoaded,
    #[error(transparent)]
    Request(#[from] RequestFailed),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("unknown field: {0}")]
    Unknown(String),
    #[error("{0} is not a file field")]
    NotAFile(String),
    #[error("{0} is a file field")]
    IsAFile(String),
}

pub struct FormController<A: ResourceApi> {
    api: A,
    fields: Vec<FieldSpec>,
    mode: FormMode,
    phase: FormPhase,
    initial: Map<String, Value>,
    initial_files: BTreeMap<String, FileValue>,
    values: Map<String, Value>,
    files: BTreeMap<String, FileValue>,
    errors: ValidationErrors,
    previews: PreviewRegistry,
    options: BTreeMap<String, Vec<ResourceRecord>>,
    last_error: Option<String>,
    notices: Vec<Notice>,
    /// False in edit mode until `load` succeeds.
    loaded: bool,
}

impl<A: ResourceApi> FormController<A> {
    /// Form over the resource's standard field set.
    pub fn for_resource(api: A, mode: FormMode) -> Self {
        let fields = schema_for(api.resource()).to_vec();
        Self::new(api, fields, mode)
    }

    pub fn new(api: A, fields: Vec<FieldSpec>, mode: FormMode) -> Self {
        let (phase, loaded) = match mode {
            FormMode::Create => (FormPhase::Pristine, true),
            FormMode::Edit(_) => (FormPhase::Loading, false),
        };
        let files: BTreeMap<String, FileValue> = fields
            .iter()
            .filter(|f| f.kind == FieldKind::File)
            .map(|f| (f.name.to_string(), FileValue::Empty))
            .collect();
        Self {
            api,
            fields,
            mode,
            phase,
            initial: Map::new(),
            initial_files: files.clone(),
            values: Map::new(),
            files,
            errors: ValidationErrors::new(),
            previews: PreviewRegistry::default(),
            options: BTreeMap::new(),
            last_error: None,
            notices: Vec::new(),
            loaded,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn file(&self, name: &str) -> Option<&FileValue> {
        self.files.get(name)
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name)
    }

    /// True once there is a record to edit; always true in create mode.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Message of the last failed load or submit.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Number of preview handles not yet released.
    pub fn live_previews(&self) -> usize {
        self.previews.live()
    }

    /// Option list loaded with [`FormController::load_options`].
    pub fn options(&self, key: &str) -> &[ResourceRecord] {
        self.options.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn spec(&self, name: &str) -> Result<&FieldSpec, FieldError> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| FieldError::Unknown(name.to_string()))
    }

    fn touch(&mut self) {
        if matches!(
            self.phase,
            FormPhase::Pristine | FormPhase::Failed | FormPhase::Submitted
        ) {
            self.phase = FormPhase::Editing;
        }
    }

    /// Edit mode: fetches the record and enters `Editing`. A failure leaves
    /// the form in `Failed` with the message in `last_error`.
    pub fn load(&mut self) -> Result<(), RequestFailed> {
        let FormMode::Edit(id) = &self.mode else {
            return Ok(());
        };
        self.phase = FormPhase::Loading;
        match self.api.get_by_id(id) {
            Ok(record) => {
                self.fill(&record);
                self.loaded = true;
                self.phase = FormPhase::Editing;
                tracing::debug!("loaded {} {} into form", self.api.resource(), record.id);
                Ok(())
            }
            Err(e) => {
                self.last_error = Some(e.message.clone());
                self.notices.push(Notice::failure(e.message.clone()));
                self.phase = FormPhase::Failed;
                Err(e)
            }
        }
    }

    fn fill(&mut self, record: &ResourceRecord) {
        let mut values = Map::new();
        let mut files = BTreeMap::new();
        for spec in &self.fields {
            let value = record.get(spec.name).cloned().unwrap_or(Value::Null);
            if spec.kind == FieldKind::File {
                let file = match value {
                    Value::String(s) if !s.is_empty() => FileValue::Persisted(s),
                    _ => FileValue::Empty,
                };
                files.insert(spec.name.to_string(), file);
            } else if !value.is_null() {
                values.insert(spec.name.to_string(), value);
            }
        }
        self.initial = values.clone();
        self.initial_files = files.clone();
        self.values = values;
        self.release_all_previews();
        self.files = files;
        self.errors.clear();
    }

    /// Loads an option list (e.g. manufacturers for the supplier form). A
    /// failure is reported as a notice and does not block the form.
    pub fn load_options(
        &mut self,
        key: &str,
        source: &dyn ResourceApi,
        request: &PageRequest,
    ) -> bool {
        match source.list(request) {
            Ok(page) => {
                self.options.insert(key.to_string(), page.items);
                true
            }
            Err(e) => {
                tracing::warn!("option list {} failed to load: {}", key, e);
                self.options.remove(key);
                self.notices.push(Notice::failure(e.message));
                false
            }
        }
    }

    pub fn set_value(&mut self, name: &str, value: Value) -> Result<(), FieldError> {
        if self.spec(name)?.kind == FieldKind::File {
            return Err(FieldError::IsAFile(name.to_string()));
        }
        if value.is_null() {
            self.values.remove(name);
        } else {
            self.values.insert(name.to_string(), value);
        }
        self.touch();
        Ok(())
    }

    /// Attaches a newly picked file. A previous selection's preview is released.
    pub fn select_file(&mut self, name: &str, mut file: FilePart) -> Result<&PreviewUrl, FieldError> {
        if self.spec(name)?.kind != FieldKind::File {
            return Err(FieldError::NotAFile(name.to_string()));
        }
        self.release_preview(name);
        file.field = name.to_string();
        let preview = self.previews.create(&file.file_name);
        self.files
            .insert(name.to_string(), FileValue::Selected { file, preview });
        self.touch();
        match self.files.get(name).and_then(FileValue::preview) {
            Some(p) => Ok(p),
            None => Err(FieldError::NotAFile(name.to_string())),
        }
    }

    pub fn clear_file(&mut self, name: &str) -> Result<(), FieldError> {
        if self.spec(name)?.kind != FieldKind::File {
            return Err(FieldError::NotAFile(name.to_string()));
        }
        self.release_preview(name);
        self.files.insert(name.to_string(), FileValue::Empty);
        self.touch();
        Ok(())
    }

    fn release_preview(&mut self, name: &str) {
        if let Some(preview) = self.files.get(name).and_then(FileValue::preview) {
            self.previews.release(preview);
        }
    }

    fn release_all_previews(&mut self) {
        for preview in self.files.values().filter_map(FileValue::preview) {
            self.previews.release(preview);
        }
    }

    fn check(&self, spec: &FieldSpec) -> Result<(), String> {
        if spec.kind == FieldKind::File {
            let attached = self.files.get(spec.name).is_some_and(|f| !f.is_empty());
            if !attached && spec.is_required(&self.values) {
                return Err(format!("{} is required", spec.label));
            }
            return Ok(());
        }
        spec.check(self.values.get(spec.name), &self.values)
    }

    /// Validates one field when it loses focus; returns its message, if any.
    pub fn blur(&mut self, name: &str) -> Result<Option<&str>, FieldError> {
        let spec = self.spec(name)?.clone();
        match self.check(&spec) {
            Ok(()) => self.errors.remove(name),
            Err(message) => self.errors.insert(name, message),
        }
        Ok(self.errors.get(name))
    }

    pub fn validate_all(&mut self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for spec in &self.fields {
            if let Err(message) = self.check(spec) {
                errors.insert(spec.name, message);
            }
        }
        self.errors = errors.clone();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Request body for the current values. Blank values are left out,
    /// required booleans default to false, numeric text becomes a number.
    /// Forms with file fields go out as multipart carrying only new files.
    pub fn payload(&self) -> Payload {
        let mut out = Map::new();
        for spec in &self.fields {
            if spec.kind == FieldKind::File {
                continue;
            }
            let value = self.values.get(spec.name).cloned().unwrap_or(Value::Null);
            let value = if is_blank(&value) {
                if spec.kind == FieldKind::Boolean && spec.is_required(&self.values) {
                    Value::Bool(false)
                } else {
                    continue;
                }
            } else if spec.kind == FieldKind::Number {
                number_value(&value).unwrap_or(value)
            } else {
                value
            };
            out.insert(spec.name.to_string(), value);
        }
        let has_file_fields = self.fields.iter().any(|f| f.kind == FieldKind::File);
        if !has_file_fields {
            return Payload::Json(out);
        }
        let files = self
            .files
            .values()
            .filter_map(FileValue::upload_part)
            .cloned()
            .collect();
        Payload::multipart(&out, files)
    }

    /// Validates, then creates or updates. Nothing is sent while any field
    /// is invalid.
    pub fn submit(&mut self) -> Result<SubmitOutcome, SubmitError> {
        self.submit_with(Ok)
    }

    /// Like [`FormController::submit`], with `finish` completing the payload
    /// after the fields validated. An error from `finish` blocks the send.
    pub fn submit_with<F>(&mut self, finish: F) -> Result<SubmitOutcome, SubmitError>
    where
        F: FnOnce(Payload) -> Result<Payload, ValidationErrors>,
    {
        if matches!(self.phase, FormPhase::Loading | FormPhase::Submitting) {
            return Err(SubmitError::Busy(self.phase));
        }
        if !self.loaded {
            return Err(SubmitError::NotLoaded);
        }
        self.validate_all().map_err(SubmitError::Invalid)?;
        let payload = finish(self.payload()).map_err(SubmitError::Invalid)?;
        self.phase = FormPhase::Submitting;
        let resource = self.api.resource();
        let (result, verb) = match &self.mode {
            FormMode::Create => (self.api.create(payload), "created"),
            FormMode::Edit(id) => (self.api.update(id, payload), "updated"),
        };
        match result {
            Ok(record) => {
                self.notices.push(Notice::success(format!(
                    "{} {} successfully",
                    capitalize(resource.singular()),
                    verb
                )));
                self.reset();
                self.phase = FormPhase::Submitted;
                self.last_error = None;
                tracing::info!("{} {} {}", resource, record.id, verb);
                Ok(SubmitOutcome {
                    record,
                    return_to: resource,
                })
            }
            Err(e) => {
                tracing::warn!("submit of {} form failed: {}", resource, e);
                self.last_error = Some(e.message.clone());
                self.notices.push(Notice::failure(e.message.clone()));
                self.phase = FormPhase::Failed;
                Err(SubmitError::Request(e))
            }
        }
    }

    /// Back to the initial values; every live preview is released.
    pub fn reset(&mut self) {
        self.release_all_previews();
        self.values = self.initial.clone();
        self.files = self.initial_files.clone();
        self.errors.clear();
        if self.phase == FormPhase::Editing {
            self.phase = match self.mode {
                FormMode::Create => FormPhase::Pristine,
                FormMode::Edit(_) => FormPhase::Editing,
            };
        }
    }

    /// Form abandoned: releases previews without sending anything.
    pub fn dispose(&mut self) {
        self.release_all_previews();
        self.files = self.initial_files.clone();
    }
}

fn number_value(value: &Value) -> Option<Value> {
    if value.is_number() {
        return Some(value.clone());
    }
    let text = value.as_str()?.trim();
    if let Ok(i) = text.parse::<i64>() {
        return Some(Value::from(i));
    }
    as_number(value)
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
}
