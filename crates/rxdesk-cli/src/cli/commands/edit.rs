//! `rxdesk create` and `rxdesk update`: drive the form controller from a
//! JSON object so the same validation runs as on the edit screens.

use super::print_notices;
use anyhow::{bail, Context, Result};
use rxdesk_core::form::{FormController, FormMode, SubmitError};
use rxdesk_core::resource::{Backend, RecordId, Resource, ResourceApi, ResourceClient};
use rxdesk_core::transport::{run_blocking, FilePart};
use serde_json::{Map, Value};
use std::io::Read;
use std::path::Path;

pub async fn run_create(
    backend: &Backend,
    resource: Resource,
    json: &Path,
    attachments: &[String],
) -> Result<()> {
    let values = read_values(json)?;
    let files = read_attachments(attachments)?;
    let form = FormController::for_resource(backend.client(resource), FormMode::Create);
    submit(form, values, files).await
}

pub async fn run_update(
    backend: &Backend,
    resource: Resource,
    id: RecordId,
    json: &Path,
    attachments: &[String],
) -> Result<()> {
    let values = read_values(json)?;
    let files = read_attachments(attachments)?;
    let form = FormController::for_resource(backend.client(resource), FormMode::Edit(id));
    submit(form, values, files).await
}

async fn submit(
    mut form: FormController<ResourceClient>,
    values: Map<String, Value>,
    files: Vec<FilePart>,
) -> Result<()> {
    let resource = form.api().resource();
    let outcome = run_blocking(move || -> Result<_> {
        if matches!(form.mode(), FormMode::Edit(_)) {
            form.load()?;
        }
        for (name, value) in values {
            if !form.fields().iter().any(|f| f.name == name) {
                tracing::warn!("ignoring {} field not on the {} form", name, resource);
                continue;
            }
            form.set_value(&name, value)?;
        }
        for file in files {
            let field = file.field.clone();
            form.select_file(&field, file)?;
        }
        let result = form.submit();
        print_notices(form.take_notices());
        match result {
            Ok(outcome) => Ok(outcome),
            Err(SubmitError::Invalid(errors)) => {
                for (field, message) in errors.iter() {
                    eprintln!("  {field}: {message}");
                }
                bail!("{} form has {} invalid field(s)", resource, errors.len())
            }
            Err(e) => Err(e.into()),
        }
    })
    .await??;
    println!("{} {} saved", resource, outcome.record.id);
    Ok(())
}

fn read_values(path: &Path) -> Result<Map<String, Value>> {
    let mut text = String::new();
    if path == Path::new("-") {
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading JSON from stdin")?;
    } else {
        text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
    }
    parse_values(&text)
}

pub(crate) fn parse_values(text: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(text).context("invalid JSON")? {
        Value::Object(map) => Ok(map),
        _ => bail!("expected a JSON object with field values"),
    }
}

fn read_attachments(raw: &[String]) -> Result<Vec<FilePart>> {
    raw.iter()
        .map(|a| {
            let (field, path) = a
                .split_once('=')
                .with_context(|| format!("--attach expects FIELD=PATH, got {a}"))?;
            let path = Path::new(path);
            let bytes =
                std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| field.to_string());
            Ok(FilePart {
                field: field.to_string(),
                file_name,
                content_type: None,
                bytes,
            })
        })
        .collect()
}
