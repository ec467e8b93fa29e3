//! libcurl transport (curl crate, `Easy` handle per request).

use super::headers::parse_header_lines;
use super::{FormPart, HttpRequest, HttpResponse, Method, RequestBody, Transport, TransportError};
use curl::easy::{Easy, Form, List};
use std::cell::Cell;
use std::str;
use std::time::Duration;

/// Tuning for each curl handle.
#[derive(Debug, Clone, Copy)]
pub struct CurlOptions {
    pub connect_timeout: Duration,
    pub timeout: Duration,
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Blocking transport backed by libcurl. Runs in the current thread; call from
/// `spawn_blocking` (see [`super::run_blocking`]) if used from async code.
#[derive(Debug, Clone, Default)]
pub struct CurlTransport {
    opts: CurlOptions,
    default_headers: Vec<(String, String)>,
}

impl CurlTransport {
    pub fn new(opts: CurlOptions) -> Self {
        Self {
            opts,
            default_headers: Vec::new(),
        }
    }

    /// Adds a header sent with every request.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.default_headers
            .push((name.trim().to_string(), value.trim().to_string()));
        self
    }

    fn configure(&self, easy: &mut Easy, request: &HttpRequest) -> Result<(), TransportError> {
        easy.url(request.url.as_str())?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.opts.connect_timeout)?;
        easy.timeout(self.opts.timeout)?;

        let mut list = List::new();
        for (k, v) in &self.default_headers {
            list.append(&format!("{}: {}", k, v))?;
        }
        if request.expect_binary {
            list.append("Accept: */*")?;
        } else {
            list.append("Accept: application/json")?;
        }

        match &request.body {
            RequestBody::Empty => match request.method {
                Method::Post | Method::Put => {
                    easy.post(true)?;
                    easy.post_field_size(0)?;
                }
                Method::Get | Method::Delete => easy.get(true)?,
            },
            RequestBody::Json(value) => {
                let bytes = serde_json::to_vec(value)
                    .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
                list.append("Content-Type: application/json")?;
                easy.post(true)?;
                easy.post_fields_copy(&bytes)?;
            }
            RequestBody::Multipart(parts) => {
                easy.httppost(build_form(parts)?)?;
            }
        }

        match request.method {
            Method::Put => easy.custom_request("PUT")?,
            Method::Delete => easy.custom_request("DELETE")?,
            Method::Get if !matches!(request.body, RequestBody::Empty) => {
                return Err(TransportError::InvalidRequest(
                    "GET request with a body".to_string(),
                ));
            }
            Method::Get | Method::Post => {}
        }

        easy.http_headers(list)?;
        if request.upload_progress.is_some() {
            easy.progress(true)?;
        }
        Ok(())
    }
}

fn build_form(parts: &[FormPart]) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for part in parts {
        let added = match part {
            FormPart::Text { name, value } => form.part(name).contents(value.as_bytes()).add(),
            FormPart::File(file) => {
                let mut p = form.part(&file.field);
                p.buffer(&file.file_name, file.bytes.clone());
                if let Some(ct) = file.content_type.as_deref() {
                    p.content_type(ct);
                }
                p.add()
            }
        };
        added.map_err(|e| {
            TransportError::InvalidRequest(format!("multipart part '{}': {}", part.name(), e))
        })?;
    }
    Ok(form)
}

/// Maps curl's upload counters to a percentage.
fn upload_percent(total: f64, now: f64) -> Option<u8> {
    if total <= 0.0 {
        return None;
    }
    Some(((now / total) * 100.0).clamp(0.0, 100.0) as u8)
}

impl Transport for CurlTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut easy = Easy::new();
        self.configure(&mut easy, &request)?;

        let mut header_lines: Vec<String> = Vec::new();
        let mut body: Vec<u8> = Vec::new();
        let last_percent = Cell::new(None::<u8>);
        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    header_lines.push(s.trim_end().to_string());
                }
                true
            })?;
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            if let Some(progress) = request.upload_progress.as_ref() {
                transfer.progress_function(|_dl_total, _dl_now, ul_total, ul_now| {
                    if let Some(pct) = upload_percent(ul_total, ul_now) {
                        if last_percent.get() != Some(pct) {
                            last_percent.set(Some(pct));
                            progress(pct);
                        }
                    }
                    true
                })?;
            }
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            status,
            bytes = body.len(),
            "http request finished"
        );
        Ok(HttpResponse {
            status,
            headers: parse_header_lines(&header_lines),
            body,
        })
    }
}
