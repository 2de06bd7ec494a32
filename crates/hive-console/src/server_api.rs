use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use hive_types::{
    HostStatus, ScheduleRequest, ScheduleResponse, SessionCreateResponse, StartResponse,
    StopResponse, UploadResponse, paths,
};
use serde::de::DeserializeOwned;

/// Requests the console issues against the host backend.
pub(crate) trait HostApi: Send + Sync {
    fn status(&self) -> Result<HostStatus>;
    fn start(&self) -> Result<StartResponse>;
    fn stop(&self) -> Result<StopResponse>;
    fn create_session(&self) -> Result<SessionCreateResponse>;
    fn upload(&self, upload: &TrackUpload) -> Result<UploadResponse>;
    fn schedule(&self, request: &ScheduleRequest) -> Result<ScheduleResponse>;
}

/// Largest track the console will buffer for one upload.
pub(crate) const MAX_UPLOAD_BYTES: u64 = 512 * 1024 * 1024;

/// File contents prepared for the multipart upload.
///
/// The whole file is held in memory while the request is sent, so reads are
/// capped at [`MAX_UPLOAD_BYTES`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TrackUpload {
    pub(crate) file_name: String,
    pub(crate) bytes: Vec<u8>,
}

impl TrackUpload {
    pub(crate) fn from_path(path: &Path) -> Result<Self> {
        Self::from_path_capped(path, MAX_UPLOAD_BYTES)
    }

    fn from_path_capped(path: &Path, max_bytes: u64) -> Result<Self> {
        let len = std::fs::metadata(path)
            .with_context(|| format!("read {:?}", path))?
            .len();
        if len > max_bytes {
            return Err(anyhow::anyhow!(
                "read {:?}: {len} bytes exceeds the {max_bytes} byte upload limit",
                path
            ));
        }
        let bytes = std::fs::read(path).with_context(|| format!("read {:?}", path))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "upload.bin".to_string());
        Ok(Self { file_name, bytes })
    }
}

/// `HostApi` over HTTP using a shared ureq agent.
pub(crate) struct HttpHostApi {
    server: String,
    agent: ureq::Agent,
}

impl HttpHostApi {
    pub(crate) fn new(server: &str, timeout: Duration) -> Self {
        // Failed start/stop come back as 400 with a JSON reason; keep the body.
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        Self {
            server: server.trim_end_matches('/').to_string(),
            agent: ureq::Agent::new_with_config(config),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.server, path)
    }

    fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self
            .agent
            .post(&self.url(path))
            .send_empty()
            .with_context(|| format!("request {path}"))?;
        read_json(resp, path)
    }
}

impl HostApi for HttpHostApi {
    fn status(&self) -> Result<HostStatus> {
        let resp = self
            .agent
            .get(&self.url(paths::STATUS))
            .call()
            .with_context(|| format!("request {}", paths::STATUS))?;
        read_json(resp, paths::STATUS)
    }

    fn start(&self) -> Result<StartResponse> {
        self.post_empty(paths::START)
    }

    fn stop(&self) -> Result<StopResponse> {
        self.post_empty(paths::STOP)
    }

    fn create_session(&self) -> Result<SessionCreateResponse> {
        self.post_empty(paths::SESSION_CREATE)
    }

    fn upload(&self, upload: &TrackUpload) -> Result<UploadResponse> {
        let form = MultipartForm::single_file(hive_types::UPLOAD_FIELD, upload);
        let resp = self
            .agent
            .post(&self.url(paths::UPLOAD))
            .header("Content-Type", form.content_type().as_str())
            .send(&form.body[..])
            .with_context(|| format!("request {}", paths::UPLOAD))?;
        read_json(resp, paths::UPLOAD)
    }

    fn schedule(&self, request: &ScheduleRequest) -> Result<ScheduleResponse> {
        let resp = self
            .agent
            .post(&self.url(paths::SCHEDULE))
            .send_json(request)
            .with_context(|| format!("request {}", paths::SCHEDULE))?;
        read_json(resp, paths::SCHEDULE)
    }
}

/// `multipart/form-data` body carrying one file part.
struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartForm {
    fn single_file(field: &str, upload: &TrackUpload) -> Self {
        let boundary = format!("hive-{}", uuid::Uuid::new_v4().simple());
        Self::with_boundary(boundary, field, upload)
    }

    fn with_boundary(boundary: String, field: &str, upload: &TrackUpload) -> Self {
        let file_name = upload.file_name.replace(['"', '\r', '\n'], "_");
        let mut body = Vec::with_capacity(upload.bytes.len() + 256);
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n")
                .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(&upload.bytes);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        Self { boundary, body }
    }

    fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }
}

fn read_json<T: DeserializeOwned>(
    mut resp: ureq::http::Response<ureq::Body>,
    path: &str,
) -> Result<T> {
    let status = resp.status();
    let body = resp
        .body_mut()
        .read_to_string()
        .with_context(|| format!("read {path} response body"))?;
    decode_body(status.as_u16(), &body, path)
}

fn decode_body<T: DeserializeOwned>(status: u16, body: &str, path: &str) -> Result<T> {
    match serde_json::from_str(body) {
        Ok(value) => Ok(value),
        Err(e) if (200..300).contains(&status) => {
            Err(e).with_context(|| format!("decode {path} response"))
        }
        Err(_) => {
            let flat = body.split_whitespace().collect::<Vec<_>>().join(" ");
            let snippet: String = flat.chars().take(120).collect();
            if snippet.is_empty() {
                Err(anyhow::anyhow!("{path} failed with HTTP {status}"))
            } else {
                Err(anyhow::anyhow!("{path} failed with HTTP {status}: {snippet}"))
            }
        }
    }
}
