//! Multipart file uploads

use super::transport::RequestBody;
use crate::error::{Error, Result};
use bytes::{BufMut, Bytes, BytesMut};
use chrono::Utc;
use std::path::Path;

/// A single file to upload as one multipart part
#[derive(Debug, Clone)]
pub struct FileUpload {
    /// Form field name
    pub field_name: String,
    /// File name reported to the server
    pub file_name: String,
    /// File contents
    pub content: Bytes,
}

impl FileUpload {
    /// Create an upload from in-memory content
    pub fn new(
        field_name: impl Into<String>,
        file_name: impl Into<String>,
        content: impl Into<Bytes>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            file_name: file_name.into(),
            content: content.into(),
        }
    }

    /// Read an upload from disk, using the path's file name
    pub async fn from_path(field_name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Error::invalid_argument(format!("'{}' has no file name", path.display()))
            })?;
        let content = tokio::fs::read(path).await?;
        Ok(Self::new(field_name, file_name, content))
    }

    /// Encode as a `multipart/form-data` body with a fresh boundary
    pub fn to_body(&self) -> RequestBody {
        self.to_body_with_boundary(&new_boundary())
    }

    pub(crate) fn to_body_with_boundary(&self, boundary: &str) -> RequestBody {
        let mut buf = BytesMut::with_capacity(self.content.len() + 256);
        buf.put_slice(format!("--{boundary}\r\n").as_bytes());
        buf.put_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                escape_quoted(&self.field_name),
                escape_quoted(&self.file_name)
            )
            .as_bytes(),
        );
        buf.put_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        buf.put_slice(&self.content);
        buf.put_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        RequestBody::new(
            format!("multipart/form-data; boundary={boundary}"),
            buf.freeze(),
        )
    }
}

/// Percent-encode the characters that would end a quoted header parameter
fn escape_quoted(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Boundary tagged with the current timestamp
fn new_boundary() -> String {
    format!("----------------------------{:x}", Utc::now().timestamp_micros())
}
