//! `multipart/form-data` framing.
//!
//! Parts are collected while the request is being configured and rendered
//! once at build time, so the boundary can still be changed until then.
//! The wire layout is:
//!
//! ```text
//! --B\r\n
//! Content-Disposition: form-data; name="field"\r\n
//! \r\n
//! value
//! \r\n--B\r\n
//! Content-Disposition: form-data; name="file"; filename="a.png"\r\n
//! Content-Type: image/png\r\n
//! \r\n
//! <bytes>
//! \r\n--B--\r\n
//! ```

use std::path::Path;

use bytes::{BufMut, Bytes, BytesMut};
use framework_core::mime;

use crate::error::Result;

/// A file to upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileParameter {
    /// Form field name.
    pub name: String,
    /// File name reported to the server.
    pub file_name: String,
    /// MIME type of the content.
    pub content_type: String,
    /// File content.
    pub data: Bytes,
}

impl FileParameter {
    /// Create a file parameter, guessing the content type from `file_name`.
    pub fn new(name: impl Into<String>, file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let file_name = file_name.into();
        Self {
            name: name.into(),
            content_type: mime::from_path(&file_name).to_string(),
            file_name,
            data: data.into(),
        }
    }

    /// Read a file from disk. The file name is the last path component.
    pub fn from_path(name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, file_name, data))
    }

    /// Builder: override the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }
}

/// One part of a multipart body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Part {
    Field { name: String, value: Bytes },
    File(FileParameter),
}

/// Render parts and the closing footer with the given boundary.
pub(crate) fn render(parts: &[Part], boundary: &str) -> Bytes {
    let mut buf = BytesMut::new();
    for (index, part) in parts.iter().enumerate() {
        if index > 0 {
            buf.put_slice(b"\r\n");
        }
        buf.put_slice(format!("--{boundary}\r\n").as_bytes());
        match part {
            Part::Field { name, value } => {
                buf.put_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", quote(name))
                        .as_bytes(),
                );
                buf.put_slice(value);
            }
            Part::File(file) => {
                buf.put_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        quote(&file.name),
                        quote(&file.file_name),
                        file.content_type
                    )
                    .as_bytes(),
                );
                buf.put_slice(&file.data);
            }
        }
    }
    buf.put_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    buf.freeze()
}

/// Escape characters that would terminate a quoted header parameter.
fn quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
