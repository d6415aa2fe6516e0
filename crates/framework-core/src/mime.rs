//! File extension to MIME type lookup.
//!
//! Used to label file parts of multipart uploads. Lookups are
//! case-insensitive, accept the extension with or without a leading dot, and
//! fall back to [`OCTET_STREAM`] for anything unknown.

use std::path::Path;

/// MIME type used when nothing more specific is known.
pub const OCTET_STREAM: &str = "application/octet-stream";

const TABLE: &[(&str, &str)] = &[
    ("7z", "application/x-7z-compressed"),
    ("aac", "audio/aac"),
    ("avi", "video/x-msvideo"),
    ("bmp", "image/bmp"),
    ("css", "text/css"),
    ("csv", "text/csv"),
    ("doc", "application/msword"),
    ("docx", "application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
    ("flac", "audio/flac"),
    ("gif", "image/gif"),
    ("gz", "application/gzip"),
    ("htm", "text/html"),
    ("html", "text/html"),
    ("ico", "image/x-icon"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("js", "text/javascript"),
    ("json", "application/json"),
    ("md", "text/markdown"),
    ("mp3", "audio/mpeg"),
    ("mp4", "video/mp4"),
    ("mpeg", "video/mpeg"),
    ("ogg", "audio/ogg"),
    ("otf", "font/otf"),
    ("pdf", "application/pdf"),
    ("png", "image/png"),
    ("ppt", "application/vnd.ms-powerpoint"),
    ("pptx", "application/vnd.openxmlformats-officedocument.presentationml.presentation"),
    ("rar", "application/vnd.rar"),
    ("rtf", "application/rtf"),
    ("svg", "image/svg+xml"),
    ("tar", "application/x-tar"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("ttf", "font/ttf"),
    ("txt", "text/plain"),
    ("wav", "audio/wav"),
    ("webm", "video/webm"),
    ("webp", "image/webp"),
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
    ("xls", "application/vnd.ms-excel"),
    ("xlsx", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
    ("xml", "text/xml"),
    ("zip", "application/zip"),
];

/// Look up the MIME type for a file extension.
///
/// ```
/// use framework_core::mime;
///
/// assert_eq!(mime::from_extension(".PNG"), "image/png");
/// assert_eq!(mime::from_extension("unknown"), mime::OCTET_STREAM);
/// ```
pub fn from_extension(extension: &str) -> &'static str {
    let extension = extension.trim().trim_start_matches('.');
    TABLE
        .iter()
        .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
        .map_or(OCTET_STREAM, |(_, mime)| *mime)
}

/// Look up the MIME type for a file path by its extension.
pub fn from_path(path: impl AsRef<Path>) -> &'static str {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(OCTET_STREAM, from_extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert_eq!(from_extension("json"), "application/json");
        assert_eq!(from_extension("JPG"), "image/jpeg");
        assert_eq!(from_extension(".txt"), "text/plain");
    }

    #[test]
    fn test_unknown_extension_falls_back() {
        assert_eq!(from_extension("nope"), OCTET_STREAM);
        assert_eq!(from_extension(""), OCTET_STREAM);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(from_path("/tmp/report.PDF"), "application/pdf");
        assert_eq!(from_path("archive.tar.gz"), "application/gzip");
        assert_eq!(from_path("Makefile"), OCTET_STREAM);
    }

    #[test]
    fn test_table_is_lowercase_and_unique() {
        for (i, (ext, _)) in TABLE.iter().enumerate() {
            assert_eq!(*ext, ext.to_ascii_lowercase());
            assert!(!TABLE[i + 1..].iter().any(|(other, _)| other == ext));
        }
    }
}
