//! Transfer progress notifications.

use url::Url;

/// Direction of a transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransferDirection {
    /// Request body being sent.
    Upload,
    /// Response body being received.
    Download,
}

/// Progress information for uploads and downloads.
///
/// `bytes_transferred` is cumulative for the current request body or
/// response body. A client's progress signal is shared by all of its
/// requests; `request_id` matches [`RestRequest::id`](super::RestRequest::id)
/// of the request being transferred.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferProgress {
    /// Id of the request this event belongs to.
    pub request_id: u64,
    /// URL the transfer is talking to.
    pub url: Url,
    /// Which body is being transferred.
    pub direction: TransferDirection,
    /// Number of bytes transferred so far.
    pub bytes_transferred: u64,
    /// Total number of bytes, if known.
    pub total_bytes: Option<u64>,
}

impl TransferProgress {
    pub(crate) fn upload(
        request_id: u64,
        url: Url,
        bytes_transferred: u64,
        total_bytes: u64,
    ) -> Self {
        Self {
            request_id,
            url,
            direction: TransferDirection::Upload,
            bytes_transferred,
            total_bytes: Some(total_bytes),
        }
    }

    pub(crate) fn download(
        request_id: u64,
        url: Url,
        bytes_transferred: u64,
        total_bytes: Option<u64>,
    ) -> Self {
        Self {
            request_id,
            url,
            direction: TransferDirection::Download,
            bytes_transferred,
            total_bytes,
        }
    }

    /// Get the progress as a fraction (0.0 to 1.0), if total is known.
    pub fn fraction(&self) -> Option<f64> {
        self.total_bytes.map(|total| {
            if total == 0 {
                1.0
            } else {
                self.bytes_transferred as f64 / total as f64
            }
        })
    }

    /// Get the progress as a percentage (0 to 100), if total is known.
    pub fn percent(&self) -> Option<u8> {
        self.fraction().map(|f| (f * 100.0).min(100.0) as u8)
    }

    /// Whether the whole body has been transferred (total must be known).
    pub fn is_complete(&self) -> bool {
        self.total_bytes
            .is_some_and(|total| self.bytes_transferred >= total)
    }
}
