use url::Url;

use crate::JobKind;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("no URLs provided")]
    NoUrls,
    #[error("line {line} is not an http(s) URL: {value}")]
    InvalidUrl { line: usize, value: String },
}

/// A validated submission for one job kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobRequest {
    BulkImport { urls: Vec<String> },
    ReprocessAll,
}

impl JobRequest {
    /// Builds a request from free-text input.
    ///
    /// Bulk imports take newline-separated URLs; reprocessing ignores the payload.
    pub fn new(kind: JobKind, payload: &str) -> Result<Self, RequestError> {
        match kind {
            JobKind::BulkImport => Self::bulk_import(payload),
            JobKind::ReprocessAll => Ok(JobRequest::ReprocessAll),
        }
    }

    pub fn bulk_import(raw: &str) -> Result<Self, RequestError> {
        let urls = parse_urls(raw);
        if urls.is_empty() {
            return Err(RequestError::NoUrls);
        }
        for (index, candidate) in urls.iter().enumerate() {
            if !is_http_url(candidate) {
                return Err(RequestError::InvalidUrl {
                    line: index + 1,
                    value: candidate.clone(),
                });
            }
        }
        Ok(JobRequest::BulkImport { urls })
    }

    pub fn kind(&self) -> JobKind {
        match self {
            JobRequest::BulkImport { .. } => JobKind::BulkImport,
            JobRequest::ReprocessAll => JobKind::ReprocessAll,
        }
    }

    /// Number of items known before submission, if any.
    pub fn item_count(&self) -> Option<usize> {
        match self {
            JobRequest::BulkImport { urls } => Some(urls.len()),
            JobRequest::ReprocessAll => None,
        }
    }
}

/// Splits pasted text into trimmed, non-empty lines.
pub fn parse_urls(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn is_http_url(candidate: &str) -> bool {
    Url::parse(candidate)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}
