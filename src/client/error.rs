use thiserror::Error;

/// Failure to obtain a chart payload from upstream.
///
/// An empty chart is not an error: it comes back as an empty item list.
#[derive(Debug, Error)]
pub enum FetchError {
    /// connection error, timeout or non-2xx status
    #[error("request to {url} failed: {detail}")]
    Transport { url: String, detail: String },

    #[error("upstream payload is not valid JSON: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

impl FetchError {
    pub fn transport(url: &str, detail: impl ToString) -> Self {
        FetchError::Transport {
            url: url.to_string(),
            detail: detail.to_string(),
        }
    }
}
