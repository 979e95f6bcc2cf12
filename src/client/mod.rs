//! Client for the upstream chart endpoint.

use std::time::Duration;

use log::{debug, info, warn};
use serde_json::Value;

use crate::{client::error::FetchError, config::UpstreamConfig, domain::category::ChartCategory};

pub mod cache;
pub mod error;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Raw chart item, shape depends on the category
pub type RawChartItem = Value;

/// Anything able to produce the raw items of a chart category.
pub trait ChartSource {
    fn fetch(&self, category: ChartCategory) -> Result<Vec<RawChartItem>, FetchError>;
}

/// Blocking HTTP client for `GET <base_url>?endpoint=chart`.
pub struct ChartClient {
    http_client: ureq::Agent,
    base_url: String,
}

impl ChartClient {
    pub fn new(config: &UpstreamConfig) -> Self {
        Self::with_timeout(config, REQUEST_TIMEOUT)
    }

    /// Client whose connect, read and write each give up after `timeout`.
    pub fn with_timeout(config: &UpstreamConfig, timeout: Duration) -> Self {
        let http_client = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .timeout_write(timeout)
            .build();
        Self {
            http_client,
            base_url: config.base_url.trim().to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Downloads and parses the whole chart payload.
    fn request_payload(&self) -> Result<Value, FetchError> {
        info!("GET {}?endpoint=chart", self.base_url);
        let response = self
            .http_client
            .get(&self.base_url)
            .query("endpoint", "chart")
            .call()
            .map_err(|err| match err {
                ureq::Error::Status(status, _) => {
                    FetchError::transport(&self.base_url, format!("HTTP status {status}"))
                }
                ureq::Error::Transport(transport) => {
                    FetchError::transport(&self.base_url, transport)
                }
            })?;

        let body = response
            .into_string()
            .map_err(|err| FetchError::transport(&self.base_url, err))?;
        debug!("upstream answered with {} bytes", body.len());

        Ok(serde_json::from_str(&body)?)
    }
}

impl ChartSource for ChartClient {
    fn fetch(&self, category: ChartCategory) -> Result<Vec<RawChartItem>, FetchError> {
        let payload = self.request_payload().inspect_err(|err| {
            warn!("fetching {category} chart failed: {err}");
        })?;
        let items = extract_items(&payload, category);
        info!("upstream returned {} {category}", items.len());
        Ok(items)
    }
}

/// `payload.<field>.data`, empty when either level is absent or not an array
pub fn extract_items(payload: &Value, category: ChartCategory) -> Vec<RawChartItem> {
    payload
        .get(category.api_field())
        .and_then(|field| field.get("data"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}


#[cfg(test)]
mod tests {
    use super::{testing::*, *};
    use serde_json::json;

    fn client(base_url: &str) -> ChartClient {
        ChartClient::new(&UpstreamConfig {
            base_url: base_url.to_string(),
        })
    }

    #[test]
    fn test_fetch_extracts_category_data() -> anyhow::Result<()> {
        let upstream = FakeUpstream::json(json!({
            "tracks": {"data": [{"title": "Song A"}, {"title": "Song B"}]},
            "albums": {"data": [{"title": "Album"}]}
        }));

        let items = client(&upstream.base_url).fetch(ChartCategory::Track)?;

        assert_eq!(items, vec![json!({"title": "Song A"}), json!({"title": "Song B"})]);
        assert_eq!(upstream.hits(), 1);
        Ok(())
    }

    #[test]
    fn test_fetch_missing_field_is_empty_not_error() -> anyhow::Result<()> {
        let upstream = FakeUpstream::json(json!({"tracks": {"data": []}}));

        let items = client(&upstream.base_url).fetch(ChartCategory::Podcast)?;

        assert!(items.is_empty());
        Ok(())
    }

    #[test]
    fn test_fetch_non_2xx_is_transport_error() {
        let upstream = FakeUpstream::serve(503, "{}");

        let result = client(&upstream.base_url).fetch(ChartCategory::Track);

        assert!(
            matches!(result, Err(FetchError::Transport { .. })),
            "got {result:?}"
        );
    }

    #[test]
    fn test_fetch_malformed_json_is_invalid_payload() {
        let upstream = FakeUpstream::serve(200, "<html>not json</html>");

        let result = client(&upstream.base_url).fetch(ChartCategory::Track);

        assert!(
            matches!(result, Err(FetchError::InvalidPayload(_))),
            "got {result:?}"
        );
    }

    #[test]
    fn test_fetch_timeout_is_transport_error() {
        let upstream = FakeUpstream::serve_after(
            Duration::from_millis(1500),
            200,
            r#"{"tracks": {"data": [{"title": "late"}]}}"#,
        );
        let client = ChartClient::with_timeout(
            &UpstreamConfig {
                base_url: upstream.base_url.clone(),
            },
            Duration::from_millis(200),
        );

        let result = client.fetch(ChartCategory::Track);

        assert!(
            matches!(result, Err(FetchError::Transport { .. })),
            "got {result:?}"
        );
        assert_eq!(upstream.hits(), 1);
        assert_eq!(REQUEST_TIMEOUT, Duration::from_secs(10));
    }

    #[test]
    fn test_fetch_connection_refused_is_transport_error() {
        let result = client(&unreachable_base_url()).fetch(ChartCategory::Album);

        assert!(
            matches!(result, Err(FetchError::Transport { .. })),
            "got {result:?}"
        );
    }

    #[test]
    fn test_extract_items_tolerates_odd_shapes() {
        let payload = json!({
            "tracks": {"data": "nope"},
            "albums": [],
            "artists": {"data": [{"name": "A"}]}
        });

        assert!(extract_items(&payload, ChartCategory::Track).is_empty());
        assert!(extract_items(&payload, ChartCategory::Album).is_empty());
        assert_eq!(extract_items(&payload, ChartCategory::Artist).len(), 1);
        assert!(extract_items(&json!(null), ChartCategory::Playlist).is_empty());
    }
}
