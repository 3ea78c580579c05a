//! # Transport
//!
//! Abstracts the network fetch for one offset behind a three-outcome
//! contract: not-modified, content, or failed. The scheduler never sees a
//! protocol library, only [`FetchOutcome`].

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::FetchError;
use crate::cache::ValidatorRecord;
use crate::config::FetcherConfig;
use crate::offsets::HourOffset;

/// Terminal outcome of one resource fetch. Transport and protocol errors are
/// folded into `Failed`; the fetch itself never returns an error.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// Server signalled the cached content is unchanged (HTTP 304).
    NotModified,
    /// Fresh body, with any validators present in the response.
    Content {
        body: Bytes,
        etag: Option<String>,
        last_modified: Option<String>,
    },
    /// The request could not complete or the server refused it.
    Failed { reason: String },
}

/// Resource fetch primitive: resolve one offset to a terminal outcome.
#[async_trait]
pub trait ResourceFetch: Send + Sync {
    async fn fetch(
        &self,
        offset: HourOffset,
        conditions: &ValidatorRecord,
        bypass_cache: bool,
    ) -> FetchOutcome;
}

/// Create a reqwest Client with the provided configuration
pub fn create_client(config: &FetcherConfig) -> Result<Client, FetchError> {
    let mut client_builder = Client::builder()
        .pool_max_idle_per_host(5) // Allow multiple connections to same host
        .user_agent(&config.user_agent)
        .default_headers(config.headers.clone())
        .redirect(if config.follow_redirects {
            reqwest::redirect::Policy::limited(10)
        } else {
            reqwest::redirect::Policy::none()
        });

    if !config.timeout.is_zero() {
        client_builder = client_builder.timeout(config.timeout);
    }

    if !config.connect_timeout.is_zero() {
        client_builder = client_builder.connect_timeout(config.connect_timeout);
    }

    client_builder.build().map_err(FetchError::from)
}

/// Conditional request headers for one offset. When `bypass_cache` is set no
/// validators are sent and intermediate caches are told to revalidate.
pub(crate) fn conditional_headers(conditions: &ValidatorRecord, bypass_cache: bool) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if bypass_cache {
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        return headers;
    }
    if let Some(etag) = &conditions.etag
        && let Ok(value) = HeaderValue::from_str(etag)
    {
        headers.insert(header::IF_NONE_MATCH, value);
    }
    if let Some(last_modified) = &conditions.last_modified
        && let Ok(value) = HeaderValue::from_str(last_modified)
    {
        headers.insert(header::IF_MODIFIED_SINCE, value);
    }
    headers
}

/// HTTP transport resolving offsets against a `{hour}` URL template.
pub struct HttpResourceFetch {
    client: Client,
    url_template: String,
}

impl HttpResourceFetch {
    pub fn new(client: Client, url_template: impl Into<String>) -> Result<Self, FetchError> {
        let url_template = url_template.into();
        if !url_template.contains("{hour}") {
            return Err(FetchError::Config(format!(
                "URL template is missing the {{hour}} substitution point: {url_template}"
            )));
        }
        Ok(Self {
            client,
            url_template,
        })
    }

    /// Resource URL for an offset, zero-padded to three digits.
    pub fn url_for(&self, offset: HourOffset) -> String {
        self.url_template.replace("{hour}", &format!("{offset:03}"))
    }
}

fn response_header(response: &reqwest::Response, name: header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

#[async_trait]
impl ResourceFetch for HttpResourceFetch {
    async fn fetch(
        &self,
        offset: HourOffset,
        conditions: &ValidatorRecord,
        bypass_cache: bool,
    ) -> FetchOutcome {
        let url = self.url_for(offset);
        let request = self
            .client
            .get(&url)
            .headers(conditional_headers(conditions, bypass_cache));

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                return FetchOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        if response.status() == StatusCode::NOT_MODIFIED {
            debug!(offset, "Server confirmed frame unchanged");
            return FetchOutcome::NotModified;
        }
        if !response.status().is_success() {
            return FetchOutcome::Failed {
                reason: format!("server returned status {}", response.status()),
            };
        }

        let etag = response_header(&response, header::ETAG);
        let last_modified = response_header(&response, header::LAST_MODIFIED);
        match response.bytes().await {
            Ok(body) => {
                debug!(offset, bytes = body.len(), url = %url, "Downloaded frame");
                FetchOutcome::Content {
                    body,
                    etag,
                    last_modified,
                }
            }
            Err(e) => FetchOutcome::Failed {
                reason: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(etag: Option<&str>, last_modified: Option<&str>) -> ValidatorRecord {
        ValidatorRecord {
            etag: etag.map(str::to_owned),
            last_modified: last_modified.map(str::to_owned),
        }
    }

    #[test]
    fn test_conditional_headers_round_trip() {
        let headers = conditional_headers(&record(Some("\"abc\""), None), false);
        assert_eq!(headers.get(header::IF_NONE_MATCH).unwrap(), "\"abc\"");
        assert!(headers.get(header::IF_MODIFIED_SINCE).is_none());

        let headers = conditional_headers(
            &record(Some("\"abc\""), Some("Mon, 01 Jan 2026 00:00:00 GMT")),
            false,
        );
        assert_eq!(
            headers.get(header::IF_MODIFIED_SINCE).unwrap(),
            "Mon, 01 Jan 2026 00:00:00 GMT"
        );
    }

    #[test]
    fn test_bypass_cache_sends_no_validators() {
        let headers = conditional_headers(&record(Some("\"abc\""), Some("whenever")), true);
        assert!(headers.get(header::IF_NONE_MATCH).is_none());
        assert!(headers.get(header::IF_MODIFIED_SINCE).is_none());
        assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "no-cache");
    }

    #[test]
    fn test_url_template_substitution() {
        let client = Client::new();
        let transport =
            HttpResourceFetch::new(client, "http://example.com/ECMWF_{hour}_ES.png").unwrap();
        assert_eq!(transport.url_for(6), "http://example.com/ECMWF_006_ES.png");
        assert_eq!(transport.url_for(240), "http://example.com/ECMWF_240_ES.png");
    }

    #[test]
    fn test_template_without_substitution_point_is_rejected() {
        let client = Client::new();
        assert!(matches!(
            HttpResourceFetch::new(client, "http://example.com/fixed.png"),
            Err(FetchError::Config(_))
        ));
    }
}
