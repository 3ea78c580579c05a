use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

/// URL template for the remote image server. `{hour}` is replaced with the
/// forecast-hour offset, zero-padded to three digits. This is the only
/// wire-level contract with the server.
pub const DEFAULT_URL_TEMPLATE: &str =
    "https://services.meteored.com/img/models/ecmwf/ECMWF_{hour}_ES_SFC_es-ES_es.png";

/// Default cap on simultaneous in-flight requests.
pub const DEFAULT_MAX_CONCURRENT: usize = 4;

/// How many frames ahead/behind the current one to prefetch first.
pub const DEFAULT_NEIGHBOR_RADIUS: usize = 2;

/// Configurable options for the fetch engine
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// URL template with a single `{hour}` substitution point
    pub url_template: String,

    /// Directory holding the per-offset image files and validator document
    pub cache_dir: PathBuf,

    /// Maximum number of simultaneous in-flight requests (minimum 1)
    pub max_concurrent: usize,

    /// Neighbor prefetch radius for the priority planner
    pub neighbor_radius: usize,

    /// Overall timeout for the entire HTTP request
    pub timeout: Duration,

    /// Connection timeout (time to establish initial connection)
    pub connect_timeout: Duration,

    /// Whether to follow redirects
    pub follow_redirects: bool,

    /// User agent string
    pub user_agent: String,

    /// Custom HTTP headers for requests
    pub headers: HeaderMap,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_URL_TEMPLATE.to_owned(),
            cache_dir: PathBuf::from("cache"),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            neighbor_radius: DEFAULT_NEIGHBOR_RADIUS,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            follow_redirects: true,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            headers: FetcherConfig::get_default_headers(),
        }
    }
}

impl FetcherConfig {
    pub fn builder() -> crate::builder::FetcherConfigBuilder {
        crate::builder::FetcherConfigBuilder::new()
    }

    pub fn get_default_headers() -> HeaderMap {
        let mut default_headers = HeaderMap::new();

        default_headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static("image/png,image/*;q=0.8,*/*;q=0.5"),
        );

        default_headers.insert(
            reqwest::header::ACCEPT_ENCODING,
            HeaderValue::from_static("gzip, deflate"),
        );

        default_headers.insert(
            reqwest::header::CONNECTION,
            HeaderValue::from_static("keep-alive"),
        );

        default_headers
    }
}
