//! # Builder for FetcherConfig
//!
//! Fluent API for creating and customizing [`FetcherConfig`] instances.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use tiempo_engine::FetcherConfig;
//!
//! let config = FetcherConfig::builder()
//!     .with_cache_dir("/var/cache/tiempo")
//!     .with_max_concurrent(8)
//!     .with_timeout(Duration::from_secs(60))
//!     .build();
//! ```

use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::HeaderValue;

use crate::FetcherConfig;

/// Builder for creating [`FetcherConfig`] instances with a fluent API
#[derive(Debug, Clone, Default)]
pub struct FetcherConfigBuilder {
    /// Internal config being built
    config: FetcherConfig,
}

impl FetcherConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the URL template (must contain a `{hour}` substitution point)
    pub fn with_url_template(mut self, template: impl Into<String>) -> Self {
        self.config.url_template = template.into();
        self
    }

    /// Set the cache directory
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.cache_dir = dir.into();
        self
    }

    /// Set the concurrency cap, clamped to a minimum of 1
    pub fn with_max_concurrent(mut self, value: usize) -> Self {
        self.config.max_concurrent = value.max(1);
        self
    }

    /// Set the neighbor prefetch radius
    pub fn with_neighbor_radius(mut self, radius: usize) -> Self {
        self.config.neighbor_radius = radius;
        self
    }

    /// Set the overall timeout for the entire HTTP request
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the connection timeout (time to establish initial connection)
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set whether to follow redirects
    pub fn with_follow_redirects(mut self, follow: bool) -> Self {
        self.config.follow_redirects = follow;
        self
    }

    /// Set the user agent string
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Add a custom HTTP header
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            name.as_ref().parse::<reqwest::header::HeaderName>(),
            HeaderValue::from_str(value.as_ref()),
        ) {
            self.config.headers.insert(name, value);
        }
        self
    }

    /// Build the final configuration
    pub fn build(self) -> FetcherConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        let config = FetcherConfig::builder()
            .with_url_template("http://example.com/{hour}.png")
            .with_cache_dir("/tmp/frames")
            .with_max_concurrent(0)
            .with_neighbor_radius(5)
            .with_header("X-Api-Key", "secret")
            .build();

        assert_eq!(config.url_template, "http://example.com/{hour}.png");
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/frames"));
        // Cap is clamped to at least one in-flight request.
        assert_eq!(config.max_concurrent, 1);
        assert_eq!(config.neighbor_radius, 5);
        assert_eq!(config.headers.get("X-Api-Key").unwrap(), "secret");
    }
}
