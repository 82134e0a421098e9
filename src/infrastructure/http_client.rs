//! HTTP client for page retrieval
//!
//! One `reqwest::Client` is built up front and shared by every worker; it is
//! reference-counted internally, so clones only share the connection pool.
//! There is no retry and no rate limiting: a failed fetch is final for that
//! URL in that run.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, ClientBuilder};
use tracing::debug;
use url::Url;

use crate::domain::errors::FetchError;
use crate::infrastructure::config::ScraperConfig;

/// A successfully retrieved page
#[derive(Debug, Clone)]
pub struct PageContent {
    /// Final URL after redirects; the base for resolving relative links
    pub url: Url,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl PageContent {
    pub fn new(url: Url, body: impl Into<String>) -> Self {
        Self {
            url,
            status: 200,
            content_type: Some("text/html".to_string()),
            body: body.into(),
        }
    }
}

/// Single bounded-timeout retrieval of one page
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<PageContent, FetchError>;
}

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
    pub follow_redirects: bool,
    pub max_redirects: usize,
}

impl HttpClientConfig {
    pub fn from_scraper_config(config: &ScraperConfig) -> Self {
        Self {
            timeout: config.request_timeout(),
            connect_timeout: config.connect_timeout(),
            user_agent: config.user_agent.clone(),
            follow_redirects: config.follow_redirects,
            max_redirects: config.max_redirects,
        }
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self::from_scraper_config(&ScraperConfig::default())
    }
}

/// reqwest-backed page fetcher
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    pub fn from_scraper_config(config: &ScraperConfig) -> Result<Self, reqwest::Error> {
        Self::with_config(HttpClientConfig::from_scraper_config(config))
    }

    pub fn with_config(config: HttpClientConfig) -> Result<Self, reqwest::Error> {
        let redirect = if config.follow_redirects {
            reqwest::redirect::Policy::limited(config.max_redirects)
        } else {
            reqwest::redirect::Policy::none()
        };

        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .gzip(true)
            .brotli(true)
            .redirect(redirect)
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Fetch with the timeout configured on this client.
    pub async fn fetch_page(&self, url: &str) -> Result<PageContent, FetchError> {
        self.fetch(url, self.config.timeout).await
    }

    fn classify(url: &str, timeout: Duration, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                timeout_secs: timeout.as_secs(),
            }
        } else {
            FetchError::Network {
                url: url.to_string(),
                source: err,
            }
        }
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<PageContent, FetchError> {
        let parsed = Url::parse(url.trim()).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        debug!("🌐 HTTP GET: {}", parsed);
        let response = self
            .client
            .get(parsed)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Self::classify(url, timeout, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if let Some(ct) = content_type.as_deref() {
            if !is_markup_content_type(ct) {
                return Err(FetchError::UnsupportedContentType {
                    url: url.to_string(),
                    content_type: ct.to_string(),
                });
            }
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                Self::classify(url, timeout, e)
            } else {
                FetchError::Body {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        // A blank 2xx body is a valid page with nothing on it.
        Ok(PageContent {
            url: final_url,
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

/// `text/*`, `application/xml`, `application/xhtml+xml` and any `+xml` type.
pub fn is_markup_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime.starts_with("text/") || mime == "application/xml" || mime.ends_with("+xml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn client_creation_from_defaults() {
        let client = HttpClient::with_config(HttpClientConfig::default()).unwrap();
        assert_eq!(client.config().timeout, Duration::from_secs(10));
        assert!(client.config().user_agent.contains("Mozilla"));
    }

    #[rstest]
    #[case("text/html; charset=utf-8", true)]
    #[case("TEXT/HTML", true)]
    #[case("text/plain", true)]
    #[case("application/xhtml+xml", true)]
    #[case("application/xml", true)]
    #[case("application/rss+xml", true)]
    #[case("application/json", false)]
    #[case("image/png", false)]
    #[case("application/octet-stream", false)]
    fn markup_content_types(#[case] ct: &str, #[case] expected: bool) {
        assert_eq!(is_markup_content_type(ct), expected);
    }

    #[tokio::test]
    async fn rejects_unparseable_and_non_http_urls() {
        let client = HttpClient::with_config(HttpClientConfig::default()).unwrap();

        let err = client.fetch_page("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));

        let err = client.fetch_page("ftp://a.test/file").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
        assert_eq!(err.url(), "ftp://a.test/file");
    }
}
