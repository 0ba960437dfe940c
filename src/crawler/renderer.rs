//! Page rendering boundary
//!
//! The crawl only needs four primitives from whatever renders pages:
//! navigate to a URL, hand back the current document for evaluation, wait
//! a coarse interval, and close the session. [`HttpRenderer`] provides them
//! over plain HTTP; a headless browser can implement the same trait.

use crate::config::NavigatorConfig;
use crate::RenderError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// A stateful page-rendering session with a single current page
#[async_trait]
pub trait Renderer: Send {
    /// Loads `url` as the current page
    async fn navigate(&mut self, url: &Url) -> Result<(), RenderError>;

    /// Returns the current page's document markup
    async fn content(&mut self) -> Result<String, RenderError>;

    /// URL of the current page after redirects, if any page is loaded
    fn current_url(&self) -> Option<&Url>;

    /// Pauses for `duration`
    async fn wait(&mut self, duration: Duration);

    /// Ends the session; further navigation fails with [`RenderError::Closed`]
    async fn close(&mut self) -> Result<(), RenderError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - Navigator settings (user agent and request timeout)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &NavigatorConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Renders pages by fetching them over HTTP
///
/// The document is whatever the server returns; there is no script
/// execution, so readiness polling only ever sees the initial markup.
pub struct HttpRenderer {
    client: Client,
    current: Option<(Url, String)>,
    closed: bool,
}

impl HttpRenderer {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            current: None,
            closed: false,
        }
    }

    /// Creates a renderer with a client built from navigator settings
    pub fn from_config(config: &NavigatorConfig) -> Result<Self, RenderError> {
        let client = build_http_client(config).map_err(|source| RenderError::Http {
            url: String::new(),
            source,
        })?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn navigate(&mut self, url: &Url) -> Result<(), RenderError> {
        if self.closed {
            return Err(RenderError::Closed);
        }

        let http_err = |source| RenderError::Http {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(http_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(http_err)?;

        tracing::trace!("Loaded {} ({} bytes)", final_url, body.len());
        self.current = Some((final_url, body));
        Ok(())
    }

    async fn content(&mut self) -> Result<String, RenderError> {
        if self.closed {
            return Err(RenderError::Closed);
        }
        self.current
            .as_ref()
            .map(|(_, body)| body.clone())
            .ok_or(RenderError::NoPage)
    }

    fn current_url(&self) -> Option<&Url> {
        self.current.as_ref().map(|(url, _)| url)
    }

    async fn wait(&mut self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        self.closed = true;
        self.current = None;
        Ok(())
    }
}
