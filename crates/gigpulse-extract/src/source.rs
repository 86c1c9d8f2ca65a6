//! Page sources
//!
//! The extractor only needs "navigate to URL, give me the final URL and the
//! markup". `PageSource` is that seam; `HttpPageSource` is the production
//! implementation, tests use scripted sources.

use crate::error::FetchError;
use async_trait::async_trait;
use gigpulse_snapshot::AuthSession;
use reqwest::header::{ACCEPT, COOKIE, SET_COOKIE, USER_AGENT};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Browser-like user agent used when the session does not carry one
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// A loaded page
#[derive(Debug, Clone)]
pub struct Page {
    /// URL after redirects
    pub final_url: Url,
    /// HTTP status of the final response; error statuses are returned as
    /// pages so the caller can inspect where the request landed
    pub status: u16,
    /// Raw markup
    pub html: String,
}

impl Page {
    /// 2xx final response
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Navigates to pages on behalf of an authenticated session
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Load `url`, replaying and refreshing `session` cookies
    async fn fetch(&self, url: &Url, session: &mut AuthSession) -> Result<Page, FetchError>;
}

#[async_trait]
impl<T: PageSource + ?Sized> PageSource for Arc<T> {
    async fn fetch(&self, url: &Url, session: &mut AuthSession) -> Result<Page, FetchError> {
        (**self).fetch(url, session).await
    }
}

/// reqwest-backed page source
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: reqwest::Client,
}

impl HttpPageSource {
    /// Build a client with a per-request timeout
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(FetchError::from)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self, url: &Url, session: &mut AuthSession) -> Result<Page, FetchError> {
        let mut request = self
            .client
            .get(url.clone())
            .header(ACCEPT, "text/html,application/xhtml+xml")
            .header(
                USER_AGENT,
                session.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT),
            );
        if let Some(cookies) = session.cookie_header() {
            request = request.header(COOKIE, cookies);
        }

        let response = request.send().await?;
        let status = response.status();
        let final_url = response.url().clone();

        let mut refreshed = 0usize;
        for value in response.headers().get_all(SET_COOKIE) {
            if let Ok(raw) = value.to_str() {
                if session.absorb_set_cookie(raw) {
                    refreshed += 1;
                }
            }
        }
        tracing::trace!(url = %final_url, status = status.as_u16(), refreshed, "Page fetched");

        let html = response.text().await?;
        Ok(Page {
            final_url,
            status: status.as_u16(),
            html,
        })
    }
}
