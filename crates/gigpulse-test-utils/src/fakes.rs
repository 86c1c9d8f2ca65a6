//! Scripted stand-ins for the network seams

use async_trait::async_trait;
use gigpulse_extract::{FetchError, Page, PageSource};
use gigpulse_notify::{ChatChannel, ParseMode, SendError};
use gigpulse_snapshot::AuthSession;
use gigpulse_synth::{GenerationRequest, SynthError, TextGenerator};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub enum FakeResponse {
    Html(String),
    /// Land on another path of the same host (login walls)
    RedirectTo(String),
    Status(u16),
    /// Never answers within any sane timeout
    Hang,
}

/// Page source keyed by URL path; unknown paths answer 404
#[derive(Debug, Default)]
pub struct FakePageSource {
    responses: HashMap<String, FakeResponse>,
    set_cookie: Option<String>,
    visited: Mutex<Vec<String>>,
}

impl FakePageSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source serving every `(path, html)` pair
    pub fn with_pages<I, P, H>(pages: I) -> Self
    where
        I: IntoIterator<Item = (P, H)>,
        P: Into<String>,
        H: Into<String>,
    {
        pages
            .into_iter()
            .fold(Self::new(), |source, (path, html)| source.with_page(path, html))
    }

    pub fn with_page(self, path: impl Into<String>, html: impl Into<String>) -> Self {
        self.respond(path, FakeResponse::Html(html.into()))
    }

    pub fn with_redirect(self, path: impl Into<String>, to: impl Into<String>) -> Self {
        self.respond(path, FakeResponse::RedirectTo(to.into()))
    }

    pub fn with_status(self, path: impl Into<String>, status: u16) -> Self {
        self.respond(path, FakeResponse::Status(status))
    }

    pub fn with_hang(self, path: impl Into<String>) -> Self {
        self.respond(path, FakeResponse::Hang)
    }

    /// `Set-Cookie` value absorbed on every successful load
    pub fn with_set_cookie(mut self, header: impl Into<String>) -> Self {
        self.set_cookie = Some(header.into());
        self
    }

    pub fn respond(mut self, path: impl Into<String>, response: FakeResponse) -> Self {
        self.responses.insert(path.into(), response);
        self
    }

    /// Paths requested so far, in order
    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PageSource for FakePageSource {
    async fn fetch(&self, url: &Url, session: &mut AuthSession) -> Result<Page, FetchError> {
        if let Ok(mut visited) = self.visited.lock() {
            visited.push(url.path().to_string());
        }
        let response = self
            .responses
            .get(url.path())
            .cloned()
            .unwrap_or(FakeResponse::Status(404));

        let page = match response {
            FakeResponse::Html(html) => Page {
                final_url: url.clone(),
                status: 200,
                html,
            },
            FakeResponse::RedirectTo(path) => Page {
                final_url: url
                    .join(&path)
                    .map_err(|e| FetchError::InvalidUrl(e.to_string()))?,
                status: 200,
                html: "<form id=\"login\"><input name=\"password\"></form>".to_string(),
            },
            FakeResponse::Status(status) => Page {
                final_url: url.clone(),
                status,
                html: String::new(),
            },
            FakeResponse::Hang => {
                tokio::time::sleep(Duration::from_secs(3_600)).await;
                return Err(FetchError::Timeout);
            }
        };

        if let Some(header) = &self.set_cookie {
            session.absorb_set_cookie(header);
        }
        Ok(page)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub text: String,
    pub parse_mode: Option<ParseMode>,
}

/// Chat channel that records messages and replays scripted results
///
/// Once the script runs out every send uses the fallback result.
#[derive(Debug)]
pub struct FakeChannel {
    script: Mutex<VecDeque<Result<(), SendError>>>,
    fallback: Result<(), SendError>,
    sent: Mutex<Vec<SentMessage>>,
}

impl Default for FakeChannel {
    fn default() -> Self {
        Self::accepting()
    }
}

impl FakeChannel {
    /// Every send succeeds
    pub fn accepting() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Ok(()),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Every send fails with `err`
    pub fn failing(err: SendError) -> Self {
        Self {
            fallback: Err(err),
            ..Self::accepting()
        }
    }

    /// Results for the first sends, in order
    pub fn with_script(self, script: impl IntoIterator<Item = Result<(), SendError>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            ..self
        }
    }

    /// Every attempted send, including failed ones
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// Texts of every attempted send
    pub fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|m| m.text).collect()
    }
}

#[async_trait]
impl ChatChannel for FakeChannel {
    async fn send(&self, text: &str, parse_mode: Option<ParseMode>) -> Result<(), SendError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(SentMessage {
                text: text.to_string(),
                parse_mode,
            });
        }
        let scripted = self.script.lock().ok().and_then(|mut s| s.pop_front());
        scripted.unwrap_or_else(|| self.fallback.clone())
    }
}

/// Text generator with a fixed reply
#[derive(Debug)]
pub struct FakeGenerator {
    reply: Result<String, SynthError>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl FakeGenerator {
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Ok(text.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: SynthError) -> Self {
        Self {
            reply: Err(err),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, SynthError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        self.reply.clone()
    }
}
