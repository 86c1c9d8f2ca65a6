//! Saved marketplace login sessions
//!
//! The blob is produced by an out-of-band login flow and treated as opaque
//! apart from its cookies, which are replayed on every request and refreshed
//! from `Set-Cookie` response headers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One stored cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Per-marketplace credential blob
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    #[serde(default)]
    pub cookies: Vec<SessionCookie>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl AuthSession {
    /// True when there is nothing to authenticate with
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Value for a `Cookie` request header
    #[must_use]
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|c| format!("{}={}", c.name, c.value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Merge one `Set-Cookie` header value
    ///
    /// Expired or emptied cookies are removed; others are inserted or
    /// replaced by name. Returns `true` when the session changed.
    pub fn absorb_set_cookie(&mut self, header: &str) -> bool {
        let mut parts = header.split(';');
        let Some((name, value)) = parts.next().and_then(|kv| kv.split_once('=')) else {
            return false;
        };
        let name = name.trim();
        let value = value.trim().trim_matches('"');
        if name.is_empty() {
            return false;
        }

        let mut domain = None;
        let mut path = None;
        let mut expired = value.is_empty();
        for attr in parts {
            let (key, val) = attr.split_once('=').unwrap_or((attr, ""));
            match key.trim().to_ascii_lowercase().as_str() {
                "domain" => domain = Some(val.trim().to_string()),
                "path" => path = Some(val.trim().to_string()),
                "max-age" => expired |= val.trim().parse::<i64>().is_ok_and(|secs| secs <= 0),
                _ => {}
            }
        }

        let existing = self.cookies.iter().position(|c| c.name == name);
        if expired {
            return match existing {
                Some(idx) => {
                    self.cookies.remove(idx);
                    true
                }
                None => false,
            };
        }

        let cookie = SessionCookie {
            name: name.to_string(),
            value: value.to_string(),
            domain,
            path,
        };
        match existing {
            Some(idx) if self.cookies[idx] == cookie => false,
            Some(idx) => {
                self.cookies[idx] = cookie;
                true
            }
            None => {
                self.cookies.push(cookie);
                true
            }
        }
    }

    /// Stamp the save time
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.saved_at = Some(now);
    }
}
