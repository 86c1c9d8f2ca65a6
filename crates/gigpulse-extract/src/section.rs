//! Section and platform definitions
//!
//! A platform is a base URL, a set of login-page markers and an ordered list
//! of sections. Each section is one page with a pure parse function and a
//! documented default applied when the page cannot be loaded.

use gigpulse_snapshot::{MetricsSnapshot, Platform};
use scraper::Html;
use std::fmt;
use url::Url;

/// Parses one loaded page into the snapshot, returning how many fields it found
pub type ParseFn = fn(&Html, &Url, &mut MetricsSnapshot) -> usize;

/// Applies a section's default after a failure
pub type DefaultFn = fn(&mut MetricsSnapshot);

/// One dashboard page
#[derive(Clone, Copy)]
pub struct SectionSpec {
    pub name: &'static str,
    /// Path relative to the platform base URL
    pub path: &'static str,
    pub parse: ParseFn,
    pub default: DefaultFn,
}

impl SectionSpec {
    /// Parse `html` and merge it into `snapshot`
    ///
    /// Kept synchronous so the parsed document never lives across an await.
    #[must_use]
    pub fn apply(&self, html: &str, page_url: &Url, snapshot: &mut MetricsSnapshot) -> usize {
        let doc = Html::parse_document(html);
        (self.parse)(&doc, page_url, snapshot)
    }
}

impl fmt::Debug for SectionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectionSpec")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Everything the extractor needs to know about one marketplace
#[derive(Debug, Clone, Copy)]
pub struct PlatformSpec {
    pub platform: Platform,
    pub default_base_url: &'static str,
    /// Path fragments that identify a login page
    pub login_markers: &'static [&'static str],
    pub sections: &'static [SectionSpec],
}

impl PlatformSpec {
    /// Check if `url` is a login page (session expired)
    #[must_use]
    pub fn is_login(&self, url: &Url) -> bool {
        let path = url.path().to_ascii_lowercase();
        self.login_markers.iter().any(|m| path.contains(m))
    }

    /// Spec for a platform
    #[must_use]
    pub fn for_platform(platform: Platform) -> &'static PlatformSpec {
        match platform {
            Platform::Fiverr => &crate::fiverr::FIVERR,
            Platform::Upwork => &crate::upwork::UPWORK,
        }
    }
}

/// Counts fields that were actually found
#[derive(Debug, Default)]
pub(crate) struct Hits(pub(crate) usize);

impl Hits {
    pub(crate) fn take<T>(&mut self, value: Option<T>) -> Option<T> {
        if value.is_some() {
            self.0 += 1;
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_detection_is_structural() {
        let spec = PlatformSpec::for_platform(Platform::Upwork);
        let login = Url::parse("https://www.upwork.com/ab/account-security/login?redir=%2Fnx").unwrap();
        let dash = Url::parse("https://www.upwork.com/nx/proposals/").unwrap();
        assert!(spec.is_login(&login));
        assert!(!spec.is_login(&dash));

        let fiverr = PlatformSpec::for_platform(Platform::Fiverr);
        assert!(fiverr.is_login(&Url::parse("https://www.fiverr.com/login?source=top_nav").unwrap()));
    }

    #[test]
    fn every_platform_declares_sections() {
        for platform in Platform::ALL {
            let spec = PlatformSpec::for_platform(platform);
            assert_eq!(spec.platform, platform);
            assert!(!spec.sections.is_empty());
            assert!(Url::parse(spec.default_base_url).is_ok());
        }
    }
}
