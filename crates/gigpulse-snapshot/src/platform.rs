//! Marketplace identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported freelance marketplaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// fiverr.com seller dashboard
    Fiverr,
    /// upwork.com freelancer dashboard
    Upwork,
}

impl Platform {
    /// All platforms in extraction order
    pub const ALL: [Platform; 2] = [Platform::Fiverr, Platform::Upwork];

    /// Lowercase identifier used in file names and JSON
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Fiverr => "fiverr",
            Platform::Upwork => "upwork",
        }
    }

    /// Uppercase heading used in reports
    #[inline]
    #[must_use]
    pub fn heading(&self) -> &'static str {
        match self {
            Platform::Fiverr => "FIVERR",
            Platform::Upwork => "UPWORK",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown platform name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform: '{0}' (expected fiverr or upwork)")]
pub struct ParsePlatformError(pub String);

impl FromStr for Platform {
    type Err = ParsePlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fiverr" => Ok(Platform::Fiverr),
            "upwork" => Ok(Platform::Upwork),
            other => Err(ParsePlatformError(other.to_string())),
        }
    }
}
