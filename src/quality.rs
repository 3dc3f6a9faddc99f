use serde::{Deserialize, Serialize};
use std::fmt;

pub const FALLBACK_SELECTOR: &str = "best/worst";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Quality {
    P360,
    P480,
    #[default]
    P720,
    P1080,
    Other(String),
}

impl Quality {
    pub const TIERS: [Quality; 4] = [Quality::P360, Quality::P480, Quality::P720, Quality::P1080];

    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "360p" => Quality::P360,
            "480p" => Quality::P480,
            "720p" => Quality::P720,
            "1080p" => Quality::P1080,
            _ => Quality::Other(raw.to_string()),
        }
    }

    pub fn height(&self) -> Option<u32> {
        match self {
            Quality::P360 => Some(360),
            Quality::P480 => Some(480),
            Quality::P720 => Some(720),
            Quality::P1080 => Some(1080),
            Quality::Other(_) => None,
        }
    }

    /// yt-dlp `-f` expression: the best stream at or below the tier, else the
    /// smallest one above it, else whatever is best.
    pub fn format_selector(&self) -> String {
        match self.height() {
            Some(h) => format!("best[height<={h}]/worst[height>{h}]/best"),
            None => FALLBACK_SELECTOR.to_string(),
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quality::Other(raw) => f.write_str(raw),
            tier => write!(f, "{}p", tier.height().unwrap_or_default()),
        }
    }
}

impl From<String> for Quality {
    fn from(raw: String) -> Self {
        Quality::parse(&raw)
    }
}

impl From<Quality> for String {
    fn from(quality: Quality) -> Self {
        quality.to_string()
    }
}

impl std::str::FromStr for Quality {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Quality::parse(s))
    }
}
