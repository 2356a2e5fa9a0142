use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The restaurant-data backends GlobalFood knows how to talk to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Yelp,
    Foursquare,
    Zomato,
    Factual,
}

impl ProviderKind {
    /// Every provider, in default priority order.
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::Yelp,
        ProviderKind::Foursquare,
        ProviderKind::Zomato,
        ProviderKind::Factual,
    ];

    /// Lowercase identifier used in record ids, logs and config.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yelp => "yelp",
            Self::Foursquare => "foursquare",
            Self::Zomato => "zomato",
            Self::Factual => "factual",
        }
    }

    /// Credential fields that must be present and non-blank.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Yelp => &["client_id", "client_secret"],
            Self::Foursquare => &["client_id", "client_secret"],
            Self::Zomato => &["user_key"],
            Self::Factual => &["key", "secret"],
        }
    }

    /// Credential fields the provider reads when present.
    pub fn optional_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Foursquare => &["version", "mode"],
            _ => &[],
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yelp" => Ok(Self::Yelp),
            "foursquare" => Ok(Self::Foursquare),
            "zomato" => Ok(Self::Zomato),
            "factual" => Ok(Self::Factual),
            other => Err(format!("unknown provider: {}", other)),
        }
    }
}
