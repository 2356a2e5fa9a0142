//! Canonical restaurant record shared by every provider.

use serde::{Deserialize, Serialize};

use super::{Coordinates, ProviderKind};

/// Relative price level, cheapest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTier {
    Inexpensive,
    Moderate,
    Expensive,
    VeryExpensive,
}

impl PriceTier {
    /// Map a 1-based tier. Values above 4 clamp to `VeryExpensive`.
    pub fn from_level(level: i64) -> Option<Self> {
        match level {
            1 => Some(Self::Inexpensive),
            2 => Some(Self::Moderate),
            3 => Some(Self::Expensive),
            n if n >= 4 => Some(Self::VeryExpensive),
            _ => None,
        }
    }

    /// Parse "$" through "$$$$".
    pub fn from_symbols(symbols: &str) -> Option<Self> {
        let symbols = symbols.trim();
        if symbols.is_empty() || !symbols.chars().all(|c| c == '$') {
            return None;
        }
        Self::from_level(symbols.len() as i64)
    }
}

/// Where a record came from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceTag {
    pub provider: ProviderKind,
    /// The provider's own identifier.
    pub native_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Position in that provider's response (0 = most relevant).
    pub rank: usize,
}

/// Normalized restaurant/venue entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// `"<provider>:<native id>"`.
    pub id: String,
    pub name: String,
    pub coordinates: Coordinates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    /// 0-5 scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceTier>,
    pub sources: Vec<SourceTag>,
}

impl CanonicalRecord {
    /// Single-source record as produced by an adapter.
    pub fn new(
        provider: ProviderKind,
        native_id: impl Into<String>,
        name: impl Into<String>,
        coordinates: Coordinates,
        rank: usize,
    ) -> Self {
        let native_id = native_id.into();
        Self {
            id: format!("{}:{}", provider, native_id),
            name: name.into(),
            coordinates,
            address: None,
            categories: Vec::new(),
            rating: None,
            price: None,
            sources: vec![SourceTag {
                provider,
                native_id,
                url: None,
                rank,
            }],
        }
    }

    pub fn with_address(mut self, address: Option<String>) -> Self {
        self.address = address
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());
        self
    }

    /// Trimmed, blank-free, first spelling wins on case-insensitive repeats.
    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        let mut seen: Vec<String> = Vec::new();
        self.categories = categories
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| {
                let key = c.to_lowercase();
                if c.is_empty() || seen.contains(&key) {
                    return false;
                }
                seen.push(key);
                true
            })
            .collect();
        self
    }

    pub fn with_rating(mut self, rating: Option<f64>) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_price(mut self, price: Option<PriceTier>) -> Self {
        self.price = price;
        self
    }

    pub fn with_url(mut self, url: Option<String>) -> Self {
        if let Some(source) = self.sources.first_mut() {
            source.url = url;
        }
        self
    }

    /// Number of distinct providers backing this record.
    pub fn corroboration(&self) -> usize {
        let mut providers: Vec<ProviderKind> = self.sources.iter().map(|s| s.provider).collect();
        providers.sort();
        providers.dedup();
        providers.len()
    }

    pub fn has_source(&self, provider: ProviderKind) -> bool {
        self.sources.iter().any(|s| s.provider == provider)
    }
}
