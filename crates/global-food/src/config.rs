//! Search tuning, from defaults or the environment.

use std::time::Duration;

use log::warn;

use crate::models::ProviderKind;

const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_DEDUP_RADIUS_M: f64 = 50.0;
const DEFAULT_LIMIT: u32 = 20;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Upper bound on one provider's search call.
    pub provider_timeout: Duration,
    /// Records with the same name this close together are one venue.
    pub dedup_radius_meters: f64,
    /// Result limit when the request sets none.
    pub default_limit: u32,
    /// Merge and tie-break order, most trusted first.
    pub provider_priority: Vec<ProviderKind>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider_timeout: Duration::from_millis(DEFAULT_PROVIDER_TIMEOUT_MS),
            dedup_radius_meters: DEFAULT_DEDUP_RADIUS_M,
            default_limit: DEFAULT_LIMIT,
            provider_priority: ProviderKind::ALL.to_vec(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read `GF_*` settings through `lookup`. Bad values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let provider_timeout = parse_var(&lookup, "GF_PROVIDER_TIMEOUT_MS", |v| {
            v.parse::<u64>().ok().filter(|ms| *ms > 0)
        })
        .map(Duration::from_millis)
        .unwrap_or(defaults.provider_timeout);

        let dedup_radius_meters = parse_var(&lookup, "GF_DEDUP_RADIUS_M", |v| {
            v.parse::<f64>().ok().filter(|m| m.is_finite() && *m >= 0.0)
        })
        .unwrap_or(defaults.dedup_radius_meters);

        let default_limit = parse_var(&lookup, "GF_DEFAULT_LIMIT", |v| {
            v.parse::<u32>().ok().filter(|n| *n > 0)
        })
        .unwrap_or(defaults.default_limit);

        let provider_priority = parse_var(&lookup, "GF_PROVIDER_PRIORITY", parse_priority)
            .unwrap_or(defaults.provider_priority);

        Self {
            provider_timeout,
            dedup_radius_meters,
            default_limit,
            provider_priority,
        }
    }

    /// Position of `kind` in the priority order. Unlisted providers go last.
    pub fn priority_index(&self, kind: ProviderKind) -> usize {
        self.provider_priority
            .iter()
            .position(|k| *k == kind)
            .unwrap_or(self.provider_priority.len() + kind as usize)
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let raw = lookup(name)?;
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let parsed = parse(raw);
    if parsed.is_none() {
        warn!("Ignoring invalid {}={:?}, using default", name, raw);
    }
    parsed
}

/// "zomato, yelp" -> [Zomato, Yelp, Foursquare, Factual]. Unknown or repeated
/// names make the whole value invalid.
fn parse_priority(raw: &str) -> Option<Vec<ProviderKind>> {
    let mut order: Vec<ProviderKind> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let kind = name.parse::<ProviderKind>().ok()?;
        if order.contains(&kind) {
            return None;
        }
        order.push(kind);
    }
    if order.is_empty() {
        return None;
    }
    for kind in ProviderKind::ALL {
        if !order.contains(&kind) {
            order.push(kind);
        }
    }
    Some(order)
}
